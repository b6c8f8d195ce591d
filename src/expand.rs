//! Seams to the collaborators the resolver does not own: placeholder
//! expansion in path-like settings, and glob expansion.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use globwalk::{FileType, GlobWalkerBuilder};
use log::{trace, warn};

use crate::path::{absolutize, relative_path, split_negation, to_slash};

/// Expands placeholders in a path-like setting before it reaches the
/// filesystem.
pub trait TemplateProcessor: Send + Sync {
    fn process(&self, template: &str) -> String;
}

impl<F> TemplateProcessor for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn process(&self, template: &str) -> String {
        self(template)
    }
}

/// Template processor that returns its input untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verbatim;

impl TemplateProcessor for Verbatim {
    fn process(&self, template: &str) -> String {
        template.to_owned()
    }
}

/// Expands an ordered list of glob patterns into matching paths. Patterns
/// prefixed with `!` exclude matches of the other patterns in the same call.
pub trait GlobExpander: Send + Sync {
    fn expand(&self, patterns: &[String]) -> Vec<String>;

    /// A stub expander defers glob semantics; the resolver warns when it has
    /// to use one and never persists anything derived from it.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Expander that matches nothing. Used where glob resolution is
/// intentionally deferred to a later stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubGlobExpander;

impl GlobExpander for StubGlobExpander {
    fn expand(&self, _patterns: &[String]) -> Vec<String> {
        Vec::new()
    }

    fn is_stub(&self) -> bool {
        true
    }
}

/// Expands globs by walking the filesystem beneath `root`.
///
/// Patterns may be absolute or relative to `root`. Each match is reported in
/// the frame of the pattern that produced it, with forward slashes. Matches
/// are grouped by pattern in input order, sorted within a pattern, and never
/// repeated. Patterns that escape `root` cannot be walked and are skipped.
#[derive(Clone, Debug)]
pub struct GlobWalkExpander {
    root: PathBuf,
}

impl GlobWalkExpander {
    /// `root` should be absolute.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    /// Re-express `pattern` relative to the walk root, if it lives beneath it.
    fn walkable(&self, pattern: &str) -> Option<String> {
        let absolute = absolutize(&self.root, pattern);
        let relative = relative_path(&self.root, &absolute);
        if relative.starts_with("..") || relative.as_os_str().is_empty() {
            warn!("glob {:?} is outside of {:?}, skipping", pattern, self.root);
            return None;
        }
        Some(to_slash(&relative))
    }

    fn walk(&self, include: &str, excludes: &[String]) -> Vec<PathBuf> {
        let patterns: Vec<String> = std::iter::once(include.to_owned())
            .chain(excludes.iter().map(|exclude| format!("!{}", exclude)))
            .collect();
        let walker = match GlobWalkerBuilder::from_patterns(&self.root, &patterns)
            .file_type(FileType::FILE)
            .min_depth(0)
            .build()
        {
            Ok(walker) => walker,
            Err(err) => {
                warn!("invalid glob {:?}: {}", include, err);
                return Vec::new();
            }
        };
        let mut matches: Vec<PathBuf> = walker
            .filter_map(|maybe_dir_entry| match maybe_dir_entry {
                Ok(dir_entry) => Some(dir_entry.into_path()),
                Err(err) => {
                    warn!("unable to walk directory tree: {}", err);
                    None
                }
            })
            .collect();
        matches.sort_unstable();
        matches
    }
}

impl GlobExpander for GlobWalkExpander {
    fn expand(&self, patterns: &[String]) -> Vec<String> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for pattern in patterns {
            let (negated, bare) = split_negation(pattern);
            let Some(walkable) = self.walkable(bare) else {
                continue;
            };
            if negated {
                excludes.push(walkable);
            } else {
                includes.push((Path::new(bare).is_absolute(), walkable));
            }
        }
        trace!("walking {:?} excluding {:?}", includes, excludes);

        let mut seen = HashSet::new();
        let mut expanded = Vec::new();
        for (absolute, include) in includes {
            for path in self.walk(&include, &excludes) {
                let reported = if absolute {
                    to_slash(&path)
                } else {
                    to_slash(&relative_path(&self.root, &path))
                };
                if seen.insert(reported.clone()) {
                    expanded.push(reported);
                }
            }
        }
        expanded
    }
}
