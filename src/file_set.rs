use std::{collections::HashSet, path::Path};

use log::{debug, trace};

use crate::{
    error::Error,
    expand::GlobExpander,
    locate::ConfigDescriptor,
    options::EffectiveOptions,
    path::{negate, normalize, split_negation, to_slash, ProjectPivot},
    project_file::{update_files_from_glob, ProjectFile},
};

const DEFAULT_EXCLUDES: &[&str] = &["node_modules/**", "bower_components/**", "jspm_packages/**"];
const DEFAULT_INCLUDES: &[&str] = &["**/*.ts", "**/*.d.ts", "**/*.tsx"];
const JAVASCRIPT_GLOBS: &[&str] = &["**/*.js", "**/*.jsx"];

/// The compilation context a project file describes, as absolute paths and
/// patterns. `exclude` patterns carry a leading `!`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedFileSet {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub files: Vec<String>,
}

impl ResolvedFileSet {
    pub fn new(project: &ProjectFile, pivot: &ProjectPivot, options: &EffectiveOptions) -> Self {
        let absolute = |path: &str| to_slash(&pivot.absolute_from_config(path));
        let mut file_set = Self::default();

        match &project.exclude {
            Some(exclude) => file_set.exclude.extend(
                exclude
                    .iter()
                    .map(|pattern| negate(&absolute(split_negation(pattern).1))),
            ),
            None => {
                file_set.exclude.extend(
                    DEFAULT_EXCLUDES
                        .iter()
                        .map(|&pattern| negate(&absolute(pattern))),
                );
                // only the first task's output directory is considered
                if let Some(out_dir) = options
                    .compilation_tasks
                    .first()
                    .and_then(|task| task.out_dir.as_deref())
                {
                    file_set.exclude.push(negate(&absolute(out_dir)));
                }
            }
        }

        if project.files.is_some() || project.has_include() {
            if let Some(files) = &project.files {
                file_set
                    .files
                    .extend(files.iter().map(|file| absolute(file.as_str())));
            }
            file_set
                .include
                .extend(project.include_globs().map(|pattern| absolute(pattern)));
        } else {
            file_set
                .include
                .extend(DEFAULT_INCLUDES.iter().map(|&pattern| absolute(pattern)));
            if options.allow_js() {
                file_set
                    .include
                    .extend(JAVASCRIPT_GLOBS.iter().map(|&pattern| absolute(pattern)));
            }
        }

        trace!("{:?}", file_set);
        file_set
    }

    /// Expand the globs (once, excludes applied within the same call) and
    /// append the verbatim `files`. Not yet de-duplicated.
    ///
    /// Exclusions alone cannot match anything, so the expander is only
    /// consulted when there is something to include.
    pub fn expand(
        &self,
        glob_expander: &dyn GlobExpander,
        warnings: &mut Vec<String>,
    ) -> Vec<String> {
        let mut expanded = Vec::new();
        if !self.include.is_empty() {
            if glob_expander.is_stub() {
                warnings.push(String::from(
                    "Warning: attempted to resolve tsconfig.json globs with a stub glob expander.",
                ));
            }
            let patterns: Vec<String> = self
                .include
                .iter()
                .chain(self.exclude.iter())
                .cloned()
                .collect();
            expanded = glob_expander.expand(&patterns);
            debug!("{} patterns expanded to {} files", patterns.len(), expanded.len());
        }
        expanded.extend(self.files.iter().cloned());
        expanded
    }
}

/// Append each file, in order and once, to `src` as a build-root-relative
/// path, unless `src` already lists it in relative or absolute form. Relative
/// entries in `files` are taken to be config-relative.
pub fn add_unique_files_to_src(files: &[String], src: &mut Vec<String>, pivot: &ProjectPivot) {
    let mut seen = HashSet::new();
    for file in files {
        if !seen.insert(file.as_str()) {
            continue;
        }
        let absolute = to_slash(&pivot.absolute_from_config(file));
        let relative = pivot.config_to_root(file);
        if !src.contains(&absolute) && !src.contains(&relative) {
            src.push(relative);
        }
    }
}

/// Populate the first compilation task's sources from the project file, then
/// keep a legacy `filesGlob` in sync with the disk when update mode is on.
pub fn resolve_file_set(
    project: &ProjectFile,
    descriptor: &ConfigDescriptor,
    pivot: &ProjectPivot,
    config_file: &Path,
    glob_expander: &dyn GlobExpander,
    options: &mut EffectiveOptions,
) -> Result<(), Error> {
    options.ensure_compilation_task();
    let file_set = ResolvedFileSet::new(project, pivot, options);
    let files = file_set.expand(glob_expander, &mut options.warnings);
    if let Some(task) = options.compilation_tasks.first_mut() {
        add_unique_files_to_src(&files, &mut task.src, pivot);
    }

    if let (true, Some(files_glob)) = (descriptor.updates_files(), &project.files_glob) {
        let rewritten = update_files_from_glob(pivot, config_file, files_glob, glob_expander)?;
        debug!("filesGlob sync rewrote {:?}: {}", config_file, rewritten);
    }
    Ok(())
}

/// Point every compilation task at the outputs the project file names. `out`
/// stays relative to the compiler's working directory; `outFile` and
/// `outDir` are config-relative and get re-rooted. `outFile` wins over `out`.
pub fn resolve_output_locations(
    project: &ProjectFile,
    pivot: &ProjectPivot,
    options: &mut EffectiveOptions,
) {
    let from_config = |path: &str| {
        to_slash(&normalize(
            &Path::new(pivot.config_dir_from_root()).join(path),
        ))
    };
    for task in options.compilation_tasks.iter_mut() {
        if let Some(out) = project.compiler_option_str("out") {
            task.out = Some(to_slash(&normalize(Path::new(out))));
        }
        if let Some(out_file) = project.compiler_option_str("outFile") {
            task.out = Some(from_config(out_file));
        }
        if let Some(out_dir) = project.compiler_option_str("outDir") {
            task.out_dir = Some(from_config(out_dir));
        }
    }
}
