use std::{
    error::Error,
    fmt::Display,
    path::{Component, Path, PathBuf},
};

#[derive(Debug)]
#[non_exhaustive]
pub struct PivotError {
    config_file: PathBuf,
    kind: PivotErrorKind,
}

impl Display for PivotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            PivotErrorKind::NoParentDirectory => write!(
                f,
                "project file {:?} has no parent directory",
                self.config_file
            ),
        }
    }
}

impl Error for PivotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            PivotErrorKind::NoParentDirectory => None,
        }
    }
}

#[derive(Debug)]
pub enum PivotErrorKind {
    #[non_exhaustive]
    NoParentDirectory,
}

/// Convert a path to its externally visible form: forward slashes only.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Anchor `path` at `base` unless it is already absolute, then normalize.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(path.as_ref()))
}

/// The path leading from directory `from` to `to`. Both must be in the same
/// frame (usually absolute). An empty path means `from == to`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let mut from_components = from.components().peekable();
    let mut to_components = to.components().peekable();

    while let (Some(a), Some(b)) = (from_components.peek(), to_components.peek()) {
        if a != b {
            break;
        }
        from_components.next();
        to_components.next();
    }

    let mut relative: PathBuf = from_components.map(|_| Component::ParentDir).collect();
    relative.extend(to_components);
    relative
}

/// Prefix `pattern` with `!` unless it already has one.
pub(crate) fn negate(pattern: &str) -> String {
    if pattern.starts_with('!') {
        pattern.to_owned()
    } else {
        format!("!{}", pattern)
    }
}

/// Split a glob pattern into its negation flag and the bare pattern.
pub(crate) fn split_negation(pattern: &str) -> (bool, &str) {
    match pattern.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    }
}

/// Apply a frame conversion to a glob, keeping any `!` in front.
pub(crate) fn map_glob<F>(pattern: &str, convert: F) -> String
where
    F: FnOnce(&str) -> String,
{
    match split_negation(pattern) {
        (true, bare) => negate(&convert(bare)),
        (false, bare) => convert(bare),
    }
}

/// The two reference points every cross-frame conversion goes through: the
/// absolute directory holding the project file, and that directory as seen
/// from the build root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPivot {
    build_root: PathBuf,
    config_dir: PathBuf,
    config_dir_from_root: String,
}

impl ProjectPivot {
    /// `config_file` may be absolute or build-root-relative.
    pub fn new(build_root: &Path, config_file: &Path) -> Result<Self, PivotError> {
        let config_file = absolutize(build_root, config_file);
        let config_dir = config_file
            .parent()
            .map(ToOwned::to_owned)
            .ok_or_else(|| PivotError {
                config_file: config_file.clone(),
                kind: PivotErrorKind::NoParentDirectory,
            })?;
        let config_dir_from_root = to_slash(&relative_path(build_root, &config_dir));
        Ok(Self {
            build_root: build_root.to_owned(),
            config_dir,
            config_dir_from_root,
        })
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Absolute path of the directory containing the project file.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// The project file's directory relative to the build root, forward
    /// slashes, empty when they coincide.
    pub fn config_dir_from_root(&self) -> &str {
        &self.config_dir_from_root
    }

    /// Config-relative (or absolute) to absolute.
    pub fn absolute_from_config(&self, path: impl AsRef<Path>) -> PathBuf {
        absolutize(&self.config_dir, path)
    }

    /// Build-root-relative (or absolute) to absolute.
    pub fn absolute_from_root(&self, path: impl AsRef<Path>) -> PathBuf {
        absolutize(&self.build_root, path)
    }

    /// Config-relative (or absolute) to build-root-relative.
    pub fn config_to_root(&self, path: impl AsRef<Path>) -> String {
        to_slash(&relative_path(
            &self.build_root,
            &self.absolute_from_config(path),
        ))
    }

    /// Build-root-relative (or absolute) to config-relative.
    pub fn root_to_config(&self, path: impl AsRef<Path>) -> String {
        to_slash(&relative_path(
            &self.config_dir,
            &self.absolute_from_root(path),
        ))
    }
}
