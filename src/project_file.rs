use std::{collections::HashSet, path::Path};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::Error,
    expand::GlobExpander,
    io::{read_json_from_file, write_json_to_file, FromFileError},
    locate::ConfigDescriptor,
    options::{is_truthy, EffectiveOptions},
    path::{map_glob, ProjectPivot},
};

/// The parts of a `tsconfig.json` the resolver understands. Unknown keys are
/// ignored here and left untouched on disk by every rewrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<Map<String, Value>>,
    /// Config-relative paths, compiled verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Config-relative globs. Kept loosely typed: only an array contributes
    /// globs, but any truthy value still counts as an explicit file list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
    /// Config-relative globs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Legacy config-relative globs whose expansion is persisted into `files`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_glob: Option<Vec<String>>,
}

impl ProjectFile {
    pub fn compiler_option(&self, name: &str) -> Option<&Value> {
        self.compiler_options
            .as_ref()
            .and_then(|options| options.get(name))
    }

    /// Whether `include` is set to something truthy.
    pub fn has_include(&self) -> bool {
        self.include.as_ref().map_or(false, is_truthy)
    }

    /// The string entries of an `include` array. Anything else yields none.
    pub fn include_globs(&self) -> impl Iterator<Item = &str> {
        self.include
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_str)
    }

    /// A compiler option that is present with a truthy value, as a string.
    pub(crate) fn compiler_option_str(&self, name: &str) -> Option<&str> {
        self.compiler_option(name)
            .filter(|value| is_truthy(value))
            .and_then(Value::as_str)
    }
}

pub fn load_project_file<P: AsRef<Path>>(path: P) -> Result<ProjectFile, FromFileError> {
    let project: ProjectFile = read_json_from_file(path)?;
    trace!("{:?}", project);
    Ok(project)
}

/// Record warnings and errors about settings this resolver cannot honour
/// faithfully. Returns `false` when an error was recorded.
pub fn validate(
    project: &ProjectFile,
    descriptor: &ConfigDescriptor,
    options: &mut EffectiveOptions,
) -> bool {
    let has = |name: &str| project.compiler_option(name).map_or(false, is_truthy);
    if has("out") && has("outFile") {
        options.warnings.push(String::from(
            "Warning: `out` and `outFile` should not be used together in tsconfig.json.",
        ));
    }
    if has("out") {
        options.warnings.push(String::from(
            "Warning: Using `out` in tsconfig.json can be unreliable because it will output \
             relative to the tsc working directory. It is better to use `outFile` which is \
             always relative to tsconfig.json.",
        ));
    }

    let error_count = options.errors.len();
    if project.has_include() && descriptor.overwrites_files_glob() {
        options.errors.push(String::from(
            "Error: the `overwriteFilesGlob` feature cannot be used with a tsconfig.json file \
             that has an `include` array. Use `include` on its own instead.",
        ));
    }
    if project.has_include() && descriptor.updates_files() {
        options.errors.push(String::from(
            "Error: the `updateFiles` feature cannot be used with a tsconfig.json file that \
             has an `include` array. Use `include` on its own instead.",
        ));
    }
    options.errors.len() == error_count
}

fn differs_as_sets(left: &[String], right: &[String]) -> bool {
    let left: HashSet<&String> = left.iter().collect();
    let right: HashSet<&String> = right.iter().collect();
    left != right
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Re-read the project file, let `edit` change it, and write it back.
fn rewrite_project_file<F>(config_file: &Path, edit: F) -> Result<(), Error>
where
    F: FnOnce(&mut Map<String, Value>),
{
    let mut raw: Map<String, Value> = read_json_from_file(config_file)?;
    edit(&mut raw);
    write_json_to_file(config_file, &raw).map_err(|source| Error::UpdateProjectFile {
        path: config_file.to_owned(),
        source,
    })?;
    debug!("rewrote {:?}", config_file);
    Ok(())
}

/// Replace the project file's `filesGlob` with the build-level `src` globs
/// when the two have drifted apart. Any `files` list is emptied, both on disk
/// and in `project`, since it no longer reflects the globs.
pub(crate) fn overwrite_files_glob(
    pivot: &ProjectPivot,
    config_file: &Path,
    project: &mut ProjectFile,
    build_globs: &[String],
) -> Result<(), Error> {
    let globs_from_config: Vec<String> = build_globs
        .iter()
        .map(|glob| map_glob(&glob.replace('\\', "/"), |bare| pivot.root_to_config(bare)))
        .collect();
    let recorded = project.files_glob.as_deref().unwrap_or_default();
    if !differs_as_sets(recorded, &globs_from_config) {
        return Ok(());
    }

    project.files_glob = Some(globs_from_config.clone());
    if project.files.is_some() {
        project.files = Some(Vec::new());
    }
    rewrite_project_file(config_file, |raw| {
        raw.insert(
            String::from("filesGlob"),
            Value::from(globs_from_config),
        );
        if raw.contains_key("files") {
            raw.insert(String::from("files"), Value::Array(Vec::new()));
        }
    })
}

/// Expand the legacy `filesGlob` list and persist the result as `files` when
/// it differs from what the file currently records. Returns whether the file
/// was rewritten; a stub expander never rewrites.
pub(crate) fn update_files_from_glob(
    pivot: &ProjectPivot,
    config_file: &Path,
    files_glob: &[String],
    glob_expander: &dyn GlobExpander,
) -> Result<bool, Error> {
    if glob_expander.is_stub() {
        return Ok(false);
    }

    let globs_from_root: Vec<String> = files_glob
        .iter()
        .map(|glob| map_glob(glob, |bare| pivot.config_to_root(bare)))
        .collect();
    let files_from_config: Vec<String> = glob_expander
        .expand(&globs_from_root)
        .iter()
        .map(|file| pivot.root_to_config(file.replace('\\', "/")))
        .collect();

    let on_disk: Map<String, Value> = read_json_from_file(config_file)?;
    let recorded = string_list(on_disk.get("files"));
    if !differs_as_sets(&recorded, &files_from_config) {
        return Ok(false);
    }
    rewrite_project_file(config_file, move |raw| {
        raw.insert(String::from("files"), Value::from(files_from_config));
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn project(value: Value) -> ProjectFile {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn out_and_out_file_both_warn() {
        let mut options = EffectiveOptions::default();
        let ok = validate(
            &project(json!({"compilerOptions": {"out": "x.js", "outFile": "y.js"}})),
            &ConfigDescriptor::default(),
            &mut options,
        );
        assert!(ok);
        assert_eq!(options.warnings.len(), 2);
        assert!(options.warnings[0].contains("should not be used together"));
    }

    #[test]
    fn out_file_alone_is_silent() {
        let mut options = EffectiveOptions::default();
        validate(
            &project(json!({"compilerOptions": {"outFile": "y.js"}})),
            &ConfigDescriptor::default(),
            &mut options,
        );
        assert!(options.warnings.is_empty());
    }

    #[test]
    fn include_conflicts_with_legacy_glob_modes() {
        let mut options = EffectiveOptions::default();
        let descriptor = ConfigDescriptor {
            overwrite_files_glob: Some(true),
            update_files: Some(true),
            ..Default::default()
        };
        let ok = validate(
            &project(json!({"include": ["src/**/*.ts"]})),
            &descriptor,
            &mut options,
        );
        assert!(!ok);
        assert_eq!(options.errors.len(), 2);
    }

    #[test]
    fn non_array_include_contributes_no_globs() {
        let loose = project(json!({"include": "src/**/*.ts", "files": ["a.ts"]}));
        assert!(loose.has_include());
        assert_eq!(loose.include_globs().count(), 0);

        let mixed = project(json!({"include": ["src/**/*.ts", 3]}));
        assert_eq!(mixed.include_globs().collect::<Vec<_>>(), ["src/**/*.ts"]);
    }

    #[test]
    fn set_difference_ignores_order() {
        let a = vec![String::from("a.ts"), String::from("b.ts")];
        let b = vec![String::from("b.ts"), String::from("a.ts")];
        assert!(!differs_as_sets(&a, &b));
        assert!(differs_as_sets(&a, &b[..1]));
    }
}
