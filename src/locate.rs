use std::{fs, io, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    expand::TemplateProcessor,
    options::TsConfigSetting,
    path::{absolutize, to_slash},
};

pub const DEFAULT_PROJECT_FILE: &str = "tsconfig.json";

/// Normalized form of a `tsconfig` setting. Every field is optional so that
/// "explicitly set" stays observable for merging and for defaulting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDescriptor {
    /// Path to the project file; build-root-relative or absolute.
    #[serde(rename = "tsconfig", default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite_files_glob: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_files: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_through: Option<bool>,
}

impl ConfigDescriptor {
    pub fn with_config_path<S: Into<String>>(config_path: S) -> Self {
        Self {
            config_path: Some(config_path.into()),
            ..Default::default()
        }
    }

    pub fn ignores_settings(&self) -> bool {
        self.ignore_settings.unwrap_or(false)
    }

    pub fn overwrites_files_glob(&self) -> bool {
        self.overwrite_files_glob.unwrap_or(false)
    }

    pub fn updates_files(&self) -> bool {
        self.update_files.unwrap_or(false)
    }

    pub fn is_pass_through(&self) -> bool {
        self.pass_through.unwrap_or(false)
    }

    /// Copy every field `other` sets explicitly over `self`.
    fn overlay(&mut self, other: ConfigDescriptor) {
        if other.config_path.is_some() {
            self.config_path = other.config_path;
        }
        if other.ignore_settings.is_some() {
            self.ignore_settings = other.ignore_settings;
        }
        if other.overwrite_files_glob.is_some() {
            self.overwrite_files_glob = other.overwrite_files_glob;
        }
        if other.update_files.is_some() {
            self.update_files = other.update_files;
        }
        if other.pass_through.is_some() {
            self.pass_through = other.pass_through;
        }
    }
}

/// Which shape the raw setting had before normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingShape {
    Flag,
    Path,
    Object,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedConfig {
    pub descriptor: ConfigDescriptor,
    pub shape: SettingShape,
}

/// Normalize a raw `tsconfig` setting. Absent or falsy settings yield `None`.
///
/// A path setting naming a directory points at the `tsconfig.json` inside it.
/// A path that does not exist is reported as [`Error::NotFound`].
pub fn locate_config(
    setting: Option<&TsConfigSetting>,
    build_root: &Path,
    templates: &dyn TemplateProcessor,
) -> Result<Option<LocatedConfig>, Error> {
    let located = match setting {
        None | Some(TsConfigSetting::Flag(false)) => None,
        Some(TsConfigSetting::Path(path)) if path.is_empty() => None,
        Some(TsConfigSetting::Flag(true)) => Some(LocatedConfig {
            descriptor: ConfigDescriptor::with_config_path(format!("./{}", DEFAULT_PROJECT_FILE)),
            shape: SettingShape::Flag,
        }),
        Some(TsConfigSetting::Path(path)) => {
            let expanded = templates.process(path);
            let metadata = fs::metadata(absolutize(build_root, &expanded)).map_err(|err| {
                match err.kind() {
                    io::ErrorKind::NotFound => Error::NotFound {
                        path: expanded.clone().into(),
                    },
                    _ => Error::InvalidSetting {
                        setting: expanded.clone(),
                        source: err,
                    },
                }
            })?;
            let config_path = if metadata.is_dir() {
                to_slash(&Path::new(&expanded).join(DEFAULT_PROJECT_FILE))
            } else {
                expanded
            };
            Some(LocatedConfig {
                descriptor: ConfigDescriptor::with_config_path(config_path),
                shape: SettingShape::Path,
            })
        }
        Some(TsConfigSetting::Options(descriptor)) => {
            let mut descriptor = descriptor.clone();
            if descriptor.config_path.is_none() && !descriptor.is_pass_through() {
                descriptor.config_path = Some(DEFAULT_PROJECT_FILE.to_owned());
            }
            Some(LocatedConfig {
                descriptor,
                shape: SettingShape::Object,
            })
        }
    };
    Ok(located)
}

/// Merge the task-level and target-level descriptors, target winning.
///
/// An object-shaped task descriptor is overlaid field by field with whatever
/// the target sets; a flag or path task descriptor is replaced wholesale.
/// The surviving `config_path` goes through template expansion once more.
pub fn merge_descriptors(
    task: Option<LocatedConfig>,
    target: Option<LocatedConfig>,
    templates: &dyn TemplateProcessor,
) -> Option<ConfigDescriptor> {
    let mut merged = match (task, target) {
        (None, None) => return None,
        (Some(task), None) => task.descriptor,
        (None, Some(target)) => target.descriptor,
        (Some(task), Some(target)) if task.shape != SettingShape::Object => target.descriptor,
        (Some(task), Some(target)) => {
            let mut merged = task.descriptor;
            merged.overlay(target.descriptor);
            merged
        }
    };
    if let Some(config_path) = merged.config_path.as_deref() {
        merged.config_path = Some(templates.process(config_path));
    }
    debug!("merged tsconfig setting: {:?}", merged);
    Some(merged)
}
