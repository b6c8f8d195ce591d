use std::{
    fmt::Debug,
    io,
    path::{Path, PathBuf},
};

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    compiler_options::{copy_compiler_options, derive_update_files},
    error::Error,
    expand::{GlobExpander, TemplateProcessor},
    file_set::{resolve_file_set, resolve_output_locations},
    locate::{locate_config, merge_descriptors, ConfigDescriptor, DEFAULT_PROJECT_FILE},
    options::{collect_globs, EffectiveOptions, TargetOptions},
    path::{absolutize, ProjectPivot},
    project_file::{load_project_file, overwrite_files_glob, validate, ProjectFile},
};

/// Everything one resolution needs to remember between steps. Owned by a
/// single call to [`Resolver::resolve`], so concurrent resolutions never
/// observe each other's state.
#[derive(Debug)]
struct ResolveContext {
    /// Build-level `src` globs, build-root-relative.
    globs: Option<Vec<String>>,
    /// Absolute path of the project file.
    config_file: PathBuf,
    pivot: ProjectPivot,
}

/// One target to resolve with [`Resolver::resolve_all`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TargetRequest {
    #[serde(default)]
    pub options: EffectiveOptions,
    #[serde(default)]
    pub task: TargetOptions,
    #[serde(default)]
    pub target: TargetOptions,
}

/// Merges project files into build options.
///
/// Relative paths in settings are interpreted against `build_root`, which
/// plays the role of the build tool's working directory.
pub struct Resolver<'a> {
    build_root: PathBuf,
    templates: &'a dyn TemplateProcessor,
    glob_expander: &'a dyn GlobExpander,
}

impl Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("build_root", &self.build_root)
            .field("stub_glob_expander", &self.glob_expander.is_stub())
            .finish_non_exhaustive()
    }
}

impl<'a> Resolver<'a> {
    /// `build_root` should be absolute.
    pub fn new<P: AsRef<Path>>(
        build_root: P,
        templates: &'a dyn TemplateProcessor,
        glob_expander: &'a dyn GlobExpander,
    ) -> Self {
        Self {
            build_root: build_root.as_ref().to_owned(),
            templates,
            glob_expander,
        }
    }

    /// Resolve relative to the process's current working directory.
    pub fn from_current_dir(
        templates: &'a dyn TemplateProcessor,
        glob_expander: &'a dyn GlobExpander,
    ) -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?, templates, glob_expander))
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Merge the project file selected by the task and target options into
    /// `apply_to`.
    ///
    /// Settings the resolver refuses to honour are reported through
    /// `apply_to.errors`, in which case the compilation tasks are left as
    /// they were and the caller must not compile. Problems that leave nothing
    /// usable to return are reported as [`Error`].
    pub fn resolve(
        &self,
        mut apply_to: EffectiveOptions,
        task: &TargetOptions,
        target: &TargetOptions,
    ) -> Result<EffectiveOptions, Error> {
        let globs = collect_globs(task, target, self.templates);
        let task_config = locate_config(task.tsconfig.as_ref(), &self.build_root, self.templates)?;
        let target_config =
            locate_config(target.tsconfig.as_ref(), &self.build_root, self.templates)?;

        let Some(mut descriptor) = merge_descriptors(task_config, target_config, self.templates)
        else {
            debug!("no tsconfig setting, nothing to resolve");
            apply_to.tsconfig = None;
            return Ok(apply_to);
        };

        if descriptor.is_pass_through() {
            debug!("passing tsconfig handling through to the compiler");
            apply_to.ensure_compilation_task();
            descriptor.config_path.get_or_insert_with(|| String::from("."));
            apply_to.tsconfig = Some(descriptor);
            return Ok(apply_to);
        }

        let config_path = descriptor
            .config_path
            .get_or_insert_with(|| DEFAULT_PROJECT_FILE.to_owned())
            .clone();
        let config_file = absolutize(&self.build_root, &config_path);
        let project = load_project_file(&config_file)?;
        debug!("loaded project file {:?}", config_file);

        let valid = validate(&project, &descriptor, &mut apply_to);
        if !valid {
            apply_to.tsconfig = Some(descriptor);
            return Ok(apply_to);
        }

        let pivot = ProjectPivot::new(&self.build_root, &config_file).map_err(|source| {
            Error::ProjectFileLocation {
                path: config_file.clone(),
                source,
            }
        })?;
        let context = ResolveContext {
            globs,
            config_file,
            pivot,
        };
        self.apply_project_file(&context, project, &mut descriptor, &mut apply_to)?;
        apply_to.tsconfig = Some(descriptor);
        Ok(apply_to)
    }

    fn apply_project_file(
        &self,
        context: &ResolveContext,
        mut project: ProjectFile,
        descriptor: &mut ConfigDescriptor,
        apply_to: &mut EffectiveOptions,
    ) -> Result<(), Error> {
        copy_compiler_options(&project, descriptor, apply_to);
        derive_update_files(&project, descriptor);
        apply_to.ensure_compilation_task();

        if descriptor.overwrites_files_glob() {
            let globs = context.globs.as_deref().ok_or(Error::MissingGlobs)?;
            overwrite_files_glob(&context.pivot, &context.config_file, &mut project, globs)?;
        }

        resolve_file_set(
            &project,
            descriptor,
            &context.pivot,
            &context.config_file,
            self.glob_expander,
            apply_to,
        )?;
        resolve_output_locations(&project, &context.pivot, apply_to);
        Ok(())
    }

    /// [`Resolver::resolve`] as a future, for callers that chain resolution
    /// into asynchronous build steps.
    pub async fn resolve_async(
        &self,
        apply_to: EffectiveOptions,
        task: &TargetOptions,
        target: &TargetOptions,
    ) -> Result<EffectiveOptions, Error> {
        self.resolve(apply_to, task, target)
    }

    /// Resolve independent targets in parallel. Results are in request order.
    ///
    /// Targets sharing a project file that needs rewriting race on the write.
    pub fn resolve_all(&self, requests: Vec<TargetRequest>) -> Vec<Result<EffectiveOptions, Error>> {
        let results: Vec<_> = requests
            .into_par_iter()
            .map(|request| self.resolve(request.options, &request.task, &request.target))
            .collect();
        debug!("resolved {} targets", results.len());
        results
    }
}
