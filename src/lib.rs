//! Merge a TypeScript project file (`tsconfig.json`) into the options of a
//! build task, and resolve the list of source files the compiler should be
//! handed.
//!
//! Three sources of configuration meet here: options set on a build task,
//! options set on one of its targets, and the project file on disk. Target
//! options override task options; both override the project file, whose
//! compiler options only fill in what the build leaves unset.
//!
//! Paths live in one of three frames:
//!
//! - relative to the build root (the build tool's working directory),
//! - relative to the directory holding the project file,
//! - absolute.
//!
//! Everything handed back to the caller is relative to the build root and
//! uses forward slashes.
//!
//! File sets follow the [tsconfig] rules for `files`, `include` and
//! `exclude`, falling back to `**/*.ts`, `**/*.d.ts` and `**/*.tsx` under
//! the project directory when neither `files` nor `include` is given. The
//! legacy `filesGlob` property is supported too: with `updateFiles` its
//! expansion is written back to the project file's `files`, and with
//! `overwriteFilesGlob` the build's own `src` globs replace it.
//!
//! Nothing is compiled. Template expansion and glob expansion are supplied
//! by the caller through [`TemplateProcessor`] and [`GlobExpander`];
//! [`GlobWalkExpander`] walks the filesystem and [`StubGlobExpander`] defers
//! globbing altogether.
//!
//! [tsconfig]: https://www.typescriptlang.org/tsconfig

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub mod compiler_options;
pub mod error;
pub mod expand;
pub mod file_set;
pub mod io;
pub mod locate;
pub mod options;
pub mod path;
pub mod project_file;
pub mod resolve;

pub use error::Error;
pub use expand::{GlobExpander, GlobWalkExpander, StubGlobExpander, TemplateProcessor, Verbatim};
pub use locate::ConfigDescriptor;
pub use options::{CompilationTask, EffectiveOptions, SourceSetting, TargetOptions, TsConfigSetting};
pub use project_file::ProjectFile;
pub use resolve::{Resolver, TargetRequest};
