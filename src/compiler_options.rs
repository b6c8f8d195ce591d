use log::debug;

use crate::{locate::ConfigDescriptor, options::EffectiveOptions, project_file::ProjectFile};

/// Compiler options spelled the same way in `tsconfig.json` and in the build
/// options. `outFile` is absent on purpose, it maps onto `out`.
///
/// See <https://www.typescriptlang.org/tsconfig> for their meaning.
pub const SAME_NAME_OPTIONS: &[&str] = &[
    "allowJs",
    "allowSyntheticDefaultImports",
    "allowUnreachableCode",
    "allowUnusedLabels",
    "alwaysStrict",
    "baseUrl",
    "charset",
    "declaration",
    "declarationDir",
    "diagnostics",
    "emitBOM",
    "emitDecoratorMetadata",
    "experimentalAsyncFunctions",
    "experimentalDecorators",
    "forceConsistentCasingInFileNames",
    "isolatedModules",
    "importHelpers",
    "inlineSourceMap",
    "inlineSources",
    "jsx",
    "jsxFactory",
    "lib",
    "listEmittedFiles",
    "listFiles",
    "locale",
    "mapRoot",
    "maxNodeModuleJsDepth",
    "module",
    "moduleResolution",
    "newLine",
    "noEmit",
    "noEmitHelpers",
    "noEmitOnError",
    "noFallthroughCasesInSwitch",
    "noImplicitAny",
    "noImplicitReturns",
    "noImplicitThis",
    "noImplicitUseStrict",
    "noLib",
    "noResolve",
    "noUnusedLocals",
    "noUnusedParameters",
    "out",
    "outDir",
    "preserveConstEnums",
    "pretty",
    "reactNamespace",
    "removeComments",
    "rootDir",
    "skipDefaultLibCheck",
    "sourceMap",
    "sourceRoot",
    "strictNullChecks",
    "stripInternal",
    "suppressExcessPropertyIndexErrors",
    "suppressImplicitAnyIndexErrors",
    "target",
    "traceResolution",
    "types",
    "typeRoots",
];

/// Copy the project file's compiler options into `options` without
/// overriding anything the build already sets. Skipped entirely when the
/// descriptor asks to ignore the file's settings.
pub fn copy_compiler_options(
    project: &ProjectFile,
    descriptor: &ConfigDescriptor,
    options: &mut EffectiveOptions,
) {
    let Some(file_options) = project.compiler_options.as_ref() else {
        return;
    };
    if descriptor.ignores_settings() {
        debug!("ignoring compiler options from the project file");
        return;
    }

    for &name in SAME_NAME_OPTIONS {
        if let Some(value) = file_options.get(name) {
            options
                .compiler_options
                .entry(name)
                .or_insert_with(|| value.clone());
        }
    }
    if let Some(out_file) = file_options.get("outFile") {
        options
            .compiler_options
            .entry("out")
            .or_insert_with(|| out_file.clone());
    }
}

/// Legacy glob tracking turns itself on only for project files that carry a
/// `filesGlob` and do not use `include`, unless the user decided explicitly.
pub fn derive_update_files(project: &ProjectFile, descriptor: &mut ConfigDescriptor) {
    if descriptor.update_files.is_none() {
        descriptor.update_files =
            Some(project.include.is_none() && project.files_glob.is_some());
    }
}
