mod common;

use std::{fs, path::Path};

use serde_json::{json, Value};
use tempfile::TempDir;
use tsconfig_resolve::{
    EffectiveOptions, GlobWalkExpander, Resolver, StubGlobExpander, TargetOptions, Verbatim,
};

use common::target;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn legacy_project() -> TempDir {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "tsconfig.json",
        r#"{"filesGlob": ["src/**/*.ts"], "compileOnSave": false}"#,
    );
    write(root.path(), "src/a.ts", "export const a = 1;");
    write(root.path(), "src/nested/b.ts", "export const b = 2;");
    root
}

#[test]
fn update_files_persists_expanded_glob_once() {
    let root = legacy_project();
    let expander = GlobWalkExpander::new(root.path());
    let resolver = Resolver::new(root.path(), &Verbatim, &expander);
    let config = root.path().join("tsconfig.json");
    let target = target(json!({"tsconfig": true}));

    let first = resolver
        .resolve(EffectiveOptions::default(), &TargetOptions::default(), &target)
        .unwrap();
    assert_eq!(first.tsconfig.as_ref().unwrap().update_files, Some(true));
    assert_eq!(first.compilation_tasks[0].src, ["src/a.ts", "src/nested/b.ts"]);

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.starts_with("{\n    \"filesGlob\""));
    assert_eq!(
        serde_json::from_str::<Value>(&written).unwrap(),
        json!({
            "filesGlob": ["src/**/*.ts"],
            "compileOnSave": false,
            "files": ["src/a.ts", "src/nested/b.ts"]
        })
    );

    // reformat by hand: an unchanged file set must not be written back
    let reformatted = serde_json::to_string(&read_json(&config)).unwrap();
    fs::write(&config, &reformatted).unwrap();
    let second = resolver
        .resolve(EffectiveOptions::default(), &TargetOptions::default(), &target)
        .unwrap();
    assert_eq!(second.compilation_tasks, first.compilation_tasks);
    assert_eq!(fs::read_to_string(&config).unwrap(), reformatted);
}

#[test]
fn stub_expander_never_rewrites() {
    let root = legacy_project();
    let resolver = Resolver::new(root.path(), &Verbatim, &StubGlobExpander);
    let config = root.path().join("tsconfig.json");
    let before = fs::read_to_string(&config).unwrap();

    let resolved = resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": "tsconfig.json"})),
        )
        .unwrap();
    assert_eq!(resolved.warnings.len(), 1);
    assert_eq!(fs::read_to_string(&config).unwrap(), before);
}

#[test]
fn explicit_update_files_false_is_respected() {
    let root = legacy_project();
    let expander = GlobWalkExpander::new(root.path());
    let resolver = Resolver::new(root.path(), &Verbatim, &expander);
    let config = root.path().join("tsconfig.json");
    let before = fs::read_to_string(&config).unwrap();

    resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": {"updateFiles": false}})),
        )
        .unwrap();
    assert_eq!(fs::read_to_string(&config).unwrap(), before);
}

#[test]
fn overwrite_files_glob_replaces_recorded_globs() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "app/tsconfig.json",
        r#"{"compilerOptions": {"target": "es5"}, "filesGlob": ["old/*.ts"], "files": ["old/x.ts"]}"#,
    );
    write(root.path(), "app/src/main.ts", "export {};");
    let expander = GlobWalkExpander::new(root.path());
    let resolver = Resolver::new(root.path(), &Verbatim, &expander);

    resolver
        .resolve(
            EffectiveOptions::default(),
            &target(json!({"src": ["app/src/**/*.ts"]})),
            &target(json!({"tsconfig": {
                "tsconfig": "app/tsconfig.json",
                "overwriteFilesGlob": true
            }})),
        )
        .unwrap();

    assert_eq!(
        read_json(&root.path().join("app/tsconfig.json")),
        json!({
            "compilerOptions": {"target": "es5"},
            "filesGlob": ["src/**/*.ts"],
            "files": ["src/main.ts"]
        })
    );
}

#[test]
fn overwrite_files_glob_without_src_is_fatal() {
    let root = legacy_project();
    let resolver = Resolver::new(root.path(), &Verbatim, &StubGlobExpander);
    let err = resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": {"overwriteFilesGlob": true}})),
        )
        .unwrap_err();
    assert!(matches!(err, tsconfig_resolve::Error::MissingGlobs));
}

#[test]
fn failed_rewrite_is_fatal() {
    let root = legacy_project();
    let config = root.path().join("tsconfig.json");
    let mut permissions = fs::metadata(&config).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&config, permissions).unwrap();
    if fs::OpenOptions::new().write(true).open(&config).is_ok() {
        // privileged users write through read-only permissions
        return;
    }

    let expander = GlobWalkExpander::new(root.path());
    let resolver = Resolver::new(root.path(), &Verbatim, &expander);
    let err = resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": true})),
        )
        .unwrap_err();
    match err {
        tsconfig_resolve::Error::UpdateProjectFile { path, .. } => assert_eq!(path, config),
        other => panic!("Unexpected error: {:?}", other),
    }
}
