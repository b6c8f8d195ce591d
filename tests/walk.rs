mod common;

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use tsconfig_resolve::{
    EffectiveOptions, GlobExpander, GlobWalkExpander, Resolver, TargetOptions, Verbatim,
};

use common::{fixture, target, test_data};

#[test]
fn relative_patterns_yield_relative_matches() {
    let expander = GlobWalkExpander::new(test_data());
    let matches = expander.expand(&[
        String::from("empty/**/*.ts"),
        String::from("!empty/node_modules/**"),
    ]);
    assert_eq!(matches, ["empty/src/index.ts", "empty/src/types.d.ts"]);
}

#[test]
fn absolute_patterns_yield_absolute_matches_in_pattern_order() {
    let expander = GlobWalkExpander::new(test_data());
    let matches = expander.expand(&[
        fixture("empty/**/*.d.ts"),
        fixture("empty/**/*.ts"),
        format!("!{}", fixture("empty/node_modules/**")),
    ]);
    assert_eq!(
        matches,
        [
            fixture("empty/src/types.d.ts"),
            fixture("empty/src/index.ts")
        ]
    );
}

#[test]
fn patterns_outside_the_root_are_skipped() {
    let expander = GlobWalkExpander::new(test_data().join("empty"));
    let matches = expander.expand(&[String::from("../files-list/*.ts")]);
    assert!(matches.is_empty());
}

#[test]
fn empty_project_resolves_against_the_filesystem() {
    let expander = GlobWalkExpander::new(test_data());
    let resolver = Resolver::new(test_data(), &Verbatim, &expander);
    let resolved = resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": "empty"})),
        )
        .unwrap();
    assert_eq!(
        resolved.compilation_tasks[0].src,
        ["empty/src/index.ts", "empty/src/types.d.ts"]
    );
}

#[test]
fn allow_js_picks_up_javascript_sources() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("src")).unwrap();
    fs::write(
        root.path().join("tsconfig.json"),
        r#"{"compilerOptions": {"allowJs": true}}"#,
    )
    .unwrap();
    fs::write(root.path().join("src/a.ts"), "export const a = 1;").unwrap();
    fs::write(root.path().join("src/b.js"), "exports.b = 2;").unwrap();

    let expander = GlobWalkExpander::new(root.path());
    let resolver = Resolver::new(root.path(), &Verbatim, &expander);
    let resolved = resolver
        .resolve(
            EffectiveOptions::default(),
            &TargetOptions::default(),
            &target(json!({"tsconfig": true})),
        )
        .unwrap();
    assert_eq!(resolved.compilation_tasks[0].src, ["src/a.ts", "src/b.js"]);
}
