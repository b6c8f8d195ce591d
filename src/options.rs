use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{expand::TemplateProcessor, locate::ConfigDescriptor};

/// A `src` setting: one glob, or an arbitrarily nested list of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSetting {
    One(String),
    Many(Vec<SourceSetting>),
}

impl SourceSetting {
    /// Depth-first, order-preserving flattening.
    pub fn flatten(&self) -> Vec<&str> {
        let mut flat = Vec::new();
        self.flatten_into(&mut flat);
        flat
    }

    fn flatten_into<'a>(&'a self, flat: &mut Vec<&'a str>) {
        match self {
            Self::One(glob) => flat.push(glob),
            Self::Many(settings) => settings
                .iter()
                .for_each(|setting| setting.flatten_into(flat)),
        }
    }
}

/// The raw `tsconfig` setting as a user writes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TsConfigSetting {
    Flag(bool),
    Path(String),
    Options(ConfigDescriptor),
}

/// The options of a task or of one of its targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<SourceSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsconfig: Option<TsConfigSetting>,
}

/// One compiler invocation to be made for a target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationTask {
    #[serde(default)]
    pub src: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

/// The build options the resolver merges a project file into.
///
/// Compiler flags live at the top level next to the bookkeeping fields,
/// keyed by their tsconfig names (`allowJs`, `out`, `target`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveOptions {
    #[serde(rename = "CompilationTasks", default)]
    pub compilation_tasks: Vec<CompilationTask>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsconfig: Option<ConfigDescriptor>,
    #[serde(flatten)]
    pub compiler_options: Map<String, Value>,
}

impl EffectiveOptions {
    /// Whether JavaScript sources may be part of the compilation.
    pub fn allow_js(&self) -> bool {
        self.compiler_options
            .get("allowJs")
            .map(is_truthy)
            .unwrap_or(false)
    }

    pub(crate) fn ensure_compilation_task(&mut self) {
        if self.compilation_tasks.is_empty() {
            self.compilation_tasks.push(CompilationTask::default());
        }
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Build-root-relative source globs, template-expanded. The target's `src`
/// replaces the task's outright; `None` when neither defines one.
pub fn collect_globs(
    task: &TargetOptions,
    target: &TargetOptions,
    templates: &dyn TemplateProcessor,
) -> Option<Vec<String>> {
    target.src.as_ref().or(task.src.as_ref()).map(|src| {
        src.flatten()
            .into_iter()
            .map(|glob| templates.process(glob))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::expand::Verbatim;

    fn options(value: Value) -> TargetOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn target_src_replaces_task_src() {
        let task = options(json!({"src": ["a/**/*.ts", "b/*.ts"]}));
        let target = options(json!({"src": "c/*.ts"}));
        assert_eq!(
            collect_globs(&task, &target, &Verbatim),
            Some(vec!["c/*.ts".to_owned()])
        );
        assert_eq!(
            collect_globs(&task, &TargetOptions::default(), &Verbatim),
            Some(vec!["a/**/*.ts".to_owned(), "b/*.ts".to_owned()])
        );
        assert_eq!(
            collect_globs(&TargetOptions::default(), &TargetOptions::default(), &Verbatim),
            None
        );
    }

    #[test]
    fn nested_src_flattens_in_order_through_templates() {
        let target = options(json!({"src": ["<%= app %>/a.ts", [["b.ts"], "c.ts"]]}));
        let templates = |template: &str| template.replace("<%= app %>", "app");
        assert_eq!(
            collect_globs(&TargetOptions::default(), &target, &templates),
            Some(vec![
                "app/a.ts".to_owned(),
                "b.ts".to_owned(),
                "c.ts".to_owned()
            ])
        );
    }

    #[test]
    fn effective_options_keep_compiler_flags_at_top_level() {
        let parsed: EffectiveOptions = serde_json::from_value(json!({
            "CompilationTasks": [{"src": ["a.ts"], "outDir": "built"}],
            "allowJs": true,
            "target": "es5"
        }))
        .unwrap();
        assert!(parsed.allow_js());
        assert_eq!(parsed.compilation_tasks[0].out_dir.as_deref(), Some("built"));
        assert_eq!(parsed.compiler_options.get("target"), Some(&json!("es5")));
        assert!(!parsed.compiler_options.contains_key("warnings"));
    }
}
