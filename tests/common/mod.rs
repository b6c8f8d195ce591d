#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use tsconfig_resolve::{GlobExpander, TargetOptions};

pub fn test_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

pub fn fixture(relative: &str) -> String {
    test_data().join(relative).to_string_lossy().replace('\\', "/")
}

pub fn target(value: serde_json::Value) -> TargetOptions {
    serde_json::from_value(value).expect("target options should deserialize")
}

/// Records every call and answers each one with the same canned matches.
#[derive(Debug, Default)]
pub struct RecordingExpander {
    matches: Vec<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExpander {
    pub fn returning<I, S>(matches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matches: matches.into_iter().map(Into::into).collect(),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GlobExpander for RecordingExpander {
    fn expand(&self, patterns: &[String]) -> Vec<String> {
        self.calls.lock().unwrap().push(patterns.to_vec());
        self.matches.clone()
    }
}
