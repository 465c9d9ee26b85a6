use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::SchemaError;

/// Documentation of a single host API method.
///
/// `text` may contain positional placeholders `{0}`, `{1}`, ... that refer to
/// the method's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KDoc {
    pub text: String,
    pub parameter_names: Vec<String>,
}

impl KDoc {
    pub fn new(text: impl Into<String>, parameter_names: Vec<String>) -> Self {
        Self {
            text: text.into(),
            parameter_names,
        }
    }

    /// Replaces every `{i}` placeholder with a link to `parameters[i]`.
    pub fn expand(&self, parameters: &[String]) -> String {
        let mut text = self.text.clone();
        for (i, name) in parameters.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), &format!("[{}]", name));
        }
        text
    }

    /// Renders the documentation block, with `notice` appended as the last
    /// paragraph.
    pub fn format(&self, parameters: &[String], notice: &str) -> String {
        format_block(&self.expand(parameters), notice)
    }
}

/// Renders a `/** ... */` block out of a summary and a trailing notice.
pub fn format_block(summary: &str, notice: &str) -> String {
    let mut out = String::from("/**\n");
    let summary = summary.trim();
    if !summary.is_empty() {
        for line in summary.lines() {
            push_doc_line(&mut out, line);
        }
        out.push_str(" *\n");
    }
    for line in notice.lines() {
        push_doc_line(&mut out, line);
    }
    out.push_str(" */\n");
    out
}

fn push_doc_line(out: &mut String, line: &str) {
    let line = line.trim_end().replace("*/", "*&#47;");
    if line.is_empty() {
        out.push_str(" *\n");
    } else {
        out.push_str(" * ");
        out.push_str(&line);
        out.push('\n');
    }
}

/// Documentation lookup keyed by `"Owner.method(paramType1,paramType2)"`.
pub trait KDocProvider {
    fn kdoc_for(&self, signature_key: &str) -> Option<&KDoc>;
}

/// In-memory documentation index, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KDocIndex {
    entries: HashMap<String, KDoc>,
}

impl KDocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signature_key: impl Into<String>, kdoc: KDoc) {
        self.entries.insert(signature_key.into(), kdoc);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SchemaError> {
        let bytes = fs::read(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl KDocProvider for KDocIndex {
    fn kdoc_for(&self, signature_key: &str) -> Option<&KDoc> {
        self.entries.get(signature_key)
    }
}

/// Builds the documentation lookup key of a method.
pub fn signature_key(owner: &str, method: &str, parameter_types: &[String]) -> String {
    format!(
        "{}.{}({})",
        owner.replace('$', "."),
        method,
        parameter_types.join(",")
    )
}
