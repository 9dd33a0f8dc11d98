//! YAML front matter splitting.
//!
//! Top-level scalar fields are kept; sequences and nested mappings are ignored.

use log::warn;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Metadata block at the top of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    /// Value of a top-level scalar field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Document title, if declared.
    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Splits a leading `---` delimited block from the markdown body.
///
/// Text without a closed block is returned whole as body.
///
/// ```
/// use gitdocs::split_front_matter;
///
/// let (meta, body) = split_front_matter("---\ntitle: Setup\n---\n# Setup\n");
/// assert_eq!(meta.title(), Some("Setup"));
/// assert_eq!(body, "# Setup\n");
/// ```
pub fn split_front_matter(text: &str) -> (FrontMatter, &str) {
    let Some(rest) = strip_delimiter(text) else {
        return (FrontMatter::default(), text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (parse_fields(block), body);
        }
        offset += line.len();
    }

    (FrontMatter::default(), text)
}

/// Strips an opening `---` line.
fn strip_delimiter(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_fields(block: &str) -> FrontMatter {
    if block.trim().is_empty() {
        return FrontMatter::default();
    }

    let mapping: Mapping = match serde_yaml::from_str(block) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!("Ignoring malformed front matter: {}", e);
            return FrontMatter::default();
        }
    };

    let fields = mapping
        .iter()
        .filter_map(|(key, value)| Some((key.as_str()?.to_string(), scalar(value)?)))
        .collect();

    FrontMatter { fields }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
