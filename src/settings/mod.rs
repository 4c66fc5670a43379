//! Managed editor settings
//!
//! Settings are flat maps of dotted keys (`python.linting.enabled`) to a
//! small set of value shapes. Anything else found in a user file is kept
//! as an opaque JSON value so it survives a rewrite untouched.

mod catalog;

pub use catalog::{
    compile_commands_path, CatalogInputs, SettingsCatalog, BROWSE_PATH_KEY, DEFAULT_RECOMMENDATIONS,
    INCLUDE_PATH_KEY,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    StringList(Vec<String>),
    StringListList(Vec<Vec<String>>),
    /// Passthrough for shapes the catalog never produces itself
    Other(Value),
}

impl SettingValue {
    /// Build a string list from borrowed items
    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        SettingValue::StringList(items.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Items of a string list value
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::StringList(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<u64> for SettingValue {
    fn from(value: u64) -> Self {
        SettingValue::Number(value.into())
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::StringList(value)
    }
}

impl From<Value> for SettingValue {
    fn from(value: Value) -> Self {
        // Re-read through serde so plain shapes land in their own variant
        serde_json::from_value(value.clone()).unwrap_or(SettingValue::Other(value))
    }
}

/// One concern's group of managed settings
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsFragment {
    name: &'static str,
    entries: BTreeMap<String, SettingValue>,
}

impl SettingsFragment {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_shapes() {
        let parse = |v: Value| serde_json::from_value::<SettingValue>(v).unwrap();

        assert_eq!(parse(json!(true)), SettingValue::Bool(true));
        assert_eq!(parse(json!(120)), SettingValue::from(120u64));
        assert_eq!(parse(json!("x")), SettingValue::from("x"));
        assert_eq!(parse(json!(["a", "b"])), SettingValue::strings(&["a", "b"]));
        assert_eq!(parse(json!([])), SettingValue::StringList(vec![]));
        assert_eq!(
            parse(json!([["a"], ["b", "c"]])),
            SettingValue::StringListList(vec![vec!["a".into()], vec!["b".into(), "c".into()]])
        );
    }

    #[test]
    fn test_unknown_shapes_pass_through() {
        let nested = json!({"editor.tabSize": 4});
        let value: SettingValue = serde_json::from_value(nested.clone()).unwrap();
        assert_eq!(value, SettingValue::Other(nested.clone()));
        assert_eq!(serde_json::to_value(&value).unwrap(), nested);

        let mixed = json!(["a", 1]);
        let value: SettingValue = serde_json::from_value(mixed.clone()).unwrap();
        assert_eq!(value, SettingValue::Other(mixed));

        let null: SettingValue = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(null, SettingValue::Other(Value::Null));
    }

    #[test]
    fn test_from_json_value_normalizes() {
        assert_eq!(SettingValue::from(json!("x")), SettingValue::from("x"));
        assert!(matches!(SettingValue::from(json!({"a": 1})), SettingValue::Other(_)));
    }

    #[test]
    fn test_fragment_builder() {
        let fragment = SettingsFragment::new("editor")
            .with("files.autoSave", "afterDelay")
            .with("editor.detectIndentation", false);

        assert_eq!(fragment.name(), "editor");
        assert_eq!(fragment.len(), 2);
        assert_eq!(
            fragment.get("files.autoSave").and_then(|v| v.as_str()),
            Some("afterDelay")
        );
    }
}
