//! Key-path access over a JSON object tree.
//!
//! Site config, theme config, and per-page frontmatter all merge into one
//! `serde_json::Value` tree. `DataTree` wraps that value with key-path
//! get/set/push operations so callers never index into raw maps.

use serde_json::{Map, Value};

/// A JSON object tree addressed by key paths.
///
/// `set` creates intermediate objects as needed; `get` returns `None` for
/// any missing or non-object segment along the path.
#[derive(Debug, Clone)]
pub struct DataTree {
    root: Value,
}

impl Default for DataTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTree {
    /// An empty object tree.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// The full tree as a JSON value.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Look up a value by key path.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.root;
        for key in path {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    /// Look up a string by key path.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Whether a value exists at the key path.
    pub fn has(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    /// Set a value at the key path, creating intermediate objects.
    /// Non-object values along the way are replaced.
    pub fn set(&mut self, path: &[&str], value: Value) {
        let mut current = &mut self.root;
        for key in path {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
                // the branch above just made this an object
                _ => unreachable!(),
            };
        }
        *current = value;
    }

    /// Append a value to the array at the key path, creating the array
    /// (and replacing any non-array value) if needed.
    pub fn push(&mut self, path: &[&str], value: Value) {
        match self.get(path) {
            Some(Value::Array(_)) => {}
            _ => self.set(path, Value::Array(Vec::new())),
        }
        if let Some(Value::Array(items)) = self.get_mut(path) {
            items.push(value);
        }
    }

    fn get_mut(&mut self, path: &[&str]) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for key in path {
            current = current.as_object_mut()?.get_mut(*key)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut tree = DataTree::new();
        tree.set(&["site", "url"], json!("https://example.com"));
        assert_eq!(tree.get_str(&["site", "url"]), Some("https://example.com"));
        assert!(tree.get(&["site"]).is_some_and(Value::is_object));
    }

    #[test]
    fn test_get_missing_path() {
        let tree = DataTree::new();
        assert_eq!(tree.get(&["site", "url"]), None);
        assert!(!tree.has(&["site"]));
    }

    #[test]
    fn test_get_through_non_object() {
        let mut tree = DataTree::new();
        tree.set(&["site", "url"], json!("https://example.com"));
        assert_eq!(tree.get(&["site", "url", "deeper"]), None);
    }

    #[test]
    fn test_push_creates_array() {
        let mut tree = DataTree::new();
        tree.push(&["site", "pages"], json!({"title": "a"}));
        tree.push(&["site", "pages"], json!({"title": "b"}));
        let pages = tree.get(&["site", "pages"]).and_then(Value::as_array);
        assert_eq!(pages.map(Vec::len), Some(2));
    }

    #[test]
    fn test_push_replaces_non_array() {
        let mut tree = DataTree::new();
        tree.set(&["pages"], json!("not an array"));
        tree.push(&["pages"], json!(1));
        assert_eq!(tree.get(&["pages"]), Some(&json!([1])));
    }

    #[test]
    fn test_set_overwrites() {
        let mut tree = DataTree::new();
        tree.set(&["a"], json!(1));
        tree.set(&["a"], json!(2));
        assert_eq!(tree.get(&["a"]), Some(&json!(2)));
    }
}
