//! Splitting a raw content file into frontmatter and body.

use serde_json::{Map, Value};

/// Errors that reject one content file without aborting the build.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing closing delimiter in frontmatter")]
    UnclosedFrontmatter,

    #[error("malformed frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping of fields to values")]
    NonMappingFrontmatter,
}

/// The two logical sections of a content file.
#[derive(Debug)]
pub struct RawDocument {
    /// Parsed frontmatter fields; `None` when the file has no delimiter.
    pub frontmatter: Option<Map<String, Value>>,
    /// Markdown body, trimmed.
    pub body: String,
}

const DELIMITER: &str = "---";

/// Extract frontmatter and body from raw content.
///
/// Frontmatter is a mapping between two `---` markers at the top of the
/// file:
///
/// ```markdown
/// ---
/// title: My Post
/// tags: [rust]
/// ---
///
/// Body starts here.
/// ```
///
/// A document without an opening marker is all body. An opening marker
/// without a closing one is an error for that file only.
pub fn extract(raw: &str) -> Result<RawDocument, PageError> {
    let trimmed = raw.trim_start();

    if !trimmed.starts_with(DELIMITER) {
        return Ok(RawDocument {
            frontmatter: None,
            body: raw.trim().to_string(),
        });
    }

    let after_opening = &trimmed[DELIMITER.len()..];
    let closing = after_opening
        .find(&format!("\n{DELIMITER}"))
        .ok_or(PageError::UnclosedFrontmatter)?;

    let frontmatter_raw = &after_opening[..closing];
    let body = &after_opening[closing + 1 + DELIMITER.len()..];

    Ok(RawDocument {
        frontmatter: Some(parse_frontmatter(frontmatter_raw)?),
        body: body.trim().to_string(),
    })
}

/// Parse the metadata block into a JSON object. YAML is a superset of the
/// JSON frontmatter older sites carry, so both forms load through here.
fn parse_frontmatter(raw: &str) -> Result<Map<String, Value>, PageError> {
    let value: Value = serde_yaml::from_str(raw)?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(PageError::NonMappingFrontmatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_frontmatter() {
        let doc = extract("---\ntitle: A\ntags: [rust, ssg]\n---\n\nHello\n").unwrap();
        let fm = doc.frontmatter.unwrap();
        assert_eq!(fm["title"], "A");
        assert_eq!(fm["tags"], serde_json::json!(["rust", "ssg"]));
        assert_eq!(doc.body, "Hello");
    }

    #[test]
    fn test_extract_json_frontmatter() {
        let doc = extract("---\n{\"title\": \"A\"}\n---\nBody").unwrap();
        assert_eq!(doc.frontmatter.unwrap()["title"], "A");
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_no_delimiter_is_body_only() {
        let doc = extract("# Just Markdown\n\nNo frontmatter here.\n").unwrap();
        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.body, "# Just Markdown\n\nNo frontmatter here.");
    }

    #[test]
    fn test_unclosed_frontmatter_is_rejected() {
        let err = extract("---\ntitle: A\n\nHello\n").unwrap_err();
        assert!(matches!(err, PageError::UnclosedFrontmatter));
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let doc = extract("---\n---\n\n# Content").unwrap();
        assert_eq!(doc.frontmatter.unwrap().len(), 0);
        assert_eq!(doc.body, "# Content");
    }

    #[test]
    fn test_scalar_frontmatter_is_rejected() {
        let err = extract("---\njust a string\n---\nBody").unwrap_err();
        assert!(matches!(err, PageError::NonMappingFrontmatter));
    }

    #[test]
    fn test_leading_whitespace_before_delimiter() {
        let doc = extract("\n\n---\ntitle: A\n---\nBody").unwrap();
        assert_eq!(doc.frontmatter.unwrap()["title"], "A");
    }
}
