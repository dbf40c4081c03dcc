//! A single page: its data tree, validation defaults, and rendering.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde_json::{Value, json};

use crate::data::DataTree;
use crate::{info, warn};

use super::render::{RenderError, Renderer};

/// Date format carried in page frontmatter: `DD-MM-YYYY HH:MM`.
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_DESCRIPTION: &str = "";

/// Fatal per-page configuration errors raised during validation.
/// Unlike parse-phase errors these abort the whole build.
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("page {page} names no template and the theme has no default")]
    MissingTemplate { page: PathBuf },

    #[error("page {page} has malformed date '{date}' (expected DD-MM-YYYY HH:MM)")]
    InvalidDate { page: PathBuf, date: String },
}

/// A parsed content file on its way to becoming an output artifact.
///
/// `data` is the page's JSON object: frontmatter fields plus `content`,
/// `path` and `url` from the parse phase, and the validated fields
/// (`title`, `date`, `timestamp`, ...) after [`Page::validate`].
#[derive(Debug, Clone)]
pub struct Page {
    source: PathBuf,
    data: Value,
}

impl Page {
    pub fn new(data: Value, source: PathBuf) -> Self {
        Self { source, data }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Apply defaults and derive the sortable timestamp.
    ///
    /// Missing title/description are advisory (defaulted with a warning);
    /// a missing template with no theme default, or a malformed date, is
    /// fatal for the whole build.
    pub fn validate(&mut self, default_template: Option<&str>) -> Result<(), ValidationError> {
        if self.data.get("title").is_none() {
            warn!(
                "no title in frontmatter of {}, defaulting to '{DEFAULT_TITLE}'",
                self.source.display()
            );
            self.data["title"] = json!(DEFAULT_TITLE);
        }

        if self.data.get("description").is_none() {
            warn!(
                "no description in frontmatter of {}, defaulting to empty",
                self.source.display()
            );
            self.data["description"] = json!(DEFAULT_DESCRIPTION);
        }

        if self.data.get("date").is_none() {
            let now = Local::now().format(DATE_FORMAT).to_string();
            self.data["date"] = json!(now);
        }

        if self.data.get("indexable").is_none() {
            self.data["indexable"] = json!(true);
        }

        if self.data.get("show_description").is_none() {
            self.data["show_description"] = json!(false);
        }

        if self.data.get("template").is_none() {
            let default = default_template.ok_or_else(|| ValidationError::MissingTemplate {
                page: self.source.clone(),
            })?;
            self.data["template"] = json!(default);
        }

        let date = self
            .data
            .get("date")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parsed = NaiveDateTime::parse_from_str(&date, DATE_FORMAT).map_err(|_| {
            ValidationError::InvalidDate {
                page: self.source.clone(),
                date: date.clone(),
            }
        })?;
        self.data["timestamp"] = json!(parsed.and_utc().timestamp());

        Ok(())
    }

    /// The template name resolved by validation.
    pub fn template(&self) -> Option<&str> {
        self.data.get("template").and_then(Value::as_str)
    }

    /// Render this page against the full site tree and write it to its
    /// resolved output path. With `live_reload` set, the reload snippet
    /// lands just before the closing body tag.
    pub fn render(
        &self,
        site: &DataTree,
        renderer: &Renderer,
        live_reload: Option<&str>,
    ) -> Result<PathBuf, RenderError> {
        let template = self.template().unwrap_or_default();

        let mut context = site.as_value().clone();
        context["page"] = self.data.clone();

        let mut html = renderer.render(template, &context)?;
        if let Some(snippet) = live_reload {
            html = inject_live_reload(html, snippet);
        }

        let output_path = PathBuf::from(
            self.data
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        crate::util::output_file(&html, &output_path).map_err(|source| RenderError::Write {
            path: output_path.clone(),
            source,
        })?;
        info!("wrote {}", output_path.display());

        Ok(output_path)
    }
}

/// Insert `snippet` before the last `</body>` (matched case-insensitively),
/// or append it when the document has no closing body tag.
fn inject_live_reload(mut html: String, snippet: &str) -> String {
    let lowered = html.to_ascii_lowercase();
    match lowered.rfind("</body>") {
        Some(pos) => {
            html.insert_str(pos, snippet);
            html
        }
        None => {
            html.push_str(snippet);
            html
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(data: Value) -> Page {
        Page::new(data, PathBuf::from("content/post.md"))
    }

    #[test]
    fn test_validate_applies_defaults() {
        let mut page = page(json!({"content": "<p>x</p>"}));
        page.validate(Some("page")).unwrap();

        assert_eq!(page.data()["title"], "Untitled");
        assert_eq!(page.data()["description"], "");
        assert_eq!(page.data()["indexable"], true);
        assert_eq!(page.data()["show_description"], false);
        assert_eq!(page.data()["template"], "page");
        assert!(page.data()["date"].is_string());
        assert!(page.data()["timestamp"].is_i64());
    }

    #[test]
    fn test_validate_keeps_frontmatter_values() {
        let mut page = page(json!({
            "title": "A",
            "indexable": false,
            "template": "post",
            "date": "02-01-2021 10:30",
        }));
        page.validate(Some("page")).unwrap();

        assert_eq!(page.data()["title"], "A");
        assert_eq!(page.data()["indexable"], false);
        assert_eq!(page.data()["template"], "post");
        let expected = NaiveDateTime::parse_from_str("02-01-2021 10:30", DATE_FORMAT)
            .unwrap()
            .and_utc()
            .timestamp();
        assert_eq!(page.data()["timestamp"], json!(expected));
    }

    #[test]
    fn test_defaulted_date_round_trips_to_timestamp() {
        let mut page = page(json!({"title": "A"}));
        page.validate(Some("page")).unwrap();

        let date = page.data()["date"].as_str().unwrap();
        let expected = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
            .unwrap()
            .and_utc()
            .timestamp();
        assert_eq!(page.data()["timestamp"], json!(expected));
    }

    #[test]
    fn test_missing_template_without_default_is_fatal() {
        let mut page = page(json!({"title": "A"}));
        let err = page.validate(None).unwrap_err();
        assert!(matches!(err, ValidationError::MissingTemplate { .. }));
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let mut page = page(json!({"date": "2021-01-02"}));
        let err = page.validate(Some("page")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn test_inject_before_last_body_tag() {
        let html = "<body><p></body>ignored</BODY>".to_string();
        let out = inject_live_reload(html, "<script>r()</script>");
        assert_eq!(out, "<body><p></body>ignored<script>r()</script></BODY>");
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let out = inject_live_reload("<p>no body</p>".to_string(), "<s/>");
        assert_eq!(out, "<p>no body</p><s/>");
    }
}
