//! The template renderer, wrapping Tera.

use std::path::Path;

use serde_json::Value;
use tera::{Context, Tera};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("theme has no template named '{0}'")]
    TemplateNotFound(String),

    #[error("theme templates not found at: {0}")]
    ThemeNotFound(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Loads a theme's templates once and renders JSON contexts through them.
///
/// Template names map to files: a page asking for template `post` renders
/// `<theme>/templates/post.html`. Rendering is `&self` and thread-safe,
/// so the render worker pool shares one instance.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load every template under the theme's `templates` directory.
    pub fn new(theme_dir: &Path) -> Result<Self, RenderError> {
        let templates_dir = theme_dir.join("templates");
        if !templates_dir.is_dir() {
            return Err(RenderError::ThemeNotFound(
                templates_dir.display().to_string(),
            ));
        }

        let glob = templates_dir.join("**/*.html");
        let tera = Tera::new(&glob.to_string_lossy())?;

        Ok(Self { tera })
    }

    /// Fail fast if the theme does not map `name` to a loaded template.
    pub fn ensure_template(&self, name: &str) -> Result<(), RenderError> {
        let file = Self::template_file(name);
        if self.tera.get_template_names().any(|t| t == file) {
            Ok(())
        } else {
            Err(RenderError::TemplateNotFound(name.to_string()))
        }
    }

    /// Render the named template against a JSON object context.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        self.ensure_template(name)?;
        let context = Context::from_value(context.clone())?;
        Ok(self.tera.render(&Self::template_file(name), &context)?)
    }

    fn template_file(name: &str) -> String {
        format!("{name}.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn theme_with(templates: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("templates");
        std::fs::create_dir_all(&templates_dir).unwrap();
        for (name, body) in templates {
            std::fs::write(templates_dir.join(format!("{name}.html")), body).unwrap();
        }
        dir
    }

    #[test]
    fn test_missing_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Renderer::new(dir.path()),
            Err(RenderError::ThemeNotFound(_))
        ));
    }

    #[test]
    fn test_render_with_context() {
        let theme = theme_with(&[("page", "<h1>{{ page.title }}</h1>")]);
        let renderer = Renderer::new(theme.path()).unwrap();
        let html = renderer
            .render("page", &json!({"page": {"title": "Hello"}}))
            .unwrap();
        assert_eq!(html, "<h1>Hello</h1>");
    }

    #[test]
    fn test_unknown_template_fails() {
        let theme = theme_with(&[("page", "x")]);
        let renderer = Renderer::new(theme.path()).unwrap();
        assert!(matches!(
            renderer.ensure_template("missing"),
            Err(RenderError::TemplateNotFound(_))
        ));
    }
}
