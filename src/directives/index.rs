//! The index directive and the shared pagination primitive.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::build::Renderer;
use crate::data::DataTree;
use crate::{error, info, util, warn};

use super::{Directive, DirectiveError};

/// Renders chronological listings of all indexable pages into the site
/// output root, `count` pages per chunk.
pub struct Index;

impl Directive for Index {
    fn init(
        &self,
        site: &DataTree,
        directive: &Value,
        renderer: &Renderer,
        output_dir: &Path,
    ) -> Result<(), DirectiveError> {
        let name = directive_name(directive, "index");
        let count = require_count(directive, &name)?;

        let Some(pages) = site.get(&["site", "pages"]).and_then(Value::as_array) else {
            warn!("no pages available for index directive");
            return Ok(());
        };

        let indexable: Vec<Value> = pages
            .iter()
            .filter(|page| {
                // missing or non-bool counts as not indexable
                page.get("indexable").and_then(Value::as_bool).unwrap_or(false)
            })
            .cloned()
            .collect();

        if indexable.is_empty() {
            warn!("index directive found no indexable pages to render");
            return Ok(());
        }

        render_paginated(
            renderer,
            &name,
            site.as_value(),
            &indexable,
            count,
            output_dir,
            None,
        )
    }
}

/// Pagination metadata exposed to templates as `index.*`.
#[derive(Debug, Serialize)]
struct PaginationInfo {
    page_number: usize,
    total_pages: usize,
    has_previous: bool,
    has_next: bool,
    /// Total number of pages across all chunks.
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page: Option<usize>,
}

/// Hook letting a caller add directive-specific keys to each chunk's
/// render context. Arguments: context map, chunk index, total chunks.
pub type Augment<'a> = &'a dyn Fn(&mut Map<String, Value>, usize, usize);

/// Slice `pages` into chunks of `count` and render one output unit per
/// chunk through `template`.
///
/// Every chunk is written to `<n>/index.html` and `pages/<n>/index.html`
/// (1-based `n`); chunk 0 is additionally written to the un-numbered root
/// `index.html`, all three byte-identical. Zero pages is a no-op, not an
/// error; a non-positive count is a contract violation caught upstream by
/// [`require_count`], and guarded here again for direct callers.
pub fn render_paginated(
    renderer: &Renderer,
    template: &str,
    base: &Value,
    pages: &[Value],
    count: usize,
    output_dir: &Path,
    augment: Option<Augment<'_>>,
) -> Result<(), DirectiveError> {
    if pages.is_empty() {
        warn!("pagination for '{template}' received no pages to render");
        return Ok(());
    }
    if count == 0 {
        return Err(DirectiveError::InvalidCount(template.to_string()));
    }

    let total_chunks = pages.len().div_ceil(count);

    for idx in 0..total_chunks {
        let start = idx * count;
        let end = usize::min(start + count, pages.len());
        let subset = Value::Array(pages[start..end].to_vec());

        let mut context = match base.clone() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        context.insert("pages".to_string(), subset.clone());
        if let Some(site) = context.get_mut("site").and_then(Value::as_object_mut) {
            site.insert("pages".to_string(), subset);
        }

        let info = PaginationInfo {
            page_number: idx + 1,
            total_pages: total_chunks,
            has_previous: idx > 0,
            has_next: idx + 1 < total_chunks,
            count: pages.len(),
            previous_page: (idx > 0).then_some(idx),
            next_page: (idx + 1 < total_chunks).then_some(idx + 2),
        };
        context.insert(
            "index".to_string(),
            serde_json::to_value(&info).unwrap_or_default(),
        );
        context.insert("page_number".to_string(), Value::from(idx + 1));

        if let Some(augment) = augment {
            augment(&mut context, idx, total_chunks);
        }

        let rendered = renderer.render(template, &Value::Object(context))?;

        let chunk_number = (idx + 1).to_string();
        let mut targets = vec![
            output_dir.join(&chunk_number).join("index.html"),
            output_dir.join("pages").join(&chunk_number).join("index.html"),
        ];
        if idx == 0 {
            targets.insert(0, output_dir.join("index.html"));
        }

        for target in targets {
            match util::output_file(&rendered, &target) {
                Ok(()) => info!("wrote {}", target.display()),
                Err(e) => error!("failed to write {}: {e}", target.display()),
            }
        }
    }

    Ok(())
}

/// The directive's configured name, doubling as its template name.
pub(super) fn directive_name(directive: &Value, fallback: &str) -> String {
    directive
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// A mandatory positive integer `count`.
fn require_count(directive: &Value, name: &str) -> Result<usize, DirectiveError> {
    let count = directive
        .get("count")
        .ok_or_else(|| DirectiveError::MissingCount(name.to_string()))?;
    parse_count(count, name)
}

/// Validate an already-present `count` value.
pub(super) fn parse_count(count: &Value, name: &str) -> Result<usize, DirectiveError> {
    count
        .as_i64()
        .filter(|c| *c > 0)
        .map(|c| c as usize)
        .ok_or_else(|| DirectiveError::InvalidCount(name.to_string()))
}
