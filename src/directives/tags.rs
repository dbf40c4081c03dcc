//! The tags directive: groups pages by normalized tag slug and renders a
//! paginated archive per group under `output/tags/<slug>/`.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::build::Renderer;
use crate::data::DataTree;
use crate::warn;

use super::index::{directive_name, parse_count, render_paginated};
use super::{Directive, DirectiveError};

/// Slug used when normalization strips a tag down to nothing.
const FALLBACK_SLUG: &str = "tag";

/// Pages sharing one normalized tag.
#[derive(Debug, Clone, Serialize)]
pub struct TagGroup {
    /// Display name: the tag spelling first seen on a page.
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub pages: Vec<Value>,
}

/// Normalize a tag to its slug: ASCII-lowercased, runs of anything
/// non-alphanumeric collapsed to single hyphens, no leading or trailing
/// hyphen. `"C++ Tips!"` becomes `"c-tips"`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Group pages by normalized tag slug, sorted ascending by display name.
/// A page may appear under several tags; pages without a `tags` array are
/// skipped, as are non-string tag entries.
pub fn collect_tag_groups(pages: &[Value]) -> Vec<TagGroup> {
    let mut by_slug: HashMap<String, TagGroup> = HashMap::new();

    for page in pages {
        let Some(tags) = page.get("tags").and_then(Value::as_array) else {
            continue;
        };
        for tag in tags {
            let Some(name) = tag.as_str() else { continue };
            let slug = slugify(name);
            let group = by_slug.entry(slug.clone()).or_insert_with(|| TagGroup {
                name: name.to_string(),
                slug,
                count: 0,
                pages: Vec::new(),
            });
            group.pages.push(page.clone());
            group.count += 1;
        }
    }

    let mut groups: Vec<TagGroup> = by_slug.into_values().collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));
    groups
}

/// Renders one paginated listing per tag group. Chunk size is the
/// directive's `count` when configured (must be positive), otherwise each
/// group renders as a single unpaginated page.
pub struct Tags;

impl Directive for Tags {
    fn init(
        &self,
        site: &DataTree,
        directive: &Value,
        renderer: &Renderer,
        output_dir: &Path,
    ) -> Result<(), DirectiveError> {
        let name = directive_name(directive, "tags");

        let configured_count = directive
            .get("count")
            .map(|count| parse_count(count, &name))
            .transpose()?;

        let Some(groups) = site.get(&["site", "tags"]).and_then(Value::as_array) else {
            warn!("no tag groups available for tags directive");
            return Ok(());
        };
        if groups.is_empty() {
            warn!("tags directive found no tags to render");
            return Ok(());
        }

        let tags_dir = output_dir.join("tags");

        for group in groups {
            let Some(pages) = group.get("pages").and_then(Value::as_array) else {
                continue;
            };
            if pages.is_empty() {
                continue;
            }
            let Some(slug) = group.get("slug").and_then(Value::as_str) else {
                continue;
            };

            let count = configured_count.unwrap_or(pages.len());
            let group_dir = tags_dir.join(slug);

            let augment = |context: &mut Map<String, Value>, _idx: usize, _total: usize| {
                let mut tag = group.clone();
                // the tag's page list mirrors the current chunk
                tag["pages"] = context.get("pages").cloned().unwrap_or_default();
                context.insert("tag".to_string(), tag);
                context.insert("tags".to_string(), Value::Array(groups.clone()));
            };

            render_paginated(
                renderer,
                &name,
                site.as_value(),
                pages,
                count,
                &group_dir,
                Some(&augment),
            )?;
        }

        Ok(())
    }
}
