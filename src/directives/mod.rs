//! Post-build directives: named generators that read the final page
//! collection and emit derived, paginated output pages.

mod index;
mod tags;

use std::path::Path;

use serde_json::Value;

use crate::build::Renderer;
use crate::config::Config;
use crate::data::DataTree;
use crate::{info, warn};

pub use index::{Index, render_paginated};
pub use tags::{Tags, collect_tag_groups, slugify};

#[derive(thiserror::Error, Debug)]
pub enum DirectiveError {
    #[error("directive '{0}' is missing its required 'count' value")]
    MissingCount(String),

    #[error("directive '{0}' requires a positive integer 'count' value")]
    InvalidCount(String),

    #[error(transparent)]
    Render(#[from] crate::build::RenderError),
}

/// A post-build generator. The directive's configured `name` doubles as
/// the template it renders through.
pub trait Directive {
    fn init(
        &self,
        site: &DataTree,
        directive: &Value,
        renderer: &Renderer,
        output_dir: &Path,
    ) -> Result<(), DirectiveError>;
}

/// Look up a directive implementation by name.
pub fn get_directive(name: &str) -> Option<Box<dyn Directive>> {
    match name {
        "index" => Some(Box::new(Index)),
        "tags" => Some(Box::new(Tags)),
        _ => None,
    }
}

/// Run every directive the site and theme configs declare, in order.
/// Unknown directive names are advisory; contract violations are fatal.
pub fn process(config: &Config, renderer: &Renderer) -> Result<(), DirectiveError> {
    for directive_config in config.directives() {
        let Some(name) = directive_config.get("name").and_then(Value::as_str) else {
            warn!("directive entry without a 'name' field, skipping");
            continue;
        };
        match get_directive(name) {
            Some(directive) => {
                info!("running directive '{name}'");
                directive.init(
                    config.data(),
                    &directive_config,
                    renderer,
                    &config.output_dir(),
                )?;
            }
            None => warn!("unknown directive '{name}', skipping"),
        }
    }
    Ok(())
}
