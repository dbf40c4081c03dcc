//! The build pipeline: two parallel worker phases separated by
//! single-threaded barrier stages.
//!
//! Phase 1 (parse): N workers drain the [`Feeder`], each turning a content
//! file into a [`Page`] appended to a shared collection. Phase barriers:
//! validation merges page data into the site tree and sorts it, and tag
//! groups are derived. Phase 2 (render): N workers claim pages off an
//! atomic cursor and write output files. Directives and the asset copy run
//! single-threaded at the end.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::config::Config;
use crate::directives::{self, DirectiveError};
use crate::{error, info, util, warn};

use super::document::{self, PageError};
use super::feeder::{Feeder, FeederError};
use super::markdown;
use super::page::{Page, ValidationError};
use super::render::{RenderError, Renderer};

/// Build-aborting errors. Per-item failures never surface here; they are
/// logged and skipped inside the worker loops.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Feeder(#[from] FeederError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a finished build produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    pub pages: usize,
    pub skipped: usize,
}

/// Runs one full build over a loaded [`Config`].
///
/// A builder is single-use: `build` consumes it, since validation and the
/// directive engine write into the site tree. Rebuilds construct a fresh
/// one from a freshly loaded config.
pub struct Builder {
    config: Config,
    live_reload_snippet: Option<String>,
}

impl Builder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            live_reload_snippet: None,
        }
    }

    /// Inject a live-reload snippet into every rendered page.
    pub fn with_live_reload(mut self, snippet: impl Into<String>) -> Self {
        self.live_reload_snippet = Some(snippet.into());
        self
    }

    pub fn build(mut self) -> Result<BuildSummary, BuildError> {
        let workers = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        info!("building with {workers} worker threads");

        let feeder = Feeder::new(&self.config.content_dir())?;
        let queued = feeder.remaining();

        // Phase 1: parse workers drain the feeder.
        let mut pages = self.run_content_phase(&feeder, workers);
        let skipped = queued - pages.len();

        let output_dir = self.config.output_dir();
        util::clear_directory(&output_dir)?;

        // Arrival order in the shared collection is a race outcome; pin
        // iteration order to the source path so same-timestamp pages sort
        // identically on every run.
        pages.sort_by(|a, b| a.source().cmp(b.source()));

        // Templates load before validation so a page naming a template the
        // theme does not carry fails the build here, not mid-render.
        let renderer = Renderer::new(self.config.theme_dir())?;
        self.validate_pages(&mut pages, &renderer)?;
        self.sort_site_pages();
        self.store_tag_groups();

        // Phase 2: render workers claim pages off an atomic cursor.
        self.run_render_phase(&pages, &renderer, workers);

        directives::process(&self.config, &renderer)?;
        self.copy_theme_assets()?;

        Ok(BuildSummary {
            output_dir,
            pages: pages.len(),
            skipped,
        })
    }

    fn run_content_phase(&self, feeder: &Feeder, workers: usize) -> Vec<Page> {
        let pages = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| self.content_worker(feeder, &pages));
            }
        });

        pages.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn content_worker(&self, feeder: &Feeder, pages: &Mutex<Vec<Page>>) {
        while let Some(item) = feeder.next() {
            info!(
                "processing content (index {}): {}",
                item.index,
                item.path.display()
            );
            match self.process_content(&item.path) {
                Ok(page) => {
                    pages
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push(page);
                    info!("finished processing content (index {})", item.index);
                }
                Err(e) => {
                    error!(
                        "skipping content (index {}) {}: {e}",
                        item.index,
                        item.path.display()
                    );
                }
            }
        }
    }

    /// Parse one content file into a page: extract frontmatter, convert
    /// the body, and attach the output path and URL.
    fn process_content(&self, path: &std::path::Path) -> Result<Page, PageError> {
        let raw = std::fs::read_to_string(path)?;
        let doc = document::extract(&raw)?;

        let mut data = doc.frontmatter.unwrap_or_default();
        data.insert(
            "content".to_string(),
            Value::String(markdown::to_html(&doc.body)),
        );

        let content_dir = self.config.content_dir();
        let output_path = util::output_path(&content_dir, &self.config.output_dir(), path);
        data.insert(
            "path".to_string(),
            Value::String(output_path.to_string_lossy().into_owned()),
        );
        data.insert(
            "url".to_string(),
            Value::String(util::output_url(
                &content_dir,
                self.config.site_url(),
                path,
            )),
        );

        Ok(Page::new(Value::Object(data), path.to_path_buf()))
    }

    /// Single-threaded validation barrier: apply defaults, resolve and
    /// check templates, derive timestamps, and merge each page into the
    /// site tree.
    fn validate_pages(
        &mut self,
        pages: &mut [Page],
        renderer: &Renderer,
    ) -> Result<(), BuildError> {
        let default_template = self
            .config
            .default_template()
            .map(str::to_string);

        for page in pages.iter_mut() {
            page.validate(default_template.as_deref())?;
            if let Some(template) = page.template() {
                renderer.ensure_template(template)?;
            }
            self.config
                .data_mut()
                .push(&["site", "pages"], page.data().clone());
        }
        Ok(())
    }

    /// Replace `site.pages` with a copy sorted descending by timestamp.
    /// The sort is stable, so same-timestamp pages keep validation order.
    fn sort_site_pages(&mut self) {
        let Some(Value::Array(mut sorted)) = self
            .config
            .data()
            .get(&["site", "pages"])
            .cloned()
        else {
            return;
        };

        sorted.sort_by_key(|page| {
            std::cmp::Reverse(page.get("timestamp").and_then(Value::as_i64).unwrap_or(0))
        });
        self.config
            .data_mut()
            .set(&["site", "pages"], Value::Array(sorted));
    }

    /// Derive tag groups from the sorted page array and expose them at
    /// `site.tags`. This runs even when no tags directive is configured so
    /// templates can enumerate tags (e.g. tag clouds).
    fn store_tag_groups(&mut self) {
        let groups = directives::collect_tag_groups(
            self.config
                .data()
                .get(&["site", "pages"])
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        );
        match serde_json::to_value(&groups) {
            Ok(value) => self.config.data_mut().set(&["site", "tags"], value),
            Err(e) => warn!("failed to serialize tag groups: {e}"),
        }
    }

    fn run_render_phase(&self, pages: &[Page], renderer: &Renderer, workers: usize) {
        let cursor = AtomicUsize::new(0);
        let site = self.config.data();
        let snippet = self.live_reload_snippet.as_deref();

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        let idx = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(page) = pages.get(idx) else { break };
                        if let Err(e) = page.render(site, renderer, snippet) {
                            error!("failed to render {}: {e}", page.source().display());
                        }
                    }
                });
            }
        });
    }

    /// Copy the theme's asset tree into the output directory, preserving
    /// its path relative to the theme. Missing configuration or directory
    /// is advisory.
    fn copy_theme_assets(&self) -> Result<(), BuildError> {
        let Some(assets) = self
            .config
            .data()
            .get_str(&["theme", "assets-directory"])
        else {
            warn!("theme config has no 'assets-directory'; skipping asset copy");
            return Ok(());
        };

        let assets_dir = self.config.theme_dir().join(assets);
        if !assets_dir.is_dir() {
            warn!(
                "theme assets directory not found: {}; skipping asset copy",
                assets_dir.display()
            );
            return Ok(());
        }

        let target = self.config.output_dir().join(assets);
        let copied = util::copy_dir_recursive(&assets_dir, &target)?;
        info!("copied {copied} theme asset file(s)");
        Ok(())
    }
}
