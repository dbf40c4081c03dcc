use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use tower_http::services::ServeDir;

use crate::build::{BuildSummary, Builder, DirectoryWatcher};
use crate::config::Config;
use crate::util;
use crate::{error, info, warn};

/// Path the injected snippet polls; also the token file name inside the
/// output directory, so the static file server serves it as-is.
const RELOAD_TOKEN_PATH: &str = "__sitepress_reload__";

/// How often the content watcher polls for modifications.
const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling fragment injected before each page's closing body tag. The
/// page reloads when the served token value changes after a rebuild.
const LIVE_RELOAD_SNIPPET: &str = r#"
<script>
(function () {
    const reloadPath = "/__sitepress_reload__";
    let lastToken = null;

    async function poll() {
        try {
            const response = await fetch(reloadPath, { cache: "no-store" });
            if (response.ok) {
                const token = (await response.text()).trim();
                if (lastToken !== null && token && lastToken !== token) {
                    window.location.reload();
                    return;
                }
                if (token) {
                    lastToken = token;
                }
            }
        } catch (error) {
            // server restarting; keep polling
        }
        setTimeout(poll, 250);
    }

    poll();
})();
</script>
"#;

pub async fn run(args: &crate::ServeArgs) -> Result<(), anyhow::Error> {
    let config_path = super::build::resolve_config_path(&args.config_file)?;

    // Initial build; fatal errors abort startup, unlike rebuild errors.
    let initial = {
        let config_path = config_path.clone();
        tokio::task::spawn_blocking(move || build_site(&config_path)).await??
    };
    info!(
        "initial build complete: {} page(s) in {}",
        initial.pages,
        initial.output_dir.display()
    );

    let _watcher_handle = if args.watch {
        let content_dir = initial.site_content_dir.clone();
        let rebuild_config_path = config_path.clone();
        Some(tokio::task::spawn_blocking(move || {
            let watcher = match DirectoryWatcher::new(&content_dir, WATCH_POLL_INTERVAL) {
                Ok(watcher) => watcher,
                Err(e) => {
                    error!("failed to start file watcher: {e}");
                    return;
                }
            };
            info!("watching {} for changes", content_dir.display());

            while let Some(changes) = watcher.wait_for_changes() {
                info!("detected {} change(s), rebuilding", changes.len());
                match build_site(&rebuild_config_path) {
                    Ok(summary) => info!("rebuilt {} page(s)", summary.pages),
                    Err(e) => error!("rebuild failed: {e}"),
                }
            }
        }))
    } else {
        None
    };

    let serve_dir = ServeDir::new(&initial.output_dir).append_index_html_on_directories(true);
    let app = Router::new().fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    info!("serving {} at {url}", initial.output_dir.display());
    info!("press Ctrl+C to stop");

    if args.open
        && let Err(e) = open::that(&url)
    {
        warn!("failed to open browser: {e}");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

struct ServeBuild {
    output_dir: PathBuf,
    site_content_dir: PathBuf,
    pages: usize,
}

/// One full live-reload build from a freshly loaded config, followed by a
/// token bump so connected browsers reload.
fn build_site(config_path: &Path) -> Result<ServeBuild, anyhow::Error> {
    let config = Config::load(config_path)?;
    let content_dir = config.content_dir();

    let summary: BuildSummary = Builder::new(config)
        .with_live_reload(LIVE_RELOAD_SNIPPET)
        .build()?;

    update_reload_token(&summary.output_dir);

    Ok(ServeBuild {
        output_dir: summary.output_dir,
        site_content_dir: content_dir,
        pages: summary.pages,
    })
}

/// Write a fresh token value. Failure only degrades live reload, so it is
/// advisory.
fn update_reload_token(output_dir: &Path) {
    let token = chrono::Utc::now().timestamp_millis().to_string();
    let token_path = output_dir.join(RELOAD_TOKEN_PATH);
    if let Err(e) = util::output_file(&token, &token_path) {
        warn!("failed to update live reload token: {e}");
    }
}
