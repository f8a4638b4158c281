use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use assist_core::ControlKind;
use assist_engine::{
    dispatch_click, AssistConfig, ComposeAssistant, ComposeBoxLocator, HostDocument, LogNotifier,
    ReqwestBackend,
};
use assist_logging::{assist_info, assist_warn};
use clap::Parser;
use log::LevelFilter;
use tokio::task::LocalSet;

use super::cli::Cli;
use super::config::load_config;

/// Extra wait after the startup delay so the startup injection has run.
const STARTUP_MARGIN: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config)?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    assist_logging::initialize(config.log_destination, level, config.log_file.as_deref());
    if from_file {
        assist_info!("Loaded configuration from {:?}", cli.config);
    } else {
        assist_info!("No configuration at {:?}, using defaults", cli.config);
    }

    let markup = read_page(&cli.page)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let session = run_session(markup, &config.assist, cli.click.map(ControlKind::from), cli.dump);
    let output = LocalSet::new().block_on(&runtime, session)?;
    println!("{output}");
    Ok(())
}

fn read_page(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read page {}", path.display()))
}

/// Loads the page, lets the assistant attach its controls, optionally runs one
/// action, and returns the compose text (or the whole document for `dump`).
async fn run_session(
    markup: String,
    config: &AssistConfig,
    click: Option<ControlKind>,
    dump: bool,
) -> anyhow::Result<String> {
    let backend = Arc::new(ReqwestBackend::new(config.backend_base_url.as_str())?);
    let doc = HostDocument::parse(&markup).into_shared();
    let assistant = ComposeAssistant::new(doc.clone(), config, backend, Rc::new(LogNotifier))?;
    let _observer = assistant.start();

    tokio::time::sleep(config.startup_delay() + STARTUP_MARGIN).await;

    if let Some(kind) = click {
        let Some(controller) = assistant.orchestrator().controller(kind) else {
            bail!(
                "no {} control was injected; the page has no compose toolbar",
                kind.label()
            );
        };
        if !dispatch_click(&doc, controller.node()).await {
            assist_warn!("Click on {} did not register", kind.label());
        }
    }

    let doc = doc.borrow();
    if dump {
        return Ok(doc.document_html());
    }
    let locator = ComposeBoxLocator::new(&config.selectors.compose_box)?;
    match locator.locate(&doc) {
        Some(surface) => Ok(surface.text(&doc)),
        None => bail!("the page has no compose box"),
    }
}
