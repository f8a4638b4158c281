use std::rc::Rc;
use std::sync::Arc;

use assist_logging::assist_info;
use ego_tree::NodeId;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::config::{AssistConfig, ConfigError};
use crate::dom::SharedDocument;
use crate::notify::UserNotifier;
use crate::orchestrator::InjectionOrchestrator;
use crate::resolve::CompiledSelectors;
use crate::watcher::ComposeWatcher;

/// Composition root for one page: the single watcher plus the orchestrator it
/// drives. Start it once after the page loads; it needs no explicit stop.
pub struct ComposeAssistant {
    doc: SharedDocument,
    orchestrator: Rc<InjectionOrchestrator>,
    watcher: Rc<ComposeWatcher>,
}

impl ComposeAssistant {
    pub fn new(
        doc: SharedDocument,
        config: &AssistConfig,
        backend: Arc<dyn Backend>,
        notifier: Rc<dyn UserNotifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let orchestrator = InjectionOrchestrator::new(doc.clone(), config, backend, notifier)?;
        let watcher = ComposeWatcher::new(
            doc.clone(),
            CompiledSelectors::compile(&config.selectors.compose_detect)?,
            orchestrator.clone(),
            config.settle_delay(),
            config.startup_delay(),
        );
        Ok(Self {
            doc,
            orchestrator,
            watcher,
        })
    }

    /// Must be called from inside a `tokio::task::LocalSet`.
    pub fn start(&self) -> JoinHandle<()> {
        assist_info!("Compose assistant started");
        self.watcher.start()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn orchestrator(&self) -> &Rc<InjectionOrchestrator> {
        &self.orchestrator
    }

    pub fn watcher(&self) -> &Rc<ComposeWatcher> {
        &self.watcher
    }
}

/// Clicks `node` and drives the handler to completion. Returns `false` when
/// the click could not register.
pub async fn dispatch_click(doc: &SharedDocument, node: NodeId) -> bool {
    let handler = doc.borrow().click(node);
    match handler {
        Some(future) => {
            future.await;
            true
        }
        None => false,
    }
}
