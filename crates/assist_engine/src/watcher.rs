use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use assist_logging::{assist_debug, assist_info};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::dom::{HostDocument, MutationRecord, SharedDocument};
use crate::orchestrator::InjectionOrchestrator;
use crate::resolve::{contains_match, matches_any, CompiledSelectors};

/// Watches the document for compose surfaces and re-injects controls.
///
/// Every qualifying mutation batch pushes the injection deadline back to one
/// settle delay after that batch, so injection runs once the host has been
/// quiet for the full delay. `inject` is idempotent, so a redundant run is
/// harmless.
pub struct ComposeWatcher {
    doc: SharedDocument,
    detect: CompiledSelectors,
    orchestrator: Rc<InjectionOrchestrator>,
    settle_delay: Duration,
    startup_delay: Duration,
    settle_deadline: Cell<Option<Instant>>,
}

impl ComposeWatcher {
    pub fn new(
        doc: SharedDocument,
        detect: CompiledSelectors,
        orchestrator: Rc<InjectionOrchestrator>,
        settle_delay: Duration,
        startup_delay: Duration,
    ) -> Rc<Self> {
        Rc::new(Self {
            doc,
            detect,
            orchestrator,
            settle_delay,
            startup_delay,
            settle_deadline: Cell::new(None),
        })
    }

    /// Starts observation plus the one-off startup injection.
    ///
    /// Must run inside a `tokio::task::LocalSet`. The returned handle is the
    /// observation loop, which never finishes on its own.
    pub fn start(self: &Rc<Self>) -> JoinHandle<()> {
        let startup = Rc::clone(self);
        tokio::task::spawn_local(async move {
            tokio::time::sleep(startup.startup_delay).await;
            assist_debug!("Startup injection attempt");
            startup.orchestrator.inject();
        });

        let observer = Rc::clone(self);
        tokio::task::spawn_local(async move { observer.observe().await })
    }

    pub fn is_settle_pending(&self) -> bool {
        self.settle_deadline.get().is_some()
    }

    /// True when any added element is, or contains, a compose surface.
    /// Records targeting nodes outside `<body>` are ignored.
    pub fn batch_reveals_compose(&self, doc: &HostDocument, records: &[MutationRecord]) -> bool {
        let body = doc.body();
        records
            .iter()
            .filter(|record| body.map_or(true, |body| doc.contains(body, record.target)))
            .flat_map(|record| record.added_nodes.iter().copied())
            .filter(|node| doc.is_element(*node))
            .any(|node| {
                matches_any(doc, node, &self.detect) || contains_match(doc, node, &self.detect)
            })
    }

    async fn observe(self: Rc<Self>) {
        let signal = self.doc.borrow().mutation_signal();
        loop {
            signal.notified().await;
            let records = self.doc.borrow_mut().take_mutation_records();
            let detected = {
                let doc = self.doc.borrow();
                self.batch_reveals_compose(&doc, &records)
            };
            if detected {
                assist_info!("Compose window detected");
                self.schedule_injection();
            }
        }
    }

    fn schedule_injection(self: &Rc<Self>) {
        let deadline = Instant::now() + self.settle_delay;
        if self.settle_deadline.replace(Some(deadline)).is_some() {
            assist_debug!("Injection already scheduled, settle deadline moved");
            return;
        }
        let this = Rc::clone(self);
        tokio::task::spawn_local(async move {
            while let Some(deadline) = this.settle_deadline.get() {
                tokio::time::sleep_until(deadline).await;
                if this.settle_deadline.get() == Some(deadline) {
                    this.settle_deadline.set(None);
                    this.orchestrator.inject();
                }
            }
        });
    }
}
