use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use assist_core::{
    summary_block, BackendOperation, ControlKind, Endpoint, SelectorList, SummaryLength, Tone,
};
use assist_logging::{assist_debug, assist_error, assist_info, assist_warn};
use ego_tree::NodeId;
use futures_util::future::LocalBoxFuture;

use crate::backend::{Backend, BackendError};
use crate::button::ButtonController;
use crate::config::{AssistConfig, ConfigError};
use crate::dom::{ClickHandler, DomError, HostDocument, SharedDocument};
use crate::inserter::TextInserter;
use crate::locate::{ComposeBoxLocator, ComposeToolbarLocator, EmailContentLocator};
use crate::notify::UserNotifier;
use crate::resolve::{CompiledSelectors, SelectorError};

const CONTROL_STYLE: &str = "margin-right: 8px; cursor: pointer";

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Empty response from {0} endpoint")]
    EmptyResponse(Endpoint),
    #[error("Could not find the compose box to insert text into")]
    ComposeBoxMissing,
}

/// Injects the "AI Reply" and "Summarize" controls into the compose toolbar.
///
/// `inject` is idempotent: it always starts by removing whatever controls a
/// previous run left behind.
pub struct InjectionOrchestrator {
    doc: SharedDocument,
    toolbar: ComposeToolbarLocator,
    compose_box: ComposeBoxLocator,
    content: EmailContentLocator,
    markers: CompiledSelectors,
    backend: Arc<dyn Backend>,
    notifier: Rc<dyn UserNotifier>,
    tone: Tone,
    summary_length: SummaryLength,
    controllers: RefCell<Vec<Rc<ButtonController>>>,
    injections: Cell<usize>,
}

impl InjectionOrchestrator {
    pub fn new(
        doc: SharedDocument,
        config: &AssistConfig,
        backend: Arc<dyn Backend>,
        notifier: Rc<dyn UserNotifier>,
    ) -> Result<Rc<Self>, ConfigError> {
        let marker_list = SelectorList::new(
            ControlKind::ALL
                .iter()
                .map(|kind| format!(".{}", kind.marker_class())),
        )
        .map_err(SelectorError::from)?;

        Ok(Rc::new(Self {
            doc,
            toolbar: ComposeToolbarLocator::new(&config.selectors.toolbar)?,
            compose_box: ComposeBoxLocator::new(&config.selectors.compose_box)?,
            content: EmailContentLocator::new(&config.selectors.email_content)?,
            markers: CompiledSelectors::compile(&marker_list)?,
            backend,
            notifier,
            tone: config.tone,
            summary_length: config.summary_length,
            controllers: RefCell::new(Vec::new()),
            injections: Cell::new(0),
        }))
    }

    /// Number of times controls were attached to a toolbar.
    pub fn injections(&self) -> usize {
        self.injections.get()
    }

    /// Controller of the currently attached control of `kind`, if any.
    pub fn controller(&self, kind: ControlKind) -> Option<Rc<ButtonController>> {
        let doc = self.doc.borrow();
        self.controllers
            .borrow()
            .iter()
            .find(|controller| doc.has_class(controller.node(), kind.marker_class()))
            .cloned()
    }

    pub fn inject(self: &Rc<Self>) {
        let mut doc = self.doc.borrow_mut();
        let removed = self.remove_existing(&mut doc);
        if removed > 0 {
            assist_debug!("Removed {} previously injected controls", removed);
        }

        let Some(toolbar) = self.toolbar.locate(&doc) else {
            assist_debug!("Toolbar not found");
            return;
        };

        assist_info!("Toolbar found, injecting AI controls");
        match self.attach_controls(&mut doc, toolbar) {
            Ok(()) => self.injections.set(self.injections.get() + 1),
            Err(err) => assist_error!("Failed to inject controls: {}", err),
        }
    }

    fn remove_existing(&self, doc: &mut HostDocument) -> usize {
        self.controllers.borrow_mut().clear();
        let mut stale: Vec<NodeId> = Vec::new();
        for selector in self.markers.iter() {
            for node in doc.select_all(selector, None) {
                if !stale.contains(&node) {
                    stale.push(node);
                }
            }
        }
        for node in &stale {
            if let Err(err) = doc.remove(*node) {
                assist_warn!("Failed to remove stale control {:?}: {}", node, err);
            }
        }
        stale.len()
    }

    fn attach_controls(
        self: &Rc<Self>,
        doc: &mut HostDocument,
        toolbar: NodeId,
    ) -> Result<(), DomError> {
        let reply = self.build_control(doc, ControlKind::Reply)?;
        let summarize = self.build_control(doc, ControlKind::Summarize)?;

        // Reply first, summarize right after it, both ahead of the host buttons.
        doc.prepend_child(toolbar, reply)?;
        doc.insert_after(reply, summarize)?;
        Ok(())
    }

    fn build_control(
        self: &Rc<Self>,
        doc: &mut HostDocument,
        kind: ControlKind,
    ) -> Result<NodeId, DomError> {
        let class = kind.class_attribute();
        let node = doc.create_element(
            "div",
            &[
                ("class", class.as_str()),
                ("role", "button"),
                ("data-tooltip", kind.tooltip()),
                ("style", CONTROL_STYLE),
            ],
        )?;
        doc.set_text_content(node, kind.label())?;

        let controller = Rc::new(ButtonController::new(
            self.doc.clone(),
            node,
            kind.label(),
            self.notifier.clone(),
        ));
        let handler = click_handler(Rc::downgrade(self), Rc::downgrade(&controller), kind);
        doc.add_click_listener(node, handler)?;
        self.controllers.borrow_mut().push(controller);
        Ok(node)
    }

    /// Extract, call the backend, insert. The compose box is located only
    /// after the response arrives.
    async fn perform(self: Rc<Self>, kind: ControlKind) -> Result<(), ActionError> {
        let email_content = {
            let doc = self.doc.borrow();
            self.content.extract(&doc)
        };
        if email_content.is_empty() {
            assist_warn!("No email content found for {:?}", kind);
            self.notifier.alert(kind.missing_content_message());
            return Ok(());
        }

        let operation = match kind {
            ControlKind::Reply => BackendOperation::Generate {
                email_content,
                tone: self.tone,
            },
            ControlKind::Summarize => BackendOperation::Summarize {
                email_content,
                summary_length: self.summary_length,
            },
        };
        let endpoint = operation.endpoint();
        let response = self.backend.call(&operation).await?;
        if response.trim().is_empty() {
            return Err(ActionError::EmptyResponse(endpoint));
        }

        let mut doc = self.doc.borrow_mut();
        let inserter = TextInserter::new(&self.compose_box);
        let inserted = match kind {
            ControlKind::Reply => inserter.insert(&mut doc, &response),
            ControlKind::Summarize => inserter.prepend(&mut doc, &summary_block(&response)),
        };
        if inserted {
            Ok(())
        } else {
            Err(ActionError::ComposeBoxMissing)
        }
    }
}

fn click_handler(
    orchestrator: Weak<InjectionOrchestrator>,
    controller: Weak<ButtonController>,
    kind: ControlKind,
) -> ClickHandler {
    Rc::new(move || -> LocalBoxFuture<'static, ()> {
        let (Some(orchestrator), Some(controller)) = (orchestrator.upgrade(), controller.upgrade())
        else {
            return Box::pin(async {});
        };
        Box::pin(async move { controller.run(orchestrator.perform(kind)).await })
    })
}
