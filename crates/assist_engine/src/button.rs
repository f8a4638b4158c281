use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use assist_core::ControlState;
use assist_logging::{assist_debug, assist_error};
use ego_tree::NodeId;
use futures_util::FutureExt;

use crate::dom::SharedDocument;
use crate::notify::UserNotifier;

/// Owns one control's label and pointer state across an async action.
pub struct ButtonController {
    doc: SharedDocument,
    node: NodeId,
    state: RefCell<ControlState>,
    notifier: Rc<dyn UserNotifier>,
}

impl ButtonController {
    pub fn new(
        doc: SharedDocument,
        node: NodeId,
        idle_label: &str,
        notifier: Rc<dyn UserNotifier>,
    ) -> Self {
        Self {
            doc,
            node,
            state: RefCell::new(ControlState::new(idle_label)),
            notifier,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn state(&self) -> ControlState {
        self.state.borrow().clone()
    }

    /// Runs `action` with the control locked.
    ///
    /// Errors and panics are reported to the user. The control returns to its
    /// idle label with pointer interaction enabled on every path. Calling this
    /// while already busy does nothing.
    pub async fn run<Fut, E>(&self, action: Fut)
    where
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let busy_label = match self.state.borrow_mut().begin().map(str::to_owned) {
            Ok(label) => label,
            Err(err) => {
                assist_debug!("Ignoring click on {:?}: {}", self.node, err);
                return;
            }
        };
        self.render(&busy_label, false);

        match AssertUnwindSafe(action).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                assist_error!("{} failed: {}", self.idle_label(), err);
                self.notifier.alert(&format!("Operation failed: {err}"));
            }
            Err(_) => {
                assist_error!("{} panicked", self.idle_label());
                self.notifier.alert("Operation failed: unknown error");
            }
        }

        let idle_label = self.state.borrow_mut().finish().to_owned();
        self.render(&idle_label, true);
    }

    fn idle_label(&self) -> String {
        self.state.borrow().idle_label().to_owned()
    }

    fn render(&self, label: &str, pointer_enabled: bool) {
        let mut doc = self.doc.borrow_mut();
        if let Err(err) = doc.set_text_content(self.node, label) {
            assist_error!("Failed to relabel control {:?}: {}", self.node, err);
        }
        doc.set_pointer_events(self.node, pointer_enabled);
    }
}
