#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex, Once};

use assist_core::BackendOperation;
use assist_engine::{Backend, BackendError, HostDocument, NodeId, UserNotifier};
use scraper::Selector;
use tokio::sync::Notify;

pub const GMAIL_REPLY_PAGE: &str = r#"
<html><body>
  <div class="nH">
    <div class="a3s aiL">Can we meet Tuesday?</div>
  </div>
  <div role="dialog">
    <div class="btC"><div class="T-I send">Send</div></div>
    <div role="textbox" contenteditable="true" aria-label="Message Body"></div>
  </div>
</body></html>
"#;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(assist_logging::initialize_for_tests);
}

pub fn find(doc: &HostDocument, css: &str) -> NodeId {
    try_find(doc, css).unwrap_or_else(|| panic!("no element matches {css}"))
}

pub fn try_find(doc: &HostDocument, css: &str) -> Option<NodeId> {
    let selector = Selector::parse(css).expect("valid selector");
    doc.select_first(&selector, None)
}

pub fn count(doc: &HostDocument, css: &str) -> usize {
    let selector = Selector::parse(css).expect("valid selector");
    doc.select_all(&selector, None).len()
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl UserNotifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Scripted backend: answers from a queue and records every operation.
#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    calls: Mutex<Vec<BackendOperation>>,
    gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn answering(responses: Vec<Result<String, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        })
    }

    /// Each call waits for one `notify_one` on `gate` before answering.
    pub fn gated(responses: Vec<Result<String, BackendError>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    pub fn calls(&self) -> Vec<BackendOperation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn call(&self, operation: &BackendOperation) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(operation.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(String::new()))
    }
}
