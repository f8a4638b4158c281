//! Compose assist engine: host document, locators, insertion, backend and the
//! watcher/orchestrator that attach the AI controls.
mod assistant;
mod backend;
mod button;
mod config;
mod dom;
mod inserter;
mod locate;
mod notify;
mod orchestrator;
mod resolve;
mod watcher;

pub use assistant::{dispatch_click, ComposeAssistant};
pub use backend::{Backend, BackendError, ReqwestBackend};
pub use button::ButtonController;
pub use config::{
    AssistConfig, ConfigError, SelectorSet, DEFAULT_BACKEND_BASE_URL, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_STARTUP_DELAY_MS,
};
pub use dom::{
    ClickHandler, DispatchedEvent, DomError, DomEventKind, DomRange, HostDocument,
    MutationRecord, SharedDocument,
};
pub use ego_tree::NodeId;
pub use inserter::{insert_into, TextInserter};
pub use locate::{
    classify, ComposeBoxLocator, ComposeToolbarLocator, EditableSurface, EmailContentLocator,
};
pub use notify::{LogNotifier, UserNotifier};
pub use orchestrator::{ActionError, InjectionOrchestrator};
pub use resolve::{contains_match, matches_any, resolve, resolve_map, CompiledSelectors, SelectorError};
pub use watcher::ComposeWatcher;
