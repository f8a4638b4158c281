//! Compose assist core: pure state and data shared by the DOM engine.
mod control;
mod insertion;
mod operation;
mod selector;

pub use control::{AlreadyBusy, ControlKind, ControlPhase, ControlState, PROGRESS_SUFFIX};
pub use insertion::{
    plan_plain_text, plan_rich_text, splice_at, summary_block, InsertionStrategy, SpliceResult,
    SurfaceKind,
};
pub use operation::{BackendOperation, Endpoint, SummaryLength, Tone};
pub use selector::{
    EmptySelectorList, SelectorList, COMPOSE_BOX_SELECTORS, COMPOSE_DETECT_SELECTORS,
    EMAIL_CONTENT_SELECTORS, TOOLBAR_SELECTORS,
};
