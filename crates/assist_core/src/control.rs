/// Appended to a control's label while its action is in flight.
pub const PROGRESS_SUFFIX: &str = "…";

/// Host button classes shared by every injected control, so they pick up the
/// toolbar's native styling.
const HOST_BUTTON_CLASSES: &str = "T-I J-J5-Ji aoO v7 T-I-atl L3";

/// The two controls injected into the compose toolbar, in visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Reply,
    Summarize,
}

impl ControlKind {
    pub const ALL: [ControlKind; 2] = [ControlKind::Reply, ControlKind::Summarize];

    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Reply => "AI Reply",
            ControlKind::Summarize => "Summarize",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            ControlKind::Reply => "Generate AI reply",
            ControlKind::Summarize => "Summarize the email",
        }
    }

    /// Stable class used to find and remove previously injected controls.
    pub fn marker_class(self) -> &'static str {
        match self {
            ControlKind::Reply => "ai-reply-button",
            ControlKind::Summarize => "ai-summarize-button",
        }
    }

    pub fn class_attribute(self) -> String {
        format!("{HOST_BUTTON_CLASSES} {}", self.marker_class())
    }

    /// Alert shown when there is no source email text to work from.
    pub fn missing_content_message(self) -> &'static str {
        match self {
            ControlKind::Reply => "Could not find email content to generate a reply for.",
            ControlKind::Summarize => "Could not find email content to summarize.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlPhase {
    #[default]
    Idle,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("control is already busy")]
pub struct AlreadyBusy;

/// Label and interaction state of one injected control.
///
/// `begin` and `finish` are the only transitions. `finish` always lands on the
/// idle label captured at construction, whatever happened while busy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    idle_label: String,
    label: String,
    pointer_enabled: bool,
    phase: ControlPhase,
}

impl ControlState {
    pub fn new(idle_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();
        Self {
            label: idle_label.clone(),
            idle_label,
            pointer_enabled: true,
            phase: ControlPhase::Idle,
        }
    }

    pub fn for_kind(kind: ControlKind) -> Self {
        Self::new(kind.label())
    }

    /// Idle -> Busy. Returns the busy label to render.
    pub fn begin(&mut self) -> Result<&str, AlreadyBusy> {
        if self.phase == ControlPhase::Busy {
            return Err(AlreadyBusy);
        }
        self.phase = ControlPhase::Busy;
        self.pointer_enabled = false;
        self.label = format!("{}{}", self.idle_label, PROGRESS_SUFFIX);
        Ok(&self.label)
    }

    /// Busy -> Idle, unconditionally. Calling it while idle is harmless.
    pub fn finish(&mut self) -> &str {
        self.phase = ControlPhase::Idle;
        self.pointer_enabled = true;
        self.label.clone_from(&self.idle_label);
        &self.label
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == ControlPhase::Busy
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn idle_label(&self) -> &str {
        &self.idle_label
    }

    pub fn pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }
}
