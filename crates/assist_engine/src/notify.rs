use assist_logging::assist_warn;

/// Blocking, alert-style message to the person using the page.
pub trait UserNotifier {
    fn alert(&self, message: &str);
}

/// Logs alerts and echoes them to stderr. Used when no page UI is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn alert(&self, message: &str) {
        assist_warn!("alert: {}", message);
        eprintln!("alert: {message}");
    }
}
