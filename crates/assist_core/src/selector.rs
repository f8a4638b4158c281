use serde::{Deserialize, Serialize};

/// Known Gmail compose toolbar containers, most specific first.
pub const TOOLBAR_SELECTORS: &[&str] = &[".btC", ".aDh", "[role=\"toolbar\"]", ".gU.Up"];

/// Containers holding the text of the message being replied to.
pub const EMAIL_CONTENT_SELECTORS: &[&str] =
    &[".h7", ".a3s.aiL", ".gmail_quote", "[role=\"presentation\"]"];

/// Candidate compose bodies. The first two are content-editable in current Gmail builds.
pub const COMPOSE_BOX_SELECTORS: &[&str] = &[
    "[role=\"textbox\"][contenteditable=\"true\"]",
    "div[aria-label=\"Message Body\"]",
    ".editable[contenteditable=\"true\"]",
];

/// Nodes whose insertion means a compose surface appeared.
pub const COMPOSE_DETECT_SELECTORS: &[&str] = &[".aDh", ".btC", "[role=\"dialog\"]"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("selector list must contain at least one selector")]
pub struct EmptySelectorList;

/// Ordered fallback chain of CSS selectors; the first selector that matches wins.
///
/// Order encodes priority among known variants of the host page, so it is
/// preserved exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SelectorList {
    selectors: Vec<String>,
}

impl SelectorList {
    pub fn new<I, S>(selectors: I) -> Result<Self, EmptySelectorList>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selectors: Vec<String> = selectors
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if selectors.is_empty() {
            return Err(EmptySelectorList);
        }
        Ok(Self { selectors })
    }

    /// Builds a list from one of the built-in constant chains.
    pub fn known(selectors: &'static [&'static str]) -> Self {
        debug_assert!(!selectors.is_empty());
        Self {
            selectors: selectors.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    pub fn toolbar() -> Self {
        Self::known(TOOLBAR_SELECTORS)
    }

    pub fn email_content() -> Self {
        Self::known(EMAIL_CONTENT_SELECTORS)
    }

    pub fn compose_box() -> Self {
        Self::known(COMPOSE_BOX_SELECTORS)
    }

    pub fn compose_detect() -> Self {
        Self::known(COMPOSE_DETECT_SELECTORS)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl TryFrom<Vec<String>> for SelectorList {
    type Error = EmptySelectorList;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SelectorList> for Vec<String> {
    fn from(value: SelectorList) -> Self {
        value.selectors
    }
}
