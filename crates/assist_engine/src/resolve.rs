use assist_core::{EmptySelectorList, SelectorList};
use ego_tree::NodeId;
use scraper::Selector;

use crate::dom::HostDocument;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector `{selector}`: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

impl From<EmptySelectorList> for SelectorError {
    fn from(err: EmptySelectorList) -> Self {
        Self {
            selector: String::new(),
            message: err.to_string(),
        }
    }
}

/// A [`SelectorList`] parsed once. Only the selectors are kept; matches are
/// recomputed against the live document on every call.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    selectors: Vec<Selector>,
}

impl CompiledSelectors {
    pub fn compile(list: &SelectorList) -> Result<Self, SelectorError> {
        let selectors = list
            .iter()
            .map(|source| {
                Selector::parse(source).map_err(|err| SelectorError {
                    selector: source.to_string(),
                    message: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }
}

/// First element matched by any selector, trying selectors in list order.
///
/// A later selector never wins over an earlier one, even when its match comes
/// first in the document.
pub fn resolve(
    doc: &HostDocument,
    selectors: &CompiledSelectors,
    scope: Option<NodeId>,
) -> Option<NodeId> {
    selectors
        .iter()
        .find_map(|selector| doc.select_first(selector, scope))
}

/// Like [`resolve`], but the first match of each selector is passed through
/// `extract` and the first `Some` is returned.
pub fn resolve_map<T>(
    doc: &HostDocument,
    selectors: &CompiledSelectors,
    scope: Option<NodeId>,
    mut extract: impl FnMut(NodeId) -> Option<T>,
) -> Option<T> {
    selectors
        .iter()
        .filter_map(|selector| doc.select_first(selector, scope))
        .find_map(&mut extract)
}

pub fn matches_any(doc: &HostDocument, node: NodeId, selectors: &CompiledSelectors) -> bool {
    selectors.iter().any(|selector| doc.matches(node, selector))
}

/// True when some descendant of `node` (excluding itself) matches.
pub fn contains_match(doc: &HostDocument, node: NodeId, selectors: &CompiledSelectors) -> bool {
    doc.is_element(node) && resolve(doc, selectors, Some(node)).is_some()
}
