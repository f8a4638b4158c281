use assist_core::{SelectorList, SurfaceKind};
use ego_tree::NodeId;

use crate::dom::HostDocument;
use crate::resolve::{resolve, resolve_map, CompiledSelectors, SelectorError};

/// A located compose surface. Valid only until the next await point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableSurface {
    pub node: NodeId,
    pub kind: SurfaceKind,
}

impl EditableSurface {
    /// What the user currently sees in the surface.
    pub fn text(&self, doc: &HostDocument) -> String {
        match self.kind {
            SurfaceKind::RichText => doc.rendered_text(self.node),
            SurfaceKind::PlainText => doc.field_value(self.node),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComposeToolbarLocator {
    selectors: CompiledSelectors,
}

impl ComposeToolbarLocator {
    pub fn new(list: &SelectorList) -> Result<Self, SelectorError> {
        Ok(Self {
            selectors: CompiledSelectors::compile(list)?,
        })
    }

    pub fn locate(&self, doc: &HostDocument) -> Option<NodeId> {
        resolve(doc, &self.selectors, None)
    }
}

#[derive(Debug, Clone)]
pub struct ComposeBoxLocator {
    selectors: CompiledSelectors,
}

impl ComposeBoxLocator {
    pub fn new(list: &SelectorList) -> Result<Self, SelectorError> {
        Ok(Self {
            selectors: CompiledSelectors::compile(list)?,
        })
    }

    pub fn locate(&self, doc: &HostDocument) -> Option<EditableSurface> {
        resolve(doc, &self.selectors, None).map(|node| EditableSurface {
            node,
            kind: classify(doc, node),
        })
    }
}

pub fn classify(doc: &HostDocument, node: NodeId) -> SurfaceKind {
    if doc.is_content_editable(node) {
        SurfaceKind::RichText
    } else {
        SurfaceKind::PlainText
    }
}

#[derive(Debug, Clone)]
pub struct EmailContentLocator {
    selectors: CompiledSelectors,
}

impl EmailContentLocator {
    pub fn new(list: &SelectorList) -> Result<Self, SelectorError> {
        Ok(Self {
            selectors: CompiledSelectors::compile(list)?,
        })
    }

    /// Trimmed rendered text of the first candidate that has any; empty when
    /// nothing matches. Empty means "no source text".
    pub fn extract(&self, doc: &HostDocument) -> String {
        resolve_map(doc, &self.selectors, None, |node| {
            let text = doc.rendered_text(node);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_default()
    }
}
