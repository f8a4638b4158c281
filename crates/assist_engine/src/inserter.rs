use assist_core::{plan_plain_text, plan_rich_text, splice_at, InsertionStrategy, SurfaceKind};
use assist_logging::{assist_debug, assist_error, assist_warn};
use ego_tree::NodeId;

use crate::dom::{DomError, DomEventKind, HostDocument};
use crate::locate::{ComposeBoxLocator, EditableSurface};

/// Writes generated text into the compose surface.
///
/// Each call runs exactly one content-mutating primitive (see
/// [`InsertionStrategy`]) and then fires `input` and `keyup` on the surface so
/// the host refreshes its own compose state.
pub struct TextInserter<'a> {
    locator: &'a ComposeBoxLocator,
}

impl<'a> TextInserter<'a> {
    pub fn new(locator: &'a ComposeBoxLocator) -> Self {
        Self { locator }
    }

    /// Inserts at the caret (or appends). `false` means nothing was inserted.
    pub fn insert(&self, doc: &mut HostDocument, text: &str) -> bool {
        self.insert_with_strategy(doc, text).is_some()
    }

    pub fn insert_with_strategy(&self, doc: &mut HostDocument, text: &str) -> Option<InsertionStrategy> {
        let surface = self.locate_or_log(doc)?;
        finish(insert_into(doc, surface, text))
    }

    /// Puts `text` ahead of the existing rich-text content in one assignment.
    /// Plain-text surfaces fall back to a regular caret insertion.
    pub fn prepend(&self, doc: &mut HostDocument, text: &str) -> bool {
        self.prepend_with_strategy(doc, text).is_some()
    }

    pub fn prepend_with_strategy(&self, doc: &mut HostDocument, text: &str) -> Option<InsertionStrategy> {
        let surface = self.locate_or_log(doc)?;
        let result = match surface.kind {
            SurfaceKind::RichText => prepend_rich_text(doc, surface.node, text),
            SurfaceKind::PlainText => insert_into(doc, surface, text),
        };
        finish(result)
    }

    fn locate_or_log(&self, doc: &HostDocument) -> Option<EditableSurface> {
        let surface = self.locator.locate(doc);
        if surface.is_none() {
            assist_warn!("Compose box not found");
        }
        surface
    }
}

/// Inserts into an already located surface.
pub fn insert_into(
    doc: &mut HostDocument,
    surface: EditableSurface,
    text: &str,
) -> Result<InsertionStrategy, DomError> {
    doc.focus(surface.node);
    let strategy = match surface.kind {
        SurfaceKind::RichText => insert_rich_text(doc, surface.node, text)?,
        SurfaceKind::PlainText => insert_plain_text(doc, surface.node, text)?,
    };
    notify_changed(doc, surface.node);
    Ok(strategy)
}

fn insert_rich_text(doc: &mut HostDocument, node: NodeId, text: &str) -> Result<InsertionStrategy, DomError> {
    let selection = doc
        .selection()
        .filter(|range| doc.contains(node, range.container));
    let strategy = plan_rich_text(selection.is_some());

    match selection {
        Some(range) => {
            let caret = doc.replace_range_with_text(range, text)?;
            doc.set_selection(caret)?;
        }
        None => {
            let existing = doc.rendered_text(node);
            doc.set_text_content(node, &format!("{existing}{text}"))?;
        }
    }
    Ok(strategy)
}

fn insert_plain_text(doc: &mut HostDocument, node: NodeId, text: &str) -> Result<InsertionStrategy, DomError> {
    let selection = doc.field_selection(node);
    let strategy = plan_plain_text(selection.is_some());

    match selection {
        Some((start, end)) => {
            let spliced = splice_at(&doc.field_value(node), start, end, text);
            doc.set_field_value(node, &spliced.value)?;
            doc.set_field_selection(node, spliced.caret, spliced.caret)?;
        }
        None => doc.set_field_value(node, text)?,
    }
    Ok(strategy)
}

fn prepend_rich_text(doc: &mut HostDocument, node: NodeId, text: &str) -> Result<InsertionStrategy, DomError> {
    doc.focus(node);
    let existing = doc.rendered_text(node);
    doc.set_text_content(node, &format!("{text}{existing}"))?;
    notify_changed(doc, node);
    Ok(InsertionStrategy::Prepend)
}

fn notify_changed(doc: &mut HostDocument, node: NodeId) {
    doc.dispatch_event(node, DomEventKind::Input);
    doc.dispatch_event(node, DomEventKind::KeyUp);
}

fn finish(result: Result<InsertionStrategy, DomError>) -> Option<InsertionStrategy> {
    match result {
        Ok(strategy) => {
            assist_debug!("Inserted text using {:?}", strategy);
            Some(strategy)
        }
        Err(err) => {
            assist_error!("Failed to insert text in compose box: {}", err);
            None
        }
    }
}
