//! Mutable host document.
//!
//! The host page is an HTML tree (`scraper`/`ego-tree`) plus the live state a
//! browser keeps beside the markup: focus, the document selection, form field
//! values, pointer-interaction flags, click listeners, dispatched events and a
//! queue of mutation records for observers.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::Arc;

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use futures_util::future::LocalBoxFuture;
use scraper::node::{Node, Text};
use scraper::{ElementRef, Html, Selector};
use tokio::sync::Notify;

/// The document handle shared by every component on the page's event loop.
pub type SharedDocument = Rc<RefCell<HostDocument>>;

/// Click listener. Invoked synchronously; the returned future is the handler body.
pub type ClickHandler = Rc<dyn Fn() -> LocalBoxFuture<'static, ()>>;

const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "url", "tel", "password"];

/// Elements whose boundaries break lines in rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("invalid tag or attribute name: {0}")]
    InvalidName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    Input,
    KeyUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub kind: DomEventKind,
    pub bubbles: bool,
    pub key: Option<&'static str>,
}

/// Child-list mutation: nodes added under `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
}

/// A selection range whose two ends share one container.
///
/// Offsets count chars when `container` is a text node and children when it
/// is an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomRange {
    pub container: NodeId,
    pub start: usize,
    pub end: usize,
}

impl DomRange {
    pub fn collapsed(container: NodeId, offset: usize) -> Self {
        Self {
            container,
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldState {
    value: String,
    selection: Option<(usize, usize)>,
}

/// The host page.
///
/// Nothing is ever compacted: removed nodes stay in the `ego_tree` arena as
/// orphans, dispatched events accumulate until [`HostDocument::take_events`], and
/// mutation records accumulate until an observer calls
/// [`HostDocument::take_mutation_records`]. Suited to one page session, not to
/// a document that lives indefinitely.
pub struct HostDocument {
    html: Html,
    content_writes: usize,
    fields: HashMap<NodeId, FieldState>,
    selection: Option<DomRange>,
    focused: Option<NodeId>,
    inert: HashSet<NodeId>,
    listeners: HashMap<NodeId, ClickHandler>,
    events: Vec<DispatchedEvent>,
    mutations: Vec<MutationRecord>,
    mutation_signal: Arc<Notify>,
}

impl fmt::Debug for HostDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostDocument")
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .field("listeners", &self.listeners.len())
            .field("pending_mutations", &self.mutations.len())
            .finish_non_exhaustive()
    }
}

impl HostDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            content_writes: 0,
            fields: HashMap::new(),
            selection: None,
            focused: None,
            inert: HashSet::new(),
            listeners: HashMap::new(),
            events: Vec::new(),
            mutations: Vec::new(),
            mutation_signal: Arc::new(Notify::new()),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// The `<html>` element.
    pub fn root(&self) -> NodeId {
        self.html.root_element().id()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .map(|el| el.id())
    }

    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(node).and_then(ElementRef::wrap)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// True when the node is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let tree_root = self.html.tree.root().id();
        match self.html.tree.get(node) {
            Some(node_ref) => {
                node_ref.id() == tree_root || node_ref.ancestors().any(|a| a.id() == tree_root)
            }
            None => false,
        }
    }

    /// Inclusive descendant check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match self.html.tree.get(node) {
            Some(node_ref) => node == ancestor || node_ref.ancestors().any(|a| a.id() == ancestor),
            None => false,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(node)
            .and_then(|n| n.parent())
            .map(|p| p.id())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(node)
            .and_then(|n| n.first_child())
            .map(|c| c.id())
    }

    /// First element under `scope` (or the whole document) matching `selector`,
    /// in document order. Only attached nodes are visited.
    pub fn select_first(&self, selector: &Selector, scope: Option<NodeId>) -> Option<NodeId> {
        let scope = self.scope_element(scope)?;
        scope.select(selector).next().map(|el| el.id())
    }

    pub fn select_all(&self, selector: &Selector, scope: Option<NodeId>) -> Vec<NodeId> {
        match self.scope_element(scope) {
            Some(scope) => scope.select(selector).map(|el| el.id()).collect(),
            None => Vec::new(),
        }
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node)
            .map(|el| selector.matches(&el))
            .unwrap_or(false)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.value().name())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.html
            .tree
            .get(node)
            .and_then(|n| n.value().as_element())
            .and_then(|el| el.attr(name))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|el| el.value().classes().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Mirrors `isContentEditable`: the nearest element carrying a
    /// `contenteditable` attribute decides, and `"false"` switches it off.
    pub fn is_content_editable(&self, node: NodeId) -> bool {
        let Some(node_ref) = self.html.tree.get(node) else {
            return false;
        };
        std::iter::once(node_ref)
            .chain(node_ref.ancestors())
            .filter_map(|n| n.value().as_element())
            .find_map(|el| el.attr("contenteditable"))
            .map(|value| {
                let value = value.trim();
                value.is_empty()
                    || value.eq_ignore_ascii_case("true")
                    || value.eq_ignore_ascii_case("plaintext-only")
            })
            .unwrap_or(false)
    }

    /// Rendered text of a subtree, the way `innerText` reads it: text nodes in
    /// order, `<br>` as a newline, and one line break at block boundaries.
    pub fn rendered_text(&self, node: NodeId) -> String {
        let Some(node_ref) = self.html.tree.get(node) else {
            return String::new();
        };
        let mut out = String::new();
        let mut pending_break = false;
        for edge in node_ref.traverse() {
            match edge {
                Edge::Open(current) => match current.value() {
                    Node::Text(text) if !text.is_empty() => {
                        flush_break(&mut out, &mut pending_break);
                        out.push_str(text);
                    }
                    Node::Element(el) if el.name() == "br" => {
                        flush_break(&mut out, &mut pending_break);
                        out.push('\n');
                    }
                    Node::Element(el) if is_block(el.name()) && current.id() != node => {
                        pending_break = !out.is_empty();
                    }
                    _ => {}
                },
                Edge::Close(current) => {
                    if let Node::Element(el) = current.value() {
                        if is_block(el.name()) && current.id() != node && !out.is_empty() {
                            pending_break = true;
                        }
                    }
                }
            }
        }
        out
    }

    /// Content-changing writes (text replacement, range insertion, field value
    /// assignment) since the document was parsed.
    pub fn content_writes(&self) -> usize {
        self.content_writes
    }

    /// Replaces every child of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let children = self.children_checked(node)?;
        self.content_writes += 1;
        let mut forgotten = Vec::new();
        for child in children {
            forgotten.extend(self.subtree_ids(child));
            if let Some(mut child_mut) = self.html.tree.get_mut(child) {
                child_mut.detach();
            }
        }
        self.forget_nodes(&forgotten);

        if !text.is_empty() {
            let added = self
                .html
                .tree
                .get_mut(node)
                .ok_or(DomError::UnknownNode(node))?
                .append(text_node(text))
                .id();
            self.record_addition(node, vec![added]);
        }
        Ok(())
    }

    /// Creates a detached element. Attach it with one of the insertion methods.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<NodeId, DomError> {
        if !is_valid_name(tag) || matches!(tag, "html" | "head" | "body") {
            return Err(DomError::InvalidName(tag.to_string()));
        }
        let mut markup = format!("<{tag}");
        for (name, value) in attrs {
            if !is_valid_name(name) {
                return Err(DomError::InvalidName((*name).to_string()));
            }
            let _ = write!(markup, " {name}=\"{}\"", escape_attribute(value));
        }
        let _ = write!(markup, "></{tag}>");

        let fragment = Html::parse_fragment(&markup);
        let element = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
            .map(|el| el.value().clone())
            .ok_or_else(|| DomError::InvalidName(tag.to_string()))?;

        Ok(self.html.tree.orphan(Node::Element(element)).id())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_element(parent)?;
        self.ensure_exists(child)?;
        self.html
            .tree
            .get_mut(parent)
            .ok_or(DomError::UnknownNode(parent))?
            .append_id(child);
        self.record_addition(parent, vec![child]);
        Ok(())
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_element(parent)?;
        self.ensure_exists(child)?;
        self.html
            .tree
            .get_mut(parent)
            .ok_or(DomError::UnknownNode(parent))?
            .prepend_id(child);
        self.record_addition(parent, vec![child]);
        Ok(())
    }

    /// Inserts `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        self.ensure_exists(node)?;
        let parent = self.parent(reference).ok_or(DomError::UnknownNode(reference))?;
        self.html
            .tree
            .get_mut(reference)
            .ok_or(DomError::UnknownNode(reference))?
            .insert_id_after(node);
        self.record_addition(parent, vec![node]);
        Ok(())
    }

    /// Parses `markup` as a fragment and appends its top-level nodes to `parent`.
    /// This is how host-page rendering is simulated.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DomError> {
        self.ensure_element(parent)?;
        let fragment = Html::parse_fragment(markup);
        let mut added = Vec::new();
        for child in fragment.root_element().children() {
            added.push(self.copy_subtree(child, parent)?);
        }
        self.record_addition(parent, added.clone());
        Ok(added)
    }

    /// Detaches a node and drops the live state attached to its subtree.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.ensure_exists(node)?;
        let forgotten = self.subtree_ids(node);
        if let Some(mut node_mut) = self.html.tree.get_mut(node) {
            node_mut.detach();
        }
        self.forget_nodes(&forgotten);
        Ok(())
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.html.tree.get(node).is_some() {
            self.focused = Some(node);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn set_selection(&mut self, range: DomRange) -> Result<(), DomError> {
        self.ensure_exists(range.container)?;
        self.selection = Some(range);
        Ok(())
    }

    pub fn selection(&self) -> Option<DomRange> {
        self.selection
    }


    /// Deletes the range contents, inserts `text` as one text node at the
    /// collapsed point and returns a caret collapsed just after that node.
    pub fn replace_range_with_text(&mut self, range: DomRange, text: &str) -> Result<DomRange, DomError> {
        let container = self
            .html
            .tree
            .get(range.container)
            .ok_or(DomError::UnknownNode(range.container))?;
        let existing_text = container.value().as_text().map(|t| t.to_string());
        self.content_writes += 1;

        match existing_text {
            Some(existing) => {
                let parent = self
                    .parent(range.container)
                    .ok_or(DomError::UnknownNode(range.container))?;
                let len = existing.chars().count();
                let start = range.start.min(range.end).min(len);
                let end = range.start.max(range.end).min(len);
                let before: String = existing.chars().take(start).collect();
                let after: String = existing.chars().skip(end).collect();

                let mut container_mut = self
                    .html
                    .tree
                    .get_mut(range.container)
                    .ok_or(DomError::UnknownNode(range.container))?;
                *container_mut.value() = text_node(&before);
                let inserted = container_mut.insert_after(text_node(text)).id();
                let mut added = vec![inserted];
                if !after.is_empty() {
                    let tail = self
                        .html
                        .tree
                        .get_mut(inserted)
                        .ok_or(DomError::UnknownNode(inserted))?
                        .insert_after(text_node(&after))
                        .id();
                    added.push(tail);
                }
                self.record_addition(parent, added);

                let offset = self.child_index(inserted) + 1;
                Ok(DomRange::collapsed(parent, offset))
            }
            None => {
                self.ensure_element(range.container)?;
                let children = self.children(range.container);
                let start = range.start.min(range.end).min(children.len());
                let end = range.start.max(range.end).min(children.len());

                let mut forgotten = Vec::new();
                for child in &children[start..end] {
                    forgotten.extend(self.subtree_ids(*child));
                    if let Some(mut child_mut) = self.html.tree.get_mut(*child) {
                        child_mut.detach();
                    }
                }
                self.forget_nodes(&forgotten);

                let inserted = if start == 0 {
                    self.html
                        .tree
                        .get_mut(range.container)
                        .ok_or(DomError::UnknownNode(range.container))?
                        .prepend(text_node(text))
                        .id()
                } else {
                    self.html
                        .tree
                        .get_mut(children[start - 1])
                        .ok_or(DomError::UnknownNode(children[start - 1]))?
                        .insert_after(text_node(text))
                        .id()
                };
                self.record_addition(range.container, vec![inserted]);
                Ok(DomRange::collapsed(range.container, start + 1))
            }
        }
    }


    /// Whether the element exposes numeric `selectionStart`/`selectionEnd`.
    pub fn has_selection_range(&self, node: NodeId) -> bool {
        match self.tag_name(node) {
            Some("textarea") => true,
            Some("input") => {
                let kind = self.attr(node, "type").unwrap_or("text").to_ascii_lowercase();
                TEXT_INPUT_TYPES.contains(&kind.as_str())
            }
            _ => false,
        }
    }

    /// Current value of a form field, or of the value set on any other element.
    pub fn field_value(&self, node: NodeId) -> String {
        if let Some(state) = self.fields.get(&node) {
            return state.value.clone();
        }
        match self.tag_name(node) {
            Some("textarea") => self.rendered_text(node),
            Some("input") => self.attr(node, "value").unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    pub fn set_field_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.ensure_element(node)?;
        self.content_writes += 1;
        let caret = value.chars().count();
        let selection = self.has_selection_range(node).then_some((caret, caret));
        self.fields.insert(
            node,
            FieldState {
                value: value.to_string(),
                selection,
            },
        );
        Ok(())
    }

    /// `(selectionStart, selectionEnd)` in chars. Untouched fields report a
    /// caret at the end of their value.
    pub fn field_selection(&self, node: NodeId) -> Option<(usize, usize)> {
        if !self.has_selection_range(node) {
            return None;
        }
        match self.fields.get(&node) {
            Some(state) => state.selection,
            None => {
                let caret = self.field_value(node).chars().count();
                Some((caret, caret))
            }
        }
    }

    pub fn set_field_selection(&mut self, node: NodeId, start: usize, end: usize) -> Result<(), DomError> {
        self.ensure_element(node)?;
        if !self.has_selection_range(node) {
            return Ok(());
        }
        let value = self.field_value(node);
        let len = value.chars().count();
        let range = (start.min(end).min(len), start.max(end).min(len));
        let state = self.fields.entry(node).or_insert(FieldState {
            value,
            selection: None,
        });
        state.selection = Some(range);
        Ok(())
    }

    pub fn dispatch_event(&mut self, target: NodeId, kind: DomEventKind) {
        let key = match kind {
            DomEventKind::Input => None,
            DomEventKind::KeyUp => Some("a"),
        };
        self.events.push(DispatchedEvent {
            target,
            kind,
            bubbles: true,
            key,
        });
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DispatchedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_click_listener(&mut self, node: NodeId, handler: ClickHandler) -> Result<(), DomError> {
        self.ensure_element(node)?;
        self.listeners.insert(node, handler);
        Ok(())
    }

    /// `style.pointerEvents = "none"` when disabled.
    pub fn set_pointer_events(&mut self, node: NodeId, enabled: bool) {
        if enabled {
            self.inert.remove(&node);
        } else {
            self.inert.insert(node);
        }
    }

    pub fn pointer_events_enabled(&self, node: NodeId) -> bool {
        !self.inert.contains(&node)
    }

    /// Simulates a user click. Returns the handler future, or `None` when the
    /// click cannot register (pointer interaction disabled or no listener).
    pub fn click(&self, node: NodeId) -> Option<LocalBoxFuture<'static, ()>> {
        if !self.pointer_events_enabled(node) {
            return None;
        }
        self.listeners.get(&node).map(|handler| handler())
    }

    pub fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Notified once per recorded mutation batch.
    pub fn mutation_signal(&self) -> Arc<Notify> {
        self.mutation_signal.clone()
    }


    pub fn document_html(&self) -> String {
        self.html.root_element().html()
    }

    fn scope_element(&self, scope: Option<NodeId>) -> Option<ElementRef<'_>> {
        match scope {
            Some(node) => self.element(node),
            None => Some(self.html.root_element()),
        }
    }

    fn ensure_exists(&self, node: NodeId) -> Result<(), DomError> {
        self.html
            .tree
            .get(node)
            .map(|_| ())
            .ok_or(DomError::UnknownNode(node))
    }

    fn ensure_element(&self, node: NodeId) -> Result<(), DomError> {
        self.ensure_exists(node)?;
        if self.is_element(node) {
            Ok(())
        } else {
            Err(DomError::NotAnElement(node))
        }
    }

    fn children_checked(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.ensure_element(node)?;
        Ok(self.children(node))
    }

    fn child_index(&self, node: NodeId) -> usize {
        self.html
            .tree
            .get(node)
            .map(|n| n.prev_siblings().count())
            .unwrap_or(0)
    }

    fn subtree_ids(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|n| n.descendants().map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    fn forget_nodes(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.listeners.remove(node);
            self.inert.remove(node);
            self.fields.remove(node);
        }
        if let Some(range) = self.selection {
            if nodes.contains(&range.container) {
                self.selection = None;
            }
        }
        if let Some(focused) = self.focused {
            if nodes.contains(&focused) {
                self.focused = None;
            }
        }
    }

    fn copy_subtree(&mut self, source: NodeRef<'_, Node>, parent: NodeId) -> Result<NodeId, DomError> {
        let copied = self
            .html
            .tree
            .get_mut(parent)
            .ok_or(DomError::UnknownNode(parent))?
            .append(source.value().clone())
            .id();
        for child in source.children() {
            self.copy_subtree(child, copied)?;
        }
        Ok(copied)
    }

    fn record_addition(&mut self, target: NodeId, added_nodes: Vec<NodeId>) {
        if added_nodes.is_empty() || !self.is_attached(target) {
            return;
        }
        self.mutations.push(MutationRecord {
            target,
            added_nodes,
        });
        self.mutation_signal.notify_one();
    }
}

fn text_node(text: &str) -> Node {
    Node::Text(Text { text: text.into() })
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Emits a pending block break unless the text already ends a line.
fn flush_break(out: &mut String, pending_break: &mut bool) {
    if std::mem::take(pending_break) && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(escape_attribute(r#"a"b<c>&"#), "a&quot;b&lt;c&gt;&amp;");
    }

    #[test]
    fn names_must_be_simple_identifiers() {
        assert!(is_valid_name("data-tooltip"));
        assert!(is_valid_name("div"));
        assert!(!is_valid_name("div onclick"));
        assert!(!is_valid_name("1div"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn created_elements_keep_attributes() {
        let mut doc = HostDocument::parse("<body></body>");
        let node = doc
            .create_element("div", &[("class", "a b"), ("data-tooltip", "say \"hi\"")])
            .unwrap();
        assert!(doc.has_class(node, "b"));
        assert_eq!(doc.attr(node, "data-tooltip"), Some("say \"hi\""));
        assert!(!doc.is_attached(node));
    }
}
