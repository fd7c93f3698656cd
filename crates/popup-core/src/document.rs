#![forbid(unsafe_code)]

//! Shared document handle: tree mutation, class lists, queries, listeners.
//!
//! # Architecture
//!
//! `Document` is a cheap-to-clone handle over `Rc<RefCell<..>>`, so every
//! controller on a page can hold the same document. The dispatcher never keeps
//! the inner borrow while a listener runs, which lets listeners mutate classes
//! and add or remove listeners (including themselves) re-entrantly.
//!
//! # Invariants
//!
//! 1. A listener is registered at most once per `(target, type)` pair; adding
//!    a listener with an id already present is a no-op.
//! 2. Propagation visits the target, then each ancestor, then the document.
//!    Listeners of each stop are snapshotted when that stop is reached.
//! 3. A class hold count is never negative; the class is removed when the
//!    last hold is released.
//!
//! # Failure Modes
//!
//! | Operation | Failure | Behavior |
//! |-----------|---------|----------|
//! | Tree mutation on unknown node | Bad `NodeId` | `Err(DomError::UnknownNode)` |
//! | `append_child` creating a cycle | Hierarchy | `Err(DomError::Hierarchy)` |
//! | Class ops on text / unknown nodes | Not an element | Returns `false` |
//! | Empty or whitespace class token | Invalid token | Returns `false` |
//! | Malformed selector | Parse error | `Err(SelectorError)` |

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::event::{Event, EventTarget, EventType, Listener, ListenerId};
use crate::node::{ElementData, NodeId, NodeKind, Tree};
use crate::selector::{SelectorError, SelectorList};

/// Errors from tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not belong to this document.
    UnknownNode(NodeId),
    /// The operation requires an element but got a text node.
    NotAnElement(NodeId),
    /// Inserting the child would make a node its own ancestor.
    Hierarchy { parent: NodeId, child: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::NotAnElement(id) => write!(f, "{id} is not an element"),
            Self::Hierarchy { parent, child } => {
                write!(f, "cannot insert {child} under its descendant {parent}")
            }
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Default)]
struct DocumentInner {
    tree: Tree,
    root: Option<NodeId>,
    body: Option<NodeId>,
    listeners: AHashMap<(EventTarget, EventType), Vec<Listener>>,
    class_holds: AHashMap<(NodeId, String), usize>,
}

/// Shared handle to an element tree with listeners.
#[derive(Clone, Default)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &inner.tree.len())
            .field("listeners", &inner.listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

fn valid_token(class: &str) -> bool {
    !class.is_empty() && !class.chars().any(char::is_whitespace)
}

impl Document {
    /// Create a document with an `<html>` root holding `<head>` and `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let doc = Self::default();
        {
            let mut inner = doc.inner.borrow_mut();
            let html = inner.tree.push(NodeKind::Element(ElementData::new("html")));
            let head = inner.tree.push(NodeKind::Element(ElementData::new("head")));
            let body = inner.tree.push(NodeKind::Element(ElementData::new("body")));
            for child in [head, body] {
                if let Some(node) = inner.tree.get_mut(child) {
                    node.parent = Some(html);
                }
                if let Some(node) = inner.tree.get_mut(html) {
                    node.children.push(child);
                }
            }
            inner.root = Some(html);
            inner.body = Some(body);
        }
        doc
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.inner.borrow().root
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.inner.borrow().body
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // --- Tree ---

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner
            .borrow_mut()
            .tree
            .push(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner
            .borrow_mut()
            .tree
            .push(NodeKind::Text(text.to_owned()))
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        let tree = &mut inner.tree;
        if tree.get(child).is_none() {
            return Err(DomError::UnknownNode(child));
        }
        if tree.get(parent).is_none() {
            return Err(DomError::UnknownNode(parent));
        }
        if tree.element(parent).is_none() {
            return Err(DomError::NotAnElement(parent));
        }
        if tree.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }
        tree.detach(child);
        if let Some(node) = tree.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = tree.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Detach `child` from its parent. Detached nodes keep their subtree.
    pub fn remove(&self, child: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        if inner.tree.get(child).is_none() {
            return Err(DomError::UnknownNode(child));
        }
        inner.tree.detach(child);
        Ok(())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().tree.parent(node)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .tree
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Ancestors of `node`, nearest first.
    #[must_use]
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        let mut cursor = inner.tree.parent(node);
        while let Some(current) = cursor {
            out.push(current);
            cursor = inner.tree.parent(current);
        }
        out
    }

    /// Whether `node` is `ancestor` or inside it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.borrow().tree.is_inclusive_ancestor(ancestor, node)
    }

    /// Whether the node is attached under the document root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        inner
            .root
            .is_some_and(|root| inner.tree.is_inclusive_ancestor(root, node))
    }

    /// Whether the id belongs to this document (element or text).
    #[must_use]
    pub fn has_node(&self, node: NodeId) -> bool {
        self.inner.borrow().tree.get(node).is_some()
    }

    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.inner.borrow().tree.element(node).is_some()
    }

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().tree.element(node).map(|e| e.tag.clone())
    }

    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        let mut nodes = vec![node];
        nodes.extend(inner.tree.descendants(node));
        for id in nodes {
            if let Some(NodeKind::Text(text)) = inner.tree.get(id).map(|n| &n.kind) {
                out.push_str(text);
            }
        }
        out
    }

    // --- Attributes ---

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        if inner.tree.get(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        let element = inner
            .tree
            .element_mut(node)
            .ok_or(DomError::NotAnElement(node))?;
        element.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> bool {
        self.inner
            .borrow_mut()
            .tree
            .element_mut(node)
            .is_some_and(|e| e.remove_attribute(name))
    }

    #[must_use]
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.borrow().tree.element(node)?.attribute(name)
    }

    #[must_use]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    // --- Class list ---

    /// Add a class token. Returns `true` if the class list changed.
    pub fn add_class(&self, node: NodeId, class: &str) -> bool {
        if !valid_token(class) {
            return false;
        }
        self.inner
            .borrow_mut()
            .tree
            .element_mut(node)
            .is_some_and(|e| e.add_class(class))
    }

    /// Remove a class token. Returns `true` if the class list changed.
    pub fn remove_class(&self, node: NodeId, class: &str) -> bool {
        if !valid_token(class) {
            return false;
        }
        self.inner
            .borrow_mut()
            .tree
            .element_mut(node)
            .is_some_and(|e| e.remove_class(class))
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .tree
            .element(node)
            .is_some_and(|e| e.has_class(class))
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner
            .borrow()
            .tree
            .element(node)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    /// Take a counted hold on `class` for `node`, applying it on the first
    /// hold. Returns the number of holds after the call.
    pub fn acquire_class(&self, node: NodeId, class: &str) -> usize {
        if !valid_token(class) || !self.is_element(node) {
            return 0;
        }
        let mut inner = self.inner.borrow_mut();
        let count = inner
            .class_holds
            .entry((node, class.to_owned()))
            .or_insert(0);
        *count += 1;
        let count = *count;
        if let Some(element) = inner.tree.element_mut(node) {
            element.add_class(class);
        }
        count
    }

    /// Release one hold on `class` for `node`, removing the class when the
    /// last hold goes away. Releasing with no holds outstanding is a no-op.
    /// Returns the number of holds remaining.
    pub fn release_class(&self, node: NodeId, class: &str) -> usize {
        let mut inner = self.inner.borrow_mut();
        let key = (node, class.to_owned());
        let Some(count) = inner.class_holds.get_mut(&key) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            inner.class_holds.remove(&key);
            if let Some(element) = inner.tree.element_mut(node) {
                element.remove_class(class);
            }
        }
        remaining
    }

    /// Release one hold without touching the class list, leaving the class
    /// applied even when no holds remain. Returns the holds remaining.
    pub fn drop_class_hold(&self, node: NodeId, class: &str) -> usize {
        let mut inner = self.inner.borrow_mut();
        let key = (node, class.to_owned());
        let Some(count) = inner.class_holds.get_mut(&key) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            inner.class_holds.remove(&key);
        }
        remaining
    }

    #[must_use]
    pub fn class_holds(&self, node: NodeId, class: &str) -> usize {
        self.inner
            .borrow()
            .class_holds
            .get(&(node, class.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    // --- Queries ---

    /// First connected element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// All connected elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let inner = self.inner.borrow();
        let Some(root) = inner.root else {
            return Ok(Vec::new());
        };
        let mut candidates = vec![root];
        candidates.extend(inner.tree.descendants(root));
        Ok(candidates
            .into_iter()
            .filter(|&node| list.matches(&inner.tree, node))
            .collect())
    }

    /// Descendants of `scope` (excluding `scope`) matching `selector`.
    ///
    /// The selector is evaluated against the whole tree, so ancestors of
    /// `scope` may satisfy descendant combinators.
    pub fn query_selector_all_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let inner = self.inner.borrow();
        Ok(inner
            .tree
            .descendants(scope)
            .into_iter()
            .filter(|&node| list.matches(&inner.tree, node))
            .collect())
    }

    pub fn query_selector_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        Ok(self
            .query_selector_all_within(scope, selector)?
            .into_iter()
            .next())
    }

    // --- Listeners ---

    /// Register `listener`. Returns `false` if the same listener is already
    /// registered for this target and type.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        listener: &Listener,
    ) -> bool {
        let target = target.into();
        let mut inner = self.inner.borrow_mut();
        let slot = inner.listeners.entry((target, event_type)).or_default();
        if slot.iter().any(|l| l.id() == listener.id()) {
            return false;
        }
        slot.push(listener.clone());
        #[cfg(feature = "tracing")]
        tracing::trace!(?target, %event_type, listener = listener.id().id(), "listener added");
        true
    }

    /// Unregister `listener` by identity. Returns `false` if it was absent.
    pub fn remove_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        listener: &Listener,
    ) -> bool {
        self.remove_listener_id(target.into(), event_type, listener.id())
    }

    fn remove_listener_id(
        &self,
        target: EventTarget,
        event_type: EventType,
        id: ListenerId,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.listeners.get_mut(&(target, event_type)) else {
            return false;
        };
        let before = slot.len();
        slot.retain(|l| l.id() != id);
        let removed = before != slot.len();
        if slot.is_empty() {
            inner.listeners.remove(&(target, event_type));
        }
        if removed {
            #[cfg(feature = "tracing")]
            tracing::trace!(?target, %event_type, listener = id.id(), "listener removed");
        }
        removed
    }

    #[must_use]
    pub fn listener_count(&self, target: impl Into<EventTarget>, event_type: EventType) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&(target.into(), event_type))
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn has_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        listener: &Listener,
    ) -> bool {
        self.inner
            .borrow()
            .listeners
            .get(&(target.into(), event_type))
            .is_some_and(|slot| slot.iter().any(|l| l.id() == listener.id()))
    }

    /// Total listeners registered anywhere in the document.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.values().map(Vec::len).sum()
    }

    // --- Dispatch ---

    /// Propagation path: target, ancestors (nearest first), document.
    fn propagation_path(&self, event: &Event) -> Vec<EventTarget> {
        let start = event.target().or_else(|| self.body());
        let mut path: Vec<EventTarget> = Vec::new();
        if let Some(start) = start {
            path.push(EventTarget::Node(start));
            path.extend(self.ancestors(start).into_iter().map(EventTarget::Node));
        }
        path.push(EventTarget::Document);
        path
    }

    /// Dispatch `event` along its propagation path. Returns the number of
    /// listener invocations.
    pub fn dispatch(&self, event: &Event) -> usize {
        let event_type = event.event_type();
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "dom_dispatch",
            event = %event_type,
            target = ?event.target()
        )
        .entered();

        let mut invoked = 0;
        for stop in self.propagation_path(event) {
            let snapshot: Vec<Listener> = self
                .inner
                .borrow()
                .listeners
                .get(&(stop, event_type))
                .cloned()
                .unwrap_or_default();
            for listener in snapshot {
                // Skip listeners removed by an earlier listener at this stop.
                let still_registered = self
                    .inner
                    .borrow()
                    .listeners
                    .get(&(stop, event_type))
                    .is_some_and(|slot| slot.iter().any(|l| l.id() == listener.id()));
                if still_registered {
                    listener.call(event);
                    invoked += 1;
                }
            }
        }
        invoked
    }
}
