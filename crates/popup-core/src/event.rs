#![forbid(unsafe_code)]

//! Events, keys, and listener handles.
//!
//! A [`Listener`] carries a process-unique [`ListenerId`]. Clones share the
//! id, so a listener created once and stored by its owner can later be
//! removed from the document by identity, the same way a bound callback is.

use core::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::NodeId;

/// Global counter for unique listener ids.
static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A callback with stable identity.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Rc<dyn Fn(&Event)>,
}

impl Listener {
    /// Wrap a callback, assigning it a fresh identity.
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            id: ListenerId::next(),
            callback: Rc::new(callback),
        }
    }

    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback directly, outside of any dispatch.
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id.0).finish()
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

/// Where a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The document itself (end of every propagation path).
    Document,
    /// A node in the tree.
    Node(NodeId),
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// Event type used as the listener-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::KeyDown => write!(f, "keydown"),
        }
    }
}

/// Logical key value, compared the way `KeyboardEvent.key` is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
    /// Any other named key, stored verbatim (e.g. `"Esc"`, `"F1"`).
    Named(String),
}

impl Key {
    /// Parse a key name. Only the exact string `"Escape"` yields [`Key::Escape`].
    pub fn parse(name: &str) -> Self {
        match name {
            "Escape" => Self::Escape,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Named(name.to_owned()),
                }
            }
        }
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        matches!(self, Self::Escape)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escape => write!(f, "Escape"),
            Self::Enter => write!(f, "Enter"),
            Self::Tab => write!(f, "Tab"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A click on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// The innermost node that was clicked.
    pub target: NodeId,
}

/// A key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Focused node, if any. Without one the event starts at `<body>`.
    pub target: Option<NodeId>,
}

/// Events understood by the document dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Click(ClickEvent),
    KeyDown(KeyEvent),
}

impl Event {
    /// A click whose original target is `target`.
    pub fn click(target: NodeId) -> Self {
        Self::Click(ClickEvent { target })
    }

    /// A keydown with no focused node.
    pub fn key(key: Key) -> Self {
        Self::KeyDown(KeyEvent { key, target: None })
    }

    /// A keydown originating at `target`.
    pub fn key_at(key: Key, target: NodeId) -> Self {
        Self::KeyDown(KeyEvent {
            key,
            target: Some(target),
        })
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::Click(_) => EventType::Click,
            Self::KeyDown(_) => EventType::KeyDown,
        }
    }

    /// Original target of the event, if it has one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Click(click) => Some(click.target),
            Self::KeyDown(key) => key.target,
        }
    }

    /// The key, for keyboard events.
    pub fn key_value(&self) -> Option<&Key> {
        match self {
            Self::KeyDown(key) => Some(&key.key),
            Self::Click(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn only_exact_escape_parses_as_escape() {
        assert_eq!(Key::parse("Escape"), Key::Escape);
        assert_eq!(Key::parse("Esc"), Key::Named("Esc".into()));
        assert_eq!(Key::parse("escape"), Key::Named("escape".into()));
        assert_eq!(Key::parse("a"), Key::Char('a'));
        assert!(!Key::parse("Enter").is_escape());
    }

    #[test]
    fn listener_clones_share_identity() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let listener = Listener::new(move |_| counter.set(counter.get() + 1));
        let clone = listener.clone();
        assert_eq!(listener, clone);
        assert_ne!(listener, Listener::new(|_| {}));

        clone.call(&Event::key(Key::Enter));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn unique_listener_ids() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});
        assert_ne!(a.id(), b.id());
        assert!(b.id().id() > a.id().id());
    }
}
