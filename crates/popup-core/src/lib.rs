#![forbid(unsafe_code)]

//! Document model for popup: an element tree with class lists, attribute
//! storage, a small selector engine, and bubbling event dispatch.
//!
//! The model stands in for the host page. Controllers built on top of it
//! (see `popup-widgets`) only toggle classes and register listeners; nothing
//! here renders.

pub mod document;
pub mod event;
pub mod node;
pub mod selector;

pub use document::{Document, DomError};
pub use event::{ClickEvent, Event, EventTarget, EventType, Key, KeyEvent, Listener, ListenerId};
pub use node::{ElementData, NodeId, NodeKind};
pub use selector::{SelectorError, SelectorList};
