#![forbid(unsafe_code)]

//! Page fixtures for popup integration tests.
//!
//! [`PageFixture`] builds the page a dialog expects: `<html>` and `<body>`,
//! a shared `.bg-darkener` backdrop, and any number of dialogs with nested
//! content and `[data-close]` buttons. [`ClassSnapshot`] captures every
//! element's class list so a test can assert that a round trip restored the
//! page exactly.

use std::sync::Once;

use popup_core::{Document, NodeId};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const BACKDROP_CLASS: &str = "bg-darkener";

/// Install a test-writer `fmt` subscriber once per process.
///
/// Later calls, and calls after another subscriber was installed, are no-ops.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(false),
            )
            .try_init();
    });
}

/// A dialog element built by [`PageFixture::add_dialog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFixture {
    pub root: NodeId,
    /// A `<form>` inside the dialog; clicks on it must not close the dialog.
    pub content: NodeId,
    /// `[data-close]` buttons, inside `content`.
    pub close_buttons: Vec<NodeId>,
}

/// A page with body, root and an optional backdrop.
#[derive(Debug, Clone)]
pub struct PageFixture {
    pub doc: Document,
    pub backdrop: Option<NodeId>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFixture {
    /// A page with a `.bg-darkener` backdrop.
    pub fn new() -> Self {
        let mut page = Self::without_backdrop();
        page.backdrop = Some(page.add_element("div", &[("class", BACKDROP_CLASS)]));
        page
    }

    pub fn without_backdrop() -> Self {
        Self {
            doc: Document::new(),
            backdrop: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.doc.body().expect("document has a body")
    }

    pub fn root(&self) -> NodeId {
        self.doc.document_element().expect("document has a root")
    }

    /// Append an element with the given attributes to `<body>`.
    pub fn add_element(&self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.doc.create_element(tag);
        for (name, value) in attributes {
            self.doc
                .set_attribute(node, name, value)
                .expect("fresh element accepts attributes");
        }
        self.doc
            .append_child(self.body(), node)
            .expect("body accepts children");
        node
    }

    /// Append `<div id=..><form>..buttons..</form></div>` to `<body>`.
    pub fn add_dialog(&self, id: &str, close_buttons: usize) -> DialogFixture {
        let root = self.add_element("div", &[("id", id), ("class", "popup")]);
        let content = self.doc.create_element("form");
        self.doc
            .append_child(root, content)
            .expect("dialog accepts children");
        let title = self.doc.create_text("Request a callback");
        self.doc
            .append_child(content, title)
            .expect("form accepts text");
        let close_buttons = (0..close_buttons)
            .map(|_| {
                let button = self.doc.create_element("button");
                self.doc
                    .set_attribute(button, "data-close", "")
                    .expect("button accepts attributes");
                self.doc
                    .append_child(content, button)
                    .expect("form accepts children");
                button
            })
            .collect();
        DialogFixture {
            root,
            content,
            close_buttons,
        }
    }

    /// Whether `<body>` and `<html>` both carry `class`.
    pub fn scroll_locked(&self, class: &str) -> bool {
        self.doc.has_class(self.body(), class) && self.doc.has_class(self.root(), class)
    }

    pub fn backdrop_has(&self, class: &str) -> bool {
        self.backdrop
            .is_some_and(|backdrop| self.doc.has_class(backdrop, class))
    }

    pub fn snapshot(&self) -> ClassSnapshot {
        ClassSnapshot::capture(&self.doc)
    }
}

/// Class lists of every connected element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSnapshot {
    entries: Vec<(NodeId, Vec<String>)>,
}

impl ClassSnapshot {
    pub fn capture(doc: &Document) -> Self {
        let elements = doc.query_selector_all("*").unwrap_or_default();
        Self {
            entries: elements
                .into_iter()
                .map(|node| (node, doc.classes(node)))
                .collect(),
        }
    }

    /// Elements whose class lists differ between `self` and `other`.
    pub fn changed(&self, other: &Self) -> Vec<NodeId> {
        let mut changed: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|entry| !other.entries.contains(entry))
            .chain(
                other
                    .entries
                    .iter()
                    .filter(|entry| !self.entries.contains(entry)),
            )
            .map(|(node, _)| *node)
            .collect();
        changed.sort_unstable();
        changed.dedup();
        changed
    }
}
