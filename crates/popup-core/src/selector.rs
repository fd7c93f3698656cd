#![forbid(unsafe_code)]

//! A small CSS selector engine.
//!
//! Supported grammar:
//!
//! - type (`div`), universal (`*`), `#id`, `.class`
//! - `[attr]` and `[attr=value]` (value bare, single- or double-quoted)
//! - compounds of the above (`button.primary[data-close]`)
//! - descendant (whitespace) and child (`>`) combinators
//! - selector lists (`a, b`)
//!
//! # Failure Modes
//!
//! | Input | Result |
//! |-------|--------|
//! | Empty or whitespace-only | [`SelectorError::Empty`] |
//! | Pseudo-classes, `+`, `~`, etc. | [`SelectorError::Unexpected`] |
//! | `[attr` without `]` | [`SelectorError::UnexpectedEnd`] |

use core::fmt;

use crate::node::{NodeId, Tree};

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one entry of a list) was empty.
    Empty,
    /// A character the engine does not understand, with its byte offset.
    Unexpected { ch: char, offset: usize },
    /// Input ended in the middle of a token.
    UnexpectedEnd,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unexpected { ch, offset } => {
                write!(f, "unexpected '{ch}' at offset {offset}")
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of selector"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrSelector {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    universal: bool,
}

impl Compound {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && *tag != element.tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.attribute("id").as_deref() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrSelector::Exists(name) => element.attribute(name).is_some(),
            AttrSelector::Equals(name, value) => {
                element.attribute(name).as_deref() == Some(value.as_str())
            }
        })
    }
}

/// One complex selector; `parts[i].0` is the combinator linking part `i` to
/// part `i - 1` (ignored for the first part).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        match self.parts.len() {
            0 => false,
            n => self.matches_from(tree, n - 1, node),
        }
    }

    fn matches_from(&self, tree: &Tree, idx: usize, node: NodeId) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(tree, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|parent| self.matches_from(tree, idx - 1, parent)),
            Combinator::Descendant => {
                let mut cursor = tree.parent_element(node);
                while let Some(ancestor) = cursor {
                    if self.matches_from(tree, idx - 1, ancestor) {
                        return true;
                    }
                    cursor = tree.parent_element(ancestor);
                }
                false
            }
        }
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    pub(crate) fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn unexpected(&self) -> SelectorError {
        match self.chars.get(self.pos) {
            Some(&(offset, ch)) => SelectorError::Unexpected { ch, offset },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let first = self.parse_compound()?;
        if first.is_empty() {
            return match self.peek() {
                None | Some(',') => Err(SelectorError::Empty),
                Some(_) => Err(self.unexpected()),
            };
        }
        let mut parts = vec![(Combinator::Descendant, first)];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(self.unexpected());
            }
            parts.push((combinator, compound));
        }
        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.pos += 1;
            compound.universal = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                _ => return Ok(compound),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek()
            && is_ident_char(c)
        {
            ident.push(c);
            self.pos += 1;
        }
        if ident.is_empty() {
            return Err(self.unexpected());
        }
        Ok(ident)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrSelector::Exists(name))
            }
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.pos += 1;
                        self.parse_quoted(quote)?
                    }
                    _ => self.parse_ident()?,
                };
                self.skip_ws();
                if self.peek() != Some(']') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(AttrSelector::Equals(name, value))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || (!c.is_ascii() && !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ElementData, NodeKind};

    fn element(
        tree: &mut Tree,
        parent: Option<NodeId>,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attribute(name, value);
        }
        let id = tree.push(NodeKind::Element(data));
        if let Some(parent) = parent {
            tree.get_mut(id).unwrap().parent = Some(parent);
            tree.get_mut(parent).unwrap().children.push(id);
        }
        id
    }

    #[test]
    fn parses_compound_selectors() {
        assert!(SelectorList::parse("div#callback-modal.popup[data-close]").is_ok());
        assert!(SelectorList::parse("[data-close='yes']").is_ok());
        assert!(SelectorList::parse("  .a > .b  .c , *  ").is_ok());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
        assert_eq!(SelectorList::parse("a,"), Err(SelectorError::Empty));
        assert_eq!(
            SelectorList::parse("a:hover"),
            Err(SelectorError::Unexpected { ch: ':', offset: 1 })
        );
        assert_eq!(SelectorList::parse("[data"), Err(SelectorError::UnexpectedEnd));
        assert_eq!(
            SelectorList::parse("a + b"),
            Err(SelectorError::Unexpected { ch: '+', offset: 2 })
        );
        assert!(SelectorList::parse("#").is_err());
    }

    #[test]
    fn matches_descendant_and_child() {
        let mut tree = Tree::default();
        let html = element(&mut tree, None, "html", &[]);
        let dialog = element(&mut tree, Some(html), "div", &[("class", "popup"), ("id", "m")]);
        let inner = element(&mut tree, Some(dialog), "div", &[("class", "content")]);
        let button = element(&mut tree, Some(inner), "button", &[("data-close", "")]);

        let descendant = SelectorList::parse(".popup button").unwrap();
        assert!(descendant.matches(&tree, button));

        let child = SelectorList::parse(".popup > button").unwrap();
        assert!(!child.matches(&tree, button));

        let child = SelectorList::parse("#m > .content > [data-close]").unwrap();
        assert!(child.matches(&tree, button));
        assert!(!child.matches(&tree, inner));
    }

    #[test]
    fn attribute_value_must_match_exactly() {
        let mut tree = Tree::default();
        let node = element(&mut tree, None, "button", &[("data-close", "soft")]);
        assert!(SelectorList::parse("[data-close=soft]").unwrap().matches(&tree, node));
        assert!(SelectorList::parse("[data-close=\"soft\"]").unwrap().matches(&tree, node));
        assert!(!SelectorList::parse("[data-close=hard]").unwrap().matches(&tree, node));
    }

    #[test]
    fn text_nodes_never_match() {
        let mut tree = Tree::default();
        let text = tree.push(NodeKind::Text("hello".into()));
        assert!(!SelectorList::parse("*").unwrap().matches(&tree, text));
    }
}
