#![forbid(unsafe_code)]

//! Close-confirmation capability.
//!
//! A [`ConfirmProvider`] answers "really close?" for a prompt string. It can
//! answer at once ([`Confirmation::Accept`] / [`Confirmation::Decline`]) or
//! [`Confirmation::Defer`] the decision; a deferred close is completed later
//! with [`Popup::resolve_close_confirmation`](super::Popup::resolve_close_confirmation)
//! and the dialog stays open and interactive meanwhile.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accept,
    Decline,
    /// The answer arrives later.
    Defer,
}

impl From<bool> for Confirmation {
    fn from(accepted: bool) -> Self {
        if accepted { Self::Accept } else { Self::Decline }
    }
}

/// Something that can ask the user to confirm closing a dialog.
pub trait ConfirmProvider {
    fn confirm(&self, message: &str) -> Confirmation;
}

/// Accepts every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAccept;

impl ConfirmProvider for AlwaysAccept {
    fn confirm(&self, _message: &str) -> Confirmation {
        Confirmation::Accept
    }
}

/// Declines every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

impl ConfirmProvider for AlwaysDecline {
    fn confirm(&self, _message: &str) -> Confirmation {
        Confirmation::Decline
    }
}

/// Defers every prompt; the host resolves it asynchronously.
#[derive(Debug, Clone, Default)]
pub struct DeferConfirm {
    prompts: Rc<RefCell<Vec<String>>>,
}

impl DeferConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts shown so far. Clones share the log.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl ConfirmProvider for DeferConfirm {
    fn confirm(&self, message: &str) -> Confirmation {
        self.prompts.borrow_mut().push(message.to_owned());
        Confirmation::Defer
    }
}

/// Adapter for a closure returning `bool`.
pub struct ConfirmFn<F>(F);

/// Wrap a closure as a provider.
///
/// ```
/// use popup_widgets::{ConfirmProvider, Confirmation, confirm_fn};
/// let provider = confirm_fn(|message: &str| message.ends_with('?'));
/// assert_eq!(provider.confirm("Close?"), Confirmation::Accept);
/// ```
pub fn confirm_fn<F: Fn(&str) -> bool>(f: F) -> ConfirmFn<F> {
    ConfirmFn(f)
}

impl<F: Fn(&str) -> bool> ConfirmProvider for ConfirmFn<F> {
    fn confirm(&self, message: &str) -> Confirmation {
        (self.0)(message).into()
    }
}

impl<F> core::fmt::Debug for ConfirmFn<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ConfirmFn(..)")
    }
}

#[derive(Debug)]
struct Script {
    queued: VecDeque<Confirmation>,
    fallback: Confirmation,
    prompts: Vec<String>,
}

/// Answers from a queue, then a fallback; records every prompt.
///
/// Clones share the queue and the log, so a test can keep one handle and
/// install the other in a controller.
#[derive(Debug, Clone)]
pub struct ScriptedConfirm {
    script: Rc<RefCell<Script>>,
}

impl Default for ScriptedConfirm {
    fn default() -> Self {
        Self::new(Confirmation::Accept)
    }
}

impl ScriptedConfirm {
    /// A script that answers `fallback` once the queue is empty.
    pub fn new(fallback: Confirmation) -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                queued: VecDeque::new(),
                fallback,
                prompts: Vec::new(),
            })),
        }
    }

    /// Queue the next answer.
    pub fn enqueue(&self, answer: Confirmation) {
        self.script.borrow_mut().queued.push_back(answer);
    }

    pub fn set_fallback(&self, answer: Confirmation) {
        self.script.borrow_mut().fallback = answer;
    }

    pub fn prompts(&self) -> Vec<String> {
        self.script.borrow().prompts.clone()
    }

    pub fn prompt_count(&self) -> usize {
        self.script.borrow().prompts.len()
    }
}

impl ConfirmProvider for ScriptedConfirm {
    fn confirm(&self, message: &str) -> Confirmation {
        let mut script = self.script.borrow_mut();
        script.prompts.push(message.to_owned());
        let fallback = script.fallback;
        script.queued.pop_front().unwrap_or(fallback)
    }
}
