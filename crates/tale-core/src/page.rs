#![forbid(unsafe_code)]

//! The contract every page in the tree implements.
//!
//! A page receives state pushed down by its parent through
//! [`Page::update_state`], reacts to its own messages in [`Page::update`],
//! and reports state changes upward as typed events in the returned
//! [`Update`]. Parents copy the reported sub-state into their own state and
//! report the merged state to their own parent.
//!
//! ```text
//!   parent.update_state(s)           child event NewState(c)
//!        │                                  │
//!        ▼                                  ▼
//!   normalize(s) ─▶ navigator.go_to   parent.state.child = c
//!                       │                   │
//!                       ▼                   ▼
//!              child.update_state(s.child)  emit NewState(parent.state)
//! ```

use std::fmt;

use crate::cmd::Cmd;

/// A component that can be mounted by a [`PageNavigator`](crate::navigator::PageNavigator).
pub trait Page {
    /// Plain data record pushed down by the parent.
    type State: Clone + Default + PartialEq + fmt::Debug;

    /// Messages handled by [`Page::update`].
    type Msg: 'static;

    /// Notifications reported to the parent.
    type Event;

    /// Replace this page's state.
    ///
    /// `None` asks the page to build its own default state. Returned commands
    /// carry any deferred normalization work.
    fn update_state(&mut self, state: Option<Self::State>) -> Cmd<Self::Msg>;

    /// Handle a message addressed to this page or one of its children.
    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg, Self::Event>;

    /// The state last stored by this page.
    fn state(&self) -> &Self::State;

    /// Detach everything this page owns, including mounted children.
    fn remove(&mut self);
}

/// Result of [`Page::update`]: follow-up commands and events for the parent.
#[must_use]
pub struct Update<M, E> {
    pub cmd: Cmd<M>,
    pub events: Vec<E>,
}

impl<M, E> Default for Update<M, E> {
    fn default() -> Self {
        Self {
            cmd: Cmd::None,
            events: Vec::new(),
        }
    }
}

impl<M: fmt::Debug, E: fmt::Debug> fmt::Debug for Update<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("cmd", &self.cmd)
            .field("events", &self.events)
            .finish()
    }
}

impl<M, E> Update<M, E> {
    /// Nothing to do.
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a command.
    pub fn cmd(cmd: Cmd<M>) -> Self {
        Self {
            cmd,
            events: Vec::new(),
        }
    }

    /// Only an event.
    pub fn event(event: E) -> Self {
        Self {
            cmd: Cmd::None,
            events: vec![event],
        }
    }

    /// Append an event.
    pub fn with_event(mut self, event: E) -> Self {
        self.events.push(event);
        self
    }

    /// Append a command, batching with any existing one.
    pub fn with_cmd(mut self, cmd: Cmd<M>) -> Self {
        let prev = std::mem::replace(&mut self.cmd, Cmd::None);
        self.cmd = Cmd::batch(vec![prev, cmd]);
        self
    }

    /// Whether there is nothing to report or run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cmd.is_none() && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_builders() {
        let u: Update<u8, &str> = Update::event("a").with_event("b");
        assert_eq!(u.events, vec!["a", "b"]);
        assert!(u.cmd.is_none());

        let u: Update<u8, &str> = Update::cmd(Cmd::msg(1)).with_cmd(Cmd::msg(2));
        assert!(matches!(u.cmd, Cmd::Batch(ref v) if v.len() == 2));
        assert!(u.events.is_empty());
    }

    #[test]
    fn empty_update() {
        let u: Update<u8, u8> = Update::none();
        assert!(u.is_empty());
        assert!(!Update::<u8, u8>::event(1).is_empty());
    }
}
