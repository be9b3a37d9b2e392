#![forbid(unsafe_code)]

//! Reply composer for a single reply target.
//!
//! Cached by target id so a half-written draft survives leaving the page.

use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyState {
    /// Comment or message being replied to.
    pub target: String,
    pub draft: String,
    /// Replies sent to this target in this session.
    pub sent: u32,
}

impl ReplyState {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMsg {
    Edit(String),
    Send,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    NewState(ReplyState),
}

pub struct ReplyPage {
    state: ReplyState,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl ReplyPage {
    pub fn new(sink: Rc<dyn RegionSink>) -> Self {
        Self {
            state: ReplyState::default(),
            sink,
            nodes: MountedNodes::new(),
        }
    }

    fn render(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
        let composer = Node::new(format!("reply:{}", self.state.target));
        self.nodes.append(self.sink.as_ref(), Region::Main, vec![composer]);
        let send = Node::new(format!("reply-send:{}", self.state.target));
        self.nodes.append(self.sink.as_ref(), Region::SideController, vec![send]);
    }
}

impl Page for ReplyPage {
    type State = ReplyState;
    type Msg = ReplyMsg;
    type Event = ReplyEvent;

    fn update_state(&mut self, state: Option<ReplyState>) -> Cmd<ReplyMsg> {
        self.state = state.unwrap_or_default();
        self.render();
        Cmd::none()
    }

    fn update(&mut self, msg: ReplyMsg) -> Update<ReplyMsg, ReplyEvent> {
        match msg {
            ReplyMsg::Edit(text) => self.state.draft = text,
            ReplyMsg::Send => {
                if self.state.draft.trim().is_empty() {
                    return Update::none();
                }
                tracing::debug!(target_id = %self.state.target, "reply sent");
                self.state.draft.clear();
                self.state.sent += 1;
            }
        }
        Update::event(ReplyEvent::NewState(self.state.clone()))
    }

    fn state(&self) -> &ReplyState {
        &self.state
    }

    fn remove(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tale_core::region::RecordingSink;

    #[test]
    fn send_clears_draft() {
        let sink = Rc::new(RecordingSink::new());
        let mut page = ReplyPage::new(sink.clone());
        let _ = page.update_state(Some(ReplyState::new("c42")));
        assert_eq!(sink.keys(Region::SideController), vec!["reply-send:c42"]);

        let _ = page.update(ReplyMsg::Edit("nice".into()));
        let update = page.update(ReplyMsg::Send);

        assert_eq!(
            update.events,
            vec![ReplyEvent::NewState(ReplyState {
                target: "c42".into(),
                draft: String::new(),
                sent: 1
            })]
        );
    }

    #[test]
    fn empty_draft_not_sent() {
        let mut page = ReplyPage::new(Rc::new(RecordingSink::new()));
        let _ = page.update_state(Some(ReplyState::new("c1")));
        assert!(page.update(ReplyMsg::Send).is_empty());
        assert_eq!(page.state().sent, 0);
    }
}
