#![forbid(unsafe_code)]

//! Quick tales list page.
//!
//! One instance per list context. Instances live in the shared tale cache,
//! so scrolling back to a list the user already visited restores it as it
//! was left.

use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickTalesState {
    /// Scroll offset in rows.
    pub scroll: u32,
    /// Highlighted tale.
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickTalesMsg {
    Scroll(u32),
    Select(String),
    /// Drill into a tale, pushing a new list context.
    Open(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickTalesEvent {
    NewState(QuickTalesState),
    OpenTale(String),
}

pub struct QuickTalesPage {
    key: String,
    state: QuickTalesState,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl QuickTalesPage {
    pub fn new(key: impl Into<String>, sink: Rc<dyn RegionSink>) -> Self {
        Self {
            key: key.into(),
            state: QuickTalesState::default(),
            sink,
            nodes: MountedNodes::new(),
        }
    }

    /// The list context this page shows.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.nodes.is_mounted()
    }

    fn render(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
        let list = Node::new(format!("tales:{}", self.key));
        self.nodes.append(self.sink.as_ref(), Region::Main, vec![list]);
    }
}

impl Page for QuickTalesPage {
    type State = QuickTalesState;
    type Msg = QuickTalesMsg;
    type Event = QuickTalesEvent;

    fn update_state(&mut self, state: Option<QuickTalesState>) -> Cmd<QuickTalesMsg> {
        self.state = state.unwrap_or_default();
        self.render();
        Cmd::none()
    }

    fn update(&mut self, msg: QuickTalesMsg) -> Update<QuickTalesMsg, QuickTalesEvent> {
        match msg {
            QuickTalesMsg::Scroll(offset) => {
                if self.state.scroll == offset {
                    return Update::none();
                }
                self.state.scroll = offset;
            }
            QuickTalesMsg::Select(id) => {
                self.state.selected = Some(id);
            }
            QuickTalesMsg::Open(id) => {
                self.state.selected = Some(id.clone());
                return Update::event(QuickTalesEvent::NewState(self.state.clone()))
                    .with_event(QuickTalesEvent::OpenTale(id));
            }
        }
        Update::event(QuickTalesEvent::NewState(self.state.clone()))
    }

    fn state(&self) -> &QuickTalesState {
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
    fn renders_and_detaches() {
        let sink = Rc::new(RecordingSink::new());
        let mut page = QuickTalesPage::new("feed", sink.clone());

        let _ = page.update_state(None);
        assert_eq!(sink.keys(Region::Main), vec!["tales:feed"]);

        let _ = page.update_state(Some(QuickTalesState::default()));
        assert_eq!(sink.len(), 1);

        page.remove();
        assert!(sink.is_empty());
        assert!(!page.is_mounted());
    }

    #[test]
    fn scroll_reports_state_once() {
        let mut page = QuickTalesPage::new("feed", Rc::new(RecordingSink::new()));
        let _ = page.update_state(None);

        let update = page.update(QuickTalesMsg::Scroll(12));
        assert_eq!(
            update.events,
            vec![QuickTalesEvent::NewState(QuickTalesState {
                scroll: 12,
                selected: None
            })]
        );
        assert!(page.update(QuickTalesMsg::Scroll(12)).is_empty());
    }

    #[test]
    fn open_reports_state_then_tale() {
        let mut page = QuickTalesPage::new("feed", Rc::new(RecordingSink::new()));
        let update = page.update(QuickTalesMsg::Open("tale0".into()));

        assert_eq!(update.events.len(), 2);
        assert_eq!(
            update.events[1],
            QuickTalesEvent::OpenTale("tale0".into())
        );
        assert_eq!(page.state().selected.as_deref(), Some("tale0"));
    }
}
