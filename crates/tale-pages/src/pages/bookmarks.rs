#![forbid(unsafe_code)]

//! Saved tales.

use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarksState {
    pub saved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarksMsg {
    /// Save the tale, or unsave it if already saved.
    Toggle(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarksEvent {
    NewState(BookmarksState),
}

pub struct BookmarksPage {
    state: BookmarksState,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl BookmarksPage {
    pub fn new(sink: Rc<dyn RegionSink>) -> Self {
        Self {
            state: BookmarksState::default(),
            sink,
            nodes: MountedNodes::new(),
        }
    }

    fn render(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
        let nodes = std::iter::once(Node::new("bookmarks"))
            .chain(self.state.saved.iter().map(|id| Node::new(format!("bookmark:{id}"))))
            .collect();
        self.nodes.append(self.sink.as_ref(), Region::Main, nodes);
    }
}

impl Page for BookmarksPage {
    type State = BookmarksState;
    type Msg = BookmarksMsg;
    type Event = BookmarksEvent;

    fn update_state(&mut self, state: Option<BookmarksState>) -> Cmd<BookmarksMsg> {
        self.state = state.unwrap_or_default();
        self.render();
        Cmd::none()
    }

    fn update(&mut self, msg: BookmarksMsg) -> Update<BookmarksMsg, BookmarksEvent> {
        match msg {
            BookmarksMsg::Toggle(id) => {
                if let Some(pos) = self.state.saved.iter().position(|s| *s == id) {
                    self.state.saved.remove(pos);
                } else {
                    self.state.saved.push(id);
                }
            }
        }
        self.render();
        Update::event(BookmarksEvent::NewState(self.state.clone()))
    }

    fn state(&self) -> &BookmarksState {
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
    fn toggle_adds_and_removes() {
        let sink = Rc::new(RecordingSink::new());
        let mut page = BookmarksPage::new(sink.clone());
        let _ = page.update_state(None);

        let _ = page.update(BookmarksMsg::Toggle("t1".into()));
        assert_eq!(sink.keys(Region::Main), vec!["bookmarks", "bookmark:t1"]);

        let update = page.update(BookmarksMsg::Toggle("t1".into()));
        assert_eq!(
            update.events,
            vec![BookmarksEvent::NewState(BookmarksState::default())]
        );
        assert_eq!(sink.keys(Region::Main), vec!["bookmarks"]);
    }
}
