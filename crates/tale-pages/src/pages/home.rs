#![forbid(unsafe_code)]

//! Home page: the tale list and the bookmarks tab.
//!
//! The list tab shows one [`QuickTalesPage`] per list context. The context is
//! the trailing entry of the navigation stack in [`HomeState::list`], so two
//! states can both say `page: List` and still need different children. When
//! the derived key changes the list child is remounted; when it is the same
//! the mounted child only gets a state refresh.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::navigator::{PageHost, PageNavigator, Transition};
use tale_core::page::{Page, Update};
use tracing::debug;

use super::bookmarks::{BookmarksEvent, BookmarksMsg, BookmarksPage, BookmarksState};
use super::quick_tales::{QuickTalesEvent, QuickTalesMsg, QuickTalesPage, QuickTalesState};
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomePageId {
    List,
    Bookmarks,
}

/// One level of list navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListEntry {
    /// Tale the list was opened from. `None` is the main feed.
    pub tale: Option<String>,
    pub filter: Option<String>,
}

impl ListEntry {
    pub fn tale(id: impl Into<String>) -> Self {
        Self {
            tale: Some(id.into()),
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeState {
    pub page: Option<HomePageId>,
    /// List navigation stack, innermost last.
    pub list: Vec<ListEntry>,
    pub tales: Option<QuickTalesState>,
    pub bookmarks: Option<BookmarksState>,
}

/// Cache key of the list context at the top of `list`.
#[must_use]
pub fn list_key(list: &[ListEntry]) -> String {
    match list.last() {
        Some(ListEntry {
            tale: Some(tale),
            filter: Some(filter),
        }) => format!("{tale}?{filter}"),
        Some(ListEntry {
            tale: Some(tale),
            filter: None,
        }) => tale.clone(),
        Some(ListEntry {
            tale: None,
            filter: Some(filter),
        }) => format!("feed?{filter}"),
        _ => "feed".to_string(),
    }
}

#[derive(Debug)]
pub enum HomeMsg {
    Tales(QuickTalesMsg),
    Bookmarks(BookmarksMsg),
    Open(HomePageId),
    /// Pop one list level.
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEvent {
    NewState(HomeState),
}

pub struct HomePage {
    nav: PageNavigator<HomePageId>,
    slots: HomeSlots,
    last_transition: Option<Transition<HomePageId>>,
}

struct HomeSlots {
    services: Services,
    state: HomeState,
    tales: Option<Rc<RefCell<QuickTalesPage>>>,
    tales_key: Option<String>,
    bookmarks: Option<BookmarksPage>,
    cmds: Vec<Cmd<HomeMsg>>,
}

impl PageHost<HomePageId> for HomeSlots {
    fn add_page(&mut self, page: HomePageId) {
        match page {
            HomePageId::List => {
                let key = list_key(&self.state.list);
                let sink = self.services.sink.clone();
                let tales = self
                    .services
                    .tales
                    .borrow_mut()
                    .get_or_insert_with(key.clone(), || QuickTalesPage::new(key.clone(), sink));
                let cmd = tales.borrow_mut().update_state(self.state.tales.clone());
                self.cmds.push(cmd.map(HomeMsg::Tales));
                self.tales = Some(tales);
                self.tales_key = Some(key);
            }
            HomePageId::Bookmarks => {
                let mut bookmarks = BookmarksPage::new(self.services.sink.clone());
                let cmd = bookmarks.update_state(self.state.bookmarks.clone());
                self.cmds.push(cmd.map(HomeMsg::Bookmarks));
                self.bookmarks = Some(bookmarks);
            }
        }
    }

    fn remove_page(&mut self, page: HomePageId) {
        match page {
            HomePageId::List => {
                // The cache keeps its own handle for reuse.
                if let Some(tales) = self.tales.take() {
                    tales.borrow_mut().remove();
                }
                self.tales_key = None;
            }
            HomePageId::Bookmarks => {
                if let Some(mut bookmarks) = self.bookmarks.take() {
                    bookmarks.remove();
                }
            }
        }
    }

    fn update_page(&mut self, page: HomePageId) {
        match page {
            HomePageId::List => {
                if let Some(tales) = &self.tales {
                    let cmd = tales.borrow_mut().update_state(self.state.tales.clone());
                    self.cmds.push(cmd.map(HomeMsg::Tales));
                }
            }
            HomePageId::Bookmarks => {
                if let Some(bookmarks) = &mut self.bookmarks {
                    let cmd = bookmarks.update_state(self.state.bookmarks.clone());
                    self.cmds.push(cmd.map(HomeMsg::Bookmarks));
                }
            }
        }
    }
}

impl HomePage {
    pub fn new(services: Services) -> Self {
        Self {
            nav: PageNavigator::new(),
            slots: HomeSlots {
                services,
                state: HomeState::default(),
                tales: None,
                tales_key: None,
                bookmarks: None,
                cmds: Vec::new(),
            },
            last_transition: None,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> Option<HomePageId> {
        self.nav.current()
    }

    /// What the most recent `update_state` did to the mounted child.
    #[must_use]
    pub fn last_transition(&self) -> Option<Transition<HomePageId>> {
        self.last_transition
    }

    /// The mounted list child, if the list tab is showing.
    #[must_use]
    pub fn tales_page(&self) -> Option<Rc<RefCell<QuickTalesPage>>> {
        self.slots.tales.clone()
    }

    fn cached_tales_state(&self, key: &str) -> Option<QuickTalesState> {
        self.slots
            .services
            .tales
            .borrow()
            .peek(&key.to_string())
            .map(|page| page.borrow().state().clone())
    }

    fn renavigate(&mut self) -> Update<HomeMsg, HomeEvent> {
        let state = self.slots.state.clone();
        let cmd = self.update_state(Some(state));
        Update::cmd(cmd).with_event(HomeEvent::NewState(self.slots.state.clone()))
    }

    fn on_tales(
        &mut self,
        update: Update<QuickTalesMsg, QuickTalesEvent>,
    ) -> Update<HomeMsg, HomeEvent> {
        let mut out = Update::cmd(update.cmd.map(HomeMsg::Tales));
        for event in update.events {
            match event {
                QuickTalesEvent::NewState(tales) => {
                    self.slots.state.tales = Some(tales);
                    out = out.with_event(HomeEvent::NewState(self.slots.state.clone()));
                }
                QuickTalesEvent::OpenTale(id) => {
                    self.slots.state.list.push(ListEntry::tale(id));
                    let key = list_key(&self.slots.state.list);
                    self.slots.state.tales = self.cached_tales_state(&key);
                    let nav = self.renavigate();
                    out = out.with_cmd(nav.cmd);
                    out.events.extend(nav.events);
                }
            }
        }
        out
    }
}

impl Page for HomePage {
    type State = HomeState;
    type Msg = HomeMsg;
    type Event = HomeEvent;

    fn update_state(&mut self, state: Option<HomeState>) -> Cmd<HomeMsg> {
        let mut state = state.unwrap_or_default();
        let page = *state.page.get_or_insert(HomePageId::List);
        if state.list.is_empty() {
            state.list.push(ListEntry::default());
        }
        let key = list_key(&state.list);
        self.slots.state = state;

        let stale_list = page == HomePageId::List
            && self.nav.current() == Some(HomePageId::List)
            && self.slots.tales_key.as_deref() != Some(key.as_str());
        let transition = if stale_list {
            debug!(key = %key, "list context changed, remounting");
            self.nav.remount(page, &mut self.slots)
        } else {
            self.nav.go_to(page, &mut self.slots)
        };
        self.last_transition = Some(transition);
        Cmd::batch(mem::take(&mut self.slots.cmds))
    }

    fn update(&mut self, msg: HomeMsg) -> Update<HomeMsg, HomeEvent> {
        match msg {
            HomeMsg::Tales(msg) => {
                let Some(tales) = self.slots.tales.clone() else {
                    debug!(?msg, "list message for unmounted page dropped");
                    return Update::none();
                };
                let update = tales.borrow_mut().update(msg);
                self.on_tales(update)
            }
            HomeMsg::Bookmarks(msg) => {
                let Some(bookmarks) = &mut self.slots.bookmarks else {
                    debug!(?msg, "bookmarks message for unmounted page dropped");
                    return Update::none();
                };
                let update = bookmarks.update(msg);
                let mut out = Update::cmd(update.cmd.map(HomeMsg::Bookmarks));
                for BookmarksEvent::NewState(saved) in update.events {
                    self.slots.state.bookmarks = Some(saved);
                    out = out.with_event(HomeEvent::NewState(self.slots.state.clone()));
                }
                out
            }
            HomeMsg::Open(page) => {
                if self.nav.current() == Some(page) {
                    return Update::none();
                }
                self.slots.state.page = Some(page);
                self.renavigate()
            }
            HomeMsg::Back => {
                if self.slots.state.list.len() <= 1 {
                    return Update::none();
                }
                self.slots.state.list.pop();
                let key = list_key(&self.slots.state.list);
                self.slots.state.tales = self.cached_tales_state(&key);
                self.renavigate()
            }
        }
    }

    fn state(&self) -> &HomeState {
        &self.slots.state
    }

    fn remove(&mut self) {
        self.nav.remove(&mut self.slots);
        self.slots.cmds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn entry(tale: Option<&str>, filter: Option<&str>) -> ListEntry {
        ListEntry {
            tale: tale.map(str::to_string),
            filter: filter.map(str::to_string),
        }
    }

    #[test]
    fn list_key_uses_trailing_entry() {
        assert_eq!(list_key(&[]), "feed");
        assert_eq!(list_key(&[entry(None, None)]), "feed");
        assert_eq!(list_key(&[entry(None, Some("new"))]), "feed?new");
        assert_eq!(
            list_key(&[entry(None, None), entry(Some("t1"), None)]),
            "t1"
        );
        assert_eq!(
            list_key(&[entry(Some("t1"), None), entry(Some("t2"), Some("top"))]),
            "t2?top"
        );
    }

    fn arb_entry() -> impl Strategy<Value = ListEntry> {
        (
            proptest::option::of("[a-z0-9]{1,6}"),
            proptest::option::of("[a-z]{1,4}"),
        )
            .prop_map(|(tale, filter)| ListEntry { tale, filter })
    }

    proptest! {
        #[test]
        fn list_key_ignores_outer_levels(
            outer in proptest::collection::vec(arb_entry(), 0..6),
            last in arb_entry(),
        ) {
            let mut list = outer;
            list.push(last.clone());
            prop_assert_eq!(list_key(&list), list_key(&[last]));
        }
    }
}
