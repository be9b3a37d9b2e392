#![forbid(unsafe_code)]

//! Content page: home, or a reply composer on top of it.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::navigator::{PageHost, PageNavigator};
use tale_core::page::{Page, Update};
use tracing::debug;

use super::home::{HomeEvent, HomeMsg, HomePage, HomeState};
use super::reply::{ReplyEvent, ReplyMsg, ReplyPage, ReplyState};
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentPageId {
    Home,
    Reply,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentState {
    pub page: Option<ContentPageId>,
    pub home: Option<HomeState>,
    pub reply: Option<ReplyState>,
}

#[derive(Debug)]
pub enum ContentMsg {
    Home(HomeMsg),
    Reply(ReplyMsg),
    /// Open the composer for a reply target.
    OpenReply(String),
    CloseReply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEvent {
    NewState(ContentState),
}

pub struct ContentPage {
    nav: PageNavigator<ContentPageId>,
    slots: ContentSlots,
}

struct ContentSlots {
    services: Services,
    state: ContentState,
    home: Option<HomePage>,
    reply: Option<Rc<RefCell<ReplyPage>>>,
    reply_target: Option<String>,
    cmds: Vec<Cmd<ContentMsg>>,
}

impl ContentSlots {
    fn target(&self) -> String {
        self.state
            .reply
            .as_ref()
            .map(|r| r.target.clone())
            .unwrap_or_default()
    }
}

impl PageHost<ContentPageId> for ContentSlots {
    fn add_page(&mut self, page: ContentPageId) {
        match page {
            ContentPageId::Home => {
                let mut home = HomePage::new(self.services.clone());
                let cmd = home.update_state(self.state.home.clone());
                self.cmds.push(cmd.map(ContentMsg::Home));
                self.home = Some(home);
            }
            ContentPageId::Reply => {
                let target = self.target();
                let sink = self.services.sink.clone();
                let reply = self
                    .services
                    .replies
                    .borrow_mut()
                    .get_or_insert_with(target.clone(), || ReplyPage::new(sink));
                let cmd = reply.borrow_mut().update_state(self.state.reply.clone());
                self.cmds.push(cmd.map(ContentMsg::Reply));
                self.reply = Some(reply);
                self.reply_target = Some(target);
            }
        }
    }

    fn remove_page(&mut self, page: ContentPageId) {
        match page {
            ContentPageId::Home => {
                if let Some(mut home) = self.home.take() {
                    home.remove();
                }
            }
            ContentPageId::Reply => {
                if let Some(reply) = self.reply.take() {
                    reply.borrow_mut().remove();
                }
                self.reply_target = None;
            }
        }
    }

    fn update_page(&mut self, page: ContentPageId) {
        match page {
            ContentPageId::Home => {
                if let Some(home) = &mut self.home {
                    let cmd = home.update_state(self.state.home.clone());
                    self.cmds.push(cmd.map(ContentMsg::Home));
                }
            }
            ContentPageId::Reply => {
                if let Some(reply) = &self.reply {
                    let cmd = reply.borrow_mut().update_state(self.state.reply.clone());
                    self.cmds.push(cmd.map(ContentMsg::Reply));
                }
            }
        }
    }
}

impl ContentPage {
    pub fn new(services: Services) -> Self {
        Self {
            nav: PageNavigator::new(),
            slots: ContentSlots {
                services,
                state: ContentState::default(),
                home: None,
                reply: None,
                reply_target: None,
                cmds: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn current_page(&self) -> Option<ContentPageId> {
        self.nav.current()
    }

    #[must_use]
    pub fn home(&self) -> Option<&HomePage> {
        self.slots.home.as_ref()
    }

    #[must_use]
    pub fn reply_page(&self) -> Option<Rc<RefCell<ReplyPage>>> {
        self.slots.reply.clone()
    }

    fn renavigate(&mut self) -> Update<ContentMsg, ContentEvent> {
        let state = self.slots.state.clone();
        let cmd = self.update_state(Some(state));
        Update::cmd(cmd).with_event(ContentEvent::NewState(self.slots.state.clone()))
    }
}

impl Page for ContentPage {
    type State = ContentState;
    type Msg = ContentMsg;
    type Event = ContentEvent;

    fn update_state(&mut self, state: Option<ContentState>) -> Cmd<ContentMsg> {
        let mut state = state.unwrap_or_default();
        let page = *state.page.get_or_insert(ContentPageId::Home);
        self.slots.state = state;

        let target = self.slots.target();
        let retarget = page == ContentPageId::Reply
            && self.nav.current() == Some(ContentPageId::Reply)
            && self.slots.reply_target.as_deref() != Some(target.as_str());
        if retarget {
            debug!(target_id = %target, "reply target changed, remounting");
            self.nav.remount(page, &mut self.slots);
        } else {
            self.nav.go_to(page, &mut self.slots);
        }
        Cmd::batch(mem::take(&mut self.slots.cmds))
    }

    fn update(&mut self, msg: ContentMsg) -> Update<ContentMsg, ContentEvent> {
        match msg {
            ContentMsg::Home(msg) => {
                let Some(home) = &mut self.slots.home else {
                    debug!(?msg, "home message for unmounted page dropped");
                    return Update::none();
                };
                let update = home.update(msg);
                let mut out = Update::cmd(update.cmd.map(ContentMsg::Home));
                for HomeEvent::NewState(home) in update.events {
                    self.slots.state.home = Some(home);
                    out = out.with_event(ContentEvent::NewState(self.slots.state.clone()));
                }
                out
            }
            ContentMsg::Reply(msg) => {
                let Some(reply) = self.slots.reply.clone() else {
                    debug!(?msg, "reply message for unmounted page dropped");
                    return Update::none();
                };
                let update = reply.borrow_mut().update(msg);
                let mut out = Update::cmd(update.cmd.map(ContentMsg::Reply));
                for ReplyEvent::NewState(reply) in update.events {
                    self.slots.state.reply = Some(reply);
                    out = out.with_event(ContentEvent::NewState(self.slots.state.clone()));
                }
                out
            }
            ContentMsg::OpenReply(target) => {
                let cached = self
                    .slots
                    .services
                    .replies
                    .borrow()
                    .peek(&target)
                    .map(|page| page.borrow().state().clone());
                self.slots.state.reply = Some(cached.unwrap_or_else(|| ReplyState::new(target)));
                self.slots.state.page = Some(ContentPageId::Reply);
                self.renavigate()
            }
            ContentMsg::CloseReply => {
                if self.nav.current() != Some(ContentPageId::Reply) {
                    return Update::none();
                }
                self.slots.state.page = Some(ContentPageId::Home);
                self.renavigate()
            }
        }
    }

    fn state(&self) -> &ContentState {
        &self.slots.state
    }

    fn remove(&mut self) {
        self.nav.remove(&mut self.slots);
        self.slots.cmds.clear();
    }
}
