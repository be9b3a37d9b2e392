#![forbid(unsafe_code)]

//! Account page.

use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccountSection {
    #[default]
    Profile,
    Preferences,
}

impl AccountSection {
    pub const fn label(self) -> &'static str {
        match self {
            AccountSection::Profile => "profile",
            AccountSection::Preferences => "preferences",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub section: AccountSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountMsg {
    Show(AccountSection),
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    NewState(AccountState),
    SignOutRequested,
}

pub struct AccountPage {
    state: AccountState,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl AccountPage {
    pub fn new(sink: Rc<dyn RegionSink>) -> Self {
        Self {
            state: AccountState::default(),
            sink,
            nodes: MountedNodes::new(),
        }
    }

    fn render(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
        let node = Node::new(format!("account:{}", self.state.section.label()));
        self.nodes.append(self.sink.as_ref(), Region::Main, vec![node]);
    }
}

impl Page for AccountPage {
    type State = AccountState;
    type Msg = AccountMsg;
    type Event = AccountEvent;

    fn update_state(&mut self, state: Option<AccountState>) -> Cmd<AccountMsg> {
        self.state = state.unwrap_or_default();
        self.render();
        Cmd::none()
    }

    fn update(&mut self, msg: AccountMsg) -> Update<AccountMsg, AccountEvent> {
        match msg {
            AccountMsg::Show(section) => {
                self.state.section = section;
                self.render();
                Update::event(AccountEvent::NewState(self.state.clone()))
            }
            AccountMsg::SignOut => Update::event(AccountEvent::SignOutRequested),
        }
    }

    fn state(&self) -> &AccountState {
        &self.state
    }

    fn remove(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
    }
}
