#![forbid(unsafe_code)]

//! App shell shared by the Show and Chat apps.
//!
//! When no page is requested the shell asks the user service for the app
//! variant before it can decide what to mount. That lookup is the only
//! deferred step in the tree: it is returned as a task and may resolve after
//! a newer state was applied, in which case its result is dropped.

use std::convert::Infallible;
use std::mem;

use tale_core::cmd::Cmd;
use tale_core::freshness::{Freshness, Ticket};
use tale_core::navigator::{PageHost, PageNavigator};
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region};
use tracing::{debug, warn};

use super::account::{AccountEvent, AccountMsg, AccountPage, AccountState};
use super::consumer_selection::{ConsumerSelectionPage, ConsumerSelectionState};
use super::content::{ContentEvent, ContentMsg, ContentPage, ContentState};
use crate::services::{AppType, AppVariant, ServiceError, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellPage {
    Content,
    Account,
    ConsumerSelection,
}

impl ShellPage {
    /// Landing page for a user of `variant`.
    #[must_use]
    pub const fn for_variant(variant: AppVariant) -> Self {
        match variant {
            AppVariant::Consumer => ShellPage::Content,
            AppVariant::Unselected => ShellPage::ConsumerSelection,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub page: Option<ShellPage>,
    pub content: Option<ContentState>,
    pub account: Option<AccountState>,
    pub selection: Option<ConsumerSelectionState>,
}

#[derive(Debug)]
pub enum ShellMsg {
    /// The app variant lookup for `state` finished.
    VariantResolved {
        ticket: Ticket,
        state: Box<ShellState>,
        result: Result<AppVariant, ServiceError>,
    },
    Navigate(ShellPage),
    Content(ContentMsg),
    Account(AccountMsg),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    NewState(ShellState),
    SignOutRequested,
}

pub struct AppShell {
    app: AppType,
    nav: PageNavigator<ShellPage>,
    slots: ShellSlots,
    freshness: Freshness,
    menu: MountedNodes,
}

struct ShellSlots {
    services: Services,
    state: ShellState,
    content: Option<ContentPage>,
    account: Option<AccountPage>,
    selection: Option<ConsumerSelectionPage>,
    cmds: Vec<Cmd<ShellMsg>>,
}

impl PageHost<ShellPage> for ShellSlots {
    fn add_page(&mut self, page: ShellPage) {
        match page {
            ShellPage::Content => {
                let mut content = ContentPage::new(self.services.clone());
                let cmd = content.update_state(self.state.content.clone());
                self.cmds.push(cmd.map(ShellMsg::Content));
                self.content = Some(content);
            }
            ShellPage::Account => {
                let mut account = AccountPage::new(self.services.sink.clone());
                let cmd = account.update_state(self.state.account.clone());
                self.cmds.push(cmd.map(ShellMsg::Account));
                self.account = Some(account);
            }
            ShellPage::ConsumerSelection => {
                let mut selection = ConsumerSelectionPage::new(self.services.sink.clone());
                let cmd = selection.update_state(self.state.selection.clone());
                self.cmds.push(cmd.map(|never: Infallible| -> ShellMsg { match never {} }));
                self.selection = Some(selection);
            }
        }
    }

    fn remove_page(&mut self, page: ShellPage) {
        match page {
            ShellPage::Content => {
                if let Some(mut content) = self.content.take() {
                    content.remove();
                }
            }
            ShellPage::Account => {
                if let Some(mut account) = self.account.take() {
                    account.remove();
                }
            }
            ShellPage::ConsumerSelection => {
                if let Some(mut selection) = self.selection.take() {
                    selection.remove();
                }
            }
        }
    }

    fn update_page(&mut self, page: ShellPage) {
        match page {
            ShellPage::Content => {
                if let Some(content) = &mut self.content {
                    let cmd = content.update_state(self.state.content.clone());
                    self.cmds.push(cmd.map(ShellMsg::Content));
                }
            }
            ShellPage::Account => {
                if let Some(account) = &mut self.account {
                    let cmd = account.update_state(self.state.account.clone());
                    self.cmds.push(cmd.map(ShellMsg::Account));
                }
            }
            ShellPage::ConsumerSelection => {}
        }
    }
}

impl AppShell {
    pub fn new(app: AppType, services: Services) -> Self {
        Self {
            app,
            nav: PageNavigator::new(),
            slots: ShellSlots {
                services,
                state: ShellState::default(),
                content: None,
                account: None,
                selection: None,
                cmds: Vec::new(),
            },
            freshness: Freshness::new(),
            menu: MountedNodes::new(),
        }
    }

    #[must_use]
    pub fn app(&self) -> AppType {
        self.app
    }

    #[must_use]
    pub fn current_page(&self) -> Option<ShellPage> {
        self.nav.current()
    }

    /// Whether an app variant lookup is outstanding.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.freshness.is_pending()
    }

    #[must_use]
    pub fn content(&self) -> Option<&ContentPage> {
        self.slots.content.as_ref()
    }

    fn apply(&mut self, state: ShellState) -> Cmd<ShellMsg> {
        let Some(page) = state.page else {
            return Cmd::none();
        };
        self.slots.state = state;
        if !self.menu.is_mounted() {
            let sink = self.slots.services.sink.clone();
            let node = Node::new(format!("{}:menu", self.app.label()));
            self.menu.append(sink.as_ref(), Region::LeftMenu, vec![node]);
        }
        self.nav.go_to(page, &mut self.slots);
        Cmd::batch(mem::take(&mut self.slots.cmds))
    }

    fn resolve(&mut self, state: ShellState) -> Cmd<ShellMsg> {
        let ticket = self.freshness.begin();
        let users = self.slots.services.users.clone();
        let app = self.app;
        debug!(app = app.label(), ticket = ticket.seq(), "resolving app variant");
        Cmd::task("resolve_app_variant", move || ShellMsg::VariantResolved {
            ticket,
            state: Box::new(state),
            result: users.app_variant(app),
        })
    }

    fn renavigate(&mut self) -> Update<ShellMsg, ShellEvent> {
        let state = self.slots.state.clone();
        let cmd = self.update_state(Some(state));
        Update::cmd(cmd).with_event(ShellEvent::NewState(self.slots.state.clone()))
    }
}

impl Page for AppShell {
    type State = ShellState;
    type Msg = ShellMsg;
    type Event = ShellEvent;

    fn update_state(&mut self, state: Option<ShellState>) -> Cmd<ShellMsg> {
        let state = state.unwrap_or_default();
        if state.page.is_none() {
            return self.resolve(state);
        }
        self.freshness.invalidate();
        self.apply(state)
    }

    fn update(&mut self, msg: ShellMsg) -> Update<ShellMsg, ShellEvent> {
        match msg {
            ShellMsg::VariantResolved {
                ticket,
                state,
                result,
            } => {
                if !self.freshness.settle(ticket) {
                    debug!(
                        app = self.app.label(),
                        ticket = ticket.seq(),
                        "discarding stale app variant"
                    );
                    return Update::none();
                }
                let variant = result.unwrap_or_else(|e| {
                    warn!(
                        app = self.app.label(),
                        error = %e,
                        "app variant lookup failed, using default"
                    );
                    AppVariant::default()
                });
                let mut state = *state;
                state.page = Some(ShellPage::for_variant(variant));
                let cmd = self.apply(state);
                Update::cmd(cmd).with_event(ShellEvent::NewState(self.slots.state.clone()))
            }
            ShellMsg::Navigate(page) => {
                if self.nav.current() == Some(page) {
                    return Update::none();
                }
                self.slots.state.page = Some(page);
                self.renavigate()
            }
            ShellMsg::Content(msg) => {
                let Some(content) = &mut self.slots.content else {
                    debug!(?msg, "content message for unmounted page dropped");
                    return Update::none();
                };
                let update = content.update(msg);
                let mut out = Update::cmd(update.cmd.map(ShellMsg::Content));
                for ContentEvent::NewState(content) in update.events {
                    self.slots.state.content = Some(content);
                    out = out.with_event(ShellEvent::NewState(self.slots.state.clone()));
                }
                out
            }
            ShellMsg::Account(msg) => {
                let Some(account) = &mut self.slots.account else {
                    debug!(?msg, "account message for unmounted page dropped");
                    return Update::none();
                };
                let update = account.update(msg);
                let mut out = Update::cmd(update.cmd.map(ShellMsg::Account));
                for event in update.events {
                    match event {
                        AccountEvent::NewState(account) => {
                            self.slots.state.account = Some(account);
                            out = out.with_event(ShellEvent::NewState(self.slots.state.clone()));
                        }
                        AccountEvent::SignOutRequested => {
                            out = out.with_event(ShellEvent::SignOutRequested);
                        }
                    }
                }
                out
            }
        }
    }

    fn state(&self) -> &ShellState {
        &self.slots.state
    }

    fn remove(&mut self) {
        self.freshness.invalidate();
        self.nav.remove(&mut self.slots);
        self.slots.cmds.clear();
        self.menu.detach_all(self.slots.services.sink.as_ref());
    }
}
