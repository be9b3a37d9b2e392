#![forbid(unsafe_code)]

//! Root of the page tree.
//!
//! Routes between the auth page and the two app shells. A missing `app` is
//! filled in by the injected picker (first visit); a missing session token
//! always routes to auth, whatever `app` says.

use std::mem;

use tale_core::cmd::Cmd;
use tale_core::navigator::{PageHost, PageNavigator, Transition};
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region};
use tracing::{debug, info, warn};

use super::auth::{AuthEvent, AuthMsg, AuthPage, AuthState};
use super::shell::{AppShell, ShellEvent, ShellMsg, ShellState};
use crate::services::{AppType, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPage {
    Auth,
    Show,
    Chat,
}

impl BodyPage {
    #[must_use]
    pub const fn for_app(app: AppType) -> Self {
        match app {
            AppType::Show => BodyPage::Show,
            AppType::Chat => BodyPage::Chat,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyState {
    pub app: Option<AppType>,
    pub page: Option<BodyPage>,
    pub auth: Option<AuthState>,
    pub show: Option<ShellState>,
    pub chat: Option<ShellState>,
}

impl BodyState {
    fn shell_state(&self, app: AppType) -> Option<ShellState> {
        match app {
            AppType::Show => self.show.clone(),
            AppType::Chat => self.chat.clone(),
        }
    }

    fn set_shell_state(&mut self, app: AppType, state: ShellState) {
        match app {
            AppType::Show => self.show = Some(state),
            AppType::Chat => self.chat = Some(state),
        }
    }
}

#[derive(Debug)]
pub enum BodyMsg {
    Auth(AuthMsg),
    /// A message for the shell mounted as `mount`.
    ///
    /// Results of work started by an earlier shell instance carry an older
    /// mount number and are dropped.
    Shell { mount: u64, msg: ShellMsg },
    SignOut,
    SwitchApp(AppType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEvent {
    NewState(BodyState),
}

pub struct BodyContainer {
    nav: PageNavigator<BodyPage>,
    slots: BodySlots,
    last_transition: Option<Transition<BodyPage>>,
    top_menu: MountedNodes,
}

struct BodySlots {
    services: Services,
    state: BodyState,
    auth: Option<AuthPage>,
    shell: Option<AppShell>,
    mount: u64,
    cmds: Vec<Cmd<BodyMsg>>,
}

impl BodySlots {
    fn mount_shell(&mut self, app: AppType) {
        self.mount += 1;
        let mount = self.mount;
        let mut shell = AppShell::new(app, self.services.clone());
        let cmd = shell.update_state(self.state.shell_state(app));
        self.cmds.push(cmd.map(move |msg| BodyMsg::Shell { mount, msg }));
        self.shell = Some(shell);
    }
}

impl PageHost<BodyPage> for BodySlots {
    fn add_page(&mut self, page: BodyPage) {
        match page {
            BodyPage::Auth => {
                let mut auth =
                    AuthPage::new(self.services.session.clone(), self.services.sink.clone());
                let cmd = auth.update_state(self.state.auth.clone());
                self.cmds.push(cmd.map(BodyMsg::Auth));
                self.auth = Some(auth);
            }
            BodyPage::Show => self.mount_shell(AppType::Show),
            BodyPage::Chat => self.mount_shell(AppType::Chat),
        }
    }

    fn remove_page(&mut self, page: BodyPage) {
        match page {
            BodyPage::Auth => {
                if let Some(mut auth) = self.auth.take() {
                    auth.remove();
                }
            }
            BodyPage::Show | BodyPage::Chat => {
                if let Some(mut shell) = self.shell.take() {
                    shell.remove();
                }
            }
        }
    }

    fn update_page(&mut self, page: BodyPage) {
        match page {
            BodyPage::Auth => {
                if let Some(auth) = &mut self.auth {
                    let cmd = auth.update_state(self.state.auth.clone());
                    self.cmds.push(cmd.map(BodyMsg::Auth));
                }
            }
            BodyPage::Show | BodyPage::Chat => {
                let mount = self.mount;
                if let Some(shell) = &mut self.shell {
                    let cmd = shell.update_state(self.state.shell_state(shell.app()));
                    self.cmds.push(cmd.map(move |msg| BodyMsg::Shell { mount, msg }));
                }
            }
        }
    }
}

impl BodyContainer {
    pub fn new(services: Services) -> Self {
        Self {
            nav: PageNavigator::new(),
            slots: BodySlots {
                services,
                state: BodyState::default(),
                auth: None,
                shell: None,
                mount: 0,
                cmds: Vec::new(),
            },
            last_transition: None,
            top_menu: MountedNodes::new(),
        }
    }

    #[must_use]
    pub fn current_page(&self) -> Option<BodyPage> {
        self.nav.current()
    }

    #[must_use]
    pub fn last_transition(&self) -> Option<Transition<BodyPage>> {
        self.last_transition
    }

    #[must_use]
    pub fn shell(&self) -> Option<&AppShell> {
        self.slots.shell.as_ref()
    }

    /// Address `msg` to the shell mounted right now.
    #[must_use]
    pub fn shell_msg(&self, msg: ShellMsg) -> BodyMsg {
        BodyMsg::Shell {
            mount: self.slots.mount,
            msg,
        }
    }

    fn render_top_menu(&mut self, app: AppType) {
        let sink = self.slots.services.sink.clone();
        self.top_menu.detach_all(sink.as_ref());
        let node = Node::new(format!("top-menu:{}", app.label()));
        self.top_menu.append(sink.as_ref(), Region::TopMenu, vec![node]);
    }

    fn renavigate(&mut self) -> Update<BodyMsg, BodyEvent> {
        let state = self.slots.state.clone();
        let cmd = self.update_state(Some(state));
        Update::cmd(cmd).with_event(BodyEvent::NewState(self.slots.state.clone()))
    }

    fn sign_out(&mut self) -> Update<BodyMsg, BodyEvent> {
        if let Err(e) = self.slots.services.session.clear() {
            warn!(error = %e, "failed to clear session");
        }
        info!("signed out");
        self.slots.state.auth = None;
        self.renavigate()
    }

    fn on_shell(&mut self, mount: u64, msg: ShellMsg) -> Update<BodyMsg, BodyEvent> {
        let live = mount == self.slots.mount;
        let Some(shell) = self.slots.shell.as_mut().filter(|_| live) else {
            debug!(mount, ?msg, "message for unmounted shell dropped");
            return Update::none();
        };
        let app = shell.app();
        let update = shell.update(msg);
        let mut out = Update::cmd(update.cmd.map(move |msg| BodyMsg::Shell { mount, msg }));
        for event in update.events {
            match event {
                ShellEvent::NewState(shell_state) => {
                    self.slots.state.set_shell_state(app, shell_state);
                    out = out.with_event(BodyEvent::NewState(self.slots.state.clone()));
                }
                ShellEvent::SignOutRequested => {
                    let signed_out = self.sign_out();
                    out = out.with_cmd(signed_out.cmd);
                    out.events.extend(signed_out.events);
                }
            }
        }
        out
    }
}

impl Page for BodyContainer {
    type State = BodyState;
    type Msg = BodyMsg;
    type Event = BodyEvent;

    fn update_state(&mut self, state: Option<BodyState>) -> Cmd<BodyMsg> {
        let mut state = state.unwrap_or_default();
        let app = *state
            .app
            .get_or_insert_with(|| (self.slots.services.pick_app)());
        let page = if self.slots.services.session.is_signed_in() {
            BodyPage::for_app(app)
        } else {
            BodyPage::Auth
        };
        state.page = Some(page);
        self.slots.state = state;

        self.render_top_menu(app);
        let transition = self.nav.go_to(page, &mut self.slots);
        self.last_transition = Some(transition);
        Cmd::batch(mem::take(&mut self.slots.cmds))
    }

    fn update(&mut self, msg: BodyMsg) -> Update<BodyMsg, BodyEvent> {
        match msg {
            BodyMsg::Auth(msg) => {
                let Some(auth) = &mut self.slots.auth else {
                    debug!(?msg, "auth message for unmounted page dropped");
                    return Update::none();
                };
                let update = auth.update(msg);
                let mut out = Update::cmd(update.cmd.map(BodyMsg::Auth));
                for event in update.events {
                    match event {
                        AuthEvent::NewState(auth) => {
                            self.slots.state.auth = Some(auth);
                            out = out.with_event(BodyEvent::NewState(self.slots.state.clone()));
                        }
                        AuthEvent::SignedIn => {
                            let routed = self.renavigate();
                            out = out.with_cmd(routed.cmd);
                            out.events.extend(routed.events);
                        }
                    }
                }
                out
            }
            BodyMsg::Shell { mount, msg } => self.on_shell(mount, msg),
            BodyMsg::SignOut => self.sign_out(),
            BodyMsg::SwitchApp(app) => {
                if self.slots.state.app == Some(app) {
                    return Update::none();
                }
                self.slots.state.app = Some(app);
                self.renavigate()
            }
        }
    }

    fn state(&self) -> &BodyState {
        &self.slots.state
    }

    fn remove(&mut self) {
        self.nav.remove(&mut self.slots);
        self.slots.cmds.clear();
        self.top_menu.detach_all(self.slots.services.sink.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_for_app() {
        assert_eq!(BodyPage::for_app(AppType::Show), BodyPage::Show);
        assert_eq!(BodyPage::for_app(AppType::Chat), BodyPage::Chat);
    }

    #[test]
    fn shell_state_follows_app() {
        let mut state = BodyState::default();
        state.set_shell_state(AppType::Chat, ShellState::default());
        assert_eq!(state.shell_state(AppType::Chat), Some(ShellState::default()));
        assert_eq!(state.shell_state(AppType::Show), None);
    }
}
