#![forbid(unsafe_code)]

//! Sign-in / sign-up page shown while no session token is stored.

use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};
use tale_runtime::session::SessionStorage;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub const fn label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "sign-in",
            AuthMode::SignUp => "sign-up",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub mode: AuthMode,
    /// Last submission failure, shown inline.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMsg {
    SetMode(AuthMode),
    /// The credentials form produced a token.
    Submit { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    NewState(AuthState),
    /// A token was persisted to the session store.
    SignedIn,
}

pub struct AuthPage {
    state: AuthState,
    session: Rc<dyn SessionStorage>,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl AuthPage {
    pub fn new(session: Rc<dyn SessionStorage>, sink: Rc<dyn RegionSink>) -> Self {
        Self {
            state: AuthState::default(),
            session,
            sink,
            nodes: MountedNodes::new(),
        }
    }

    fn render(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
        let mut nodes = vec![Node::new(format!("auth:{}", self.state.mode.label()))];
        if self.state.error.is_some() {
            nodes.push(Node::new("auth-error"));
        }
        self.nodes.append(self.sink.as_ref(), Region::Main, nodes);
    }
}

impl Page for AuthPage {
    type State = AuthState;
    type Msg = AuthMsg;
    type Event = AuthEvent;

    fn update_state(&mut self, state: Option<AuthState>) -> Cmd<AuthMsg> {
        self.state = state.unwrap_or_default();
        self.render();
        Cmd::none()
    }

    fn update(&mut self, msg: AuthMsg) -> Update<AuthMsg, AuthEvent> {
        match msg {
            AuthMsg::SetMode(mode) => {
                if self.state.mode == mode {
                    return Update::none();
                }
                self.state.mode = mode;
                self.state.error = None;
                self.render();
                Update::event(AuthEvent::NewState(self.state.clone()))
            }
            AuthMsg::Submit { token } => match self.session.save(&token) {
                Ok(()) => {
                    info!(store = self.session.name(), "signed in");
                    self.state.error = None;
                    self.render();
                    Update::event(AuthEvent::NewState(self.state.clone()))
                        .with_event(AuthEvent::SignedIn)
                }
                Err(e) => {
                    warn!(error = %e, "failed to persist session");
                    self.state.error = Some(e.to_string());
                    self.render();
                    Update::event(AuthEvent::NewState(self.state.clone()))
                }
            },
        }
    }

    fn state(&self) -> &AuthState {
        &self.state
    }

    fn remove(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tale_core::region::RecordingSink;
    use tale_runtime::session::MemorySession;

    #[test]
    fn submit_saves_token_then_signals() {
        let session = Rc::new(MemorySession::new());
        let mut page = AuthPage::new(session.clone(), Rc::new(RecordingSink::new()));
        let _ = page.update_state(None);

        let update = page.update(AuthMsg::Submit {
            token: "tok".into(),
        });

        assert_eq!(session.read().as_deref(), Some("tok"));
        assert_eq!(
            update.events,
            vec![AuthEvent::NewState(AuthState::default()), AuthEvent::SignedIn]
        );
    }

    #[test]
    fn rejected_token_shows_error() {
        let sink = Rc::new(RecordingSink::new());
        let session = Rc::new(MemorySession::new());
        let mut page = AuthPage::new(session.clone(), sink.clone());
        let _ = page.update_state(None);

        let update = page.update(AuthMsg::Submit {
            token: String::new(),
        });

        assert!(!session.is_signed_in());
        assert_eq!(update.events.len(), 1);
        assert!(page.state().error.is_some());
        assert_eq!(sink.keys(Region::Main), vec!["auth:sign-in", "auth-error"]);
    }

    #[test]
    fn mode_switch_clears_error() {
        let mut page = AuthPage::new(
            Rc::new(MemorySession::new()),
            Rc::new(RecordingSink::new()),
        );
        let _ = page.update_state(Some(AuthState {
            mode: AuthMode::SignIn,
            error: Some("bad".into()),
        }));

        let update = page.update(AuthMsg::SetMode(AuthMode::SignUp));
        assert_eq!(
            update.events,
            vec![AuthEvent::NewState(AuthState {
                mode: AuthMode::SignUp,
                error: None
            })]
        );
        assert!(page.update(AuthMsg::SetMode(AuthMode::SignUp)).is_empty());
    }
}
