#![forbid(unsafe_code)]

//! Collaborators injected into the page tree.
//!
//! Every page receives a clone of [`Services`]. Nothing in the tree reaches
//! for globals: the session store, the user service, the region sink and
//! the per-page-type caches all come from here, so two app instances (or two
//! tests) never share state.

use std::fmt;
use std::rc::Rc;

use tale_core::region::RegionSink;
use tale_runtime::config::RuntimeConfig;
use tale_runtime::page_cache::{PageCache, SharedPageCache};
use tale_runtime::session::SessionStorage;

use crate::pages::quick_tales::QuickTalesPage;
use crate::pages::reply::ReplyPage;

/// Which app the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    Show,
    Chat,
}

impl AppType {
    pub const ALL: &'static [AppType] = &[AppType::Show, AppType::Chat];

    pub const fn label(self) -> &'static str {
        match self {
            AppType::Show => "show",
            AppType::Chat => "chat",
        }
    }
}

/// Per-user app variant, decided server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppVariant {
    /// Regular consumer experience.
    #[default]
    Consumer,
    /// The user has not picked a consumer profile yet.
    Unselected,
}

/// Errors from the user service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport failure.
    Network(String),
    /// The session token was rejected.
    Unauthorized,
    /// The response could not be interpreted.
    Malformed(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "network error: {msg}"),
            ServiceError::Unauthorized => write!(f, "unauthorized"),
            ServiceError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Remote user service.
///
/// Called from deferred tasks only; the driver decides when.
pub trait UserService {
    fn app_variant(&self, app: AppType) -> Result<AppVariant, ServiceError>;
}

/// A user service that always answers with the same variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticUserService {
    pub variant: AppVariant,
}

impl StaticUserService {
    #[must_use]
    pub fn new(variant: AppVariant) -> Self {
        Self { variant }
    }
}

impl UserService for StaticUserService {
    fn app_variant(&self, _app: AppType) -> Result<AppVariant, ServiceError> {
        Ok(self.variant)
    }
}

/// Chooses the app for a first visit.
pub type AppPicker = Rc<dyn Fn() -> AppType>;

/// Pick an app uniformly at random.
pub fn random_app() -> AppType {
    if rand::random::<bool>() {
        AppType::Show
    } else {
        AppType::Chat
    }
}

/// Dependency bundle handed to every page.
#[derive(Clone)]
pub struct Services {
    pub session: Rc<dyn SessionStorage>,
    pub users: Rc<dyn UserService>,
    pub sink: Rc<dyn RegionSink>,
    /// List pages, keyed by list context.
    pub tales: SharedPageCache<String, QuickTalesPage>,
    /// Reply pages, keyed by reply target.
    pub replies: SharedPageCache<String, ReplyPage>,
    pub pick_app: AppPicker,
}

impl Services {
    pub fn new(
        config: &RuntimeConfig,
        session: Rc<dyn SessionStorage>,
        users: Rc<dyn UserService>,
        sink: Rc<dyn RegionSink>,
    ) -> Self {
        Self {
            session,
            users,
            sink,
            tales: PageCache::new(config.tale_cache_capacity).shared(),
            replies: PageCache::new(config.reply_cache_capacity).shared(),
            pick_app: Rc::new(random_app),
        }
    }

    /// Replace the first-visit app picker.
    #[must_use]
    pub fn with_app_picker(mut self, pick: impl Fn() -> AppType + 'static) -> Self {
        self.pick_app = Rc::new(pick);
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("session", &self.session.name())
            .field("tales", &self.tales.borrow())
            .field("replies", &self.replies.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tale_core::region::NullSink;
    use tale_runtime::session::MemorySession;

    #[test]
    fn caches_follow_config() {
        let config = RuntimeConfig::default()
            .with_tale_cache_capacity(3)
            .with_reply_cache_capacity(1);
        let services = Services::new(
            &config,
            Rc::new(MemorySession::new()),
            Rc::new(StaticUserService::default()),
            Rc::new(NullSink),
        );
        assert_eq!(services.tales.borrow().capacity(), 3);
        assert_eq!(services.replies.borrow().capacity(), 1);
    }

    #[test]
    fn picker_override() {
        let services = Services::new(
            &RuntimeConfig::default(),
            Rc::new(MemorySession::new()),
            Rc::new(StaticUserService::default()),
            Rc::new(NullSink),
        )
        .with_app_picker(|| AppType::Chat);
        assert_eq!((services.pick_app)(), AppType::Chat);
    }

    #[test]
    fn random_app_is_valid() {
        for _ in 0..16 {
            assert!(AppType::ALL.contains(&random_app()));
        }
    }

    #[test]
    fn service_error_display() {
        assert_eq!(
            ServiceError::Network("timeout".into()).to_string(),
            "network error: timeout"
        );
        assert_eq!(ServiceError::Unauthorized.to_string(), "unauthorized");
    }
}
