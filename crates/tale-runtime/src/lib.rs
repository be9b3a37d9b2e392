#![forbid(unsafe_code)]

//! Tale Runtime
//!
//! Runs a page tree built on `tale-core` inside a host event loop.
//!
//! # Key Components
//!
//! - [`PageDriver`] - host-driven loop: synchronous messages, deferred tasks
//! - [`PageCache`] - bounded LRU of reusable page instances
//! - [`SessionStorage`] - persisted sign-in token
//! - [`RuntimeConfig`] - defaults plus `TALE_*` environment overrides
//!
//! # Feature Gates
//!
//! - `file-session`: JSON file backend for [`SessionStorage`].
//! - `tracing-json`: `logging::init` installs a `tracing-subscriber`.

pub mod config;
pub mod driver;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod page_cache;
pub mod session;

pub use config::RuntimeConfig;
pub use driver::{PageDriver, StepResult};
pub use page_cache::{CacheStats, PageCache, SharedPageCache};
#[cfg(feature = "file-session")]
pub use session::FileSession;
pub use session::{MemorySession, SessionError, SessionResult, SessionStorage};
