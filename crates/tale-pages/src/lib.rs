#![forbid(unsafe_code)]

//! Tale Pages
//!
//! The composite page tree of the Tale media and chat app.
//!
//! Every composite owns one [`PageNavigator`](tale_core::PageNavigator) and
//! a state record with one optional sub-state per child. State is pushed down
//! with `update_state`; children report changes up as `NewState` events,
//! which the parent copies into its own record and re-emits.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use tale_core::region::RecordingSink;
//! use tale_pages::{AppType, BodyContainer, BodyPage, Services, StaticUserService};
//! use tale_runtime::{MemorySession, PageDriver, RuntimeConfig};
//!
//! let services = Services::new(
//!     &RuntimeConfig::default(),
//!     Rc::new(MemorySession::new()),
//!     Rc::new(StaticUserService::default()),
//!     Rc::new(RecordingSink::new()),
//! )
//! .with_app_picker(|| AppType::Chat);
//!
//! let mut driver = PageDriver::new(BodyContainer::new(services));
//! driver.init(None);
//! assert_eq!(driver.root().current_page(), Some(BodyPage::Auth));
//! ```

pub mod pages;
pub mod services;

pub use pages::body::{BodyContainer, BodyEvent, BodyMsg, BodyPage, BodyState};
pub use pages::shell::{AppShell, ShellEvent, ShellMsg, ShellPage, ShellState};
pub use services::{
    AppPicker, AppType, AppVariant, ServiceError, Services, StaticUserService, UserService,
    random_app,
};
