#![forbid(unsafe_code)]

//! Tale Core
//!
//! The page-navigation and state-synchronization core of the Tale app.
//!
//! # Key Components
//!
//! - [`PageNavigator`] - single-slot mount/unmount state machine
//! - [`PageHost`] - lifecycle callbacks a navigator drives
//! - [`Page`] - the component contract (`update_state`, `update`, `remove`)
//! - [`Cmd`] - side effects, including deferred tasks
//! - [`Freshness`] - staleness guard for deferred results
//! - [`Listeners`] - typed observers for events leaving the root
//! - [`RegionSink`] - rendering seam for page regions
//!
//! # How it fits in the system
//! `tale-core` has no I/O. `tale-runtime` drives pages built on this crate
//! through a host event loop, and `tale-pages` builds the actual page tree.

pub mod cmd;
pub mod freshness;
pub mod listeners;
pub mod navigator;
pub mod page;
pub mod region;

pub use cmd::{Cmd, Task};
pub use freshness::{Freshness, Ticket};
pub use listeners::{ListenerId, Listeners};
pub use navigator::{CallbackHost, PageHost, PageNavigator, Transition};
pub use page::{Page, Update};
pub use region::{MountedNodes, Node, NullSink, RecordingSink, Region, RegionSink};
