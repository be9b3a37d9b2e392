//! The page tree, root first.
//!
//! ```text
//! BodyContainer
//! ├── AuthPage
//! └── AppShell (Show | Chat)
//!     ├── ContentPage
//!     │   ├── HomePage
//!     │   │   ├── QuickTalesPage   (cached by list key)
//!     │   │   └── BookmarksPage
//!     │   └── ReplyPage            (cached by reply target)
//!     ├── AccountPage
//!     └── ConsumerSelectionPage
//! ```

pub mod account;
pub mod auth;
pub mod body;
pub mod bookmarks;
pub mod consumer_selection;
pub mod content;
pub mod home;
pub mod quick_tales;
pub mod reply;
pub mod shell;
