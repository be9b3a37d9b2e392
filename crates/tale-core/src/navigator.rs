#![forbid(unsafe_code)]

//! Mount/unmount state machine for a single page slot.
//!
//! A [`PageNavigator`] tracks which of several mutually exclusive child pages
//! is mounted in one slot of a composite page and drives the lifecycle
//! callbacks of its owner through the [`PageHost`] trait.
//!
//! # State Machine
//!
//! ```text
//!            go_to(p)                    go_to(q), q != p
//!   Empty ───────────────▶ Mounted(p) ─────────────────────▶ Mounted(q)
//!     ▲   add_page(p)        │    ▲       remove_page(p)
//!     │                      │    │       add_page(q)
//!     │      remove()        │    │ go_to(p)
//!     └──────────────────────┘    └─ update_page(p)
//!          remove_page(p)
//! ```
//!
//! # Invariants
//!
//! 1. At most one page is mounted per navigator.
//! 2. When switching pages, `remove_page` for the old page always runs before
//!    `add_page` for the new one.
//! 3. [`PageNavigator::remove`] on an empty navigator never calls the host.
//! 4. The current page is recorded only after `add_page` returns. If
//!    `add_page` unwinds, the navigator is left `Empty`.
//!
//! # Ownership
//!
//! The navigator does not own its callbacks. The owner keeps the navigator
//! and its mounted children in separate fields and passes the children half
//! as the host:
//!
//! ```
//! use tale_core::navigator::{PageHost, PageNavigator};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Tab { Feed, Saved }
//!
//! #[derive(Default)]
//! struct Slots { mounted: Vec<Tab> }
//!
//! impl PageHost<Tab> for Slots {
//!     fn add_page(&mut self, page: Tab) { self.mounted.push(page); }
//!     fn remove_page(&mut self, page: Tab) { self.mounted.retain(|p| *p != page); }
//! }
//!
//! let mut nav = PageNavigator::new();
//! let mut slots = Slots::default();
//! nav.go_to(Tab::Feed, &mut slots);
//! nav.go_to(Tab::Saved, &mut slots);
//! assert_eq!(slots.mounted, vec![Tab::Saved]);
//! ```

use std::fmt;

use tracing::trace;

/// Lifecycle callbacks a navigator drives on behalf of its owner.
pub trait PageHost<P> {
    /// Construct and mount the child for `page`, push its initial state.
    fn add_page(&mut self, page: P);

    /// Unmount and dispose the child for `page`.
    fn remove_page(&mut self, page: P);

    /// Re-push state into the still-mounted child for `page`.
    ///
    /// Optional; the default does nothing.
    fn update_page(&mut self, page: P) {
        let _ = page;
    }
}

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<P> {
    /// Nothing was mounted; `add_page` ran.
    Added(P),
    /// The page was already mounted; `update_page` ran.
    Updated(P),
    /// A different page was mounted; `remove_page` then `add_page` ran.
    Replaced { from: P, to: P },
    /// The same page was torn down and mounted again.
    Remounted(P),
}

impl<P: Copy> Transition<P> {
    /// The page mounted after the transition.
    #[must_use]
    pub fn page(&self) -> P {
        match *self {
            Transition::Added(p) | Transition::Updated(p) | Transition::Remounted(p) => p,
            Transition::Replaced { to, .. } => to,
        }
    }

    /// Whether the transition constructed a fresh child.
    #[must_use]
    pub fn mounted_new(&self) -> bool {
        !matches!(self, Transition::Updated(_))
    }
}

/// Single-slot page state machine.
#[derive(Clone, PartialEq, Eq)]
pub struct PageNavigator<P> {
    current: Option<P>,
}

impl<P> Default for PageNavigator<P> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<P: fmt::Debug> fmt::Debug for PageNavigator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageNavigator")
            .field("current", &self.current)
            .finish()
    }
}

impl<P: Copy + PartialEq + fmt::Debug> PageNavigator<P> {
    /// Create an empty navigator.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// The currently mounted page, if any.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<P> {
        self.current
    }

    /// Whether nothing is mounted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Navigate to `page`.
    ///
    /// Mounts it when the slot is empty, soft-updates it when it is already
    /// mounted, and swaps it in otherwise.
    pub fn go_to<H>(&mut self, page: P, host: &mut H) -> Transition<P>
    where
        H: PageHost<P> + ?Sized,
    {
        let transition = match self.current {
            None => {
                self.mount(page, host);
                Transition::Added(page)
            }
            Some(current) if current == page => {
                host.update_page(page);
                Transition::Updated(page)
            }
            Some(current) => {
                self.unmount(current, host);
                self.mount(page, host);
                Transition::Replaced {
                    from: current,
                    to: page,
                }
            }
        };
        trace!(?transition, "page navigation");
        transition
    }

    /// Navigate to `page`, always constructing a fresh child.
    ///
    /// Used by owners whose notion of "same page" is finer than page-id
    /// equality (for example a list page keyed by its navigation stack).
    pub fn remount<H>(&mut self, page: P, host: &mut H) -> Transition<P>
    where
        H: PageHost<P> + ?Sized,
    {
        let transition = match self.current {
            None => {
                self.mount(page, host);
                Transition::Added(page)
            }
            Some(current) => {
                self.unmount(current, host);
                self.mount(page, host);
                if current == page {
                    Transition::Remounted(page)
                } else {
                    Transition::Replaced {
                        from: current,
                        to: page,
                    }
                }
            }
        };
        trace!(?transition, "page remount");
        transition
    }

    /// Unmount the current page, if any.
    ///
    /// Returns the page that was removed. Calling this on an empty navigator
    /// is a no-op.
    pub fn remove<H>(&mut self, host: &mut H) -> Option<P>
    where
        H: PageHost<P> + ?Sized,
    {
        let page = self.current?;
        self.unmount(page, host);
        trace!(?page, "page removed");
        Some(page)
    }

    fn unmount<H>(&mut self, page: P, host: &mut H)
    where
        H: PageHost<P> + ?Sized,
    {
        host.remove_page(page);
        self.current = None;
    }

    fn mount<H>(&mut self, page: P, host: &mut H)
    where
        H: PageHost<P> + ?Sized,
    {
        debug_assert!(self.current.is_none(), "mount over a mounted page");
        host.add_page(page);
        self.current = Some(page);
    }
}

type PageCallback<P> = Box<dyn FnMut(P)>;

/// A [`PageHost`] built from closures.
///
/// Useful for owners without a natural children struct, and in tests.
pub struct CallbackHost<P> {
    on_add: PageCallback<P>,
    on_remove: PageCallback<P>,
    on_update: Option<PageCallback<P>>,
}

impl<P> CallbackHost<P> {
    /// Create a host from the add and remove callbacks.
    pub fn new(on_add: impl FnMut(P) + 'static, on_remove: impl FnMut(P) + 'static) -> Self {
        Self {
            on_add: Box::new(on_add),
            on_remove: Box::new(on_remove),
            on_update: None,
        }
    }

    /// Attach an update callback.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(P) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }
}

impl<P> PageHost<P> for CallbackHost<P> {
    fn add_page(&mut self, page: P) {
        (self.on_add)(page);
    }

    fn remove_page(&mut self, page: P) {
        (self.on_remove)(page);
    }

    fn update_page(&mut self, page: P) {
        if let Some(ref mut hook) = self.on_update {
            hook(page);
        }
    }
}

impl<P> fmt::Debug for CallbackHost<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHost")
            .field("on_update", &self.on_update.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tab {
        Feed,
        Saved,
        Profile,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Add(Tab),
        Remove(Tab),
        Update(Tab),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl PageHost<Tab> for Recorder {
        fn add_page(&mut self, page: Tab) {
            self.calls.push(Call::Add(page));
        }

        fn remove_page(&mut self, page: Tab) {
            self.calls.push(Call::Remove(page));
        }

        fn update_page(&mut self, page: Tab) {
            self.calls.push(Call::Update(page));
        }
    }

    #[test]
    fn first_go_to_adds() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        let t = nav.go_to(Tab::Feed, &mut host);

        assert_eq!(t, Transition::Added(Tab::Feed));
        assert_eq!(host.calls, vec![Call::Add(Tab::Feed)]);
        assert_eq!(nav.current(), Some(Tab::Feed));
    }

    #[test]
    fn same_page_updates() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        nav.go_to(Tab::Feed, &mut host);
        let t = nav.go_to(Tab::Feed, &mut host);

        assert_eq!(t, Transition::Updated(Tab::Feed));
        assert!(!t.mounted_new());
        assert_eq!(host.calls, vec![Call::Add(Tab::Feed), Call::Update(Tab::Feed)]);
    }

    #[test]
    fn switch_removes_before_adding() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        nav.go_to(Tab::Feed, &mut host);
        let t = nav.go_to(Tab::Saved, &mut host);

        assert_eq!(
            t,
            Transition::Replaced {
                from: Tab::Feed,
                to: Tab::Saved
            }
        );
        assert_eq!(
            host.calls,
            vec![
                Call::Add(Tab::Feed),
                Call::Remove(Tab::Feed),
                Call::Add(Tab::Saved)
            ]
        );
        assert_eq!(nav.current(), Some(Tab::Saved));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        assert_eq!(nav.remove(&mut host), None);
        assert!(host.calls.is_empty());

        nav.go_to(Tab::Profile, &mut host);
        assert_eq!(nav.remove(&mut host), Some(Tab::Profile));
        assert_eq!(nav.remove(&mut host), None);
        assert_eq!(
            host.calls,
            vec![Call::Add(Tab::Profile), Call::Remove(Tab::Profile)]
        );
        assert!(nav.is_empty());
    }

    #[test]
    fn navigator_is_reusable_after_remove() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        nav.go_to(Tab::Feed, &mut host);
        nav.remove(&mut host);
        let t = nav.go_to(Tab::Feed, &mut host);

        assert_eq!(t, Transition::Added(Tab::Feed));
    }

    #[test]
    fn remount_same_page_tears_down() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        nav.go_to(Tab::Feed, &mut host);
        let t = nav.remount(Tab::Feed, &mut host);

        assert_eq!(t, Transition::Remounted(Tab::Feed));
        assert_eq!(
            host.calls,
            vec![
                Call::Add(Tab::Feed),
                Call::Remove(Tab::Feed),
                Call::Add(Tab::Feed)
            ]
        );
    }

    #[test]
    fn remount_on_empty_adds() {
        let mut nav = PageNavigator::new();
        let mut host = Recorder::default();

        assert_eq!(nav.remount(Tab::Saved, &mut host), Transition::Added(Tab::Saved));
    }

    #[test]
    fn panicking_add_leaves_navigator_empty() {
        struct Exploding;
        impl PageHost<Tab> for Exploding {
            fn add_page(&mut self, _page: Tab) {
                panic!("render failed");
            }
            fn remove_page(&mut self, _page: Tab) {}
        }

        let mut nav = PageNavigator::new();
        let mut good = Recorder::default();
        nav.go_to(Tab::Feed, &mut good);

        let result = catch_unwind(AssertUnwindSafe(|| {
            nav.go_to(Tab::Saved, &mut Exploding);
        }));

        assert!(result.is_err());
        assert_eq!(nav.current(), None);
    }

    #[test]
    fn callback_host_without_update_is_silent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let add_log = Rc::clone(&log);
        let remove_log = Rc::clone(&log);
        let mut host = CallbackHost::new(
            move |p| add_log.borrow_mut().push(Call::Add(p)),
            move |p| remove_log.borrow_mut().push(Call::Remove(p)),
        );
        let mut nav = PageNavigator::new();

        nav.go_to(Tab::Feed, &mut host);
        nav.go_to(Tab::Feed, &mut host);

        assert_eq!(*log.borrow(), vec![Call::Add(Tab::Feed)]);
    }

    #[test]
    fn callback_host_with_update() {
        let updates = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&updates);
        let mut host = CallbackHost::new(|_: Tab| {}, |_: Tab| {})
            .on_update(move |_| *counter.borrow_mut() += 1);
        let mut nav = PageNavigator::new();

        nav.go_to(Tab::Saved, &mut host);
        nav.go_to(Tab::Saved, &mut host);
        nav.go_to(Tab::Saved, &mut host);

        assert_eq!(*updates.borrow(), 2);
    }

    #[test]
    fn transition_page_reports_target() {
        let t = Transition::Replaced {
            from: Tab::Feed,
            to: Tab::Profile,
        };
        assert_eq!(t.page(), Tab::Profile);
        assert!(t.mounted_new());
    }
}
