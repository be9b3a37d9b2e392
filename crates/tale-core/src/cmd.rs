#![forbid(unsafe_code)]

//! Side-effect values returned by pages.
//!
//! Pages never perform deferred work themselves. `update_state` and `update`
//! return a [`Cmd`] that the driver executes: messages are delivered
//! immediately, tasks are queued until the host event loop runs them. A task
//! is the one suspension point in the page tree (for example a network
//! lookup that decides a default child page).
//!
//! Commands compose through [`Cmd::map`], which lets a parent wrap a child's
//! messages in its own message type.

use std::fmt;
use std::rc::Rc;

/// A deferred unit of work that produces a message when run.
pub struct Task<M> {
    name: &'static str,
    run: Box<dyn FnOnce() -> M>,
}

impl<M> Task<M> {
    /// Create a named task.
    pub fn new(name: &'static str, run: impl FnOnce() -> M + 'static) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }

    /// Task name for logging.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the task to completion.
    pub fn run(self) -> M {
        (self.run)()
    }

    fn map_with<N: 'static>(self, f: Rc<dyn Fn(M) -> N>) -> Task<N>
    where
        M: 'static,
    {
        let run = self.run;
        Task {
            name: self.name,
            run: Box::new(move || f(run())),
        }
    }
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

/// Commands represent side effects to be executed by the driver.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Deliver a message to the page immediately.
    Msg(M),
    /// Defer work until the host event loop runs it.
    Task(Task<M>),
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(t) => f.debug_tuple("Task").field(&t.name).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a deferred task.
    pub fn task(name: &'static str, run: impl FnOnce() -> M + 'static) -> Self {
        Self::Task(Task::new(name, run))
    }

    /// Create a batch of commands, dropping no-ops.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Whether this is [`Cmd::None`].
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of tasks contained in this command, including nested batches.
    #[must_use]
    pub fn task_count(&self) -> usize {
        match self {
            Self::None | Self::Msg(_) => 0,
            Self::Task(_) => 1,
            Self::Batch(cmds) => cmds.iter().map(Cmd::task_count).sum(),
        }
    }

    /// Flatten into a list of leaf commands (messages and tasks), in order.
    pub fn into_leaves(self) -> Vec<Self> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Self>) {
        match self {
            Self::None => {}
            Self::Batch(cmds) => {
                for c in cmds {
                    c.flatten_into(out);
                }
            }
            leaf => out.push(leaf),
        }
    }
}

impl<M: 'static> Cmd<M> {
    /// Wrap every message this command produces.
    pub fn map<N: 'static>(self, f: impl Fn(M) -> N + 'static) -> Cmd<N> {
        self.map_with(Rc::new(f))
    }

    fn map_with<N: 'static>(self, f: Rc<dyn Fn(M) -> N>) -> Cmd<N> {
        match self {
            Self::None => Cmd::None,
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Task(t) => Cmd::Task(t.map_with(f)),
            Self::Batch(cmds) => Cmd::Batch(
                cmds.into_iter()
                    .map(|c| c.map_with(Rc::clone(&f)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Child {
        Loaded(u32),
    }

    #[derive(Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<u8>::batch(vec![]).is_none());
        assert!(Cmd::<u8>::batch(vec![Cmd::none(), Cmd::none()]).is_none());
        assert!(matches!(
            Cmd::batch(vec![Cmd::none(), Cmd::msg(1u8)]),
            Cmd::Msg(1)
        ));
        assert!(matches!(
            Cmd::batch(vec![Cmd::msg(1u8), Cmd::msg(2u8)]),
            Cmd::Batch(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn map_wraps_messages() {
        let cmd = Cmd::msg(Child::Loaded(3)).map(Parent::Child);
        assert!(matches!(cmd, Cmd::Msg(Parent::Child(Child::Loaded(3)))));
    }

    #[test]
    fn map_wraps_deferred_task() {
        let cmd = Cmd::task("load", || Child::Loaded(7)).map(Parent::Child);
        let Cmd::Task(task) = cmd else {
            panic!("expected task");
        };
        assert_eq!(task.name(), "load");
        assert_eq!(task.run(), Parent::Child(Child::Loaded(7)));
    }

    #[test]
    fn task_does_not_run_until_asked() {
        let ran = Rc::new(std::cell::Cell::new(false));
        let flag = Rc::clone(&ran);
        let cmd = Cmd::task("probe", move || flag.set(true));
        assert!(!ran.get());
        if let Cmd::Task(t) = cmd {
            t.run();
        }
        assert!(ran.get());
    }

    #[test]
    fn task_count_and_leaves() {
        let cmd = Cmd::Batch(vec![
            Cmd::msg(1u8),
            Cmd::Batch(vec![Cmd::task("a", || 2u8), Cmd::None]),
            Cmd::task("b", || 3u8),
        ]);
        assert_eq!(cmd.task_count(), 2);
        let leaves = cmd.into_leaves();
        assert_eq!(leaves.len(), 3);
        assert!(matches!(leaves[0], Cmd::Msg(1)));
    }
}
