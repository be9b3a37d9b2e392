#![forbid(unsafe_code)]

//! Host-driven event loop for a page tree.
//!
//! [`PageDriver`] owns the root [`Page`] and executes the commands it
//! returns, without threads or blocking. The host controls the loop:
//!
//! 1. Call [`PageDriver::init`] once to push the initial state.
//! 2. Forward external signals with [`PageDriver::send`] or new state with
//!    [`PageDriver::push_state`].
//! 3. Call [`PageDriver::step`] from the host event loop to run deferred
//!    tasks queued so far.
//! 4. Read events that left the root via [`PageDriver::take_events`] or
//!    subscribe with [`PageDriver::on_event`].
//!
//! Messages are delivered synchronously. Tasks are queued and only run on
//! `step`, so state pushed between two steps can overtake a pending task,
//! exactly like a browser event loop overtaking an in-flight request.
//!
//! # Example
//!
//! ```ignore
//! let mut driver = PageDriver::new(BodyContainer::new(services));
//! driver.init(None);
//! driver.run_until_idle();
//! let events = driver.take_events();
//! ```

use std::collections::VecDeque;
use std::fmt;

use tale_core::cmd::{Cmd, Task};
use tale_core::listeners::{ListenerId, Listeners};
use tale_core::page::{Page, Update};
use tracing::{debug, warn};

/// Upper bound on tasks run by a single [`PageDriver::run_until_idle`] call.
const MAX_IDLE_TASKS: usize = 10_000;

/// Result of a single [`PageDriver::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the driver is still running (false after `shutdown`).
    pub running: bool,
    /// Number of deferred tasks run during this step.
    pub tasks_run: u32,
    /// Tasks queued for the next step.
    pub pending: usize,
    /// Step index (monotonically increasing).
    pub step_idx: u64,
}

/// Host-driven runner for a root page.
pub struct PageDriver<P: Page> {
    root: P,
    tasks: VecDeque<Task<P::Msg>>,
    events: Vec<P::Event>,
    listeners: Listeners<P::Event>,
    initialized: bool,
    running: bool,
    step_idx: u64,
}

impl<P: Page> PageDriver<P> {
    /// Create a driver for `root`. Nothing runs until [`init`](Self::init).
    pub fn new(root: P) -> Self {
        Self {
            root,
            tasks: VecDeque::new(),
            events: Vec::new(),
            listeners: Listeners::new(),
            initialized: false,
            running: true,
            step_idx: 0,
        }
    }

    /// Push the initial state into the root.
    ///
    /// Must be called exactly once, before any other input.
    pub fn init(&mut self, state: Option<P::State>) {
        assert!(!self.initialized, "PageDriver::init() called twice");
        self.initialized = true;
        let cmd = self.root.update_state(state);
        self.execute(cmd);
    }

    /// Push new state into the root.
    pub fn push_state(&mut self, state: Option<P::State>) {
        if !self.accepting("push_state") {
            return;
        }
        let cmd = self.root.update_state(state);
        self.execute(cmd);
    }

    /// Deliver a message to the root synchronously.
    pub fn send(&mut self, msg: P::Msg) {
        if !self.accepting("send") {
            return;
        }
        let update = self.root.update(msg);
        self.absorb(update);
    }

    /// Run the oldest queued task, if any.
    pub fn run_next_task(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let Some(task) = self.tasks.pop_front() else {
            return false;
        };
        debug!(task = task.name(), "running deferred task");
        let msg = task.run();
        let update = self.root.update(msg);
        self.absorb(update);
        true
    }

    /// Run every task queued before this call.
    ///
    /// Tasks queued while these run wait for the next step.
    pub fn step(&mut self) -> StepResult {
        assert!(self.initialized, "PageDriver::step() called before init()");
        let mut tasks_run: u32 = 0;
        let budget = self.tasks.len();
        for _ in 0..budget {
            if !self.run_next_task() {
                break;
            }
            tasks_run += 1;
        }
        self.step_idx += 1;
        StepResult {
            running: self.running,
            tasks_run,
            pending: self.tasks.len(),
            step_idx: self.step_idx,
        }
    }

    /// Run tasks until none are left. Returns how many ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while ran < MAX_IDLE_TASKS && self.run_next_task() {
            ran += 1;
        }
        if ran == MAX_IDLE_TASKS && !self.tasks.is_empty() {
            warn!(pending = self.tasks.len(), "task queue did not drain");
        }
        ran
    }

    /// Names of queued tasks, oldest first.
    pub fn pending_task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(Task::name).collect()
    }

    /// Number of queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Subscribe to events leaving the root.
    pub fn on_event(&mut self, f: impl FnMut(&P::Event) + 'static) -> ListenerId {
        self.listeners.subscribe(f)
    }

    /// Drop an event subscription.
    pub fn off_event(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Take the events emitted by the root since the last call.
    pub fn take_events(&mut self) -> Vec<P::Event> {
        std::mem::take(&mut self.events)
    }

    /// Events emitted by the root since the last [`take_events`](Self::take_events).
    pub fn events(&self) -> &[P::Event] {
        &self.events
    }

    /// Tear the tree down. Queued tasks are dropped; later input is ignored.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.tasks.clear();
        self.root.remove();
        self.listeners.clear();
        debug!("page driver shut down");
    }

    pub fn root(&self) -> &P {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut P {
        &mut self.root
    }

    /// The root's current state.
    pub fn state(&self) -> &P::State {
        self.root.state()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // --- Private helpers ---

    fn accepting(&self, what: &'static str) -> bool {
        assert!(self.initialized, "PageDriver::{what}() called before init()");
        if !self.running {
            debug!(call = what, "input after shutdown ignored");
        }
        self.running
    }

    fn absorb(&mut self, update: Update<P::Msg, P::Event>) {
        for event in update.events {
            self.listeners.emit(&event);
            self.events.push(event);
        }
        self.execute(update.cmd);
    }

    fn execute(&mut self, cmd: Cmd<P::Msg>) {
        for leaf in cmd.into_leaves() {
            if !self.running {
                break;
            }
            match leaf {
                Cmd::Msg(m) => {
                    let update = self.root.update(m);
                    self.absorb(update);
                }
                Cmd::Task(task) => {
                    debug!(task = task.name(), "task deferred");
                    self.tasks.push_back(task);
                }
                Cmd::None | Cmd::Batch(_) => {}
            }
        }
    }
}

impl<P: Page + fmt::Debug> fmt::Debug for PageDriver<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDriver")
            .field("root", &self.root)
            .field("pending_tasks", &self.tasks.len())
            .field("events", &self.events.len())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    // ---- Test page ----

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CounterState {
        value: i32,
        loaded: bool,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Load,
        Loaded(i32),
    }

    #[derive(Debug, PartialEq)]
    enum CounterEvent {
        NewState(CounterState),
    }

    #[derive(Default)]
    struct Counter {
        state: CounterState,
        removed: u32,
    }

    impl Page for Counter {
        type State = CounterState;
        type Msg = CounterMsg;
        type Event = CounterEvent;

        fn update_state(&mut self, state: Option<CounterState>) -> Cmd<CounterMsg> {
            self.state = state.unwrap_or_default();
            if self.state.loaded {
                Cmd::none()
            } else {
                Cmd::msg(CounterMsg::Load)
            }
        }

        fn update(&mut self, msg: CounterMsg) -> Update<CounterMsg, CounterEvent> {
            match msg {
                CounterMsg::Increment => {
                    self.state.value += 1;
                    Update::event(CounterEvent::NewState(self.state.clone()))
                }
                CounterMsg::Load => Update::cmd(Cmd::task("load", || CounterMsg::Loaded(40))),
                CounterMsg::Loaded(v) => {
                    self.state.value += v;
                    self.state.loaded = true;
                    Update::event(CounterEvent::NewState(self.state.clone()))
                }
            }
        }

        fn state(&self) -> &CounterState {
            &self.state
        }

        fn remove(&mut self) {
            self.removed += 1;
        }
    }

    #[test]
    fn init_defers_tasks() {
        let mut driver = PageDriver::new(Counter::default());
        driver.init(None);

        assert_eq!(driver.pending_tasks(), 1);
        assert_eq!(driver.pending_task_names(), vec!["load"]);
        assert!(!driver.state().loaded);

        let result = driver.step();
        assert_eq!(result.tasks_run, 1);
        assert_eq!(result.pending, 0);
        assert_eq!(
            driver.state(),
            &CounterState {
                value: 40,
                loaded: true
            }
        );
    }

    #[test]
    fn sync_input_overtakes_pending_task() {
        let mut driver = PageDriver::new(Counter::default());
        driver.init(None);
        driver.send(CounterMsg::Increment);

        assert_eq!(driver.state().value, 1);
        driver.run_until_idle();
        assert_eq!(driver.state().value, 41);
    }

    #[test]
    fn events_collected_and_broadcast() {
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let mut driver = PageDriver::new(Counter::default());
        driver.on_event(move |_| *counter.borrow_mut() += 1);
        driver.init(Some(CounterState {
            value: 0,
            loaded: true,
        }));

        driver.send(CounterMsg::Increment);
        driver.send(CounterMsg::Increment);

        assert_eq!(*seen.borrow(), 2);
        let events = driver.take_events();
        assert_eq!(
            events.last(),
            Some(&CounterEvent::NewState(CounterState {
                value: 2,
                loaded: true
            }))
        );
        assert!(driver.events().is_empty());
    }

    #[test]
    fn shutdown_removes_root_once() {
        let mut driver = PageDriver::new(Counter::default());
        driver.init(None);
        driver.shutdown();
        driver.shutdown();

        assert_eq!(driver.root().removed, 1);
        assert_eq!(driver.pending_tasks(), 0);
        assert!(!driver.is_running());

        driver.send(CounterMsg::Increment);
        assert_eq!(driver.state().value, 0);
        assert!(!driver.step().running);
    }

    #[test]
    #[should_panic(expected = "called twice")]
    fn double_init_panics() {
        let mut driver = PageDriver::new(Counter::default());
        driver.init(None);
        driver.init(None);
    }
}
