#![forbid(unsafe_code)]

//! Placeholder shown while the user has no consumer profile.
//!
//! Takes no input and reports nothing; its message and event types are
//! uninhabited.

use std::convert::Infallible;
use std::rc::Rc;

use tale_core::cmd::Cmd;
use tale_core::page::{Page, Update};
use tale_core::region::{MountedNodes, Node, Region, RegionSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerSelectionState;

pub struct ConsumerSelectionPage {
    state: ConsumerSelectionState,
    sink: Rc<dyn RegionSink>,
    nodes: MountedNodes,
}

impl ConsumerSelectionPage {
    pub fn new(sink: Rc<dyn RegionSink>) -> Self {
        Self {
            state: ConsumerSelectionState,
            sink,
            nodes: MountedNodes::new(),
        }
    }
}

impl Page for ConsumerSelectionPage {
    type State = ConsumerSelectionState;
    type Msg = Infallible;
    type Event = Infallible;

    fn update_state(&mut self, _state: Option<ConsumerSelectionState>) -> Cmd<Infallible> {
        if !self.nodes.is_mounted() {
            let node = Node::new("consumer-selection");
            self.nodes.append(self.sink.as_ref(), Region::Main, vec![node]);
        }
        Cmd::none()
    }

    fn update(&mut self, msg: Infallible) -> Update<Infallible, Infallible> {
        match msg {}
    }

    fn state(&self) -> &ConsumerSelectionState {
        &self.state
    }

    fn remove(&mut self) {
        self.nodes.detach_all(self.sink.as_ref());
    }
}
