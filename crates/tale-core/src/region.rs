#![forbid(unsafe_code)]

//! Rendering seam: named page regions and the sink that fills them.
//!
//! Pages do not build markup here. They hand opaque [`Node`] handles to a
//! [`RegionSink`], which appends or prepends them into one of the app's
//! fixed regions and detaches them again on removal. [`MountedNodes`] keeps
//! track of what a page has handed out so `remove()` can undo it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Fixed layout regions of the app frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Main content column.
    Main,
    /// Left navigation menu.
    LeftMenu,
    /// Top menu bar.
    TopMenu,
    /// Floating side controls.
    SideController,
}

impl Region {
    pub const ALL: &'static [Region] = &[
        Region::Main,
        Region::LeftMenu,
        Region::TopMenu,
        Region::SideController,
    ];
}

/// An opaque renderable handle, identified by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    key: String,
}

impl Node {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Side-effecting sink for rendered nodes.
pub trait RegionSink {
    /// Add nodes at the end of `region`.
    fn append(&self, region: Region, nodes: &[Node]);

    /// Add nodes at the start of `region`.
    fn prepend(&self, region: Region, nodes: &[Node]);

    /// Detach nodes from whichever region holds them.
    fn detach(&self, nodes: &[Node]);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RegionSink for NullSink {
    fn append(&self, _region: Region, _nodes: &[Node]) {}
    fn prepend(&self, _region: Region, _nodes: &[Node]) {}
    fn detach(&self, _nodes: &[Node]) {}
}

/// In-memory sink that records region contents, for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingSink {
    regions: RefCell<HashMap<Region, Vec<Node>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of the nodes currently in `region`, in order.
    #[must_use]
    pub fn keys(&self, region: Region) -> Vec<String> {
        self.regions
            .borrow()
            .get(&region)
            .map(|nodes| nodes.iter().map(|n| n.key.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether a node with `key` is attached anywhere.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.regions
            .borrow()
            .values()
            .any(|nodes| nodes.iter().any(|n| n.key == key))
    }

    /// Total attached nodes across regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.borrow().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegionSink for RecordingSink {
    fn append(&self, region: Region, nodes: &[Node]) {
        self.regions
            .borrow_mut()
            .entry(region)
            .or_default()
            .extend(nodes.iter().cloned());
    }

    fn prepend(&self, region: Region, nodes: &[Node]) {
        let mut regions = self.regions.borrow_mut();
        let slot = regions.entry(region).or_default();
        slot.splice(0..0, nodes.iter().cloned());
    }

    fn detach(&self, nodes: &[Node]) {
        let mut regions = self.regions.borrow_mut();
        for slot in regions.values_mut() {
            slot.retain(|n| !nodes.contains(n));
        }
    }
}

/// Nodes a page has attached, so they can be detached on removal.
#[derive(Debug, Default)]
pub struct MountedNodes {
    nodes: Vec<Node>,
}

impl MountedNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sink: &dyn RegionSink, region: Region, nodes: Vec<Node>) {
        sink.append(region, &nodes);
        self.nodes.extend(nodes);
    }

    pub fn prepend(&mut self, sink: &dyn RegionSink, region: Region, nodes: Vec<Node>) {
        sink.prepend(region, &nodes);
        self.nodes.extend(nodes);
    }

    /// Detach everything. No-op when nothing is attached.
    pub fn detach_all(&mut self, sink: &dyn RegionSink) {
        if self.nodes.is_empty() {
            return;
        }
        sink.detach(&self.nodes);
        self.nodes.clear();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_prepend_order() {
        let sink = RecordingSink::new();
        sink.append(Region::Main, &[Node::new("b")]);
        sink.prepend(Region::Main, &[Node::new("a")]);
        sink.append(Region::Main, &[Node::new("c")]);

        assert_eq!(sink.keys(Region::Main), vec!["a", "b", "c"]);
        assert!(sink.keys(Region::TopMenu).is_empty());
    }

    #[test]
    fn detach_removes_from_any_region() {
        let sink = RecordingSink::new();
        sink.append(Region::LeftMenu, &[Node::new("menu")]);
        sink.append(Region::Main, &[Node::new("body")]);

        sink.detach(&[Node::new("menu")]);

        assert!(!sink.contains("menu"));
        assert!(sink.contains("body"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn mounted_nodes_round_trip() {
        let sink = RecordingSink::new();
        let mut mounted = MountedNodes::new();
        mounted.append(&sink, Region::Main, vec![Node::new("x"), Node::new("y")]);
        mounted.prepend(&sink, Region::TopMenu, vec![Node::new("title")]);
        assert!(mounted.is_mounted());
        assert_eq!(sink.len(), 3);

        mounted.detach_all(&sink);
        mounted.detach_all(&sink);

        assert!(!mounted.is_mounted());
        assert!(sink.is_empty());
    }
}
