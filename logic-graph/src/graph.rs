//! The graph arena: node storage, the wiring protocol, slots and cached evaluation.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use petgraph::{algo::has_path_connecting, prelude::*};
use tracing::{debug, trace, warn};

use crate::error::{ConnectError, DisconnectError, EvalError, ReadError, RemoveError, SlotError};
use crate::gate::{Component, GateFunction};
use crate::node::{Key, Node, NodeKind};

/// Counters for how evaluation used the caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Stored gate or inverter results that were reused.
    pub cache_hits: u64,
    /// Gate or inverter results that had to be computed.
    pub recomputations: u64,
}

/// What evaluation found when it looked at an input.
enum Upstream {
    /// The input's value is known.
    Ready(bool),
    /// The input is a gate or inverter that still has to be computed.
    Pending(NodeIndex),
    /// The input key names no node.
    Missing,
}

/// A gate or inverter whose inputs are being tallied.
struct Frame {
    index: NodeIndex,
    /// `None` for an inverter.
    function: Option<GateFunction>,
    inputs: Vec<Key>,
    next: usize,
    trues: usize,
    falses: usize,
}

impl Frame {
    /// Start on `node`, stored at `index`. Input nodes are never framed.
    fn new(index: NodeIndex, node: &Node) -> Result<Self, EvalError> {
        let (function, inputs) = match node.kind() {
            NodeKind::Gate { function, inputs, .. } if !inputs.is_empty() => (Some(*function), node.inputs()),
            NodeKind::Inverter { input: Some(_), .. } => (None, node.inputs()),
            _ => return Err(EvalError::NoInputs(node.key())),
        };
        Ok(Self { index, function, inputs, next: 0, trues: 0, falses: 0 })
    }

    fn count(&mut self, value: bool) {
        if value {
            self.trues += 1;
        } else {
            self.falses += 1;
        }
        self.next += 1;
    }

    fn value(&self) -> bool {
        self.function.map_or(self.trues == 0, |function| function.apply(self.trues, self.falses))
    }
}

/// A combinational logic graph.
///
/// The graph owns every node. Nodes refer to their inputs by [`Key`]; the reverse links, from a node to the nodes
/// reading it, are edges of the underlying petgraph store. An edge `u -> v` means `v` lists `u` as an input.
///
/// Input nodes are created with the graph, one per input slot, and are never removed. Output slots start empty and
/// are bound to nodes by the caller.
#[derive(Clone, Debug)]
pub struct Graph {
    graph: StableGraph<Node, (), Directed>,
    index: HashMap<Key, NodeIndex>,
    input_slots: Vec<Key>,
    input_keys: HashSet<Key>,
    output_slots: Vec<Option<Key>>,
    next_key: u32,
    stats: EvalStats,
}

impl Graph {
    /// Create a graph with `input_count` input nodes, all low, and `output_count` unbound output slots.
    #[must_use]
    pub fn new(input_count: usize, output_count: usize) -> Self {
        let mut graph = Self {
            graph: StableGraph::default(),
            index: HashMap::new(),
            input_slots: Vec::with_capacity(input_count),
            input_keys: HashSet::new(),
            output_slots: vec![None; output_count],
            next_key: 1,
            stats: EvalStats::default(),
        };

        for slot in 0..input_count {
            let key = graph.allocate_key();
            graph.insert(Node::input(key, slot));
            graph.input_slots.push(key);
            graph.input_keys.insert(key);
        }

        debug!(input_count, output_count, "created logic graph");
        graph
    }

    /// Reserve a fresh key without creating a node.
    ///
    /// Once all `u32::MAX` keys have been handed out this returns [`Key::NULL`].
    pub fn allocate_key(&mut self) -> Key {
        let key = Key::from(self.next_key);
        if key.is_null() {
            warn!("node keys exhausted");
            return key;
        }
        // Zero marks the counter as spent.
        self.next_key = self.next_key.checked_add(1).unwrap_or(0);
        key
    }

    fn insert(&mut self, node: Node) -> Key {
        let key = node.key();
        let index = self.graph.add_node(node);
        self.index.insert(key, index);
        key
    }

    fn index_of(&self, key: Key) -> Option<NodeIndex> {
        self.index.get(&key).copied()
    }

    /// Add a gate with no inputs. Returns [`Key::NULL`] if no key is left.
    pub fn add_gate(&mut self, function: GateFunction) -> Key {
        let key = self.allocate_key();
        if key.is_null() {
            return key;
        }
        debug!(key = %key, %function, "added gate");
        self.insert(Node::gate(key, function))
    }

    /// Add an inverter with no input. Returns [`Key::NULL`] if no key is left.
    pub fn add_inverter(&mut self) -> Key {
        let key = self.allocate_key();
        if key.is_null() {
            return key;
        }
        debug!(key = %key, "added inverter");
        self.insert(Node::inverter(key))
    }

    /// Add a gate or an inverter.
    pub fn add_component(&mut self, component: Component) -> Key {
        match component {
            Component::Gate(function) => self.add_gate(function),
            Component::Inverter => self.add_inverter(),
        }
    }

    /// Add a component by host kind code, returning [`Key::NULL`] for an unknown code.
    pub fn add_by_code(&mut self, code: i32) -> Key {
        Component::from_code(code).map_or_else(
            || {
                debug!(code, "rejected unknown component code");
                Key::NULL
            },
            |component| self.add_component(component),
        )
    }

    /// Wire `source` in as an input of `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` is an input node, an inverter that already has an input, already reads `source`, or if
    /// `source` is downstream of `target`. Nothing changes on failure.
    pub fn connect(&mut self, target: Key, source: Key) -> Result<(), ConnectError> {
        let target_index = self.index_of(target).ok_or(ConnectError::UnknownNode(target))?;
        let source_index = self.index_of(source).ok_or(ConnectError::UnknownNode(source))?;

        self.graph[target_index].accepts(source)?;

        // A path from target to source plus the new edge source -> target would be a loop.
        if has_path_connecting(&self.graph, target_index, source_index, None) {
            return Err(ConnectError::WouldCycle(source));
        }

        self.graph[target_index].attach(source);
        self.graph.add_edge(source_index, target_index, ());
        self.invalidate(target_index);

        debug!(target = %target, source = %source, "connected");
        Ok(())
    }

    /// Remove `source` as an input of `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` is an input node, has no inputs, does not read `source`, or if `source` does not list
    /// `target` as a dependent.
    pub fn disconnect(&mut self, target: Key, source: Key) -> Result<(), DisconnectError> {
        let target_index = self.index_of(target).ok_or(DisconnectError::UnknownNode(target))?;
        self.graph[target_index].releases(source)?;

        let edge = self
            .index_of(source)
            .and_then(|source_index| self.graph.find_edge(source_index, target_index))
            .ok_or_else(|| {
                warn!(target = %target, source = %source, "input has no dependent link back to target");
                DisconnectError::MissingBackLink(source)
            })?;

        self.graph.remove_edge(edge);
        self.graph[target_index].detach(source);
        self.invalidate(target_index);

        debug!(target = %target, source = %source, "disconnected");
        Ok(())
    }

    /// Remove the wire between `a` and `b`, whichever way it runs.
    ///
    /// # Errors
    ///
    /// If `a` does not read `b`, the result of removing `a` as an input of `b` is returned, so when neither node
    /// reads the other the error describes the second attempt. Inconsistent links and unknown keys are reported
    /// without trying the other direction.
    pub fn remove_connection(&mut self, a: Key, b: Key) -> Result<(), DisconnectError> {
        match self.disconnect(a, b) {
            Err(error) if error.is_absent_wire() => self.disconnect(b, a),
            result => result,
        }
    }

    /// Remove a gate or inverter, unwiring it from both sides first.
    ///
    /// Output slots bound to the node become unbound.
    ///
    /// # Errors
    ///
    /// Input nodes cannot be removed. If any neighbour's link back to the node is missing the graph is left as it
    /// was and the inconsistency is reported.
    pub fn remove_node(&mut self, key: Key) -> Result<(), RemoveError> {
        if self.input_keys.contains(&key) {
            return Err(RemoveError::Permanent(key));
        }
        let index = self.index_of(key).ok_or(RemoveError::UnknownNode(key))?;

        let mut upstream = Vec::new();
        for input in self.graph[index].inputs() {
            let edge = self
                .index_of(input)
                .and_then(|input_index| self.graph.find_edge(input_index, index))
                .ok_or(RemoveError::MissingDependent(key, input))?;
            upstream.push(edge);
        }

        let dependents: Vec<NodeIndex> = self.graph.neighbors_directed(index, Outgoing).collect();
        if let Some(&stale) = dependents.iter().find(|&&dependent| !self.graph[dependent].has_input(key)) {
            return Err(RemoveError::MissingInput(key, self.graph[stale].key()));
        }

        for edge in upstream {
            self.graph.remove_edge(edge);
        }

        // The dependent edges go away with the node itself.
        for &dependent in &dependents {
            self.graph[dependent].detach(key);
            self.invalidate(dependent);
        }

        self.graph.remove_node(index);
        self.index.remove(&key);

        for (slot, bound) in self.output_slots.iter_mut().enumerate() {
            if *bound == Some(key) {
                debug!(slot, key = %key, "unbound output slot from removed node");
                *bound = None;
            }
        }

        debug!(key = %key, dependents = dependents.len(), "removed node");
        Ok(())
    }

    /// The key of the input node bound to `slot`.
    #[must_use]
    pub fn input_slot_key(&self, slot: usize) -> Option<Key> {
        self.input_slots.get(slot).copied()
    }

    /// Connect the input node at `slot` to `target`.
    ///
    /// # Errors
    ///
    /// As for [`Graph::connect`], or if the slot does not exist.
    pub fn connect_slot(&mut self, target: Key, slot: usize) -> Result<(), ConnectError> {
        let source = self.input_slot_key(slot).ok_or(ConnectError::SlotOutOfRange(slot))?;
        self.connect(target, source)
    }

    /// Disconnect the input node at `slot` from `target`.
    ///
    /// # Errors
    ///
    /// As for [`Graph::disconnect`], or if the slot does not exist.
    pub fn disconnect_slot(&mut self, target: Key, slot: usize) -> Result<(), DisconnectError> {
        let source = self.input_slot_key(slot).ok_or(DisconnectError::SlotOutOfRange(slot))?;
        self.disconnect(target, source)
    }

    /// Set the value of the input node at `slot`.
    ///
    /// Setting the value it already has leaves every cache intact.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist.
    pub fn set_input_value(&mut self, slot: usize, value: bool) -> Result<(), SlotError> {
        let key = self.input_slot_key(slot).ok_or(SlotError::SlotOutOfRange(slot))?;
        let index = self.index_of(key).ok_or(SlotError::UnknownNode(key))?;

        if self.graph[index].set_value(value) {
            trace!(slot, value, "input changed");
            self.invalidate(index);
        }
        Ok(())
    }

    /// Set input slots from a pattern: slot `i` goes high iff character `i` is `'1'`.
    ///
    /// Slots past the end of the pattern keep their values.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the pattern is longer than the number of input slots.
    pub fn feed_inputs(&mut self, pattern: &str) -> Result<(), SlotError> {
        let length = pattern.chars().count();
        if length > self.input_slots.len() {
            return Err(SlotError::PatternTooLong { length, slots: self.input_slots.len() });
        }

        for (slot, bit) in pattern.chars().enumerate() {
            self.set_input_value(slot, bit == '1')?;
        }
        Ok(())
    }

    /// Bind output slot `slot` to read from `key`.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist or `key` names no node.
    pub fn bind_output_slot(&mut self, slot: usize, key: Key) -> Result<(), SlotError> {
        if !self.index.contains_key(&key) {
            return Err(SlotError::UnknownNode(key));
        }
        let bound = self.output_slots.get_mut(slot).ok_or(SlotError::SlotOutOfRange(slot))?;
        *bound = Some(key);
        Ok(())
    }

    /// Unbind output slot `slot`.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist.
    pub fn clear_output_slot(&mut self, slot: usize) -> Result<(), SlotError> {
        let bound = self.output_slots.get_mut(slot).ok_or(SlotError::SlotOutOfRange(slot))?;
        *bound = None;
        Ok(())
    }

    /// The node bound to output slot `slot`, if any.
    #[must_use]
    pub fn output_slot(&self, slot: usize) -> Option<Key> {
        self.output_slots.get(slot).copied().flatten()
    }

    /// Evaluate the node bound to output slot `slot`.
    ///
    /// # Errors
    ///
    /// Fails if the slot does not exist, is unbound, or its node fails to evaluate.
    pub fn read_output_slot(&mut self, slot: usize) -> Result<bool, ReadError> {
        let bound = self.output_slots.get(slot).copied().ok_or(ReadError::SlotOutOfRange(slot))?;
        let key = bound.ok_or(ReadError::Unbound(slot))?;
        Ok(self.evaluate(key)?)
    }

    /// Evaluate every output slot, in slot order.
    pub fn read_outputs(&mut self) -> Vec<Result<bool, ReadError>> {
        (0..self.output_slots.len()).map(|slot| self.read_output_slot(slot)).collect()
    }

    /// Evaluate a node, reusing cached results where they are still valid.
    ///
    /// # Errors
    ///
    /// Fails if `key` names no node, if the node has no inputs, or if anything upstream fails.
    pub fn evaluate(&mut self, key: Key) -> Result<bool, EvalError> {
        let index = self.index_of(key).ok_or(EvalError::UnknownNode(key))?;
        self.output(index)
    }

    fn output(&mut self, root: NodeIndex) -> Result<bool, EvalError> {
        let node = &self.graph[root];
        if let NodeKind::Input { value, .. } = node.kind() {
            return Ok(*value);
        }
        if let Some(value) = node.cached() {
            self.stats.cache_hits += 1;
            return Ok(value);
        }

        // Depth-first over uncached gates and inverters. The stack is a path from the root, so it never holds a node
        // twice, and each frame walks its inputs once.
        let mut stack = vec![Frame::new(root, node)?];
        let mut fresh = HashSet::new();
        let mut value = false;

        while let Some(frame) = stack.last_mut() {
            if let Some(&input) = frame.inputs.get(frame.next) {
                match self.upstream(input, &mut fresh) {
                    Upstream::Ready(value) => frame.count(value),
                    Upstream::Pending(index) => {
                        let child = Frame::new(index, &self.graph[index]).map_err(|error| {
                            trace!(%error, "upstream evaluation failed");
                            EvalError::UpstreamFailed
                        })?;
                        stack.push(child);
                    },
                    Upstream::Missing => return Err(EvalError::UpstreamFailed),
                }
                continue;
            }

            value = frame.value();
            let index = frame.index;
            stack.pop();

            self.graph[index].store(value);
            self.stats.recomputations += 1;
            fresh.insert(index);
            trace!(key = %self.graph[index].key(), value, "computed");
        }

        // The root frame is the last one popped.
        Ok(value)
    }

    /// Look at an input of the node being evaluated.
    ///
    /// A result computed earlier in the same evaluation is handed to its first reader without counting as a cache
    /// hit.
    fn upstream(&mut self, key: Key, fresh: &mut HashSet<NodeIndex>) -> Upstream {
        let Some(index) = self.index_of(key) else {
            warn!(key = %key, "input refers to a missing node");
            return Upstream::Missing;
        };

        let node = &self.graph[index];
        if let NodeKind::Input { value, .. } = node.kind() {
            return Upstream::Ready(*value);
        }
        match node.cached() {
            Some(value) => {
                if !fresh.remove(&index) {
                    self.stats.cache_hits += 1;
                }
                Upstream::Ready(value)
            },
            None => Upstream::Pending(index),
        }
    }

    /// Clear the cache of `origin` and of everything downstream of it.
    ///
    /// A node with no cached result cannot have a cached node downstream, so the walk stops there.
    fn invalidate(&mut self, origin: NodeIndex) {
        self.graph[origin].invalidate();

        let mut pending: Vec<NodeIndex> = self.graph.neighbors_directed(origin, Outgoing).collect();
        while let Some(index) = pending.pop() {
            if self.graph[index].invalidate() {
                trace!(key = %self.graph[index].key(), "invalidated");
                pending.extend(self.graph.neighbors_directed(index, Outgoing));
            }
        }
    }

    /// Returns true if `key` names a node in this graph.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.index.contains_key(&key)
    }

    /// Returns true if `key` names one of the permanent input nodes.
    #[must_use]
    pub fn is_input(&self, key: Key) -> bool {
        self.input_keys.contains(&key)
    }

    /// The node named by `key`.
    #[must_use]
    pub fn node(&self, key: Key) -> Option<&Node> {
        self.index_of(key).map(|index| &self.graph[index])
    }

    /// Keys of the nodes `key` reads from, in key order.
    #[must_use]
    pub fn inputs_of(&self, key: Key) -> Option<Vec<Key>> {
        self.node(key).map(Node::inputs)
    }

    /// Keys of the nodes reading from `key`, in key order.
    #[must_use]
    pub fn dependents_of(&self, key: Key) -> Option<Vec<Key>> {
        let index = self.index_of(key)?;
        Some(
            self.graph
                .neighbors_directed(index, Outgoing)
                .map(|dependent| self.graph[dependent].key())
                .sorted()
                .collect(),
        )
    }

    /// Returns true if `key` is a gate or inverter holding a valid result.
    #[must_use]
    pub fn is_cached(&self, key: Key) -> bool {
        self.node(key).and_then(Node::cached).is_some()
    }

    /// Number of nodes, inputs included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of input slots.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_slots.len()
    }

    /// Number of output slots.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.output_slots.len()
    }

    /// Cache counters accumulated since creation or the last [`Graph::reset_stats`].
    #[must_use]
    pub const fn stats(&self) -> EvalStats {
        self.stats
    }

    /// Zero the cache counters.
    pub fn reset_stats(&mut self) {
        self.stats = EvalStats::default();
    }

    /// A one-line description of every node, for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        self.index
            .keys()
            .sorted()
            .filter_map(|&key| self.node(key))
            .map(|node| format!("{} <- [{}]", node.key(), node.inputs().iter().join(", ")))
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCode;

    fn two_input_and() -> (Graph, Key) {
        let mut graph = Graph::new(2, 1);
        let gate = graph.add_gate(GateFunction::And);
        graph.connect_slot(gate, 0).unwrap();
        graph.connect_slot(gate, 1).unwrap();
        (graph, gate)
    }

    #[test]
    fn keys_start_after_inputs() {
        let mut graph = Graph::new(3, 0);
        assert_eq!(graph.input_slot_key(0), Some(Key::from(1)));
        assert_eq!(graph.input_slot_key(2), Some(Key::from(3)));
        assert_eq!(graph.input_slot_key(3), None);

        assert_eq!(graph.allocate_key(), Key::from(4));
        assert_eq!(graph.add_inverter(), Key::from(5));
        assert!(!graph.contains(Key::from(4)));
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn connect_registers_both_directions() {
        let (graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();
        let x1 = graph.input_slot_key(1).unwrap();

        assert_eq!(graph.inputs_of(gate), Some(vec![x0, x1]));
        assert_eq!(graph.dependents_of(x0), Some(vec![gate]));
        assert_eq!(graph.dependents_of(x1), Some(vec![gate]));
        assert_eq!(graph.describe(), "1 <- []; 2 <- []; 3 <- [1, 2]");
    }

    #[test]
    fn connect_errors() {
        let (mut graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();

        assert_eq!(graph.connect(gate, x0), Err(ConnectError::AlreadyConnected(x0)));
        assert_eq!(graph.connect(x0, gate), Err(ConnectError::InputTarget(x0)));
        assert_eq!(graph.connect(gate, gate), Err(ConnectError::WouldCycle(gate)));
        assert_eq!(graph.connect(gate, Key::from(99)), Err(ConnectError::UnknownNode(Key::from(99))));
        assert_eq!(graph.connect_slot(gate, 2), Err(ConnectError::SlotOutOfRange(2)));

        let inverter = graph.add_inverter();
        graph.connect(inverter, gate).unwrap();
        assert_eq!(graph.connect(inverter, x0), Err(ConnectError::InverterOccupied(inverter)));
        assert_eq!(graph.connect(gate, inverter), Err(ConnectError::WouldCycle(inverter)));
        assert_eq!(graph.connect(gate, inverter).code(), 2);
    }

    #[test]
    fn disconnect_errors() {
        let (mut graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();
        let empty = graph.add_gate(GateFunction::Or);

        assert_eq!(graph.disconnect(empty, x0), Err(DisconnectError::NoInputs(empty)));
        assert_eq!(graph.disconnect(gate, empty), Err(DisconnectError::NotAnInput(empty)));
        assert_eq!(graph.disconnect(x0, gate), Err(DisconnectError::InputTarget(x0)));
        assert_eq!(graph.disconnect(Key::from(42), x0), Err(DisconnectError::UnknownNode(Key::from(42))));
        assert_eq!(graph.disconnect(x0, gate).code(), -4);
    }

    #[test]
    fn disconnect_reports_missing_back_link() {
        let (mut graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();

        let edge = graph.graph.find_edge(graph.index[&x0], graph.index[&gate]).unwrap();
        graph.graph.remove_edge(edge);

        assert_eq!(graph.disconnect(gate, x0), Err(DisconnectError::MissingBackLink(x0)));
        // Nothing was patched up.
        assert_eq!(graph.inputs_of(gate).unwrap().len(), 2);
    }

    #[test]
    fn remove_node_reports_inconsistencies() {
        let (mut graph, gate) = two_input_and();
        let x1 = graph.input_slot_key(1).unwrap();
        let edge = graph.graph.find_edge(graph.index[&x1], graph.index[&gate]).unwrap();
        graph.graph.remove_edge(edge);

        assert_eq!(graph.remove_node(gate), Err(RemoveError::MissingDependent(gate, x1)));
        assert!(graph.contains(gate));

        let (mut graph, gate) = two_input_and();
        let inverter = graph.add_inverter();
        graph.connect(inverter, gate).unwrap();
        graph.graph[graph.index[&inverter]].detach(gate);

        assert_eq!(graph.remove_node(gate), Err(RemoveError::MissingInput(gate, inverter)));
        assert_eq!(graph.remove_node(gate).code(), -1);
        assert!(graph.contains(gate));
    }

    #[test]
    fn inputs_are_permanent() {
        let (mut graph, _) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();
        assert_eq!(graph.remove_node(x0), Err(RemoveError::Permanent(x0)));
        assert_eq!(graph.remove_node(Key::from(77)), Err(RemoveError::UnknownNode(Key::from(77))));
        assert!(graph.contains(x0));
    }

    #[test]
    fn evaluation_is_cached() {
        let (mut graph, gate) = two_input_and();
        graph.set_input_value(0, true).unwrap();
        graph.set_input_value(1, true).unwrap();

        assert_eq!(graph.evaluate(gate), Ok(true));
        assert_eq!(graph.stats(), EvalStats { cache_hits: 0, recomputations: 1 });
        assert!(graph.is_cached(gate));

        assert_eq!(graph.evaluate(gate), Ok(true));
        assert_eq!(graph.stats(), EvalStats { cache_hits: 1, recomputations: 1 });

        graph.set_input_value(1, false).unwrap();
        assert!(!graph.is_cached(gate));
        assert_eq!(graph.evaluate(gate), Ok(false));
        assert_eq!(graph.stats().recomputations, 2);
    }

    #[test]
    fn unchanged_input_keeps_caches() {
        let (mut graph, gate) = two_input_and();
        let inverter = graph.add_inverter();
        graph.connect(inverter, gate).unwrap();

        assert_eq!(graph.evaluate(inverter), Ok(true));
        graph.reset_stats();

        graph.set_input_value(0, false).unwrap();
        assert!(graph.is_cached(gate));
        assert!(graph.is_cached(inverter));
        assert_eq!(graph.evaluate(inverter), Ok(true));
        assert_eq!(graph.stats(), EvalStats { cache_hits: 1, recomputations: 0 });
    }

    #[test]
    fn invalidation_reaches_every_dependent() {
        let (mut graph, gate) = two_input_and();
        let inverter = graph.add_inverter();
        let or = graph.add_gate(GateFunction::Or);
        graph.connect(inverter, gate).unwrap();
        graph.connect(or, inverter).unwrap();
        graph.connect(or, gate).unwrap();

        assert_eq!(graph.evaluate(or), Ok(true));
        // The inverter's read of the gate is the only reuse.
        assert_eq!(graph.stats(), EvalStats { cache_hits: 1, recomputations: 3 });
        assert!(graph.is_cached(gate) && graph.is_cached(inverter) && graph.is_cached(or));

        graph.set_input_value(0, true).unwrap();
        assert!(!graph.is_cached(gate));
        assert!(!graph.is_cached(inverter));
        assert!(!graph.is_cached(or));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut graph = Graph::new(1, 0);
        let empty = graph.add_gate(GateFunction::And);
        let inverter = graph.add_inverter();
        graph.connect(inverter, empty).unwrap();

        assert_eq!(graph.evaluate(empty), Err(EvalError::NoInputs(empty)));
        assert_eq!(graph.evaluate(inverter), Err(EvalError::UpstreamFailed));
        assert!(!graph.is_cached(inverter));

        graph.connect_slot(empty, 0).unwrap();
        assert_eq!(graph.evaluate(inverter), Ok(true));
    }

    #[test]
    fn remove_connection_either_way() {
        let (mut graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();
        let x1 = graph.input_slot_key(1).unwrap();

        assert_eq!(graph.remove_connection(gate, x0), Ok(()));
        assert_eq!(graph.remove_connection(x1, gate), Ok(()));
        assert_eq!(graph.inputs_of(gate), Some(vec![]));
        assert_eq!(graph.remove_connection(gate, x0), Err(DisconnectError::InputTarget(x0)));
    }

    #[test]
    fn remove_connection_reports_the_reverse_attempt() {
        let mut graph = Graph::new(2, 0);
        let x1 = graph.input_slot_key(1).unwrap();
        let gate = graph.add_gate(GateFunction::And);
        graph.connect_slot(gate, 0).unwrap();

        assert_eq!(graph.remove_connection(gate, x1), Err(DisconnectError::InputTarget(x1)));
        assert_eq!(graph.remove_connection(gate, x1).code(), -4);
        assert_eq!(graph.inputs_of(gate).unwrap().len(), 1);

        let empty = graph.add_gate(GateFunction::Or);
        assert_eq!(graph.remove_connection(gate, empty), Err(DisconnectError::NoInputs(empty)));
        assert_eq!(graph.remove_connection(gate, empty).code(), -1);
    }

    #[test]
    fn disconnect_slot() {
        let (mut graph, gate) = two_input_and();
        let x0 = graph.input_slot_key(0).unwrap();
        let x1 = graph.input_slot_key(1).unwrap();

        assert_eq!(graph.disconnect_slot(gate, 0), Ok(()));
        assert_eq!(graph.inputs_of(gate), Some(vec![x1]));
        assert_eq!(graph.dependents_of(x0), Some(vec![]));

        assert_eq!(graph.disconnect_slot(gate, 0), Err(DisconnectError::NotAnInput(x0)));
        assert_eq!(graph.disconnect_slot(gate, 2), Err(DisconnectError::SlotOutOfRange(2)));
        assert_eq!(graph.disconnect_slot(gate, 2).code(), -6);
        assert_eq!(graph.inputs_of(gate), Some(vec![x1]));
    }

    #[test]
    fn keys_run_out() {
        let mut graph = Graph::new(1, 0);
        graph.next_key = u32::MAX;

        assert_eq!(graph.add_inverter(), Key::from(u32::MAX));
        assert_eq!(graph.allocate_key(), Key::NULL);
        assert_eq!(graph.add_gate(GateFunction::Or), Key::NULL);
        assert_eq!(graph.add_inverter(), Key::NULL);
        assert_eq!(graph.add_by_code(0), Key::NULL);
        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains(Key::NULL));
    }

    #[test]
    fn slot_counts_and_inputs() {
        let mut graph = Graph::new(3, 2);
        let x0 = graph.input_slot_key(0).unwrap();
        let gate = graph.add_gate(GateFunction::Nand);

        assert_eq!(graph.input_count(), 3);
        assert_eq!(graph.output_count(), 2);
        assert!(graph.is_input(x0));
        assert!(!graph.is_input(gate));
        assert!(!graph.is_input(Key::from(99)));
        assert!(graph.node(x0).unwrap().is_input());
    }

    #[test]
    fn feed_inputs_pattern() {
        let (mut graph, gate) = two_input_and();
        graph.feed_inputs("11").unwrap();
        assert_eq!(graph.evaluate(gate), Ok(true));
        graph.feed_inputs("0").unwrap();
        assert_eq!(graph.evaluate(gate), Ok(false));
        assert_eq!(graph.feed_inputs("111"), Err(SlotError::PatternTooLong { length: 3, slots: 2 }));
        assert_eq!(graph.evaluate(gate), Ok(false));
    }

    #[test]
    fn output_slots() {
        let (mut graph, gate) = two_input_and();
        assert_eq!(graph.read_output_slot(0), Err(ReadError::Unbound(0)));
        assert_eq!(graph.read_output_slot(1), Err(ReadError::SlotOutOfRange(1)));
        assert_eq!(graph.bind_output_slot(0, Key::from(50)), Err(SlotError::UnknownNode(Key::from(50))));
        assert_eq!(graph.bind_output_slot(1, gate), Err(SlotError::SlotOutOfRange(1)));

        graph.bind_output_slot(0, gate).unwrap();
        assert_eq!(graph.output_slot(0), Some(gate));
        assert_eq!(graph.read_outputs(), vec![Ok(false)]);

        graph.clear_output_slot(0).unwrap();
        assert_eq!(graph.read_output_slot(0).code(), -3);
    }

    #[test]
    fn add_component() {
        let mut graph = Graph::new(0, 0);
        let nor = graph.add_component(Component::Gate(GateFunction::Nor));
        let inverter = graph.add_component(Component::Inverter);

        assert!(matches!(
            graph.node(nor).unwrap().kind(),
            NodeKind::Gate { function: GateFunction::Nor, .. }
        ));
        assert_eq!(graph.node(inverter).unwrap().kind(), &NodeKind::Inverter { input: None, cached: None });
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn add_by_code() {
        let mut graph = Graph::new(2, 0);
        assert_eq!(graph.add_by_code(9), Key::NULL);
        assert_eq!(graph.node_count(), 2);

        let inverter = graph.add_by_code(2);
        assert!(matches!(graph.node(inverter).unwrap().kind(), NodeKind::Inverter { .. }));
        let xor = graph.add_by_code(5);
        assert!(matches!(
            graph.node(xor).unwrap().kind(),
            NodeKind::Gate { function: GateFunction::Xor, .. }
        ));
    }
}
