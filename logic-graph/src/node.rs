//! Node keys and the per-node state: input values, input lists and cached results.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ConnectError, DisconnectError};
use crate::gate::GateFunction;

/// Identifies a node within one graph.
///
/// Keys are handed out from a counter starting at one and are never reused, so [`Key::NULL`] never names a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u32);

impl Key {
    /// The key no node ever has.
    pub const NULL: Self = Self(0);

    /// Returns true for [`Key::NULL`].
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Key {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Key> for u32 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What a node is, plus the state that goes with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A value set from outside the graph.
    Input {
        /// Position among the graph's input slots.
        slot: usize,
        /// Current value.
        value: bool,
    },
    /// A gate reducing any number of inputs.
    Gate {
        /// How the inputs are reduced.
        function: GateFunction,
        /// Keys of the upstream nodes.
        inputs: BTreeSet<Key>,
        /// Last computed output, if still valid.
        cached: Option<bool>,
    },
    /// The negation of at most one input.
    Inverter {
        /// Key of the upstream node.
        input: Option<Key>,
        /// Last computed output, if still valid.
        cached: Option<bool>,
    },
}

/// A node owned by a [`Graph`](crate::Graph).
///
/// A node only knows the keys of its inputs. Dependents are kept as edges in the owning graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    key: Key,
    kind: NodeKind,
}

impl Node {
    pub(crate) const fn input(key: Key, slot: usize) -> Self {
        Self { key, kind: NodeKind::Input { slot, value: false } }
    }

    pub(crate) const fn gate(key: Key, function: GateFunction) -> Self {
        Self {
            key,
            kind: NodeKind::Gate { function, inputs: BTreeSet::new(), cached: None },
        }
    }

    pub(crate) const fn inverter(key: Key) -> Self {
        Self { key, kind: NodeKind::Inverter { input: None, cached: None } }
    }

    /// This node's key.
    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// This node's variant and state.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns true if this node is an input node.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input { .. })
    }

    /// Keys of this node's inputs, in key order.
    #[must_use]
    pub fn inputs(&self) -> Vec<Key> {
        match &self.kind {
            NodeKind::Input { .. } => Vec::new(),
            NodeKind::Gate { inputs, .. } => inputs.iter().copied().collect(),
            NodeKind::Inverter { input, .. } => input.iter().copied().collect(),
        }
    }

    /// Returns true if `key` is one of this node's inputs.
    #[must_use]
    pub fn has_input(&self, key: Key) -> bool {
        match &self.kind {
            NodeKind::Input { .. } => false,
            NodeKind::Gate { inputs, .. } => inputs.contains(&key),
            NodeKind::Inverter { input, .. } => *input == Some(key),
        }
    }

    /// The stored result of a gate or inverter. Input nodes have nothing cached.
    #[must_use]
    pub fn cached(&self) -> Option<bool> {
        match &self.kind {
            NodeKind::Input { .. } => None,
            NodeKind::Gate { cached, .. } | NodeKind::Inverter { cached, .. } => *cached,
        }
    }

    /// Check whether `source` may become an input, without touching anything.
    pub(crate) fn accepts(&self, source: Key) -> Result<(), ConnectError> {
        match &self.kind {
            NodeKind::Input { .. } => Err(ConnectError::InputTarget(self.key)),
            NodeKind::Gate { inputs, .. } if inputs.contains(&source) => Err(ConnectError::AlreadyConnected(source)),
            NodeKind::Inverter { input: Some(_), .. } => Err(ConnectError::InverterOccupied(self.key)),
            NodeKind::Gate { .. } | NodeKind::Inverter { input: None, .. } => Ok(()),
        }
    }

    /// Check whether `source` may be removed as an input, without touching anything.
    pub(crate) fn releases(&self, source: Key) -> Result<(), DisconnectError> {
        match &self.kind {
            NodeKind::Input { .. } => Err(DisconnectError::InputTarget(self.key)),
            NodeKind::Gate { inputs, .. } if inputs.is_empty() => Err(DisconnectError::NoInputs(self.key)),
            NodeKind::Inverter { input: None, .. } => Err(DisconnectError::NoInputs(self.key)),
            _ if self.has_input(source) => Ok(()),
            _ => Err(DisconnectError::NotAnInput(source)),
        }
    }

    /// Record `source` as an input. Callers check [`Node::accepts`] first.
    pub(crate) fn attach(&mut self, source: Key) {
        match &mut self.kind {
            NodeKind::Input { .. } => {},
            NodeKind::Gate { inputs, .. } => {
                inputs.insert(source);
            },
            NodeKind::Inverter { input, .. } => *input = Some(source),
        }
    }

    /// Forget `source` as an input. Returns false if it was not one.
    pub(crate) fn detach(&mut self, source: Key) -> bool {
        match &mut self.kind {
            NodeKind::Input { .. } => false,
            NodeKind::Gate { inputs, .. } => inputs.remove(&source),
            NodeKind::Inverter { input, .. } => {
                if *input == Some(source) {
                    *input = None;
                    true
                } else {
                    false
                }
            },
        }
    }

    /// Set an input node's value. Returns true if the value changed.
    pub(crate) fn set_value(&mut self, new: bool) -> bool {
        match &mut self.kind {
            NodeKind::Input { value, .. } if *value != new => {
                *value = new;
                true
            },
            _ => false,
        }
    }

    pub(crate) fn store(&mut self, value: bool) {
        match &mut self.kind {
            NodeKind::Input { .. } => {},
            NodeKind::Gate { cached, .. } | NodeKind::Inverter { cached, .. } => *cached = Some(value),
        }
    }

    /// Drop the cached result. Returns true if there was one.
    pub(crate) fn invalidate(&mut self) -> bool {
        match &mut self.kind {
            NodeKind::Input { .. } => false,
            NodeKind::Gate { cached, .. } | NodeKind::Inverter { cached, .. } => cached.take().is_some(),
        }
    }
}
