//! Error types for wiring, removal and evaluation.
//!
//! Hosts drive the engine through small signed status bytes, so every error here knows its own status code. The
//! codes are local to an operation family: `-2` means something different for a disconnect than for an evaluation.

use thiserror::Error;

use crate::node::Key;

/// Conversion to the status byte reported across the host boundary.
pub trait StatusCode {
    /// The status byte for this outcome.
    fn code(&self) -> i8;
}

/// Errors from connecting one node as an input of another.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The source is already an input of the target.
    #[error("{0} is already an input")]
    AlreadyConnected(Key),

    /// The source is downstream of the target, so the new wire would close a loop.
    #[error("connecting {0} would create a cycle")]
    WouldCycle(Key),

    /// The target is an inverter that already has its input.
    #[error("inverter {0} already has an input")]
    InverterOccupied(Key),

    /// The target is an input node; input nodes take no wiring.
    #[error("{0} is an input node and cannot accept inputs")]
    InputTarget(Key),

    /// A key does not name a node in this graph.
    #[error("no node with key {0}")]
    UnknownNode(Key),

    /// An input slot index past the end of the declared inputs.
    #[error("input slot {0} does not exist")]
    SlotOutOfRange(usize),
}

impl StatusCode for ConnectError {
    fn code(&self) -> i8 {
        match self {
            Self::AlreadyConnected(_) => 1,
            Self::WouldCycle(_) => 2,
            Self::InverterOccupied(_) => 3,
            Self::InputTarget(_) => -1,
            Self::UnknownNode(_) => -2,
            Self::SlotOutOfRange(_) => -3,
        }
    }
}

/// Errors from removing a wire.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectError {
    /// The target has no inputs at all.
    #[error("{0} has no inputs")]
    NoInputs(Key),

    /// The key is not one of the target's inputs.
    #[error("{0} is not an input")]
    NotAnInput(Key),

    /// The upstream node does not list the target as a dependent.
    #[error("{0} does not list the target as a dependent")]
    MissingBackLink(Key),

    /// The target is an input node; input nodes have no inputs to remove.
    #[error("{0} is an input node and has no inputs to remove")]
    InputTarget(Key),

    /// A key does not name a node in this graph.
    #[error("no node with key {0}")]
    UnknownNode(Key),

    /// An input slot index past the end of the declared inputs.
    #[error("input slot {0} does not exist")]
    SlotOutOfRange(usize),
}

impl DisconnectError {
    /// True when the error only says there is no wire in the direction that was tried.
    #[must_use]
    pub const fn is_absent_wire(&self) -> bool {
        matches!(self, Self::NoInputs(_) | Self::NotAnInput(_) | Self::InputTarget(_))
    }
}

impl StatusCode for DisconnectError {
    fn code(&self) -> i8 {
        match self {
            Self::NoInputs(_) => -1,
            Self::NotAnInput(_) => -2,
            Self::MissingBackLink(_) => -3,
            Self::InputTarget(_) => -4,
            Self::UnknownNode(_) => -5,
            Self::SlotOutOfRange(_) => -6,
        }
    }
}

/// Errors from removing a node.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RemoveError {
    /// Input nodes live as long as the graph.
    #[error("{0} is an input node and cannot be removed")]
    Permanent(Key),

    /// A key does not name a node in this graph.
    #[error("no node with key {0}")]
    UnknownNode(Key),

    /// An input of the node does not list it as a dependent.
    #[error("input {1} of {0} does not list it as a dependent")]
    MissingDependent(Key, Key),

    /// A dependent of the node does not list it as an input.
    #[error("dependent {1} of {0} does not list it as an input")]
    MissingInput(Key, Key),
}

impl StatusCode for RemoveError {
    fn code(&self) -> i8 {
        match self {
            Self::Permanent(_) | Self::UnknownNode(_) => -3,
            Self::MissingDependent(..) => -2,
            Self::MissingInput(..) => -1,
        }
    }
}

/// Errors from evaluating a node.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// The node has nothing to compute from.
    #[error("{0} has no inputs")]
    NoInputs(Key),

    /// Some node upstream failed to evaluate.
    #[error("an upstream node returned an error")]
    UpstreamFailed,

    /// A key does not name a node in this graph.
    #[error("no node with key {0}")]
    UnknownNode(Key),
}

impl StatusCode for EvalError {
    fn code(&self) -> i8 {
        match self {
            Self::NoInputs(_) => -1,
            Self::UpstreamFailed => -2,
            Self::UnknownNode(_) => -4,
        }
    }
}

/// Errors from reading an output slot.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Nothing is bound to the slot.
    #[error("output slot {0} is not bound")]
    Unbound(usize),

    /// An output slot index past the end of the declared outputs.
    #[error("output slot {0} does not exist")]
    SlotOutOfRange(usize),

    /// The bound node failed to evaluate.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl StatusCode for ReadError {
    fn code(&self) -> i8 {
        match self {
            Self::Unbound(_) | Self::SlotOutOfRange(_) => -3,
            Self::Eval(error) => error.code(),
        }
    }
}

/// Errors from slot bookkeeping that has no status byte of its own.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// A slot index past the end of the declared slots.
    #[error("slot {0} does not exist")]
    SlotOutOfRange(usize),

    /// A key does not name a node in this graph.
    #[error("no node with key {0}")]
    UnknownNode(Key),

    /// An input pattern has more characters than there are input slots.
    #[error("pattern of length {length} does not fit {slots} input slots")]
    PatternTooLong {
        /// Characters in the pattern.
        length: usize,
        /// Input slots in the graph.
        slots: usize,
    },
}

impl<E: StatusCode> StatusCode for Result<(), E> {
    fn code(&self) -> i8 {
        match self {
            Ok(()) => 0,
            Err(error) => error.code(),
        }
    }
}

impl<E: StatusCode> StatusCode for Result<bool, E> {
    fn code(&self) -> i8 {
        match self {
            Ok(value) => i8::from(*value),
            Err(error) => error.code(),
        }
    }
}
