//! A combinational logic engine for hosts that build circuits at runtime.
//!
//! A [`Graph`] owns three kinds of node: input nodes, whose values are set from outside; gates, which reduce any
//! number of inputs with one of the functions in [`GateFunction`]; and inverters, which negate a single input. The
//! host creates gates and inverters, wires them together, toggles inputs and reads results, either from any node
//! directly or through output slots it has bound.
//!
//! Evaluation is pulled: asking for a node's value evaluates its inputs first and stores the result. A stored
//! result stays valid until something upstream changes, either an input value flipping or a wire being added or
//! removed, at which point it and everything downstream of it is cleared. Setting an input to the value it already
//! has clears nothing.
//!
//! Wiring that would close a loop is refused, so the graph is acyclic at all times.
//!
//! ```
//! use logic_graph::{GateFunction, Graph};
//!
//! // out = x0 AND NOT x1
//! let mut graph = Graph::new(2, 1);
//! let and = graph.add_gate(GateFunction::And);
//! let not = graph.add_inverter();
//!
//! graph.connect_slot(and, 0).unwrap();
//! graph.connect_slot(not, 1).unwrap();
//! graph.connect(and, not).unwrap();
//! graph.bind_output_slot(0, and).unwrap();
//!
//! graph.feed_inputs("10").unwrap();
//! assert_eq!(graph.read_output_slot(0), Ok(true));
//!
//! graph.set_input_value(1, true).unwrap();
//! assert_eq!(graph.read_output_slot(0), Ok(false));
//! ```
//!
//! # Status codes
//!
//! Hosts that cross a C boundary report outcomes as signed bytes. Every error type implements [`StatusCode`], as
//! do `Result<(), E>` and `Result<bool, E>` over those errors, so the byte for any outcome is one call away:
//!
//! ```
//! use logic_graph::{GateFunction, Graph, StatusCode};
//!
//! let mut graph = Graph::new(1, 1);
//! let or = graph.add_gate(GateFunction::Or);
//! let x0 = graph.input_slot_key(0).unwrap();
//!
//! assert_eq!(graph.connect(or, x0).code(), 0);
//! assert_eq!(graph.connect(or, x0).code(), 1);
//! assert_eq!(graph.connect(x0, or).code(), -1);
//! assert_eq!(graph.read_output_slot(0).code(), -3);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod error;
pub mod gate;
pub mod graph;
pub mod node;

pub use error::{ConnectError, DisconnectError, EvalError, ReadError, RemoveError, SlotError, StatusCode};
pub use gate::{Component, GateFunction};
pub use graph::{EvalStats, Graph};
pub use node::{Key, Node, NodeKind};
