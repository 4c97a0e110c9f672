//! Gate functions and the component kinds a host can create.

use std::fmt;

/// A boolean reduction over the values feeding a gate.
///
/// Gate functions only look at how many inputs are true and how many are false, so the order inputs were wired in
/// never matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateFunction {
    /// True when at least one input is true and none are false.
    And,
    /// True when at least one input is true.
    Or,
    /// True when at least one input is false.
    Nand,
    /// True when no input is true.
    Nor,
    /// True when exactly one input is true.
    ///
    /// This is not parity: with three true inputs the result is false.
    Xor,
}

impl GateFunction {
    /// Every gate function, in boundary code order.
    pub const ALL: [Self; 5] = [Self::And, Self::Or, Self::Nand, Self::Nor, Self::Xor];

    /// Reduce a tally of true and false inputs to the gate's output.
    #[must_use]
    pub const fn apply(self, trues: usize, falses: usize) -> bool {
        match self {
            Self::And => trues > 0 && falses == 0,
            Self::Or => trues > 0,
            Self::Nand => falses > 0,
            Self::Nor => trues == 0,
            Self::Xor => trues == 1,
        }
    }
}

impl fmt::Display for GateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
        };
        f.write_str(name)
    }
}

/// Something a host can place in a graph.
///
/// Hosts talk in integer kind codes; the inverter sits between the gates at code 2 because hosts expose it as the
/// "NOT gate".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// A gate reducing any number of inputs.
    Gate(GateFunction),
    /// A single-input inverter.
    Inverter,
}

impl Component {
    /// Decode a host kind code: `0=AND, 1=OR, 2=NOT, 3=NAND, 4=NOR, 5=XOR`.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Gate(GateFunction::And)),
            1 => Some(Self::Gate(GateFunction::Or)),
            2 => Some(Self::Inverter),
            3 => Some(Self::Gate(GateFunction::Nand)),
            4 => Some(Self::Gate(GateFunction::Nor)),
            5 => Some(Self::Gate(GateFunction::Xor)),
            _ => None,
        }
    }

    /// The host kind code for this component.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Gate(GateFunction::And) => 0,
            Self::Gate(GateFunction::Or) => 1,
            Self::Inverter => 2,
            Self::Gate(GateFunction::Nand) => 3,
            Self::Gate(GateFunction::Nor) => 4,
            Self::Gate(GateFunction::Xor) => 5,
        }
    }
}

impl From<GateFunction> for Component {
    fn from(function: GateFunction) -> Self {
        Self::Gate(function)
    }
}
