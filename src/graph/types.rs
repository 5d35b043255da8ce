use crate::ids::{GateId, LineId};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// The eight gate primitives the netlist format can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    And,
    Nand,
    Not,
    Or,
    Nor,
    Xor,
    Xnor,
    Buff,
}
use GateType::*;

impl GateType {
    pub fn min_arity(self) -> usize {
        match self {
            Not | Buff => 1,
            Xor | Xnor => 2,
            And | Nand | Or | Nor => 2,
        }
    }

    pub fn max_arity(self) -> Option<usize> {
        match self {
            Not | Buff => Some(1),
            Xor | Xnor => Some(2),
            And | Nand | Or | Nor => None,
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Not | Buff)
    }

    pub fn is_and_family(self) -> bool {
        matches!(self, And | Nand)
    }

    pub fn is_or_family(self) -> bool {
        matches!(self, Or | Nor)
    }

    pub fn is_xor_family(self) -> bool {
        matches!(self, Xor | Xnor)
    }

    /// True for NOT/BUFF: a single-input line whose destination is one of
    /// these never gets its own branch fault, it is absorbed into the stem.
    pub fn is_transparent(self) -> bool {
        matches!(self, Not | Buff)
    }

    /// The inner binary gate type used when expanding a wide AND/NAND/OR/NOR.
    pub fn inner_type_for_expansion(self) -> GateType {
        match self {
            And | Nand => And,
            Or | Nor => Or,
            _ => unreachable!("only AND/NAND/OR/NOR family gates expand"),
        }
    }

    /// The stuck-at value that controls this gate's output (forces it
    /// regardless of the other inputs). `None` for XOR/XNOR, which has no
    /// controlling value.
    pub fn controlling_stuck_at(self) -> Option<u8> {
        match self {
            And | Nand => Some(1),
            Or | Nor => Some(0),
            _ => None,
        }
    }
}

impl Display for GateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            And => "AND",
            Nand => "NAND",
            Not => "NOT",
            Or => "OR",
            Nor => "NOR",
            Xor => "XOR",
            Xnor => "XNOR",
            Buff => "BUFF",
        };
        write!(f, "{}", s)
    }
}

/// A named wire. Non-input lines have exactly one `source` gate; fanout is
/// recorded as an ordered list of `(gate, input_index)` connections so that
/// a gate consuming the same line on two pins shows up twice.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub source: Option<GateId>,
    pub destinations: Vec<(GateId, usize)>,
    pub is_output: bool,
    pub is_generated: bool,
}

impl Line {
    pub fn destination_gates(&self) -> indexmap::IndexSet<GateId> {
        self.destinations.iter().map(|&(g, _)| g).collect()
    }

    pub fn has_single_destination(&self) -> bool {
        self.destinations.len() == 1
    }
}

/// A single binary (or unary) operator inside a gate's expansion. Expanded
/// gates have no identity of their own beyond their position in
/// [`Gate::expansion`] — they are never enumerated as faults and never
/// walked by the fanout-cone BFS, only by the Tseitin transformer and the
/// sensitization-clause builder.
#[derive(Debug, Clone)]
pub struct ExpandedGate {
    pub ty: GateType,
    pub inputs: SmallVec<[LineId; 2]>,
    pub output: LineId,
}

/// A gate as declared in the netlist. `inputs` always holds the full,
/// original arity; `expansion` holds the deterministic binary-tree
/// decomposition used for CNF emission (a one-element list mirroring the
/// gate itself when it doesn't need expanding).
#[derive(Debug, Clone)]
pub struct Gate {
    pub id: GateId,
    pub ty: GateType,
    pub inputs: Vec<LineId>,
    pub output: LineId,
    pub expansion: Vec<ExpandedGate>,
}

impl Gate {
    pub fn is_expanded(&self) -> bool {
        self.expansion.len() > 1
    }

    pub fn arity(&self) -> usize {
        self.inputs.len()
    }
}
