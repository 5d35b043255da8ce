//! Fault-to-CNF construction (C6): for one fault, emits a CNF whose models
//! are exactly the primary-input patterns that detect it. This is the
//! "good circuit + sensitization (D-frontier)" formulation: every wire
//! gets a good-circuit literal `g(L)` and, lazily, a sensitization literal
//! `s(L)` meaning "the faulty and good values at L differ".

use super::manager::{Fault, FaultKind};
use crate::cnf::{Cnf, ICnf, Literal};
use crate::graph::{walk_gates_breadth_first, CircuitGraph, Direction, ExpandedGate, Gate, GateType};
use crate::ids::{GateId, LineId};
use crate::transform::{add_gate_clauses, make_cnf};
use indexmap::IndexSet;
use std::collections::{HashMap, VecDeque};

fn g(line: LineId) -> Literal {
    line.literal()
}

/// The transitive fanout of a fault site: everything a detecting pattern
/// has to propagate the fault through.
#[derive(Debug, Clone, Default)]
pub struct FanoutConeInfo {
    pub lines_inside: IndexSet<LineId>,
    pub boundary_lines: IndexSet<LineId>,
    pub primary_outputs_inside: IndexSet<LineId>,
}

/// Builds the fanout cone for `fault`: a forward walk from the fault site
/// (or from its branch's sink gate) out to every primary output it can
/// reach.
pub fn make_fanout_cone(graph: &CircuitGraph, fault: &Fault) -> FanoutConeInfo {
    let mut cone = FanoutConeInfo::default();
    cone.lines_inside.insert(fault.line);

    let mut seeds: Vec<GateId> = Vec::new();
    match fault.kind {
        FaultKind::Stem => {
            let line = graph.line(fault.line);
            if !line.destinations.is_empty() {
                seeds.extend(line.destination_gates());
            } else {
                debug_assert!(line.is_output);
                cone.primary_outputs_inside.insert(fault.line);
            }
        }
        FaultKind::PrimaryOutput => {
            cone.primary_outputs_inside.insert(fault.line);
        }
        FaultKind::Branch { gate, .. } => seeds.push(gate),
    }

    let mut visited: IndexSet<GateId> = IndexSet::new();
    let mut queue: VecDeque<GateId> = VecDeque::new();
    for &s in &seeds {
        if visited.insert(s) {
            queue.push_back(s);
        }
    }

    while let Some(gate_id) = queue.pop_front() {
        let gate = graph.gate(gate_id);
        for &input in &gate.inputs {
            let marks_faulted_branch_boundary = matches!(
                fault.kind,
                FaultKind::Branch { gate: fg, .. } if input == fault.line && fg != gate_id
            );
            if !cone.lines_inside.contains(&input) || marks_faulted_branch_boundary {
                cone.boundary_lines.insert(input);
            }
        }
        cone.lines_inside.insert(gate.output);
        cone.boundary_lines.shift_remove(&gate.output);
        if graph.line(gate.output).is_output {
            cone.primary_outputs_inside.insert(gate.output);
        }
        for next in graph.line(gate.output).destination_gates() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    cone
}

/// For a wide gate's expansion, which original input index (if any) the
/// `slot`-th input of the `i`-th expanded subgate (0-based, deepest-first)
/// corresponds to. `None` means the slot feeds from a generated
/// intermediate line rather than an original input.
fn original_input_index(arity: usize, expansion_len: usize, i: usize, slot: usize) -> Option<usize> {
    if expansion_len == 1 {
        return Some(slot);
    }
    let last = expansion_len - 1;
    if i == last {
        if slot == 0 {
            Some(0)
        } else {
            None
        }
    } else if slot == 0 {
        Some(arity - 2 - i)
    } else if i == 0 {
        Some(arity - 1)
    } else {
        None
    }
}

/// Accumulated mutable state for one `make_fault` call: the per-call
/// sensitization-variable pool and the fresh `spec` literal the faulted
/// branch's non-faulted duplicate occurrences get redirected to.
struct Context {
    sens: HashMap<LineId, Literal>,
    max_literal: Literal,
    spec: Literal,
}

impl Context {
    fn new(graph: &CircuitGraph) -> Self {
        let mut max_literal = graph.line_id_end() as Literal + 1;
        let spec = max_literal;
        max_literal += 1;
        Self {
            sens: HashMap::new(),
            max_literal,
            spec,
        }
    }

    fn s(&mut self, line: LineId) -> Literal {
        if let Some(&lit) = self.sens.get(&line) {
            return lit;
        }
        let lit = self.max_literal;
        self.max_literal += 1;
        self.sens.insert(line, lit);
        lit
    }
}

/// Builds per-fault CNFs, switching between a cone-only encoding and a
/// cached whole-circuit encoding depending on how much of the circuit the
/// fault's cone covers.
pub struct FaultCnfMaker {
    threshold_ratio: f64,
    cached_whole_cnf: Option<Cnf>,
}

impl FaultCnfMaker {
    pub fn new(threshold_ratio: f64) -> Self {
        Self {
            threshold_ratio,
            cached_whole_cnf: None,
        }
    }

    pub fn make_fault(&mut self, graph: &CircuitGraph, fault: &Fault, sink: &mut impl ICnf) {
        let cone = make_fanout_cone(graph, fault);
        let mut ctx = Context::new(graph);

        self.add_good_circuit_clauses(graph, &cone, sink);
        self.add_sensitization(graph, &cone, fault, &mut ctx, sink);
        Self::add_fault_activation(fault, &mut ctx, sink);
        Self::add_boundary_scan(graph, &cone, fault, &mut ctx, sink);
        Self::add_fault_presentation(&cone, &mut ctx, sink);
    }

    fn add_good_circuit_clauses(&mut self, graph: &CircuitGraph, cone: &FanoutConeInfo, sink: &mut impl ICnf) {
        let threshold = graph.outputs().len() as f64 * self.threshold_ratio;
        if (cone.primary_outputs_inside.len() as f64) < threshold {
            let seeds: Vec<GateId> = cone
                .primary_outputs_inside
                .iter()
                .filter_map(|&line| graph.line(line).source)
                .collect();
            walk_gates_breadth_first(graph, seeds, Direction::TowardInputs, |gate_id| {
                for eg in &graph.gate(gate_id).expansion {
                    add_gate_clauses(eg, sink);
                }
            });
        } else {
            let cnf = self
                .cached_whole_cnf
                .get_or_insert_with(|| make_cnf(graph, true));
            sink.add_clauses(cnf.clauses());
        }
    }

    fn add_sensitization(
        &self,
        graph: &CircuitGraph,
        cone: &FanoutConeInfo,
        fault: &Fault,
        ctx: &mut Context,
        sink: &mut impl ICnf,
    ) {
        let mut processed: IndexSet<GateId> = IndexSet::new();

        if let FaultKind::Branch { gate, .. } = fault.kind {
            if processed.insert(gate) {
                Self::add_gate_sensitization(graph.gate(gate), fault, ctx, sink);
            }
        }

        for &line in &cone.lines_inside {
            if !matches!(fault.kind, FaultKind::Stem | FaultKind::PrimaryOutput) && line == fault.line {
                continue;
            }
            for &(gate_id, _idx) in &graph.line(line).destinations {
                if processed.insert(gate_id) {
                    Self::add_gate_sensitization(graph.gate(gate_id), fault, ctx, sink);
                }
            }
        }
    }

    fn sensitization_slot_literal(
        gate: &Gate,
        eg_index: usize,
        slot: usize,
        line: LineId,
        fault: &Fault,
        ctx: &mut Context,
    ) -> Literal {
        if let FaultKind::Branch { gate: fg, input_idx } = fault.kind {
            if fg == gate.id && line == fault.line {
                let orig = original_input_index(gate.arity(), gate.expansion.len(), eg_index, slot);
                if orig != Some(input_idx) {
                    return ctx.spec;
                }
            }
        }
        ctx.s(line)
    }

    fn add_gate_sensitization(gate: &Gate, fault: &Fault, ctx: &mut Context, sink: &mut impl ICnf) {
        for (i, eg) in gate.expansion.iter().enumerate() {
            Self::add_expanded_gate_sensitization(gate, i, eg, fault, ctx, sink);
        }
    }

    fn add_expanded_gate_sensitization(
        gate: &Gate,
        eg_index: usize,
        eg: &ExpandedGate,
        fault: &Fault,
        ctx: &mut Context,
        sink: &mut impl ICnf,
    ) {
        let z = g(eg.output);
        let z_s = ctx.s(eg.output);

        match eg.ty {
            GateType::Not | GateType::Buff => {
                let x_s = Self::sensitization_slot_literal(gate, eg_index, 0, eg.inputs[0], fault, ctx);
                sink.add_clause2(-x_s, z_s);
                sink.add_clause2(x_s, -z_s);
            }
            GateType::Xor | GateType::Xnor => {
                let x_s = Self::sensitization_slot_literal(gate, eg_index, 0, eg.inputs[0], fault, ctx);
                let y_s = Self::sensitization_slot_literal(gate, eg_index, 1, eg.inputs[1], fault, ctx);
                sink.add_clause3(-x_s, -y_s, -z_s);
                sink.add_clause3(x_s, y_s, -z_s);
                sink.add_clause3(x_s, -y_s, z_s);
                sink.add_clause3(-x_s, y_s, z_s);
            }
            GateType::And | GateType::Nand => {
                let x = g(eg.inputs[0]);
                let y = g(eg.inputs[1]);
                let x_s = Self::sensitization_slot_literal(gate, eg_index, 0, eg.inputs[0], fault, ctx);
                let y_s = Self::sensitization_slot_literal(gate, eg_index, 1, eg.inputs[1], fault, ctx);
                sink.add_clause3(x_s, y_s, -z_s);
                sink.add_clause4(-x_s, -y, y_s, z_s);
                sink.add_clause4(-x, x_s, -y_s, z_s);
                sink.add_clause5(x, -x_s, y, -y_s, z_s);
                sink.add_clause4(-x, -x_s, y, -z_s);
                sink.add_clause3(x, x_s, -z_s);
                sink.add_clause4(x, -y, -y_s, -z_s);
                sink.add_clause4(-x, -y, -y_s, z_s);
                sink.add_clause3(y, y_s, -z_s);
            }
            GateType::Or | GateType::Nor => {
                let x = g(eg.inputs[0]);
                let y = g(eg.inputs[1]);
                let x_s = Self::sensitization_slot_literal(gate, eg_index, 0, eg.inputs[0], fault, ctx);
                let y_s = Self::sensitization_slot_literal(gate, eg_index, 1, eg.inputs[1], fault, ctx);
                sink.add_clause3(x_s, y_s, -z_s);
                sink.add_clause4(-x_s, y, y_s, z_s);
                sink.add_clause4(x, x_s, -y_s, z_s);
                sink.add_clause5(-x, -x_s, -y, -y_s, z_s);
                sink.add_clause4(x, -x_s, -y, -z_s);
                sink.add_clause3(-x, x_s, -z_s);
                sink.add_clause4(x, y, -y_s, z_s);
                sink.add_clause4(-x, y, -y_s, -z_s);
                sink.add_clause3(-y, y_s, -z_s);
            }
        }
    }

    fn add_fault_activation(fault: &Fault, ctx: &mut Context, sink: &mut impl ICnf) {
        let s_site = ctx.s(fault.line);
        sink.add_clause1(s_site);
        if fault.stuck_at == 0 {
            sink.add_clause1(g(fault.line));
        } else {
            sink.add_clause1(-g(fault.line));
        }
    }

    fn add_boundary_scan(
        graph: &CircuitGraph,
        cone: &FanoutConeInfo,
        fault: &Fault,
        ctx: &mut Context,
        sink: &mut impl ICnf,
    ) {
        for &boundary in &cone.boundary_lines {
            if boundary == fault.line {
                sink.add_clause1(-ctx.spec);
            } else {
                let s_b = ctx.s(boundary);
                sink.add_clause1(-s_b);
            }
        }

        if let FaultKind::Branch { gate, .. } = fault.kind {
            let duplicate_input_sink = graph
                .gate(gate)
                .inputs
                .iter()
                .filter(|&&l| l == fault.line)
                .count()
                > 1;
            if duplicate_input_sink {
                sink.add_clause1(-ctx.spec);
            }
        }
    }

    fn add_fault_presentation(cone: &FanoutConeInfo, ctx: &mut Context, sink: &mut impl ICnf) {
        let clause: Vec<Literal> = cone.primary_outputs_inside.iter().map(|&l| ctx.s(l)).collect();
        sink.add_clause(&clause);
    }
}
