use crate::graph::{CircuitGraph, GateType};
use crate::ids::{GateId, LineId};

/// What a [`Fault`] actually pins down: the whole wire (a stem, seen by
/// every consumer), one specific consumer connection (a branch), or the
/// primary-output pin of a line that also fans out internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    Stem,
    Branch { gate: GateId, input_idx: usize },
    PrimaryOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fault {
    pub line: LineId,
    pub stuck_at: u8,
    pub kind: FaultKind,
}

impl Fault {
    pub fn new(line: LineId, stuck_at: u8, kind: FaultKind) -> Self {
        debug_assert!(stuck_at == 0 || stuck_at == 1);
        Self {
            line,
            stuck_at,
            kind,
        }
    }

    /// Human-readable report line, e.g. `22/O S-A-1` or `g/I1 S-A-0`.
    pub fn report(&self, graph: &CircuitGraph) -> String {
        match self.kind {
            FaultKind::Stem | FaultKind::PrimaryOutput => {
                format!("{}/O S-A-{}", graph.line(self.line).name, self.stuck_at)
            }
            FaultKind::Branch { gate, input_idx } => {
                let sink_output = graph.gate(gate).output;
                format!(
                    "{}/I{} S-A-{}",
                    graph.line(sink_output).name,
                    input_idx + 1,
                    self.stuck_at
                )
            }
        }
    }
}

/// Enumerates the collapsed stuck-at fault list for a circuit: one or two
/// faults per line depending on whether it is a stem with fanout, a plain
/// primary output, or a single-destination line whose branch fault is
/// equivalent to the stem (absorbed into it).
pub struct FaultManager;

impl FaultManager {
    pub fn enumerate(graph: &CircuitGraph) -> Vec<Fault> {
        let mut faults = Vec::new();
        for line in graph.lines() {
            let has_fanout_branches =
                (line.is_output && !line.destinations.is_empty()) || line.destinations.len() > 1;

            if has_fanout_branches || line.is_output {
                faults.push(Fault::new(line.id, 0, FaultKind::Stem));
                faults.push(Fault::new(line.id, 1, FaultKind::Stem));

                if line.is_output && has_fanout_branches && !line.destinations.is_empty() {
                    faults.push(Fault::new(line.id, 0, FaultKind::PrimaryOutput));
                    faults.push(Fault::new(line.id, 1, FaultKind::PrimaryOutput));
                }

                for &(gate_id, input_idx) in &line.destinations {
                    Self::add_gate_input_fault(graph, &mut faults, line.id, gate_id, input_idx);
                }
            } else if let Some(&(gate_id, input_idx)) = line.destinations.first() {
                let gate = graph.gate(gate_id);
                if gate.ty.is_transparent() {
                    continue;
                }
                let kind = if line.source.is_some() {
                    FaultKind::Stem
                } else {
                    FaultKind::Branch {
                        gate: gate_id,
                        input_idx,
                    }
                };
                match gate.ty.controlling_stuck_at() {
                    Some(sa) => faults.push(Fault::new(line.id, sa, kind)),
                    None => {
                        faults.push(Fault::new(line.id, 0, kind));
                        faults.push(Fault::new(line.id, 1, kind));
                    }
                }
            }
            // A line with no destinations and not an output is a dangling,
            // malformed circuit; `CircuitGraph::validate` rejects those
            // before enumeration ever sees one.
        }
        faults
    }

    fn add_gate_input_fault(
        graph: &CircuitGraph,
        faults: &mut Vec<Fault>,
        line: LineId,
        gate_id: GateId,
        input_idx: usize,
    ) {
        let gate = graph.gate(gate_id);
        if gate.ty.is_transparent() {
            return;
        }
        let kind = FaultKind::Branch {
            gate: gate_id,
            input_idx,
        };
        match gate.ty.controlling_stuck_at() {
            Some(sa) => faults.push(Fault::new(line, sa, kind)),
            None => {
                faults.push(Fault::new(line, 0, kind));
                faults.push(Fault::new(line, 1, kind));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CircuitGraph;

    fn build_c17() -> CircuitGraph {
        let mut g = CircuitGraph::new();
        for n in ["1", "2", "3", "6", "7"] {
            g.add_input(n);
        }
        g.add_output("22");
        g.add_output("23");
        g.add_gate(GateType::Nand, &["1".into(), "3".into()], "10")
            .unwrap();
        g.add_gate(GateType::Nand, &["3".into(), "6".into()], "11")
            .unwrap();
        g.add_gate(GateType::Nand, &["2".into(), "11".into()], "16")
            .unwrap();
        g.add_gate(GateType::Nand, &["11".into(), "7".into()], "19")
            .unwrap();
        g.add_gate(GateType::Nand, &["10".into(), "16".into()], "22")
            .unwrap();
        g.add_gate(GateType::Nand, &["16".into(), "19".into()], "23")
            .unwrap();
        g
    }

    #[test]
    fn c17_has_22_collapsed_faults() {
        let g = build_c17();
        let faults = FaultManager::enumerate(&g);
        assert_eq!(faults.len(), 22);
    }

    #[test]
    fn single_xor_has_six_faults() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_input("b");
        g.add_output("o");
        g.add_gate(GateType::Xor, &["a".into(), "b".into()], "o")
            .unwrap();
        let faults = FaultManager::enumerate(&g);
        assert_eq!(faults.len(), 6);
    }

    #[test]
    fn buff_chain_yields_two_faults() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_output("c");
        g.add_gate(GateType::Buff, &["a".into()], "b").unwrap();
        g.add_gate(GateType::Buff, &["b".into()], "c").unwrap();
        let faults = FaultManager::enumerate(&g);
        assert_eq!(faults.len(), 2);
    }
}
