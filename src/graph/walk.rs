use super::builder::CircuitGraph;
use crate::ids::GateId;
use std::collections::VecDeque;

/// Which way [`walk_gates_breadth_first`] follows the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward primary outputs, via each line's destination gates.
    TowardOutputs,
    /// Toward primary inputs, via each input's source gate.
    TowardInputs,
}

/// Breadth-first traversal over gates, in either direction, with an O(1)
/// id-indexed visited set. When `expand` is set the callback receives each
/// visited gate's own id once, but the *neighbor discovery* still walks
/// through to every gate reachable via that gate's own lines — `expand`
/// only changes what [`crate::transform`] and the fault-CNF builder do with
/// the visited gate, not which gates get visited, so it is plumbed through
/// to the callback rather than handled here.
pub fn walk_gates_breadth_first(
    graph: &CircuitGraph,
    start: impl IntoIterator<Item = GateId>,
    direction: Direction,
    mut visit: impl FnMut(GateId),
) {
    let mut visited = vec![false; graph.gate_id_end()];
    let mut queue: VecDeque<GateId> = VecDeque::new();
    for g in start {
        if !visited[g.0] {
            visited[g.0] = true;
            queue.push_back(g);
        }
    }
    while let Some(g) = queue.pop_front() {
        visit(g);
        let gate = graph.gate(g);
        match direction {
            Direction::TowardOutputs => {
                let out_line = graph.line(gate.output);
                for next in out_line.destination_gates() {
                    if !visited[next.0] {
                        visited[next.0] = true;
                        queue.push_back(next);
                    }
                }
            }
            Direction::TowardInputs => {
                for &input in &gate.inputs {
                    if let Some(next) = graph.line(input).source {
                        if !visited[next.0] {
                            visited[next.0] = true;
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GateType;

    #[test]
    fn walk_toward_outputs_visits_fanout_once() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_input("b");
        g.add_input("c");
        let g1 = g
            .add_gate(GateType::And, &["a".into(), "b".into()], "x")
            .unwrap();
        let g2 = g
            .add_gate(GateType::Or, &["x".into(), "c".into()], "y1")
            .unwrap();
        let g3 = g
            .add_gate(GateType::Nand, &["x".into(), "c".into()], "y2")
            .unwrap();

        let mut order = Vec::new();
        walk_gates_breadth_first(&g, vec![g1], Direction::TowardOutputs, |gid| {
            order.push(gid)
        });
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], g1);
        assert!(order.contains(&g2));
        assert!(order.contains(&g3));
    }
}
