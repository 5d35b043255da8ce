use super::types::{ExpandedGate, Gate, GateType, Line};
use crate::error::CircuitError;
use crate::ids::{GateId, IdMaker, LineId};
use smallvec::smallvec;
use std::collections::HashMap;

/// Owns every line and gate in a netlist. Insertion never invalidates a
/// previously returned [`LineId`]/[`GateId`] — both are plain indices into
/// append-only vectors, the Rust reading of the "stable address" guarantee
/// the graph needs to support incremental gate expansion.
#[derive(Debug, Default)]
pub struct CircuitGraph {
    ids: IdMaker,
    lines: Vec<Line>,
    gates: Vec<Gate>,
    name_to_line: HashMap<String, LineId>,
    inputs: Vec<LineId>,
    outputs: Vec<LineId>,
}

impl CircuitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }

    fn line_mut(&mut self, id: LineId) -> &mut Line {
        &mut self.lines[id.0]
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.0]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn inputs(&self) -> &[LineId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[LineId] {
        &self.outputs
    }

    pub fn line_id_end(&self) -> usize {
        self.ids.line_id_end()
    }

    pub fn gate_id_end(&self) -> usize {
        self.ids.gate_id_end()
    }

    pub fn get_line_named(&self, name: &str) -> Option<LineId> {
        self.name_to_line.get(name).copied()
    }

    fn ensure_line(&mut self, name: &str) -> LineId {
        if let Some(&id) = self.name_to_line.get(name) {
            return id;
        }
        let id = self.ids.next_line();
        self.lines.push(Line {
            id,
            name: name.to_string(),
            source: None,
            destinations: Vec::new(),
            is_output: false,
            is_generated: false,
        });
        self.name_to_line.insert(name.to_string(), id);
        id
    }

    fn new_generated_line(&mut self, name: String) -> LineId {
        let id = self.ids.next_line();
        self.lines.push(Line {
            id,
            name,
            source: None,
            destinations: Vec::new(),
            is_output: false,
            is_generated: true,
        });
        id
    }

    pub fn add_input(&mut self, name: &str) -> LineId {
        let id = self.ensure_line(name);
        if !self.inputs.contains(&id) {
            self.inputs.push(id);
        }
        id
    }

    pub fn add_output(&mut self, name: &str) -> LineId {
        let id = self.ensure_line(name);
        if !self.line(id).is_output {
            self.line_mut(id).is_output = true;
            self.outputs.push(id);
        }
        id
    }

    /// Declares a gate, creating any input/output lines that don't already
    /// exist. Wires up `destinations` on every input line and builds the
    /// deterministic binary-tree expansion for wide AND/NAND/OR/NOR gates.
    pub fn add_gate(
        &mut self,
        ty: GateType,
        input_names: &[String],
        output_name: &str,
    ) -> Result<GateId, CircuitError> {
        let min = ty.min_arity();
        if input_names.len() < min || ty.max_arity().map_or(false, |max| input_names.len() > max)
        {
            return Err(CircuitError::Arity {
                ty,
                min,
                got: input_names.len(),
            });
        }

        let input_ids: Vec<LineId> = input_names.iter().map(|n| self.ensure_line(n)).collect();
        let output_id = self.ensure_line(output_name);
        if self.line(output_id).source.is_some() {
            return Err(CircuitError::MultipleDrivers {
                name: output_name.to_string(),
            });
        }

        let gate_id = self.ids.next_gate();
        let expansion = self.build_expansion(ty, &input_ids, output_id, output_name);

        self.gates.push(Gate {
            id: gate_id,
            ty,
            inputs: input_ids.clone(),
            output: output_id,
            expansion,
        });
        self.line_mut(output_id).source = Some(gate_id);

        for (idx, input_id) in input_ids.iter().enumerate() {
            self.line_mut(*input_id).destinations.push((gate_id, idx));
        }

        Ok(gate_id)
    }

    /// Builds the right-leaning binary decomposition described for wide
    /// AND/NAND/OR/NOR gates. Generated lines are named `<out>_E_<k>`, `k`
    /// counted from the tail of the input list; the list comes back
    /// ordered deepest-subgate-first, ending with a binary view of the
    /// gate itself.
    fn build_expansion(
        &mut self,
        ty: GateType,
        inputs: &[LineId],
        output: LineId,
        output_name: &str,
    ) -> Vec<ExpandedGate> {
        let n = inputs.len();
        if ty.is_unary() || ty.is_xor_family() || n <= 2 {
            return vec![ExpandedGate {
                ty,
                inputs: inputs.iter().copied().collect(),
                output,
            }];
        }

        let inner_ty = ty.inner_type_for_expansion();
        let mut expansion = Vec::with_capacity(n - 1);
        let mut acc = inputs[n - 1];
        let mut gen_index = 1usize;
        for j in (1..n - 1).rev() {
            let name = format!("{}_E_{}", output_name, gen_index);
            let generated = self.new_generated_line(name);
            expansion.push(ExpandedGate {
                ty: inner_ty,
                inputs: smallvec![inputs[j], acc],
                output: generated,
            });
            acc = generated;
            gen_index += 1;
        }
        expansion.push(ExpandedGate {
            ty,
            inputs: smallvec![inputs[0], acc],
            output,
        });
        expansion
    }

    pub fn gate_type_histogram(&self) -> HashMap<GateType, usize> {
        let mut histogram = HashMap::new();
        for gate in &self.gates {
            *histogram.entry(gate.ty).or_insert(0) += 1;
        }
        histogram
    }

    /// Rejects a malformed circuit: every declared line must either be a
    /// primary output or feed at least one gate input. Called once after a
    /// netlist is fully built, before fault enumeration ever sees the
    /// graph. Generated lines (the intermediate wires of a wide gate's
    /// expansion) are exempt: they are wired up only inside their owning
    /// gate's `expansion`, never through `destinations`, the same way the
    /// original keeps them out of its line list entirely.
    pub fn validate(&self) -> Result<(), CircuitError> {
        for line in &self.lines {
            if !line.is_generated && !line.is_output && line.destinations.is_empty() {
                return Err(CircuitError::Dangling {
                    name: line.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn add_gate_wires_destinations_with_original_indices() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_input("b");
        let gate_id = g
            .add_gate(GateType::And, &[name("a"), name("b")], "o")
            .unwrap();
        let a = g.get_line_named("a").unwrap();
        let b = g.get_line_named("b").unwrap();
        assert_eq!(g.line(a).destinations, vec![(gate_id, 0)]);
        assert_eq!(g.line(b).destinations, vec![(gate_id, 1)]);
        let o = g.get_line_named("o").unwrap();
        assert_eq!(g.line(o).source, Some(gate_id));
    }

    #[test]
    fn wide_nand_expands_right_leaning() {
        let mut g = CircuitGraph::new();
        for n in ["a", "b", "c", "d"] {
            g.add_input(n);
        }
        let gate_id = g
            .add_gate(
                GateType::Nand,
                &[name("a"), name("b"), name("c"), name("d")],
                "y",
            )
            .unwrap();
        let gate = g.gate(gate_id);
        assert!(gate.is_expanded());
        assert_eq!(gate.expansion.len(), 3);

        let e1 = &gate.expansion[0];
        assert_eq!(e1.ty, GateType::And);
        assert_eq!(g.line(e1.inputs[0]).name, "c");
        assert_eq!(g.line(e1.inputs[1]).name, "d");
        assert_eq!(g.line(e1.output).name, "y_E_1");

        let e2 = &gate.expansion[1];
        assert_eq!(e2.ty, GateType::And);
        assert_eq!(g.line(e2.inputs[0]).name, "b");
        assert_eq!(e2.inputs[1], e1.output);
        assert_eq!(g.line(e2.output).name, "y_E_2");

        let top = &gate.expansion[2];
        assert_eq!(top.ty, GateType::Nand);
        assert_eq!(g.line(top.inputs[0]).name, "a");
        assert_eq!(top.inputs[1], e2.output);
        assert_eq!(top.output, gate.output);
    }

    #[test]
    fn duplicate_add_output_is_idempotent() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_output("a");
        g.add_output("a");
        assert_eq!(g.outputs().len(), 1);
    }

    #[test]
    fn bad_arity_is_rejected() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        let err = g.add_gate(GateType::And, &[name("a")], "o").unwrap_err();
        assert!(matches!(err, CircuitError::Arity { .. }));
    }

    #[test]
    fn dangling_internal_line_fails_validation() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_input("b");
        g.add_gate(GateType::And, &[name("a"), name("b")], "unused")
            .unwrap();
        let err = g.validate().unwrap_err();
        match err {
            CircuitError::Dangling { name } => assert_eq!(name, "unused"),
            other => panic!("expected Dangling, got {:?}", other),
        }
    }

    #[test]
    fn output_with_no_further_consumers_passes_validation() {
        let mut g = CircuitGraph::new();
        g.add_input("a");
        g.add_input("b");
        g.add_output("o");
        g.add_gate(GateType::And, &[name("a"), name("b")], "o")
            .unwrap();
        assert!(g.validate().is_ok());
    }

    #[test]
    fn wide_gate_generated_lines_pass_validation() {
        let mut g = CircuitGraph::new();
        for n in ["a", "b", "c", "d"] {
            g.add_input(n);
        }
        g.add_output("y");
        g.add_gate(
            GateType::Nand,
            &[name("a"), name("b"), name("c"), name("d")],
            "y",
        )
        .unwrap();
        assert!(g.validate().is_ok());
    }
}
