//! Gate-to-CNF Tseitin transformer (C4). Each expanded (binary, or unary
//! for NOT/BUFF) gate contributes a small fixed clause set encoding its
//! Boolean relation in terms of the good-circuit literals of its inputs
//! and output.

use crate::cnf::{Cnf, ICnf, Literal};
use crate::graph::{CircuitGraph, ExpandedGate, GateType};
use crate::ids::LineId;

fn lit(line: LineId) -> Literal {
    line.literal()
}

/// Appends the clauses encoding one expanded gate's relation to `sink`.
pub fn add_gate_clauses(eg: &ExpandedGate, sink: &mut impl ICnf) {
    let o = lit(eg.output);
    match eg.ty {
        GateType::And | GateType::Buff => {
            let mut final_clause = vec![o];
            for &x in &eg.inputs {
                sink.add_clause2(-o, lit(x));
                final_clause.push(-lit(x));
            }
            sink.add_clause(&final_clause);
        }
        GateType::Nand | GateType::Not => {
            let mut final_clause = vec![-o];
            for &x in &eg.inputs {
                sink.add_clause2(o, lit(x));
                final_clause.push(-lit(x));
            }
            sink.add_clause(&final_clause);
        }
        GateType::Or => {
            let mut final_clause = vec![-o];
            for &x in &eg.inputs {
                sink.add_clause2(o, -lit(x));
                final_clause.push(lit(x));
            }
            sink.add_clause(&final_clause);
        }
        GateType::Nor => {
            let mut final_clause = vec![o];
            for &x in &eg.inputs {
                sink.add_clause2(-o, -lit(x));
                final_clause.push(lit(x));
            }
            sink.add_clause(&final_clause);
        }
        GateType::Xor => {
            let x = lit(eg.inputs[0]);
            let y = lit(eg.inputs[1]);
            sink.add_clause3(-x, -y, -o);
            sink.add_clause3(x, y, -o);
            sink.add_clause3(x, -y, o);
            sink.add_clause3(-x, y, o);
        }
        GateType::Xnor => {
            let x = lit(eg.inputs[0]);
            let y = lit(eg.inputs[1]);
            sink.add_clause3(-x, -y, o);
            sink.add_clause3(x, y, o);
            sink.add_clause3(x, -y, -o);
            sink.add_clause3(-x, y, -o);
        }
    }
}

/// Encodes every gate in the graph. With `expand = true`, walks the
/// (always arity-≤2) expansion sub-gates; with `expand = false`, encodes
/// each declared gate directly using its full original arity.
pub fn make_cnf(graph: &CircuitGraph, expand: bool) -> Cnf {
    let mut cnf = Cnf::new();
    for gate in graph.gates() {
        if expand {
            for eg in &gate.expansion {
                add_gate_clauses(eg, &mut cnf);
            }
        } else {
            let eg = ExpandedGate {
                ty: gate.ty,
                inputs: gate.inputs.iter().copied().collect(),
                output: gate.output,
            };
            add_gate_clauses(&eg, &mut cnf);
        }
    }
    cnf
}
