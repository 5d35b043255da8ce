//! ISCAS-89 netlist parser (C7). Line-oriented and case-insensitive for
//! keywords; `#` starts a end-of-line comment. `DFF` is rewritten as a
//! combinational cut point: its output becomes a primary input, its data
//! input a primary output.

use crate::error::ParseError;
use crate::graph::{CircuitGraph, GateType};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*INPUT\s*\(\s*([A-Za-z0-9_\[\]]+)\s*\)\s*$").unwrap()
});
static OUTPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*OUTPUT\s*\(\s*([A-Za-z0-9_\[\]]+)\s*\)\s*$").unwrap()
});
static GATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*([A-Za-z0-9_\[\]]+)\s*=\s*([A-Za-z]+)\s*\(\s*([A-Za-z0-9_\[\],\s]+)\s*\)\s*$",
    )
    .unwrap()
});

fn gate_type_from_str(s: &str) -> Option<GateType> {
    match s.to_ascii_uppercase().as_str() {
        "AND" => Some(GateType::And),
        "NAND" => Some(GateType::Nand),
        "NOT" => Some(GateType::Not),
        "OR" => Some(GateType::Or),
        "NOR" => Some(GateType::Nor),
        "XOR" => Some(GateType::Xor),
        "XNOR" => Some(GateType::Xnor),
        "BUFF" | "BUF" => Some(GateType::Buff),
        _ => None,
    }
}

/// Parses a full ISCAS-89 source text into a [`CircuitGraph`].
pub fn parse(source: &str) -> Result<CircuitGraph, ParseError> {
    let mut graph = CircuitGraph::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = INPUT_RE.captures(line) {
            graph.add_input(&caps[1]);
            continue;
        }
        if let Some(caps) = OUTPUT_RE.captures(line) {
            graph.add_output(&caps[1]);
            continue;
        }
        if let Some(caps) = GATE_RE.captures(line) {
            let output = caps[1].to_string();
            let ty_str = &caps[2];
            let inputs: Vec<String> = caps[3]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if ty_str.eq_ignore_ascii_case("DFF") {
                // Sequential cut: the D input is wherever the data comes
                // from, so it becomes an output pin; Q becomes a fresh PI.
                if inputs.len() != 1 {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        message: "DFF takes exactly one input".to_string(),
                    });
                }
                debug!("cutting DFF at line {}: {} -> {}", line_no, inputs[0], output);
                graph.add_output(&inputs[0]);
                graph.add_input(&output);
                continue;
            }

            let ty = gate_type_from_str(ty_str).ok_or_else(|| ParseError::UnknownGateType {
                line: line_no,
                ty: ty_str.to_string(),
            })?;
            graph.add_gate(ty, &inputs, &output)?;
            continue;
        }

        return Err(ParseError::UnrecognizedStatement {
            line: line_no,
            text: line.to_string(),
        });
    }

    graph.validate()?;
    Ok(graph)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_c17() {
        let src = "\
            INPUT(1)\nINPUT(2)\nINPUT(3)\nINPUT(6)\nINPUT(7)\n\
            OUTPUT(22)\nOUTPUT(23)\n\
            10 = nand(1, 3)\n11 = NAND(3,6)\n16=NAND(2,11)\n19=NAND(11,7)\n\
            22 = NAND(10, 16)\n23=NAND(16,19)\n";
        let graph = parse(src).unwrap();
        assert_eq!(graph.inputs().len(), 5);
        assert_eq!(graph.outputs().len(), 2);
        assert_eq!(graph.gates().len(), 6);
    }

    #[test]
    fn unknown_statement_reports_line_number() {
        let src = "INPUT(a)\nbogus statement\n";
        let err = parse(src).unwrap_err();
        match err {
            ParseError::UnrecognizedStatement { line, .. } => assert_eq!(line, 2),
            other => panic!("expected UnrecognizedStatement, got {:?}", other),
        }
    }

    #[test]
    fn dff_is_cut_into_pi_po_pair() {
        let src = "INPUT(d)\nOUTPUT(q)\nq = DFF(d)\n";
        let graph = parse(src).unwrap();
        assert!(graph.inputs().iter().any(|&l| graph.line(l).name == "q"));
        assert!(graph.outputs().iter().any(|&l| graph.line(l).name == "d"));
    }

    #[test]
    fn buf_is_synonym_for_buff() {
        let src = "INPUT(a)\nOUTPUT(b)\nb = BUF(a)\n";
        let graph = parse(src).unwrap();
        assert_eq!(graph.gates().len(), 1);
        assert_eq!(graph.gates()[0].ty, GateType::Buff);
    }

    #[test]
    fn dangling_internal_line_is_a_parse_error() {
        let src = "INPUT(a)\nINPUT(b)\nOUTPUT(y)\nunused = AND(a, b)\ny = NOT(a)\n";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, ParseError::Circuit(crate::error::CircuitError::Dangling { .. })));
    }
}
