//! Library-level error types. The binary wraps these in `anyhow` at the
//! top; everything below this module returns a typed `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized statement {text:?}")]
    UnrecognizedStatement { line: usize, text: String },
    #[error("line {line}: unknown gate type {ty:?}")]
    UnknownGateType { line: usize, ty: String },
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("gate {ty:?} requires at least {min} input(s), got {got}")]
    Arity {
        ty: crate::graph::GateType,
        min: usize,
        got: usize,
    },
    #[error("line {name:?} is driven by more than one gate")]
    MultipleDrivers { name: String },
    #[error("line {name:?} is dangling: not an output and has no destination")]
    Dangling { name: String },
}
