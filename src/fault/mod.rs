//! Fault enumeration (C5) and fault-to-CNF construction (C6).

pub mod cnf;
pub mod manager;

pub use cnf::{make_fanout_cone, FaultCnfMaker, FanoutConeInfo};
pub use manager::{Fault, FaultKind, FaultManager};
