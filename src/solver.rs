//! The narrow SAT-solver contract (C8) and a streaming `ICnf` adapter that
//! feeds clauses straight into a solver instead of materializing them.
//!
//! Nothing upstream of this module ever names a concrete solver type —
//! only [`SatSolver`] — so swapping backends is a one-file change.

use crate::cnf::{Clause, ICnf, Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat,
    Unsat,
    Unknown,
}

pub trait SatSolver {
    fn reset(&mut self);
    fn reserve(&mut self, max_var_hint: usize);
    fn add_clause(&mut self, clause: &[Literal]);
    fn solve_prepared(&mut self) -> SolveResult;
    /// `-1` for false, `+1` for true; solvers that leave a variable
    /// unassigned (don't-care) may return either.
    fn value(&self, var: i32) -> i8;
}

/// Forwards every clause directly to a [`SatSolver`] instead of keeping
/// them around, for the per-fault hot path where the CNF is solved once
/// and discarded.
pub struct SolverSink<'a, S: SatSolver> {
    solver: &'a mut S,
}

impl<'a, S: SatSolver> SolverSink<'a, S> {
    pub fn new(solver: &'a mut S) -> Self {
        Self { solver }
    }
}

impl<'a, S: SatSolver> ICnf for SolverSink<'a, S> {
    fn clear(&mut self) {
        self.solver.reset();
    }

    fn reserve(&mut self, max_var_hint: usize) {
        self.solver.reserve(max_var_hint);
    }

    fn add_clause(&mut self, clause: &[Literal]) {
        self.solver.add_clause(clause);
    }
}

/// Bulk-loads a materialized CNF's clauses into a fresh solver state.
pub fn load_cnf<S: SatSolver>(solver: &mut S, clauses: &[Clause]) {
    solver.reset();
    for clause in clauses {
        solver.add_clause(clause);
    }
}

/// Adapter over the `rustsat-kissat` incremental backend.
pub struct KissatSolver {
    inner: rustsat_kissat::Kissat,
}

impl KissatSolver {
    pub fn new() -> Self {
        Self {
            inner: rustsat_kissat::Kissat::default(),
        }
    }

    fn to_rustsat_lit(lit: Literal) -> rustsat::types::Lit {
        rustsat::types::Lit::from_ipasir(lit).expect("literal 0 is never passed to the solver")
    }
}

impl Default for KissatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for KissatSolver {
    fn reset(&mut self) {
        self.inner = rustsat_kissat::Kissat::default();
    }

    fn reserve(&mut self, _max_var_hint: usize) {
        // Kissat grows its variable table on demand; nothing to preallocate
        // through the rustsat binding.
    }

    fn add_clause(&mut self, clause: &[Literal]) {
        use rustsat::solvers::Solve;
        let rs_clause: rustsat::types::Clause =
            clause.iter().map(|&l| Self::to_rustsat_lit(l)).collect();
        self.inner
            .add_clause(rs_clause)
            .expect("kissat rejected a clause");
    }

    fn solve_prepared(&mut self) -> SolveResult {
        use rustsat::solvers::{Solve, SolverResult};
        match self.inner.solve() {
            Ok(SolverResult::Sat) => SolveResult::Sat,
            Ok(SolverResult::Unsat) => SolveResult::Unsat,
            Ok(SolverResult::Interrupted) => SolveResult::Unknown,
            Err(_) => SolveResult::Unknown,
        }
    }

    fn value(&self, var: i32) -> i8 {
        use rustsat::solvers::Solve;
        let lit = Self::to_rustsat_lit(var);
        match self.inner.lit_val(lit) {
            Ok(rustsat::types::TernaryVal::True) => 1,
            Ok(rustsat::types::TernaryVal::False) => -1,
            Ok(rustsat::types::TernaryVal::DontCare) => -1,
            Err(_) => -1,
        }
    }
}
