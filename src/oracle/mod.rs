/*!
The SAT oracle boundary.

The checker talks to exactly one incremental SAT solver through the
[SatOracle] trait and is otherwise backend agnostic: clauses stream in
IPASIR style, the property is assumed one step at a time, and everything
the unrolling discipline needs --- root-level fixed values, variable
freezing, in-processing, cloning, clause extraction --- sits behind a
narrow capability surface.

Two capabilities are optional and drive how the
[session](crate::session::BmcSession) arranges its preprocessing:

- **Cloning** ([supports_clone](SatOracle::supports_clone)) enables the
  clone-and-retry escalation strategy.
- **Extraction** ([supports_extract](SatOracle::supports_extract)) enables
  the simplify-then-extract construction of the untimed template.

Everything else is mandatory. A backend may return
[Unknown](SolverResult::Unknown) from [solve](SatOracle::solve) only while
a conflict budget is set.

Two in-crate backends are provided: [CdclOracle](cdcl::CdclOracle), which
supports every capability, and [DpllOracle](dpll::DpllOracle), which
supports neither optional one.
*/

pub mod cdcl;
pub mod dpll;

use crate::{config::BackendKind, types::err::OracleError};

/// The answer of a [solve](SatOracle::solve) call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverResult {
    Satisfiable,
    Unsatisfiable,
    /// The conflict budget ran out before an answer was found.
    Unknown,
}

/// Construction hints every backend accepts.
#[derive(Clone, Copy, Debug, Default)]
pub struct OracleOptions {
    /// Disable in-processing ([simplify](SatOracle::simplify) becomes a
    /// no-op).
    pub plain: bool,
}

/// An incremental SAT solver, as seen by the checker.
pub trait SatOracle {
    /// Appends a literal to the clause under construction; 0 closes the
    /// clause and commits it.
    fn add_literal(&mut self, lit: i32);

    /// Commits a whole clause.
    fn add_clause(&mut self, lits: &[i32]) {
        for &lit in lits {
            self.add_literal(lit);
        }
        self.add_literal(0);
    }

    /// Registers a one-shot assumption, active only for the next
    /// [solve](SatOracle::solve).
    fn assume(&mut self, lit: i32);

    /// Bounds the conflicts the next solves may spend. `None` lifts the
    /// bound.
    fn set_conflict_budget(&mut self, budget: Option<u64>);

    /// Determines satisfiability under the pending assumptions.
    fn solve(&mut self) -> SolverResult;

    /// The model value of a literal after a satisfiable solve:
    /// +1 true, −1 false, 0 unconstrained.
    fn value(&self, lit: i32) -> i8;

    /// The value a literal is forced to by unit propagation at the root
    /// level: +1, −1, or 0 when unforced.
    fn fixed(&self, lit: i32) -> i8;

    /// Pins the literal's variable against elimination by in-processing.
    fn freeze(&mut self, lit: i32);

    /// Releases one [freeze](SatOracle::freeze) of the literal's variable.
    fn melt(&mut self, lit: i32);

    /// Releases every frozen variable.
    fn melt_all(&mut self);

    /// Runs in-processing. Effort 0 is a no-op; larger values permit more
    /// work. A hint, not a contract.
    fn simplify(&mut self, effort: u32);

    /// The highest variable the oracle has seen.
    fn max_var(&self) -> i32;

    /// Whether [try_clone](SatOracle::try_clone) can succeed.
    fn supports_clone(&self) -> bool {
        false
    }

    /// An independent copy preserving clauses and fixed literals.
    fn try_clone(&self) -> Result<Box<dyn SatOracle>, OracleError> {
        Err(OracleError::CloneUnsupported)
    }

    /// Whether [extract_clauses](SatOracle::extract_clauses) returns the
    /// clause database.
    fn supports_extract(&self) -> bool {
        false
    }

    /// The irredundant clause database, root-fixed literals included as
    /// units. `None` when extraction is unsupported.
    fn extract_clauses(&self) -> Option<Vec<Vec<i32>>> {
        None
    }
}

/// Instantiates the backend registered under the given kind.
pub fn create(backend: BackendKind, options: OracleOptions) -> Box<dyn SatOracle> {
    match backend {
        BackendKind::Cdcl => Box::new(cdcl::CdclOracle::new(options)),
        BackendKind::Dpll => Box::new(dpll::DpllOracle::new(options)),
    }
}
