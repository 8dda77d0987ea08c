/*!
The checking session.

A [BmcSession] owns everything one run needs: the model, the
cone-of-influence mask, the untimed template, the oracle handle, the
escalation strategy, an interrupt flag, and counters. Construction
validates the model, prunes it to the property cone, and prepares the
template; [run](BmcSession::run) then drives the bound loop.

# Preprocessing

How the template reaches the oracle depends on the backend:

- A backend that can extract its clause database gets the raw encoding on
  a throwaway instance, simplifies it, and the surviving clauses become
  the template a *fresh* oracle is unrolled from.
- Otherwise the compacted raw encoding is the template; the main oracle is
  seeded with it directly (that seed is the time-0 layer, so the unroller
  skips re-emitting clauses at bound 0) and simplified in place.

Either way, a bad literal already fixed false after simplification settles
the run as verdict 0 before the loop starts.

# The loop

Per bound *k*: unroll, assume the shifted bad literal, solve. A
satisfiable answer ends the run with a witness; an unsatisfiable answer
prints the acknowledgement `u{k}` and continues, re-simplifying whenever
`k + 1` is a power of two. A model without latches is settled after one
iteration. Between oracle calls the session polls an interrupt flag that
a signal handler may set from another thread.

# Escalation

With a clone-capable backend the per-step solve runs under a conflict
budget. When the budget runs out the session clones the oracle, melts
every frozen variable in the clone, re-assumes the bad literal, and solves
the clone without a budget; whatever the clone fixed at the root is merged
back into the main oracle, and on a satisfiable answer the clone serves as
the model source for the witness.
*/

mod unroll;

use std::io::Write;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    aig::{self, Aig},
    cnf::{self, Template},
    coi::Coi,
    config::Config,
    oracle::{self, OracleOptions, SatOracle, SolverResult},
    reports::{Outcome, Verdict, Witness},
    types::err::{ErrorKind, OracleError, UnsupportedError},
};

/// A flag a signal handler posts into; polled between oracle calls.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Observability counters of a session.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    /// The last bound the loop worked on.
    pub bound_reached: u32,

    /// How often the clone-and-retry escalation ran.
    pub escalations: u32,

    /// Solve calls issued, escalations included.
    pub solver_calls: u64,
}

/// How a per-bound solve is driven.
#[derive(Clone, Copy, Debug)]
enum Strategy {
    /// Unbudgeted solves; the only option without the clone capability.
    SingleSolver,

    /// Budgeted solves with clone-and-retry on budget exhaustion.
    CloneEscalation { budget: u64 },
}

/// One bounded model checking run over one model.
pub struct BmcSession {
    aig: Aig,
    bad: aig::Lit,
    coi: Coi,
    template: Template,
    oracle: Box<dyn SatOracle>,
    /// The escalation clone a satisfiable answer came from, if any.
    model_oracle: Option<Box<dyn SatOracle>>,
    strategy: Strategy,
    config: Config,
    interrupt: Interrupt,
    counters: Counters,
    /// The time-0 template copy is already inside the oracle.
    preloaded: bool,
    /// The bad literal was fixed false during preprocessing.
    fixed_false: bool,
}

impl BmcSession {
    /// Builds a session over the configured backend.
    pub fn new(aig: Aig, config: Config) -> Result<Self, ErrorKind> {
        let options = OracleOptions {
            plain: config.plain,
        };
        let oracle = oracle::create(config.backend, options);
        if oracle.supports_extract() {
            let fresh = oracle::create(config.backend, options);
            Self::build_extracting(aig, config, oracle, fresh)
        } else {
            Self::build_seeded(aig, config, oracle)
        }
    }

    /// Builds a session over a caller-provided oracle. The instance is the
    /// session's only oracle, so the template stays on the core side as in
    /// any no-extraction regime.
    pub fn with_oracle(
        aig: Aig,
        config: Config,
        oracle: Box<dyn SatOracle>,
    ) -> Result<Self, ErrorKind> {
        Self::build_seeded(aig, config, oracle)
    }

    /// Validates the model and selects the property literal.
    fn select_property(aig: &Aig) -> Result<aig::Lit, ErrorKind> {
        if aig.bad().is_empty() && aig.outputs().is_empty() {
            return Err(UnsupportedError::NoProperty.into());
        }
        if aig.bad().len() > 1 {
            return Err(UnsupportedError::MultipleBad(aig.bad().len()).into());
        }
        if aig.bad().is_empty() && aig.outputs().len() > 1 {
            return Err(UnsupportedError::MultipleOutputs(aig.outputs().len()).into());
        }
        if !aig.constraints().is_empty() {
            return Err(UnsupportedError::Constraints(aig.constraints().len()).into());
        }
        if aig.num_justice() > 0 {
            log::warn!("ignoring {} justice properties", aig.num_justice());
        }
        if aig.num_fairness() > 0 {
            log::warn!("ignoring {} fairness constraints", aig.num_fairness());
        }
        Ok(aig.bad().first().copied().unwrap_or_else(|| aig.outputs()[0]))
    }

    /// Shared front of both builders: validation, the cone, the raw
    /// encoding.
    fn prepare(aig: &Aig) -> Result<(aig::Lit, Coi, Vec<Vec<i32>>, Vec<i32>), ErrorKind> {
        let bad = Self::select_property(aig)?;

        log::info!(
            "MILOA {} {} {} {} {}",
            aig.maxvar(),
            aig.num_inputs(),
            aig.num_latches(),
            aig.outputs().len(),
            aig.num_ands(),
        );

        if aig.num_latches() > 0 {
            let zero = aig.latches().iter().filter(|l| l.reset == aig::FALSE).count();
            let one = aig.latches().iter().filter(|l| l.reset == aig::TRUE).count();
            let free = aig.latches().iter().filter(|l| l.uninitialized()).count();
            log::info!("{zero} latches initialized to 0");
            log::info!("{one} latches initialized to 1");
            log::info!("{free} latches uninitialized");
        } else {
            log::info!("no latches, so purely combinational");
        }

        let coi = Coi::analyze(aig, bad);
        coi.report(aig);

        let clauses = cnf::encode(aig, &coi);
        let resets = cnf::reset_units(aig, &coi);
        Ok((bad, coi, clauses, resets))
    }

    /// Simplify-then-extract: raw encoding into a throwaway oracle, the
    /// surviving clauses into the template of a fresh one.
    fn build_extracting(
        aig: Aig,
        config: Config,
        mut probe: Box<dyn SatOracle>,
        mut main: Box<dyn SatOracle>,
    ) -> Result<Self, ErrorKind> {
        let (bad, coi, clauses, resets) = Self::prepare(&aig)?;

        for clause in &clauses {
            probe.add_clause(clause);
        }
        for latch in aig.latches() {
            if coi.contains_lit(latch.lit) {
                probe.freeze(cnf::prep_lit(latch.lit));
                probe.freeze(cnf::prep_lit(latch.next));
            }
        }
        if config.witness {
            for &input in aig.inputs() {
                if coi.contains_lit(input) {
                    probe.freeze(cnf::prep_lit(input));
                }
            }
        }
        probe.freeze(cnf::prep_lit(bad));
        if coi.contains_var(0) {
            probe.freeze(cnf::prep_lit(aig::FALSE));
        }

        probe.simplify(config.simplify_effort);
        log::info!("simplified");

        let fixed_false = probe.fixed(cnf::prep_lit(bad)) == -1;
        let simplified = probe.extract_clauses().unwrap_or(clauses);
        drop(probe);
        log::info!("extracted {} untimed clauses", simplified.len());

        let template = cnf::compact(simplified, resets, &aig, &coi);
        for &unit in &template.reset_units {
            main.add_clause(&[unit]);
        }

        Ok(Self::assemble(aig, bad, coi, template, main, config, false, fixed_false))
    }

    /// Seed-and-keep: the compacted raw encoding goes straight into the
    /// session's only oracle, which is then simplified in place.
    fn build_seeded(
        aig: Aig,
        config: Config,
        mut oracle: Box<dyn SatOracle>,
    ) -> Result<Self, ErrorKind> {
        let (bad, coi, clauses, resets) = Self::prepare(&aig)?;

        let template = cnf::compact(clauses, resets, &aig, &coi);
        for clause in &template.clauses {
            oracle.add_clause(clause);
        }
        for &unit in &template.reset_units {
            oracle.add_clause(&[unit]);
        }
        for latch in aig.latches() {
            if coi.contains_lit(latch.lit) {
                oracle.freeze(template.lit(latch.lit));
                oracle.freeze(template.lit(latch.next));
            }
        }
        if config.witness {
            for &input in aig.inputs() {
                if coi.contains_lit(input) {
                    oracle.freeze(template.lit(input));
                }
            }
        }
        oracle.freeze(template.lit(bad));
        if coi.contains_var(0) {
            oracle.freeze(template.lit(aig::FALSE));
        }

        oracle.simplify(config.simplify_effort);
        log::info!("simplified");

        let fixed_false = oracle.fixed(template.lit(bad)) == -1;

        Ok(Self::assemble(aig, bad, coi, template, oracle, config, true, fixed_false))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        aig: Aig,
        bad: aig::Lit,
        coi: Coi,
        template: Template,
        oracle: Box<dyn SatOracle>,
        config: Config,
        preloaded: bool,
        fixed_false: bool,
    ) -> Self {
        let strategy = if config.clone_escalation && oracle.supports_clone() {
            Strategy::CloneEscalation {
                budget: config.conflict_budget,
            }
        } else {
            Strategy::SingleSolver
        };
        log::debug!("strategy: {strategy:?}");

        BmcSession {
            aig,
            bad,
            coi,
            template,
            oracle,
            model_oracle: None,
            strategy,
            config,
            interrupt: Interrupt::new(),
            counters: Counters::default(),
            preloaded,
            fixed_false,
        }
    }

    /// A handle on the interrupt flag, for signal handler registration.
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn coi(&self) -> &Coi {
        &self.coi
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn aig(&self) -> &Aig {
        &self.aig
    }

    /// The shifted bad literal of a bound.
    fn bad_at(&self, k: u32) -> i32 {
        self.template.shifted(self.template.lit(self.bad), k)
    }

    /// Drives bounds 0 ..= `max_k`, writing acknowledgements, the verdict
    /// block, and the witness to `out`.
    pub fn run(&mut self, max_k: u32, out: &mut dyn Write) -> Result<Outcome, ErrorKind> {
        if self.fixed_false {
            log::info!("bad literal fixed false before the loop");
            write!(out, "0\nb0\n.\n")?;
            out.flush()?;
            return Ok(Outcome {
                verdict: Verdict::Unreachable,
                bound: 0,
                witness: None,
            });
        }

        let mut verdict = Verdict::Unknown;
        let mut violation = None;

        for k in 0..=max_k {
            if self.interrupt.is_set() {
                return Err(ErrorKind::Interrupted);
            }
            log::info!("bound {k}");
            self.counters.bound_reached = k;

            self.unroll(k);
            let bad_k = self.bad_at(k);
            self.oracle.assume(bad_k);

            match self.solve_bound(k)? {
                SolverResult::Satisfiable => {
                    verdict = Verdict::Falsified;
                    violation = Some(k);
                    break;
                }
                SolverResult::Unsatisfiable => {
                    if self.aig.num_latches() == 0 {
                        verdict = Verdict::Unreachable;
                        break;
                    }
                    writeln!(out, "u{k}")?;
                    out.flush()?;
                    if k < max_k && (k + 1) & k == 0 {
                        self.oracle.simplify(1);
                    }
                }
                SolverResult::Unknown => {
                    return Err(OracleError::UnexpectedUnknown.into());
                }
            }
        }

        let witness = match violation {
            Some(k) if self.config.witness => Some(self.extract_witness(k)),
            _ => None,
        };

        writeln!(out, "{verdict}")?;
        writeln!(out, "b0")?;
        if let Some(w) = &witness {
            writeln!(out, "{}", w.latch_line(self.config.stimulus_x))?;
            for t in 0..=w.depth {
                writeln!(out, "{}", w.stimulus_line(t, self.config.stimulus_x))?;
            }
        }
        writeln!(out, ".")?;
        out.flush()?;

        Ok(Outcome {
            verdict,
            bound: self.counters.bound_reached,
            witness,
        })
    }

    /// One per-bound solve under the session's strategy.
    fn solve_bound(&mut self, k: u32) -> Result<SolverResult, ErrorKind> {
        self.counters.solver_calls += 1;
        match self.strategy {
            Strategy::SingleSolver => {
                self.oracle.set_conflict_budget(None);
                match self.oracle.solve() {
                    SolverResult::Unknown => Err(OracleError::UnexpectedUnknown.into()),
                    answer => Ok(answer),
                }
            }
            Strategy::CloneEscalation { budget } => {
                self.oracle.set_conflict_budget(Some(budget));
                match self.oracle.solve() {
                    SolverResult::Unknown => self.escalate(k),
                    answer => Ok(answer),
                }
            }
        }
    }

    /// Clone-and-retry: a full-budget solve on an unfrozen clone, learned
    /// fixed literals merged back.
    fn escalate(&mut self, k: u32) -> Result<SolverResult, ErrorKind> {
        let mut clone = self.oracle.try_clone()?;
        self.counters.escalations += 1;
        self.counters.solver_calls += 1;
        log::info!(
            "bound {k} escalated to a cloned solver ({} so far)",
            self.counters.escalations
        );

        clone.melt_all();
        clone.set_conflict_budget(None);
        clone.simplify(1);
        clone.assume(self.bad_at(k));
        let answer = clone.solve();
        if answer == SolverResult::Unknown {
            return Err(OracleError::UnexpectedUnknown.into());
        }

        for v in 1..=self.oracle.max_var() {
            if self.oracle.fixed(v) != 0 {
                continue;
            }
            match clone.fixed(v) {
                1 => self.oracle.add_clause(&[v]),
                -1 => self.oracle.add_clause(&[-v]),
                _ => {}
            }
        }

        if answer == SolverResult::Satisfiable {
            self.model_oracle = Some(clone);
        }
        Ok(answer)
    }

    /// Reads the counterexample out of whichever oracle holds the model.
    fn extract_witness(&self, k: u32) -> Witness {
        let model: &dyn SatOracle = self
            .model_oracle
            .as_deref()
            .unwrap_or(self.oracle.as_ref());

        let latches = self
            .aig
            .latches()
            .iter()
            .map(|latch| {
                if self.coi.contains_lit(latch.lit) {
                    model.value(self.template.shifted(self.template.lit(latch.lit), 0))
                } else {
                    0
                }
            })
            .collect();

        let stimulus = (0..=k)
            .map(|t| {
                self.aig
                    .inputs()
                    .iter()
                    .map(|&input| {
                        if self.coi.contains_lit(input) {
                            model.value(self.template.shifted(self.template.lit(input), t))
                        } else {
                            0
                        }
                    })
                    .collect()
            })
            .collect();

        Witness {
            depth: k,
            latches,
            stimulus,
        }
    }
}
