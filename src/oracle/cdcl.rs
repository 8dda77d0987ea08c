/*!
The default backend: conflict-driven clause learning.

A compact incremental CDCL solver over two-watched-literal propagation,
first-UIP conflict analysis with non-chronological backjumping, and phase
saving. Decisions take the saved phase of a variable when one exists and
otherwise draw the polarity through a seeded PCG, with the lean towards
`true` fixed at 0 so behaviour is deterministic.

The solver carries every optional capability of the
[SatOracle](crate::oracle::SatOracle) contract:

- Conflict budgets bound a solve; an exhausted budget answers
  [Unknown](crate::oracle::SolverResult::Unknown).
- [Clone] gives an independent copy, clauses and fixed literals included.
- In-processing is root-level cleanup: satisfied clauses are dropped and
  falsified literals stripped, to a fixpoint per effort round.
- The irredundant clause database can be extracted, root-fixed literals
  first as units.

Variable elimination is not performed, so freezing is bookkeeping here;
the counts are still maintained since a melted variable may be reused
freely by other backends.
*/

use rand::Rng;
use rand_core::SeedableRng;

use crate::{
    generic::pcg::Pcg32,
    oracle::{OracleOptions, SatOracle, SolverResult},
    types::err::OracleError,
};

/// Sentinel for "assigned without a reason clause".
const NO_REASON: usize = usize::MAX;

fn var(lit: i32) -> usize {
    lit.unsigned_abs() as usize
}

/// Watch list index of a literal.
fn widx(lit: i32) -> usize {
    2 * var(lit) + usize::from(lit < 0)
}

#[derive(Clone, Debug)]
struct DbClause {
    lits: Vec<i32>,
    learnt: bool,
}

/// A CDCL solver behind the oracle trait.
#[derive(Clone)]
pub struct CdclOracle {
    options: OracleOptions,

    clauses: Vec<DbClause>,
    /// Clause ids watching each literal, keyed by [widx]. The watched
    /// literals of a clause are always its first two.
    watches: Vec<Vec<usize>>,

    assign: Vec<i8>,
    level: Vec<u32>,
    reason: Vec<usize>,
    trail: Vec<i32>,
    trail_lim: Vec<usize>,
    qhead: usize,

    /// Variables occurring in some stored clause or unit; only these are
    /// decided on, so untouched variables stay unconstrained in models.
    referenced: Vec<bool>,
    frozen: Vec<u32>,
    phase: Vec<i8>,
    seen: Vec<bool>,

    pending: Vec<i32>,
    assumptions: Vec<i32>,
    budget: Option<u64>,
    /// False once an unconditional contradiction has been derived.
    ok: bool,
    /// Assignment snapshot of the latest satisfiable solve.
    model: Vec<i8>,

    nvars: usize,
    conflicts: u64,
    rng: Pcg32,
    polarity_lean: f64,
}

impl CdclOracle {
    pub fn new(options: OracleOptions) -> Self {
        CdclOracle {
            options,
            clauses: Vec::new(),
            watches: vec![Vec::new(); 2],
            assign: vec![0],
            level: vec![0],
            reason: vec![NO_REASON],
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            referenced: vec![false],
            frozen: vec![0],
            phase: vec![0],
            seen: vec![false],
            pending: Vec::new(),
            assumptions: Vec::new(),
            budget: None,
            ok: true,
            model: Vec::new(),
            nvars: 0,
            conflicts: 0,
            rng: Pcg32::seed_from_u64(0x5eed),
            polarity_lean: 0.0,
        }
    }

    fn ensure_var(&mut self, v: usize) {
        if v <= self.nvars {
            return;
        }
        self.nvars = v;
        self.assign.resize(v + 1, 0);
        self.level.resize(v + 1, 0);
        self.reason.resize(v + 1, NO_REASON);
        self.referenced.resize(v + 1, false);
        self.frozen.resize(v + 1, 0);
        self.phase.resize(v + 1, 0);
        self.seen.resize(v + 1, false);
        self.watches.resize(2 * v + 2, Vec::new());
    }

    fn lit_value(&self, lit: i32) -> i8 {
        let a = self.assign[var(lit)];
        if lit < 0 {
            -a
        } else {
            a
        }
    }

    fn current_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    /// Assigns the literal true at the current level. False when the
    /// literal is already false.
    fn enqueue(&mut self, lit: i32, reason: usize) -> bool {
        match self.lit_value(lit) {
            1 => true,
            -1 => false,
            _ => {
                let v = var(lit);
                self.assign[v] = if lit < 0 { -1 } else { 1 };
                self.level[v] = self.current_level();
                self.reason[v] = if self.current_level() == 0 { NO_REASON } else { reason };
                self.trail.push(lit);
                true
            }
        }
    }

    fn watch_clause(&mut self, cid: usize) {
        let (w0, w1) = (self.clauses[cid].lits[0], self.clauses[cid].lits[1]);
        self.watches[widx(w0)].push(cid);
        self.watches[widx(w1)].push(cid);
    }

    /// Commits a finished clause at the root level.
    fn commit(&mut self, mut lits: Vec<i32>) {
        debug_assert_eq!(self.current_level(), 0);
        for &lit in &lits {
            self.ensure_var(var(lit));
        }
        if !self.ok {
            return;
        }

        lits.sort_unstable_by_key(|&l| (l.unsigned_abs(), l < 0));
        lits.dedup();
        if lits.windows(2).any(|pair| pair[0] == -pair[1]) {
            return;
        }
        if lits.iter().any(|&l| self.lit_value(l) == 1) {
            return;
        }
        lits.retain(|&l| self.lit_value(l) == 0);

        match lits.len() {
            0 => self.ok = false,
            1 => {
                self.referenced[var(lits[0])] = true;
                if !self.enqueue(lits[0], NO_REASON) {
                    self.ok = false;
                }
            }
            _ => {
                for &lit in &lits {
                    self.referenced[var(lit)] = true;
                }
                let cid = self.clauses.len();
                self.clauses.push(DbClause { lits, learnt: false });
                self.watch_clause(cid);
            }
        }
    }

    /// Unit propagation to fixpoint; the conflicting clause id, if any.
    fn propagate(&mut self) -> Option<usize> {
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            let false_lit = -p;
            let list_index = widx(false_lit);
            let mut list = std::mem::take(&mut self.watches[list_index]);

            let mut i = 0;
            while i < list.len() {
                let cid = list[i];
                {
                    let c = &mut self.clauses[cid];
                    if c.lits[0] == false_lit {
                        c.lits.swap(0, 1);
                    }
                }
                let first = self.clauses[cid].lits[0];
                if self.lit_value(first) == 1 {
                    i += 1;
                    continue;
                }

                let len = self.clauses[cid].lits.len();
                let replacement =
                    (2..len).find(|&k| self.lit_value(self.clauses[cid].lits[k]) != -1);
                if let Some(k) = replacement {
                    let c = &mut self.clauses[cid];
                    c.lits.swap(1, k);
                    let moved = c.lits[1];
                    self.watches[widx(moved)].push(cid);
                    list.swap_remove(i);
                    continue;
                }

                match self.lit_value(first) {
                    -1 => {
                        self.watches[list_index] = list;
                        self.qhead = self.trail.len();
                        return Some(cid);
                    }
                    0 => {
                        self.enqueue(first, cid);
                        i += 1;
                    }
                    _ => i += 1,
                }
            }
            self.watches[list_index] = list;
        }
        None
    }

    /// First-UIP analysis of a conflict. The learnt clause (asserting
    /// literal first) and the level to backjump to.
    fn analyze(&mut self, conflict: usize) -> (Vec<i32>, u32) {
        let current = self.current_level();
        let mut learnt: Vec<i32> = vec![0];
        let mut counter = 0usize;
        let mut p: i32 = 0;
        let mut index = self.trail.len();
        let mut confl = conflict;
        let mut to_clear: Vec<usize> = Vec::new();

        loop {
            for &q in &self.clauses[confl].lits {
                if q == p {
                    continue;
                }
                let v = var(q);
                if !self.seen[v] && self.level[v] > 0 {
                    self.seen[v] = true;
                    to_clear.push(v);
                    if self.level[v] == current {
                        counter += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }

            loop {
                index -= 1;
                if self.seen[var(self.trail[index])] {
                    break;
                }
            }
            p = self.trail[index];
            let v = var(p);
            self.seen[v] = false;
            counter -= 1;
            if counter == 0 {
                learnt[0] = -p;
                break;
            }
            confl = self.reason[v];
        }

        for v in to_clear {
            self.seen[v] = false;
        }

        let backjump = if learnt.len() == 1 {
            0
        } else {
            let mut deepest = 1;
            for i in 2..learnt.len() {
                if self.level[var(learnt[i])] > self.level[var(learnt[deepest])] {
                    deepest = i;
                }
            }
            learnt.swap(1, deepest);
            self.level[var(learnt[1])]
        };
        (learnt, backjump)
    }

    fn cancel_until(&mut self, target: u32) {
        if self.current_level() <= target {
            return;
        }
        let bound = self.trail_lim[target as usize];
        for i in (bound..self.trail.len()).rev() {
            let v = var(self.trail[i]);
            self.phase[v] = self.assign[v];
            self.assign[v] = 0;
            self.reason[v] = NO_REASON;
        }
        self.trail.truncate(bound);
        self.trail_lim.truncate(target as usize);
        self.qhead = bound;
    }

    /// Records the learnt clause and asserts its head literal.
    fn learn(&mut self, learnt: Vec<i32>) {
        if learnt.len() == 1 {
            self.enqueue(learnt[0], NO_REASON);
        } else {
            for &lit in &learnt {
                self.referenced[var(lit)] = true;
            }
            let head = learnt[0];
            let cid = self.clauses.len();
            self.clauses.push(DbClause { lits: learnt, learnt: true });
            self.watch_clause(cid);
            self.enqueue(head, cid);
        }
    }

    /// The next unassigned referenced variable, lowest index first.
    fn pick_branch(&self) -> Option<usize> {
        (1..=self.nvars).find(|&v| self.referenced[v] && self.assign[v] == 0)
    }

    fn rebuild_watches(&mut self) {
        for list in self.watches.iter_mut() {
            list.clear();
        }
        for cid in 0..self.clauses.len() {
            self.watch_clause(cid);
        }
    }

    /// One round of root cleanup. Whether any new root unit was found.
    fn cleanup_round(&mut self) -> bool {
        debug_assert_eq!(self.current_level(), 0);
        let mut units: Vec<i32> = Vec::new();
        let clauses = std::mem::take(&mut self.clauses);
        self.clauses = clauses
            .into_iter()
            .filter_map(|mut clause| {
                if clause.lits.iter().any(|&l| self.lit_value(l) == 1) {
                    return None;
                }
                clause.lits.retain(|&l| self.lit_value(l) == 0);
                match clause.lits.len() {
                    0 => {
                        self.ok = false;
                        None
                    }
                    1 => {
                        units.push(clause.lits[0]);
                        None
                    }
                    _ => Some(clause),
                }
            })
            .collect();
        self.rebuild_watches();
        let progress = !units.is_empty();
        for unit in units {
            if !self.enqueue(unit, NO_REASON) {
                self.ok = false;
            }
        }
        progress
    }
}

impl SatOracle for CdclOracle {
    fn add_literal(&mut self, lit: i32) {
        if lit == 0 {
            let clause = std::mem::take(&mut self.pending);
            self.commit(clause);
        } else {
            self.pending.push(lit);
        }
    }

    fn assume(&mut self, lit: i32) {
        self.ensure_var(var(lit));
        self.assumptions.push(lit);
    }

    fn set_conflict_budget(&mut self, budget: Option<u64>) {
        self.budget = budget;
    }

    fn solve(&mut self) -> SolverResult {
        self.model.clear();
        let assumptions = std::mem::take(&mut self.assumptions);
        if !self.ok {
            return SolverResult::Unsatisfiable;
        }

        let mut spent: u64 = 0;
        let result = 'search: loop {
            if let Some(conflict) = self.propagate() {
                self.conflicts += 1;
                spent += 1;
                if self.current_level() == 0 {
                    self.ok = false;
                    break SolverResult::Unsatisfiable;
                }
                if self.budget.is_some_and(|budget| spent >= budget) {
                    break SolverResult::Unknown;
                }
                let (learnt, backjump) = self.analyze(conflict);
                self.cancel_until(backjump);
                self.learn(learnt);
                continue 'search;
            }

            // Assumptions claim the lowest decision levels, in order.
            while self.trail_lim.len() < assumptions.len() {
                let a = assumptions[self.trail_lim.len()];
                match self.lit_value(a) {
                    1 => self.trail_lim.push(self.trail.len()),
                    -1 => break 'search SolverResult::Unsatisfiable,
                    _ => {
                        self.trail_lim.push(self.trail.len());
                        self.enqueue(a, NO_REASON);
                        break;
                    }
                }
            }
            if self.qhead < self.trail.len() {
                continue 'search;
            }

            match self.pick_branch() {
                Some(v) => {
                    self.trail_lim.push(self.trail.len());
                    let polarity = match self.phase[v] {
                        0 => {
                            if self.rng.random_bool(self.polarity_lean) {
                                1
                            } else {
                                -1
                            }
                        }
                        saved => saved,
                    };
                    self.enqueue(polarity as i32 * v as i32, NO_REASON);
                }
                None => {
                    self.model = self.assign.clone();
                    break SolverResult::Satisfiable;
                }
            }
        };

        self.cancel_until(0);
        result
    }

    fn value(&self, lit: i32) -> i8 {
        let v = var(lit);
        if v >= self.model.len() {
            return 0;
        }
        let a = self.model[v];
        if lit < 0 {
            -a
        } else {
            a
        }
    }

    fn fixed(&self, lit: i32) -> i8 {
        let v = var(lit);
        if v > self.nvars || self.assign[v] == 0 || self.level[v] != 0 {
            return 0;
        }
        let a = self.assign[v];
        if lit < 0 {
            -a
        } else {
            a
        }
    }

    fn freeze(&mut self, lit: i32) {
        self.ensure_var(var(lit));
        self.frozen[var(lit)] += 1;
    }

    fn melt(&mut self, lit: i32) {
        self.ensure_var(var(lit));
        let count = &mut self.frozen[var(lit)];
        *count = count.saturating_sub(1);
    }

    fn melt_all(&mut self) {
        self.frozen.iter_mut().for_each(|count| *count = 0);
    }

    fn simplify(&mut self, effort: u32) {
        if self.options.plain || effort == 0 || !self.ok {
            return;
        }
        debug_assert_eq!(self.current_level(), 0);
        for _ in 0..effort {
            if self.propagate().is_some() {
                self.ok = false;
                return;
            }
            if !self.cleanup_round() || !self.ok {
                return;
            }
        }
    }

    fn max_var(&self) -> i32 {
        self.nvars as i32
    }

    fn supports_clone(&self) -> bool {
        true
    }

    fn try_clone(&self) -> Result<Box<dyn SatOracle>, OracleError> {
        Ok(Box::new(self.clone()))
    }

    fn supports_extract(&self) -> bool {
        true
    }

    fn extract_clauses(&self) -> Option<Vec<Vec<i32>>> {
        let root = self.trail_lim.first().copied().unwrap_or(self.trail.len());
        let mut out: Vec<Vec<i32>> = self.trail[..root].iter().map(|&l| vec![l]).collect();
        out.extend(
            self.clauses
                .iter()
                .filter(|clause| !clause.learnt)
                .map(|clause| clause.lits.clone()),
        );
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> CdclOracle {
        CdclOracle::new(OracleOptions::default())
    }

    #[test]
    fn propagation_chain() {
        let mut s = solver();
        s.add_clause(&[1]);
        s.add_clause(&[-1, 2]);
        s.add_clause(&[-2, 3]);
        assert_eq!(s.solve(), SolverResult::Satisfiable);
        assert_eq!(s.value(3), 1);
        assert_eq!(s.fixed(3), 1);
    }

    #[test]
    fn conflicting_units() {
        let mut s = solver();
        s.add_clause(&[1]);
        s.add_clause(&[-1]);
        assert_eq!(s.solve(), SolverResult::Unsatisfiable);
    }

    #[test]
    fn learns_from_conflicts() {
        let mut s = solver();
        s.add_clause(&[1, 2]);
        s.add_clause(&[1, -2]);
        s.add_clause(&[-1, 2]);
        s.add_clause(&[-1, -2]);
        assert_eq!(s.solve(), SolverResult::Unsatisfiable);
    }

    #[test]
    fn assumptions_are_one_shot() {
        let mut s = solver();
        s.add_clause(&[1, 2]);
        s.assume(-1);
        s.assume(-2);
        assert_eq!(s.solve(), SolverResult::Unsatisfiable);
        assert_eq!(s.solve(), SolverResult::Satisfiable);
    }
}
