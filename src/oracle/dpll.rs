/*!
A plain backend: DPLL over two watched literals.

Chronological backtracking with polarity retry, no clause learning, no
conflict budgets. Its `solve` always runs to an answer, so the budget
setter is accepted and ignored, and it reports neither the clone nor the
extraction capability: a session driving this backend exercises the
single-solver strategy and keeps the untimed template on the core side.
*/

use crate::oracle::{OracleOptions, SatOracle, SolverResult};

fn var(lit: i32) -> usize {
    lit.unsigned_abs() as usize
}

fn widx(lit: i32) -> usize {
    2 * var(lit) + usize::from(lit < 0)
}

/// A decision point, one per trail limit.
#[derive(Clone, Copy, Debug)]
struct Decision {
    lit: i32,
    /// Whether both polarities have been tried.
    flipped: bool,
    /// Assumptions may not be flipped; backtracking into one is an
    /// unsatisfiable outcome.
    assumption: bool,
}

/// A DPLL solver behind the oracle trait.
#[derive(Clone)]
pub struct DpllOracle {
    options: OracleOptions,

    clauses: Vec<Vec<i32>>,
    watches: Vec<Vec<usize>>,

    assign: Vec<i8>,
    trail: Vec<i32>,
    trail_lim: Vec<usize>,
    decisions: Vec<Decision>,
    qhead: usize,

    referenced: Vec<bool>,
    frozen: Vec<u32>,

    pending: Vec<i32>,
    assumptions: Vec<i32>,
    ok: bool,
    model: Vec<i8>,
    nvars: usize,
}

impl DpllOracle {
    pub fn new(options: OracleOptions) -> Self {
        DpllOracle {
            options,
            clauses: Vec::new(),
            watches: vec![Vec::new(); 2],
            assign: vec![0],
            trail: Vec::new(),
            trail_lim: Vec::new(),
            decisions: Vec::new(),
            qhead: 0,
            referenced: vec![false],
            frozen: vec![0],
            pending: Vec::new(),
            assumptions: Vec::new(),
            ok: true,
            model: Vec::new(),
            nvars: 0,
        }
    }

    fn ensure_var(&mut self, v: usize) {
        if v <= self.nvars {
            return;
        }
        self.nvars = v;
        self.assign.resize(v + 1, 0);
        self.referenced.resize(v + 1, false);
        self.frozen.resize(v + 1, 0);
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

    fn root_level(&self) -> bool {
        self.trail_lim.is_empty()
    }

    fn enqueue(&mut self, lit: i32) -> bool {
        match self.lit_value(lit) {
            1 => true,
            -1 => false,
            _ => {
                self.assign[var(lit)] = if lit < 0 { -1 } else { 1 };
                self.trail.push(lit);
                true
            }
        }
    }

    fn watch_clause(&mut self, cid: usize) {
        self.watches[widx(self.clauses[cid][0])].push(cid);
        self.watches[widx(self.clauses[cid][1])].push(cid);
    }

    fn commit(&mut self, mut lits: Vec<i32>) {
        debug_assert!(self.root_level());
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
                if !self.enqueue(lits[0]) {
                    self.ok = false;
                }
            }
            _ => {
                for &lit in &lits {
                    self.referenced[var(lit)] = true;
                }
                let cid = self.clauses.len();
                self.clauses.push(lits);
                self.watch_clause(cid);
            }
        }
    }

    fn propagate(&mut self) -> bool {
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            let false_lit = -p;
            let list_index = widx(false_lit);
            let mut list = std::mem::take(&mut self.watches[list_index]);

            let mut i = 0;
            while i < list.len() {
                let cid = list[i];
                if self.clauses[cid][0] == false_lit {
                    self.clauses[cid].swap(0, 1);
                }
                let first = self.clauses[cid][0];
                if self.lit_value(first) == 1 {
                    i += 1;
                    continue;
                }
                let len = self.clauses[cid].len();
                let replacement = (2..len).find(|&k| self.lit_value(self.clauses[cid][k]) != -1);
                if let Some(k) = replacement {
                    self.clauses[cid].swap(1, k);
                    let moved = self.clauses[cid][1];
                    self.watches[widx(moved)].push(cid);
                    list.swap_remove(i);
                    continue;
                }
                match self.lit_value(first) {
                    -1 => {
                        self.watches[list_index] = list;
                        self.qhead = self.trail.len();
                        return false;
                    }
                    0 => {
                        self.enqueue(first);
                        i += 1;
                    }
                    _ => i += 1,
                }
            }
            self.watches[list_index] = list;
        }
        true
    }

    /// Undoes every assignment above the given decision depth.
    fn cancel_to(&mut self, depth: usize) {
        if self.trail_lim.len() <= depth {
            return;
        }
        let bound = self.trail_lim[depth];
        for i in bound..self.trail.len() {
            self.assign[var(self.trail[i])] = 0;
        }
        self.trail.truncate(bound);
        self.trail_lim.truncate(depth);
        self.decisions.truncate(depth);
        self.qhead = bound;
    }

    /// Chronological backtracking after a conflict. False when the search
    /// space is exhausted (under the pending assumptions).
    fn backtrack(&mut self) -> bool {
        while let Some(decision) = self.decisions.last().copied() {
            if decision.assumption {
                return false;
            }
            if decision.flipped {
                self.cancel_to(self.decisions.len() - 1);
                continue;
            }
            self.cancel_to(self.decisions.len() - 1);
            self.trail_lim.push(self.trail.len());
            self.decisions.push(Decision {
                lit: -decision.lit,
                flipped: true,
                assumption: false,
            });
            self.enqueue(-decision.lit);
            return true;
        }
        false
    }

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
}

impl SatOracle for DpllOracle {
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

    fn set_conflict_budget(&mut self, _budget: Option<u64>) {
        // Solves always run to completion here.
    }

    fn solve(&mut self) -> SolverResult {
        self.model.clear();
        let assumptions = std::mem::take(&mut self.assumptions);
        if !self.ok {
            return SolverResult::Unsatisfiable;
        }

        let result = 'search: loop {
            if !self.propagate() {
                if self.root_level() {
                    self.ok = false;
                    break SolverResult::Unsatisfiable;
                }
                if !self.backtrack() {
                    break SolverResult::Unsatisfiable;
                }
                continue 'search;
            }

            while self.decisions.len() < assumptions.len() {
                let a = assumptions[self.decisions.len()];
                match self.lit_value(a) {
                    -1 => break 'search SolverResult::Unsatisfiable,
                    value => {
                        self.trail_lim.push(self.trail.len());
                        self.decisions.push(Decision {
                            lit: a,
                            flipped: true,
                            assumption: true,
                        });
                        if value == 0 {
                            self.enqueue(a);
                            break;
                        }
                    }
                }
            }
            if self.qhead < self.trail.len() {
                continue 'search;
            }

            match self.pick_branch() {
                Some(v) => {
                    self.trail_lim.push(self.trail.len());
                    self.decisions.push(Decision {
                        lit: -(v as i32),
                        flipped: false,
                        assumption: false,
                    });
                    self.enqueue(-(v as i32));
                }
                None => {
                    self.model = self.assign.clone();
                    break SolverResult::Satisfiable;
                }
            }
        };

        self.cancel_to(0);
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
        if v > self.nvars {
            return 0;
        }
        let root = self.trail_lim.first().copied().unwrap_or(self.trail.len());
        if self.trail[..root].iter().any(|&l| l == lit.abs() || l == -lit.abs()) {
            let a = self.assign[v];
            if lit < 0 {
                return -a;
            }
            return a;
        }
        0
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
        debug_assert!(self.root_level());
        for _ in 0..effort {
            if !self.propagate() {
                self.ok = false;
                return;
            }
            let mut units: Vec<i32> = Vec::new();
            let clauses = std::mem::take(&mut self.clauses);
            self.clauses = clauses
                .into_iter()
                .filter_map(|mut clause| {
                    if clause.iter().any(|&l| self.lit_value(l) == 1) {
                        return None;
                    }
                    clause.retain(|&l| self.lit_value(l) == 0);
                    match clause.len() {
                        0 => {
                            self.ok = false;
                            None
                        }
                        1 => {
                            units.push(clause[0]);
                            None
                        }
                        _ => Some(clause),
                    }
                })
                .collect();
            self.rebuild_watches();
            if units.is_empty() || !self.ok {
                return;
            }
            for unit in units {
                if !self.enqueue(unit) {
                    self.ok = false;
                }
            }
        }
    }

    fn max_var(&self) -> i32 {
        self.nvars as i32
    }
}
