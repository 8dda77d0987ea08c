/*!
The untimed clause template.

The encoding happens in two spaces:

- The **preparation space** keys a DIMACS variable directly to an AIG node:
  node *n* becomes variable *n + 1*, the sign carries the literal's
  negation bit. Gate clauses and reset units are first produced here.
- The **compact space** is the dense range `[1, V]` the unroller shifts
  through time. Variables are assigned in a fixed order: every cone latch
  output, then every cone input, then the remaining preparation variables
  lazily as clauses mention them, then the latch next-state literals.

For the gate `x = a ∧ b` the three clauses `(¬x ∨ a)`, `(¬x ∨ b)` and
`(x ∨ ¬a ∨ ¬b)` are produced; if the constant node is in the cone the unit
`(−1)` pins the constant-false polarity. Reset units are kept beside the
clause template: they pin the initial state only and must not be
replicated when the template is shifted.
*/

use crate::{
    aig::{self, Aig},
    coi::Coi,
};

/// The preparation-space literal of an AIG literal.
pub fn prep_lit(lit: aig::Lit) -> i32 {
    let var = (aig::var_of(lit) + 1) as i32;
    if aig::is_negated(lit) {
        -var
    } else {
        var
    }
}

/// Shifts a literal to time `t` in a space of `vars` variables per step.
pub fn shift(lit: i32, time: u32, vars: i32) -> i32 {
    debug_assert!(lit != 0 && lit.unsigned_abs() <= vars as u32);
    let var = lit.abs() + time as i32 * vars;
    if lit < 0 {
        -var
    } else {
        var
    }
}

/// Preparation-variable to compact-variable map.
#[derive(Clone, Debug)]
pub struct VarMap {
    map: Vec<i32>,
    vars: i32,
}

impl VarMap {
    fn new(nodes: usize) -> Self {
        VarMap {
            map: vec![0; nodes + 2],
            vars: 0,
        }
    }

    /// The compact literal of a preparation literal, allocating a fresh
    /// compact variable on first reference.
    fn map_lit(&mut self, lit: i32) -> i32 {
        let index = lit.unsigned_abs() as usize;
        let mut var = self.map[index];
        if var == 0 {
            self.vars += 1;
            var = self.vars;
            self.map[index] = var;
        }
        if lit < 0 {
            -var
        } else {
            var
        }
    }

    /// The compact literal of a preparation literal, 0 when unmapped.
    pub fn lookup(&self, lit: i32) -> i32 {
        let var = self.map[lit.unsigned_abs() as usize];
        if lit < 0 {
            -var
        } else {
            var
        }
    }

    /// The number of compact variables allocated so far.
    pub fn var_count(&self) -> i32 {
        self.vars
    }
}

/// The untimed template: compact clauses, the reset units applied once at
/// time 0, and the preparation-to-compact map.
#[derive(Clone, Debug)]
pub struct Template {
    pub clauses: Vec<Vec<i32>>,
    pub reset_units: Vec<i32>,
    pub vars: i32,
    map: VarMap,
}

impl Template {
    /// The compact literal of an AIG literal. The literal's node must be
    /// in the cone the template was built from.
    pub fn lit(&self, lit: aig::Lit) -> i32 {
        let mapped = self.map.lookup(prep_lit(lit));
        debug_assert!(mapped != 0, "literal {lit} has no untimed variable");
        mapped
    }

    /// [shift](crate::cnf::shift) through this template's variable range.
    pub fn shifted(&self, lit: i32, time: u32) -> i32 {
        shift(lit, time, self.vars)
    }
}

/// Encodes the cone-filtered gates into preparation-space clauses.
pub fn encode(aig: &Aig, coi: &Coi) -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    if coi.contains_var(0) {
        clauses.push(vec![-prep_lit(aig::FALSE)]);
    }
    for gate in aig.ands() {
        if !coi.contains_lit(gate.lhs) {
            continue;
        }
        let lhs = prep_lit(gate.lhs);
        let rhs0 = prep_lit(gate.rhs0);
        let rhs1 = prep_lit(gate.rhs1);
        clauses.push(vec![-lhs, rhs0]);
        clauses.push(vec![-lhs, rhs1]);
        clauses.push(vec![lhs, -rhs0, -rhs1]);
    }
    clauses
}

/// The preparation-space reset units of the cone latches.
///
/// Reset 0 pins the latch false, reset 1 pins it true; an uninitialized
/// latch contributes nothing.
pub fn reset_units(aig: &Aig, coi: &Coi) -> Vec<i32> {
    let mut units = Vec::new();
    for latch in aig.latches() {
        if !coi.contains_lit(latch.lit) || latch.uninitialized() {
            continue;
        }
        if latch.reset == aig::FALSE {
            units.push(-prep_lit(latch.lit));
        } else {
            units.push(prep_lit(latch.lit));
        }
    }
    units
}

/// Rewrites preparation-space clauses into a compact template.
///
/// The clause set may be the raw [encode] output or the simplified set
/// extracted back from an oracle; the allocation order is the same either
/// way.
pub fn compact(mut clauses: Vec<Vec<i32>>, resets: Vec<i32>, aig: &Aig, coi: &Coi) -> Template {
    let mut map = VarMap::new(aig.node_count());

    for latch in aig.latches() {
        if coi.contains_lit(latch.lit) {
            map.map_lit(prep_lit(latch.lit));
        }
    }
    for &input in aig.inputs() {
        if coi.contains_lit(input) {
            map.map_lit(prep_lit(input));
        }
    }
    for clause in clauses.iter_mut() {
        for lit in clause.iter_mut() {
            *lit = map.map_lit(*lit);
        }
    }
    for latch in aig.latches() {
        if coi.contains_lit(latch.lit) {
            map.map_lit(prep_lit(latch.next));
        }
    }
    let reset_units = resets.into_iter().map(|lit| map.map_lit(lit)).collect();

    log::info!("mapped {} untimed variables", map.var_count());

    Template {
        clauses,
        reset_units,
        vars: map.var_count(),
        map,
    }
}
