#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use aigbmc::aig::{self, Aig};
use aigbmc::oracle::{SatOracle, SolverResult};
use aigbmc::types::err::OracleError;

/// A one-bit toggle: the latch starts at 0 and flips each cycle; the
/// latch itself is the bad literal.
pub fn toggle_latch() -> (Aig, aig::Lit) {
    let mut circuit = Aig::new();
    let latch = circuit.add_latch();
    circuit.set_latch(latch, aig::not_lit(latch), aig::FALSE);
    circuit.add_bad(latch);
    (circuit, latch)
}

/// `a ⊕ b` over three and-gates.
pub fn xor(circuit: &mut Aig, a: aig::Lit, b: aig::Lit) -> aig::Lit {
    let both = circuit.add_and(a, b);
    let neither = circuit.add_and(aig::not_lit(a), aig::not_lit(b));
    circuit.add_and(aig::not_lit(both), aig::not_lit(neither))
}

/// The conjunction of all given literals, folded left.
pub fn and_all(circuit: &mut Aig, lits: &[aig::Lit]) -> aig::Lit {
    let mut acc = lits[0];
    for &lit in &lits[1..] {
        acc = circuit.add_and(acc, lit);
    }
    acc
}

/// An autonomous `bits`-wide binary counter starting at 0; the bad
/// literal is the all-ones state, first reached at step 2^bits − 1.
pub fn counter(bits: usize) -> Aig {
    let mut circuit = Aig::new();
    let latches: Vec<aig::Lit> = (0..bits).map(|_| circuit.add_latch()).collect();

    // Increment by one: bit_i' = bit_i ⊕ carry_{i−1}, carry in of 1.
    let mut carry = aig::TRUE;
    for &latch in &latches {
        let next = xor(&mut circuit, latch, carry);
        carry = circuit.add_and(carry, latch);
        circuit.set_latch(latch, next, aig::FALSE);
    }

    let all_ones = and_all(&mut circuit, &latches);
    circuit.add_bad(all_ones);
    circuit
}

/// Everything a [RecordingOracle] saw, shared with the test body.
#[derive(Debug, Default)]
pub struct Record {
    pub clauses: Vec<Vec<i32>>,
    pub assumptions: Vec<i32>,
    pub frozen: Vec<i32>,
    pub melted: Vec<i32>,
    pub budgets: Vec<Option<u64>>,
    pub solves: u32,
    pub simplify_efforts: Vec<u32>,
    pub melt_alls: u32,
}

/// An oracle that records every call and answers every solve with a fixed
/// result. No capability beyond the mandatory surface.
pub struct RecordingOracle {
    pending: Vec<i32>,
    answer: SolverResult,
    max_var: i32,
    record: Rc<RefCell<Record>>,
}

impl RecordingOracle {
    pub fn unsat() -> (Box<dyn SatOracle>, Rc<RefCell<Record>>) {
        let record = Rc::new(RefCell::new(Record::default()));
        let oracle = RecordingOracle {
            pending: Vec::new(),
            answer: SolverResult::Unsatisfiable,
            max_var: 0,
            record: record.clone(),
        };
        (Box::new(oracle), record)
    }
}

impl SatOracle for RecordingOracle {
    fn add_literal(&mut self, lit: i32) {
        if lit == 0 {
            let clause = std::mem::take(&mut self.pending);
            self.record.borrow_mut().clauses.push(clause);
        } else {
            self.max_var = self.max_var.max(lit.abs());
            self.pending.push(lit);
        }
    }

    fn assume(&mut self, lit: i32) {
        self.max_var = self.max_var.max(lit.abs());
        self.record.borrow_mut().assumptions.push(lit);
    }

    fn set_conflict_budget(&mut self, budget: Option<u64>) {
        self.record.borrow_mut().budgets.push(budget);
    }

    fn solve(&mut self) -> SolverResult {
        self.record.borrow_mut().solves += 1;
        self.answer
    }

    fn value(&self, _lit: i32) -> i8 {
        0
    }

    fn fixed(&self, _lit: i32) -> i8 {
        0
    }

    fn freeze(&mut self, lit: i32) {
        self.record.borrow_mut().frozen.push(lit);
    }

    fn melt(&mut self, lit: i32) {
        self.record.borrow_mut().melted.push(lit);
    }

    fn melt_all(&mut self) {
        self.record.borrow_mut().melt_alls += 1;
    }

    fn simplify(&mut self, effort: u32) {
        self.record.borrow_mut().simplify_efforts.push(effort);
    }

    fn max_var(&self) -> i32 {
        self.max_var
    }

    fn try_clone(&self) -> Result<Box<dyn SatOracle>, OracleError> {
        Err(OracleError::CloneUnsupported)
    }
}
