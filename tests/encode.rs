use aigbmc::aig::{self, Aig};
use aigbmc::cnf::{self, Template};
use aigbmc::coi::Coi;

mod common;

fn template_of(circuit: &Aig) -> Template {
    let coi = Coi::analyze(circuit, circuit.bad()[0]);
    let clauses = cnf::encode(circuit, &coi);
    let resets = cnf::reset_units(circuit, &coi);
    cnf::compact(clauses, resets, circuit, &coi)
}

#[test]
fn encoding_is_deterministic() {
    let circuit = common::counter(6);
    let first = template_of(&circuit);
    let second = template_of(&circuit);
    assert_eq!(first.clauses, second.clauses);
    assert_eq!(first.reset_units, second.reset_units);
    assert_eq!(first.vars, second.vars);
}

#[test]
fn gate_clauses() {
    let mut circuit = Aig::new();
    let a = circuit.add_input();
    let b = circuit.add_input();
    let gate = circuit.add_and(a, aig::not_lit(b));
    circuit.add_bad(gate);

    let coi = Coi::analyze(&circuit, gate);
    let clauses = cnf::encode(&circuit, &coi);

    // Preparation space: input nodes 1 and 2 are variables 2 and 3, the
    // gate node 3 is variable 4.
    assert_eq!(clauses, vec![vec![-4, 2], vec![-4, -3], vec![4, -2, 3]]);
}

#[test]
fn constant_unit_polarity() {
    let mut circuit = Aig::new();
    circuit.add_bad(aig::TRUE);
    let coi = Coi::analyze(&circuit, aig::TRUE);
    let clauses = cnf::encode(&circuit, &coi);

    // The constant-false node is preparation variable 1, forced false.
    assert_eq!(clauses, vec![vec![-1]]);
}

#[test]
fn reset_units_by_kind() {
    let mut circuit = Aig::new();
    let zero = circuit.add_latch();
    let one = circuit.add_latch();
    let free = circuit.add_latch();
    circuit.set_latch(zero, one, aig::FALSE);
    circuit.set_latch(one, free, aig::TRUE);
    circuit.set_latch(free, zero, free);
    let bad = common::and_all(&mut circuit, &[zero, one, free]);
    circuit.add_bad(bad);

    let coi = Coi::analyze(&circuit, bad);
    let resets = cnf::reset_units(&circuit, &coi);
    assert_eq!(resets, vec![-cnf::prep_lit(zero), cnf::prep_lit(one)]);
}

#[test]
fn compaction_orders_latches_before_inputs() {
    let mut circuit = Aig::new();
    let input = circuit.add_input();
    let latch = circuit.add_latch();
    let gate = circuit.add_and(input, latch);
    circuit.set_latch(latch, gate, aig::FALSE);
    circuit.add_bad(latch);

    let template = template_of(&circuit);
    // Latch first, input second, then the gate on first clause reference.
    assert_eq!(template.lit(latch), 1);
    assert_eq!(template.lit(input), 2);
    assert_eq!(template.lit(gate), 3);
    assert_eq!(template.vars, 3);
}

#[test]
fn compaction_is_a_dense_bijection() {
    let circuit = common::counter(5);
    let template = template_of(&circuit);

    let mut seen = vec![false; template.vars as usize + 1];
    for clause in template.clauses.iter().chain(std::iter::once(&template.reset_units)) {
        for &lit in clause {
            let var = lit.unsigned_abs() as usize;
            assert!(var >= 1 && var <= template.vars as usize, "variable {var} out of range");
            seen[var] = true;
        }
    }
    // Latch and input variables are always allocated; everything else
    // must come from a clause, so the range has no holes.
    for latch in circuit.latches() {
        seen[template.lit(latch.lit).unsigned_abs() as usize] = true;
    }
    assert!(seen[1..].iter().all(|&s| s), "compact range has holes");
}

#[test]
fn negated_next_maps_through_its_node() {
    let (circuit, latch) = common::toggle_latch();
    let template = template_of(&circuit);
    // The next function ¬ℓ shares ℓ's node, so one variable suffices.
    assert_eq!(template.vars, 1);
    assert_eq!(template.lit(aig::not_lit(latch)), -template.lit(latch));
    assert_eq!(template.reset_units, vec![-1]);
}

#[test]
fn shift_disjointness() {
    let template = template_of(&common::counter(4));
    let vars = template.vars;
    for var in 1..=vars {
        for t1 in 0..4u32 {
            for t2 in (t1 + 1)..4u32 {
                assert_ne!(cnf::shift(var, t1, vars), cnf::shift(var, t2, vars));
            }
        }
    }
}
