/*!
Forward simulation of an AIG.

Used to replay a counterexample trace: start the latches from the reported
initial values, apply the input stimulus cycle by cycle, and observe a
literal --- typically the bad literal --- at each cycle.

And-gates are evaluated in section order, which is topological for any
model the [reader](crate::aig::parse) accepts and for circuits built
bottom-up through the construction API.
*/

use crate::aig::{self, Aig};

/// Evaluates `observe` at every cycle of the run.
///
/// `initial` carries one value per latch (in section order); `stimulus`
/// carries one vector of input values per cycle. The returned vector has
/// one observation per stimulus cycle.
///
/// Latch, input, and stimulus dimensions must agree with the model.
pub fn observe(aig: &Aig, observe: aig::Lit, initial: &[bool], stimulus: &[Vec<bool>]) -> Vec<bool> {
    assert_eq!(initial.len(), aig.num_latches());

    let mut values = vec![false; aig.node_count()];
    for (latch, &value) in aig.latches().iter().zip(initial) {
        values[aig::var_of(latch.lit) as usize] = value;
    }

    let eval = |values: &[bool], lit: aig::Lit| -> bool {
        values[aig::var_of(lit) as usize] ^ aig::is_negated(lit)
    };

    let mut trace = Vec::with_capacity(stimulus.len());
    for cycle in stimulus {
        assert_eq!(cycle.len(), aig.num_inputs());
        for (&input, &value) in aig.inputs().iter().zip(cycle) {
            values[aig::var_of(input) as usize] = value;
        }
        for gate in aig.ands() {
            let value = eval(&values, gate.rhs0) && eval(&values, gate.rhs1);
            values[aig::var_of(gate.lhs) as usize] = value;
        }
        trace.push(eval(&values, observe));

        let next: Vec<bool> = aig.latches().iter().map(|l| eval(&values, l.next)).collect();
        for (latch, value) in aig.latches().iter().zip(next) {
            values[aig::var_of(latch.lit) as usize] = value;
        }
    }
    trace
}
