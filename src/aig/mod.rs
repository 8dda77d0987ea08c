/*!
And-inverter graphs.

An AIG is a flat circuit over three node kinds --- primary inputs, latches,
and two-input and-gates --- plus the constant-false node at index 0.

# Literals

A literal is a node index shifted left one bit, with bit 0 recording
negation. So literal 0 is constant false, literal 1 constant true, and the
two literals of node *n* are *2n* and *2n + 1*.

# Example

```rust
use aigbmc::aig::{self, Aig};

let mut circuit = Aig::new();
let toggle = circuit.add_latch();
circuit.set_latch(toggle, aig::not_lit(toggle), aig::FALSE);
circuit.add_bad(toggle);

assert_eq!(circuit.num_latches(), 1);
assert_eq!(circuit.latches()[0].next, aig::not_lit(toggle));
```
*/

pub mod parse;
pub mod sim;

/// An AIG literal: node index shifted left one bit, bit 0 = negation.
pub type Lit = u32;

/// The constant-false literal.
pub const FALSE: Lit = 0;

/// The constant-true literal.
pub const TRUE: Lit = 1;

/// Whether the literal is complemented.
pub const fn is_negated(lit: Lit) -> bool {
    lit & 1 == 1
}

/// The uncomplemented version of the literal.
pub const fn strip(lit: Lit) -> Lit {
    lit & !1
}

/// The complement of the literal.
pub const fn not_lit(lit: Lit) -> Lit {
    lit ^ 1
}

/// The node (variable) index of the literal.
pub const fn var_of(lit: Lit) -> u32 {
    lit >> 1
}

/// The uncomplemented literal of a node index.
pub const fn lit_of(var: u32) -> Lit {
    var << 1
}

/// A latch: its output literal, next-state function, and reset literal.
///
/// The reset is 0, 1, or the latch's own literal for an uninitialized latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latch {
    pub lit: Lit,
    pub next: Lit,
    pub reset: Lit,
}

impl Latch {
    /// Whether the latch starts without a defined reset value.
    pub fn uninitialized(&self) -> bool {
        self.reset == self.lit
    }
}

/// An and-gate: `lhs = rhs0 ∧ rhs1`, with `lhs` always uncomplemented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AndGate {
    pub lhs: Lit,
    pub rhs0: Lit,
    pub rhs1: Lit,
}

/// The structural kind of a node, with an index into the owning vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Constant,
    Input(u32),
    Latch(u32),
    And(u32),
}

/// An and-inverter graph.
///
/// Nodes are created through the `add_*` methods or by the
/// [AIGER reader](crate::aig::parse); the kind table is kept in sync so
/// structural lookup by node index is constant time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aig {
    maxvar: u32,
    inputs: Vec<Lit>,
    latches: Vec<Latch>,
    outputs: Vec<Lit>,
    bad: Vec<Lit>,
    constraints: Vec<Lit>,
    justice: Vec<Vec<Lit>>,
    fairness: Vec<Lit>,
    ands: Vec<AndGate>,
    kinds: Vec<NodeKind>,
}

impl Aig {
    pub fn new() -> Self {
        Aig {
            kinds: vec![NodeKind::Constant],
            ..Default::default()
        }
    }

    fn fresh_node(&mut self, kind: NodeKind) -> Lit {
        self.maxvar += 1;
        self.kinds.push(kind);
        lit_of(self.maxvar)
    }

    /// Adds a primary input and returns its literal.
    pub fn add_input(&mut self) -> Lit {
        let index = self.inputs.len() as u32;
        let lit = self.fresh_node(NodeKind::Input(index));
        self.inputs.push(lit);
        lit
    }

    /// Adds a latch with reset 0 and a constant-false next state, returning
    /// its literal. Wire it up with [set_latch](Aig::set_latch) once the
    /// next-state literal exists.
    pub fn add_latch(&mut self) -> Lit {
        let index = self.latches.len() as u32;
        let lit = self.fresh_node(NodeKind::Latch(index));
        self.latches.push(Latch {
            lit,
            next: FALSE,
            reset: FALSE,
        });
        lit
    }

    /// Sets the next-state and reset literals of an existing latch.
    pub fn set_latch(&mut self, latch: Lit, next: Lit, reset: Lit) {
        let NodeKind::Latch(index) = self.kinds[var_of(latch) as usize] else {
            panic!("set_latch on a non-latch literal {latch}");
        };
        let entry = &mut self.latches[index as usize];
        entry.next = next;
        entry.reset = reset;
    }

    /// Adds the gate `rhs0 ∧ rhs1` and returns its output literal.
    pub fn add_and(&mut self, rhs0: Lit, rhs1: Lit) -> Lit {
        let index = self.ands.len() as u32;
        let lhs = self.fresh_node(NodeKind::And(index));
        self.ands.push(AndGate { lhs, rhs0, rhs1 });
        lhs
    }

    pub fn add_output(&mut self, lit: Lit) {
        self.outputs.push(lit);
    }

    pub fn add_bad(&mut self, lit: Lit) {
        self.bad.push(lit);
    }

    pub fn maxvar(&self) -> u32 {
        self.maxvar
    }

    /// The number of nodes, including the constant.
    pub fn node_count(&self) -> usize {
        self.maxvar as usize + 1
    }

    pub fn inputs(&self) -> &[Lit] {
        &self.inputs
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn latches(&self) -> &[Latch] {
        &self.latches
    }

    pub fn num_latches(&self) -> usize {
        self.latches.len()
    }

    pub fn outputs(&self) -> &[Lit] {
        &self.outputs
    }

    pub fn bad(&self) -> &[Lit] {
        &self.bad
    }

    pub fn constraints(&self) -> &[Lit] {
        &self.constraints
    }

    pub fn num_justice(&self) -> usize {
        self.justice.len()
    }

    pub fn num_fairness(&self) -> usize {
        self.fairness.len()
    }

    pub fn ands(&self) -> &[AndGate] {
        &self.ands
    }

    pub fn num_ands(&self) -> usize {
        self.ands.len()
    }

    /// The structural kind of a node.
    pub fn kind_of(&self, var: u32) -> NodeKind {
        self.kinds[var as usize]
    }

    /// The latch whose output is the stripped literal, if there is one.
    pub fn latch_of(&self, lit: Lit) -> Option<&Latch> {
        match self.kinds[var_of(lit) as usize] {
            NodeKind::Latch(index) => Some(&self.latches[index as usize]),
            _ => None,
        }
    }

    /// The gate whose output is the stripped literal, if there is one.
    pub fn and_of(&self, lit: Lit) -> Option<&AndGate> {
        match self.kinds[var_of(lit) as usize] {
            NodeKind::And(index) => Some(&self.ands[index as usize]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_arithmetic() {
        assert_eq!(not_lit(FALSE), TRUE);
        assert_eq!(strip(7), 6);
        assert_eq!(var_of(7), 3);
        assert_eq!(lit_of(3), 6);
        assert!(is_negated(7));
        assert!(!is_negated(6));
    }

    #[test]
    fn node_kinds() {
        let mut circuit = Aig::new();
        let input = circuit.add_input();
        let latch = circuit.add_latch();
        let gate = circuit.add_and(input, not_lit(latch));

        assert_eq!(circuit.kind_of(0), NodeKind::Constant);
        assert_eq!(circuit.kind_of(var_of(input)), NodeKind::Input(0));
        assert_eq!(circuit.kind_of(var_of(latch)), NodeKind::Latch(0));
        assert_eq!(circuit.kind_of(var_of(gate)), NodeKind::And(0));
        assert_eq!(circuit.and_of(gate).unwrap().rhs0, input);
        assert!(circuit.latch_of(gate).is_none());
    }
}
