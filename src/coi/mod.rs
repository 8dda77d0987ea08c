/*!
Cone-of-influence analysis.

The cone of a property literal is the set of nodes its value structurally
depends on: a breadth-first walk from the property node, expanding a latch
through its next-state function and an and-gate through both children.
Everything outside the cone contributes neither clauses nor variables to
the encoding.

Each node in the cone is marked with a positive discovery index; the mask
is built once and never mutated afterwards.
*/

use crate::aig::{self, Aig, NodeKind};

/// How much of each node kind the cone covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoiCensus {
    pub nodes: u32,
    pub inputs: u32,
    pub latches: u32,
    pub ands: u32,
    pub constants: u32,
}

/// The cone-of-influence mask of a property literal.
#[derive(Clone, Debug)]
pub struct Coi {
    /// Discovery order per node, 0 for nodes outside the cone.
    order: Vec<u32>,
    pub census: CoiCensus,
}

impl Coi {
    /// Walks the cone of `property` over `aig`.
    pub fn analyze(aig: &Aig, property: aig::Lit) -> Self {
        let mut order = vec![0u32; aig.node_count()];
        let mut census = CoiCensus::default();
        let mut queue: Vec<u32> = Vec::new();
        let mut discovered = 1u32;

        order[aig::var_of(property) as usize] = discovered;
        queue.push(aig::var_of(property));

        let mut head = 0;
        while head < queue.len() {
            let var = queue[head];
            head += 1;
            census.nodes += 1;

            let mut visit = |order: &mut Vec<u32>, queue: &mut Vec<u32>, lit: aig::Lit| {
                let child = aig::var_of(lit);
                if order[child as usize] == 0 {
                    discovered += 1;
                    order[child as usize] = discovered;
                    queue.push(child);
                }
            };

            match aig.kind_of(var) {
                NodeKind::Constant => census.constants += 1,
                NodeKind::Input(_) => census.inputs += 1,
                NodeKind::Latch(index) => {
                    census.latches += 1;
                    let latch = aig.latches()[index as usize];
                    visit(&mut order, &mut queue, latch.next);
                }
                NodeKind::And(index) => {
                    census.ands += 1;
                    let gate = aig.ands()[index as usize];
                    visit(&mut order, &mut queue, gate.rhs0);
                    visit(&mut order, &mut queue, gate.rhs1);
                }
            }
        }

        Coi { order, census }
    }

    /// Whether the node is inside the cone.
    pub fn contains_var(&self, var: u32) -> bool {
        self.order[var as usize] != 0
    }

    /// Whether the literal's node is inside the cone.
    pub fn contains_lit(&self, lit: aig::Lit) -> bool {
        self.contains_var(aig::var_of(lit))
    }

    /// The discovery index of a node, 0 outside the cone.
    pub fn order_of(&self, var: u32) -> u32 {
        self.order[var as usize]
    }

    /// Logs the cone census against the model totals.
    pub fn report(&self, aig: &Aig) {
        let percent = |part: u32, whole: usize| {
            if whole == 0 {
                0.0
            } else {
                100.0 * f64::from(part) / whole as f64
            }
        };
        log::info!(
            "nodes in COI: {} = {:3.0}% out of {}",
            self.census.nodes,
            percent(self.census.nodes, aig.node_count()),
            aig.node_count(),
        );
        log::info!(
            "inputs in COI: {} = {:3.0}% out of {}",
            self.census.inputs,
            percent(self.census.inputs, aig.num_inputs()),
            aig.num_inputs(),
        );
        log::info!(
            "latches in COI: {} = {:3.0}% out of {}",
            self.census.latches,
            percent(self.census.latches, aig.num_latches()),
            aig.num_latches(),
        );
        log::info!(
            "ands in COI: {} = {:3.0}% out of {}",
            self.census.ands,
            percent(self.census.ands, aig.num_ands()),
            aig.num_ands(),
        );
        log::info!("constants in COI: {} out of 1", self.census.constants);
    }
}
