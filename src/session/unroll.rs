/*!
Temporal unrolling.

Bound *k* adds one shifted copy of the untimed template to the oracle.
For *k* ≥ 1 the copy is tied to its predecessor first: for every cone
latch, the equivalence `shift(next, k−1) ↔ shift(latch, k)` as the two
binary clauses `(¬a ∨ b)` and `(a ∨ ¬b)`. A next-state variable that has
just been linked is melted --- no later bound refers to it directly ---
while the next-state variables of bound *k* are frozen so they are still
around for the linkage at *k* + 1.

Reset units are not the unroller's business: they pin time 0 only and are
placed by session construction.
*/

use crate::session::BmcSession;

impl BmcSession {
    /// Emits bound `k` into the oracle.
    pub(crate) fn unroll(&mut self, k: u32) {
        let template = &self.template;

        if k > 0 {
            for latch in self.aig.latches() {
                if !self.coi.contains_lit(latch.lit) {
                    continue;
                }
                let prev = template.shifted(template.lit(latch.next), k - 1);
                let here = template.shifted(template.lit(latch.lit), k);
                self.oracle.add_clause(&[-prev, here]);
                self.oracle.add_clause(&[prev, -here]);
                self.oracle.melt(prev);
            }
        }

        if !(k == 0 && self.preloaded) {
            for clause in &template.clauses {
                for &lit in clause {
                    self.oracle.add_literal(template.shifted(lit, k));
                }
                self.oracle.add_literal(0);
            }
        }

        for latch in self.aig.latches() {
            if self.coi.contains_lit(latch.lit) {
                self.oracle
                    .freeze(template.shifted(template.lit(latch.next), k));
            }
        }
    }
}
