/*!
A bounded model checker for AIGER circuits.

Given a sequential circuit as an and-inverter graph with a single bad
state property and a bound *K*, the checker either produces a concrete
trace of length ≤ K that drives the circuit into a bad state, certifies
that no such trace of length ≤ K exists, or reports the question open
within the bound.

# The pipeline

- [aig] --- the circuit, its AIGER reader, and a forward simulator.
- [coi] --- the cone of influence of the property: the backward slice the
  encoding is pruned to.
- [cnf] --- the untimed clause template over a compact variable range, one
  copy of which is shifted per time step.
- [oracle] --- the incremental SAT boundary, with two in-crate backends.
- [session] --- the unrolling engine and the bound loop.
- [reports] --- verdicts and witnesses.

# Example

```rust
use aigbmc::{aig::{self, Aig}, config::Config, reports::Verdict, session::BmcSession};

// A one-bit toggle: the latch starts at 0 and flips each cycle.
let mut circuit = Aig::new();
let toggle = circuit.add_latch();
circuit.set_latch(toggle, aig::not_lit(toggle), aig::FALSE);
circuit.add_bad(toggle);

let mut session = BmcSession::new(circuit, Config::default()).unwrap();
let mut out = Vec::new();
let outcome = session.run(5, &mut out).unwrap();

// The latch is 1 at cycle 1.
assert_eq!(outcome.verdict, Verdict::Falsified);
assert_eq!(outcome.bound, 1);
```
*/

pub mod aig;
pub mod cnf;
pub mod coi;
pub mod config;
pub mod generic;
pub mod oracle;
pub mod reports;
pub mod session;
pub mod types;
