use aigbmc::config::Config;
use aigbmc::reports::Verdict;
use aigbmc::session::BmcSession;

mod common;

use common::RecordingOracle;

/// The toggle latch compacts to a single untimed variable: the latch is
/// variable 1 and its next function is the negation −1. Everything the
/// unroller does is therefore easy to predict exactly.
#[test]
fn latch_linkage_and_freezing_discipline() {
    let (circuit, _) = common::toggle_latch();
    let (oracle, record) = RecordingOracle::unsat();
    let mut session = BmcSession::with_oracle(circuit, Config::default(), oracle).unwrap();

    let mut out = Vec::new();
    let outcome = session.run(3, &mut out).unwrap();
    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(String::from_utf8(out).unwrap(), "u0\nu1\nu2\nu3\n2\nb0\n.\n");

    let record = record.borrow();

    // Seeding: the reset unit pinning the latch to 0 at time 0.
    assert_eq!(record.clauses[0], vec![-1]);

    // Per bound k ≥ 1 the equivalence shift(next, k−1) ↔ shift(latch, k),
    // i.e. −k ↔ k+1, as two binary clauses.
    for k in 1..=3i32 {
        let forward = vec![k, k + 1];
        let backward = vec![-k, -(k + 1)];
        assert!(
            record
                .clauses
                .windows(2)
                .any(|w| w[0] == forward && w[1] == backward),
            "linkage for bound {k} missing"
        );
    }

    // The bad literal is assumed per step, never added; with one untimed
    // variable the shifted bad literals are 1, 2, 3, 4.
    assert_eq!(record.assumptions, vec![1, 2, 3, 4]);

    // Next-state variables freeze at their bound and melt once linked.
    // Session construction first freezes the latch, the next, and the bad
    // literal of the time-0 layer.
    assert_eq!(record.frozen, vec![1, -1, 1, -1, -2, -3, -4]);
    assert_eq!(record.melted, vec![-1, -2, -3]);

    // Budgets stay lifted: a backend without clone support gets the
    // single-solver strategy.
    assert!(record.budgets.iter().all(Option::is_none));
    assert_eq!(record.solves, 4);
}

/// Clause literals never leave the window `[1, V·(K+1)]`, and nothing is
/// emitted for nodes outside the cone.
#[test]
fn shifted_literals_stay_in_window() {
    let circuit = common::counter(3);
    let (oracle, record) = RecordingOracle::unsat();
    let mut session = BmcSession::with_oracle(circuit, Config::default(), oracle).unwrap();
    let vars = session.template().vars;

    let max_k = 4u32;
    let mut out = Vec::new();
    session.run(max_k, &mut out).unwrap();

    let bound = vars * (max_k as i32 + 1);
    let record = record.borrow();
    for clause in &record.clauses {
        assert!(!clause.is_empty());
        for &lit in clause {
            assert!(lit != 0 && lit.abs() <= bound, "literal {lit} outside the window");
        }
    }
}

/// The simplification cadence fires exactly when k+1 is a power of two,
/// and not on the final bound.
#[test]
fn simplification_cadence() {
    let (circuit, _) = common::toggle_latch();
    let (oracle, record) = RecordingOracle::unsat();
    let mut session = BmcSession::with_oracle(circuit, Config::default(), oracle).unwrap();

    let mut out = Vec::new();
    session.run(6, &mut out).unwrap();

    // One construction-time simplification at full effort, then the
    // cadence at k = 0, 1, 3 (k = 6 is the final bound and skipped).
    let record = record.borrow();
    assert_eq!(record.simplify_efforts, vec![3, 1, 1, 1]);
}
