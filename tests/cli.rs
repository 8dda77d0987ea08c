use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn checker() -> Command {
    Command::cargo_bin("aigbmc").unwrap()
}

fn model_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

/// One input feeding `bad = input ∧ ¬input`.
const COMBINATIONAL_UNSAT: &[u8] = b"aag 2 1 0 0 1 1\n2\n4\n4 2 3\n";

/// No inputs, no latches, `bad` is constant true.
const CONSTANT_TRUE: &[u8] = b"aag 0 0 0 0 0 1\n1\n";

/// The toggle latch with `bad = latch`.
const TOGGLE: &[u8] = b"aag 1 0 1 0 0 1\n2 3\n2\n";

/// The toggle latch with `bad = latch ∧ ¬latch`.
const TOGGLE_STUCK: &[u8] = b"aag 2 0 1 0 1 1\n2 3\n4\n4 2 3\n";

#[test]
fn combinational_unsat_is_verdict_zero() {
    let file = model_file(COMBINATIONAL_UNSAT);
    checker()
        .args(["0", file.path().to_str().unwrap()])
        .assert()
        .code(20)
        .stdout("0\nb0\n.\n");
}

#[test]
fn constant_true_is_verdict_one() {
    let file = model_file(CONSTANT_TRUE);
    checker()
        .args(["0", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("1\nb0\n\n\n.\n");
}

#[test]
fn toggle_counter_with_witness() {
    let file = model_file(TOGGLE);
    checker()
        .args(["5", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("u0\n1\nb0\n0\n\n\n.\n");
}

#[test]
fn positionals_work_in_either_order() {
    let file = model_file(TOGGLE);
    checker()
        .args([file.path().to_str().unwrap(), "5"])
        .assert()
        .code(10)
        .stdout("u0\n1\nb0\n0\n\n\n.\n");
}

#[test]
fn bound_defaults_to_zero() {
    let file = model_file(TOGGLE);
    checker()
        .arg(file.path().to_str().unwrap())
        .assert()
        .code(30)
        .stdout("u0\n2\nb0\n.\n");
}

#[test]
fn witness_suppression_flag() {
    let file = model_file(TOGGLE);
    checker()
        .args(["-n", "5", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("u0\n1\nb0\n.\n");
}

#[test]
fn x_flag_marks_unconstrained_bits() {
    // An input the cone never touches; its stimulus bit is unforced.
    let file = model_file(b"aag 1 1 0 0 0 1\n2\n1\n");
    checker()
        .args(["-x", "0", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("1\nb0\n\nx\n.\n");

    let file = model_file(b"aag 1 1 0 0 0 1\n2\n1\n");
    checker()
        .args(["0", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("1\nb0\n\n0\n.\n");
}

#[test]
fn bound_exhaustion_is_verdict_two() {
    let file = model_file(TOGGLE_STUCK);
    let acks: String = (0..=10).map(|k| format!("u{k}\n")).collect();
    checker()
        .args(["10", file.path().to_str().unwrap()])
        .assert()
        .code(30)
        .stdout(format!("{acks}2\nb0\n.\n"));
}

#[test]
fn reads_standard_input() {
    checker()
        .arg("0")
        .write_stdin(CONSTANT_TRUE)
        .assert()
        .code(10)
        .stdout("1\nb0\n\n\n.\n");
}

#[test]
fn dpll_backend_selection() {
    let file = model_file(TOGGLE);
    checker()
        .args(["--backend=dpll", "5", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("u0\n1\nb0\n0\n\n\n.\n");
}

#[test]
fn simplification_levels_parse() {
    for flag in ["-O0", "-O1", "-O2", "-O3", "-O"] {
        let file = model_file(TOGGLE);
        checker()
            .args([flag, "5", file.path().to_str().unwrap()])
            .assert()
            .code(10);
    }
}

#[test]
fn plain_and_no_clone_run() {
    let file = model_file(TOGGLE);
    checker()
        .args(["-p", "--no-clone", "5", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stdout("u0\n1\nb0\n0\n\n\n.\n");
}

mod failure {
    use super::*;

    #[test]
    fn unknown_backend() {
        checker()
            .args(["--backend=minisat", "0"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("unknown backend"));
    }

    #[test]
    fn missing_file() {
        checker()
            .args(["0", "no-such-model.aag"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("can not read"));
    }

    #[test]
    fn two_files() {
        checker()
            .args(["a.aag", "b.aag"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("two files"));
    }

    #[test]
    fn parse_error() {
        let file = model_file(b"not an aiger file\n");
        checker()
            .arg(file.path().to_str().unwrap())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("malformed header"));
    }

    #[test]
    fn constraints_are_rejected() {
        let file = model_file(b"aag 1 1 0 0 0 1 1\n2\n2\n2\n");
        checker()
            .arg(file.path().to_str().unwrap())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("environment constraints"));
    }

    #[test]
    fn multiple_bad_properties_are_rejected() {
        let file = model_file(b"aag 1 1 0 0 0 2\n2\n2\n3\n");
        checker()
            .arg(file.path().to_str().unwrap())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("bad state properties"));
    }
}

#[test]
fn help_exits_cleanly() {
    checker()
        .arg("-h")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn verbose_statistics_on_stderr() {
    let file = model_file(TOGGLE);
    checker()
        .args(["-v", "2", file.path().to_str().unwrap()])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("latches in COI"));
}
