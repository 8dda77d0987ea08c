//! Command line surface of the checker.

use clap::{ArgAction, Parser};

/// Bounded model checking of AIGER circuits.
///
/// Reads an and-inverter graph with a single bad state property (or a
/// single output, treated as one) and searches for a violating trace of
/// length at most MAXK.
#[derive(Parser, Debug)]
#[command(name = "aigbmc")]
pub struct Args {
    /// Increase verbosity; stackable.
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Render unforced witness bits as 'x' instead of '0'.
    #[arg(short = 'x')]
    pub x_stimulus: bool,

    /// Suppress witness emission; only the verdict lines are produced.
    #[arg(short = 'n')]
    pub no_witness: bool,

    /// Plain mode hint to the SAT oracle: disable advanced in-processing.
    #[arg(short = 'p')]
    pub plain: bool,

    /// Simplification aggressiveness, 0 (none) to 3.
    #[arg(
        short = 'O',
        value_name = "LEVEL",
        num_args = 0..=1,
        default_value_t = 3,
        default_missing_value = "1",
        value_parser = clap::value_parser!(u32).range(0..=3)
    )]
    pub simplify: u32,

    /// Disable clone-and-retry escalation.
    #[arg(long = "no-clone")]
    pub no_clone: bool,

    /// SAT backend to use: cdcl or dpll. Backends without clone support
    /// imply --no-clone.
    #[arg(long = "backend", value_name = "NAME", default_value = "cdcl")]
    pub backend: String,

    /// The bound (a number, default 0) and/or the AIGER file, in either
    /// order; with no file, standard input is read.
    #[arg(value_name = "ARG")]
    pub positional: Vec<String>,
}

/// Splits the free-order positionals into the bound and the input file.
pub fn classify_positionals(positional: &[String]) -> Result<(u32, Option<String>), String> {
    let mut max_k = 0;
    let mut input: Option<String> = None;
    for arg in positional {
        if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
            max_k = arg
                .parse()
                .map_err(|_| format!("bound '{arg}' out of range"))?;
        } else if let Some(first) = &input {
            return Err(format!("two files specified '{first}' and '{arg}'"));
        } else {
            input = Some(arg.clone());
        }
    }
    Ok((max_k, input))
}
