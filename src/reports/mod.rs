/*!
Verdicts and witnesses.

The checker classifies a run as one of three verdicts, printed as a digit
on the first output line:

- `1` --- the property is violated within the bound; a witness follows.
- `0` --- the property cannot be violated: the model is combinational and
  the single step is unsatisfiable, or the bad literal was already fixed
  false during preprocessing.
- `2` --- the bound was exhausted without an answer either way.

A witness carries the solver's initial latch values and one input vector
per time step. Bits are rendered `0`/`1`; a bit the model leaves
unconstrained renders as `x` when asked to.
*/

/// Terminal classification of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// A trace of length ≤ K reaches a bad state.
    Falsified,

    /// No trace ever reaches a bad state.
    Unreachable,

    /// Inconclusive within the bound.
    Unknown,
}

impl Verdict {
    /// The digit of the verdict line.
    pub fn digit(self) -> u8 {
        match self {
            Self::Falsified => 1,
            Self::Unreachable => 0,
            Self::Unknown => 2,
        }
    }

    /// The process exit code mirroring the verdict.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Falsified => 10,
            Self::Unreachable => 20,
            Self::Unknown => 30,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// A counterexample trace: model values as −1/0/+1 per bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    /// The bound the violation was found at.
    pub depth: u32,

    /// Initial value per latch, in section order.
    pub latches: Vec<i8>,

    /// One value per input, per time step 0 ..= depth.
    pub stimulus: Vec<Vec<i8>>,
}

impl Witness {
    fn bit(value: i8, x: bool) -> char {
        match value {
            v if v > 0 => '1',
            0 if x => 'x',
            _ => '0',
        }
    }

    /// The initial latch line of the witness.
    pub fn latch_line(&self, x: bool) -> String {
        self.latches.iter().map(|&v| Self::bit(v, x)).collect()
    }

    /// The stimulus line of one time step.
    pub fn stimulus_line(&self, time: u32, x: bool) -> String {
        self.stimulus[time as usize]
            .iter()
            .map(|&v| Self::bit(v, x))
            .collect()
    }

    /// The latch values as plain bits, unconstrained bits as 0.
    pub fn latch_bits(&self) -> Vec<bool> {
        self.latches.iter().map(|&v| v > 0).collect()
    }

    /// The stimulus as plain bits, unconstrained bits as 0.
    pub fn stimulus_bits(&self) -> Vec<Vec<bool>> {
        self.stimulus
            .iter()
            .map(|step| step.iter().map(|&v| v > 0).collect())
            .collect()
    }
}

/// Everything a finished run reports.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub verdict: Verdict,

    /// The last bound the loop worked on.
    pub bound: u32,

    /// The counterexample, on a falsified property with witnesses enabled.
    pub witness: Option<Witness>,
}
