/*!
Configuration of a checking session.

A plain value handed to [BmcSession::new](crate::session::BmcSession::new);
the CLI builds one from its arguments, library users from
[Config::default] plus field updates.
*/

use std::str::FromStr;

use crate::types::err::OracleError;

/// The registered SAT backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Conflict-driven clause learning; clone and extraction capable.
    Cdcl,

    /// Plain DPLL; single-solver regime only.
    Dpll,
}

impl FromStr for BackendKind {
    type Err = OracleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "cdcl" => Ok(Self::Cdcl),
            "dpll" => Ok(Self::Dpll),
            _ => Err(OracleError::UnknownBackend(name.to_owned())),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cdcl => write!(f, "cdcl"),
            Self::Dpll => write!(f, "dpll"),
        }
    }
}

/// The primary configuration structure.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Render unforced witness bits as `x` instead of `0`.
    pub stimulus_x: bool,

    /// Emit a witness trace on a violated property.
    pub witness: bool,

    /// Ask the backend to disable in-processing.
    pub plain: bool,

    /// Simplification aggressiveness, 0 (none) to 3.
    pub simplify_effort: u32,

    /// Permit clone-and-retry escalation on backends that can clone.
    pub clone_escalation: bool,

    /// Conflicts a budgeted solve may spend before escalation.
    pub conflict_budget: u64,

    /// Which SAT backend to instantiate.
    pub backend: BackendKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stimulus_x: false,
            witness: true,
            plain: false,
            simplify_effort: 3,
            clone_escalation: true,
            conflict_budget: 1000,
            backend: BackendKind::Cdcl,
        }
    }
}
