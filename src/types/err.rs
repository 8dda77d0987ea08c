/*!
Error types used in the library.

- Parse errors surface from the AIGER reader, with a line number where one is known.
- Unsupported errors reject well-formed models the checker does not handle.
- Oracle errors cover capability gaps and contract violations at the SAT boundary.

Every fatal path converges on [ErrorKind]; the binary prints a single
diagnostic and exits non-zero.
*/

/// A union of varied error kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// An error while reading an AIGER model.
    Parse(ParseError),

    /// A well-formed model the checker does not handle.
    Unsupported(UnsupportedError),

    /// An error at the SAT oracle boundary.
    Oracle(OracleError),

    /// An I/O failure, carried as its rendered message.
    Io(String),

    /// The run was interrupted by a termination signal.
    Interrupted,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Unsupported(e) => write!(f, "unsupported model: {e}"),
            Self::Oracle(e) => write!(f, "oracle error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        ErrorKind::Io(e.to_string())
    }
}

/// Errors while reading an AIGER model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The header line is missing or not of the form `aag|aig M I L O A [B C J F]`.
    Header,

    /// The header counts are inconsistent with the maximum variable index.
    Counts,

    /// Some unspecific problem at a specific line.
    Line(usize),

    /// A literal out of range or of the wrong polarity at a specific line.
    Literal(usize),

    /// A node was defined twice, at the noted line.
    Redefined(usize),

    /// The input ended before all declared sections were read.
    UnexpectedEnd,

    /// A corrupt delta code in the binary and-gate section.
    Delta,

    /// A literal refers to a node no section defines.
    UndefinedNode(u32),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header => write!(f, "malformed header"),
            Self::Counts => write!(f, "header counts are inconsistent"),
            Self::Line(n) => write!(f, "malformed line {n}"),
            Self::Literal(n) => write!(f, "invalid literal at line {n}"),
            Self::Redefined(n) => write!(f, "node redefined at line {n}"),
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::Delta => write!(f, "corrupt delta code in binary and section"),
            Self::UndefinedNode(var) => write!(f, "literal refers to undefined node {var}"),
        }
    }
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Well-formed models the checker rejects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnsupportedError {
    /// The model contains neither an output nor a bad state property.
    NoProperty,

    /// More than one bad state property.
    MultipleBad(usize),

    /// More than one output and no bad state property.
    MultipleOutputs(usize),

    /// Environment constraints are present.
    Constraints(usize),
}

impl std::fmt::Display for UnsupportedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProperty => write!(f, "model contains no output nor bad state property"),
            Self::MultipleBad(n) => write!(f, "can not handle {n} bad state properties"),
            Self::MultipleOutputs(n) => {
                write!(f, "can not handle {n} outputs (without bad state property)")
            }
            Self::Constraints(n) => write!(f, "can not handle {n} environment constraints"),
        }
    }
}

impl From<UnsupportedError> for ErrorKind {
    fn from(e: UnsupportedError) -> Self {
        ErrorKind::Unsupported(e)
    }
}

/// Errors at the SAT oracle boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OracleError {
    /// The backend does not support cloning.
    CloneUnsupported,

    /// A solve without a conflict budget came back inconclusive.
    UnexpectedUnknown,

    /// No backend is registered under the requested name.
    UnknownBackend(String),
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CloneUnsupported => write!(f, "backend does not support cloning"),
            Self::UnexpectedUnknown => write!(f, "unbudgeted solve came back inconclusive"),
            Self::UnknownBackend(name) => write!(f, "unknown backend '{name}'"),
        }
    }
}

impl From<OracleError> for ErrorKind {
    fn from(e: OracleError) -> Self {
        ErrorKind::Oracle(e)
    }
}
