use derive_more::Display;

// Flat error taxonomy for the whole crate. Logic errors indicate a bug in
// the caller or in here; runtime errors are recoverable at the engine
// boundary and terminate the run with a single fatal report.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DrcError {
    #[display(fmt = "logic error: {}", _0)]
    Logic(String),
    #[display(fmt = "runtime error: {}", _0)]
    Runtime(String),
    #[display(fmt = "arithmetic overflow in geometry computation")]
    Overflow,
    #[display(fmt = "degenerate geometry: {}", _0)]
    Degenerate(String),
}

impl std::error::Error for DrcError {}

pub type Result<T> = std::result::Result<T, DrcError>;
