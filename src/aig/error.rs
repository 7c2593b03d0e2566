use thiserror::Error;

use crate::cnf::SatError;

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// A different node with the given id already exists.
    #[error("a different node with id={0} already exists")]
    DuplicateId(NodeId),

    /// The id 0 is reserved for the `False` constant node only.
    #[error("id=0 is for node False only")]
    IdZeroButNotFalse,

    /// The node with given id does not exist.
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// The operation is only defined on AND gates.
    #[error("node with id={0} is not an and gate")]
    NotAnAndGate(NodeId),

    /// The AIG has reached an invalid state. This should never happen.
    /// For example, a fanin of some node is not registered as a fanout of its driver.
    /// If this error is raised, a pass broke the fanin/fanout consistency and the run must stop.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    ParserError(#[from] ParserError),

    /// Just forwarding a [`SatError`].
    ///
    /// [`SatError`]: crate::cnf::SatError
    #[error("{0}")]
    SatError(#[from] SatError),
}

/// Error returned when reading a circuit or a pattern file failed.
///
/// It is defined here because the `parser` module is private.
#[derive(Debug, Error)]
pub enum ParserError {
    /// All features are not supported (only combinational ASCII AIGER).
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Invalid token, something else was expected.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// A simulation pattern is malformed (wrong length or not made of `0`/`1`).
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// An IO error occured (file doesn't exist, broken simulation log, ...).
    #[error("io error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ParserError {
    fn from(value: std::io::Error) -> Self {
        ParserError::IoError(value.to_string())
    }
}

impl From<std::io::Error> for AigError {
    fn from(value: std::io::Error) -> Self {
        ParserError::from(value).into()
    }
}
