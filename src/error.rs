use thiserror::Error;

/// Errors shared by every structure in this crate.
///
/// Construction either succeeds and produces a fully valid structure, or it
/// returns one of these variants. Query methods that have no meaningful
/// answer (e.g. `rank` on an index of length zero) also surface one of
/// these instead of panicking. `select`/`select_zero` not finding a match is
/// a normal, total outcome and is represented by `Option::None` rather than
/// an `Error` variant (see [`OutOfBounds`](Error::OutOfBounds) for the
/// analogous "positional" failures).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} is out of bounds for a structure of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("operation has no meaningful result on an empty structure")]
    EmptyStructure,

    #[error("invalid input for Elias-Fano construction: {reason}")]
    InvalidInput { reason: &'static str },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
