use std::time::Duration;

/// Failures surfaced by the harness.
///
/// An unrecognized square image is deliberately not an error: it is reported
/// as [`SquareLabel::Unknown`](crate::board::SquareLabel::Unknown) so tests can
/// assert on markup drift instead of crashing on it.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The host page has not initialized the named piece of state yet.
    #[error("host state unavailable: {0}")]
    HostStateUnavailable(String),

    #[error("host did not become ready within {timeout:?} (waited {waited:?})")]
    SyncTimeout { timeout: Duration, waited: Duration },

    #[error("square ({file}, {rank}) is outside the 8x8 board")]
    OutOfBounds { file: i32, rank: i32 },

    #[error("unrecognized piece code {code} at padded cell ({file}, {rank})")]
    UnrecognizedPieceCode { code: f64, file: i32, rank: i32 },

    /// The automation substrate itself failed (script error, detached page...).
    #[error("host error: {0}")]
    Host(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::HostStateUnavailable(what.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::SyncTimeout { .. })
    }
}
