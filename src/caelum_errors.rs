use hifitime::Epoch;
use thiserror::Error;

/// Error taxonomy for the event-search core.
///
/// A predicate that never transitions inside a search window is **not** an
/// error: the search functions return `Ok(None)` for that case. Every
/// variant here aborts the enclosing search and is surfaced to the caller,
/// who may safely re-run the whole search since provider fetches are
/// idempotent.
#[derive(Error, Debug)]
pub enum CaelumError {
    #[error("ephemeris provider unreachable: {0}")]
    ProviderUnavailable(#[from] reqwest::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("invalid search window: start {start} is not before end {end}")]
    InvalidWindow { start: Epoch, end: Epoch },

    #[error("dual-body series mismatch: {0}")]
    SeriesMismatch(String),

    #[error("refinement did not converge after {0} levels")]
    RefinementDepthExceeded(u32),
}

impl PartialEq for CaelumError {
    fn eq(&self, other: &Self) -> bool {
        use CaelumError::*;
        match (self, other) {
            // transport errors are not comparable: equal if same variant
            (ProviderUnavailable(_), ProviderUnavailable(_)) => true,

            (MalformedResponse(a), MalformedResponse(b)) => a == b,
            (SeriesMismatch(a), SeriesMismatch(b)) => a == b,
            (RefinementDepthExceeded(a), RefinementDepthExceeded(b)) => a == b,
            (
                InvalidWindow { start: a, end: b },
                InvalidWindow { start: c, end: d },
            ) => a == c && b == d,

            _ => false,
        }
    }
}
