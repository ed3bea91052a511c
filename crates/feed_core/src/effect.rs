use crate::{FetchMode, FetchOutcome, PageRequest, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<T> {
    /// Issue a GET for `request` and report back with `token`.
    StartFetch {
        token: RequestToken,
        request: PageRequest,
    },
    /// Invoke the completion registered for `mode`.
    Deliver {
        mode: FetchMode,
        outcome: FetchOutcome<T>,
    },
    /// Abort every fetch that is still running.
    CancelInFlight,
}
