use crate::{FetchFailure, FetchedPage, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<T> {
    /// Caller asked for the page after the current one.
    NextPageRequested { page_size: u32 },
    /// Caller asked to reload the feed from page one.
    RefreshRequested { page_size: u32 },
    /// Background fetch finished, successfully or not.
    PageFetched {
        token: RequestToken,
        result: Result<FetchedPage<T>, FetchFailure>,
    },
    /// Caller asked to drop everything and cancel in-flight work.
    ClearRequested,
}
