//! Feed core: pure pagination, dedup and request-slot state machine.
mod effect;
mod error;
mod msg;
mod state;
mod types;
mod update;

pub use effect::Effect;
pub use error::{FeedError, FetchFailure};
pub use msg::Msg;
pub use state::FeedState;
pub use types::{
    total_pages, FetchMode, FetchOutcome, FetchedPage, ItemId, PageMeta, PageRequest, Pagination,
    ParsedItem, RequestToken,
};
pub use update::update;
