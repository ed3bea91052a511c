//! Feed engine: HTTP transport, page decoding and the apply loop that drives `feed_core`.
mod config;
mod fetcher;
mod page;
mod parser;
mod transport;
mod types;

pub use config::{FeedEndpoint, TransportSettings, DEFAULT_API_KEY_HEADER};
pub use fetcher::{Completion, FeedFetcher};
pub use page::{build_page_url, decode_page, parse_page_meta, PAGE_COUNT_HEADER, PAGE_HEADER};
pub use parser::{ItemParser, JsonRecordParser, RecordParseError};
pub use transport::{ReqwestTransport, Transport};
pub use types::{EngineError, FailureKind, TransportError, TransportResponse};

pub use feed_core::{FeedError, FetchFailure, FetchOutcome, ParsedItem};
