use feed_core::{FetchFailure, FetchedPage, PageMeta, PageRequest};
use feed_logging::feed_warn;
use serde_json::Value;
use url::Url;

use crate::{FailureKind, FeedEndpoint, ItemParser, TransportError, TransportResponse};

/// Header carrying the page number the server actually returned.
pub const PAGE_HEADER: &str = "pagination-page";
/// Header carrying the total number of items across all pages.
pub const PAGE_COUNT_HEADER: &str = "pagination-count";

/// `base_url + path` with `page` and `limit` appended to its query.
pub fn build_page_url(
    endpoint: &FeedEndpoint,
    request: PageRequest,
) -> Result<String, TransportError> {
    let raw = format!("{}{}", endpoint.base_url, endpoint.path);
    let mut url = Url::parse(&raw)
        .map_err(|err| TransportError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))?;
    url.query_pairs_mut()
        .append_pair("page", &request.page.to_string())
        .append_pair("limit", &request.page_size.to_string());
    Ok(url.into())
}

pub fn parse_page_meta(response: &TransportResponse) -> PageMeta {
    PageMeta {
        page: header_u32(response, PAGE_HEADER),
        total_items: header_u32(response, PAGE_COUNT_HEADER),
    }
}

fn header_u32(response: &TransportResponse, name: &str) -> Option<u32> {
    response.header(name).and_then(|value| value.trim().parse().ok())
}

/// Turns a response into a page; a record the parser rejects is skipped, not fatal.
pub fn decode_page<T>(
    response: &TransportResponse,
    parser: &dyn ItemParser<Item = T>,
) -> Result<FetchedPage<T>, FetchFailure> {
    if !response.is_success() {
        return Err(FetchFailure::HttpStatus(response.status));
    }

    let records: Vec<Value> = serde_json::from_slice(&response.body)
        .map_err(|err| FetchFailure::Decode(err.to_string()))?;

    let mut items = Vec::with_capacity(records.len());
    let mut skipped_records = 0;
    for (position, record) in records.iter().enumerate() {
        match parser.parse(record) {
            Ok(item) => items.push(item),
            Err(err) => {
                feed_warn!("Skipping record {} of page: {}", position, err);
                skipped_records += 1;
            }
        }
    }

    Ok(FetchedPage {
        meta: parse_page_meta(response),
        items,
        skipped_records,
    })
}
