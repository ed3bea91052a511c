use crate::FetchFailure;

/// Stable identifier used for deduplication.
pub type ItemId = String;

/// What a completion callback receives: the newly added items, or why none were.
pub type FetchOutcome<T> = Result<Vec<T>, FetchFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Incremental "load next page" that appends with dedup.
    NextPage,
    /// "Refresh from page one" that replaces the feed.
    Refresh,
}

impl FetchMode {
    pub fn is_replacing(self) -> bool {
        matches!(self, FetchMode::Refresh)
    }
}

/// Issued for every fetch and compared when its result comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub mode: FetchMode,
    /// Feed generation at issue time. Bumped by clear and by refresh start.
    pub epoch: u64,
    /// Monotonic across the lifetime of the state; never reused.
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

/// Pagination values as reported by the server, before fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageMeta {
    pub page: Option<u32>,
    pub total_items: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem<T> {
    pub id: ItemId,
    pub item: T,
}

impl<T> ParsedItem<T> {
    pub fn new(id: impl Into<ItemId>, item: T) -> Self {
        Self {
            id: id.into(),
            item,
        }
    }
}

/// One decoded page, ready to be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage<T> {
    pub meta: PageMeta,
    pub items: Vec<ParsedItem<T>>,
    /// Records dropped by the item parser.
    pub skipped_records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u32,
    pub has_loaded_once: bool,
}

impl Pagination {
    pub fn is_exhausted(&self) -> bool {
        self.has_loaded_once && self.current_page == self.total_pages
    }
}

/// `ceil(total_items / page_size)`; zero when `page_size` is zero.
pub fn total_pages(total_items: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}
