use std::collections::HashSet;

use crate::{
    total_pages, FeedError, FetchMode, FetchedPage, ItemId, PageRequest, Pagination, ParsedItem,
    RequestToken,
};

/// A fetch that occupies its mode's slot until the result comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) token: RequestToken,
    pub(crate) page_size: u32,
}

/// Accumulated feed plus the bookkeeping needed to extend it.
///
/// Only [`crate::update`] mutates this; everything public is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState<T> {
    items: Vec<ParsedItem<T>>,
    ids: HashSet<ItemId>,
    pagination: Pagination,
    next_page: Option<InFlight>,
    refresh: Option<InFlight>,
    epoch: u64,
    next_seq: u64,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
            pagination: Pagination::default(),
            next_page: None,
            refresh: None,
            epoch: 0,
            next_seq: 1,
        }
    }
}

impl<T> FeedState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).map(|entry| &entry.item)
    }

    pub fn item_at(&self, index: usize) -> Result<&T, FeedError> {
        self.get(index).ok_or(FeedError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn position_of_id(&self, id: &str) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.items.iter().position(|entry| entry.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|entry| &entry.item)
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_fetching(&self, mode: FetchMode) -> bool {
        self.slot(mode).is_some()
    }

    fn slot(&self, mode: FetchMode) -> &Option<InFlight> {
        match mode {
            FetchMode::NextPage => &self.next_page,
            FetchMode::Refresh => &self.refresh,
        }
    }

    fn slot_mut(&mut self, mode: FetchMode) -> &mut Option<InFlight> {
        match mode {
            FetchMode::NextPage => &mut self.next_page,
            FetchMode::Refresh => &mut self.refresh,
        }
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    pub(crate) fn reset_current_page(&mut self) {
        self.pagination.current_page = 0;
    }

    /// Occupies the slot for `mode` and returns what to fetch.
    pub(crate) fn begin_fetch(
        &mut self,
        mode: FetchMode,
        page_size: u32,
    ) -> (RequestToken, PageRequest) {
        let token = RequestToken {
            mode,
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        *self.slot_mut(mode) = Some(InFlight { token, page_size });
        let request = PageRequest {
            page: self.pagination.current_page.saturating_add(1),
            page_size,
        };
        (token, request)
    }

    /// Releases the slot if `token` still owns it.
    pub(crate) fn finish_fetch(&mut self, token: RequestToken) -> Option<InFlight> {
        let slot = self.slot_mut(token.mode);
        if slot.as_ref().is_some_and(|in_flight| in_flight.token == token) {
            slot.take()
        } else {
            None
        }
    }

    /// Releases every slot, returning the modes that were occupied.
    pub(crate) fn release_all(&mut self) -> Vec<FetchMode> {
        [FetchMode::NextPage, FetchMode::Refresh]
            .into_iter()
            .filter(|mode| self.slot_mut(*mode).take().is_some())
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.pagination = Pagination::default();
    }
}

impl<T: Clone> FeedState<T> {
    /// Merges a fetched page and returns the items that were added.
    pub(crate) fn apply_page(
        &mut self,
        page: FetchedPage<T>,
        page_size: u32,
        replacing: bool,
    ) -> Vec<T> {
        let total_items = page.meta.total_items.unwrap_or(page_size);
        self.pagination.current_page = page.meta.page.unwrap_or(0);
        self.pagination.total_items = total_items;
        self.pagination.total_pages = total_pages(total_items, page_size);

        let mut batch_ids = HashSet::with_capacity(page.items.len());
        let accepted: Vec<ParsedItem<T>> = page
            .items
            .into_iter()
            .filter(|entry| replacing || !self.ids.contains(&entry.id))
            .filter(|entry| batch_ids.insert(entry.id.clone()))
            .collect();
        let added = accepted.iter().map(|entry| entry.item.clone()).collect();

        if replacing {
            self.items = accepted;
            self.ids = batch_ids;
        } else {
            self.items.extend(accepted);
            self.ids.extend(batch_ids);
        }
        self.pagination.has_loaded_once = true;
        added
    }
}

impl<T: PartialEq> FeedState<T> {
    pub fn index_of(&self, item: &T) -> Result<usize, FeedError> {
        self.items
            .iter()
            .position(|entry| &entry.item == item)
            .ok_or(FeedError::NotFound)
    }
}
