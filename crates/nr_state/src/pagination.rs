//! Page accumulation for infinite lists.
//!
//! A [`PagedList`] hands out at most one [`PageRequest`] at a time, tagged
//! with the query generation it was issued for. Responses are folded in with
//! [`PagedList::complete`]; a response whose request has been superseded by a
//! query change is dropped instead of merged.

use nr_core::{Pagination, Result};
use tracing::debug;

/// Accumulated items plus the cursor that produced them. The three fields
/// only ever change together.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState<T> {
    pub items: Vec<T>,
    /// Last confirmed page, 0 before the first page arrives
    pub current_page: u32,
    pub has_more: bool,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            has_more: true,
        }
    }
}

/// Page 1 replaces `existing`; later pages are appended after it.
pub fn apply_page<T>(existing: Vec<T>, incoming: Vec<T>, page: u32, total_pages: u32) -> PageState<T> {
    let page = page.max(1);
    let items = if page == 1 {
        incoming
    } else {
        let mut items = existing;
        items.extend(incoming);
        items
    };
    PageState {
        items,
        current_page: page,
        has_more: page < total_pages,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<Q> {
    pub query: Q,
    pub page: u32,
    generation: u64,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied { received: usize },
    /// The query changed while the request was outstanding
    Stale,
}

#[derive(Debug)]
pub struct PagedList<T, Q> {
    query: Q,
    generation: u64,
    next_seq: u64,
    in_flight: Option<u64>,
    state: PageState<T>,
    last_error: Option<String>,
}

impl<T, Q: Clone + PartialEq> PagedList<T, Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            generation: 0,
            next_seq: 0,
            in_flight: None,
            state: PageState::default(),
            last_error: None,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.state.items
    }

    pub fn state(&self) -> &PageState<T> {
        &self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch to a new query, discarding results and any outstanding request.
    /// Returns false (and keeps everything) when the query is unchanged.
    pub fn set_query(&mut self, query: Q) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query;
        self.reset();
        true
    }

    /// Drop accumulated results for the current query.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.state = PageState::default();
        self.last_error = None;
    }

    /// Request page 1 again. `None` while another request is outstanding.
    pub fn begin_refresh(&mut self) -> Option<PageRequest<Q>> {
        self.begin(1)
    }

    /// Request the page after the last confirmed one. `None` while another
    /// request is outstanding or when the server reported no further pages.
    pub fn begin_next(&mut self) -> Option<PageRequest<Q>> {
        if !self.state.has_more {
            return None;
        }
        self.begin(self.state.current_page + 1)
    }

    fn begin(&mut self, page: u32) -> Option<PageRequest<Q>> {
        if self.in_flight.is_some() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        Some(PageRequest {
            query: self.query.clone(),
            page,
            generation: self.generation,
            seq,
        })
    }

    fn is_current(&self, request: &PageRequest<Q>) -> bool {
        request.generation == self.generation && self.in_flight == Some(request.seq)
    }

    /// Fold a response in. Failures leave items and cursor untouched and are
    /// returned after being recorded as the last error.
    pub fn complete(
        &mut self,
        request: &PageRequest<Q>,
        result: Result<(Vec<T>, Pagination)>,
    ) -> Result<Completion> {
        if !self.is_current(request) {
            match &result {
                Ok(_) => debug!("Discarding stale response for page {}", request.page),
                Err(e) => debug!("Discarding stale failure for page {}: {}", request.page, e),
            }
            return Ok(Completion::Stale);
        }
        self.in_flight = None;

        match result {
            Ok((incoming, pagination)) => {
                let received = incoming.len();
                let existing = std::mem::take(&mut self.state.items);
                self.state = apply_page(existing, incoming, pagination.page, pagination.pages);
                self.last_error = None;
                Ok(Completion::Applied { received })
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
