use std::collections::VecDeque;

pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// Recent search queries, most recent first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(SEARCH_HISTORY_LIMIT),
            limit: SEARCH_HISTORY_LIMIT,
        }
    }
}

impl SearchHistory {
    /// Moves the query to the front. Blank queries are ignored.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.limit == 0 {
            return false;
        }
        self.entries.retain(|entry| entry != query);
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.limit);
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
