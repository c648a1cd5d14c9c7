/// The browser address bar, reduced to its query string.
pub trait History: Send {
    /// Query string of the current entry, without the leading `?`.
    fn current_query(&self) -> String;

    /// Adds an entry and makes it current, dropping any forward entries.
    fn push(&mut self, query: &str);
}

/// In-process session history with back/forward.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial_query: &str) -> Self {
        Self {
            entries: vec![initial_query.trim_start_matches('?').to_string()],
            index: 0,
        }
    }

    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn current_query(&self) -> String {
        self.entries[self.index].clone()
    }

    fn push(&mut self, query: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(query.to_string());
        self.index = self.entries.len() - 1;
    }
}
