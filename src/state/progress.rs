use std::fmt;

/// Number of pages between progress checkpoints
pub const CHECKPOINT_INTERVAL: usize = 5;

/// Crawl progress for a single site, rendered as "visited/total"
///
/// `total` is the current frontier length, so it grows as links are
/// discovered and is not a final page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub visited: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(visited: usize, total: usize) -> Self {
        Self { visited, total }
    }

    /// Progress after finishing the frontier entry at `index`
    pub fn after(index: usize, frontier_len: usize) -> Self {
        Self::new(index + 1, frontier_len)
    }

    /// Returns true if the entry at `index` is a checkpoint
    ///
    /// Checkpoints fall on every fifth page: indices 4, 9, 14, ...
    pub fn is_checkpoint(index: usize) -> bool {
        (index + 1) % CHECKPOINT_INTERVAL == 0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.visited, self.total)
    }
}
