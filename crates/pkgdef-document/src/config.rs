//! Options for a live [`Document`](crate::Document).

/// What happens to a processing request that arrives while a pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprocessPolicy {
    /// Remember the request and run one more pass once the current one ends.
    #[default]
    Coalesce,
    /// Discard the request. The published snapshot may lag behind the text
    /// until the next request arrives.
    Drop,
}

/// # Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | `reprocess` | [`ReprocessPolicy::Coalesce`] |
/// | `channel_capacity` | `16` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    pub reprocess: ReprocessPolicy,
    /// Number of `Processed` notifications buffered per subscriber before
    /// the oldest are skipped.
    pub channel_capacity: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            reprocess: ReprocessPolicy::default(),
            channel_capacity: 16,
        }
    }
}

impl DocumentOptions {
    pub fn with_reprocess(mut self, reprocess: ReprocessPolicy) -> Self {
        self.reprocess = reprocess;
        self
    }
}
