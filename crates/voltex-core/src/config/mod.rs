//! Constants shared across the library.
//!
//! - File naming conventions of chart packages
//! - Snapshot file name
//! - Metadata lookup batching

/// Extension of chart descriptor files (without the dot)
pub const CHART_EXTENSION: &str = "ksh";

/// Substring identifying effect audio references in a chart body
pub const SOUND_EXTENSION: &str = ".ogg";

/// Name of the collection snapshot stored at a collection root
pub const SNAPSHOT_FILE: &str = "data.json";

/// Metadata lookup batching.
///
/// The wiki API accepts at most 50 titles per query.
pub mod metadata {
    /// Maximum number of titles per romanization batch.
    pub const DEFAULT_BATCH_SIZE: usize = 50;
}
