pub mod chart;
pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod metadata;
pub mod song;

pub use chart::{Chart, ChartRecord, ChartSource, Difficulty};
pub use collection::{Collection, InsertOutcome, ScanOptions, Snapshot};
pub use error::{Error, Result};
pub use events::{Event, EventSink, MemorySink, NullSink, TracingSink};
pub use merge::{
    MergeDriver, MergeOutcome, MergePlan, MergeReport, Origin, Partition, Placement, Unresolved,
    merge_songs, partition, sanitize,
};
pub use metadata::{GameInfo, MetadataFallback, MetadataSource, NoFallback, StaticMetadata};
pub use song::{
    ChartSlots, CopyReport, RejectConflicts, ScannedSong, Song, SongRecord, SongSource,
    TitleConflict, TitleResolver,
};
