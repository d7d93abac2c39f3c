//! Diagnostic and progress events.
//!
//! The library reports what it does through an injected [`EventSink`]
//! instead of logging directly. [`TracingSink`] forwards events to `tracing`.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::chart::Difficulty;
use crate::merge::Origin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ScanStarted {
        root: PathBuf,
    },
    ScanFinished {
        root: PathBuf,
        songs: usize,
    },
    SnapshotLoaded {
        path: PathBuf,
        songs: usize,
    },
    SnapshotSaved {
        path: PathBuf,
        songs: usize,
    },
    SnapshotInvalid {
        path: PathBuf,
        reason: String,
    },
    NotSongDirectory {
        dir: PathBuf,
    },
    DirectoryUnreadable {
        dir: PathBuf,
        reason: String,
    },
    SongAdded {
        title: String,
        dir: PathBuf,
    },
    /// A later descriptor with the same difficulty replaced an earlier one
    ChartDisplaced {
        dir: PathBuf,
        difficulty: Difficulty,
        filename: PathBuf,
    },
    TitleResolved {
        dir: PathBuf,
        title: String,
    },
    SongFailed {
        dir: PathBuf,
        reason: String,
    },
    DuplicateTitle {
        title: String,
        existing: PathBuf,
        incoming: PathBuf,
    },
    SongsMerged {
        title: String,
        canonical: PathBuf,
    },
    /// Neither or both songs had a top difficulty chart
    MergeFailed {
        title: String,
        kept: PathBuf,
        discarded: PathBuf,
    },
    /// A shared title could not be merged; the left song replaces the right one
    Overlaid {
        title: String,
        kept: PathBuf,
    },
    MergeStarted {
        shared: usize,
        right_only: usize,
        left_only: usize,
    },
    MetadataBatchFailed {
        titles: usize,
        reason: String,
    },
    MetadataLookupFailed {
        title: String,
        reason: String,
    },
    RomanizationMissing {
        title: String,
    },
    GameMissing {
        title: String,
    },
    PlacementUnresolved {
        title: String,
        reason: String,
    },
    SongCopied {
        title: String,
        origin: Origin,
        dest: PathBuf,
        copied: usize,
        skipped: usize,
    },
    CopyFailed {
        title: String,
        reason: String,
    },
    MergeFinished {
        songs: usize,
        files: usize,
    },
}

/// Receiver for library events
pub trait EventSink: Sync {
    fn emit(&self, event: &Event);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &Event) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &Event) {
        match event {
            Event::ScanStarted { root } => info!("Scanning collection at {:?}", root),
            Event::ScanFinished { root, songs } => {
                info!("Found {} songs under {:?}", songs, root)
            }
            Event::SnapshotLoaded { path, songs } => {
                info!("Loaded {} songs from snapshot {:?}", songs, path)
            }
            Event::SnapshotSaved { path, songs } => {
                info!("Saved {} songs to snapshot {:?}", songs, path)
            }
            Event::SnapshotInvalid { path, reason } => {
                warn!("Ignoring unreadable snapshot {:?}: {}", path, reason)
            }
            Event::NotSongDirectory { dir } => {
                debug!("Directory {:?} is not a song directory", dir)
            }
            Event::DirectoryUnreadable { dir, reason } => {
                warn!("Cannot read directory {:?}: {}", dir, reason)
            }
            Event::SongAdded { title, dir } => debug!("Adding {} located at {:?}", title, dir),
            Event::ChartDisplaced {
                dir,
                difficulty,
                filename,
            } => warn!(
                "Duplicate {} chart in {:?}, {:?} was replaced",
                difficulty, dir, filename
            ),
            Event::TitleResolved { dir, title } => {
                info!("Title conflict at {:?} resolved as {}", dir, title)
            }
            Event::SongFailed { dir, reason } => warn!("Skipping song at {:?}: {}", dir, reason),
            Event::DuplicateTitle {
                title,
                existing,
                incoming,
            } => warn!(
                "Song {} at {:?} already exists at {:?}",
                title, incoming, existing
            ),
            Event::SongsMerged { title, canonical } => {
                info!("Merged {} under {:?}", title, canonical)
            }
            Event::MergeFailed {
                title,
                kept,
                discarded,
            } => warn!(
                "Failed to merge {}: kept {:?}, discarded {:?}",
                title, kept, discarded
            ),
            Event::Overlaid { title, kept } => {
                debug!("Keeping left copy of {} from {:?}", title, kept)
            }
            Event::MergeStarted {
                shared,
                right_only,
                left_only,
            } => info!(
                "Merging {} shared, {} right-only and {} left-only songs",
                shared, right_only, left_only
            ),
            Event::MetadataBatchFailed { titles, reason } => {
                warn!("Metadata batch of {} titles failed: {}", titles, reason)
            }
            Event::MetadataLookupFailed { title, reason } => {
                warn!("Metadata lookup for {} failed: {}", title, reason)
            }
            Event::RomanizationMissing { title } => {
                warn!("Romanization for {} was not found", title)
            }
            Event::GameMissing { title } => warn!("Base game for {} was not found", title),
            Event::PlacementUnresolved { title, reason } => {
                warn!("Cannot place {}: {}", title, reason)
            }
            Event::SongCopied {
                title,
                origin,
                dest,
                copied,
                skipped,
            } => info!(
                "Transferred {} ({}) to {:?}: {} copied, {} already present",
                title, origin, dest, copied, skipped
            ),
            Event::CopyFailed { title, reason } => warn!("Copy of {} failed: {}", title, reason),
            Event::MergeFinished { songs, files } => {
                info!("Merge complete: {} songs, {} files copied", songs, files)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(&Event::ScanStarted {
            root: PathBuf::from("/a"),
        });
        sink.emit(&Event::NotSongDirectory {
            dir: PathBuf::from("/a/b"),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::ScanStarted { .. }));
        assert_eq!(
            sink.count(|e| matches!(e, Event::NotSongDirectory { .. })),
            1
        );
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        NullSink.emit(&Event::MergeFinished { songs: 0, files: 0 });
    }
}
