//! A collection: every song found under one root directory, keyed by title.
//!
//! Song directories are directories with at least one descriptor directly
//! inside. Any other directory is searched recursively. Songs found twice
//! under the same title are merged when one of them only holds the top
//! difficulty chart.

mod snapshot;

pub use snapshot::Snapshot;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::SNAPSHOT_FILE;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::merge::{MergeOutcome, merge_songs};
use crate::song::{Song, TitleResolver, descriptor_files};

/// How a collection is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Collect effect audio referenced in chart bodies
    pub include_sfx: bool,
    /// Restore from the snapshot at the root when one exists
    pub use_snapshot: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_sfx: true,
            use_snapshot: true,
        }
    }
}

/// Result of [`Collection::insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    /// Merged with the song already holding the title
    Merged,
    /// Could not be merged; the song already in the collection was kept
    Rejected(Song),
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    path: PathBuf,
    songs: BTreeMap<String, Song>,
}

impl Collection {
    /// Empty collection rooted at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            songs: BTreeMap::new(),
        }
    }

    pub fn is_song_directory(dir: &Path) -> Result<bool> {
        Ok(!descriptor_files(dir)?.is_empty())
    }

    /// Restore from the snapshot when allowed and readable, otherwise scan.
    ///
    /// A snapshot that fails to load is reported and ignored.
    pub fn open(
        root: &Path,
        options: ScanOptions,
        resolver: &dyn TitleResolver,
        sink: &dyn EventSink,
    ) -> Result<Self> {
        if options.use_snapshot {
            match Self::load_snapshot(root) {
                Ok(Some(collection)) => {
                    sink.emit(&Event::SnapshotLoaded {
                        path: collection.snapshot_path(),
                        songs: collection.len(),
                    });
                    return Ok(collection);
                }
                Ok(None) => {}
                Err(Error::NotADirectory(dir)) => return Err(Error::NotADirectory(dir)),
                Err(e) => sink.emit(&Event::SnapshotInvalid {
                    path: root.join(SNAPSHOT_FILE),
                    reason: e.to_string(),
                }),
            }
        }
        Self::scan(root, options, resolver, sink)
    }

    /// Build a collection from the directory tree under `root`.
    ///
    /// Songs and directories that fail to read are reported and skipped.
    /// Symlinked directories are not followed. Only a missing `root` is an
    /// error.
    pub fn scan(
        root: &Path,
        options: ScanOptions,
        resolver: &dyn TitleResolver,
        sink: &dyn EventSink,
    ) -> Result<Self> {
        let root = absolute_dir(root)?;
        sink.emit(&Event::ScanStarted { root: root.clone() });

        let mut collection = Self::new(root.clone());
        let mut entries = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    sink.emit(&Event::DirectoryUnreadable {
                        dir: e.path().unwrap_or(root.as_path()).to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            match Self::is_song_directory(dir) {
                Ok(true) => {
                    collection.add_song(dir, options.include_sfx, resolver, sink);
                    entries.skip_current_dir();
                }
                Ok(false) => sink.emit(&Event::NotSongDirectory {
                    dir: dir.to_path_buf(),
                }),
                Err(e) => {
                    sink.emit(&Event::DirectoryUnreadable {
                        dir: dir.to_path_buf(),
                        reason: e.to_string(),
                    });
                    entries.skip_current_dir();
                }
            }
        }

        sink.emit(&Event::ScanFinished {
            root,
            songs: collection.len(),
        });
        Ok(collection)
    }

    fn add_song(
        &mut self,
        dir: &Path,
        include_sfx: bool,
        resolver: &dyn TitleResolver,
        sink: &dyn EventSink,
    ) {
        let song_failed = |e: Error| {
            sink.emit(&Event::SongFailed {
                dir: dir.to_path_buf(),
                reason: e.to_string(),
            })
        };

        let scanned = match Song::scan(dir, include_sfx) {
            Ok(scanned) => scanned,
            Err(e) => return song_failed(e),
        };
        for chart in &scanned.displaced {
            sink.emit(&Event::ChartDisplaced {
                dir: dir.to_path_buf(),
                difficulty: chart.difficulty,
                filename: chart.filename.clone(),
            });
        }

        let had_conflict = scanned.conflict.is_some();
        let song = match scanned.resolve(resolver) {
            Ok(song) => song,
            Err(e) => return song_failed(e),
        };
        if had_conflict {
            sink.emit(&Event::TitleResolved {
                dir: dir.to_path_buf(),
                title: song.title.clone(),
            });
        }

        self.insert(song, sink);
    }

    /// Add a song, merging it with a song already holding its title.
    ///
    /// When the two cannot be merged the existing song stays and the new one
    /// is handed back.
    pub fn insert(&mut self, song: Song, sink: &dyn EventSink) -> InsertOutcome {
        let Some(existing) = self.songs.remove(&song.title) else {
            sink.emit(&Event::SongAdded {
                title: song.title.clone(),
                dir: song.dirname.clone(),
            });
            self.songs.insert(song.title.clone(), song);
            return InsertOutcome::Added;
        };

        sink.emit(&Event::DuplicateTitle {
            title: song.title.clone(),
            existing: existing.dirname.clone(),
            incoming: song.dirname.clone(),
        });

        match merge_songs(existing, song) {
            MergeOutcome::Merged(canonical) => {
                sink.emit(&Event::SongsMerged {
                    title: canonical.title.clone(),
                    canonical: canonical.dirname.clone(),
                });
                self.songs.insert(canonical.title.clone(), canonical);
                InsertOutcome::Merged
            }
            MergeOutcome::Unmergeable(existing, incoming) => {
                sink.emit(&Event::MergeFailed {
                    title: existing.title.clone(),
                    kept: existing.dirname.clone(),
                    discarded: incoming.dirname.clone(),
                });
                self.songs.insert(existing.title.clone(), existing);
                InsertOutcome::Rejected(incoming)
            }
        }
    }

    /// Restore the collection from `<root>/data.json`, if present
    pub fn load_snapshot(root: &Path) -> Result<Option<Self>> {
        let root = absolute_dir(root)?;
        let path = root.join(SNAPSHOT_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let snapshot = Snapshot::load(&path)?;
        let mut collection = Self::new(root);
        for record in snapshot.collection {
            let song = Song::from_record(record)?;
            collection.songs.insert(song.title.clone(), song);
        }
        Ok(Some(collection))
    }

    /// Write the snapshot to `<root>/data.json`, returning its path
    pub fn save_snapshot(&self, sink: &dyn EventSink) -> Result<PathBuf> {
        let path = self.snapshot_path();
        self.to_snapshot().save(&path)?;
        sink.emit(&Event::SnapshotSaved {
            path: path.clone(),
            songs: self.len(),
        });
        Ok(path)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            collection: self.songs.values().map(Song::to_record).collect(),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.path.join(SNAPSHOT_FILE)
    }

    /// Titles containing `query`, in title order
    pub fn search(&self, query: &str) -> Vec<&str> {
        self.songs
            .keys()
            .filter(|title| title.contains(query))
            .map(String::as_str)
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, title: &str) -> Option<&Song> {
        self.songs.get(title)
    }

    pub fn remove(&mut self, title: &str) -> Option<Song> {
        self.songs.remove(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.songs.contains_key(title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.songs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Song> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    Ok(std::path::absolute(dir)?)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::chart::Difficulty;
    use crate::events::{MemorySink, NullSink};
    use crate::song::{RejectConflicts, TitleConflict};

    fn write_chart(dir: &Path, file: &str, title: &str, difficulty: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(file),
            format!("title={title}\nartist=A\ndifficulty={difficulty}\nm={file}.ogg\n--\n"),
        )
        .unwrap();
    }

    fn scan(root: &Path, sink: &dyn EventSink) -> Collection {
        Collection::scan(root, ScanOptions::default(), &RejectConflicts, sink).unwrap()
    }

    #[test]
    fn test_scan_recurses_into_non_song_directories() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("pack/a"), "nov.ksh", "A", "light");
        write_chart(&temp.path().join("pack/deeper/b"), "exh.ksh", "B", "extended");
        write_chart(&temp.path().join("c"), "adv.ksh", "C", "challenge");
        fs::create_dir_all(temp.path().join("empty")).unwrap();

        let sink = MemorySink::new();
        let collection = scan(temp.path(), &sink);

        assert_eq!(collection.titles().collect::<Vec<_>>(), ["A", "B", "C"]);
        assert!(collection.path().is_absolute());
        assert_eq!(
            sink.count(|e| matches!(e, Event::NotSongDirectory { .. })),
            3
        );
        assert!(matches!(
            sink.events().last(),
            Some(Event::ScanFinished { songs: 3, .. })
        ));
    }

    #[test]
    fn test_song_directory_is_not_recursed_into() {
        let temp = TempDir::new().unwrap();
        let song = temp.path().join("a");
        write_chart(&song, "nov.ksh", "A", "light");
        write_chart(&song.join("inner"), "exh.ksh", "Inner", "extended");

        let collection = scan(temp.path(), &NullSink);
        assert!(collection.contains("A"));
        assert!(!collection.contains("Inner"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_symlinked_directories() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("song"), "nov.ksh", "S", "light");
        fs::create_dir_all(temp.path().join("pack")).unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("pack/loop")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("song"),
            temp.path().join("pack/linked_song"),
        )
        .unwrap();

        let sink = MemorySink::new();
        let collection = scan(temp.path(), &sink);

        assert_eq!(collection.titles().collect::<Vec<_>>(), ["S"]);
        assert_eq!(sink.count(|e| matches!(e, Event::DuplicateTitle { .. })), 0);
        assert_eq!(sink.count(|e| matches!(e, Event::SongAdded { .. })), 1);
        assert_eq!(
            sink.count(|e| matches!(e, Event::NotSongDirectory { .. })),
            1
        );
    }

    #[test]
    fn test_is_song_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!Collection::is_song_directory(temp.path()).unwrap());
        write_chart(temp.path(), "nov.ksh", "A", "light");
        assert!(Collection::is_song_directory(temp.path()).unwrap());
        assert!(Collection::is_song_directory(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let err = Collection::scan(
            &temp.path().join("missing"),
            ScanOptions::default(),
            &RejectConflicts,
            &NullSink,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }

    #[test]
    fn test_scan_skips_failed_songs() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("good"), "nov.ksh", "Good", "light");
        write_chart(&temp.path().join("bad"), "nov.ksh", "Bad", "gravity");
        write_chart(&temp.path().join("conflict"), "nov.ksh", "X", "light");
        write_chart(&temp.path().join("conflict"), "adv.ksh", "Y", "challenge");

        let sink = MemorySink::new();
        let collection = scan(temp.path(), &sink);

        assert_eq!(collection.titles().collect::<Vec<_>>(), ["Good"]);
        assert_eq!(sink.count(|e| matches!(e, Event::SongFailed { .. })), 2);
    }

    #[test]
    fn test_scan_resolves_conflicts_with_resolver() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("conflict");
        write_chart(&dir, "adv.ksh", "Y", "challenge");
        write_chart(&dir, "nov.ksh", "X", "light");

        let resolver = |conflict: &TitleConflict| conflict.candidate_list().last().map(|t| t.to_string());
        let sink = MemorySink::new();
        let collection =
            Collection::scan(temp.path(), ScanOptions::default(), &resolver, &sink).unwrap();

        let song = collection.get("Y").unwrap();
        assert!(song.charts.iter().all(|chart| chart.title == "Y"));
        assert_eq!(sink.count(|e| matches!(e, Event::TitleResolved { .. })), 1);
    }

    #[test]
    fn test_scan_merges_split_top_difficulty() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("a_main"), "nov.ksh", "Song", "light");
        write_chart(&temp.path().join("a_main"), "exh.ksh", "Song", "extended");
        write_chart(&temp.path().join("b_mxm"), "mxm.ksh", "Song", "infinite");

        let sink = MemorySink::new();
        let collection = scan(temp.path(), &sink);

        assert_eq!(collection.len(), 1);
        let song = collection.get("Song").unwrap();
        assert!(song.dirname.ends_with("a_main"));
        let top = song.charts.get(Difficulty::Infinite).unwrap();
        assert!(top.custom_path);
        assert!(top.filename.is_absolute());
        assert!(top.filename.ends_with("b_mxm/mxm.ksh"));
        assert_eq!(sink.count(|e| matches!(e, Event::SongsMerged { .. })), 1);
    }

    #[test]
    fn test_scan_never_yields_duplicate_titles() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("a"), "nov.ksh", "Song", "light");
        write_chart(&temp.path().join("b"), "nov.ksh", "Song", "light");

        let sink = MemorySink::new();
        let collection = scan(temp.path(), &sink);

        assert_eq!(collection.len(), 1);
        assert!(collection.get("Song").unwrap().dirname.ends_with("a"));
        assert_eq!(sink.count(|e| matches!(e, Event::MergeFailed { .. })), 1);
    }

    #[test]
    fn test_insert_outcomes() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("a"), "nov.ksh", "Song", "light");
        write_chart(&temp.path().join("b"), "nov.ksh", "Song", "light");
        let a = Song::scan(&temp.path().join("a"), false).unwrap().song;
        let b = Song::scan(&temp.path().join("b"), false).unwrap().song;

        let mut collection = Collection::new(temp.path());
        assert_eq!(collection.insert(a, &NullSink), InsertOutcome::Added);
        match collection.insert(b.clone(), &NullSink) {
            InsertOutcome::Rejected(song) => assert_eq!(song, b),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip_and_open() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("a"), "nov.ksh", "A", "light");
        write_chart(&temp.path().join("b"), "mxm.ksh", "B", "infinite");

        let collection = scan(temp.path(), &NullSink);
        let sink = MemorySink::new();
        let path = collection.save_snapshot(&sink).unwrap();
        assert_eq!(path, collection.path().join(SNAPSHOT_FILE));
        assert_eq!(sink.count(|e| matches!(e, Event::SnapshotSaved { songs: 2, .. })), 1);

        // Snapshot is preferred over the directory tree
        write_chart(&temp.path().join("c"), "nov.ksh", "C", "light");
        let sink = MemorySink::new();
        let restored =
            Collection::open(temp.path(), ScanOptions::default(), &RejectConflicts, &sink)
                .unwrap();
        assert_eq!(restored.titles().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(restored.get("A"), collection.get("A"));
        assert_eq!(sink.count(|e| matches!(e, Event::SnapshotLoaded { .. })), 1);

        let options = ScanOptions {
            use_snapshot: false,
            ..ScanOptions::default()
        };
        let rescanned = Collection::open(temp.path(), options, &RejectConflicts, &NullSink).unwrap();
        assert_eq!(rescanned.len(), 3);
    }

    #[test]
    fn test_open_falls_back_to_scan_on_corrupt_snapshot() {
        let temp = TempDir::new().unwrap();
        write_chart(&temp.path().join("a"), "nov.ksh", "A", "light");
        fs::write(temp.path().join(SNAPSHOT_FILE), "{ not json").unwrap();

        assert!(Collection::load_snapshot(temp.path()).is_err());

        let sink = MemorySink::new();
        let collection =
            Collection::open(temp.path(), ScanOptions::default(), &RejectConflicts, &sink)
                .unwrap();
        assert_eq!(collection.titles().collect::<Vec<_>>(), ["A"]);
        assert_eq!(sink.count(|e| matches!(e, Event::SnapshotInvalid { .. })), 1);
        assert_eq!(sink.count(|e| matches!(e, Event::SnapshotLoaded { .. })), 0);
        assert_eq!(sink.count(|e| matches!(e, Event::ScanFinished { .. })), 1);
    }

    #[test]
    fn test_open_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let err = Collection::open(
            &temp.path().join("missing"),
            ScanOptions::default(),
            &RejectConflicts,
            &NullSink,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }

    #[test]
    fn test_load_snapshot_absent() {
        let temp = TempDir::new().unwrap();
        assert!(Collection::load_snapshot(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_search() {
        let temp = TempDir::new().unwrap();
        for (dir, title) in [("a", "Blue Sky"), ("b", "Sky High"), ("c", "Ocean")] {
            write_chart(&temp.path().join(dir), "nov.ksh", title, "light");
        }
        let collection = scan(temp.path(), &NullSink);

        assert_eq!(collection.search("Sky"), ["Blue Sky", "Sky High"]);
        assert!(collection.search("sky").is_empty());
        assert_eq!(collection.search("").len(), 3);
    }
}
