//! Songs: the charts of one music track, normally one directory.
//!
//! - `Song`, `SongRecord`, `SongSource` - song and its snapshot form
//! - `ChartSlots` - one chart per difficulty
//! - `TitleConflict`, `TitleResolver` - disagreeing titles and their resolution
//! - `CopyReport` - result of copying a song's files

mod conflict;
mod copy;
mod slots;

pub use conflict::*;
pub use copy::CopyReport;
pub use slots::ChartSlots;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{Chart, ChartRecord, ChartSource, Difficulty, rewrite_title};
use crate::config::CHART_EXTENSION;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub dirname: PathBuf,
    pub title: String,
    pub artist: String,
    pub charts: ChartSlots,
}

/// Snapshot form of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    pub dirname: PathBuf,
    /// One entry per difficulty slot
    pub charts: Vec<Option<ChartRecord>>,
}

/// Input a song can be built from
#[derive(Debug, Clone)]
pub enum SongSource<'a> {
    /// Parse every descriptor directly inside a directory
    Directory { dir: &'a Path, include_sfx: bool },
    /// Restore from a snapshot record
    Record(SongRecord),
}

/// A freshly assembled song that may still need its title settled
#[derive(Debug, Clone)]
pub struct ScannedSong {
    pub song: Song,
    pub conflict: Option<TitleConflict>,
    /// Charts replaced by a later descriptor of the same difficulty
    pub displaced: Vec<Chart>,
}

impl ScannedSong {
    /// Settle the title, asking `resolver` when the descriptors disagree.
    ///
    /// The chosen title is written to every descriptor that differs from it.
    pub fn resolve<R: TitleResolver + ?Sized>(self, resolver: &R) -> Result<Song> {
        let Self {
            mut song, conflict, ..
        } = self;
        let Some(conflict) = conflict else {
            return Ok(song);
        };

        match resolver.choose_title(&conflict) {
            Some(title) if conflict.contains(&title) => {
                song.update_title(&title)?;
                Ok(song)
            }
            _ => Err(Error::ConflictUnresolved {
                dirname: conflict.dirname,
                candidates: conflict.candidates,
            }),
        }
    }
}

/// Descriptor files directly inside `dir`, sorted by name
pub fn descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == CHART_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl Song {
    /// Build a song from the descriptors in `dir`
    pub fn scan(dir: &Path, include_sfx: bool) -> Result<ScannedSong> {
        Self::from_source(SongSource::Directory { dir, include_sfx })
    }

    /// Restore a song from its snapshot record
    pub fn from_record(record: SongRecord) -> Result<Song> {
        Self::from_source(SongSource::Record(record)).map(|scanned| scanned.song)
    }

    pub fn from_source(source: SongSource<'_>) -> Result<ScannedSong> {
        match source {
            SongSource::Directory { dir, include_sfx } => {
                let charts = descriptor_files(dir)?
                    .iter()
                    .map(|path| Chart::parse(path, include_sfx))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::assemble(dir.to_path_buf(), charts))
            }
            SongSource::Record(record) => {
                let SongRecord {
                    title,
                    artist,
                    dirname,
                    charts,
                } = record;
                let charts = charts
                    .into_iter()
                    .flatten()
                    .map(|record| {
                        Chart::from_source(ChartSource::Record {
                            record,
                            title: &title,
                            artist: &artist,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                let mut scanned = Self::assemble(dirname, charts);
                scanned.song.title = title;
                scanned.song.artist = artist;
                Ok(scanned)
            }
        }
    }

    /// Place charts into slots and detect title disagreement.
    ///
    /// The first chart's title and artist become the song's.
    fn assemble(dirname: PathBuf, charts: Vec<Chart>) -> ScannedSong {
        let mut identity: Option<(String, String)> = None;
        let mut candidates = BTreeSet::new();
        let mut slots = ChartSlots::new();
        let mut displaced = Vec::new();

        for chart in charts {
            match &identity {
                Some((title, _)) if *title != chart.title => {
                    candidates.insert(title.clone());
                    candidates.insert(chart.title.clone());
                }
                Some(_) => {}
                None => identity = Some((chart.title.clone(), chart.artist.clone())),
            }
            if let Some(old) = slots.insert(chart) {
                displaced.push(old);
            }
        }

        let (title, artist) = identity.unwrap_or_default();
        let conflict = (!candidates.is_empty()).then(|| TitleConflict {
            dirname: dirname.clone(),
            candidates,
        });

        ScannedSong {
            song: Song {
                dirname,
                title,
                artist,
                charts: slots,
            },
            conflict,
            displaced,
        }
    }

    pub fn to_record(&self) -> SongRecord {
        SongRecord {
            title: self.title.clone(),
            artist: self.artist.clone(),
            dirname: self.dirname.clone(),
            charts: self.charts.to_records(),
        }
    }

    /// Set the title of the song and of every chart whose title differs.
    ///
    /// Differing charts get their descriptor's `title=` line rewritten on
    /// disk; charts that already match are not touched.
    pub fn update_title(&mut self, new_title: &str) -> Result<()> {
        self.title = new_title.to_string();
        for chart in self.charts.iter_mut() {
            if chart.title != new_title {
                rewrite_title(&chart.descriptor_path(&self.dirname), new_title)?;
                chart.title = new_title.to_string();
            }
        }
        Ok(())
    }

    pub fn has_top_difficulty(&self) -> bool {
        self.charts.contains(Difficulty::TOP)
    }

    /// Every file used by any difficulty
    pub fn files(&self) -> BTreeSet<String> {
        self.charts.iter().flat_map(Chart::files).collect()
    }

    /// Files used by one difficulty; empty when the song lacks it
    pub fn difficulty_files(&self, difficulty: Difficulty) -> BTreeSet<String> {
        self.charts
            .get(difficulty)
            .map(|chart| chart.files().into_iter().collect())
            .unwrap_or_default()
    }
}
