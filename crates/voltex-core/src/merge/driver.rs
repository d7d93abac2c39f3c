//! Merge of two collections into an output tree.
//!
//! The right collection provides the directory layout; the left collection
//! overlays it. Songs are placed in directories named after their romanized
//! titles, so metadata lookups run before anything is copied:
//!
//! - shared and right-only songs go to `output/<right game dir>/<romanization>`
//! - left-only songs go to `output/<game>/<romanization>`

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::thread;

use crate::collection::Collection;
use crate::config::metadata::DEFAULT_BATCH_SIZE;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::merge::{MergeOutcome, Origin, merge_songs, sanitize};
use crate::metadata::{GameInfo, MetadataFallback, MetadataSource};
use crate::song::Song;

/// Titles of two collections split by where they appear, each list sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub shared: Vec<String>,
    pub right_only: Vec<String>,
    pub left_only: Vec<String>,
}

pub fn partition(left: &Collection, right: &Collection) -> Partition {
    let mut result = Partition::default();
    for title in right.titles() {
        if left.contains(title) {
            result.shared.push(title.to_string());
        } else {
            result.right_only.push(title.to_string());
        }
    }
    result.left_only = left
        .titles()
        .filter(|title| !right.contains(title))
        .map(str::to_string)
        .collect();
    result
}

/// Output directory chosen for one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub title: String,
    pub origin: Origin,
    pub destination: PathBuf,
}

/// A song that could not be given an output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub title: String,
    pub origin: Origin,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub placements: Vec<Placement>,
    pub unresolved: Vec<Unresolved>,
}

impl MergePlan {
    pub fn get(&self, title: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.title == title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Songs transferred, per origin
    pub shared: usize,
    pub right_only: usize,
    pub left_only: usize,
    /// Files copied and files already present at their destination
    pub copied: usize,
    pub skipped: usize,
    /// Shared titles whose charts were combined
    pub merged: usize,
    /// Shared titles copied from the left collection only
    pub unmergeable: Vec<String>,
    pub unresolved: Vec<String>,
    /// `(title, error)` for songs whose copy failed
    pub failed: Vec<(String, String)>,
}

impl MergeReport {
    pub fn songs(&self) -> usize {
        self.shared + self.right_only + self.left_only
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.failed.is_empty()
    }

    fn count(&mut self, origin: Origin) {
        match origin {
            Origin::Shared => self.shared += 1,
            Origin::RightOnly => self.right_only += 1,
            Origin::LeftOnly => self.left_only += 1,
        }
    }
}

pub struct MergeDriver<'a> {
    output: PathBuf,
    metadata: &'a dyn MetadataSource,
    fallback: &'a dyn MetadataFallback,
    sink: &'a dyn EventSink,
    batch_size: usize,
}

impl<'a> MergeDriver<'a> {
    pub fn new(
        output: impl Into<PathBuf>,
        metadata: &'a dyn MetadataSource,
        fallback: &'a dyn MetadataFallback,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            output: output.into(),
            metadata,
            fallback,
            sink,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Maximum titles per metadata batch; values below 1 are treated as 1
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Romanize titles in concurrent batches.
    ///
    /// Every title gets an entry. Titles of a failed batch map to `None`.
    pub fn romanize(&self, titles: &[String]) -> BTreeMap<String, Option<String>> {
        let metadata = self.metadata;
        let results = thread::scope(|scope| {
            let handles: Vec<_> = titles
                .chunks(self.batch_size)
                .map(|batch| (batch, scope.spawn(move || metadata.romanize_batch(batch))))
                .collect();
            handles
                .into_iter()
                .map(|(batch, handle)| (batch, handle.join()))
                .collect::<Vec<_>>()
        });

        let mut romanizations = BTreeMap::new();
        for (batch, result) in results {
            match result {
                Ok(Ok(pairs)) => romanizations.extend(pairs),
                Ok(Err(e)) => self.batch_failed(batch, e.to_string()),
                Err(_) => self.batch_failed(batch, "lookup thread panicked".to_string()),
            }
            for title in batch {
                romanizations.entry(title.clone()).or_insert(None);
            }
        }
        let requested: BTreeSet<&str> = titles.iter().map(String::as_str).collect();
        romanizations.retain(|title, _| requested.contains(title.as_str()));
        romanizations
    }

    /// Look up base games, one concurrent worker per batch of titles.
    ///
    /// Failed lookups yield an empty [`GameInfo`].
    pub fn lookup_games(&self, titles: &[String]) -> BTreeMap<String, GameInfo> {
        let metadata = self.metadata;
        let results = thread::scope(|scope| {
            let handles: Vec<_> = titles
                .chunks(self.batch_size)
                .map(|batch| {
                    let handle = scope.spawn(move || {
                        batch
                            .iter()
                            .map(|title| (title.clone(), metadata.lookup_game(title)))
                            .collect::<Vec<_>>()
                    });
                    (batch, handle)
                })
                .collect();
            handles
                .into_iter()
                .map(|(batch, handle)| (batch, handle.join()))
                .collect::<Vec<_>>()
        });

        let mut games = BTreeMap::new();
        for (batch, result) in results {
            let Ok(lookups) = result else {
                self.batch_failed(batch, "lookup thread panicked".to_string());
                continue;
            };
            for (title, lookup) in lookups {
                let info = lookup.unwrap_or_else(|e| {
                    self.sink.emit(&Event::MetadataLookupFailed {
                        title: title.clone(),
                        reason: e.to_string(),
                    });
                    GameInfo::default()
                });
                games.insert(title, info);
            }
        }
        for title in titles {
            games.entry(title.clone()).or_default();
        }
        games
    }

    fn batch_failed(&self, batch: &[String], reason: String) {
        self.sink.emit(&Event::MetadataBatchFailed {
            titles: batch.len(),
            reason,
        });
    }

    /// Choose an output directory for every song of both collections
    pub fn plan(&self, left: &Collection, right: &Collection) -> MergePlan {
        let partition = partition(left, right);
        self.sink.emit(&Event::MergeStarted {
            shared: partition.shared.len(),
            right_only: partition.right_only.len(),
            left_only: partition.left_only.len(),
        });

        let mut plan = MergePlan::default();

        let right_titles: Vec<String> = right.titles().map(str::to_string).collect();
        let romanizations = self.romanize(&right_titles);
        for (title, song) in right.iter() {
            let origin = if left.contains(title) {
                Origin::Shared
            } else {
                Origin::RightOnly
            };
            let found = romanizations.get(title).cloned().flatten();
            let placed = self
                .romanization_or_fallback(title, found)
                .and_then(|romanization| {
                    let game_dir = right_game_dir(song, right.path())?;
                    let name = directory_name(&romanization)?;
                    Ok(self.output.join(game_dir).join(name))
                });
            self.place(&mut plan, title, origin, placed);
        }

        let games = self.lookup_games(&partition.left_only);
        for title in &partition.left_only {
            let info = games.get(title).cloned().unwrap_or_default();
            let game = match info.game {
                Some(game) => Some(game),
                None => {
                    self.sink.emit(&Event::GameMissing {
                        title: title.clone(),
                    });
                    self.fallback.game(title)
                }
            };
            let placed = game
                .ok_or_else(|| "no base game".to_string())
                .and_then(|game| {
                    let romanization = self.romanization_or_fallback(title, info.romanization)?;
                    let game = directory_name(&game)?;
                    let name = directory_name(&romanization)?;
                    Ok(self.output.join(game).join(name))
                });
            self.place(&mut plan, title, Origin::LeftOnly, placed);
        }

        plan
    }

    fn romanization_or_fallback(
        &self,
        title: &str,
        found: Option<String>,
    ) -> std::result::Result<String, String> {
        if let Some(romanization) = found {
            return Ok(romanization);
        }
        self.sink.emit(&Event::RomanizationMissing {
            title: title.to_string(),
        });
        self.fallback
            .romanization(title)
            .ok_or_else(|| "no romanization".to_string())
    }

    fn place(
        &self,
        plan: &mut MergePlan,
        title: &str,
        origin: Origin,
        placed: std::result::Result<PathBuf, String>,
    ) {
        match placed {
            Ok(destination) => plan.placements.push(Placement {
                title: title.to_string(),
                origin,
                destination,
            }),
            Err(reason) => {
                self.sink.emit(&Event::PlacementUnresolved {
                    title: title.to_string(),
                    reason: reason.clone(),
                });
                plan.unresolved.push(Unresolved {
                    title: title.to_string(),
                    origin,
                    reason,
                });
            }
        }
    }

    /// Copy every placed song to its destination.
    ///
    /// Shared titles are merged first; when that is impossible the left song
    /// is copied alone. A failed copy is reported and the run continues.
    pub fn execute(&self, plan: &MergePlan, left: &Collection, right: &Collection) -> MergeReport {
        let mut report = MergeReport {
            unresolved: plan.unresolved.iter().map(|u| u.title.clone()).collect(),
            ..MergeReport::default()
        };

        for placement in &plan.placements {
            let title = &placement.title;
            let song = match placement.origin {
                Origin::Shared => match (left.get(title), right.get(title)) {
                    (Some(l), Some(r)) => match merge_songs(l.clone(), r.clone()) {
                        MergeOutcome::Merged(canonical) => {
                            self.sink.emit(&Event::SongsMerged {
                                title: title.clone(),
                                canonical: canonical.dirname.clone(),
                            });
                            report.merged += 1;
                            Some(canonical)
                        }
                        MergeOutcome::Unmergeable(l, _) => {
                            self.sink.emit(&Event::Overlaid {
                                title: title.clone(),
                                kept: l.dirname.clone(),
                            });
                            report.unmergeable.push(title.clone());
                            Some(l)
                        }
                    },
                    _ => None,
                },
                Origin::RightOnly => right.get(title).cloned(),
                Origin::LeftOnly => left.get(title).cloned(),
            };

            let Some(song) = song else {
                self.copy_failed(&mut report, title, "song is not in its collection".to_string());
                continue;
            };
            match self.transfer(&song, placement) {
                Ok((copied, skipped)) => {
                    report.count(placement.origin);
                    report.copied += copied;
                    report.skipped += skipped;
                }
                Err(e) => self.copy_failed(&mut report, title, e.to_string()),
            }
        }

        self.sink.emit(&Event::MergeFinished {
            songs: report.songs(),
            files: report.copied,
        });
        report
    }

    fn transfer(&self, song: &Song, placement: &Placement) -> Result<(usize, usize)> {
        let copy = song.copy_to(&placement.destination)?;
        self.sink.emit(&Event::SongCopied {
            title: placement.title.clone(),
            origin: placement.origin,
            dest: placement.destination.clone(),
            copied: copy.copied,
            skipped: copy.skipped,
        });
        Ok((copy.copied, copy.skipped))
    }

    fn copy_failed(&self, report: &mut MergeReport, title: &str, reason: String) {
        self.sink.emit(&Event::CopyFailed {
            title: title.to_string(),
            reason: reason.clone(),
        });
        report.failed.push((title.to_string(), reason));
    }

    /// Plan and execute in one go
    pub fn run(&self, left: &Collection, right: &Collection) -> MergeReport {
        let plan = self.plan(left, right);
        self.execute(&plan, left, right)
    }
}

/// Parent of a right song's directory, relative to the right root
fn right_game_dir(song: &Song, root: &Path) -> std::result::Result<PathBuf, String> {
    song.dirname
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .ok_or_else(|| format!("{:?} is outside the collection root", song.dirname))
}

fn directory_name(name: &str) -> std::result::Result<String, String> {
    let sanitized = sanitize(name);
    if sanitized.is_empty() {
        Err(format!("{name:?} is not a usable directory name"))
    } else {
        Ok(sanitized)
    }
}
