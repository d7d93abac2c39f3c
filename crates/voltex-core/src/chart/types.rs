use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{AttributeUpdate, Difficulty, parser};
use crate::error::Result;

/// One difficulty's descriptor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    /// Descriptor file name, relative to the owning song directory unless
    /// `custom_path` is set (then it is the full path)
    pub filename: PathBuf,
    /// Set when the chart's files live outside the owning song directory.
    /// Only ever set by promotion during a merge.
    pub custom_path: bool,
    pub title: String,
    pub artist: String,
    pub effector: Option<String>,
    pub illustrator: Option<String>,
    pub difficulty: Difficulty,
    pub level: Option<i32>,
    /// Index 0 is the clean mix, index 1 (if present) the SFX-included mix
    pub music: Vec<String>,
    pub jacket: Option<String>,
    /// Extra effect audio referenced in the chart body, `None` when not collected
    pub sounds: Option<BTreeSet<String>>,
}

/// Snapshot form of a chart. Title and artist live on the owning song record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub filename: PathBuf,
    #[serde(default)]
    pub custom_path: bool,
    #[serde(default)]
    pub effector: Option<String>,
    #[serde(default)]
    pub illustrator: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub music: Vec<String>,
    #[serde(default)]
    pub jacket: Option<String>,
    #[serde(default)]
    pub sounds: Option<BTreeSet<String>>,
}

/// Input a chart can be built from
#[derive(Debug, Clone)]
pub enum ChartSource<'a> {
    /// Parse a descriptor file on disk
    Descriptor { path: &'a Path, include_sfx: bool },
    /// Restore from a snapshot record, with title/artist supplied by the song
    Record {
        record: ChartRecord,
        title: &'a str,
        artist: &'a str,
    },
}

/// Header attributes gathered before the difficulty is known
#[derive(Debug, Default)]
pub(crate) struct ChartDraft {
    pub title: String,
    pub artist: String,
    pub effector: Option<String>,
    pub illustrator: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub level: Option<i32>,
    pub music: Vec<String>,
    pub jacket: Option<String>,
}

impl ChartDraft {
    pub fn apply(&mut self, update: AttributeUpdate) {
        match update {
            AttributeUpdate::Title(v) => self.title = v,
            AttributeUpdate::Artist(v) => self.artist = v,
            AttributeUpdate::Effector(v) => self.effector = Some(v),
            AttributeUpdate::Illustrator(v) => self.illustrator = Some(v),
            AttributeUpdate::Difficulty(v) => self.difficulty = Some(v),
            AttributeUpdate::Level(v) => self.level = Some(v),
            AttributeUpdate::Music(v) => self.music = v,
            AttributeUpdate::Jacket(v) => self.jacket = Some(v),
        }
    }
}

impl Chart {
    /// Parse a descriptor file
    pub fn parse(path: &Path, include_sfx: bool) -> Result<Self> {
        Self::from_source(ChartSource::Descriptor { path, include_sfx })
    }

    pub fn from_source(source: ChartSource<'_>) -> Result<Self> {
        match source {
            ChartSource::Descriptor { path, include_sfx } => {
                parser::parse_descriptor(path, include_sfx)
            }
            ChartSource::Record {
                record,
                title,
                artist,
            } => Ok(Self {
                filename: record.filename,
                custom_path: record.custom_path,
                title: title.to_string(),
                artist: artist.to_string(),
                effector: record.effector,
                illustrator: record.illustrator,
                difficulty: record.difficulty,
                level: record.level,
                music: record.music,
                jacket: record.jacket,
                sounds: record.sounds,
            }),
        }
    }

    pub fn to_record(&self) -> ChartRecord {
        ChartRecord {
            filename: self.filename.clone(),
            custom_path: self.custom_path,
            effector: self.effector.clone(),
            illustrator: self.illustrator.clone(),
            difficulty: self.difficulty,
            level: self.level,
            music: self.music.clone(),
            jacket: self.jacket.clone(),
            sounds: self.sounds.clone(),
        }
    }

    /// Files this chart needs: descriptor, jacket, music, then sounds
    pub fn files(&self) -> Vec<String> {
        let mut files = vec![self.filename.to_string_lossy().into_owned()];
        files.extend(self.jacket.iter().cloned());
        files.extend(self.music.iter().cloned());
        if let Some(sounds) = &self.sounds {
            files.extend(sounds.iter().cloned());
        }
        files
    }

    /// Directory holding this chart's files, given the owning song's directory
    pub fn source_dir<'a>(&'a self, song_dir: &'a Path) -> &'a Path {
        if self.custom_path {
            self.filename.parent().unwrap_or(song_dir)
        } else {
            song_dir
        }
    }

    /// Full path of the descriptor file, given the owning song's directory
    pub fn descriptor_path(&self, song_dir: &Path) -> PathBuf {
        if self.custom_path {
            self.filename.clone()
        } else {
            song_dir.join(&self.filename)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chart() -> Chart {
        Chart {
            filename: PathBuf::from("mxm.ksh"),
            custom_path: false,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            effector: Some("Effector".to_string()),
            illustrator: None,
            difficulty: Difficulty::Infinite,
            level: Some(18),
            music: vec!["song.ogg".to_string(), "song_f.ogg".to_string()],
            jacket: Some("jk.png".to_string()),
            sounds: Some(BTreeSet::from(["clap.ogg".to_string()])),
        }
    }

    #[test]
    fn test_files_order() {
        assert_eq!(
            make_chart().files(),
            ["mxm.ksh", "jk.png", "song.ogg", "song_f.ogg", "clap.ogg"]
        );
    }

    #[test]
    fn test_files_without_optional_parts() {
        let mut chart = make_chart();
        chart.jacket = None;
        chart.sounds = None;
        chart.music.truncate(1);
        assert_eq!(chart.files(), ["mxm.ksh", "song.ogg"]);
    }

    #[test]
    fn test_record_drops_and_restores_title() {
        let chart = make_chart();
        let record = chart.to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("title").is_none());
        assert!(json.get("artist").is_none());
        assert_eq!(json["difficulty"], "infinite");

        let restored = Chart::from_source(ChartSource::Record {
            record,
            title: "Song",
            artist: "Artist",
        })
        .unwrap();
        assert_eq!(restored, chart);
    }

    #[test]
    fn test_descriptor_path_and_source_dir() {
        let song_dir = Path::new("/songs/a");
        let mut chart = make_chart();
        assert_eq!(chart.descriptor_path(song_dir), song_dir.join("mxm.ksh"));
        assert_eq!(chart.source_dir(song_dir), song_dir);

        chart.filename = PathBuf::from("/other/b/mxm.ksh");
        chart.custom_path = true;
        assert_eq!(
            chart.descriptor_path(song_dir),
            PathBuf::from("/other/b/mxm.ksh")
        );
        assert_eq!(chart.source_dir(song_dir), Path::new("/other/b"));
    }
}
