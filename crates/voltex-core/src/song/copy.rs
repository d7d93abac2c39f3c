//! Copying a song's files into an output directory.
//!
//! Destination files that already exist are never overwritten, so running a
//! copy twice (or copying several difficulties sharing media) is safe.

use std::fs;
use std::ops::AddAssign;
use std::path::Path;

use crate::chart::{Chart, Difficulty};
use crate::error::{Error, Result};
use crate::song::Song;

/// Outcome of copying one or more charts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    /// Files whose destination already existed
    pub skipped: usize,
}

impl AddAssign for CopyReport {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.skipped += other.skipped;
    }
}

impl Song {
    /// Copy every file of every chart into `dest`
    pub fn copy_to(&self, dest: &Path) -> Result<CopyReport> {
        fs::create_dir_all(dest)?;
        let mut report = CopyReport::default();
        for chart in self.charts.iter() {
            report += copy_chart(chart, &self.dirname, dest)?;
        }
        Ok(report)
    }

    /// Copy the files of one difficulty into `dest`; a missing chart copies nothing
    pub fn copy_difficulty_to(&self, difficulty: Difficulty, dest: &Path) -> Result<CopyReport> {
        let Some(chart) = self.charts.get(difficulty) else {
            return Ok(CopyReport::default());
        };
        fs::create_dir_all(dest)?;
        copy_chart(chart, &self.dirname, dest)
    }
}

fn copy_chart(chart: &Chart, song_dir: &Path, dest: &Path) -> Result<CopyReport> {
    let source_dir = chart.source_dir(song_dir);
    let mut report = CopyReport::default();

    for file in chart.files() {
        let Some(name) = Path::new(&file).file_name() else {
            continue;
        };
        let to = dest.join(name);
        if to.exists() {
            report.skipped += 1;
            continue;
        }

        let from = source_dir.join(name);
        if let Err(source) = fs::copy(&from, &to) {
            return Err(Error::Copy { from, to, source });
        }
        report.copied += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::song::ChartSlots;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn chart(difficulty: Difficulty, filename: PathBuf, custom_path: bool) -> Chart {
        Chart {
            filename,
            custom_path,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            effector: None,
            illustrator: None,
            difficulty,
            level: None,
            music: vec!["song.ogg".to_string()],
            jacket: Some("jk.png".to_string()),
            sounds: None,
        }
    }

    fn make_song(temp: &TempDir) -> Song {
        let song_dir = temp.path().join("src");
        fs::create_dir_all(&song_dir).unwrap();
        for name in ["nov.ksh", "exh.ksh", "song.ogg", "jk.png"] {
            write(&song_dir, name, name);
        }

        let mut charts = ChartSlots::new();
        charts.insert(chart(Difficulty::Light, "nov.ksh".into(), false));
        charts.insert(chart(Difficulty::Extended, "exh.ksh".into(), false));
        Song {
            dirname: song_dir,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            charts,
        }
    }

    #[test]
    fn test_copy_shares_media_between_charts() {
        let temp = TempDir::new().unwrap();
        let song = make_song(&temp);
        let dest = temp.path().join("out/game/Song");

        let report = song.copy_to(&dest).unwrap();
        assert_eq!(report, CopyReport { copied: 4, skipped: 2 });
        for name in ["nov.ksh", "exh.ksh", "song.ogg", "jk.png"] {
            assert!(dest.join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn test_second_copy_copies_nothing() {
        let temp = TempDir::new().unwrap();
        let song = make_song(&temp);
        let dest = temp.path().join("out");

        song.copy_to(&dest).unwrap();
        let second = song.copy_to(&dest).unwrap();
        assert_eq!(second.copied, 0);
        assert_eq!(second.skipped, 6);
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let song = make_song(&temp);
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        write(&dest, "song.ogg", "keep me");

        song.copy_to(&dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("song.ogg")).unwrap(), "keep me");
    }

    #[test]
    fn test_custom_path_chart_copies_from_its_own_directory() {
        let temp = TempDir::new().unwrap();
        let mut song = make_song(&temp);
        let other = temp.path().join("other");
        fs::create_dir_all(&other).unwrap();
        write(&other, "mxm.ksh", "mxm");
        write(&other, "song.ogg", "other audio");
        write(&other, "jk.png", "other jacket");
        song.charts
            .insert(chart(Difficulty::Infinite, other.join("mxm.ksh"), true));

        let dest = temp.path().join("out");
        let report = song.copy_difficulty_to(Difficulty::Infinite, &dest).unwrap();
        assert_eq!(report.copied, 3);
        assert_eq!(fs::read_to_string(dest.join("mxm.ksh")).unwrap(), "mxm");
        assert_eq!(
            fs::read_to_string(dest.join("song.ogg")).unwrap(),
            "other audio"
        );
    }

    #[test]
    fn test_missing_source_is_copy_error() {
        let temp = TempDir::new().unwrap();
        let song = make_song(&temp);
        fs::remove_file(song.dirname.join("jk.png")).unwrap();

        let err = song.copy_to(&temp.path().join("out")).unwrap_err();
        match err {
            Error::Copy { from, .. } => assert!(from.ends_with("jk.png")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_copy_missing_difficulty_is_noop() {
        let temp = TempDir::new().unwrap();
        let song = make_song(&temp);
        let dest = temp.path().join("out");
        let report = song.copy_difficulty_to(Difficulty::Challenge, &dest).unwrap();
        assert_eq!(report, CopyReport::default());
        assert!(!dest.exists());
    }
}
