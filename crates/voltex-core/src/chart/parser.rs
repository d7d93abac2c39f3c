//! Descriptor (`.ksh`) reader.
//!
//! A descriptor is a `key=value` header terminated by a blank line or a `--`
//! line, followed by the chart body. Only the header fields relevant to
//! collection building are read; the body is scanned for effect audio.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;

use crate::chart::types::ChartDraft;
use crate::chart::{Chart, FieldError, parse_header_line};
use crate::config::SOUND_EXTENSION;
use crate::error::{Error, Result};

/// Decode descriptor bytes as UTF-8, dropping a BOM and any undecodable bytes
pub fn decode_descriptor(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        text.chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect()
    } else {
        text.into_owned()
    }
}

pub(crate) fn parse_descriptor(path: &Path, include_sfx: bool) -> Result<Chart> {
    let bytes = fs::read(path)?;
    parse_descriptor_text(path, &decode_descriptor(&bytes), include_sfx)
}

pub(crate) fn parse_descriptor_text(path: &Path, text: &str, include_sfx: bool) -> Result<Chart> {
    let mut draft = ChartDraft::default();
    let mut lines = text.lines().enumerate();

    for (index, raw) in lines.by_ref() {
        let line = raw.trim();
        if line.is_empty() || line == "--" {
            break;
        }

        match parse_header_line(line) {
            Ok(Some(update)) => draft.apply(update),
            Ok(None) => {}
            Err(FieldError::InvalidLevel(value)) => {
                return Err(Error::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: format!("level is not an integer: {:?}", value),
                });
            }
            Err(FieldError::UnknownDifficulty(value)) => {
                return Err(Error::UnknownDifficulty {
                    path: path.to_path_buf(),
                    value,
                });
            }
        }
    }

    let difficulty = draft
        .difficulty
        .ok_or_else(|| Error::MissingDifficulty(path.to_path_buf()))?;

    let sounds = include_sfx.then(|| collect_sounds(lines.map(|(_, line)| line)));

    let filename = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf());

    Ok(Chart {
        filename,
        custom_path: false,
        title: draft.title,
        artist: draft.artist,
        effector: draft.effector,
        illustrator: draft.illustrator,
        difficulty,
        level: draft.level,
        music: draft.music,
        jacket: draft.jacket,
        sounds,
    })
}

/// Collect effect audio file names mentioned in chart body lines.
///
/// Best-effort: any `=`/`;` separated token containing `.ogg` counts, so a
/// line mentioning `.ogg` for another reason will be picked up too.
pub fn collect_sounds<'a>(lines: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    let mut sounds = BTreeSet::new();
    for line in lines.map(str::trim) {
        if !line.contains(SOUND_EXTENSION) {
            continue;
        }
        for segment in line.split('=').filter(|s| s.contains(SOUND_EXTENSION)) {
            sounds.extend(
                segment
                    .split(';')
                    .filter(|piece| piece.contains(SOUND_EXTENSION))
                    .map(str::to_string),
            );
        }
    }
    sounds
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::chart::Difficulty;

    const SAMPLE: &str = "title=Foo\n\
        artist=Bar\n\
        effect=Baz\n\
        difficulty=infinite\n\
        level=17\n\
        m=a.ogg;b.ogg\n\
        \n\
        c.ogg=1;d.ogg=2\n";

    fn parse(text: &str, include_sfx: bool) -> Result<Chart> {
        parse_descriptor_text(Path::new("/songs/foo/inf.ksh"), text, include_sfx)
    }

    #[test]
    fn test_parse_sample_with_sfx() {
        let chart = parse(SAMPLE, true).unwrap();
        assert_eq!(chart.title, "Foo");
        assert_eq!(chart.artist, "Bar");
        assert_eq!(chart.effector.as_deref(), Some("Baz"));
        assert_eq!(chart.difficulty, Difficulty::Infinite);
        assert_eq!(chart.level, Some(17));
        assert_eq!(chart.music, ["a.ogg", "b.ogg"]);
        assert_eq!(
            chart.sounds,
            Some(BTreeSet::from(["c.ogg".to_string(), "d.ogg".to_string()]))
        );
        assert_eq!(chart.filename, PathBuf::from("inf.ksh"));
        assert!(!chart.custom_path);
    }

    #[test]
    fn test_parse_without_sfx_leaves_sounds_unset() {
        let chart = parse(SAMPLE, false).unwrap();
        assert_eq!(chart.sounds, None);
    }

    #[test]
    fn test_header_ends_at_dashes() {
        let text = "title=Foo\ndifficulty=light\n--\ntitle=Body\nlevel=x\n";
        let chart = parse(text, false).unwrap();
        assert_eq!(chart.title, "Foo");
        assert_eq!(chart.level, None);
    }

    #[test]
    fn test_lines_without_equals_are_skipped() {
        let text = "title=Foo\nnot a field\ndifficulty=extended\nlevel=15\n";
        let chart = parse(text, false).unwrap();
        assert_eq!(chart.difficulty, Difficulty::Extended);
        assert_eq!(chart.level, Some(15));
    }

    #[test]
    fn test_invalid_level_is_parse_error() {
        let err = parse("title=Foo\ndifficulty=light\nlevel=abc\n", false).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_difficulty_fails() {
        let err = parse("title=Foo\ndifficulty=maximum\n", false).unwrap_err();
        assert!(matches!(err, Error::UnknownDifficulty { value, .. } if value == "maximum"));
    }

    #[test]
    fn test_missing_difficulty_fails() {
        let err = parse("title=Foo\nlevel=3\n", false).unwrap_err();
        assert!(matches!(err, Error::MissingDifficulty(_)));
    }

    #[test]
    fn test_crlf_lines() {
        let text = "title=Foo\r\ndifficulty=challenge\r\nm=a.ogg\r\n--\r\nfx-l=se.ogg;100\r\n";
        let chart = parse(text, true).unwrap();
        assert_eq!(chart.title, "Foo");
        assert_eq!(chart.music, ["a.ogg"]);
        assert_eq!(chart.sounds, Some(BTreeSet::from(["se.ogg".to_string()])));
    }

    #[test]
    fn test_collect_sounds_dedups() {
        let body = [
            "#define_fx sw type=SwitchAudio;fileName=hit.ogg",
            "fx-l=hit.ogg;100",
            "0000|00|--",
            "fx-r=other.ogg",
        ];
        let sounds = collect_sounds(body.into_iter());
        assert_eq!(
            sounds,
            BTreeSet::from(["hit.ogg".to_string(), "other.ogg".to_string()])
        );
    }

    #[test]
    fn test_decode_strips_bom_and_invalid_bytes() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"title=A");
        bytes.push(0xFF);
        bytes.extend_from_slice(b"B\n");
        assert_eq!(decode_descriptor(&bytes), "title=AB\n");
    }

    #[test]
    fn test_parse_descriptor_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exh.ksh");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("title=曲名\ndifficulty=extended\nlevel=16\n--\n".as_bytes());
        fs::write(&path, bytes).unwrap();

        let chart = Chart::parse(&path, true).unwrap();
        assert_eq!(chart.title, "曲名");
        assert_eq!(chart.sounds, Some(BTreeSet::new()));
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = Chart::parse(&temp.path().join("none.ksh"), false).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
