//! Recognized descriptor header fields.
//!
//! Header lines are `key=value`. Only the keys needed to build a collection
//! are recognized; everything else in the header is ignored.

use std::str::FromStr;

use strum::{EnumString, IntoStaticStr};

use super::Difficulty;

/// Descriptor header key
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ChartField {
    #[strum(serialize = "title")]
    Title,
    #[strum(serialize = "artist")]
    Artist,
    #[strum(serialize = "effect")]
    Effector,
    #[strum(serialize = "illustrator")]
    Illustrator,
    #[strum(serialize = "difficulty")]
    Difficulty,
    #[strum(serialize = "level")]
    Level,
    #[strum(serialize = "m")]
    Music,
    #[strum(serialize = "jacket")]
    Jacket,
}

impl ChartField {
    /// Look up a header key; unknown keys yield `None`
    pub fn from_key(key: &str) -> Option<Self> {
        Self::from_str(key).ok()
    }

    pub fn key(&self) -> &'static str {
        self.into()
    }
}

/// A single typed attribute assignment produced from one header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeUpdate {
    Title(String),
    Artist(String),
    Effector(String),
    Illustrator(String),
    Difficulty(Difficulty),
    Level(i32),
    Music(Vec<String>),
    Jacket(String),
}

/// Reason a recognized field carried an unusable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    InvalidLevel(String),
    UnknownDifficulty(String),
}

impl AttributeUpdate {
    /// Turn a raw header value into an attribute update.
    pub fn from_field(field: ChartField, value: &str) -> Result<Self, FieldError> {
        Ok(match field {
            ChartField::Title => Self::Title(value.to_string()),
            ChartField::Artist => Self::Artist(value.to_string()),
            ChartField::Effector => Self::Effector(value.to_string()),
            ChartField::Illustrator => Self::Illustrator(value.to_string()),
            ChartField::Difficulty => Self::Difficulty(
                Difficulty::from_str(value)
                    .map_err(|_| FieldError::UnknownDifficulty(value.to_string()))?,
            ),
            ChartField::Level => Self::Level(
                value
                    .trim()
                    .parse()
                    .map_err(|_| FieldError::InvalidLevel(value.to_string()))?,
            ),
            ChartField::Music => Self::Music(value.split(';').map(str::to_string).collect()),
            ChartField::Jacket => Self::Jacket(value.to_string()),
        })
    }
}

/// Split a header line into an update.
///
/// Returns `Ok(None)` for lines without `=` and for unrecognized keys.
pub fn parse_header_line(line: &str) -> Result<Option<AttributeUpdate>, FieldError> {
    let Some((key, value)) = line.split_once('=') else {
        return Ok(None);
    };
    match ChartField::from_key(key) {
        Some(field) => AttributeUpdate::from_field(field, value).map(Some),
        None => Ok(None),
    }
}
