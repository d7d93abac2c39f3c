use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Difficulty slot of a chart.
///
/// Descriptor files spell these `light`, `challenge`, `extended` and
/// `infinite`; the display codes are NOV/ADV/EXH/MXM. `Infinite` is the top
/// slot shared by every bonus difficulty (INF/GRV/HVN/VVD/XCD/MXM).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Difficulty {
    Light = 0,
    Challenge = 1,
    Extended = 2,
    Infinite = 3,
}

impl Difficulty {
    /// Number of difficulty slots in a song
    pub const COUNT: usize = 4;

    /// The top (MXM-class) difficulty, subject of the promotion rule when merging
    pub const TOP: Self = Self::Infinite;

    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::from_repr)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Name as written in descriptor files (e.g., "infinite")
    pub fn descriptor_name(&self) -> &'static str {
        self.into()
    }

    /// Get the display code (e.g., "NOV", "MXM")
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Light => "NOV",
            Self::Challenge => "ADV",
            Self::Extended => "EXH",
            Self::Infinite => "MXM",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_difficulty_from_index() {
        assert_eq!(Difficulty::from_index(0), Some(Difficulty::Light));
        assert_eq!(Difficulty::from_index(3), Some(Difficulty::Infinite));
        assert_eq!(Difficulty::from_index(4), None);
        assert_eq!(Difficulty::from_index(usize::MAX), None);
    }

    #[test]
    fn test_difficulty_from_descriptor_name() {
        assert_eq!(Difficulty::from_str("light").unwrap(), Difficulty::Light);
        assert_eq!(
            Difficulty::from_str("challenge").unwrap(),
            Difficulty::Challenge
        );
        assert_eq!(
            Difficulty::from_str("extended").unwrap(),
            Difficulty::Extended
        );
        assert_eq!(
            Difficulty::from_str("infinite").unwrap(),
            Difficulty::Infinite
        );
        assert!(Difficulty::from_str("maximum").is_err());
        assert!(Difficulty::from_str("Light").is_err());
    }

    #[test]
    fn test_difficulty_codes() {
        let codes: Vec<_> = Difficulty::iter().map(|d| d.short_name()).collect();
        assert_eq!(codes, ["NOV", "ADV", "EXH", "MXM"]);
        assert_eq!(Difficulty::Infinite.to_string(), "MXM");
        assert_eq!(Difficulty::Extended.descriptor_name(), "extended");
    }

    #[test]
    fn test_difficulty_serde_uses_descriptor_names() {
        let json = serde_json::to_string(&Difficulty::Challenge).unwrap();
        assert_eq!(json, "\"challenge\"");
        let parsed: Difficulty = serde_json::from_str("\"infinite\"").unwrap();
        assert_eq!(parsed, Difficulty::TOP);
    }
}
