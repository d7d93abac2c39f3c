//! Merging songs and whole collections.
//!
//! [`merge_songs`] folds a top difficulty chart living in its own directory
//! into the song that has the other difficulties. [`MergeDriver`] merges two
//! collections into an output tree.

mod driver;
mod sanitize;

pub use driver::*;
pub use sanitize::sanitize;

use std::fmt;

use crate::chart::Difficulty;
use crate::song::Song;

/// Where a song of a cross-collection merge comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// Present in both collections
    Shared,
    RightOnly,
    LeftOnly,
}

impl Origin {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::RightOnly => "right",
            Self::LeftOnly => "left",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The canonical song, holding the promoted top difficulty chart
    Merged(Song),
    /// Neither or both songs had a top difficulty chart; returned untouched
    Unmergeable(Song, Song),
}

/// Merge two songs sharing a title.
///
/// Exactly one of them must have a top difficulty chart. That chart is moved
/// into the other song with `custom_path` set, so its files are still read
/// from its own directory. The result does not depend on argument order.
pub fn merge_songs(a: Song, b: Song) -> MergeOutcome {
    let top = Difficulty::TOP;
    let (mut main, mut mxm) = match (a.charts.contains(top), b.charts.contains(top)) {
        (false, true) => (a, b),
        (true, false) => (b, a),
        _ => return MergeOutcome::Unmergeable(a, b),
    };

    let Some(mut chart) = mxm.charts.take(top) else {
        return MergeOutcome::Unmergeable(main, mxm);
    };
    if !chart.custom_path {
        if let Some(name) = chart.filename.file_name() {
            chart.filename = mxm.dirname.join(name);
        }
        chart.custom_path = true;
    }
    main.charts.insert(chart);

    MergeOutcome::Merged(main)
}
