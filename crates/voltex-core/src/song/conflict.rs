use std::collections::BTreeSet;
use std::path::PathBuf;

/// Descriptors in one song directory that disagree on the title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleConflict {
    pub dirname: PathBuf,
    /// Every distinct title seen, including the first one
    pub candidates: BTreeSet<String>,
}

impl TitleConflict {
    pub fn contains(&self, title: &str) -> bool {
        self.candidates.contains(title)
    }

    /// Candidates in a stable order, for numbered selection
    pub fn candidate_list(&self) -> Vec<&str> {
        self.candidates.iter().map(String::as_str).collect()
    }
}

/// Decision point for title conflicts.
///
/// Returns the authoritative title out of `conflict.candidates`, or `None`
/// to leave the conflict unresolved.
pub trait TitleResolver {
    fn choose_title(&self, conflict: &TitleConflict) -> Option<String>;
}

/// Declines every conflict
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectConflicts;

impl TitleResolver for RejectConflicts {
    fn choose_title(&self, _conflict: &TitleConflict) -> Option<String> {
        None
    }
}

impl<F> TitleResolver for F
where
    F: Fn(&TitleConflict) -> Option<String>,
{
    fn choose_title(&self, conflict: &TitleConflict) -> Option<String> {
        self(conflict)
    }
}
