use crate::chart::{Chart, ChartRecord, Difficulty};

/// Fixed set of difficulty slots, at most one chart per slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSlots([Option<Chart>; Difficulty::COUNT]);

impl ChartSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, difficulty: Difficulty) -> Option<&Chart> {
        self.0[difficulty.index()].as_ref()
    }

    pub fn get_mut(&mut self, difficulty: Difficulty) -> Option<&mut Chart> {
        self.0[difficulty.index()].as_mut()
    }

    pub fn contains(&self, difficulty: Difficulty) -> bool {
        self.0[difficulty.index()].is_some()
    }

    /// Put a chart in its difficulty slot, returning the chart it replaced
    pub fn insert(&mut self, chart: Chart) -> Option<Chart> {
        let index = chart.difficulty.index();
        self.0[index].replace(chart)
    }

    pub fn take(&mut self, difficulty: Difficulty) -> Option<Chart> {
        self.0[difficulty.index()].take()
    }

    /// Present charts in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        self.0.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chart> {
        self.0.iter_mut().flatten()
    }

    /// Difficulties that have a chart, in slot order
    pub fn difficulties(&self) -> Vec<Difficulty> {
        self.iter().map(|chart| chart.difficulty).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot form: one entry per slot, `None` for missing difficulties
    pub fn to_records(&self) -> Vec<Option<ChartRecord>> {
        self.0
            .iter()
            .map(|slot| slot.as_ref().map(Chart::to_record))
            .collect()
    }
}
