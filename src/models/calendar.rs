use crate::models::{SceneCounts, StationId};
use crate::utils::dates::days_in_month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monthly calendar: zero-padded day → station → scene counts for that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarArtifact {
    pub days: BTreeMap<String, BTreeMap<StationId, SceneCounts>>,
}

impl CalendarArtifact {
    /// An empty calendar with one key per day of the month.
    pub fn for_month(year: i32, month: u32) -> Self {
        let days = (1..=days_in_month(year, month))
            .map(|day| (day_key(day), BTreeMap::new()))
            .collect();
        Self { days }
    }

    /// Record that `station` has data on `day`. Returns true if anything changed.
    pub fn record(&mut self, day: u32, station: StationId, counts: SceneCounts) -> bool {
        let stations = self.days.entry(day_key(day)).or_default();
        let previous = stations.insert(station, counts);
        previous != Some(counts)
    }

    pub fn stations_on(&self, day: u32) -> Option<&BTreeMap<StationId, SceneCounts>> {
        self.days.get(&day_key(day))
    }

    pub fn entry_count(&self) -> usize {
        self.days.values().map(BTreeMap::len).sum()
    }
}

pub fn day_key(day: u32) -> String {
    format!("{:02}", day)
}
