use crate::models::calendar::day_key;
use crate::models::{SceneCounts, StationAttributes, StationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub instrument_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(default)]
    pub days: BTreeMap<String, SceneCounts>,
}

/// Monthly station map: station → metadata and the days it reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapArtifact {
    pub stations: BTreeMap<StationId, StationEntry>,
}

impl MapArtifact {
    /// Record a station's metadata and its scene counts for `day`.
    /// Days accumulate; the metadata is that of the latest day recorded, so
    /// re-adding an earlier day never overwrites newer metadata.
    pub fn record(
        &mut self,
        station: StationId,
        attributes: &StationAttributes,
        day: u32,
        counts: SceneCounts,
    ) -> bool {
        let key = day_key(day);
        let entry = self.stations.entry(station).or_insert_with(|| StationEntry {
            name: attributes.station_name.clone(),
            instrument_type: attributes.instrument_type.clone(),
            latitude: attributes.latitude,
            longitude: attributes.longitude,
            altitude: attributes.altitude,
            days: BTreeMap::new(),
        });

        let before = entry.clone();
        let is_latest = entry.days.keys().next_back().map_or(true, |last| key >= *last);
        if is_latest {
            entry.name = attributes.station_name.clone();
            entry.instrument_type = attributes.instrument_type.clone();
            entry.latitude = attributes.latitude;
            entry.longitude = attributes.longitude;
            entry.altitude = attributes.altitude;
        }
        entry.days.insert(key, counts);

        *entry != before
    }

    pub fn get(&self, station: &StationId) -> Option<&StationEntry> {
        self.stations.get(station)
    }

}
