use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// Scene classification of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    #[serde(rename = "aer")]
    Aerosols,
    Cloud,
    Fog,
    Rain,
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationAttributes {
    pub station_id: String,

    pub station_name: String,

    #[validate(length(min = 1))]
    pub instrument_type: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub altitude: f64,
}

/// One vertical profile. Besides `time` and `scene`, keys holding an array
/// of numbers are variables sampled on the product's altitude grid; other
/// per-profile fields are carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub time: DateTime<Utc>,
    pub scene: Scene,
    #[serde(flatten)]
    pub variables: BTreeMap<String, Value>,
}

impl Profile {
    /// Samples of `name`, `null` mapped to `None`. Returns `None` when the
    /// field is absent or is not an array of numbers.
    pub fn variable(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.variables
            .get(name)?
            .as_array()?
            .iter()
            .map(|value| match value {
                Value::Null => Some(None),
                value => value.as_f64().map(Some),
            })
            .collect()
    }
}

/// The subset of a derived product consumed by the aggregators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedProduct {
    pub attributes: StationAttributes,
    pub altitude: Vec<f64>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Number of profiles per scene class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCounts {
    pub aer: u32,
    pub cloud: u32,
    pub fog: u32,
    pub rain: u32,
    pub clear: u32,
}

impl SceneCounts {
    pub fn from_profiles(profiles: &[Profile]) -> Self {
        let mut counts = Self::default();
        for profile in profiles {
            counts.add(profile.scene);
        }
        counts
    }

    pub fn add(&mut self, scene: Scene) {
        match scene {
            Scene::Aerosols => self.aer += 1,
            Scene::Cloud => self.cloud += 1,
            Scene::Fog => self.fog += 1,
            Scene::Rain => self.rain += 1,
            Scene::Clear => self.clear += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.aer + self.cloud + self.fog + self.rain + self.clear
    }
}
