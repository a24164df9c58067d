use serde::{Deserialize, Serialize};

/// A WGS84 point. `(0.0, 0.0)` means "location not in the registry".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const UNKNOWN: Coordinates = Coordinates { latitude: 0.0, longitude: 0.0 };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// Flattened real-time congestion snapshot for one area.
///
/// `forecast_times` and `forecast_congestions` are index-aligned and always the
/// same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CongestionRecord {
    pub area_name: String,
    pub population_time: String,
    pub area_congest_level: String,
    pub area_congest_msg: String,
    pub forecast_times: Vec<String>,
    pub forecast_congestions: Vec<String>,
    pub road_congest_msg: Option<String>,
    pub road_congest_idx: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CongestionRecord {
    /// An empty record for `area_name` with unknown coordinates.
    pub fn new(area_name: impl Into<String>) -> Self {
        Self {
            area_name: area_name.into(),
            population_time: String::new(),
            area_congest_level: String::new(),
            area_congest_msg: String::new(),
            forecast_times: Vec::new(),
            forecast_congestions: Vec::new(),
            road_congest_msg: None,
            road_congest_idx: None,
            latitude: Coordinates::UNKNOWN.latitude,
            longitude: Coordinates::UNKNOWN.longitude,
        }
    }

    pub fn with_coordinates(self, coordinates: Coordinates) -> Self {
        Self { latitude: coordinates.latitude, longitude: coordinates.longitude, ..self }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// `(time, level)` forecast pairs in source order.
    pub fn forecast(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forecast_times
            .iter()
            .map(String::as_str)
            .zip(self.forecast_congestions.iter().map(String::as_str))
    }
}

/// Known congestion classifications, from least to most crowded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CongestionLevel {
    Relaxed,
    Normal,
    SlightlyBusy,
    Busy,
}

impl CongestionLevel {
    pub const fn all() -> &'static [CongestionLevel] {
        &[
            CongestionLevel::Relaxed,
            CongestionLevel::Normal,
            CongestionLevel::SlightlyBusy,
            CongestionLevel::Busy,
        ]
    }

    /// Parse the upstream label. Returns `None` for labels outside the known set.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "여유" => Some(CongestionLevel::Relaxed),
            "보통" => Some(CongestionLevel::Normal),
            "약간 붐빔" => Some(CongestionLevel::SlightlyBusy),
            "붐빔" => Some(CongestionLevel::Busy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Relaxed => "여유",
            CongestionLevel::Normal => "보통",
            CongestionLevel::SlightlyBusy => "약간 붐빔",
            CongestionLevel::Busy => "붐빔",
        }
    }

    /// 1 for the least crowded level, 4 for the most.
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
