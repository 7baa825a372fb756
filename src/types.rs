use geo::Point;
use serde::Serialize;

/// Count value marking a row as a water pump rather than a death tally.
pub const PUMP_SENTINEL: i64 = -999;

#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub count: i64,
    pub geometry: String,
}

// point is (x = longitude, y = latitude)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub count: i64,
    pub point: Point<f64>,
}

impl Observation {
    pub fn new(count: i64, lon: f64, lat: f64) -> Self {
        Self {
            count,
            point: Point::new(lon, lat),
        }
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn is_pump(&self) -> bool {
        self.count == PUMP_SENTINEL
    }
}

// Flat shape consumed by deck.gl's `getPosition: d => [d.lon, d.lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub count: i64,
    pub lon: f64,
    pub lat: f64,
}

impl From<&Observation> for ObservationRecord {
    fn from(obs: &Observation) -> Self {
        Self {
            count: obs.count,
            lon: obs.lon(),
            lat: obs.lat(),
        }
    }
}
