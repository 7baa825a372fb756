use crate::config::ControlsConfig;
use crate::types::{Observation, PUMP_SENTINEL};
use thiserror::Error;
use tracing::debug;

pub const PUMP_RADIUS_SHOWN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(i64);

#[derive(Debug, Error, PartialEq)]
#[error("threshold {value} is outside the slider range [{min}, {max}]")]
pub struct ThresholdOutOfRange {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl Threshold {
    pub fn new(value: i64, controls: &ControlsConfig) -> Result<Self, ThresholdOutOfRange> {
        if (controls.min_threshold..=controls.max_threshold).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ThresholdOutOfRange {
                value,
                min: controls.min_threshold,
                max: controls.max_threshold,
            })
        }
    }

    pub fn default_for(controls: &ControlsConfig) -> Self {
        Self(controls.default_threshold)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    pub deaths: Vec<&'a Observation>,
    pub pumps: Vec<&'a Observation>,
    pub pump_radius: u32,
}

pub fn death_subset(observations: &[Observation], threshold: Threshold) -> Vec<&Observation> {
    observations
        .iter()
        .filter(|o| o.count >= threshold.value())
        .collect()
}

// Pumps are identified by the sentinel count alone, never by row position.
pub fn pump_subset(observations: &[Observation]) -> Vec<&Observation> {
    observations
        .iter()
        .filter(|o| o.count == PUMP_SENTINEL)
        .collect()
}

pub fn pump_radius(show_pumps: bool) -> u32 {
    if show_pumps {
        PUMP_RADIUS_SHOWN
    } else {
        0
    }
}

pub fn partition(observations: &[Observation], threshold: Threshold, show_pumps: bool) -> Partition<'_> {
    let deaths = death_subset(observations, threshold);
    let pumps = pump_subset(observations);
    debug!(
        threshold = threshold.value(),
        show_pumps,
        deaths = deaths.len(),
        pumps = pumps.len(),
        "partitioned observations"
    );
    Partition {
        deaths,
        pumps,
        pump_radius: pump_radius(show_pumps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> ControlsConfig {
        ControlsConfig::default()
    }

    fn t(value: i64) -> Threshold {
        Threshold::new(value, &controls()).unwrap()
    }

    fn sample() -> Vec<Observation> {
        vec![
            Observation::new(0, -0.1360, 51.5130),
            Observation::new(1, -0.1361, 51.5131),
            Observation::new(2, -0.1362, 51.5132),
            Observation::new(3, -0.136, 51.513),
            Observation::new(7, -0.1364, 51.5134),
            Observation::new(14, -0.1365, 51.5135),
            Observation::new(PUMP_SENTINEL, -0.137, 51.514),
            Observation::new(PUMP_SENTINEL, -0.138, 51.515),
        ]
    }

    #[test]
    fn threshold_respects_slider_bounds() {
        assert!(Threshold::new(0, &controls()).is_ok());
        assert!(Threshold::new(15, &controls()).is_ok());
        assert_eq!(
            Threshold::new(16, &controls()),
            Err(ThresholdOutOfRange { value: 16, min: 0, max: 15 })
        );
        assert!(Threshold::new(-1, &controls()).is_err());
        assert_eq!(Threshold::default_for(&controls()).value(), 2);
    }

    #[test]
    fn death_subset_is_exactly_counts_at_or_above_threshold() {
        let data = sample();
        for value in 0..=15 {
            let deaths = death_subset(&data, t(value));
            let expected: Vec<&Observation> = data.iter().filter(|o| o.count >= value).collect();
            assert_eq!(deaths, expected, "threshold {value}");
            assert!(deaths.iter().all(|o| o.count >= value));
        }
    }

    #[test]
    fn raising_threshold_never_adds_deaths() {
        let data = sample();
        for value in 0..15 {
            let lower = death_subset(&data, t(value));
            let higher = death_subset(&data, t(value + 1));
            assert!(higher.len() <= lower.len());
            assert!(higher.iter().all(|o| lower.contains(o)));
        }
    }

    #[test]
    fn pump_subset_ignores_threshold() {
        let data = sample();
        let baseline = partition(&data, t(0), true).pumps;
        assert_eq!(baseline.len(), 2);
        for value in 0..=15 {
            assert_eq!(partition(&data, t(value), true).pumps, baseline);
        }
    }

    #[test]
    fn pumps_are_found_anywhere_in_the_table() {
        let mut data = sample();
        data.rotate_right(3);
        let pumps = pump_subset(&data);
        assert_eq!(pumps.len(), 2);
        assert!(pumps.iter().all(|o| o.is_pump()));
    }

    #[test]
    fn pump_radius_follows_checkbox() {
        assert_eq!(pump_radius(true), 5);
        assert_eq!(pump_radius(false), 0);
        assert_eq!(partition(&[], t(2), false).pump_radius, 0);
        assert_eq!(partition(&sample(), t(2), true).pump_radius, 5);
    }

    #[test]
    fn death_row_above_threshold_is_shown() {
        let data = vec![Observation::new(3, -0.136, 51.513)];
        let deaths = death_subset(&data, t(2));
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].lon(), -0.136);
        assert_eq!(deaths[0].lat(), 51.513);
    }

    #[test]
    fn pump_row_is_never_a_death() {
        let data = vec![Observation::new(PUMP_SENTINEL, -0.137, 51.514)];
        for value in 0..=15 {
            let p = partition(&data, t(value), true);
            assert!(p.deaths.is_empty());
            assert_eq!(p.pumps.len(), 1);
        }
    }

    #[test]
    fn max_threshold_empties_deaths_but_keeps_pumps() {
        let data = sample();
        let p = partition(&data, t(15), true);
        assert!(p.deaths.is_empty());
        assert_eq!(p.pumps.len(), 2);
    }
}
