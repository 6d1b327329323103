//! Twilight threshold detection over a one-minute solar elevation series.
//!
//! Unlike the recursive refinement engine, this is a linear one-pass scan:
//! the input series already sits at the terminal one-minute resolution, so
//! each adjacent minute pair is checked once against all six thresholds.
//! The six checks are independent, not mutually exclusive — a steep
//! elevation change may fire several thresholds on the same minute.

use hifitime::Epoch;
use itertools::Itertools;

use crate::constants::{
    Degree, ASTRONOMICAL_TWILIGHT_DEG, CIVIL_TWILIGHT_DEG, NAUTICAL_TWILIGHT_DEG,
};
use crate::ephemeris::series::ElevationSeries;

/// The six twilight boundary crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwilightKind {
    AstronomicalDawn,
    NauticalDawn,
    CivilDawn,
    CivilDusk,
    NauticalDusk,
    AstronomicalDusk,
}

impl TwilightKind {
    pub const ALL: [TwilightKind; 6] = [
        TwilightKind::AstronomicalDawn,
        TwilightKind::NauticalDawn,
        TwilightKind::CivilDawn,
        TwilightKind::CivilDusk,
        TwilightKind::NauticalDusk,
        TwilightKind::AstronomicalDusk,
    ];

    /// The solar elevation this crossing straddles.
    pub fn threshold(&self) -> Degree {
        match self {
            TwilightKind::AstronomicalDawn | TwilightKind::AstronomicalDusk => {
                ASTRONOMICAL_TWILIGHT_DEG
            }
            TwilightKind::NauticalDawn | TwilightKind::NauticalDusk => NAUTICAL_TWILIGHT_DEG,
            TwilightKind::CivilDawn | TwilightKind::CivilDusk => CIVIL_TWILIGHT_DEG,
        }
    }

    /// Dawns are ascending crossings, dusks descending.
    pub fn is_dawn(&self) -> bool {
        matches!(
            self,
            TwilightKind::AstronomicalDawn | TwilightKind::NauticalDawn | TwilightKind::CivilDawn
        )
    }

    /// Whether an adjacent minute pair of elevations straddles this
    /// threshold in the matching direction.
    pub fn fires(&self, previous_elevation: Degree, current_elevation: Degree) -> bool {
        let threshold = self.threshold();
        if self.is_dawn() {
            previous_elevation < threshold && current_elevation >= threshold
        } else {
            previous_elevation > threshold && current_elevation <= threshold
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TwilightKind::AstronomicalDawn => "Astronomical Dawn",
            TwilightKind::NauticalDawn => "Nautical Dawn",
            TwilightKind::CivilDawn => "Civil Dawn",
            TwilightKind::CivilDusk => "Civil Dusk",
            TwilightKind::NauticalDusk => "Nautical Dusk",
            TwilightKind::AstronomicalDusk => "Astronomical Dusk",
        }
    }
}

/// One detected threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwilightCrossing {
    pub timestamp: Epoch,
    pub kind: TwilightKind,
    /// Solar elevation at the crossing minute
    pub elevation: Degree,
}

/// Scan a one-minute elevation series for twilight threshold crossings.
///
/// Arguments
/// ---------
/// * `series`: solar elevation samples covering the needed window at
///   one-minute resolution, fetched once by the caller
///
/// Return
/// ------
/// * Every crossing found, ordered by minute; a minute may contribute
///   several crossings.
pub fn detect_crossings(series: &ElevationSeries) -> Vec<TwilightCrossing> {
    let mut crossings = Vec::new();

    for (previous, current) in series.iter().tuple_windows() {
        for kind in TwilightKind::ALL {
            if kind.fires(previous.elevation, current.elevation) {
                crossings.push(TwilightCrossing {
                    timestamp: current.timestamp,
                    kind,
                    elevation: current.elevation,
                });
            }
        }
    }

    crossings
}

#[cfg(test)]
mod twilight_tests {
    use super::*;
    use crate::ephemeris::series::HorizontalSample;

    fn series_from_elevations(elevations: &[Degree]) -> ElevationSeries {
        let samples = elevations
            .iter()
            .enumerate()
            .map(|(minute, &elevation)| HorizontalSample {
                timestamp: Epoch::from_gregorian_utc(2024, 6, 1, 4, minute as u8, 0, 0),
                azimuth: 90.0,
                elevation,
            })
            .collect();
        ElevationSeries::from_samples(samples)
    }

    #[test]
    fn test_civil_dawn_fires_on_ascending_pair() {
        let series = series_from_elevations(&[-6.5, -5.5]);
        let crossings = detect_crossings(&series);

        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].kind, TwilightKind::CivilDawn);
        assert_eq!(crossings[0].elevation, -5.5);
        assert_eq!(
            crossings[0].timestamp,
            Epoch::from_gregorian_utc(2024, 6, 1, 4, 1, 0, 0)
        );
    }

    #[test]
    fn test_civil_dusk_fires_on_descending_pair() {
        let series = series_from_elevations(&[-5.5, -6.5]);
        let crossings = detect_crossings(&series);

        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].kind, TwilightKind::CivilDusk);
    }

    #[test]
    fn test_thresholds_fire_independently() {
        // one steep pair straddles all three dawn thresholds at once
        let series = series_from_elevations(&[-19.0, -5.0]);
        let crossings = detect_crossings(&series);

        let kinds: Vec<TwilightKind> = crossings.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TwilightKind::AstronomicalDawn,
                TwilightKind::NauticalDawn,
                TwilightKind::CivilDawn,
            ]
        );
    }

    #[test]
    fn test_touching_the_threshold_counts_once() {
        // landing exactly on the boundary is a dawn; leaving it upward is not
        let series = series_from_elevations(&[-6.1, -6.0, -5.9]);
        let crossings = detect_crossings(&series);

        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].kind, TwilightKind::CivilDawn);
        assert_eq!(crossings[0].elevation, -6.0);
    }

    #[test]
    fn test_full_morning_sequence() {
        let series = series_from_elevations(&[-18.4, -17.6, -12.3, -11.8, -6.2, -5.8, -0.1]);
        let crossings = detect_crossings(&series);

        let kinds: Vec<TwilightKind> = crossings.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TwilightKind::AstronomicalDawn,
                TwilightKind::NauticalDawn,
                TwilightKind::CivilDawn,
            ]
        );
    }

    #[test]
    fn test_quiet_series_yields_nothing() {
        let series = series_from_elevations(&[10.0, 11.0, 12.0]);
        assert!(detect_crossings(&series).is_empty());
    }
}
