//! Sampled ephemeris series and search-window primitives.
//!
//! A series is an ordered run of samples with strictly increasing
//! timestamps. Every series is produced fresh by one provider fetch and is
//! never mutated afterwards: refining a search always fetches a new series
//! over a narrower window instead of editing an existing one.

use hifitime::{Duration, Epoch};
use itertools::Itertools;

use crate::caelum_errors::CaelumError;
use crate::constants::Degree;

/// One ecliptic position sample for a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticSample {
    pub timestamp: Epoch,
    pub longitude: Degree,
    pub latitude: Degree,
}

/// One topocentric horizontal position sample (solar variant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalSample {
    pub timestamp: Epoch,
    pub azimuth: Degree,
    pub elevation: Degree,
}

/// An ordered ecliptic-position series for one body.
///
/// Construction sorts the samples by timestamp and discards duplicate
/// timestamps (keeping the first occurrence); the provider is expected to
/// return rows already ordered, so the sort is defensive.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    samples: Vec<EclipticSample>,
}

impl Series {
    pub fn from_samples(samples: Vec<EclipticSample>) -> Self {
        let samples = samples
            .into_iter()
            .sorted_by_key(|sample| sample.timestamp)
            .dedup_by(|a, b| a.timestamp == b.timestamp)
            .collect();

        Series { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EclipticSample> {
        self.samples.get(index)
    }

    pub fn first(&self) -> Option<&EclipticSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&EclipticSample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EclipticSample> {
        self.samples.iter()
    }
}

/// An ordered solar elevation series at fixed one-minute resolution.
///
/// Unlike [`Series`], this is consumed by a single linear threshold scan
/// and is never refined: one minute is already the terminal resolution for
/// twilight boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationSeries {
    samples: Vec<HorizontalSample>,
}

impl ElevationSeries {
    pub fn from_samples(samples: Vec<HorizontalSample>) -> Self {
        let samples = samples
            .into_iter()
            .sorted_by_key(|sample| sample.timestamp)
            .dedup_by(|a, b| a.timestamp == b.timestamp)
            .collect();

        ElevationSeries { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HorizontalSample> {
        self.samples.iter()
    }
}

/// A half-open search window over which predicates are evaluated.
///
/// Both ends are always included as sample points by construction: the
/// engine pads each fetch by one sampling interval on each side so the
/// boundary samples have valid neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    pub start: Epoch,
    pub end: Epoch,
}

impl SearchWindow {
    /// Build a window, rejecting `end` not strictly after `start`.
    pub fn new(start: Epoch, end: Epoch) -> Result<Self, CaelumError> {
        if end <= start {
            return Err(CaelumError::InvalidWindow { start, end });
        }
        Ok(SearchWindow { start, end })
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// The same window extended by `margin` on both sides.
    pub fn padded(&self, margin: Duration) -> SearchWindow {
        SearchWindow {
            start: self.start - margin,
            end: self.end + margin,
        }
    }
}

/// Sampling resolution of one provider fetch: exactly one of a step count
/// or a step size is supplied, matching the provider's `STEP_SIZE`
/// parameter which accepts either `{n}` or `{n}m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSpec {
    /// Divide the window into this many uniform intervals.
    Count(u32),
    /// Sample every this many minutes.
    Minutes(u32),
}

impl StepSpec {
    /// The provider query value for this specification.
    pub fn query_value(&self) -> String {
        match self {
            StepSpec::Count(count) => format!("{count}"),
            StepSpec::Minutes(minutes) => format!("{minutes}m"),
        }
    }
}
