//! # Adaptive refinement search engine
//!
//! This module locates the instant at which a predicate over adjacent
//! ephemeris samples transitions from false to true, to a one-minute
//! tolerance, against a coarsely sampled remote series.
//!
//! ## Overview
//!
//! Rather than sampling a whole window at one-minute resolution (which
//! would be prohibitively expensive against a rate-limited remote source),
//! each refinement level fetches a fixed fan-out of
//! [`STEP_COUNT`](crate::constants::STEP_COUNT) sampling intervals, scans
//! adjacent pairs for the earliest predicate transition, and narrows the
//! window to that bracketing pair. Convergence is geometric: each level
//! divides the window by the fan-out, so realistic windows of days to
//! months resolve in two to four levels.
//!
//! Refinement is written as an explicit loop with a shrinking window and a
//! bounded level count, and each level's padded fetch re-acquires a fresh
//! series: no series is ever edited in place.
//!
//! ## Single-crossing assumption
//!
//! Both search variants assume exactly one predicate transition per window
//! and return on the first (lowest-index) match; additional transitions in
//! the same window are silently dropped. Callers choose windows tight
//! enough to bracket a single event.
//!
//! ## See also
//!
//! * [`EphemerisSource`] – The provider seam each level fetches through.
//! * [`LongitudePredicate`] / [`AspectPredicate`] – The predicate catalog.
//! * [`crate::search::twilight`] – The linear-scan counterpart for series
//!   already at terminal resolution.

use hifitime::Epoch;

use crate::caelum_errors::CaelumError;
use crate::constants::{
    Degree, MAX_REFINEMENT_LEVELS, REFINEMENT_TOLERANCE_MINUTES, STEP_COUNT,
};
use crate::bodies::Body;
use crate::ephemeris::horizons::EphemerisSource;
use crate::ephemeris::series::{SearchWindow, Series, StepSpec};
use crate::search::predicate::{AspectPredicate, LongitudePredicate, PairLongitudes};
use crate::time::{interval_for, minutes_between};

/// A located single-body predicate transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundEvent {
    pub timestamp: Epoch,
    pub longitude: Degree,
}

/// A located dual-body predicate transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundEventPair {
    pub timestamp: Epoch,
    pub longitude_primary: Degree,
    pub longitude_secondary: Degree,
}

/// One refinement level, as reported to the progress observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementStep {
    /// Zero-based refinement level
    pub level: u32,
    /// The window this level searched
    pub window: SearchWindow,
    /// Samples the level's fetch returned
    pub sample_count: usize,
}

/// Receiver for structured progress records emitted by the engine.
///
/// The engine performs no display I/O itself; an observer may forward the
/// records to a progress bar, a log, or a channel.
pub trait ProgressObserver {
    fn refinement(&self, step: &RefinementStep);
}

/// Engine tuning.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Bounded-depth guard on refinement levels
    pub max_levels: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_levels: MAX_REFINEMENT_LEVELS,
        }
    }
}

/// The adaptive refinement search engine.
///
/// Generic over the ephemeris source so searches can run against the JPL
/// adapter in production and a deterministic stub in tests. The engine
/// holds no mutable state: independent searches may run concurrently from
/// the same engine, bounded only by the caller's provider rate budget.
pub struct SearchEngine<'a, C: EphemerisSource> {
    source: &'a C,
    config: SearchConfig,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a, C: EphemerisSource> SearchEngine<'a, C> {
    pub fn new(source: &'a C) -> Self {
        SearchEngine {
            source,
            config: SearchConfig::default(),
            observer: None,
        }
    }

    pub fn with_config(source: &'a C, config: SearchConfig) -> Self {
        SearchEngine {
            source,
            config,
            observer: None,
        }
    }

    /// Attach a progress observer receiving one record per refinement level.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Find the instant in `window` where `predicate` flips from false to
    /// true, to a one-minute tolerance.
    ///
    /// Each level fetches the window padded by one sampling interval on
    /// both sides, so the boundary samples have a true "previous" and
    /// "next" neighbor. A cheap global check on the padded extremes rejects
    /// windows whose sampled endpoints do not satisfy the predicate before
    /// any linear scan.
    ///
    /// Arguments
    /// ---------
    /// * `body`: the body whose longitude drives the predicate
    /// * `window`: the search window (`end` strictly after `start`)
    /// * `predicate`: the transition to locate
    ///
    /// Return
    /// ------
    /// * `Ok(Some(FoundEvent))` at the located transition
    /// * `Ok(None)` if the predicate never transitions in the window — not
    ///   an error
    /// * `Err` on fetch failure or if the level guard trips
    pub async fn search_single(
        &self,
        body: Body,
        window: SearchWindow,
        predicate: &LongitudePredicate,
    ) -> Result<Option<FoundEvent>, CaelumError> {
        let mut window = SearchWindow::new(window.start, window.end)?;

        for level in 0..self.config.max_levels {
            let series = self.fetch_level(body, &window, level).await?;

            let (first, last) = match (series.first(), series.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    return Err(CaelumError::MalformedResponse(
                        "provider returned an empty series".into(),
                    ))
                }
            };

            // global fast-reject on the padded extremes: if the predicate
            // does not hold across the whole window it cannot transition
            // inside it at this resolution
            if !predicate.eval(first.longitude, last.longitude) {
                log::debug!("global reject for {body} at level {level}");
                return Ok(None);
            }

            match scan_single(&series, predicate) {
                ScanOutcome::Found(sample_index) => {
                    let current = series
                        .get(sample_index)
                        .ok_or_else(|| scan_index_error(sample_index))?;
                    return Ok(Some(FoundEvent {
                        timestamp: current.timestamp,
                        longitude: current.longitude,
                    }));
                }
                ScanOutcome::Narrowed(start, end) => {
                    window = SearchWindow::new(start, end)?;
                }
                ScanOutcome::NoMatch => {
                    // the global extremes can satisfy a non-monotonic
                    // predicate without any interior crossing
                    return Ok(None);
                }
            }
        }

        Err(CaelumError::RefinementDepthExceeded(self.config.max_levels))
    }

    /// Find the instant in `window` where a dual-body `predicate` flips
    /// from false to true, to a one-minute tolerance.
    ///
    /// Both series are fetched concurrently over the same padded window and
    /// aligned by index; a shape disagreement between them aborts the
    /// search. Unlike [`search_single`](Self::search_single) there is no
    /// global fast-reject: every level performs the full scan.
    pub async fn search_pair(
        &self,
        primary: Body,
        secondary: Body,
        window: SearchWindow,
        predicate: &AspectPredicate,
    ) -> Result<Option<FoundEventPair>, CaelumError> {
        let mut window = SearchWindow::new(window.start, window.end)?;

        for level in 0..self.config.max_levels {
            let margin = interval_for(window.span(), STEP_COUNT);
            let padded = window.padded(margin);
            let step = StepSpec::Count(STEP_COUNT as u32 + 1);

            let (series_primary, series_secondary) = tokio::try_join!(
                self.source.fetch(primary, padded, step),
                self.source.fetch(secondary, padded, step),
            )?;

            if series_primary.len() != series_secondary.len() {
                return Err(CaelumError::SeriesMismatch(format!(
                    "{} samples for {primary} but {} for {secondary}",
                    series_primary.len(),
                    series_secondary.len()
                )));
            }

            self.report(RefinementStep {
                level,
                window,
                sample_count: series_primary.len(),
            });

            match scan_pair(&series_primary, &series_secondary, predicate)? {
                ScanOutcome::Found(sample_index) => {
                    let current_primary = series_primary
                        .get(sample_index)
                        .ok_or_else(|| scan_index_error(sample_index))?;
                    let current_secondary = series_secondary
                        .get(sample_index)
                        .ok_or_else(|| scan_index_error(sample_index))?;
                    return Ok(Some(FoundEventPair {
                        timestamp: current_primary.timestamp,
                        longitude_primary: current_primary.longitude,
                        longitude_secondary: current_secondary.longitude,
                    }));
                }
                ScanOutcome::Narrowed(start, end) => {
                    window = SearchWindow::new(start, end)?;
                }
                ScanOutcome::NoMatch => return Ok(None),
            }
        }

        Err(CaelumError::RefinementDepthExceeded(self.config.max_levels))
    }

    /// Fetch one refinement level's padded series and report it.
    async fn fetch_level(
        &self,
        body: Body,
        window: &SearchWindow,
        level: u32,
    ) -> Result<Series, CaelumError> {
        let margin = interval_for(window.span(), STEP_COUNT);
        let padded = window.padded(margin);

        let series = self
            .source
            .fetch(body, padded, StepSpec::Count(STEP_COUNT as u32 + 1))
            .await?;

        log::debug!(
            "level {level}: {} samples over {} to {}",
            series.len(),
            padded.start,
            padded.end
        );
        self.report(RefinementStep {
            level,
            window: *window,
            sample_count: series.len(),
        });

        Ok(series)
    }

    fn report(&self, step: RefinementStep) {
        if let Some(observer) = self.observer {
            observer.refinement(&step);
        }
    }
}

/// Outcome of one level's linear scan.
enum ScanOutcome {
    /// Transition located within tolerance at this sample index
    Found(usize),
    /// Transition bracketed by this narrower window; refine again
    Narrowed(Epoch, Epoch),
    /// No adjacent pair satisfied the predicate
    NoMatch,
}

fn scan_index_error(index: usize) -> CaelumError {
    CaelumError::MalformedResponse(format!("scan index {index} out of bounds"))
}

/// Scan adjacent sample pairs for the earliest predicate transition.
///
/// Scan centers run from the second sample through the second-to-last: the
/// padding endpoints only serve as neighbors. The first true index wins.
fn scan_single(series: &Series, predicate: &LongitudePredicate) -> ScanOutcome {
    let upper = series.len().saturating_sub(1);

    for index in 1..upper {
        let (previous, current) = match (series.get(index - 1), series.get(index)) {
            (Some(previous), Some(current)) => (previous, current),
            _ => return ScanOutcome::NoMatch,
        };

        if predicate.eval(previous.longitude, current.longitude) {
            return bracket_outcome(index, previous.timestamp, current.timestamp);
        }
    }

    ScanOutcome::NoMatch
}

/// Dual-body counterpart of [`scan_single`]: the predicate sees the
/// previous/current/next longitudes of both bodies.
fn scan_pair(
    primary: &Series,
    secondary: &Series,
    predicate: &AspectPredicate,
) -> Result<ScanOutcome, CaelumError> {
    let upper = primary.len().saturating_sub(1);

    for index in 1..upper {
        let longitudes = match (
            primary.get(index - 1),
            primary.get(index),
            primary.get(index + 1),
            secondary.get(index - 1),
            secondary.get(index),
            secondary.get(index + 1),
        ) {
            (Some(p1), Some(c1), Some(n1), Some(p2), Some(c2), Some(n2)) => {
                if p1.timestamp != p2.timestamp || c1.timestamp != c2.timestamp {
                    return Err(CaelumError::SeriesMismatch(format!(
                        "timestamps diverge near sample {index}"
                    )));
                }
                PairLongitudes {
                    previous_1: p1.longitude,
                    previous_2: p2.longitude,
                    current_1: c1.longitude,
                    current_2: c2.longitude,
                    next_1: n1.longitude,
                    next_2: n2.longitude,
                }
            }
            _ => return Ok(ScanOutcome::NoMatch),
        };

        if predicate.eval(&longitudes) {
            let previous = primary
                .get(index - 1)
                .ok_or_else(|| scan_index_error(index - 1))?;
            let current = primary.get(index).ok_or_else(|| scan_index_error(index))?;
            return Ok(bracket_outcome(
                index,
                previous.timestamp,
                current.timestamp,
            ));
        }
    }

    Ok(ScanOutcome::NoMatch)
}

/// Terminate within tolerance, otherwise narrow to the bracketing pair.
fn bracket_outcome(index: usize, previous: Epoch, current: Epoch) -> ScanOutcome {
    if minutes_between(previous, current) <= REFINEMENT_TOLERANCE_MINUTES {
        ScanOutcome::Found(index)
    } else {
        ScanOutcome::Narrowed(previous, current)
    }
}
