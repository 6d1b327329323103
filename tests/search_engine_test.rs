mod common;

use std::future::Future;
use std::sync::Mutex;

use approx::assert_relative_eq;
use hifitime::{Duration, Epoch};

use caelum::bodies::Body;
use caelum::caelum_errors::CaelumError;
use caelum::constants::STEP_COUNT;
use caelum::ephemeris::horizons::EphemerisSource;
use caelum::ephemeris::series::{SearchWindow, Series, StepSpec};
use caelum::search::engine::{ProgressObserver, RefinementStep, SearchEngine};
use caelum::search::predicate::{
    AspectKind, AspectPredicate, LongitudePredicate, StationDirection,
};
use caelum::time::{interval_for, minutes_between};

use common::{sample_instants, StubEphemeris};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn window_of_days(start: Epoch, days: f64) -> SearchWindow {
    SearchWindow::new(start, start + Duration::from_seconds(days * SECONDS_PER_DAY)).unwrap()
}

fn days_since(origin: Epoch, at: Epoch) -> f64 {
    (at - origin).to_seconds() / SECONDS_PER_DAY
}

/// Collects one record per refinement level.
#[derive(Default)]
struct RecordingObserver {
    steps: Mutex<Vec<RefinementStep>>,
}

impl ProgressObserver for RecordingObserver {
    fn refinement(&self, step: &RefinementStep) {
        self.steps.lock().unwrap().push(*step);
    }
}

#[tokio::test]
async fn test_linear_ingress_within_one_minute() {
    let _ = env_logger::builder().is_test(true).try_init();

    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 90.0);

    // one third of a degree per day: 0 degrees at the window start, 30 at
    // its end, crossing the 15-degree boundary exactly 45 days in
    let stub = StubEphemeris::new(move |_, at| days_since(start, at) / 3.0);
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::AscendingCrossing { boundary: 15.0 };

    let found = engine
        .search_single(Body::Venus, window, &predicate)
        .await
        .unwrap()
        .expect("the crossing must be located");

    let analytic = start + Duration::from_seconds(45.0 * SECONDS_PER_DAY);
    assert!(
        minutes_between(analytic, found.timestamp).abs() <= 1.0,
        "found {} but the crossing is at {analytic}",
        found.timestamp
    );
    assert_relative_eq!(found.longitude, 15.0, epsilon = 0.01);
}

#[tokio::test]
async fn test_search_is_idempotent() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 90.0);

    let stub = StubEphemeris::new(move |_, at| days_since(start, at) / 3.0);
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::AscendingCrossing { boundary: 15.0 };

    let first_run = engine
        .search_single(Body::Venus, window, &predicate)
        .await
        .unwrap();
    let fetches_first_run = stub.fetch_count();

    let second_run = engine
        .search_single(Body::Venus, window, &predicate)
        .await
        .unwrap();

    assert_eq!(first_run, second_run);
    assert_eq!(stub.fetch_count(), 2 * fetches_first_run);
}

#[tokio::test]
async fn test_global_reject_costs_a_single_fetch() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 90.0);

    // motionless body: the boundary is never crossed
    let stub = StubEphemeris::new(|_, _| 10.0);
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::AscendingCrossing { boundary: 50.0 };

    let found = engine
        .search_single(Body::Venus, window, &predicate)
        .await
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(stub.fetch_count(), 1, "the reject path must not refine");
}

#[tokio::test]
async fn test_refinement_is_bounded_and_strictly_narrowing() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 90.0);

    let stub = StubEphemeris::new(move |_, at| days_since(start, at) / 3.0);
    let observer = RecordingObserver::default();
    let engine = SearchEngine::new(&stub).with_observer(&observer);
    let predicate = LongitudePredicate::AscendingCrossing { boundary: 15.0 };

    engine
        .search_single(Body::Venus, window, &predicate)
        .await
        .unwrap()
        .expect("the crossing must be located");

    let steps = observer.steps.lock().unwrap();

    // ceil(log_60(90 days in minutes)) = 3
    let window_minutes = window.span().to_seconds() / 60.0;
    let level_bound = window_minutes.ln() / (STEP_COUNT as f64).ln();
    assert_eq!(steps.len(), level_bound.ceil() as usize);

    for pair in steps.windows(2) {
        assert!(
            pair[1].window.span() < pair[0].window.span(),
            "every refinement level must strictly narrow its window"
        );
    }
}

#[tokio::test]
async fn test_mars_station_scenario() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let end = Epoch::from_gregorian_utc(2024, 4, 1, 0, 0, 0, 0);
    let window = SearchWindow::new(start, end).unwrap();

    // slow direct motion into the station, then a steep retrograde leg:
    // adjacent-sample motion turns negative just past the station instant
    let station = Epoch::from_gregorian_utc(2024, 1, 25, 6, 30, 0, 0);
    let stub = StubEphemeris::new(move |_, at| {
        let offset_days = days_since(station, at);
        if offset_days <= 0.0 {
            120.0 + 0.0001 * offset_days
        } else {
            120.0 - offset_days
        }
    });
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::Station {
        direction: StationDirection::Retrograde,
    };

    let found = engine
        .search_single(Body::Mars, window, &predicate)
        .await
        .unwrap()
        .expect("the station must be located");

    assert!(
        minutes_between(station, found.timestamp).abs() <= 1.0,
        "found {} but the station is at {station}",
        found.timestamp
    );
}

#[tokio::test]
async fn test_global_check_can_pass_without_interior_crossing() {
    // a body advancing 350 degrees over the padded window reads as a net
    // 10-degree retreat at the sampled extremes, yet every adjacent pair
    // moves forward: the scan legitimately finds nothing
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 60.0);
    let rate_deg_per_day = 350.0 / 62.0;

    let stub = StubEphemeris::new(move |_, at| {
        (days_since(start, at) * rate_deg_per_day).rem_euclid(360.0)
    });
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::Station {
        direction: StationDirection::Retrograde,
    };

    let found = engine
        .search_single(Body::Mercury, window, &predicate)
        .await
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(stub.fetch_count(), 1);
}

#[tokio::test]
async fn test_aspect_search_within_one_minute() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 40.0);

    // separation grows from 80 toward the square at half a degree per day:
    // exact 20 days in
    let stub = StubEphemeris::new(move |body, at| match body {
        Body::Saturn => 20.0,
        _ => 100.0 + days_since(start, at) * 0.5,
    });
    let engine = SearchEngine::new(&stub);
    let predicate = AspectPredicate::new(AspectKind::Square);

    let found = engine
        .search_pair(Body::Sun, Body::Saturn, window, &predicate)
        .await
        .unwrap()
        .expect("the aspect must be located");

    let analytic = start + Duration::from_seconds(20.0 * SECONDS_PER_DAY);
    assert!(
        minutes_between(analytic, found.timestamp).abs() <= 1.0,
        "found {} but the aspect is exact at {analytic}",
        found.timestamp
    );
    assert_relative_eq!(found.longitude_primary, 110.0, epsilon = 0.01);
    assert_eq!(found.longitude_secondary, 20.0);
}

#[tokio::test]
async fn test_pair_tie_break_prefers_the_lower_index() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 12, 0, 0, 0);
    let end = start + Duration::from_seconds(1800.0);
    let window = SearchWindow::new(start, end).unwrap();

    // replicate the engine's level-zero sampling grid for a 30-minute
    // window, whose intervals already sit inside the one-minute tolerance
    let margin = interval_for(window.span(), STEP_COUNT);
    let padded = window.padded(margin);
    let instants = sample_instants(&padded, StepSpec::Count(STEP_COUNT as u32 + 1));
    let half_step = Duration::from_seconds(
        padded.span().to_seconds() / (STEP_COUNT as f64 + 1.0) / 2.0,
    );

    // the primary swings across the secondary between samples 4 and 5, and
    // back between 5 and 6: the conjunction predicate is true at both
    // adjacent indices, and the earlier one must win
    let gate_open = instants[4] + half_step;
    let gate_close = instants[5] + half_step;
    let stub = StubEphemeris::new(move |body, at| {
        if body == Body::Sun {
            0.0
        } else if at >= gate_open && at < gate_close {
            -1.0
        } else {
            1.0
        }
    });
    let engine = SearchEngine::new(&stub);
    let predicate = AspectPredicate::new(AspectKind::Conjunction);

    let found = engine
        .search_pair(Body::Venus, Body::Sun, window, &predicate)
        .await
        .unwrap()
        .expect("the conjunction must be located");

    assert!(
        (found.timestamp - instants[5]).to_seconds().abs() < 1.0,
        "found {} but the lower matching index sits at {}",
        found.timestamp,
        instants[5]
    );
    assert_eq!(stub.fetch_count(), 2, "both series fetched exactly once");
}

/// Source whose secondary-body series comes back one sample short.
struct LopsidedSource;

impl EphemerisSource for LopsidedSource {
    fn fetch(
        &self,
        body: Body,
        window: SearchWindow,
        step: StepSpec,
    ) -> impl Future<Output = Result<Series, CaelumError>> + Send {
        let mut instants = sample_instants(&window, step);
        if body == Body::Saturn {
            instants.pop();
        }

        let samples = instants
            .into_iter()
            .map(|timestamp| caelum::ephemeris::series::EclipticSample {
                timestamp,
                longitude: 10.0,
                latitude: 0.0,
            })
            .collect();

        std::future::ready(Ok(Series::from_samples(samples)))
    }
}

#[tokio::test]
async fn test_pair_series_shape_mismatch_is_an_error() {
    let start = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let window = window_of_days(start, 10.0);

    let source = LopsidedSource;
    let engine = SearchEngine::new(&source);
    let predicate = AspectPredicate::new(AspectKind::Conjunction);

    let result = engine
        .search_pair(Body::Sun, Body::Saturn, window, &predicate)
        .await;

    assert!(matches!(result, Err(CaelumError::SeriesMismatch(_))));
}

#[tokio::test]
async fn test_reversed_window_is_rejected() {
    let earlier = Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0);
    let later = Epoch::from_gregorian_utc(2024, 2, 1, 0, 0, 0, 0);
    let reversed = SearchWindow {
        start: later,
        end: earlier,
    };

    let stub = StubEphemeris::new(|_, _| 0.0);
    let engine = SearchEngine::new(&stub);
    let predicate = LongitudePredicate::AscendingCrossing { boundary: 15.0 };

    let result = engine.search_single(Body::Venus, reversed, &predicate).await;

    assert!(matches!(result, Err(CaelumError::InvalidWindow { .. })));
    assert_eq!(stub.fetch_count(), 0);
}
