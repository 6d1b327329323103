use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use hifitime::{Duration, Epoch};

use caelum::bodies::Body;
use caelum::caelum_errors::CaelumError;
use caelum::constants::Degree;
use caelum::ephemeris::horizons::EphemerisSource;
use caelum::ephemeris::series::{EclipticSample, SearchWindow, Series, StepSpec};

/// Deterministic ephemeris stub: longitude is a pure function of body and
/// instant, so identical queries always yield identical series. Every
/// fetch is counted, letting tests assert how many levels a search cost.
pub struct StubEphemeris<F>
where
    F: Fn(Body, Epoch) -> Degree,
{
    profile: F,
    fetches: AtomicUsize,
}

impl<F> StubEphemeris<F>
where
    F: Fn(Body, Epoch) -> Degree,
{
    pub fn new(profile: F) -> Self {
        StubEphemeris {
            profile,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// The sample instants a window/step combination produces: `Count(n)`
/// divides the window into `n` uniform intervals (`n + 1` samples),
/// `Minutes(m)` walks the window in `m`-minute steps.
pub fn sample_instants(window: &SearchWindow, step: StepSpec) -> Vec<Epoch> {
    match step {
        StepSpec::Count(count) => {
            let interval_seconds = window.span().to_seconds() / count as f64;
            (0..=count)
                .map(|k| window.start + Duration::from_seconds(interval_seconds * k as f64))
                .collect()
        }
        StepSpec::Minutes(minutes) => {
            let mut instants = Vec::new();
            let mut at = window.start;
            while at <= window.end {
                instants.push(at);
                at = at + Duration::from_seconds(minutes as f64 * 60.0);
            }
            instants
        }
    }
}

impl<F> EphemerisSource for StubEphemeris<F>
where
    F: Fn(Body, Epoch) -> Degree + Sync,
{
    fn fetch(
        &self,
        body: Body,
        window: SearchWindow,
        step: StepSpec,
    ) -> impl Future<Output = Result<Series, CaelumError>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let samples = sample_instants(&window, step)
            .into_iter()
            .map(|timestamp| EclipticSample {
                timestamp,
                longitude: (self.profile)(body, timestamp),
                latitude: 0.0,
            })
            .collect();

        std::future::ready(Ok(Series::from_samples(samples)))
    }
}
