//! # JPL Horizons ephemeris adapter
//!
//! This module defines the [`EphemerisSource`] trait — the seam between the
//! search engine and the remote ephemeris provider — and its production
//! implementation [`HorizonsClient`] over the JPL Horizons API.
//!
//! ## Overview
//!
//! A fetch is one network request for one body over one time window at one
//! sampling resolution. The response is a plain-text report whose data
//! table is delimited by `$$SOE` … `$$EOE` markers; each row carries a
//! `YYYY-MMM-DD HH:mm` UTC instant followed by two angular quantities,
//! separated by runs of at least two spaces.
//!
//! Two quantity selections are used:
//!
//! - **Ecliptic longitude/latitude** (`QUANTITIES=31`), geocentric — the
//!   input of the recursive search engine.
//! - **Apparent azimuth/elevation** (`QUANTITIES=4`), topocentric — the
//!   one-minute solar series consumed by the twilight threshold scan.
//!
//! ## Failure modes
//!
//! Transport failures surface as
//! [`ProviderUnavailable`](crate::caelum_errors::CaelumError::ProviderUnavailable);
//! a payload missing the table markers or containing an unparsable row is a
//! [`MalformedResponse`](crate::caelum_errors::CaelumError::MalformedResponse).
//! Neither is retried here: fetches are idempotent and the caller decides
//! whether to re-run the enclosing search.
//!
//! ## See also
//!
//! * [`CaelumEnv`](crate::env_state::CaelumEnv) – Shared HTTP client.
//! * [`SearchEngine`](crate::search::engine::SearchEngine) – The only
//!   component issuing refinement fetches.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;

use crate::bodies::Body;
use crate::caelum_errors::CaelumError;
use crate::constants::Degree;
use crate::env_state::CaelumEnv;
use crate::ephemeris::series::{
    EclipticSample, ElevationSeries, HorizontalSample, SearchWindow, Series, StepSpec,
};
use crate::ephemeris::GeoSite;
use crate::time::{format_horizons_instant, parse_horizons_instant};

const HORIZONS_API_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";

/// Quantity selector: ecliptic longitude/latitude
const QUANTITY_ECLIPTIC: &str = "31";

/// Quantity selector: apparent azimuth and elevation
const QUANTITY_HORIZONTAL: &str = "4";

/// Geocentric observer center
const CENTER_GEOCENTRIC: &str = "500";

// regex to match the data table of the provider response
static TABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$SOE(.*?)\$\$EOE").expect("static regex is valid"));

// data rows separate their fields by runs of two or more spaces
static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex is valid"));

/// Source of ecliptic-position series for the search engine.
///
/// The engine is generic over this trait so tests can substitute a
/// deterministic synthetic provider. Implementations perform exactly one
/// network request per call, never cache, and never retry.
pub trait EphemerisSource {
    /// Fetch an ecliptic series for one body over a window.
    ///
    /// Arguments
    /// ---------
    /// * `body`: the target body
    /// * `window`: the fetch window (`end` strictly after `start`)
    /// * `step`: the sampling resolution; [`StepSpec::Count(n)`] divides
    ///   the window into `n` uniform intervals and yields `n + 1` samples
    ///
    /// Return
    /// ------
    /// * The fetched [`Series`], or a [`CaelumError`] on transport or parse
    ///   failure.
    fn fetch(
        &self,
        body: Body,
        window: SearchWindow,
        step: StepSpec,
    ) -> impl Future<Output = Result<Series, CaelumError>> + Send;
}

/// Ephemeris adapter over the JPL Horizons API.
#[derive(Debug, Clone)]
pub struct HorizonsClient<'a> {
    env: &'a CaelumEnv,
}

impl<'a> HorizonsClient<'a> {
    pub fn new(env: &'a CaelumEnv) -> Self {
        HorizonsClient { env }
    }

    /// Common request parameters for one observer-table fetch.
    fn base_params(
        body: Body,
        window: &SearchWindow,
        step: StepSpec,
        quantities: &str,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("format", "text".into()),
            ("MAKE_EPHEM", "YES".into()),
            ("EPHEM_TYPE", "OBSERVER".into()),
            ("QUANTITIES", quantities.into()),
            ("COMMAND", body.command().into()),
            ("START_TIME", format_horizons_instant(window.start)),
            ("STOP_TIME", format_horizons_instant(window.end)),
            ("STEP_SIZE", step.query_value()),
        ]
    }

    /// Fetch a topocentric azimuth/elevation series.
    ///
    /// Used once per day at one-minute resolution to feed the twilight
    /// threshold scan; never refined recursively.
    pub async fn fetch_horizontal(
        &self,
        body: Body,
        site: &GeoSite,
        window: SearchWindow,
        step: StepSpec,
    ) -> Result<ElevationSeries, CaelumError> {
        let window = SearchWindow::new(window.start, window.end)?;

        let mut params = Self::base_params(body, &window, step, QUANTITY_HORIZONTAL);
        params.push(("CENTER", "coord@399".into()));
        params.push((
            "SITE_COORD",
            format!("{},{},{}", site.longitude, site.latitude, site.elevation_km),
        ));

        let response = self.env.get_text(HORIZONS_API_URL, &params).await?;
        let samples = parse_table(&response)?
            .into_iter()
            .map(|(timestamp, azimuth, elevation)| HorizontalSample {
                timestamp,
                azimuth,
                elevation,
            })
            .collect();

        Ok(ElevationSeries::from_samples(samples))
    }
}

impl EphemerisSource for HorizonsClient<'_> {
    async fn fetch(
        &self,
        body: Body,
        window: SearchWindow,
        step: StepSpec,
    ) -> Result<Series, CaelumError> {
        let window = SearchWindow::new(window.start, window.end)?;

        log::debug!(
            "fetching ephemeris for {body} from {} to {} at step {}",
            window.start,
            window.end,
            step.query_value()
        );

        let mut params = Self::base_params(body, &window, step, QUANTITY_ECLIPTIC);
        params.push(("CENTER", CENTER_GEOCENTRIC.into()));

        let response = self.env.get_text(HORIZONS_API_URL, &params).await?;
        let samples = parse_table(&response)?
            .into_iter()
            .map(|(timestamp, longitude, latitude)| EclipticSample {
                timestamp,
                longitude,
                latitude,
            })
            .collect();

        Ok(Series::from_samples(samples))
    }
}

/// Extract the delimited data table from a provider response and parse each
/// row into `(instant, first quantity, second quantity)`.
///
/// Arguments
/// ---------
/// * `response`: the raw provider response text
///
/// Return
/// ------
/// * One triple per data row, or a [`CaelumError::MalformedResponse`] if
///   the `$$SOE`/`$$EOE` markers are absent or any row does not split into
///   an instant and two numeric fields.
fn parse_table(response: &str) -> Result<Vec<(hifitime::Epoch, Degree, Degree)>, CaelumError> {
    let table = TABLE_REGEX
        .captures(response)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| {
            CaelumError::MalformedResponse("missing $$SOE/$$EOE table markers".into())
        })?
        .as_str();

    let mut rows = Vec::new();
    for line in table.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = FIELD_SEPARATOR.split(line).collect();
        if fields.len() < 3 {
            return Err(CaelumError::MalformedResponse(format!(
                "unsplittable data row: {line:?}"
            )));
        }

        let timestamp = parse_horizons_instant(fields[0])?;
        let first: Degree = fields[1].parse().map_err(|_| {
            CaelumError::MalformedResponse(format!("non-numeric field in row: {line:?}"))
        })?;
        let second: Degree = fields[2].parse().map_err(|_| {
            CaelumError::MalformedResponse(format!("non-numeric field in row: {line:?}"))
        })?;

        rows.push((timestamp, first, second));
    }

    Ok(rows)
}
