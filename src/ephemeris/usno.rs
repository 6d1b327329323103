//! USNO almanac adapters: lunar phases, seasons, and daily rise/set data.
//!
//! These providers answer per-year (phases, seasons) or per-day (rise/set)
//! JSON queries; the per-year responses are filtered caller-side to the
//! requested window using inclusive bounds.

use hifitime::Epoch;
use serde::Deserialize;

use crate::caelum_errors::CaelumError;
use crate::env_state::CaelumEnv;
use crate::ephemeris::series::SearchWindow;
use crate::ephemeris::GeoSite;

const MOON_PHASES_URL: &str = "https://aa.usno.navy.mil/api/moon/phases/year";
const SEASONS_URL: &str = "https://aa.usno.navy.mil/api/seasons";
const ONE_DAY_URL: &str = "https://aa.usno.navy.mil/api/rstt/oneday";

/// A dated almanac record: one lunar phase or one season boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct AlmanacRecord {
    /// Phase or phenomenon name as the provider reports it
    pub name: String,
    pub timestamp: Epoch,
}

#[derive(Debug, Deserialize)]
struct MoonPhasesResponse {
    phasedata: Vec<DatedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeasonsResponse {
    data: Vec<DatedEntry>,
}

#[derive(Debug, Deserialize)]
struct DatedEntry {
    year: i32,
    month: u8,
    day: u8,
    /// `HH:mm` within the requested timezone
    time: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    phenom: Option<String>,
}

impl DatedEntry {
    fn into_record(self) -> Result<AlmanacRecord, CaelumError> {
        let malformed =
            || CaelumError::MalformedResponse(format!("unparsable almanac time: {:?}", self.time));

        let (hour_text, minute_text) = self.time.split_once(':').ok_or_else(malformed)?;
        let hour = hour_text.parse::<u8>().map_err(|_| malformed())?;
        let minute = minute_text.parse::<u8>().map_err(|_| malformed())?;

        let name = self
            .phase
            .or(self.phenom)
            .ok_or_else(|| CaelumError::MalformedResponse("record without phase or phenom".into()))?;

        Ok(AlmanacRecord {
            name,
            timestamp: Epoch::from_gregorian_utc(self.year, self.month, self.day, hour, minute, 0, 0),
        })
    }
}

/// One rise/set/twilight phenomenon of a daily report.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DayPhenomenon {
    pub phen: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
struct OneDayResponse {
    properties: OneDayProperties,
}

#[derive(Debug, Deserialize)]
struct OneDayProperties {
    data: OneDayData,
}

#[derive(Debug, Deserialize)]
struct OneDayData {
    #[serde(default)]
    fracillum: Option<String>,
    sundata: Vec<DayPhenomenon>,
    moondata: Vec<DayPhenomenon>,
}

/// Sun and moon phenomenon times for one day at one site.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub sundata: Vec<DayPhenomenon>,
    pub moondata: Vec<DayPhenomenon>,
    /// Illuminated fraction of the moon, as reported
    pub fracillum: Option<String>,
}

/// Adapter over the USNO astronomical applications API.
#[derive(Debug, Clone)]
pub struct UsnoClient<'a> {
    env: &'a CaelumEnv,
}

impl<'a> UsnoClient<'a> {
    pub fn new(env: &'a CaelumEnv) -> Self {
        UsnoClient { env }
    }

    /// Fetch the lunar phases falling inside a window.
    ///
    /// Issues one per-year query for each calendar year the window touches,
    /// then keeps the records within the window (inclusive bounds).
    pub async fn fetch_lunar_phases(
        &self,
        window: SearchWindow,
        tz: i32,
        dst: bool,
    ) -> Result<Vec<AlmanacRecord>, CaelumError> {
        let mut records = Vec::new();
        for year in window_years(&window) {
            let query = year_query(year, tz, dst);
            let response: MoonPhasesResponse = self.env.get_json(MOON_PHASES_URL, &query).await?;
            collect_in_window(response.phasedata, &window, &mut records)?;
        }
        Ok(records)
    }

    /// Fetch the season boundaries (equinoxes/solstices) inside a window.
    pub async fn fetch_seasons(
        &self,
        window: SearchWindow,
        tz: i32,
        dst: bool,
    ) -> Result<Vec<AlmanacRecord>, CaelumError> {
        let mut records = Vec::new();
        for year in window_years(&window) {
            let query = year_query(year, tz, dst);
            let response: SeasonsResponse = self.env.get_json(SEASONS_URL, &query).await?;
            collect_in_window(response.data, &window, &mut records)?;
        }
        Ok(records)
    }

    /// Fetch the rise/set/twilight report for one day at one site.
    ///
    /// Arguments
    /// ---------
    /// * `date`: the civil date, as `(year, month, day)`
    /// * `site`: observer coordinates
    /// * `tz`: timezone offset in hours
    /// * `dst`: whether daylight saving applies
    pub async fn fetch_day(
        &self,
        date: (i32, u8, u8),
        site: &GeoSite,
        tz: i32,
        dst: bool,
    ) -> Result<DayReport, CaelumError> {
        let (year, month, day) = date;
        let query = [
            ("date", format!("{year:04}-{month:02}-{day:02}")),
            ("coords", site.coords_param()),
            ("tz", tz.to_string()),
            ("dst", dst.to_string()),
        ];

        let response: OneDayResponse = self.env.get_json(ONE_DAY_URL, &query).await?;
        let data = response.properties.data;

        Ok(DayReport {
            sundata: data.sundata,
            moondata: data.moondata,
            fracillum: data.fracillum,
        })
    }
}

fn year_query(year: i32, tz: i32, dst: bool) -> [(&'static str, String); 3] {
    [
        ("year", year.to_string()),
        ("tz", tz.to_string()),
        ("dst", dst.to_string()),
    ]
}

/// Calendar years a window touches, in order.
fn window_years(window: &SearchWindow) -> std::ops::RangeInclusive<i32> {
    let (start_year, ..) = window.start.to_gregorian_utc();
    let (end_year, ..) = window.end.to_gregorian_utc();
    start_year..=end_year
}

/// Keep the entries whose instant lies inside the window, bounds included.
fn collect_in_window(
    entries: Vec<DatedEntry>,
    window: &SearchWindow,
    records: &mut Vec<AlmanacRecord>,
) -> Result<(), CaelumError> {
    for entry in entries {
        let record = entry.into_record()?;
        if record.timestamp >= window.start && record.timestamp <= window.end {
            records.push(record);
        }
    }
    Ok(())
}
