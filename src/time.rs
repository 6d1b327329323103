use hifitime::{Duration, Epoch};

use crate::caelum_errors::CaelumError;
use crate::constants::Minute;

/// Month abbreviations used by the ephemeris provider's data rows
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format an instant as an ISO date-time accepted by the ephemeris
/// provider's START_TIME/STOP_TIME parameters.
///
/// Argument
/// --------
/// * `epoch`: the instant to format (interpreted in UTC)
///
/// Return
/// ------
/// * a string in the format YYYY-MM-ddTHH:mm:ss
pub fn format_horizons_instant(epoch: Epoch) -> String {
    let (year, month, day, hour, minute, second, _) = epoch.to_gregorian_utc();
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")
}

/// Parse a data-row instant in the provider's `YYYY-MMM-DD HH:mm` format
/// (month as a three-letter English abbreviation, UTC).
///
/// Argument
/// --------
/// * `text`: the date-time field of one ephemeris table row
///
/// Return
/// ------
/// * the corresponding instant, or a [`CaelumError::MalformedResponse`] if
///   any part of the field does not match the expected format
pub fn parse_horizons_instant(text: &str) -> Result<Epoch, CaelumError> {
    let malformed = || CaelumError::MalformedResponse(format!("unparsable instant: {text:?}"));

    let (date_part, time_part) = text.trim().split_once(' ').ok_or_else(malformed)?;

    let mut date_fields = date_part.split('-');
    let year = date_fields
        .next()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(malformed)?;
    let month_abbreviation = date_fields.next().ok_or_else(malformed)?;
    let day = date_fields
        .next()
        .and_then(|s| s.parse::<u8>().ok())
        .ok_or_else(malformed)?;

    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbreviation| *abbreviation == month_abbreviation)
        .map(|index| index as u8 + 1)
        .ok_or_else(malformed)?;

    let (hour_text, minute_text) = time_part.trim().split_once(':').ok_or_else(malformed)?;
    let hour = hour_text.parse::<u8>().map_err(|_| malformed())?;
    let minute = minute_text.parse::<u8>().map_err(|_| malformed())?;

    Ok(Epoch::from_gregorian_utc(year, month, day, hour, minute, 0, 0))
}

/// Signed difference between two instants, in minutes.
pub fn minutes_between(earlier: Epoch, later: Epoch) -> Minute {
    (later - earlier).to_seconds() / 60.0
}

/// One sampling interval for a window divided into `steps` equal parts.
pub fn interval_for(span: Duration, steps: usize) -> Duration {
    Duration::from_seconds(span.to_seconds() / steps as f64)
}
