//! # Constants and type definitions for Caelum
//!
//! This module centralizes the **angular constants**, **search tuning
//! parameters**, and **common type definitions** used throughout the
//! `caelum` library.
//!
//! ## Overview
//!
//! - Type aliases for angular and temporal quantities
//! - Refinement-search tuning (step count, tolerance, depth guard)
//! - Twilight elevation thresholds
//! - Zodiacal subdivision spans
//!
//! These definitions are used by all main modules, including the search
//! engine, the provider adapters, and the event assemblers.

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

/// Duration expressed in minutes
pub type Minute = f64;

// -------------------------------------------------------------------------------------------------
// Refinement search tuning
// -------------------------------------------------------------------------------------------------

/// Number of scan centers per refinement level.
///
/// Each level splits its window into this many sampling intervals, plus one
/// padding sample on each side for boundary predicate evaluation.
pub const STEP_COUNT: usize = 60;

/// A refinement level terminates once its bracketing samples are at most
/// this far apart.
pub const REFINEMENT_TOLERANCE_MINUTES: Minute = 1.0;

/// Upper bound on refinement levels.
///
/// Convergence is geometric (each level divides its window by
/// [`STEP_COUNT`]), so realistic windows of days to months resolve in 2-4
/// levels; the guard only trips on a provider returning degenerate series.
pub const MAX_REFINEMENT_LEVELS: u32 = 16;

// -------------------------------------------------------------------------------------------------
// Solar elevation thresholds
// -------------------------------------------------------------------------------------------------

/// Civil twilight boundary: sun center 6 degrees below the horizon
pub const CIVIL_TWILIGHT_DEG: Degree = -6.0;

/// Nautical twilight boundary: sun center 12 degrees below the horizon
pub const NAUTICAL_TWILIGHT_DEG: Degree = -12.0;

/// Astronomical twilight boundary: sun center 18 degrees below the horizon
pub const ASTRONOMICAL_TWILIGHT_DEG: Degree = -18.0;

// -------------------------------------------------------------------------------------------------
// Zodiacal subdivisions
// -------------------------------------------------------------------------------------------------

/// Ecliptic span of one zodiacal sign
pub const SIGN_SPAN_DEG: Degree = 30.0;

/// Ecliptic span of one decan (three per sign)
pub const DECAN_SPAN_DEG: Degree = 10.0;

/// Full circle, for longitude normalization
pub const FULL_CIRCLE_DEG: Degree = 360.0;

/// Normalize a longitude to the [0, 360) range.
pub fn wrap360(angle: Degree) -> Degree {
    angle.rem_euclid(FULL_CIRCLE_DEG)
}

/// Normalize an angular difference to the (-180, 180] range.
pub fn wrap180(angle: Degree) -> Degree {
    let wrapped = wrap360(angle);
    if wrapped > 180.0 {
        wrapped - FULL_CIRCLE_DEG
    } else {
        wrapped
    }
}
