//! Remote ephemeris access: sampled series, the Horizons adapter, and the
//! USNO almanac adapters.

pub mod horizons;
pub mod series;
pub mod usno;

use crate::constants::Degree;

/// An observing site on Earth, used for topocentric queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSite {
    /// East-positive longitude in degrees
    pub longitude: Degree,
    /// Latitude in degrees
    pub latitude: Degree,
    /// Elevation above the reference ellipsoid in kilometers
    pub elevation_km: f64,
}

impl GeoSite {
    pub fn new(longitude: Degree, latitude: Degree, elevation_km: f64) -> Self {
        GeoSite {
            longitude,
            latitude,
            elevation_km,
        }
    }

    /// `latitude,longitude` pair as the daily almanac provider expects it.
    pub fn coords_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}
