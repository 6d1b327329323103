//! # Caelum: environment and provider wiring
//!
//! This module defines the [`Caelum`] struct, the central façade that wires
//! together:
//!
//! 1. **Environment state** ([`CaelumEnv`](crate::env_state::CaelumEnv)) —
//!    the shared HTTP client and its timeout.
//! 2. **Ephemeris access** — [`HorizonsClient`] views over the environment
//!    for ecliptic and horizontal series.
//! 3. **Almanac access** — [`UsnoClient`] views for lunar phases, seasons,
//!    and daily rise/set reports.
//!
//! The provider views borrow the shared environment, so one `Caelum` can
//! serve any number of concurrent searches without duplicating HTTP
//! sessions.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use caelum::bodies::Body;
//! use caelum::caelum::Caelum;
//! use caelum::ephemeris::series::SearchWindow;
//! use caelum::search::engine::SearchEngine;
//! use caelum::search::predicate::{LongitudePredicate, StationDirection};
//! use hifitime::Epoch;
//!
//! # async fn run() -> Result<(), caelum::caelum_errors::CaelumError> {
//! let caelum = Caelum::new()?;
//! let horizons = caelum.horizons();
//! let engine = SearchEngine::new(&horizons);
//!
//! let window = SearchWindow::new(
//!     Epoch::from_gregorian_utc(2024, 1, 1, 0, 0, 0, 0),
//!     Epoch::from_gregorian_utc(2024, 4, 1, 0, 0, 0, 0),
//! )?;
//! let predicate = LongitudePredicate::Station {
//!     direction: StationDirection::Retrograde,
//! };
//!
//! let _found = engine.search_single(Body::Mars, window, &predicate).await?;
//! # Ok(())
//! # }
//! ```

use crate::caelum_errors::CaelumError;
use crate::env_state::CaelumEnv;
use crate::ephemeris::horizons::HorizonsClient;
use crate::ephemeris::usno::UsnoClient;

#[derive(Debug, Clone)]
pub struct Caelum {
    env: CaelumEnv,
}

impl Caelum {
    /// Construct a new [`Caelum`] context with a default environment.
    pub fn new() -> Result<Self, CaelumError> {
        Ok(Caelum {
            env: CaelumEnv::new()?,
        })
    }

    /// The shared environment state.
    pub fn env(&self) -> &CaelumEnv {
        &self.env
    }

    /// An ephemeris adapter borrowing this context's HTTP client.
    pub fn horizons(&self) -> HorizonsClient<'_> {
        HorizonsClient::new(&self.env)
    }

    /// An almanac adapter borrowing this context's HTTP client.
    pub fn usno(&self) -> UsnoClient<'_> {
        UsnoClient::new(&self.env)
    }
}
