//! # Caelum environment state
//!
//! This module defines [`CaelumEnv`], the **shared environment object** used
//! across the `caelum` library. It provides access to a persistent **HTTP
//! client** shared by every provider adapter (ephemeris tables, lunar
//! phases, daily rise/set data).
//!
//! This object is designed to be **cheaply cloneable** and passed to the
//! adapters that require access to external data sources.
//!
//! ## Overview
//!
//! The main responsibilities of `CaelumEnv` are:
//!
//! 1. Manage a global [`reqwest::Client`] with sensible default settings
//!    (connection reuse, a global request timeout).
//! 2. Provide simple utilities for performing HTTP GET requests returning
//!    text or JSON bodies.
//!
//! The timeout configured here is the only timeout the core enforces:
//! callers needing a different budget impose it at this boundary.
//!
//! ## Notes
//!
//! - The [`CaelumEnv`] struct is meant to be reused and shared between
//!   different parts of the crate to avoid redundant HTTP session creation.
//! - No response is ever cached: every call re-fetches, and the search
//!   engine is responsible for not calling more often than necessary.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::caelum_errors::CaelumError;

/// Global timeout applied to every provider request
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CaelumEnv {
    pub http_client: reqwest::Client,
}

impl CaelumEnv {
    /// Create a new environment with a default HTTP client.
    ///
    /// Return
    /// ------
    /// * A new `CaelumEnv`, or a [`CaelumError::ProviderUnavailable`] if the
    ///   TLS backend cannot be initialized.
    pub fn new() -> Result<Self, CaelumError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(CaelumEnv { http_client })
    }

    /// Perform a GET request and return the response body as text.
    ///
    /// Arguments
    /// ---------
    /// * `url`: the endpoint to query
    /// * `query`: query string parameters, as key/value pairs
    ///
    /// Return
    /// ------
    /// * The raw response body, or a [`CaelumError::ProviderUnavailable`]
    ///   on any transport-level failure (including non-success status).
    pub(crate) async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, CaelumError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    /// Perform a GET request and decode the response body as JSON.
    ///
    /// The body is fetched as text first so that an undecodable payload is
    /// reported as a [`CaelumError::MalformedResponse`] rather than a
    /// transport failure.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CaelumError> {
        let body = self.get_text(url, query).await?;
        serde_json::from_str(&body)
            .map_err(|err| CaelumError::MalformedResponse(format!("{url}: {err}")))
    }
}
