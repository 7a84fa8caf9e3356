use leptos::prelude::*;
use rivermap_shared::Catalogue;

use crate::config::CATALOGUE_URL;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch error: {0}")]
    Request(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Decode(String),
}

async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }

    resp.json::<T>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Fetch the river catalogue document.
pub async fn fetch_catalogue() -> Result<Catalogue, FetchError> {
    get_json(CATALOGUE_URL).await
}

/// Fetch one river's GeoJSON. The body is handed to the map
/// engine untouched, so it stays untyped.
pub async fn fetch_geojson(url: &str) -> Result<serde_json::Value, FetchError> {
    let body: serde_json::Value = get_json(url).await?;
    let kind = body.get("type").and_then(|t| t.as_str());
    if !matches!(kind, Some("FeatureCollection" | "Feature")) {
        return Err(FetchError::Decode("expected GeoJSON features".into()));
    }
    Ok(body)
}

/// Stamps GeoJSON requests so only the newest one may apply its response.
///
/// Every selection change takes a new ticket, including changes that end up
/// not fetching (no selection, or a river that is already loaded), so a
/// response still in flight from an earlier selection is never applied.
#[derive(Clone, Copy)]
pub struct GeojsonRequests(StoredValue<u64>);

impl Default for GeojsonRequests {
    fn default() -> Self {
        Self::new()
    }
}

impl GeojsonRequests {
    pub fn new() -> Self {
        Self(StoredValue::new(0))
    }

    /// Invalidate every outstanding request and return the new ticket.
    pub fn supersede(&self) -> u64 {
        let ticket = self.0.get_value().wrapping_add(1);
        self.0.set_value(ticket);
        ticket
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.get_value() == ticket
    }
}
