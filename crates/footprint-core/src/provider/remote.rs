//! Remote CO2e estimation provider
//!
//! Issues one HTTPS POST per category to an estimation endpoint:
//!
//! ```json
//! { "activity_id": "electricity_consumption", "parameters": { "consumption": 2400.0 } }
//! ```
//!
//! and reads the `co2e` field of the JSON response. Every failure is soft:
//! the category falls back to the last cached estimate or zero and is
//! flagged degraded. There are no retries.

use super::cache::EstimateCache;
use super::{EmissionFactorProvider, KG_PER_TONNE};
use crate::config::RemoteSettings;
use crate::error::{FootprintError, ProviderFailure};
use crate::types::{CategoryResult, EmissionFactorKey, FactorCategory, SourceProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Placeholder shipped in sample configurations
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Largest estimate response body accepted, in bytes
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Request body sent to the estimation service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRequest {
    /// Service-side activity identifier
    pub activity_id: &'static str,
    /// Activity parameters
    pub parameters: serde_json::Value,
}

impl ActivityRequest {
    /// Stable cache key for this request
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!("{}:{}", self.activity_id, self.parameters)
    }
}

/// Build the service request for a factor category
#[must_use]
pub fn activity_request(category: FactorCategory, annualized_quantity: f64) -> ActivityRequest {
    let quantity = annualized_quantity.max(0.0);
    let (activity_id, parameters) = match category {
        FactorCategory::Bike | FactorCategory::Car | FactorCategory::Bus => (
            "passenger_vehicle-transport",
            serde_json::json!({ "distance": quantity, "vehicle_type": category.to_string() }),
        ),
        FactorCategory::Flight => ("air_travel", serde_json::json!({ "flights": quantity })),
        FactorCategory::Electricity => (
            "electricity_consumption",
            serde_json::json!({ "consumption": quantity }),
        ),
        FactorCategory::Diet => ("food_diet", serde_json::json!({ "meals": quantity })),
        FactorCategory::Waste => ("waste_disposal", serde_json::json!({ "waste": quantity })),
    };
    ActivityRequest {
        activity_id,
        parameters,
    }
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    co2e: Option<f64>,
    co2e_unit: Option<String>,
}

/// Parse an estimate body into tonnes CO2e
///
/// `co2e` is read as kilograms unless `co2e_unit` says otherwise.
pub(crate) fn parse_estimate(category: FactorCategory, body: &[u8]) -> Result<f64, ProviderFailure> {
    let invalid = |detail: String| ProviderFailure::ProviderResponseInvalid { category, detail };

    let response: EstimateResponse =
        serde_json::from_slice(body).map_err(|e| invalid(format!("malformed payload: {e}")))?;

    let co2e = response
        .co2e
        .ok_or_else(|| invalid("payload has no co2e field".to_string()))?;
    if !co2e.is_finite() || co2e < 0.0 {
        return Err(invalid(format!("co2e must be a non-negative number, got {co2e}")));
    }

    let unit = response.co2e_unit.as_deref().unwrap_or("kg").trim().to_ascii_lowercase();
    match unit.as_str() {
        "kg" => Ok(co2e / KG_PER_TONNE),
        "t" | "tonne" | "tonnes" => Ok(co2e),
        "g" => Ok(co2e / (KG_PER_TONNE * KG_PER_TONNE)),
        other => Err(invalid(format!("unsupported co2e unit '{other}'"))),
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// Check a credential is present and not the sample placeholder
#[inline]
#[must_use]
pub fn is_usable_credential(credential: &str) -> bool {
    let credential = credential.trim();
    !credential.is_empty() && credential != PLACEHOLDER_API_KEY
}

/// Provider calling a remote estimation service
#[derive(Clone)]
pub struct RemoteEstimationProvider {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<String>,
    cache: Option<EstimateCache>,
}

impl RemoteEstimationProvider {
    /// Create provider for `endpoint`
    ///
    /// A missing or placeholder credential is accepted here; calls then
    /// report [`ProviderFailure::ProviderUnavailable`] without touching the
    /// network.
    pub fn new(
        endpoint: impl Into<String>,
        credential: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FootprintError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FootprintError::Config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential: credential.filter(|c| is_usable_credential(c)),
            cache: None,
        })
    }

    /// Create provider from settings, resolving the credential from the environment
    pub fn from_settings(settings: &RemoteSettings) -> Result<Self, FootprintError> {
        let provider = Self::new(
            settings.endpoint.clone(),
            settings.resolve_credential(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        let cache = match (settings.cache_capacity, settings.cache_ttl_secs) {
            (0, _) => None,
            (capacity, Some(ttl)) => Some(EstimateCache::with_ttl(capacity, Duration::from_secs(ttl))),
            (capacity, None) => Some(EstimateCache::new(capacity)),
        };
        Ok(match cache {
            Some(cache) => provider.with_cache(cache),
            None => provider,
        })
    }

    /// Fall back to last-known-good estimates from `cache`
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: EstimateCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configured endpoint
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if a usable credential is configured
    #[inline]
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Fallback cache, if any
    #[inline]
    #[must_use]
    pub fn cache(&self) -> Option<&EstimateCache> {
        self.cache.as_ref()
    }

    async fn estimate(
        &self,
        category: FactorCategory,
        request: &ActivityRequest,
    ) -> Result<f64, ProviderFailure> {
        let Some(credential) = self.credential.as_deref() else {
            return Err(ProviderFailure::ProviderUnavailable {
                category,
                reason: "API key not set".to_string(),
            });
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderFailure::ProviderUnreachable {
                category,
                detail: describe_transport_error(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFailure::ProviderResponseInvalid {
                category,
                detail: format!("status {status}"),
            });
        }

        let oversized = |len: u64| ProviderFailure::ProviderResponseInvalid {
            category,
            detail: format!("response body of {len} bytes exceeds {MAX_RESPONSE_BYTES}"),
        };
        if let Some(len) = response.content_length().filter(|len| *len > MAX_RESPONSE_BYTES) {
            return Err(oversized(len));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderFailure::ProviderUnreachable {
                category,
                detail: describe_transport_error(&e),
            })?;
        // Chunked replies carry no length up front
        let len = u64::try_from(body.len()).unwrap_or(u64::MAX);
        if len > MAX_RESPONSE_BYTES {
            return Err(oversized(len));
        }

        parse_estimate(category, &body)
    }
}

impl fmt::Debug for RemoteEstimationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEstimationProvider")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl EmissionFactorProvider for RemoteEstimationProvider {
    fn source(&self) -> SourceProvider {
        SourceProvider::Remote
    }

    async fn resolve(
        &self,
        key: &EmissionFactorKey,
        annualized_quantity: f64,
    ) -> Result<CategoryResult, FootprintError> {
        let request = activity_request(key.category, annualized_quantity);
        let category = key.category.report_category();

        match self.estimate(key.category, &request).await {
            Ok(tonnes) => {
                tracing::debug!(
                    category = %key.category,
                    activity = request.activity_id,
                    tonnes,
                    "resolved remote estimate"
                );
                if let Some(cache) = &self.cache {
                    cache.insert(request.fingerprint(), tonnes).await;
                }
                Ok(CategoryResult::new(category, tonnes, SourceProvider::Remote))
            }
            Err(failure) => {
                let cached = match &self.cache {
                    Some(cache) => cache.get(&request.fingerprint()).await,
                    None => None,
                };
                tracing::warn!(
                    category = %key.category,
                    kind = failure.kind(),
                    cached = cached.is_some(),
                    "remote estimate failed: {failure}"
                );
                Ok(CategoryResult::degraded(
                    category,
                    cached.unwrap_or(0.0),
                    SourceProvider::Remote,
                    failure,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn activity_request_for_transport_carries_vehicle() {
        let request = activity_request(FactorCategory::Bus, 3650.0);
        assert_eq!(request.activity_id, "passenger_vehicle-transport");
        assert_eq!(request.parameters["distance"], 3650.0);
        assert_eq!(request.parameters["vehicle_type"], "Bus");
    }

    #[test]
    fn activity_request_per_category() {
        assert_eq!(activity_request(FactorCategory::Flight, 2.0).activity_id, "air_travel");
        assert_eq!(
            activity_request(FactorCategory::Electricity, 1.0).parameters["consumption"],
            1.0
        );
        assert_eq!(activity_request(FactorCategory::Diet, 1095.0).parameters["meals"], 1095.0);
        assert_eq!(activity_request(FactorCategory::Waste, 260.0).activity_id, "waste_disposal");
    }

    #[test]
    fn fingerprint_depends_on_parameters() {
        let a = activity_request(FactorCategory::Diet, 1095.0);
        let b = activity_request(FactorCategory::Diet, 730.0);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), activity_request(FactorCategory::Diet, 1095.0).fingerprint());
    }

    #[test]
    fn parse_estimate_defaults_to_kilograms() {
        let tonnes = parse_estimate(FactorCategory::Diet, br#"{"co2e": 1368.75}"#).unwrap();
        assert!((tonnes - 1.36875).abs() < 1e-12);
    }

    #[test]
    fn parse_estimate_honours_unit() {
        let t = parse_estimate(FactorCategory::Car, br#"{"co2e": 0.5, "co2e_unit": "t"}"#).unwrap();
        assert_eq!(t, 0.5);
        let g = parse_estimate(FactorCategory::Car, br#"{"co2e": 2000000, "co2e_unit": "g"}"#).unwrap();
        assert_eq!(g, 2.0);
    }

    #[test]
    fn parse_estimate_rejects_bad_payloads() {
        let bodies: [&[u8]; 5] = [
            b"not json",
            br#"{"estimate": 3}"#,
            br#"{"co2e": "lots"}"#,
            br#"{"co2e": -1}"#,
            br#"{"co2e": 1, "co2e_unit": "lb"}"#,
        ];
        for body in bodies {
            let err = parse_estimate(FactorCategory::Waste, body).unwrap_err();
            assert_eq!(err.kind(), "ProviderResponseInvalid");
        }
    }

    #[test]
    fn placeholder_credential_is_not_usable() {
        assert!(!is_usable_credential(""));
        assert!(!is_usable_credential("   "));
        assert!(!is_usable_credential(PLACEHOLDER_API_KEY));
        assert!(is_usable_credential("abc123"));
    }

    #[tokio::test]
    async fn missing_credential_degrades_without_network() {
        let provider = RemoteEstimationProvider::new(
            "http://127.0.0.1:9/estimate",
            Some(PLACEHOLDER_API_KEY.to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!provider.has_credential());

        let key = EmissionFactorKey::new("India", FactorCategory::Electricity);
        let result = provider.resolve(&key, 2400.0).await.unwrap();

        assert_eq!(result.category, Category::Electricity);
        assert_eq!(result.annual_emission_tonnes, 0.0);
        assert_eq!(result.source_provider, SourceProvider::Remote);
        assert!(result.degraded);
        assert_eq!(result.issue.as_ref().map(ProviderFailure::kind), Some("ProviderUnavailable"));
    }

    #[tokio::test]
    async fn missing_credential_uses_cached_value() {
        let cache = EstimateCache::new(10);
        let request = activity_request(FactorCategory::Waste, 260.0);
        cache.insert(request.fingerprint(), 0.026).await;

        let provider = RemoteEstimationProvider::new("http://127.0.0.1:9/estimate", None, Duration::from_secs(1))
            .unwrap()
            .with_cache(cache);

        let key = EmissionFactorKey::new("India", FactorCategory::Waste);
        let result = provider.resolve(&key, 260.0).await.unwrap();
        assert!(result.degraded);
        assert_eq!(result.annual_emission_tonnes, 0.026);
    }

    #[test]
    fn debug_output_redacts_credential() {
        let provider =
            RemoteEstimationProvider::new("http://localhost/estimate", Some("secret-key".to_string()), Duration::from_secs(1))
                .unwrap();
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
