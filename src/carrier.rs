//! Hexalog carrier client.
//!
//! Outbound HTTP to the carrier aggregator: shipment registration and
//! shipping-cost estimates. Both calls return `Result` so the shipment
//! builder can match on the known failure mode explicitly instead of
//! catching exceptions; estimate failures carry a documented static
//! fallback the caller substitutes.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::CarrierConfig;
use crate::estimate::ShippingEstimateParams;
use crate::shipment::ShipmentPayload;

fn user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("cartonize/{version} ({os}; {arch})")
}

/// Failure talking to the carrier API.
#[derive(Debug)]
pub enum CarrierError {
    /// The request never completed (connect, timeout, body decode).
    Transport(reqwest::Error),
    /// The carrier answered with a non-success status.
    Status { status: StatusCode, body: String },
}

impl std::fmt::Display for CarrierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CarrierError::Transport(err) => write!(f, "carrier request failed: {}", err),
            CarrierError::Status { status, body } => {
                write!(f, "carrier responded with {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for CarrierError {}

impl From<reqwest::Error> for CarrierError {
    fn from(err: reqwest::Error) -> Self {
        CarrierError::Transport(err)
    }
}

/// Carrier answer to a shipment registration.
#[derive(Clone, Debug, Deserialize)]
pub struct CarrierShipmentResponse {
    pub success: bool,
    pub tracking_id: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub barcodes: Vec<String>,
}

/// Turnaround time window in days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TurnaroundDays {
    pub min: u32,
    pub max: u32,
}

/// A shipping-cost estimate as quoted by the carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingEstimate {
    pub pre_tax: f64,
    pub tax: f64,
    pub total: f64,
    pub tat: TurnaroundDays,
}

impl ShippingEstimate {
    /// Static estimate used when the carrier cannot be reached.
    ///
    /// Checkout must always be able to show a shipping line, so a failed
    /// quote degrades to this flat rate.
    pub fn fallback() -> Self {
        Self {
            pre_tax: 129.00,
            tax: 23.22,
            total: 152.22,
            tat: TurnaroundDays { min: 3, max: 5 },
        }
    }
}

/// Carrier operations the shipment builder depends on.
///
/// A trait seam so tests can substitute a scripted carrier.
pub trait CarrierApi: Send + Sync {
    /// Registers a shipment with the carrier.
    fn create_shipment(
        &self,
        payload: &ShipmentPayload,
    ) -> impl Future<Output = Result<CarrierShipmentResponse, CarrierError>> + Send;

    /// Requests a shipping-cost estimate for validated parameters.
    fn shipping_estimate(
        &self,
        params: &ShippingEstimateParams,
    ) -> impl Future<Output = Result<ShippingEstimate, CarrierError>> + Send;
}

/// HTTP client for the Hexalog carrier API.
pub struct HexalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HexalogClient {
    /// Builds the client from carrier configuration.
    pub fn from_config(config: &CarrierConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Client with explicit endpoint and credentials, mainly for tests.
    #[allow(dead_code)]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::from_config(&CarrierConfig {
            base_url: base_url.into(),
            api_key,
            timeout,
        })
    }

    fn shipments_endpoint(&self) -> String {
        format!("{}/v1/shipments", self.base_url)
    }

    fn estimate_endpoint(&self) -> String {
        format!("{}/v1/shipping-estimate", self.base_url)
    }

    async fn post_json<B: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, CarrierError> {
        let mut request = self.http.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unreadable response body"));
            return Err(CarrierError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

impl CarrierApi for HexalogClient {
    async fn create_shipment(
        &self,
        payload: &ShipmentPayload,
    ) -> Result<CarrierShipmentResponse, CarrierError> {
        self.post_json(self.shipments_endpoint(), payload).await
    }

    async fn shipping_estimate(
        &self,
        params: &ShippingEstimateParams,
    ) -> Result<ShippingEstimate, CarrierError> {
        self.post_json(self.estimate_endpoint(), params).await
    }
}
