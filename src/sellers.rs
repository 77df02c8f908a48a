//! Read-only seller company/address store.
//!
//! The marketplace keeps seller companies in its own database; this service
//! only ever looks a company up by seller ID when building a shipment. The
//! store is a trait so deployments can bring their own backend, with an
//! in-memory implementation fed from a JSON snapshot file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// One stored address of a seller company.
///
/// Every field is optional; the shipment builder fills holes with the
/// configured warehouse defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAddress {
    pub tag: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<i64>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

impl StoredAddress {
    /// Whether this address carries the given tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(tag))
    }
}

/// A seller's company document as stored by the marketplace.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub company_name: Option<String>,
    pub gstin_number: Option<String>,
    pub phone: Option<i64>,
    pub primary_pickup_address: Option<StoredAddress>,
    #[serde(default)]
    pub company_address: Vec<StoredAddress>,
}

/// Lookup of seller companies by seller ID.
pub trait SellerDirectory: Send + Sync {
    fn company(&self, seller_id: &str) -> Option<CompanyRecord>;
}

/// Error loading a seller snapshot file.
#[derive(Debug)]
pub enum SellerLoadError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SellerLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SellerLoadError::Io(err) => write!(f, "could not read sellers file: {}", err),
            SellerLoadError::Parse(err) => write!(f, "could not parse sellers file: {}", err),
        }
    }
}

impl std::error::Error for SellerLoadError {}

impl From<std::io::Error> for SellerLoadError {
    fn from(err: std::io::Error) -> Self {
        SellerLoadError::Io(err)
    }
}

impl From<serde_json::Error> for SellerLoadError {
    fn from(err: serde_json::Error) -> Self {
        SellerLoadError::Parse(err)
    }
}

/// In-memory directory, optionally seeded from a JSON snapshot.
///
/// The snapshot maps seller IDs to company documents:
/// `{ "seller-1": { "companyName": "...", "companyAddress": [...] } }`.
#[derive(Clone, Debug, Default)]
pub struct InMemorySellerDirectory {
    companies: HashMap<String, CompanyRecord>,
}

impl InMemorySellerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a directory from snapshot JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SellerLoadError> {
        let companies: HashMap<String, CompanyRecord> = serde_json::from_str(json)?;
        Ok(Self { companies })
    }

    /// Loads a directory from a snapshot file on disk.
    pub fn from_json_file(path: &Path) -> Result<Self, SellerLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    #[allow(dead_code)]
    pub fn insert(&mut self, seller_id: impl Into<String>, company: CompanyRecord) {
        self.companies.insert(seller_id.into(), company);
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl SellerDirectory for InMemorySellerDirectory {
    fn company(&self, seller_id: &str) -> Option<CompanyRecord> {
        self.companies.get(seller_id).cloned()
    }
}
