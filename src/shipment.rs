//! Shipment package construction for a sub-order.
//!
//! Turns order products into a carrier-ready shipment: maps product records
//! into packaging items, composes the physical package, derives chargeable
//! weight, resolves pickup and delivery addresses and registers the
//! shipment with the carrier. Registration is best-effort: the computed
//! package is returned even when the carrier call fails, with the tracking
//! fields left empty for a later retry or manual assignment.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::audit::ShipmentAudit;
use crate::carrier::CarrierApi;
use crate::catalog::CartonCatalog;
use crate::config::WarehouseConfig;
use crate::estimate::PaymentType;
use crate::packaging::{PackagingItem, compute_package_dimensions};
use crate::sellers::{CompanyRecord, StoredAddress};

/// Divisor converting a cm³ volume into volumetric weight (air freight).
pub const VOLUMETRIC_DIVISOR: f64 = 5000.0;

/// Box type reported when the single-unit fast path skipped cartonization.
pub const DEFAULT_BOX_TYPE: &str = "S";

/// Caller-input failures while building a shipment.
///
/// These propagate to the caller; they mean the order is not in a state
/// where a shipment can exist at all.
#[derive(Debug)]
pub enum ShipmentError {
    /// `calculate_package_details` was called without any products.
    NoProducts,
    /// No company record exists for the seller.
    CompanyNotFound(String),
    /// The company record has no address to pick up from.
    NoAddressOnFile(String),
}

impl std::fmt::Display for ShipmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShipmentError::NoProducts => {
                write!(f, "cannot build a shipment package without products")
            }
            ShipmentError::CompanyNotFound(seller_id) => {
                write!(f, "no company record found for seller '{}'", seller_id)
            }
            ShipmentError::NoAddressOnFile(company) => {
                write!(f, "company '{}' has no address on file", company)
            }
        }
    }
}

impl std::error::Error for ShipmentError {}

/// Dimensions nested under a product record, in cm.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProductDimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// One product of the order as handed over by the order store.
///
/// Dimensions may live on the record itself or under `dimensions`; weight
/// is kilograms. Whatever is missing falls back to packaging defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub total_price: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dimensions: Option<ProductDimensions>,
}

impl OrderProduct {
    /// Maps the product into the packaging-item shape.
    ///
    /// Flat dimension fields win over the nested `dimensions` object;
    /// kilograms become grams.
    fn packaging_item(&self) -> PackagingItem {
        let nested = self.dimensions.as_ref();
        PackagingItem {
            length: self.length.or_else(|| nested.and_then(|d| d.length)),
            width: self.width.or_else(|| nested.and_then(|d| d.width)),
            height: self.height.or_else(|| nested.and_then(|d| d.height)),
            weight: self.weight.map(|kg| kg * 1000.0),
            quantity: self.quantity,
        }
    }

    fn line_value(&self) -> f64 {
        self.total_price.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// The billed view of the order's physical package.
///
/// Invariant: `chargeable_weight` is never below `actual_weight` or
/// `volumetric_weight`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Physical weight in grams.
    pub actual_weight: f64,
    /// `ceil(L×W×H / 5000)`.
    pub volumetric_weight: f64,
    /// `max(actual_weight, volumetric_weight)`.
    pub chargeable_weight: f64,
    pub box_type: String,
    /// Sum of the products' line totals.
    pub package_value: f64,
}

/// Computes the package details for an order's products.
///
/// Unlike the composer, an empty product list here is a caller error: this
/// entry point only runs once real order products exist.
pub fn calculate_package_details(
    products: &[OrderProduct],
    catalog: &CartonCatalog,
) -> Result<PackageDetails, ShipmentError> {
    if products.is_empty() {
        return Err(ShipmentError::NoProducts);
    }

    let items: Vec<PackagingItem> = products.iter().map(OrderProduct::packaging_item).collect();
    let descriptor = compute_package_dimensions(&items, catalog);

    let volumetric_weight =
        ((descriptor.length * descriptor.width * descriptor.height) / VOLUMETRIC_DIVISOR).ceil();
    let actual_weight = descriptor.weight;

    Ok(PackageDetails {
        length: descriptor.length,
        width: descriptor.width,
        height: descriptor.height,
        actual_weight,
        volumetric_weight,
        chargeable_weight: actual_weight.max(volumetric_weight),
        box_type: descriptor
            .carton
            .unwrap_or_else(|| DEFAULT_BOX_TYPE.to_string()),
        package_value: products.iter().map(OrderProduct::line_value).sum(),
    })
}

/// A fully composed shipment address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentAddress {
    pub name: String,
    pub phone: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

/// The customer-entered delivery address of the order.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsigneeAddress {
    pub name: Option<String>,
    pub phone: Option<i64>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

fn compose_line(line1: Option<&str>, line2: Option<&str>, fallback: &str) -> String {
    let first = line1
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback);
    match line2.map(str::trim).filter(|s| !s.is_empty()) {
        Some(second) => format!("{}, {}", first, second),
        None => first.to_string(),
    }
}

fn fill_address(
    name: Option<&str>,
    phone: Option<i64>,
    line1: Option<&str>,
    line2: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    pincode: Option<&str>,
    country: Option<&str>,
    defaults: &WarehouseConfig,
) -> ShipmentAddress {
    fn non_empty(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|v| !v.is_empty())
    }
    ShipmentAddress {
        name: non_empty(name).unwrap_or_default().to_string(),
        phone: phone.unwrap_or(0),
        address: compose_line(line1, line2, &defaults.default_street),
        city: non_empty(city).unwrap_or(&defaults.default_city).to_string(),
        state: non_empty(state).unwrap_or(&defaults.default_state).to_string(),
        pincode: non_empty(pincode)
            .unwrap_or(&defaults.default_pincode)
            .to_string(),
        country: non_empty(country)
            .unwrap_or(&defaults.default_country)
            .to_string(),
    }
}

/// Resolves the pickup address from the seller's company record.
///
/// Candidate order: the stored primary pickup address, then any address
/// tagged "head office" (case-insensitive), then the first address on
/// file. Incomplete fields fall back to the warehouse defaults so shipment
/// creation is never blocked on optional data; a company without any
/// address at all is an error.
pub fn format_pickup_address(
    company: &CompanyRecord,
    defaults: &WarehouseConfig,
) -> Result<ShipmentAddress, ShipmentError> {
    let candidate: Option<&StoredAddress> = company
        .primary_pickup_address
        .as_ref()
        .or_else(|| {
            company
                .company_address
                .iter()
                .find(|address| address.has_tag("head office"))
        })
        .or_else(|| company.company_address.first());

    let address = candidate.ok_or_else(|| {
        ShipmentError::NoAddressOnFile(
            company
                .company_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        )
    })?;

    Ok(fill_address(
        address
            .contact_name
            .as_deref()
            .or(company.company_name.as_deref()),
        address.phone.or(company.phone),
        address.address_line1.as_deref(),
        address.address_line2.as_deref(),
        address.city.as_deref(),
        address.state.as_deref(),
        address.pincode.as_deref(),
        address.country.as_deref(),
        defaults,
    ))
}

/// Composes the delivery address from the customer's order data.
///
/// Never fails; holes are filled with the documented defaults.
pub fn format_delivery_address(
    consignee: &ConsigneeAddress,
    defaults: &WarehouseConfig,
) -> ShipmentAddress {
    fill_address(
        consignee.name.as_deref(),
        consignee.phone,
        consignee.address_line1.as_deref(),
        consignee.address_line2.as_deref(),
        consignee.city.as_deref(),
        consignee.state.as_deref(),
        consignee.pincode.as_deref(),
        consignee.country.as_deref(),
        defaults,
    )
}

/// The carrier-facing shipment registration payload.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPayload {
    pub order_ref: String,
    pub seller_name: String,
    pub seller_gstin: Option<String>,
    pub consignee_name: String,
    pub consignee_phone: i64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub actual_weight: f64,
    pub volumetric_weight: f64,
    pub chargeable_weight: f64,
    pub box_type: String,
    pub pickup: ShipmentAddress,
    pub drop: ShipmentAddress,
    pub products_description: String,
    pub payment_mode: String,
    pub declared_value: f64,
}

/// One sub-order to ship.
#[derive(Clone, Debug)]
pub struct ShipmentOrder {
    pub order_ref: String,
    pub products: Vec<OrderProduct>,
    pub consignee: ConsigneeAddress,
    pub payment_mode: PaymentType,
}

/// The computed shipment package for a sub-order.
///
/// `tracking_id` and `courier_partner` stay empty when carrier
/// registration failed; the caller may retry or assign tracking manually.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPackage {
    pub order_ref: String,
    pub package: PackageDetails,
    pub pickup: ShipmentAddress,
    pub drop: ShipmentAddress,
    #[schema(nullable = true)]
    pub tracking_id: Option<String>,
    #[schema(nullable = true)]
    pub courier_partner: Option<String>,
}

fn products_description(products: &[OrderProduct]) -> String {
    products
        .iter()
        .map(|product| {
            let name = product
                .name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Item");
            let quantity = crate::types::quantity_or_min(product.quantity);
            format!("{} x{}", name, quantity)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the shipment package for an order and registers it with the
/// carrier.
///
/// Package computation and address resolution must succeed; carrier
/// registration is best-effort. A failed or rejected registration is
/// reported to the audit sink and the package is returned with empty
/// tracking fields.
pub async fn create_shipment_package<C: CarrierApi>(
    order: &ShipmentOrder,
    company: Option<&CompanyRecord>,
    seller_id: &str,
    catalog: &CartonCatalog,
    defaults: &WarehouseConfig,
    carrier: &C,
    audit: &dyn ShipmentAudit,
) -> Result<ShipmentPackage, ShipmentError> {
    let package = calculate_package_details(&order.products, catalog)?;

    let company =
        company.ok_or_else(|| ShipmentError::CompanyNotFound(seller_id.to_string()))?;
    let pickup = format_pickup_address(company, defaults)?;
    let drop = format_delivery_address(&order.consignee, defaults);

    let payload = ShipmentPayload {
        order_ref: order.order_ref.clone(),
        seller_name: company.company_name.clone().unwrap_or_default(),
        seller_gstin: company.gstin_number.clone(),
        consignee_name: drop.name.clone(),
        consignee_phone: drop.phone,
        length: package.length,
        width: package.width,
        height: package.height,
        actual_weight: package.actual_weight,
        volumetric_weight: package.volumetric_weight,
        chargeable_weight: package.chargeable_weight,
        box_type: package.box_type.clone(),
        pickup: pickup.clone(),
        drop: drop.clone(),
        products_description: products_description(&order.products),
        payment_mode: order.payment_mode.as_str().to_string(),
        declared_value: package.package_value,
    };

    let (tracking_id, courier_partner) = match carrier.create_shipment(&payload).await {
        Ok(response) if response.success => {
            audit.shipment_created(&order.order_ref, &package, "carrier_confirmed");
            (response.tracking_id, response.vendor)
        }
        Ok(response) => {
            audit.shipment_error(
                &order.order_ref,
                "CARRIER_REJECTED",
                "carrier declined the shipment registration",
                &format!("vendor: {:?}", response.vendor),
            );
            audit.shipment_created(&order.order_ref, &package, "carrier_pending");
            (None, None)
        }
        Err(err) => {
            audit.shipment_error(
                &order.order_ref,
                "CARRIER_UNREACHABLE",
                &err.to_string(),
                "hexalog create_shipment",
            );
            audit.shipment_created(&order.order_ref, &package, "carrier_pending");
            (None, None)
        }
    };

    Ok(ShipmentPackage {
        order_ref: order.order_ref.clone(),
        package,
        pickup,
        drop,
        tracking_id,
        courier_partner,
    })
}
