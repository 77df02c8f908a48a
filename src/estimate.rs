//! Checkout-time shipping parameter calculation and validation.
//!
//! At checkout the cart has prices and quantities but rarely full
//! product-level dimension data, so the calculator uses its own, slightly
//! larger defaults before delegating to the package composer. The produced
//! parameters are the carrier-agnostic request shape every estimate call
//! uses, validated before anything is sent over the wire.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::CartonCatalog;
use crate::config::WarehouseConfig;
use crate::packaging::{PackagingItem, compute_package_dimensions};
use crate::types::{is_positive_number, is_six_digit_pincode, or_positive, quantity_or_min, round_money};

/// Default length for a cart item without dimension data, in cm.
pub const CHECKOUT_DEFAULT_LENGTH_CM: f64 = 15.0;
/// Default width for a cart item without dimension data, in cm.
pub const CHECKOUT_DEFAULT_WIDTH_CM: f64 = 12.0;
/// Default height for a cart item without dimension data, in cm.
pub const CHECKOUT_DEFAULT_HEIGHT_CM: f64 = 8.0;
/// Default weight for a cart item without weight data, in grams.
pub const CHECKOUT_DEFAULT_WEIGHT_G: f64 = 300.0;

/// Payment mode accepted by the carriers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentType {
    Prepaid,
    #[serde(rename = "COD")]
    Cod,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Prepaid => "Prepaid",
            PaymentType::Cod => "COD",
        }
    }
}

/// One cart line at checkout.
///
/// Dimensions are centimeters, weight is grams. `total_price` is the
/// precomputed line total; when absent the total is `price × quantity`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub total_price: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl CartItem {
    fn line_total(&self) -> f64 {
        match self.total_price {
            Some(total) if total.is_finite() && total > 0.0 => total,
            _ => or_positive(self.price, 0.0) * f64::from(quantity_or_min(self.quantity)),
        }
    }

    fn packaging_item(&self) -> PackagingItem {
        PackagingItem {
            length: Some(or_positive(self.length, CHECKOUT_DEFAULT_LENGTH_CM)),
            width: Some(or_positive(self.width, CHECKOUT_DEFAULT_WIDTH_CM)),
            height: Some(or_positive(self.height, CHECKOUT_DEFAULT_HEIGHT_CM)),
            weight: Some(or_positive(self.weight, CHECKOUT_DEFAULT_WEIGHT_G)),
            quantity: self.quantity,
        }
    }
}

/// Caller-supplied knobs for the checkout estimate.
#[derive(Clone, Debug)]
pub struct EstimateOptions {
    /// Origin pincode; defaults to the configured warehouse pincode.
    pub pickup_pincode: Option<String>,
    pub drop_pincode: String,
    pub payment_type: PaymentType,
}

/// The validated, carrier-agnostic shipping request shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingEstimateParams {
    pub pickup_pincode: String,
    pub drop_pincode: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    /// `"Prepaid"` or `"COD"`.
    pub payment_type: String,
    pub invoice_amount: f64,
    pub carton_type: String,
}

/// Outcome of validating shipping parameters.
///
/// Never an error: UI callers render all problems at once.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Checks a shipping request before it is sent to any carrier.
///
/// All rules are evaluated independently; every violation lands in the
/// report instead of short-circuiting at the first one.
pub fn validate_shipping_params(params: &ShippingEstimateParams) -> ValidationReport {
    let mut errors = Vec::new();

    if !is_six_digit_pincode(&params.pickup_pincode) {
        errors.push("pickupPincode must be exactly 6 digits".to_string());
    }
    if !is_six_digit_pincode(&params.drop_pincode) {
        errors.push("dropPincode must be exactly 6 digits".to_string());
    }
    for (name, value) in [
        ("length", params.length),
        ("width", params.width),
        ("height", params.height),
        ("weight", params.weight),
    ] {
        if !is_positive_number(value) {
            errors.push(format!("{} must be a positive number", name));
        }
    }
    if params.payment_type != "Prepaid" && params.payment_type != "COD" {
        errors.push("paymentType must be 'Prepaid' or 'COD'".to_string());
    }
    if !is_positive_number(params.invoice_amount) {
        errors.push("invoiceAmount must be a positive number".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Failures producing checkout shipping parameters.
#[derive(Debug)]
pub enum EstimateError {
    /// No order items were supplied.
    NoItems,
    /// The computed parameters failed validation.
    InvalidParams(Vec<String>),
}

impl std::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateError::NoItems => {
                write!(f, "cannot estimate shipping for an empty order")
            }
            EstimateError::InvalidParams(errors) => {
                write!(f, "invalid shipping parameters: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for EstimateError {}

/// Transforms cart items into validated shipping parameters.
///
/// Applies checkout defaults per item, composes the package against the
/// catalog, sums the invoice amount (rounded to 2 decimal places) and
/// validates the result. Invalid parameters surface as one aggregate
/// error.
pub fn calculate_shipping_params(
    items: &[CartItem],
    options: &EstimateOptions,
    catalog: &CartonCatalog,
    defaults: &WarehouseConfig,
) -> Result<ShippingEstimateParams, EstimateError> {
    if items.is_empty() {
        return Err(EstimateError::NoItems);
    }

    let packaging_items: Vec<PackagingItem> = items.iter().map(CartItem::packaging_item).collect();
    let descriptor = compute_package_dimensions(&packaging_items, catalog);

    let invoice_amount = round_money(items.iter().map(CartItem::line_total).sum());
    let pickup_pincode = options
        .pickup_pincode
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(&defaults.default_pincode)
        .to_string();

    let params = ShippingEstimateParams {
        pickup_pincode,
        drop_pincode: options.drop_pincode.trim().to_string(),
        length: descriptor.length,
        width: descriptor.width,
        height: descriptor.height,
        weight: descriptor.weight,
        payment_type: options.payment_type.as_str().to_string(),
        invoice_amount,
        carton_type: descriptor.carton.unwrap_or_else(|| "S".to_string()),
    };

    let report = validate_shipping_params(&params);
    if !report.is_valid {
        return Err(EstimateError::InvalidParams(report.errors));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CartonCatalog {
        CartonCatalog::standard()
    }

    fn defaults() -> WarehouseConfig {
        WarehouseConfig::default()
    }

    fn valid_params() -> ShippingEstimateParams {
        ShippingEstimateParams {
            pickup_pincode: "560068".to_string(),
            drop_pincode: "600001".to_string(),
            length: 15.0,
            width: 12.0,
            height: 8.0,
            weight: 300.0,
            payment_type: "Prepaid".to_string(),
            invoice_amount: 499.0,
            carton_type: "S".to_string(),
        }
    }

    #[test]
    fn valid_params_pass_validation() {
        let report = validate_shipping_params(&valid_params());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn short_pincode_is_the_only_reported_error() {
        let mut params = valid_params();
        params.pickup_pincode = "56006".to_string();
        let report = validate_shipping_params(&params);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("pickupPincode"));
    }

    #[test]
    fn negative_weight_is_the_only_reported_error() {
        let mut params = valid_params();
        params.weight = -250.0;
        let report = validate_shipping_params(&params);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("weight"));
    }

    #[test]
    fn unknown_payment_type_is_rejected() {
        let mut params = valid_params();
        params.payment_type = "Cheque".to_string();
        let report = validate_shipping_params(&params);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("paymentType"));
    }

    #[test]
    fn cod_is_an_accepted_payment_type() {
        let mut params = valid_params();
        params.payment_type = "COD".to_string();
        assert!(validate_shipping_params(&params).is_valid);
    }

    #[test]
    fn zero_invoice_amount_is_rejected() {
        let mut params = valid_params();
        params.invoice_amount = 0.0;
        let report = validate_shipping_params(&params);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("invoiceAmount"));
    }

    #[test]
    fn violations_are_collected_not_short_circuited() {
        let params = ShippingEstimateParams {
            pickup_pincode: "abc".to_string(),
            drop_pincode: "12345".to_string(),
            length: 0.0,
            width: -1.0,
            height: f64::NAN,
            weight: 0.0,
            payment_type: "Later".to_string(),
            invoice_amount: -5.0,
            carton_type: "S".to_string(),
        };
        let report = validate_shipping_params(&params);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 8);
    }

    fn options(drop: &str) -> EstimateOptions {
        EstimateOptions {
            pickup_pincode: None,
            drop_pincode: drop.to_string(),
            payment_type: PaymentType::Prepaid,
        }
    }

    #[test]
    fn empty_cart_is_an_error() {
        let err = calculate_shipping_params(&[], &options("600001"), &catalog(), &defaults())
            .unwrap_err();
        assert!(matches!(err, EstimateError::NoItems));
    }

    #[test]
    fn single_default_item_uses_checkout_defaults_and_fast_path() {
        let items = vec![CartItem {
            price: Some(499.0),
            quantity: Some(1),
            ..CartItem::default()
        }];
        let params = calculate_shipping_params(&items, &options("600001"), &catalog(), &defaults())
            .expect("params computed");
        assert_eq!(params.length, CHECKOUT_DEFAULT_LENGTH_CM);
        assert_eq!(params.width, CHECKOUT_DEFAULT_WIDTH_CM);
        assert_eq!(params.height, CHECKOUT_DEFAULT_HEIGHT_CM);
        assert_eq!(params.weight, CHECKOUT_DEFAULT_WEIGHT_G);
        assert_eq!(params.carton_type, "S");
        assert_eq!(params.pickup_pincode, defaults().default_pincode);
        assert_eq!(params.invoice_amount, 499.0);
    }

    #[test]
    fn caller_supplied_pickup_pincode_wins_over_the_default() {
        let items = vec![CartItem {
            price: Some(100.0),
            ..CartItem::default()
        }];
        let opts = EstimateOptions {
            pickup_pincode: Some("110001".to_string()),
            drop_pincode: "600001".to_string(),
            payment_type: PaymentType::Cod,
        };
        let params =
            calculate_shipping_params(&items, &opts, &catalog(), &defaults()).expect("params computed");
        assert_eq!(params.pickup_pincode, "110001");
        assert_eq!(params.payment_type, "COD");
    }

    #[test]
    fn invoice_amount_is_rounded_to_two_decimals() {
        let items = vec![
            CartItem {
                total_price: Some(10.111),
                ..CartItem::default()
            },
            CartItem {
                total_price: Some(10.111),
                ..CartItem::default()
            },
        ];
        let params = calculate_shipping_params(&items, &options("600001"), &catalog(), &defaults())
            .expect("params computed");
        assert_eq!(params.invoice_amount, 20.22);
    }

    #[test]
    fn line_total_prefers_precomputed_value_over_price_times_quantity() {
        let item = CartItem {
            price: Some(100.0),
            quantity: Some(3),
            total_price: Some(250.0),
            ..CartItem::default()
        };
        assert_eq!(item.line_total(), 250.0);

        let computed = CartItem {
            price: Some(49.75),
            quantity: Some(2),
            ..CartItem::default()
        };
        assert_eq!(computed.line_total(), 99.5);
    }

    #[test]
    fn invalid_drop_pincode_surfaces_as_an_aggregate_error() {
        let items = vec![CartItem {
            price: Some(100.0),
            ..CartItem::default()
        }];
        let err = calculate_shipping_params(&items, &options("60000"), &catalog(), &defaults())
            .unwrap_err();
        match err {
            EstimateError::InvalidParams(errors) => {
                assert!(errors.iter().any(|e| e.contains("dropPincode")));
            }
            other => panic!("expected InvalidParams, got {:?}", other),
        }
    }

    #[test]
    fn zero_priced_cart_fails_the_invoice_check() {
        let items = vec![CartItem::default()];
        let err = calculate_shipping_params(&items, &options("600001"), &catalog(), &defaults())
            .unwrap_err();
        match err {
            EstimateError::InvalidParams(errors) => {
                assert!(errors.iter().any(|e| e.contains("invoiceAmount")));
            }
            other => panic!("expected InvalidParams, got {:?}", other),
        }
    }

    #[test]
    fn multi_item_cart_is_cartonized_with_checkout_defaults() {
        // Two default units: 2 × 1440 cm³ and 600 g fit the smallest box.
        let items = vec![
            CartItem {
                price: Some(100.0),
                ..CartItem::default()
            },
            CartItem {
                price: Some(150.0),
                ..CartItem::default()
            },
        ];
        let params = calculate_shipping_params(&items, &options("600001"), &catalog(), &defaults())
            .expect("params computed");
        assert_eq!(params.carton_type, "S");
        assert_eq!(params.weight, 600.0);
        assert_eq!(params.invoice_amount, 250.0);
    }
}
