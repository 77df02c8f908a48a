//! REST API for the packaging service.
//!
//! Exposes the package composer, the shipping-estimate flow and shipment
//! creation over HTTP. Uses Axum as the web framework and supports CORS.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::audit::{ConsoleAudit, ShipmentAudit};
use crate::carrier::{CarrierApi, HexalogClient, ShippingEstimate, TurnaroundDays};
use crate::catalog::CartonCatalog;
use crate::config::{AppConfig, WarehouseConfig};
use crate::estimate::{
    CartItem, EstimateError, EstimateOptions, PaymentType, ShippingEstimateParams,
    calculate_shipping_params, validate_shipping_params,
};
use crate::packaging::{PackageDescriptor, PackagingItem, compute_package_dimensions};
use crate::sellers::{InMemorySellerDirectory, SellerDirectory};
use crate::shipment::{
    ConsigneeAddress, OrderProduct, PackageDetails, ProductDimensions, ShipmentAddress,
    ShipmentOrder, ShipmentPackage, create_shipment_package,
};

#[derive(Clone)]
struct ApiState {
    catalog: CartonCatalog,
    warehouse: WarehouseConfig,
    carrier: Arc<HexalogClient>,
    sellers: Arc<dyn SellerDirectory>,
    audit: Arc<dyn ShipmentAudit>,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>cartonize API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the package composition endpoint.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "items": [
            { "length": 30.0, "width": 22.0, "height": 15.0, "weight": 3500.0, "quantity": 1 },
            { "length": 10.0, "width": 10.0, "height": 5.0, "weight": 200.0, "quantity": 2 }
        ]
    })
)]
pub struct PackageRequest {
    pub items: Vec<PackagingItem>,
}

/// Request structure for the checkout-time estimate endpoint.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "items": [
            { "price": 499.0, "quantity": 2 }
        ],
        "dropPincode": "600001",
        "paymentType": "Prepaid"
    })
)]
pub struct CheckoutEstimateRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub pickup_pincode: Option<String>,
    pub drop_pincode: String,
    pub payment_type: PaymentType,
}

/// Response of the checkout-time estimate endpoint.
#[derive(Serialize, ToSchema)]
pub struct CheckoutEstimateResponse {
    pub params: ShippingEstimateParams,
    pub estimate: ShippingEstimate,
}

/// Request structure for shipment creation.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
    pub order_ref: String,
    pub seller_id: String,
    pub products: Vec<OrderProduct>,
    pub consignee: ConsigneeAddress,
    #[serde(default)]
    #[schema(nullable = true)]
    pub payment_mode: Option<PaymentType>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    message: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, message))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(message: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        message,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handle_package,
        handle_shipping_estimate,
        handle_checkout_estimate,
        handle_create_shipment
    ),
    components(
        schemas(
            PackageRequest,
            PackagingItem,
            PackageDescriptor,
            ShippingEstimateParams,
            ShippingEstimate,
            TurnaroundDays,
            CheckoutEstimateRequest,
            CheckoutEstimateResponse,
            CartItem,
            PaymentType,
            CreateShipmentRequest,
            OrderProduct,
            ProductDimensions,
            ConsigneeAddress,
            ShipmentPackage,
            PackageDetails,
            ShipmentAddress,
            ErrorResponse
        )
    ),
    tags((name = "shipping", description = "Endpoints for packaging and shipment creation"))
)]
struct ApiDoc;

/// Starts the API server.
///
/// Configures CORS for cross-origin requests from the panels and blocks
/// until the server is terminated.
pub async fn start_api_server(config: AppConfig, sellers: InMemorySellerDirectory) {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let carrier = match HexalogClient::from_config(&config.carrier) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            panic!("❌ Could not initialize the carrier client: {}", err);
        }
    };

    let state = ApiState {
        catalog: CartonCatalog::standard(),
        warehouse: config.warehouse.clone(),
        carrier,
        sellers: Arc::new(sellers),
        audit: Arc::new(ConsoleAudit),
    };

    let app = Router::new()
        // API endpoints
        .route("/package", post(handle_package))
        .route("/api/hexalog/shipping-estimate", post(handle_shipping_estimate))
        .route("/checkout/shipping-estimate", post(handle_checkout_estimate))
        .route("/shipments", post(handle_create_shipment))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state);

    let addr = config.api.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            panic!("❌ Could not bind API server to {}: {}", addr, err);
        }
    };

    let display_host = config.api.display_host().to_string();
    println!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.api.port()
    );
    if config.api.binds_to_all_interfaces() && config.api.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.api.port());
    }
    println!("📦 API Endpoints:");
    println!("   - POST /package");
    println!("   - POST /api/hexalog/shipping-estimate");
    println!("   - POST /checkout/shipping-estimate");
    println!("   - POST /shipments");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for the POST /package endpoint.
///
/// Composes the physical package for a list of order line items.
#[utoipa::path(
    post,
    path = "/package",
    request_body = PackageRequest,
    responses(
        (status = 200, description = "Computed package descriptor", body = PackageDescriptor),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request body",
            body = ErrorResponse
        )
    ),
    tag = "shipping"
)]
async fn handle_package(
    State(state): State<ApiState>,
    payload: Result<Json<PackageRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let descriptor = compute_package_dimensions(&request.items, &state.catalog);
    (StatusCode::OK, Json(descriptor)).into_response()
}

/// Handler for the POST /api/hexalog/shipping-estimate endpoint.
///
/// Validates the shipping parameters and quotes the carrier. A failed
/// carrier call degrades to the static fallback rate so checkout can always
/// show a shipping line.
#[utoipa::path(
    post,
    path = "/api/hexalog/shipping-estimate",
    request_body = ShippingEstimateParams,
    responses(
        (status = 200, description = "Shipping cost estimate", body = ShippingEstimate),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid shipping parameters",
            body = ErrorResponse
        )
    ),
    tag = "shipping"
)]
async fn handle_shipping_estimate(
    State(state): State<ApiState>,
    payload: Result<Json<ShippingEstimateParams>, JsonRejection>,
) -> impl IntoResponse {
    let Json(params) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let report = validate_shipping_params(&params);
    if !report.is_valid {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid shipping parameters",
            report.errors.join("; "),
        );
    }

    let estimate = match state.carrier.shipping_estimate(&params).await {
        Ok(estimate) => estimate,
        Err(err) => {
            eprintln!("⚠️ Shipping estimate failed: {}. Using fallback rate.", err);
            ShippingEstimate::fallback()
        }
    };

    (StatusCode::OK, Json(estimate)).into_response()
}

/// Handler for the POST /checkout/shipping-estimate endpoint.
///
/// Runs the checkout-time calculator over raw cart items, then quotes the
/// carrier with the validated parameters.
#[utoipa::path(
    post,
    path = "/checkout/shipping-estimate",
    request_body = CheckoutEstimateRequest,
    responses(
        (status = 200, description = "Calculated parameters and estimate", body = CheckoutEstimateResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Empty cart or invalid parameters",
            body = ErrorResponse
        )
    ),
    tag = "shipping"
)]
async fn handle_checkout_estimate(
    State(state): State<ApiState>,
    payload: Result<Json<CheckoutEstimateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let options = EstimateOptions {
        pickup_pincode: request.pickup_pincode,
        drop_pincode: request.drop_pincode,
        payment_type: request.payment_type,
    };

    let params = match calculate_shipping_params(
        &request.items,
        &options,
        &state.catalog,
        &state.warehouse,
    ) {
        Ok(params) => params,
        Err(err @ EstimateError::NoItems) => return validation_error(err.to_string()),
        Err(EstimateError::InvalidParams(errors)) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid shipping parameters",
                errors.join("; "),
            );
        }
    };

    let estimate = match state.carrier.shipping_estimate(&params).await {
        Ok(estimate) => estimate,
        Err(err) => {
            eprintln!("⚠️ Shipping estimate failed: {}. Using fallback rate.", err);
            ShippingEstimate::fallback()
        }
    };

    (
        StatusCode::OK,
        Json(CheckoutEstimateResponse { params, estimate }),
    )
        .into_response()
}

/// Handler for the POST /shipments endpoint.
///
/// Builds the shipment package for a sub-order and registers it with the
/// carrier. Carrier failures do not fail the request; the returned package
/// then carries empty tracking fields.
#[utoipa::path(
    post,
    path = "/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 200, description = "Computed shipment package", body = ShipmentPackage),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Empty products, unknown seller or no address on file",
            body = ErrorResponse
        )
    ),
    tag = "shipping"
)]
async fn handle_create_shipment(
    State(state): State<ApiState>,
    payload: Result<Json<CreateShipmentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    println!(
        "📥 New shipment request: order {}, {} products",
        request.order_ref,
        request.products.len()
    );

    let company = state.sellers.company(&request.seller_id);
    let order = ShipmentOrder {
        order_ref: request.order_ref,
        products: request.products,
        consignee: request.consignee,
        payment_mode: request.payment_mode.unwrap_or(PaymentType::Prepaid),
    };

    match create_shipment_package(
        &order,
        company.as_ref(),
        &request.seller_id,
        &state.catalog,
        &state.warehouse,
        &*state.carrier,
        &*state.audit,
    )
    .await
    {
        Ok(package) => (StatusCode::OK, Json(package)).into_response(),
        Err(err) => validation_error(err.to_string()),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
