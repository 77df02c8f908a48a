//! Shipment observability sink.
//!
//! Shipment creation emits fire-and-forget events: one when a package has
//! been computed, one for every soft failure along the way. The sink is a
//! trait so tests can capture events; the default implementation writes
//! console lines. A sink must never fail the packaging result.

use crate::shipment::PackageDetails;

/// Receiver for shipment lifecycle events.
pub trait ShipmentAudit: Send + Sync {
    /// A shipment package was computed for `order_ref`.
    ///
    /// `event_type` distinguishes carrier-confirmed packages from packages
    /// still waiting for a tracking assignment.
    fn shipment_created(&self, order_ref: &str, package: &PackageDetails, event_type: &str);

    /// A non-fatal error occurred while registering the shipment.
    fn shipment_error(&self, order_ref: &str, code: &str, message: &str, context: &str);
}

/// Console sink used by the service binary.
pub struct ConsoleAudit;

impl ShipmentAudit for ConsoleAudit {
    fn shipment_created(&self, order_ref: &str, package: &PackageDetails, event_type: &str) {
        println!(
            "📦 [{}] package ready ({}): box {}, {} g chargeable, value {:.2}",
            order_ref, event_type, package.box_type, package.chargeable_weight, package.package_value
        );
    }

    fn shipment_error(&self, order_ref: &str, code: &str, message: &str, context: &str) {
        eprintln!("⚠️ [{}] {}: {} ({})", order_ref, code, message, context);
    }
}
