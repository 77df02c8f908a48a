//! Package dimension composition for order line items.
//!
//! Takes the heterogeneous line items of one order, fills in defaults for
//! missing measurements, aggregates volume and weight across quantities and
//! selects a carton for the whole order. A single unit ships in its own box,
//! so that case bypasses cartonization entirely.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::CartonCatalog;
use crate::types::{or_positive, quantity_or_min};

/// Default length for a line item with no length on record, in cm.
pub const DEFAULT_ITEM_LENGTH_CM: f64 = 10.0;
/// Default width for a line item with no width on record, in cm.
pub const DEFAULT_ITEM_WIDTH_CM: f64 = 10.0;
/// Default height for a line item with no height on record, in cm.
pub const DEFAULT_ITEM_HEIGHT_CM: f64 = 5.0;
/// Default weight for a line item with no weight on record, in grams.
pub const DEFAULT_ITEM_WEIGHT_G: f64 = 250.0;

/// One distinct product line of an order, as handed to the packaging core.
///
/// All fields are optional; missing, zero or non-finite values fall back to
/// the documented defaults during normalization. Dimensions are centimeters,
/// weight is grams.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PackagingItem {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub quantity: Option<i64>,
}

impl PackagingItem {
    /// Convenience constructor for a fully specified item.
    #[allow(dead_code)]
    pub fn new(length: f64, width: f64, height: f64, weight: f64, quantity: i64) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
            weight: Some(weight),
            quantity: Some(quantity),
        }
    }
}

/// A line item after defaulting, ready for aggregation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedItem {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub quantity: u32,
}

impl NormalizedItem {
    /// Volume of a single unit in cm³.
    #[inline]
    pub fn unit_volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Replaces missing or unusable fields of every item with the documented
/// defaults. Pure; never fails.
pub fn normalize_items(items: &[PackagingItem]) -> Vec<NormalizedItem> {
    items
        .iter()
        .map(|item| NormalizedItem {
            length: or_positive(item.length, DEFAULT_ITEM_LENGTH_CM),
            width: or_positive(item.width, DEFAULT_ITEM_WIDTH_CM),
            height: or_positive(item.height, DEFAULT_ITEM_HEIGHT_CM),
            weight: or_positive(item.weight, DEFAULT_ITEM_WEIGHT_G),
            quantity: quantity_or_min(item.quantity),
        })
        .collect()
}

/// Aggregate volume and weight of normalized items across quantities.
fn aggregate(items: &[NormalizedItem]) -> (f64, f64) {
    items.iter().fold((0.0, 0.0), |(volume, weight), item| {
        let qty = f64::from(item.quantity);
        (volume + item.unit_volume() * qty, weight + item.weight * qty)
    })
}

/// The single physical package representing an entire order's items.
///
/// `carton` is `None` when the single-item fast path was used (no
/// aggregation occurred), otherwise the selected carton's code or
/// `"OVERSIZE"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackageDescriptor {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[schema(nullable = true)]
    pub carton: Option<String>,
}

impl PackageDescriptor {
    /// Minimal default package for an order with no line items at all.
    ///
    /// An empty line list is a degenerate case, not an error, at this level.
    fn minimal_default() -> Self {
        Self {
            length: 20.0,
            width: 15.0,
            height: 10.0,
            weight: 500.0,
            carton: Some("S".to_string()),
        }
    }
}

/// Computes the physical package for an order's line items.
///
/// A single item with quantity 1 ships in its own box: its ceiled
/// dimensions and weight are returned directly with `carton: None`. Any
/// other input is normalized, aggregated across quantities and run through
/// carton selection against the given catalog.
pub fn compute_package_dimensions(
    items: &[PackagingItem],
    catalog: &CartonCatalog,
) -> PackageDescriptor {
    if items.is_empty() {
        return PackageDescriptor::minimal_default();
    }

    let normalized = normalize_items(items);

    if let [single] = normalized.as_slice() {
        if single.quantity == 1 {
            return PackageDescriptor {
                length: single.length.ceil(),
                width: single.width.ceil(),
                height: single.height.ceil(),
                weight: single.weight.ceil(),
                carton: None,
            };
        }
    }

    let (total_volume, total_weight) = aggregate(&normalized);
    let carton = catalog.pick(total_volume, total_weight);

    PackageDescriptor {
        length: carton.length,
        width: carton.width,
        height: carton.height,
        weight: total_weight.ceil(),
        carton: Some(carton.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Carton, OVERSIZE_CODE};

    fn catalog() -> CartonCatalog {
        CartonCatalog::standard()
    }

    #[test]
    fn empty_order_gets_the_minimal_default_package() {
        let package = compute_package_dimensions(&[], &catalog());
        assert_eq!(
            package,
            PackageDescriptor {
                length: 20.0,
                width: 15.0,
                height: 10.0,
                weight: 500.0,
                carton: Some("S".to_string()),
            }
        );
    }

    #[test]
    fn normalization_fills_every_missing_field() {
        let normalized = normalize_items(&[PackagingItem::default()]);
        assert_eq!(
            normalized,
            vec![NormalizedItem {
                length: 10.0,
                width: 10.0,
                height: 5.0,
                weight: 250.0,
                quantity: 1,
            }]
        );
    }

    #[test]
    fn normalization_treats_zero_and_nan_as_missing() {
        let item = PackagingItem {
            length: Some(0.0),
            width: Some(f64::NAN),
            height: Some(-2.0),
            weight: Some(0.0),
            quantity: Some(0),
        };
        let normalized = normalize_items(&[item]);
        assert_eq!(normalized[0].length, 10.0);
        assert_eq!(normalized[0].width, 10.0);
        assert_eq!(normalized[0].height, 5.0);
        assert_eq!(normalized[0].weight, 250.0);
        assert_eq!(normalized[0].quantity, 1);
    }

    #[test]
    fn single_unit_ships_in_its_own_box() {
        let items = vec![PackagingItem::new(12.0, 8.0, 6.0, 300.0, 1)];
        let package = compute_package_dimensions(&items, &catalog());
        assert_eq!(
            package,
            PackageDescriptor {
                length: 12.0,
                width: 8.0,
                height: 6.0,
                weight: 300.0,
                carton: None,
            }
        );
    }

    #[test]
    fn fast_path_ceils_fractional_measurements() {
        let items = vec![PackagingItem::new(12.2, 8.7, 6.1, 300.4, 1)];
        let package = compute_package_dimensions(&items, &catalog());
        assert_eq!(package.length, 13.0);
        assert_eq!(package.width, 9.0);
        assert_eq!(package.height, 7.0);
        assert_eq!(package.weight, 301.0);
        assert_eq!(package.carton, None);
    }

    #[test]
    fn fast_path_ignores_the_carton_catalog() {
        // A catalog with one absurd entry must not influence the single-unit path.
        let tiny = CartonCatalog::new(vec![Carton::new("NANO", 1.0, 1.0, 1.0, 1.0)]);
        let items = vec![PackagingItem::new(12.0, 8.0, 6.0, 300.0, 1)];
        let package = compute_package_dimensions(&items, &tiny);
        assert_eq!(package.carton, None);
        assert_eq!(package.length, 12.0);
    }

    #[test]
    fn single_item_with_quantity_above_one_is_cartonized() {
        let items = vec![PackagingItem::new(10.0, 10.0, 5.0, 200.0, 2)];
        let package = compute_package_dimensions(&items, &catalog());
        // 2 × 500 cm³ and 400 g fit the smallest box.
        assert_eq!(package.carton.as_deref(), Some("S"));
        assert_eq!(package.length, 20.0);
        assert_eq!(package.weight, 400.0);
    }

    #[test]
    fn mixed_order_picks_the_boundary_correct_carton() {
        // 30×22×15 = 9900 cm³ plus 2 × 500 cm³ → 10 900 cm³ total, 3 900 g.
        // That exceeds M's 9 900 cm³ capacity, so the selector must move on to L.
        let items = vec![
            PackagingItem::new(30.0, 22.0, 15.0, 3_500.0, 1),
            PackagingItem::new(10.0, 10.0, 5.0, 200.0, 2),
        ];
        let package = compute_package_dimensions(&items, &catalog());
        assert_eq!(package.carton.as_deref(), Some("L"));
        assert_eq!(package.length, 40.0);
        assert_eq!(package.width, 30.0);
        assert_eq!(package.height, 20.0);
        assert_eq!(package.weight, 3_900.0);
    }

    #[test]
    fn heavy_order_falls_through_to_oversize() {
        let items = vec![PackagingItem::new(40.0, 40.0, 40.0, 9_000.0, 2)];
        let package = compute_package_dimensions(&items, &catalog());
        assert_eq!(package.carton.as_deref(), Some(OVERSIZE_CODE));
        assert_eq!(package.weight, 18_000.0);
    }

    #[test]
    fn composition_is_idempotent() {
        let items = vec![
            PackagingItem::new(30.0, 22.0, 15.0, 3_500.0, 1),
            PackagingItem {
                quantity: Some(3),
                ..PackagingItem::default()
            },
        ];
        let first = compute_package_dimensions(&items, &catalog());
        let second = compute_package_dimensions(&items, &catalog());
        assert_eq!(first, second);
    }

    #[test]
    fn selected_carton_covers_aggregates_for_generated_orders() {
        let catalog = catalog();
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 16) as u32
        };

        for _ in 0..50 {
            let count = 2 + (next() % 19) as usize;
            let items: Vec<PackagingItem> = (0..count)
                .map(|_| {
                    PackagingItem::new(
                        f64::from(1 + next() % 45),
                        f64::from(1 + next() % 35),
                        f64::from(1 + next() % 25),
                        f64::from(50 + next() % 4_000),
                        i64::from(1 + next() % 4),
                    )
                })
                .collect();

            let normalized = normalize_items(&items);
            let (total_volume, total_weight) = super::aggregate(&normalized);
            let carton = catalog.pick(total_volume, total_weight);

            assert!(
                carton.volume() + crate::types::EPSILON_GENERAL >= total_volume,
                "carton {} cannot hold {} cm³",
                carton.code,
                total_volume
            );
            assert!(
                carton.max_weight + crate::types::EPSILON_GENERAL >= total_weight,
                "carton {} rated below {} g",
                carton.code,
                total_weight
            );
        }
    }
}
