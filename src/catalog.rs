//! Carton catalog and cartonization selection.
//!
//! The catalog is a small table of standard box sizes. Selection is a
//! smallest-fits-first scan over both the volume and the weight constraint;
//! when nothing in the catalog holds the order, a cubic OVERSIZE carton is
//! synthesized from the aggregate volume.
//!
//! The fit check compares aggregate item volume against the raw box volume.
//! That is a deliberate approximation carried over from the production
//! behavior, not a 3D bin-packing model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::EPSILON_GENERAL;

/// Carton code used for the synthesized fallback box.
pub const OVERSIZE_CODE: &str = "OVERSIZE";

/// Minimum rated weight of a synthesized OVERSIZE carton, in grams.
pub const OVERSIZE_MIN_MAX_WEIGHT_G: f64 = 15_000.0;

/// A standard box size from the catalog.
///
/// Dimensions are centimeters, `max_weight` is grams.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Carton {
    pub code: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
}

impl Carton {
    /// Creates a catalog entry.
    pub fn new(code: impl Into<String>, length: f64, width: f64, height: f64, max_weight: f64) -> Self {
        Self {
            code: code.into(),
            length,
            width,
            height,
            max_weight,
        }
    }

    /// Volume capacity of the box in cm³.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Checks whether an aggregate volume and weight both fit this box.
    ///
    /// Both constraints must hold; a carton that fits by volume but not by
    /// weight is rejected, and vice versa.
    pub fn holds(&self, total_volume_cm3: f64, total_weight_g: f64) -> bool {
        total_volume_cm3 <= self.volume() + EPSILON_GENERAL
            && total_weight_g <= self.max_weight + EPSILON_GENERAL
    }

    /// Synthesizes a cubic OVERSIZE carton for an order no catalog box holds.
    ///
    /// The edge is the cube root of the total volume, ceiled to a whole
    /// centimeter. The volume is clamped to at least 1 cm³ first so an order
    /// of dimensionless items cannot produce a zero-edge cube.
    pub fn oversize(total_volume_cm3: f64, total_weight_g: f64) -> Self {
        let edge = total_volume_cm3.max(1.0).cbrt().ceil();
        Self {
            code: OVERSIZE_CODE.to_string(),
            length: edge,
            width: edge,
            height: edge,
            max_weight: total_weight_g.max(OVERSIZE_MIN_MAX_WEIGHT_G),
        }
    }
}

/// Immutable table of standard cartons, ordered ascending by volume capacity.
///
/// The catalog is a value, not a singleton, so callers (and tests) can
/// substitute alternate box programs.
#[derive(Clone, Debug)]
pub struct CartonCatalog {
    cartons: Vec<Carton>,
}

impl CartonCatalog {
    /// Builds a catalog from arbitrary entries.
    ///
    /// Entries are sorted ascending by volume, then by max weight, so that
    /// selection can scan front-to-back and stop at the first fit.
    pub fn new(mut cartons: Vec<Carton>) -> Self {
        cartons.sort_by(|a, b| {
            a.volume()
                .partial_cmp(&b.volume())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.max_weight
                        .partial_cmp(&b.max_weight)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        Self { cartons }
    }

    /// The standard four-tier box program.
    pub fn standard() -> Self {
        Self::new(vec![
            Carton::new("S", 20.0, 15.0, 10.0, 2_000.0),
            Carton::new("M", 30.0, 22.0, 15.0, 4_000.0),
            Carton::new("L", 40.0, 30.0, 20.0, 8_000.0),
            Carton::new("XL", 50.0, 40.0, 30.0, 15_000.0),
        ])
    }

    /// Catalog entries in ascending capacity order.
    #[allow(dead_code)]
    pub fn cartons(&self) -> &[Carton] {
        &self.cartons
    }

    /// Picks the smallest carton that holds both the volume and the weight.
    ///
    /// Falls back to a synthesized OVERSIZE cube when no entry fits.
    pub fn pick(&self, total_volume_cm3: f64, total_weight_g: f64) -> Carton {
        self.cartons
            .iter()
            .find(|carton| carton.holds(total_volume_cm3, total_weight_g))
            .cloned()
            .unwrap_or_else(|| Carton::oversize(total_volume_cm3, total_weight_g))
    }
}

impl Default for CartonCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_sorted_ascending_by_volume() {
        let catalog = CartonCatalog::standard();
        let volumes: Vec<f64> = catalog.cartons().iter().map(Carton::volume).collect();
        for pair in volumes.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "catalog must be ordered ascending by volume, got {:?}",
                volumes
            );
        }
        let codes: Vec<&str> = catalog.cartons().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["S", "M", "L", "XL"]);
    }

    #[test]
    fn pick_returns_smallest_carton_that_fits_both_constraints() {
        let catalog = CartonCatalog::standard();
        let carton = catalog.pick(2_500.0, 1_500.0);
        assert_eq!(carton.code, "S");
    }

    #[test]
    fn pick_rejects_carton_that_fits_volume_but_not_weight() {
        let catalog = CartonCatalog::standard();
        // Fits S by volume (3000 cm³) but weighs more than S's 2000 g rating.
        let carton = catalog.pick(2_500.0, 3_500.0);
        assert_eq!(carton.code, "M");
    }

    #[test]
    fn pick_rejects_carton_that_fits_weight_but_not_volume() {
        let catalog = CartonCatalog::standard();
        // Light but bulky: skips S (3000 cm³) and M (9900 cm³).
        let carton = catalog.pick(12_000.0, 500.0);
        assert_eq!(carton.code, "L");
    }

    #[test]
    fn pick_synthesizes_oversize_when_nothing_fits() {
        let catalog = CartonCatalog::standard();
        let carton = catalog.pick(100_000.0, 20_000.0);
        assert_eq!(carton.code, OVERSIZE_CODE);
        // cbrt(100000) ≈ 46.42 → edge 47
        assert_eq!(carton.length, 47.0);
        assert_eq!(carton.width, 47.0);
        assert_eq!(carton.height, 47.0);
        assert_eq!(carton.max_weight, 20_000.0);
        assert!(carton.volume() >= 100_000.0);
    }

    #[test]
    fn oversize_weight_rating_never_drops_below_floor() {
        let carton = Carton::oversize(100_000.0, 4_000.0);
        assert_eq!(carton.max_weight, OVERSIZE_MIN_MAX_WEIGHT_G);
    }

    #[test]
    fn oversize_clamps_degenerate_volume_to_unit_cube() {
        let carton = Carton::oversize(0.0, 0.0);
        assert_eq!(carton.length, 1.0);
        assert_eq!(carton.width, 1.0);
        assert_eq!(carton.height, 1.0);
    }

    #[test]
    fn custom_catalogs_are_sorted_and_selectable() {
        let catalog = CartonCatalog::new(vec![
            Carton::new("BIG", 100.0, 100.0, 100.0, 50_000.0),
            Carton::new("TINY", 5.0, 5.0, 5.0, 100.0),
        ]);
        assert_eq!(catalog.cartons()[0].code, "TINY");
        assert_eq!(catalog.pick(50.0, 50.0).code, "TINY");
        assert_eq!(catalog.pick(50.0, 500.0).code, "BIG");
    }

    #[test]
    fn picked_carton_always_covers_requested_volume_and_weight() {
        let catalog = CartonCatalog::standard();
        // Deterministic LCG so the sweep is reproducible.
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..200 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let volume = ((state >> 16) % 200_000) as f64;
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let weight = ((state >> 16) % 40_000) as f64;

            let carton = catalog.pick(volume, weight);
            assert!(
                carton.volume() + EPSILON_GENERAL >= volume,
                "carton {} too small for volume {}",
                carton.code,
                volume
            );
            assert!(
                carton.max_weight + EPSILON_GENERAL >= weight,
                "carton {} rated below weight {}",
                carton.code,
                weight
            );
        }
    }
}
