//! Per-column unit bindings.
//!
//! A bound column stores values in one unit and shows them in another.
//! Non-numeric cells pass through untouched in both directions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::units::{QuantityId, UnitId, UnitRegistry};

/// Decimals used when a bound column has no explicit precision.
const DEFAULT_PRECISION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnUnit {
    pub quantity: QuantityId,
    /// Unit the cell values are stored in.
    pub unit: UnitId,
    /// Unit the values are shown in.
    pub display_unit: UnitId,
    pub decimals: Option<usize>,
}

impl ColumnUnit {
    pub fn new(quantity: QuantityId, unit: UnitId) -> Self {
        Self { quantity, unit, display_unit: unit, decimals: None }
    }

    pub fn converts(&self) -> bool {
        self.unit != self.display_unit
    }
}

/// Render a number without trailing zeros.
pub fn format_number(value: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(d) => format!("{value:.d$}"),
        None => {
            let text = format!("{value:.prec$}", prec = DEFAULT_PRECISION);
            let text = text.trim_end_matches('0').trim_end_matches('.');
            if text == "-0" {
                "0".to_string()
            } else {
                text.to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnUnits {
    bindings: FxHashMap<u32, ColumnUnit>,
}

impl ColumnUnits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, col: u32, unit: ColumnUnit) {
        self.bindings.insert(col, unit);
    }

    pub fn unbind(&mut self, col: u32) -> Option<ColumnUnit> {
        self.bindings.remove(&col)
    }

    pub fn get(&self, col: u32) -> Option<&ColumnUnit> {
        self.bindings.get(&col)
    }

    pub fn get_mut(&mut self, col: u32) -> Option<&mut ColumnUnit> {
        self.bindings.get_mut(&col)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Stored value converted for display. Conversion only happens when the
    /// storage and display units differ.
    pub fn display_value(&self, registry: &UnitRegistry, col: u32, stored: &str) -> String {
        let Some(binding) = self.bindings.get(&col) else {
            return stored.to_string();
        };
        let Ok(value) = stored.trim().parse::<f64>() else {
            return stored.to_string();
        };
        if !binding.converts() {
            return match binding.decimals {
                Some(_) => format_number(value, binding.decimals),
                None => stored.to_string(),
            };
        }
        match registry.convert(binding.quantity, value, binding.unit, binding.display_unit) {
            Ok(shown) => format_number(shown, binding.decimals),
            Err(_) => stored.to_string(),
        }
    }

    /// A value typed in display units, converted back for storage.
    pub fn storage_value(&self, registry: &UnitRegistry, col: u32, typed: &str) -> String {
        let Some(binding) = self.bindings.get(&col).filter(|b| b.converts()) else {
            return typed.to_string();
        };
        let Ok(value) = typed.trim().parse::<f64>() else {
            return typed.to_string();
        };
        match registry.convert(binding.quantity, value, binding.display_unit, binding.unit) {
            Ok(stored) => format_number(stored, None),
            Err(_) => typed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn celsius_shown_as_fahrenheit() -> (UnitRegistry, ColumnUnits) {
        let reg = UnitRegistry::new();
        let (q, c, f) = reg.find_pair("degC", "degF").unwrap();
        let mut units = ColumnUnits::new();
        units.bind(2, ColumnUnit { quantity: q, unit: c, display_unit: f, decimals: None });
        (reg, units)
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(212.00000000000003, None), "212");
        assert_eq!(format_number(0.5, None), "0.5");
        assert_eq!(format_number(-0.0, None), "0");
        assert_eq!(format_number(1.0 / 3.0, Some(2)), "0.33");
    }

    #[test]
    fn display_converts_bound_column() {
        let (reg, units) = celsius_shown_as_fahrenheit();
        assert_eq!(units.display_value(&reg, 2, "100"), "212");
        assert_eq!(units.display_value(&reg, 2, "n/a"), "n/a");
        assert_eq!(units.display_value(&reg, 1, "100"), "100");
    }

    #[test]
    fn typed_values_go_back_to_storage() {
        let (reg, units) = celsius_shown_as_fahrenheit();
        assert_eq!(units.storage_value(&reg, 2, "32"), "0");
        assert_eq!(units.storage_value(&reg, 2, "-40"), "-40");
        assert_eq!(units.storage_value(&reg, 3, "32"), "32");
    }

    #[test]
    fn same_unit_only_applies_decimals() {
        let reg = UnitRegistry::new();
        let mut units = ColumnUnits::new();
        let mut binding = ColumnUnit::new(QuantityId(1), UnitId(0));
        units.bind(1, binding);
        assert_eq!(units.display_value(&reg, 1, "1.50"), "1.50");
        binding.decimals = Some(1);
        units.bind(1, binding);
        assert_eq!(units.display_value(&reg, 1, "1.50"), "1.5");
    }
}
