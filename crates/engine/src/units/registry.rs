use log::warn;
use serde::{Deserialize, Serialize};

use super::builtin::QUANTITIES;
use super::UnitError;

pub const MAX_CUSTOM_QUANTITIES: usize = 25;
pub const MAX_CUSTOM_UNITS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuantityId(pub usize);

impl QuantityId {
    /// The fixed quantity without units.
    pub const NONE: QuantityId = QuantityId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub symbol: String,
    pub symbol_utf8: Option<String>,
    /// Scale to the quantity's base unit.
    pub factor: f64,
    /// Added before scaling; only non-zero for affine scales (temperature).
    pub offset: f64,
}

impl Unit {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: name.to_string(),
            symbol_utf8: None,
            factor: 1.0,
            offset: 0.0,
        }
    }

    pub fn to_base(&self, value: f64) -> f64 {
        (value + self.offset) * self.factor
    }

    pub fn from_base(&self, value: f64) -> f64 {
        value / self.factor - self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub name: String,
    pub units: Vec<Unit>,
    builtin: bool,
}

impl Quantity {
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

/// How names and symbols are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// Render "metre"/"litre" as "meter"/"liter".
    pub american_spelling: bool,
    /// Prefer UTF-8 symbols ("m²", "°C") where one exists.
    pub utf8: bool,
}

/// Lowercased, spelling-neutral form used for name comparisons.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace("metre", "meter").replace("litre", "liter")
}

fn americanize(name: &str) -> String {
    name.replace("metre", "meter").replace("litre", "liter")
}

/// Physical quantities and their convertible units.
///
/// Built with the builtin table already in place; custom quantities are
/// appended after it, up to [`MAX_CUSTOM_QUANTITIES`].
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    quantities: Vec<Quantity>,
    builtin_count: usize,
    options: RegistryOptions,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let quantities: Vec<Quantity> = QUANTITIES
            .iter()
            .map(|q| Quantity {
                name: q.name.to_string(),
                units: q
                    .units
                    .iter()
                    .map(|u| Unit {
                        name: u.name.to_string(),
                        symbol: u.symbol.to_string(),
                        symbol_utf8: u.symbol_utf8.map(str::to_string),
                        factor: u.factor,
                        offset: u.offset,
                    })
                    .collect(),
                builtin: true,
            })
            .collect();
        let builtin_count = quantities.len();
        Self { quantities, builtin_count, options: RegistryOptions::default() }
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    pub fn set_options(&mut self, options: RegistryOptions) {
        self.options = options;
    }

    pub fn quantities(&self) -> impl Iterator<Item = (QuantityId, &Quantity)> {
        self.quantities.iter().enumerate().map(|(i, q)| (QuantityId(i), q))
    }

    pub fn quantity(&self, id: QuantityId) -> Option<&Quantity> {
        self.quantities.get(id.0)
    }

    pub fn unit(&self, quantity: QuantityId, unit: UnitId) -> Option<&Unit> {
        self.quantity(quantity)?.units.get(unit.0)
    }

    pub fn builtin_count(&self) -> usize {
        self.builtin_count
    }

    pub fn custom_count(&self) -> usize {
        self.quantities.len() - self.builtin_count
    }

    /// Unit name as displayed under the current spelling option.
    pub fn unit_name(&self, quantity: QuantityId, unit: UnitId) -> Option<String> {
        let unit = self.unit(quantity, unit)?;
        Some(if self.options.american_spelling { americanize(&unit.name) } else { unit.name.clone() })
    }

    /// Unit symbol as displayed under the current UTF-8 option.
    pub fn unit_symbol(&self, quantity: QuantityId, unit: UnitId) -> Option<&str> {
        let unit = self.unit(quantity, unit)?;
        Some(match (&unit.symbol_utf8, self.options.utf8) {
            (Some(utf8), true) => utf8.as_str(),
            _ => unit.symbol.as_str(),
        })
    }

    pub fn find_quantity(&self, name: &str) -> Option<QuantityId> {
        let key = normalize(name);
        self.quantities
            .iter()
            .position(|q| normalize(&q.name) == key)
            .map(QuantityId)
    }

    /// First unit, in any quantity, whose name matches. Either spelling of
    /// "metre"/"litre" is accepted.
    pub fn find_unit_by_name(&self, name: &str) -> Option<(QuantityId, UnitId)> {
        let key = normalize(name);
        self.find_unit(|u| normalize(&u.name) == key)
    }

    /// First unit, in any quantity, whose ASCII or UTF-8 symbol matches.
    pub fn find_unit_by_symbol(&self, symbol: &str) -> Option<(QuantityId, UnitId)> {
        let symbol = symbol.trim();
        self.find_unit(|u| u.symbol == symbol || u.symbol_utf8.as_deref() == Some(symbol))
    }

    fn find_unit(&self, pred: impl Fn(&Unit) -> bool) -> Option<(QuantityId, UnitId)> {
        self.quantities.iter().enumerate().find_map(|(qi, q)| {
            q.units.iter().position(&pred).map(|ui| (QuantityId(qi), UnitId(ui)))
        })
    }

    /// Unit of one quantity, looked up by symbol first and then by name.
    pub fn find_unit_in(&self, quantity: QuantityId, key: &str) -> Option<UnitId> {
        let units = &self.quantity(quantity)?.units;
        let key = key.trim();
        units
            .iter()
            .position(|u| u.symbol == key || u.symbol_utf8.as_deref() == Some(key))
            .or_else(|| {
                let norm = normalize(key);
                units.iter().position(|u| normalize(&u.name) == norm)
            })
            .map(UnitId)
    }

    /// Resolve two unit keys (symbol or name) to a single quantity holding
    /// both, so ambiguous symbols such as "C" pick the quantity that makes
    /// the pair convertible.
    pub fn find_pair(&self, from: &str, to: &str) -> Option<(QuantityId, UnitId, UnitId)> {
        self.quantities().find_map(|(qid, _)| {
            let a = self.find_unit_in(qid, from)?;
            let b = self.find_unit_in(qid, to)?;
            Some((qid, a, b))
        })
    }

    pub fn convert(&self, quantity: QuantityId, value: f64, from: UnitId, to: UnitId) -> Result<f64, UnitError> {
        let q = self.quantity(quantity).ok_or(UnitError::UnknownQuantity(quantity.0))?;
        let lookup = |id: UnitId| {
            q.units
                .get(id.0)
                .ok_or(UnitError::UnknownUnit { quantity: quantity.0, unit: id.0 })
        };
        let from_unit = lookup(from)?;
        let to_unit = lookup(to)?;
        if from == to {
            return Ok(value);
        }
        Ok(to_unit.from_base(from_unit.to_base(value)))
    }

    /// Look up or create a custom quantity.
    ///
    /// Registering an existing name returns that quantity. A new name takes
    /// the next free custom slot.
    pub fn register_quantity(&mut self, name: &str) -> Result<QuantityBuilder<'_>, UnitError> {
        if name.trim().is_empty() {
            return Err(UnitError::EmptyName);
        }
        let id = match self.find_quantity(name) {
            Some(id) => id,
            None => {
                if self.custom_count() >= MAX_CUSTOM_QUANTITIES {
                    warn!("units: no free slot for quantity '{}'", name);
                    return Err(UnitError::QuantityCapacity);
                }
                self.quantities.push(Quantity {
                    name: name.trim().to_string(),
                    units: Vec::new(),
                    builtin: false,
                });
                QuantityId(self.quantities.len() - 1)
            }
        };
        Ok(QuantityBuilder { registry: self, id })
    }
}

/// Adds units to one quantity.
pub struct QuantityBuilder<'a> {
    registry: &'a mut UnitRegistry,
    id: QuantityId,
}

impl QuantityBuilder<'_> {
    pub fn id(&self) -> QuantityId {
        self.id
    }

    /// Look up or add a unit. New units start with the name as symbol and a
    /// factor of 1. Builtin quantities are closed.
    pub fn add_unit(&mut self, name: &str) -> Result<UnitBuilder<'_>, UnitError> {
        if name.trim().is_empty() {
            return Err(UnitError::EmptyName);
        }
        let quantity = &mut self.registry.quantities[self.id.0];
        if quantity.builtin {
            return Err(UnitError::BuiltinQuantity(quantity.name.clone()));
        }

        let key = normalize(name);
        let index = match quantity.units.iter().position(|u| normalize(&u.name) == key) {
            Some(i) => i,
            None => {
                if quantity.units.len() >= MAX_CUSTOM_UNITS {
                    return Err(UnitError::UnitCapacity(quantity.name.clone()));
                }
                quantity.units.push(Unit::named(name.trim()));
                quantity.units.len() - 1
            }
        };
        Ok(UnitBuilder { unit: &mut quantity.units[index], id: UnitId(index) })
    }
}

/// Configures the unit just added.
pub struct UnitBuilder<'a> {
    unit: &'a mut Unit,
    id: UnitId,
}

impl UnitBuilder<'_> {
    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn symbol(self, symbol: &str) -> Self {
        self.unit.symbol = symbol.to_string();
        self
    }

    pub fn symbol_utf8(self, symbol: &str) -> Self {
        self.unit.symbol_utf8 = Some(symbol.to_string());
        self
    }

    /// Base units in one of this unit. Must be finite and non-zero.
    pub fn factor(self, factor: f64) -> Result<Self, UnitError> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(UnitError::InvalidFactor(self.unit.name.clone()));
        }
        self.unit.factor = factor;
        Ok(self)
    }

    pub fn offset(self, offset: f64) -> Self {
        self.unit.offset = offset;
        self
    }
}
