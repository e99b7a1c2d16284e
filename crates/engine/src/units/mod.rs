//! Physical quantities and unit conversion.
//!
//! Every unit converts to its quantity's base unit as
//! `base = (value + offset) * factor`, and back as
//! `value = base / factor - offset`. Only temperature scales use an offset.

mod builtin;
mod registry;

use thiserror::Error;

pub use registry::{
    Quantity, QuantityBuilder, QuantityId, RegistryOptions, Unit, UnitBuilder, UnitId, UnitRegistry,
    MAX_CUSTOM_QUANTITIES, MAX_CUSTOM_UNITS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unknown quantity #{0}")]
    UnknownQuantity(usize),
    #[error("unknown unit #{unit} in quantity #{quantity}")]
    UnknownUnit { quantity: usize, unit: usize },
    #[error("no room for another custom quantity")]
    QuantityCapacity,
    #[error("no room for another unit in '{0}'")]
    UnitCapacity(String),
    #[error("builtin quantity '{0}' cannot be extended")]
    BuiltinQuantity(String),
    #[error("name must not be empty")]
    EmptyName,
    #[error("unit '{0}' needs a finite, non-zero factor")]
    InvalidFactor(String),
}
