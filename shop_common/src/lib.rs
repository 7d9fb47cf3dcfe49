mod helpers;
mod money;

pub mod op;

pub use helpers::parse_boolean_flag;
pub use money::{Money, MoneyConversionError, MINOR_UNITS_PER_MAJOR};
