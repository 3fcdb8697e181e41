use crate::HeightValue;

use anyhow::{anyhow, ensure, Result};

pub mod macros;

pub mod quantity;
pub use quantity::parse_quantity;

#[cfg(test)]
pub(crate) mod canned;
