use super::*;

/// Parses a `0x`-prefixed hexadecimal JSON-RPC quantity.
pub fn parse_quantity(value: &str) -> Result<HeightValue> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("quantity {value:?} is missing the 0x prefix"))?;
    ensure!(!digits.is_empty(), "quantity {value:?} has no digits");

    HeightValue::from_str_radix(digits, 16).map_err(|e| anyhow!("invalid quantity {value:?}: {e}"))
}
