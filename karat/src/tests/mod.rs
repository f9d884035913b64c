


mod engine;
mod error;

use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
