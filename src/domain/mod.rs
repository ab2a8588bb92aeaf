pub mod analysis;
pub mod market;
pub mod player;
pub mod strategy;

pub use analysis::*;
pub use market::*;
pub use player::*;
pub use strategy::*;

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to cents, half away from zero
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
