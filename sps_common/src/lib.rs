mod money;
mod secret;

pub use money::{Money, MoneyConversionError, BRL_CURRENCY_CODE, BRL_NUMERIC_CURRENCY_CODE};
pub use secret::Secret;
