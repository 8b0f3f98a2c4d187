//! Types related to futures and asynchrony.

mod future_value;

pub use self::future_value::FutureValue;
