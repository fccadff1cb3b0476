pub mod candidate;
pub mod exchange_rate;
