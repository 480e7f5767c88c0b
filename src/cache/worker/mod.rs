//! Background scheduling for cache maintenance

pub mod ticker;

pub use ticker::{TickFlow, Ticker};
