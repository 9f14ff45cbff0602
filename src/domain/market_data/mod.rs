//! Market data aggregate: bars, series, overlays, statistics and live quotes.

pub mod entities;
pub mod indicator_engine;
pub mod live_price;
pub mod repositories;
pub mod series_math;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use indicator_engine::*;
pub use live_price::*;
pub use value_objects::*;
