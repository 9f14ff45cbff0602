pub mod chart_data_controller;
pub mod coordinator;
pub mod live_price_service;
pub mod use_cases;

pub use chart_data_controller::*;
pub use coordinator::*;
pub use live_price_service::*;
pub use use_cases::*;
