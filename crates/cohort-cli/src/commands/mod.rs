pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod impact;
pub mod overlap;
