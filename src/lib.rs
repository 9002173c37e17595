pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod remark;
pub mod seed;
pub mod session;
pub mod store;
pub mod utils;
pub mod views;
