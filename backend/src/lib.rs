pub mod catalog;
pub mod chart_view;
pub mod config;
pub mod history;
pub mod metrics;
pub mod service;

pub mod error;
pub mod logger;
pub mod time;
