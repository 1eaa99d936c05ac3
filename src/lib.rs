pub mod app;
pub mod calibration;
pub mod config;
pub mod error;
pub mod facts;
pub mod model;
pub mod moments;
pub mod report;
pub mod resample;
pub mod source;
