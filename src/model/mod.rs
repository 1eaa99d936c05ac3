pub mod interval;
pub mod metrics;
pub mod tick;
