pub mod metrics;
pub mod response;
