pub mod data_source;
pub mod envelope;
pub mod remote;
pub mod static_source;
