pub mod capture_provider;
pub mod event_sink;
pub mod frame_source;
