pub mod capture;
pub mod recorder;
