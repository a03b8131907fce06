pub mod geo;
pub mod leads;
pub mod relay;
pub mod settings;
