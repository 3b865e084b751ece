pub mod derivative;
pub mod upload;
