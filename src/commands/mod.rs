pub mod rebuild;
pub mod status;
