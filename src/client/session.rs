pub mod base;
pub mod reqwest;
