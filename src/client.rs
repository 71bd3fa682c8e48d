pub mod bot;
pub mod session;
pub mod telegram;

pub use bot::Bot;
pub use session::{base::Session, reqwest::Reqwest};
