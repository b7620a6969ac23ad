// src/config/mod.rs
pub mod bot;
pub mod keywords;

pub use bot::BotConfig;
pub use keywords::Vocabulary;
