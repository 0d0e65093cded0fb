pub mod error;
pub mod host;
pub mod menu;
pub mod models;
pub mod strings;
pub mod trakt;
