pub mod config;
pub mod event;
pub mod google;
pub mod occurrence;
pub mod show;
