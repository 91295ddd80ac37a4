pub mod catalog;
pub mod models;
pub mod scoring;
pub mod session;
