pub mod actions;
pub mod attention;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod github;
pub mod labels;
pub mod models;
pub mod phase;
pub mod question;
pub mod timeline;
pub mod ui;
