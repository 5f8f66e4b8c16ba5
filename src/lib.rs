pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod images;
pub mod middleware;
pub mod types;
pub mod warehouse;
