pub mod auth;
pub mod bolna;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migrate;
pub mod server;
pub mod services;
