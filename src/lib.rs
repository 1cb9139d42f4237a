#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod release;
pub mod server;
pub mod service;
pub mod uri;

pub type Result<T> = std::result::Result<T, error::Error>;
