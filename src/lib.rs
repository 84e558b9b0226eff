mod error;
pub use error::{AppError, Result};

pub mod config;
pub mod dolar_client;
pub mod fetch_service;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod storage;
