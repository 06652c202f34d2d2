pub mod auth;
pub mod client;
pub mod config;
pub mod invoice;
pub mod product;
pub mod scheduled_service;
pub mod transaction;
