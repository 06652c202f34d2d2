pub mod auth;
pub mod clients;
pub mod configs;
pub mod google;
pub mod invoices;
pub mod products;
pub mod scheduled_services;
pub mod transactions;
pub mod users;
