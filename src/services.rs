pub mod auth;
pub mod mailer;

// Integrações externas
pub mod fiscal;
pub mod google;
pub mod push;
pub mod token_store;

pub mod calendar_sync;
pub mod invoice_service;
pub mod notification_service;
pub mod scheduling_service;
