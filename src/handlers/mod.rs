//! HTTP handlers

pub mod health;
pub mod auth;
pub mod agent;
pub mod devices;
pub mod reports;
pub mod alerts;
pub mod export;
