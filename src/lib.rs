/// Basic application code
pub mod app;
/// Staff authentication
pub mod auth;
/// REST clients for outside services
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Domain objects
pub mod domain;
/// Error responses of the REST API
pub mod error;
/// Follow-up grouping and urgency ranking
pub mod followup;
/// Stored records
pub mod model;
/// Templated and custom customer emails
pub mod notification;
/// Per-caller request limits
pub mod ratelimit;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
/// Message template placeholders
pub mod template;
