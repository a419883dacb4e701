//! Media Job Tracker
//!
//! Submits long-running media jobs (stem separation, transcoding) to the
//! backend gateway, polls their status on a shared timer until each reaches a
//! terminal state, and maps finished results into named tracks. Also serves a
//! single-flight cached side panel for the signed-in user.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
