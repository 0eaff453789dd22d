//! SmartEdu Core - learning preferences and enrollment reconciliation
//!
//! This crate implements the client-side core of the SmartEdu learning
//! platform: the VARK "learning DNA" preference model, the enrollment cache
//! that reconciles with the server by per-course max-merge, and the
//! streak and badge tracking built on top of it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
