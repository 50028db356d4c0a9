//! Shared domain types for Herald.
//!
//! This crate contains the types used across the Herald pipeline: classified
//! intents and topics, job requests and payloads, retrieved documents, LLM
//! request/response shapes, media parameters, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, uuid, chrono,
//! thiserror.

pub mod config;
pub mod document;
pub mod error;
pub mod intent;
pub mod job;
pub mod llm;
pub mod media;
