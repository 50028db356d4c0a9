//! Business logic for the Herald content pipeline.
//!
//! This crate defines the collaborator ports (text generation, search, page
//! fetching, vector store, notification, media generation) and the logic
//! wired on top of them: the intent classifier, the dispatcher, the six job
//! processors with their single-consumer queues, the bounded-concurrency
//! retriever, chunking, and knowledge crystallization.
//!
//! It depends only on `herald-types` -- concrete HTTP clients live in
//! `herald-infra`.

pub mod chunk;
pub mod classify;
pub mod dispatch;
pub mod llm;
pub mod media;
pub mod memory;
pub mod notify;
pub mod processor;
pub mod queue;
pub mod retrieval;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_support;
