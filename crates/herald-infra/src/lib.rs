//! Concrete collaborator implementations for the Herald pipeline.
//!
//! Everything in here speaks HTTP: the OpenAI-compatible text-generation
//! client, the news-search client, the page fetcher, the Vectara vector
//! store, the Telegram notifier, and the media collaborators (image, video,
//! caption). Each implements the corresponding port from `herald-core`.

pub mod config;
pub mod fetch;
pub mod llm;
pub mod media;
pub mod notify;
pub mod search;
pub mod vector;
