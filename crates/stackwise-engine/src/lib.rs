//! stackwise-engine
//!
//! The recommendation pipeline: candidate selection, scoring, optional
//! external reranking, list regeneration and the pinned stack. All state
//! lives in the injected stores; an [`Engine`] is cheap to clone and share.

pub mod engine;
pub mod error;
pub mod list;
pub mod ranker;
pub mod service;
pub mod stack;

pub use engine::Engine;
pub use error::EngineError;
