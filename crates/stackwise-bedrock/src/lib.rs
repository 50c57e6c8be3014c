//! stackwise-bedrock
//!
//! Optional external reranking of scored supplement candidates, plus the
//! profile context rendered into every reranking request.

pub mod context;
pub mod converse;
pub mod error;
pub mod parse;
pub mod profile;
pub mod rerank;
