//! stackwise-storage
//!
//! Persistence for goals, the supplement catalog, recommendations, the
//! recommendation log, pinned stacks and disclaimers. The engine only sees
//! the traits in [`store`]; two backends implement them: an in-memory store
//! and JSON objects in S3.

pub mod client;
pub mod error;
pub mod memory;
pub mod objects;
pub mod s3;
pub mod stack_doc;
pub mod state;
pub mod store;

pub use store::Stores;
