//! stackwise-scoring
//!
//! Rule-based recommendation scoring. Pure functions, no I/O.
//! Derives a user's goal set, scores supplements against it by keyword
//! matching, and turns scores into bounded confidence values.

pub mod confidence;
pub mod goals;
pub mod scorer;
