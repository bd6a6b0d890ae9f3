//! Core retrieval engine: data model, extraction, resolution, scoring,
//! orchestration, and the shared plumbing around them.

pub mod assets;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod query;
pub mod resolver;
pub mod retrieve;
pub mod safety;
pub mod scorer;
pub mod time;
