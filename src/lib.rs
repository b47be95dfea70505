// Marquee: content-based movie recommendations
//
// This is the library root. Each module corresponds to a stage of the
// retrieval flow: load artifacts, resolve a title, score, rank, present.

pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod output;
pub mod posters;
pub mod ranking;
pub mod similarity;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
