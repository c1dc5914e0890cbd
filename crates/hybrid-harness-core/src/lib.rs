//! # Hybrid Harness Core
//!
//! Pure retrieval logic for Hybrid Harness: corpus model, score fusion,
//! scorer traits, TF-IDF index, embedding trait, and search modes.
//!
//! This crate performs no filesystem or network I/O. Loading a corpus,
//! persisting indices, and calling a hosted embeddings API are the job of
//! the `hybrid-harness` application crate.

pub mod embedding;
pub mod fusion;
pub mod models;
pub mod scorer;
pub mod search;
pub mod tfidf;
