//! # Hybrid Harness
//!
//! Local retrieval over a fixed JSON corpus with three modes: TF-IDF
//! keyword search, embedding-based semantic search, and a hybrid mode that
//! blends the two with a weighted linear fusion.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ JSON file  │──▶│ ensure_index │──▶│ documents.json │
//! │ (corpus)   │   │ TF-IDF + vec │   │ tfidf.json ... │
//! └────────────┘   └──────┬───────┘   └────────────────┘
//!                         ▼
//!                  ┌──────────────┐
//!                  │ core search  │  keyword | semantic | hybrid
//!                  └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hybrid_harness::config::load_config;
//! use hybrid_harness::search::{run_search, SearchOptions};
//!
//! let config = load_config("config/hybrid.toml".as_ref())?;
//! let mut opts = SearchOptions::new("flying over the ocean");
//! opts.mode = Some("keyword".to_string());
//! for hit in run_search(&config, &opts)? {
//!     println!("{} {:.4} {}", hit.rank, hit.score, hit.text);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | JSON corpus loader |
//! | [`embedding`] | Embedding provider implementations |
//! | [`index`] | Persistent index build (`ensure_index`) |
//! | [`search`] | Search entry point |

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod index;
pub mod search;

