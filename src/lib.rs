// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ski-loop
//!
//! An iterative, self-referential knowledge-accumulation and text-generation
//! engine. Each iteration takes one line of text, mines positional n-gram
//! triples from it, merges them into a durable store, and answers with what it
//! learned plus a continuation generated from everything seen so far.
//!
//! ## Architecture
//!
//! - **Forward pass** (`tokenize`, `ngram`, `knowledge`): tokens become
//!   `follows`/`leads_to` triples and counted atomics with decaying confidence
//! - **Knowledge store** (`store`): whole-snapshot load and replace, in memory
//!   or in a redb file
//! - **Derived structures** (`graph`, `markov`, `infer`): rebuilt from the store
//!   every iteration and never persisted
//! - **Backward pass** (`generate`, `respond`): centrality-seeded Markov walk and
//!   the composed response
//!
//! ## Library usage
//!
//! ```no_run
//! use ski_loop::config::EngineConfig;
//! use ski_loop::engine::Engine;
//!
//! let mut engine = Engine::in_memory(EngineConfig::default()).unwrap();
//! engine.step("Paris is a city", None).unwrap();
//! let out = engine.step("", None).unwrap();
//! println!("{}", out.response);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod generate;
pub mod graph;
pub mod infer;
pub mod knowledge;
pub mod markov;
pub mod ngram;
pub mod paths;
pub mod pipeline;
pub mod respond;
pub mod store;
pub mod tokenize;
