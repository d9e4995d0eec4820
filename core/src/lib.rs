//! Rendering and indexing core for the bilingual history timeline.
//!
//! Everything here is a pure transform over the content documents: the
//! accordion tree, the flat search index and its query engine, glossary
//! annotation and the popover model, and the view/speech state machines.
//! DOM side effects live in the frontend crate.

pub mod accordion;
pub mod config;
pub mod error;
pub mod glossary;
pub mod index;
pub mod markup;
pub mod model;
pub mod nav;
pub mod query;
pub mod speech;
pub mod state;
pub mod store;
pub mod timeline_bar;

pub use config::Config;
pub use error::{ContentError, Error, Result};
pub use model::*;
pub use state::AppState;
pub use store::ContentStore;
