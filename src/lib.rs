//! Client for a remote image-generation worker.
//!
//! A [`GenerationController`] submits a prompt to the worker and publishes the
//! request state; successful generations are kept in a bounded, persisted
//! [`HistoryStore`].

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod logger;
pub mod models;
pub mod storage;
pub mod worker;

pub use app::Imageinator;
pub use config::{ApiVariant, Config};
pub use controller::GenerationController;
pub use error::{ImageinatorError, Result};
pub use history::{BoundedHistory, HistoryStore};
pub use models::*;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use worker::{GenerationBackend, GenerationClient, ImageExporter};
