#![doc = "doc-bundle-core: document generation and bundling core for doc-bundle."]

//! This crate holds the data model, the document type catalog, the format renderers,
//! the generation orchestrator, the session file index and the bundling service.
//! Storage and delivery are reached only through the traits in [`contract`].
//!
//! # Usage
//! Build a [`session::Session`] with a [`render::FormatRenderer`] and a
//! [`contract::FileStore`], then call `generate`, `download_document` and `bundle` on it.

pub mod archive;
pub mod bundle;
pub mod config;
pub mod contract;
pub mod error;
pub mod index;
pub mod local;
pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod registry;
pub mod render;
pub mod session;
