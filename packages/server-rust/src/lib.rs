//! DTS Server: HTTP endpoints for document translation, summarization,
//! text extraction and Google login.
//!
//! Requests flow handler -> [`service::Controller`] (validate, dispatch
//! through the operation pipeline, classify errors) -> [`adapters`].

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod network;
pub mod service;
