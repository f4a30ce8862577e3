//! # kong-core
//!
//! Core types and utilities for working with the Kong Admin API.
//!
//! This crate provides the error taxonomy, configuration, HTTP transport and shared value
//! types that resource clients such as `kong-services` are built on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status classification
//! - [`id`] - Entity reference serialized as `{"id": ...}`
//! - [`config`] - Admin address and credentials
//! - [`client`] - Single-shot HTTP transport
//! - [`query`] - Query string builder
//! - [`pagination`] - Cursor pagination and page-size bounds

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod pagination;
pub mod query;

pub use client::{AdminClient, AdminClientBuilder, ClientConfig, RawResponse};
pub use config::KongConfig;
pub use error::{classify, Error, Result, StatusPolicy};
pub use id::Id;
pub use pagination::{PageQuery, Paginated};
