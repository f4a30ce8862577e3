//! Kong Admin API client for services and their plugin configurations.
//!
//! Provides typed models, an asynchronous [`ServicesClient`] and a
//! [`blocking::BlockingServicesClient`] for callers without an async runtime.

#![deny(missing_docs)]

pub mod blocking;
pub mod client;
pub mod models;

pub use client::{ServiceApi, ServicesClient, ServicesClientBuilder};
pub use models::{
    PluginConfigRecord, Service, ServicePage, ServicePluginConfig, ServicePluginConfigPage,
    ServiceQuery, ServiceRequest,
};

/// Convenient result alias that reuses the shared Kong error type.
pub type Result<T> = kong_core::Result<T>;
