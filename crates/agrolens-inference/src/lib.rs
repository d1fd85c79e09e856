//! HTTP adapter for the plant-analysis inference service

mod client;
mod wire;

pub use client::HttpEndpoint;
pub use wire::parse_response;
