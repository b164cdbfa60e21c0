//! HTTP adapters for the REST backend.

mod api;
mod client;

pub use api::HttpBoardApi;
pub use client::HttpClient;
