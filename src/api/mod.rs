//! Game REST api

pub mod client;

pub use client::ApiClient;
