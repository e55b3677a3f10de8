pub mod client;
pub mod types;

pub use client::{BASE_URL_ENV, DEFAULT_BASE_URL, HttpBookstoreApi, HttpConfig};
