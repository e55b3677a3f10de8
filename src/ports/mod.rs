pub mod bookstore_api;

pub use bookstore_api::*;
