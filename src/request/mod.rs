// request/mod.rs

pub mod concurrency;
pub mod executor;
pub mod request_item;

pub use concurrency::{imap, map, ExceptionHandler, DEFAULT_STREAM_CONCURRENCY};
pub use executor::CompletedRequest;
pub use request_item::{RequestItem, ResponseHook};
