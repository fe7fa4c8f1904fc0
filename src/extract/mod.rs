//! Extraction pipeline: options, the decoder capability and the dispatcher.

pub mod config;
pub mod decoder;
pub mod dispatcher;

pub use config::{ExtractOptions, TextFallback};
pub use decoder::{DecodeContext, Decoder};
pub use dispatcher::Extractor;
