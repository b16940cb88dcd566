//! Schema document model

pub mod document;
pub mod draft;
pub mod rows;
pub mod wire;

pub use document::{
    AuthType, DbCredentials, KeyValue, LlmCredentials, LlmEndpoint, RequestBody, SchemaDocument,
    SftpCredentials, TrainingPair, ValidationError,
};
pub use draft::DraftStore;
pub use rows::{Row, RowList};
pub use wire::{WireLlmEndpoint, WireSchema};
