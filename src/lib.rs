//! # hmst-convert Library
//!
//! Converts JSON task definitions into HAMSTERS v7 task-model markup, with an
//! optional normalized JSON intermediate representation. Input documents are
//! validated against an embedded draft-07 schema, identifiers are allocated
//! deterministically, and generated markup is checked against the published XSD
//! (cached locally) or a reduced structural check when the schema is unavailable.

pub mod cache;
pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod http_client;
pub mod id_alloc;
pub mod input_schema;
#[cfg(feature = "libxml2")]
pub mod libxml2;
pub mod linker;
pub mod markup;
pub mod model;
pub mod output;
pub mod output_validator;
pub mod schema_loader;
pub mod transform;

pub use cache::{CacheMetadata, CachedSchema, DiskCache};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigManager};
pub use converter::{Converter, MarkupArtifact, build_model};
pub use error::{ConvertError, Result, SchemaViolation};
pub use http_client::{AsyncHttpClient, HttpClientConfig};
pub use id_alloc::{IdAllocator, IdClass};
pub use input_schema::InputValidator;
pub use markup::{HAMSTERS_NAMESPACE, XSD_SCHEMA_LOCATION, emit_markup};
pub use model::{DataObjectIr, ErrorModelIr, ModelIr, TaskIr};
pub use output::{ConversionSummary, Output};
pub use output_validator::{
    DisabledValidator, MarkupCheck, MarkupValidator, MarkupViolation, OutputReport,
    ReducedMarkupValidator, check_markup,
};
pub use schema_loader::SchemaLoader;
