//! Filter CSV backup exports of JSON documents.
//!
//! Each backup row carries an `id` and a JSON document. A run compiles a set
//! of `field operator value` clauses against a [`FieldRegistry`], keeps the
//! rows whose documents satisfy all (or any) of them, and writes the
//! matches, optionally with extra fields, to chunked CSV files or the
//! console.

pub mod config;
pub mod document;
pub mod error;
pub mod fields;
pub mod filter;
pub mod io;
pub mod operators;
pub mod runtime;

pub use config::RunConfig;
pub use document::{Composite, Document, FieldValue};
pub use error::FilterError;
pub use fields::{FieldRegistry, FieldShape, FieldSpec};
pub use filter::{combine, evaluate, Clause, Filter, MatchMode};
