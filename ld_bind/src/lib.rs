//! Bind JSON-LD documents to Rust records.
//!
//! Documents are parsed into a generic [`Node`] model under a chain of
//! [`Context`] scopes, then bound to records through [`LinkedData`].
//! Encoding runs the other way and compacts keys against an optional
//! context.
//!
//! ```ignore
//! use ld_bind::LinkedData;
//!
//! #[derive(LinkedData, Default)]
//! struct Person {
//!     #[ld("@id")]
//!     id: String,
//!     #[ld("http://schema.org/name")]
//!     name: String,
//! }
//!
//! let person: Person = ld_bind::from_str(document)?;
//! ```

extern crate self as ld_bind;

pub use serde_json;

pub mod binder;
mod coercion;
pub mod context;
#[cfg(feature = "http")]
pub mod context_fetcher;
pub mod decode;
pub mod encode;
pub mod error;
pub mod iri;
pub mod models;
pub mod node;
pub mod resource;

use std::sync::Arc;

pub use binder::{Binder, FieldBinding, FieldKind, FromValue, LinkedData, Multiplicity, ToValue};
pub use context::{Context, ContextBuilder, ContextFetch};
#[cfg(feature = "http")]
pub use context_fetcher::HttpContextFetcher;
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{LDError, LDResult};
pub use models::{Coercion, TermDefinition, Type};
pub use node::{Node, Props, Value};
pub use resource::{NodeFormatter, NodeParser};

#[cfg(feature = "derive")]
pub use ld_bind_derive::LinkedData;

// === Decoding ===

pub fn from_str<T: FromValue>(s: &str) -> LDResult<T> {
    Decoder::new().decode_str(s)
}

pub fn from_slice<T: FromValue>(bytes: &[u8]) -> LDResult<T> {
    Decoder::new().decode_slice(bytes)
}

pub fn from_value<T: FromValue>(value: &serde_json::Value) -> LDResult<T> {
    Decoder::new().decode(value)
}

// === Encoding ===

pub fn to_string<T: ToValue + ?Sized>(value: &T) -> LDResult<String> {
    Encoder::new().encode_string(value)
}

pub fn to_string_pretty<T: ToValue + ?Sized>(value: &T) -> LDResult<String> {
    Encoder::new().pretty(true).encode_string(value)
}

pub fn to_vec<T: ToValue + ?Sized>(value: &T) -> LDResult<Vec<u8>> {
    Encoder::new().encode_vec(value)
}

pub fn to_value<T: ToValue + ?Sized>(value: &T) -> LDResult<serde_json::Value> {
    Encoder::new().encode_value(value)
}

/// Encode `value` compacted against `context`, which is written as the
/// document's `@context`.
pub fn to_string_with_context<T: ToValue + ?Sized>(value: &T, context: Arc<Context>) -> LDResult<String> {
    Encoder::new().with_context(context).encode_string(value)
}

// === context! Macro ===

/// Build a [`Context`] from an inline JSON `@context` object.
///
/// ```ignore
/// let ctx = ld_bind::context! {
///     "@vocab": "http://schema.org/",
///     "homepage": {"@id": "http://schema.org/url", "@type": "@id"}
/// }?;
/// ```
#[macro_export]
macro_rules! context {
    ($($json:tt)*) => {
        $crate::Context::from_json(&$crate::serde_json::json!({ $($json)* }))
    };
}
