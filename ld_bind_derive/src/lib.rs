//! `#[derive(LinkedData)]` for `ld_bind`.
//!
//! Field annotations:
//!
//! - `#[ld("iri")]`, `#[ld("iri", all)]`: property key, first or every value
//! - `#[ld("@id")]`: node identifier
//! - `#[ld(type)]`, `#[ld(type = "iri")]`: type witness
//! - `#[ld(flatten)]`: embedded record
//! - `#[ld("-")]`, `#[ld(skip)]`: not bound

mod code_generator;
mod field_parser;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

use crate::code_generator::CodeGenerator;

/// Implement `LinkedData`, `FromValue` and `ToValue` for a struct with named
/// fields.
#[proc_macro_derive(LinkedData, attributes(ld))]
pub fn derive_linked_data(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    CodeGenerator::generate(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
