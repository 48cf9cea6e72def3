use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Ident, WhereClause, WherePredicate, parse_quote};

use crate::field_parser::{Binding, FieldParser, RecordField, vec_element};

pub struct CodeGenerator;

impl CodeGenerator {
    pub fn generate(input: &DeriveInput) -> syn::Result<TokenStream> {
        let fields = FieldParser::parse(input)?;
        let name = &input.ident;
        let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
        let where_clause = Self::generate_bounds(input, &fields);

        let plan = Self::generate_plan(&fields);
        let decode = Self::generate_decode(&fields);
        let encode = Self::generate_encode(&fields);

        Ok(quote! {
            #[automatically_derived]
            #[allow(unused_variables, unused_mut)]
            impl #impl_generics ::ld_bind::LinkedData for #name #ty_generics #where_clause {
                const FIELDS: &'static [::ld_bind::FieldBinding] = &[#(#plan),*];

                fn from_node(
                    node: &::ld_bind::Node,
                    binder: &::ld_bind::Binder<'_>,
                ) -> ::ld_bind::LDResult<Self> {
                    let fields = <Self as ::ld_bind::LinkedData>::FIELDS;
                    ::core::result::Result::Ok(Self { #(#decode),* })
                }

                fn to_node(&self, binder: &::ld_bind::Binder<'_>) -> ::ld_bind::LDResult<::ld_bind::Node> {
                    let fields = <Self as ::ld_bind::LinkedData>::FIELDS;
                    let mut node = ::ld_bind::Node::default();
                    #(#encode)*
                    ::core::result::Result::Ok(node)
                }
            }

            #[automatically_derived]
            impl #impl_generics ::ld_bind::FromValue for #name #ty_generics #where_clause {
                fn from_value(
                    value: &::ld_bind::Value,
                    binder: &::ld_bind::Binder<'_>,
                ) -> ::ld_bind::LDResult<Self> {
                    binder.record_from_value(value)
                }
            }

            #[automatically_derived]
            impl #impl_generics ::ld_bind::ToValue for #name #ty_generics #where_clause {
                fn to_value(
                    &self,
                    binder: &::ld_bind::Binder<'_>,
                ) -> ::ld_bind::LDResult<::core::option::Option<::ld_bind::Value>> {
                    binder.record_to_value(self)
                }
            }
        })
    }

    // === Bounds ===

    /// Bounds for fields whose type mentions a type parameter, following how
    /// each binding uses the field.
    fn generate_bounds(input: &DeriveInput, fields: &[RecordField]) -> Option<WhereClause> {
        let params: Vec<&Ident> = input.generics.type_params().map(|p| &p.ident).collect();
        let mut clause = input.generics.where_clause.clone().unwrap_or_else(|| WhereClause {
            where_token: Default::default(),
            predicates: Punctuated::new(),
        });

        for field in fields {
            if !mentions_any(field.ty.to_token_stream(), &params) {
                continue;
            }
            let ty = &field.ty;
            let predicate: WherePredicate = match &field.binding {
                Binding::Property { all: false, .. } => parse_quote! {
                    #ty: ::ld_bind::FromValue + ::ld_bind::ToValue + ::core::default::Default
                },
                Binding::Property { all: true, .. } => match vec_element(ty) {
                    Some(element) => parse_quote! { #element: ::ld_bind::FromValue + ::ld_bind::ToValue },
                    None => continue,
                },
                Binding::Flatten => parse_quote! { #ty: ::ld_bind::LinkedData },
                Binding::Skip => parse_quote! { #ty: ::core::default::Default },
                Binding::Id | Binding::Type { .. } => continue,
            };
            clause.predicates.push(predicate);
        }

        (!clause.predicates.is_empty()).then_some(clause)
    }

    // === Binding plan ===

    fn generate_plan(fields: &[RecordField]) -> Vec<TokenStream> {
        fields
            .iter()
            .map(|field| {
                let name = field.ident.to_string();
                let kind = match &field.binding {
                    Binding::Id => quote! { ::ld_bind::FieldKind::Id },
                    Binding::Type { expected: None } => {
                        quote! { ::ld_bind::FieldKind::Type { expected: ::core::option::Option::None } }
                    }
                    Binding::Type {
                        expected: Some(expected),
                    } => quote! {
                        ::ld_bind::FieldKind::Type { expected: ::core::option::Option::Some(#expected) }
                    },
                    Binding::Property { key, all } => {
                        let multiplicity = if *all {
                            quote! { ::ld_bind::Multiplicity::All }
                        } else {
                            quote! { ::ld_bind::Multiplicity::First }
                        };
                        quote! {
                            ::ld_bind::FieldKind::Property { key: #key, multiplicity: #multiplicity }
                        }
                    }
                    Binding::Flatten => quote! { ::ld_bind::FieldKind::Flatten },
                    Binding::Skip => quote! { ::ld_bind::FieldKind::Skip },
                };
                quote! { ::ld_bind::FieldBinding::new(#name, #kind) }
            })
            .collect()
    }

    // === from_node ===

    fn generate_decode(fields: &[RecordField]) -> Vec<TokenStream> {
        fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let ident = &field.ident;
                let value = match &field.binding {
                    Binding::Id => quote! { binder.decode_id(node) },
                    Binding::Type { .. } => quote! { binder.decode_type(node, &fields[#i])? },
                    Binding::Property { all: false, .. } => quote! { binder.decode_field(node, &fields[#i])? },
                    Binding::Property { all: true, .. } => quote! { binder.decode_all(node, &fields[#i])? },
                    Binding::Flatten => quote! { ::ld_bind::LinkedData::from_node(node, binder)? },
                    Binding::Skip => quote! { ::core::default::Default::default() },
                };
                quote! { #ident: #value }
            })
            .collect()
    }

    // === to_node ===

    fn generate_encode(fields: &[RecordField]) -> Vec<TokenStream> {
        fields
            .iter()
            .enumerate()
            .filter_map(|(i, field)| {
                let ident = &field.ident;
                let stmt = match &field.binding {
                    Binding::Id => quote! { binder.encode_id(&mut node, &self.#ident); },
                    Binding::Type { .. } => quote! { binder.encode_type(&mut node, &fields[#i], &self.#ident); },
                    Binding::Property { all: false, .. } => {
                        quote! { binder.encode_field(&mut node, &fields[#i], &self.#ident)?; }
                    }
                    Binding::Property { all: true, .. } => {
                        quote! { binder.encode_all(&mut node, &fields[#i], &self.#ident)?; }
                    }
                    Binding::Flatten => quote! {
                        binder.encode_flatten(&mut node, ::ld_bind::LinkedData::to_node(&self.#ident, binder)?);
                    },
                    Binding::Skip => return None,
                };
                Some(stmt)
            })
            .collect()
    }
}

fn mentions_any(tokens: TokenStream, params: &[&Ident]) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => params.iter().any(|param| **param == ident),
        TokenTree::Group(group) => mentions_any(group.stream(), params),
        _ => false,
    })
}
