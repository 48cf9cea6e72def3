//! Parsing of `#[ld(...)]` field annotations.
//!
//! | Annotation | Binding |
//! |------------|---------|
//! | *(none)* | property keyed by the field name |
//! | `#[ld("iri")]` | property keyed by `iri` (absolute, compact or a term) |
//! | `#[ld("iri", all)]` | every value of the property |
//! | `#[ld("@id")]` | node identifier |
//! | `#[ld(type)]`, `#[ld(type = "iri")]` | type witness, optionally asserted |
//! | `#[ld(flatten)]` | embedded record sharing this node |
//! | `#[ld("-")]`, `#[ld(skip)]` | not bound |
//!
//! Fields of type `Type` are type witnesses and fields of type `Vec<_>` take
//! every value without further annotation.

use syn::parse::ParseStream;
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments, Token, Type as SynType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Id,
    Type { expected: Option<String> },
    Property { key: String, all: bool },
    Flatten,
    Skip,
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub ident: Ident,
    pub ty: SynType,
    pub binding: Binding,
}

/// What a single `#[ld(...)]` attribute says, before the field type is
/// taken into account.
#[derive(Debug, PartialEq, Eq)]
enum Annotation {
    Key { key: String, all: bool },
    Id,
    Type(Option<String>),
    Flatten,
    Skip,
}

pub struct FieldParser;

impl FieldParser {
    pub fn parse(input: &DeriveInput) -> syn::Result<Vec<RecordField>> {
        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "LinkedData can only be derived for structs with named fields",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "LinkedData can only be derived for structs",
                ));
            }
        };

        let mut parsed = Vec::with_capacity(fields.len());
        let mut id_seen = false;
        let mut type_seen = false;
        for field in fields {
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            let annotation = Self::annotation(&field.attrs)?;
            let binding = Self::binding(&ident, &field.ty, annotation);

            let duplicate = match binding {
                Binding::Id => std::mem::replace(&mut id_seen, true),
                Binding::Type { .. } => std::mem::replace(&mut type_seen, true),
                _ => false,
            };
            if duplicate {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "only one field may bind the node identifier or type",
                ));
            }
            parsed.push(RecordField {
                ident,
                ty: field.ty.clone(),
                binding,
            });
        }
        Ok(parsed)
    }

    fn annotation(attrs: &[Attribute]) -> syn::Result<Option<Annotation>> {
        let mut found = None;
        for attr in attrs.iter().filter(|a| a.path().is_ident("ld")) {
            if found.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[ld] attribute"));
            }
            found = Some(attr.parse_args_with(Self::parse_annotation)?);
        }
        Ok(found)
    }

    fn parse_annotation(input: ParseStream) -> syn::Result<Annotation> {
        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            let all = if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
                let flag: Ident = input.parse()?;
                if flag != "all" {
                    return Err(syn::Error::new(flag.span(), "unknown ld option, expected `all`"));
                }
                true
            } else {
                false
            };
            return match lit.value().as_str() {
                "" => Err(syn::Error::new(lit.span(), "empty ld key")),
                "@id" if !all => Ok(Annotation::Id),
                "-" if !all => Ok(Annotation::Skip),
                "@id" | "-" => Err(syn::Error::new(lit.span(), "`all` applies to properties only")),
                key => Ok(Annotation::Key {
                    key: key.to_string(),
                    all,
                }),
            };
        }

        if input.peek(Token![type]) {
            input.parse::<Token![type]>()?;
            if input.peek(Token![=]) {
                input.parse::<Token![=]>()?;
                let lit: LitStr = input.parse()?;
                return Ok(Annotation::Type(Some(lit.value())));
            }
            return Ok(Annotation::Type(None));
        }

        let ident: Ident = input.parse()?;
        match ident.to_string().as_str() {
            "flatten" => Ok(Annotation::Flatten),
            "skip" => Ok(Annotation::Skip),
            other => Err(syn::Error::new(ident.span(), format!("unknown ld option `{}`", other))),
        }
    }

    fn binding(ident: &Ident, ty: &SynType, annotation: Option<Annotation>) -> Binding {
        let is_type = last_segment(ty).is_some_and(|s| s == "Type");
        let is_vec = last_segment(ty).is_some_and(|s| s == "Vec");
        match annotation {
            Some(Annotation::Id) => Binding::Id,
            Some(Annotation::Skip) => Binding::Skip,
            Some(Annotation::Flatten) => Binding::Flatten,
            Some(Annotation::Type(expected)) => Binding::Type { expected },
            Some(Annotation::Key { key, .. }) if is_type => Binding::Type { expected: Some(key) },
            Some(Annotation::Key { key, all }) => Binding::Property {
                key,
                all: all || is_vec,
            },
            None if is_type => Binding::Type { expected: None },
            None => Binding::Property {
                key: unraw(ident),
                all: is_vec,
            },
        }
    }
}

fn last_segment(ty: &SynType) -> Option<&Ident> {
    match ty {
        SynType::Path(path) if path.qself.is_none() => path.path.segments.last().map(|s| &s.ident),
        _ => None,
    }
}

/// `T` in `Vec<T>`.
pub fn vec_element(ty: &SynType) -> Option<&SynType> {
    let SynType::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|s| s.ident == "Vec")?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

/// Field name as written in documents (`r#type` → `type`).
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}
