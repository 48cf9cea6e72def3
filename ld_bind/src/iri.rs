//! IRI expansion and compaction against a context scope.

use crate::context::Context;
use crate::models::TermDefinition;

/// Term with a usable identifier. Suppressed terms (empty identifier or
/// explicit null) never take part in expansion or compaction.
fn defined_term<'a>(ctx: &'a Context, name: &str) -> Option<&'a TermDefinition> {
    ctx.term(name).filter(|term| !term.id.is_empty())
}

/// Expand `name` to an absolute IRI.
///
/// `prefix:suffix` expands through the `prefix` term, a bare term expands to
/// its identifier and any other bare name is appended to the vocabulary.
/// Names with an unknown prefix are taken as already absolute. Without a
/// context this is the identity.
pub fn expand(ctx: Option<&Context>, name: &str) -> String {
    let Some(ctx) = ctx else {
        return name.to_string();
    };
    if name.starts_with('@') {
        return name.to_string();
    }

    if let Some((prefix, suffix)) = name.split_once(':') {
        return match defined_term(ctx, prefix) {
            Some(term) => format!("{}{}", term.id, suffix),
            None => name.to_string(),
        };
    }

    if let Some(term) = defined_term(ctx, name) {
        return term.id.clone();
    }
    format!("{}{}", ctx.vocabulary().unwrap_or_default(), name)
}

/// Find the short name for `iri`.
///
/// Preference order: a term whose identifier equals `iri` (returned with
/// its definition), then `term:rest` for the first term whose identifier is
/// a prefix of `iri`, then the remainder after the vocabulary. Terms are
/// tried in [`Context::entries`] order, so the result is stable for a given
/// context.
pub fn compact<'a>(ctx: Option<&'a Context>, iri: &str) -> (String, Option<&'a TermDefinition>) {
    let Some(ctx) = ctx else {
        return (iri.to_string(), None);
    };
    if iri.starts_with('@') {
        return (iri.to_string(), None);
    }

    let terms: Vec<(&str, &TermDefinition)> =
        ctx.terms().filter(|(_, term)| !term.id.is_empty()).collect();

    if let Some((name, term)) = terms.iter().find(|(_, term)| term.id == iri) {
        return (name.to_string(), Some(*term));
    }

    if let Some((name, term)) = terms.iter().find(|(_, term)| iri.starts_with(term.id.as_str())) {
        return (format!("{}:{}", name, &iri[term.id.len()..]), None);
    }

    if let Some(vocab) = ctx.vocabulary()
        && !vocab.is_empty()
        && iri.len() > vocab.len()
        && iri.starts_with(vocab)
    {
        return (iri[vocab.len()..].to_string(), None);
    }

    (iri.to_string(), None)
}

/// Resolve a compact `prefix:suffix` value through the scope's prefixes.
///
/// Used while building a scope for term identifiers and datatypes. Unlike
/// [`expand`], bare names are left alone.
pub(crate) fn resolve_prefixed(ctx: &Context, value: &str) -> String {
    if value.starts_with('@') {
        return value.to_string();
    }
    match value.split_once(':') {
        Some((prefix, suffix)) => match defined_term(ctx, prefix) {
            Some(term) if !suffix.starts_with("//") => format!("{}{}", term.id, suffix),
            _ => value.to_string(),
        },
        None => value.to_string(),
    }
}
