//! Context scopes.
//!
//! A [`Context`] holds the term table of one `@context` scope and a shared
//! reference to its parent. Scopes are immutable once built; nested
//! `@context` values produce new child scopes that overlay their own entries
//! on the parent's.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::error::{LDError, LDResult, json_kind};
use crate::iri;
use crate::models::{Coercion, TermDefinition};

/// Source of remote context documents.
///
/// Decoding calls this when it meets a string `@context`. Implementations
/// are responsible for their own retries, timeouts and caching.
pub trait ContextFetch {
    fn fetch(&self, url: &str) -> LDResult<Arc<Context>>;
}

impl<F> ContextFetch for F
where
    F: Fn(&str) -> LDResult<Arc<Context>>,
{
    fn fetch(&self, url: &str) -> LDResult<Arc<Context>> {
        self(url)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    origin: Option<String>,
    language: Option<String>,
    base: Option<String>,
    vocabulary: Option<String>,
    /// `None` entries are explicit nulls shadowing an inherited term.
    terms: IndexMap<String, Option<TermDefinition>>,
    parent: Option<Arc<Context>>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Build a context from a JSON `@context` value without remote fetching.
    pub fn from_json(value: &Json) -> LDResult<Arc<Context>> {
        Self::resolve(None, value, None)
    }

    /// Build a context from a JSON `@context` value, fetching string
    /// references through `fetcher`.
    pub fn from_json_with(value: &Json, fetcher: &dyn ContextFetch) -> LDResult<Arc<Context>> {
        Self::resolve(None, value, Some(fetcher))
    }

    /// Build the context of a remote context document retrieved from `url`.
    ///
    /// The document's `@context` entry is used when present, otherwise the
    /// whole document. The resulting scope remembers `url` as its origin.
    pub fn from_document(url: &str, document: &Json) -> LDResult<Arc<Context>> {
        let value = document
            .as_object()
            .and_then(|o| o.get("@context"))
            .unwrap_or(document);
        let resolved = Self::resolve(None, value, None)?;
        let mut ctx = Arc::unwrap_or_clone(resolved);
        ctx.origin = Some(url.to_string());
        Ok(Arc::new(ctx))
    }

    /// Resolve a `@context` value on top of `parent`.
    ///
    /// Objects become child scopes, strings go through `fetcher` and arrays
    /// are folded left to right.
    pub(crate) fn resolve(
        parent: Option<&Arc<Context>>,
        value: &Json,
        fetcher: Option<&dyn ContextFetch>,
    ) -> LDResult<Arc<Context>> {
        match value {
            Json::Object(map) => Self::parse_scope(parent, map),
            Json::String(url) => {
                let fetcher = fetcher.ok_or_else(|| LDError::RemoteContextDisabled {
                    url: url.clone(),
                })?;
                tracing::debug!(url = %url, "fetching remote context");
                let fetched = fetcher.fetch(url)?;
                Ok(match parent {
                    Some(parent) => Self::overlay(parent, &fetched),
                    None => fetched,
                })
            }
            Json::Array(items) => {
                let mut ctx = parent.cloned();
                for item in items {
                    ctx = Some(Self::resolve(ctx.as_ref(), item, fetcher)?);
                }
                Ok(ctx.unwrap_or_default())
            }
            other => Err(LDError::MalformedContext {
                found: json_kind(other),
            }),
        }
    }

    fn parse_scope(parent: Option<&Arc<Context>>, map: &Map<String, Json>) -> LDResult<Arc<Context>> {
        let mut builder = ContextBuilder::new();
        if let Some(parent) = parent {
            builder.parent(parent.clone());
        }

        if let Some(lang) = map
            .get("@lang")
            .or_else(|| map.get("@language"))
            .and_then(Json::as_str)
        {
            builder.language(lang);
        }
        if let Some(base) = map.get("@base").and_then(Json::as_str) {
            builder.base(base);
        }
        if let Some(vocab) = map.get("@vocab").and_then(Json::as_str) {
            builder.vocabulary(vocab);
        }

        for (name, value) in map {
            if name.starts_with('@') {
                continue;
            }
            match value {
                Json::Null => {
                    builder.null_term(name);
                }
                Json::String(id) => {
                    builder.term(name, TermDefinition::new(id.as_str()));
                }
                Json::Object(def) => {
                    builder.term(name, Self::parse_term_object(def));
                }
                other => {
                    return Err(LDError::MalformedContextTerm {
                        term: name.clone(),
                        found: json_kind(other),
                    });
                }
            }
        }

        tracing::trace!(terms = builder.terms.len(), "built context scope");
        Ok(builder.build())
    }

    fn parse_term_object(def: &Map<String, Json>) -> TermDefinition {
        let id = def.get("@id").and_then(Json::as_str).unwrap_or_default();
        let coercion = match def.get("@type") {
            Some(Json::String(t)) => Some(Coercion::from_iri(t)),
            Some(Json::Array(types)) => types.first().and_then(Json::as_str).map(Coercion::from_iri),
            _ => None,
        };
        TermDefinition {
            id: id.to_string(),
            coercion,
        }
    }

    /// Child of `parent` carrying every visible entry and scalar of `other`.
    fn overlay(parent: &Arc<Context>, other: &Context) -> Arc<Context> {
        let mut builder = ContextBuilder::new();
        builder.parent(parent.clone());
        if let Some(lang) = &other.language {
            builder.language(lang);
        }
        if let Some(base) = &other.base {
            builder.base(base);
        }
        if let Some(vocab) = &other.vocabulary {
            builder.vocabulary(vocab);
        }
        for (name, def) in other.entries() {
            match def {
                Some(def) => builder.term(name, def.clone()),
                None => builder.null_term(name),
            };
        }
        builder.build()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn vocabulary(&self) -> Option<&str> {
        self.vocabulary.as_deref()
    }

    pub fn parent(&self) -> Option<&Arc<Context>> {
        self.parent.as_ref()
    }

    /// Entry for `name` in the nearest scope that declares it.
    ///
    /// `Some(None)` is an explicit null; `None` means no scope mentions it.
    pub fn entry(&self, name: &str) -> Option<Option<&TermDefinition>> {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(def) = ctx.terms.get(name) {
                return Some(def.as_ref());
            }
            scope = ctx.parent.as_deref();
        }
        None
    }

    /// Visible term definition for `name`, if any.
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.entry(name).flatten()
    }

    /// Visible entries, nearest scope first and each scope in declaration
    /// order. Names shadowed by a nearer scope are skipped.
    pub fn entries(&self) -> Vec<(&str, Option<&TermDefinition>)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            for (name, def) in &ctx.terms {
                if seen.insert(name.as_str()) {
                    out.push((name.as_str(), def.as_ref()));
                }
            }
            scope = ctx.parent.as_deref();
        }
        out
    }

    /// Visible term definitions in [`entries`](Self::entries) order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermDefinition)> {
        self.entries()
            .into_iter()
            .filter_map(|(name, def)| def.map(|def| (name, def)))
    }

    pub fn expand(&self, name: &str) -> String {
        iri::expand(Some(self), name)
    }

    pub fn compact(&self, iri: &str) -> (String, Option<&TermDefinition>) {
        iri::compact(Some(self), iri)
    }

    /// True when the context would add nothing to an encoded document.
    pub fn is_empty(&self) -> bool {
        self.origin.is_none()
            && self.language.is_none()
            && self.base.is_none()
            && self.vocabulary.is_none()
            && self.entries().is_empty()
    }

    /// The `@context` value describing this scope.
    ///
    /// A scope loaded from a URL is written as that URL. Otherwise an inline
    /// object is rebuilt from the scalars and the visible entries.
    pub fn to_json(&self) -> Json {
        if let Some(origin) = &self.origin {
            return Json::String(origin.clone());
        }

        let mut map = Map::new();
        if let Some(lang) = &self.language {
            map.insert("@lang".to_string(), Json::String(lang.clone()));
        }
        if let Some(base) = &self.base {
            map.insert("@base".to_string(), Json::String(base.clone()));
        }
        if let Some(vocab) = &self.vocabulary {
            map.insert("@vocab".to_string(), Json::String(vocab.clone()));
        }
        for (name, def) in self.entries() {
            let value = match def {
                None => Json::Null,
                Some(TermDefinition { id, coercion: None }) => Json::String(id.clone()),
                Some(TermDefinition {
                    id,
                    coercion: Some(coercion),
                }) => {
                    let mut obj = Map::new();
                    if !id.is_empty() {
                        obj.insert("@id".to_string(), Json::String(id.clone()));
                    }
                    obj.insert("@type".to_string(), Json::String(coercion.as_iri().to_string()));
                    Json::Object(obj)
                }
            };
            map.insert(name.to_string(), value);
        }
        Json::Object(map)
    }
}

/// Assembles one context scope.
///
/// Compact term identifiers and datatypes (`"foaf:name"`, `"xsd:integer"`)
/// are resolved in [`build`](Self::build), once every prefix of the scope is
/// known.
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    origin: Option<String>,
    language: Option<String>,
    base: Option<String>,
    vocabulary: Option<String>,
    terms: IndexMap<String, Option<TermDefinition>>,
    parent: Option<Arc<Context>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit scalars and terms from `parent`.
    pub fn parent(&mut self, parent: Arc<Context>) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    /// Mark the scope as loaded from `url`; it is encoded as that URL.
    pub fn origin(&mut self, url: impl Into<String>) -> &mut Self {
        self.origin = Some(url.into());
        self
    }

    pub fn language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = Some(language.into());
        self
    }

    pub fn base(&mut self, base: impl Into<String>) -> &mut Self {
        self.base = Some(base.into());
        self
    }

    pub fn vocabulary(&mut self, vocabulary: impl Into<String>) -> &mut Self {
        self.vocabulary = Some(vocabulary.into());
        self
    }

    pub fn term(&mut self, name: impl Into<String>, def: TermDefinition) -> &mut Self {
        self.terms.insert(name.into(), Some(def));
        self
    }

    /// Declare `name` as null, hiding any inherited definition.
    pub fn null_term(&mut self, name: impl Into<String>) -> &mut Self {
        self.terms.insert(name.into(), None);
        self
    }

    pub fn build(&self) -> Arc<Context> {
        let parent = self.parent.as_deref();
        let mut ctx = Context {
            origin: self.origin.clone(),
            language: self.language.clone().or_else(|| parent.and_then(|p| p.language.clone())),
            base: self.base.clone().or_else(|| parent.and_then(|p| p.base.clone())),
            vocabulary: self
                .vocabulary
                .clone()
                .or_else(|| parent.and_then(|p| p.vocabulary.clone())),
            terms: self.terms.clone(),
            parent: self.parent.clone(),
        };

        // Second pass: prefixes may be declared after the terms using them.
        let resolved: IndexMap<String, Option<TermDefinition>> = ctx
            .terms
            .iter()
            .map(|(name, def)| {
                let def = def.as_ref().map(|def| TermDefinition {
                    id: iri::resolve_prefixed(&ctx, &def.id),
                    coercion: def.coercion.as_ref().map(|c| match c {
                        Coercion::Other(t) => Coercion::from_iri(&iri::resolve_prefixed(&ctx, t)),
                        known => known.clone(),
                    }),
                });
                (name.clone(), def)
            })
            .collect();
        ctx.terms = resolved;
        Arc::new(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::xsd;
    use serde_json::json;

    fn person_context() -> Arc<Context> {
        Context::from_json(&json!({
            "name": "http://schema.org/name",
            "image": {"@id": "http://schema.org/image", "@type": "@id"},
            "homepage": {"@id": "http://schema.org/url", "@type": "@id"}
        }))
        .unwrap()
    }

    // === Parsing Tests ===

    #[test]
    fn parse_string_and_object_terms() {
        let ctx = person_context();
        assert_eq!(ctx.term("name"), Some(&TermDefinition::new("http://schema.org/name")));
        assert_eq!(
            ctx.term("homepage"),
            Some(&TermDefinition::reference("http://schema.org/url"))
        );
    }

    #[test]
    fn parse_scalars() {
        let ctx = Context::from_json(&json!({
            "@vocab": "http://schema.org/",
            "@base": "http://example.org/",
            "@lang": "en"
        }))
        .unwrap();
        assert_eq!(ctx.vocabulary(), Some("http://schema.org/"));
        assert_eq!(ctx.base(), Some("http://example.org/"));
        assert_eq!(ctx.language(), Some("en"));
    }

    #[test]
    fn parse_accepts_at_language() {
        let ctx = Context::from_json(&json!({"@language": "ja"})).unwrap();
        assert_eq!(ctx.language(), Some("ja"));
    }

    #[test]
    fn parse_null_term() {
        let ctx = Context::from_json(&json!({"databaseId": null})).unwrap();
        assert_eq!(ctx.entry("databaseId"), Some(None));
        assert_eq!(ctx.term("databaseId"), None);
        assert_eq!(ctx.entry("other"), None);
    }

    #[test]
    fn parse_rejects_malformed_term() {
        let err = Context::from_json(&json!({"age": 42})).unwrap_err();
        match err {
            LDError::MalformedContextTerm { term, found } => {
                assert_eq!(term, "age");
                assert_eq!(found, "number");
            }
            other => panic!("Expected MalformedContextTerm, got: {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_malformed_context() {
        let err = Context::from_json(&json!(42)).unwrap_err();
        assert!(matches!(err, LDError::MalformedContext { found: "number" }));
        let err = Context::from_json(&json!([{"a": "urn:a#"}, true])).unwrap_err();
        assert!(matches!(err, LDError::MalformedContext { found: "boolean" }));
    }

    #[test]
    fn parse_resolves_compact_ids_declared_later() {
        let ctx = Context::from_json(&json!({
            "picture": {"@id": "foaf:depiction", "@type": "@id"},
            "foaf": "http://xmlns.com/foaf/0.1/"
        }))
        .unwrap();
        assert_eq!(
            ctx.term("picture"),
            Some(&TermDefinition::reference("http://xmlns.com/foaf/0.1/depiction"))
        );
    }

    #[test]
    fn parse_resolves_compact_datatypes() {
        let ctx = Context::from_json(&json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "age": {"@id": "http://xmlns.com/foaf/0.1/age", "@type": "xsd:integer"}
        }))
        .unwrap();
        assert_eq!(ctx.term("age").unwrap().coercion, Some(Coercion::Integer));
    }

    #[test]
    fn parse_term_with_coercion_only() {
        let ctx = Context::from_json(&json!({
            "foaf": "http://xmlns.com/foaf/0.1/",
            "foaf:homepage": {"@type": "@id"}
        }))
        .unwrap();
        let term = ctx.term("foaf:homepage").unwrap();
        assert!(term.id.is_empty());
        assert!(term.declares_id());
    }

    // === Inheritance Tests ===

    #[test]
    fn array_contexts_merge_left_to_right() {
        let ctx = Context::from_json(&json!([
            {"a": "urn:a#", "shared": "urn:first"},
            {"b": "urn:b#", "shared": "urn:second"}
        ]))
        .unwrap();
        assert_eq!(ctx.term("a").unwrap().id, "urn:a#");
        assert_eq!(ctx.term("b").unwrap().id, "urn:b#");
        assert_eq!(ctx.term("shared").unwrap().id, "urn:second");
    }

    #[test]
    fn child_inherits_scalars_and_terms() {
        let parent = Context::from_json(&json!({
            "@vocab": "http://schema.org/",
            "name": "http://schema.org/name"
        }))
        .unwrap();
        let child = Context::resolve(Some(&parent), &json!({"@lang": "en"}), None).unwrap();
        assert_eq!(child.vocabulary(), Some("http://schema.org/"));
        assert_eq!(child.language(), Some("en"));
        assert_eq!(child.term("name").unwrap().id, "http://schema.org/name");
        // the parent is untouched
        assert_eq!(parent.language(), None);
    }

    #[test]
    fn child_null_shadows_parent_term() {
        let parent = Context::from_json(&json!({"name": "http://schema.org/name"})).unwrap();
        let child = Context::resolve(Some(&parent), &json!({"name": null}), None).unwrap();
        assert_eq!(child.entry("name"), Some(None));
        assert_eq!(child.terms().count(), 0);
        assert!(parent.term("name").is_some());
    }

    #[test]
    fn entries_are_nearest_scope_first() {
        let parent = Context::from_json(&json!({"a": "urn:a", "b": "urn:b"})).unwrap();
        let child = Context::resolve(Some(&parent), &json!({"c": "urn:c", "a": "urn:a2"}), None).unwrap();
        let names: Vec<&str> = child.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(child.term("a").unwrap().id, "urn:a2");
    }

    #[test]
    fn empty_array_keeps_parent() {
        let parent = person_context();
        let ctx = Context::resolve(Some(&parent), &json!([]), None).unwrap();
        assert!(Arc::ptr_eq(&ctx, &parent));
    }

    // === Remote Context Tests ===

    #[test]
    fn string_context_without_fetcher_is_rejected() {
        let err = Context::from_json(&json!("http://json-ld.org/contexts/person.jsonld")).unwrap_err();
        match err {
            LDError::RemoteContextDisabled { url } => {
                assert_eq!(url, "http://json-ld.org/contexts/person.jsonld");
            }
            other => panic!("Expected RemoteContextDisabled, got: {:?}", other),
        }
    }

    #[test]
    fn string_context_uses_fetcher() {
        let fetch = |url: &str| -> LDResult<Arc<Context>> {
            assert_eq!(url, "http://json-ld.org/contexts/person.jsonld");
            Ok(Context::builder()
                .origin(url)
                .term("name", TermDefinition::new("http://schema.org/name"))
                .build())
        };
        let ctx = Context::from_json_with(&json!("http://json-ld.org/contexts/person.jsonld"), &fetch).unwrap();
        assert_eq!(ctx.origin(), Some("http://json-ld.org/contexts/person.jsonld"));
        assert_eq!(ctx.term("name").unwrap().id, "http://schema.org/name");
    }

    #[test]
    fn fetched_context_overlays_current_scope() {
        let fetch = |_: &str| -> LDResult<Arc<Context>> {
            Ok(Context::builder()
                .origin("urn:remote")
                .term("b", TermDefinition::new("urn:b#"))
                .build())
        };
        let ctx = Context::from_json_with(&json!([{"a": "urn:a#"}, "urn:remote"]), &fetch).unwrap();
        assert_eq!(ctx.term("a").unwrap().id, "urn:a#");
        assert_eq!(ctx.term("b").unwrap().id, "urn:b#");
        // a merged scope is no longer loaded entirely from the URL
        assert_eq!(ctx.origin(), None);
    }

    #[test]
    fn fetcher_errors_propagate() {
        let fetch = |url: &str| -> LDResult<Arc<Context>> {
            Err(LDError::Fetch {
                url: url.to_string(),
                source: "unreachable".into(),
            })
        };
        let err = Context::from_json_with(&json!("urn:remote"), &fetch).unwrap_err();
        assert!(matches!(err, LDError::Fetch { .. }));
    }

    #[test]
    fn from_document_sets_origin() {
        let doc = json!({"@context": {"name": "http://schema.org/name"}});
        let ctx = Context::from_document("http://example.com/ctx.jsonld", &doc).unwrap();
        assert_eq!(ctx.origin(), Some("http://example.com/ctx.jsonld"));
        assert_eq!(ctx.term("name").unwrap().id, "http://schema.org/name");
    }

    // === Formatting Tests ===

    #[test]
    fn to_json_uses_origin() {
        let ctx = Context::builder()
            .origin("http://json-ld.org/contexts/person.jsonld")
            .term("name", TermDefinition::new("http://schema.org/name"))
            .build();
        assert_eq!(ctx.to_json(), json!("http://json-ld.org/contexts/person.jsonld"));
    }

    #[test]
    fn to_json_inline_object() {
        let ctx = Context::builder()
            .vocabulary("http://schema.org/")
            .term("name", TermDefinition::new("http://schema.org/name"))
            .term("homepage", TermDefinition::reference("http://schema.org/url"))
            .term("age", TermDefinition::new("http://schema.org/age").with_coercion(Coercion::Integer))
            .null_term("databaseId")
            .build();
        assert_eq!(
            ctx.to_json(),
            json!({
                "@vocab": "http://schema.org/",
                "name": "http://schema.org/name",
                "homepage": {"@id": "http://schema.org/url", "@type": "@id"},
                "age": {"@id": "http://schema.org/age", "@type": xsd::INTEGER},
                "databaseId": null
            })
        );
    }

    #[test]
    fn to_json_parses_back_to_same_terms() {
        let ctx = person_context();
        let reparsed = Context::from_json(&ctx.to_json()).unwrap();
        let first: Vec<_> = ctx.terms().collect();
        let again: Vec<_> = reparsed.terms().collect();
        assert_eq!(first, again);
    }

    #[test]
    fn is_empty() {
        assert!(Context::builder().build().is_empty());
        assert!(!person_context().is_empty());
        assert!(!Context::builder().vocabulary("http://schema.org/").build().is_empty());
    }
}
