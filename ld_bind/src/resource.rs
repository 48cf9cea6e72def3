//! Walking JSON objects into [`Node`]s and back.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::context::{Context, ContextFetch};
use crate::error::LDResult;
use crate::iri::{compact, expand};
use crate::models::{Coercion, RDF_TYPE, TermDefinition};
use crate::node::{Node, Value};

/// Keyword a key stands for, directly or through an alias term such as
/// `"type": "@type"`.
fn keyword_of<'k>(ctx: Option<&Context>, key: &'k str) -> Option<&'k str> {
    if key.starts_with('@') {
        return Some(key);
    }
    let id = ctx?.term(key)?.id.as_str();
    match id {
        "@id" => Some("@id"),
        "@type" => Some("@type"),
        _ => None,
    }
}

/// Decode direction: JSON object → [`Node`].
#[derive(Default, Clone, Copy)]
pub struct NodeParser<'f> {
    fetcher: Option<&'f dyn ContextFetch>,
}

impl<'f> NodeParser<'f> {
    /// A parser that rejects remote `@context` references.
    pub fn new() -> Self {
        NodeParser { fetcher: None }
    }

    pub fn with_fetcher(fetcher: &'f dyn ContextFetch) -> Self {
        NodeParser {
            fetcher: Some(fetcher),
        }
    }

    /// Parse a top-level document value.
    pub fn parse(&self, ctx: Option<&Arc<Context>>, raw: &Json) -> LDResult<Value> {
        self.parse_value(ctx, raw, None)
    }

    /// Parse one JSON object as a node.
    ///
    /// An embedded `@context` applies to this object and its descendants
    /// only. Null values are dropped.
    pub fn parse_node(&self, ctx: Option<&Arc<Context>>, map: &Map<String, Json>) -> LDResult<Node> {
        let local;
        let ctx = match map.get("@context") {
            Some(raw) => {
                local = Context::resolve(ctx, raw, self.fetcher)?;
                Some(&local)
            }
            None => ctx,
        };
        let scope = ctx.map(Arc::as_ref);

        let mut node = Node::default();
        for (k, v) in map {
            let (key, hint) = match keyword_of(scope, k) {
                Some("@id") => {
                    if let Some(id) = v.as_str() {
                        node.id = expand(scope, id);
                    }
                    continue;
                }
                Some("@type") => (RDF_TYPE.to_string(), Some(Coercion::AnyUri)),
                Some(_) => continue,
                None => match scope.and_then(|c| c.entry(k)) {
                    // explicit null: keep the name as written
                    Some(None) => (k.clone(), None),
                    Some(Some(term)) if !term.id.is_empty() => {
                        (expand(scope, &term.id), term.coercion.clone())
                    }
                    Some(Some(term)) => (expand(scope, k), term.coercion.clone()),
                    None => (expand(scope, k), None),
                },
            };

            let values: Vec<&Json> = match v {
                Json::Array(items) => items.iter().collect(),
                single => vec![single],
            };
            for value in values.into_iter().filter(|value| !value.is_null()) {
                let parsed = self.parse_value(ctx, value, hint.as_ref())?;
                node.props.add(key.as_str(), parsed);
            }
        }

        Ok(node)
    }
}

/// Encode direction: [`Node`] → JSON object.
#[derive(Default, Clone, Copy)]
pub struct NodeFormatter<'c> {
    ctx: Option<&'c Context>,
}

impl<'c> NodeFormatter<'c> {
    pub fn new(ctx: Option<&'c Context>) -> Self {
        NodeFormatter { ctx }
    }

    pub fn context(&self) -> Option<&'c Context> {
        self.ctx
    }

    /// Name to write a keyword under, preferring an alias term.
    fn keyword(&self, keyword: &str) -> String {
        self.ctx
            .and_then(|ctx| ctx.terms().find(|(_, term)| term.id == keyword).map(|(name, _)| name))
            .unwrap_or(keyword)
            .to_string()
    }

    /// Short name for a property, or the absolute IRI when the short name
    /// is taken or would not expand back to `iri`.
    fn property_name(&self, map: &Map<String, Json>, iri: &str) -> (String, Option<&'c TermDefinition>) {
        let (name, term) = compact(self.ctx, iri);
        if name == iri || (!map.contains_key(&name) && expand(self.ctx, &name) == iri) {
            return (name, term);
        }
        (iri.to_string(), None)
    }

    pub fn format_node(&self, node: &Node) -> Map<String, Json> {
        let mut map = Map::new();
        if !node.id.is_empty() {
            map.insert(self.keyword("@id"), Json::String(node.id.clone()));
        }

        for (key, values) in node.props.iter() {
            if key == RDF_TYPE {
                let types = values
                    .iter()
                    .map(|value| match value.as_str() {
                        Some(iri) => Json::String(compact(self.ctx, iri).0),
                        None => self.format_value(value, None),
                    })
                    .collect();
                map.insert(self.keyword("@type"), collapse(types));
                continue;
            }

            let (name, term) = self.property_name(&map, key);
            let formatted = values.iter().map(|value| self.format_value(value, term)).collect();
            map.insert(name, collapse(formatted));
        }

        map
    }
}

/// A single value is written bare, several as an array.
fn collapse(values: Vec<Json>) -> Json {
    match <[Json; 1]>::try_from(values) {
        Ok([single]) => single,
        Err(values) => Json::Array(values),
    }
}
