//! Literal coercion between raw JSON values and [`Value`]s.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::context::Context;
use crate::error::{LDError, LDResult, json_kind};
use crate::iri::{compact, expand};
use crate::models::{Coercion, TermDefinition};
use crate::node::{Node, Value};
use crate::resource::{NodeFormatter, NodeParser};

/// Datatype carried inline by a value object (`{"@value": .., "@type": ..}`).
fn inline_type(ctx: Option<&Context>, map: &Map<String, Json>) -> Option<Coercion> {
    let raw = match map.get("@type")? {
        Json::String(t) => t.as_str(),
        Json::Array(types) => types.first()?.as_str()?,
        _ => return None,
    };
    Some(Coercion::from_iri(&expand(ctx, raw)))
}

fn unexpected(coercion: &Coercion, found: &Json) -> LDError {
    match coercion {
        Coercion::Id => LDError::ExpectedId { found: json_kind(found) },
        Coercion::String => LDError::ExpectedString { found: json_kind(found) },
        Coercion::Integer => LDError::ExpectedInteger {
            found: match found {
                Json::Number(n) => n.to_string(),
                Json::String(s) => format!("\"{}\"", s),
                other => json_kind(other).to_string(),
            },
        },
        Coercion::Boolean => LDError::ExpectedBoolean { found: json_kind(found) },
        Coercion::Double => LDError::ExpectedDouble {
            found: match found {
                Json::String(s) => format!("\"{}\"", s),
                other => json_kind(other).to_string(),
            },
        },
        Coercion::AnyUri | Coercion::Other(_) => LDError::ExpectedUri { found: json_kind(found) },
    }
}

fn parse_integer(raw: &Json) -> Option<i64> {
    match raw {
        Json::Number(n) if n.is_u64() => n.as_i64(),
        Json::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
        }),
        // big integers travel as strings
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_double(raw: &Json) -> Option<f64> {
    match raw {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl NodeParser<'_> {
    /// Parse one property value under `hint`.
    ///
    /// Value objects supply their own `@type` when no hint was resolved from
    /// the term. Objects without `@value` are nodes.
    pub fn parse_value(
        &self,
        ctx: Option<&Arc<Context>>,
        raw: &Json,
        hint: Option<&Coercion>,
    ) -> LDResult<Value> {
        let scope = ctx.map(Arc::as_ref);
        let (literal, inline) = match raw {
            Json::Object(map) => match map.get("@value") {
                Some(literal) => (literal, inline_type(scope, map)),
                None => {
                    return match hint {
                        None | Some(Coercion::Id) | Some(Coercion::Other(_)) => {
                            Ok(Value::Node(self.parse_node(ctx, map)?))
                        }
                        Some(coercion) => Err(unexpected(coercion, raw)),
                    };
                }
            },
            other => (other, None),
        };

        let Some(coercion) = hint.cloned().or(inline) else {
            return Ok(Value::Json(literal.clone()));
        };

        match coercion {
            Coercion::Id => match literal {
                Json::String(id) => Ok(Value::Node(Node::new(id.as_str()))),
                other => Err(unexpected(&coercion, other)),
            },
            Coercion::String => match literal {
                Json::String(s) => Ok(Value::String(s.clone())),
                other => Err(unexpected(&coercion, other)),
            },
            Coercion::Integer => parse_integer(literal)
                .map(Value::Integer)
                .ok_or_else(|| unexpected(&coercion, literal)),
            Coercion::Boolean => match literal {
                Json::Bool(b) => Ok(Value::Boolean(*b)),
                other => Err(unexpected(&coercion, other)),
            },
            Coercion::Double => parse_double(literal)
                .map(Value::Double)
                .ok_or_else(|| unexpected(&coercion, literal)),
            Coercion::AnyUri => match literal {
                Json::String(uri) => Ok(Value::Uri(expand(scope, uri))),
                other => Err(unexpected(&coercion, other)),
            },
            Coercion::Other(_) => Ok(Value::Json(literal.clone())),
        }
    }
}

impl NodeFormatter<'_> {
    /// Format one property value. `term` is the term the property compacted
    /// to, if any.
    pub fn format_value(&self, value: &Value, term: Option<&TermDefinition>) -> Json {
        match value {
            Value::Node(node) => {
                if node.is_reference() && term.is_some_and(TermDefinition::declares_id) {
                    Json::String(node.id.clone())
                } else {
                    Json::Object(self.format_node(node))
                }
            }
            Value::String(s) => Json::String(s.clone()),
            Value::Integer(i) => Json::from(*i),
            Value::Boolean(b) => Json::Bool(*b),
            Value::Double(f) => Json::from(*f),
            Value::Uri(uri) => Json::String(compact(self.context(), uri).0),
            Value::Json(json) => json.clone(),
        }
    }
}
