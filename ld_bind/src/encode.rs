//! Encoding records as JSON-LD documents.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::binder::{Binder, ToValue};
use crate::context::Context;
use crate::error::LDResult;
use crate::resource::NodeFormatter;

/// Reusable encoding settings.
///
/// With a context, keys and type names are compacted against it and the
/// document carries it as `@context`.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    context: Option<Arc<Context>>,
    pretty: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: Arc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn context(&self) -> Option<&Arc<Context>> {
        self.context.as_ref()
    }

    pub fn encode_value<T: ToValue + ?Sized>(&self, value: &T) -> LDResult<Json> {
        let ctx = self.context.as_deref();
        let body = match value.to_value(&Binder::new(ctx))? {
            Some(value) => NodeFormatter::new(ctx).format_value(&value, None),
            None => Json::Null,
        };

        let Some(ctx) = ctx.filter(|ctx| !ctx.is_empty()) else {
            return Ok(body);
        };

        let mut document = Map::new();
        document.insert("@context".to_string(), ctx.to_json());
        match body {
            Json::Object(map) => document.extend(map),
            other => {
                document.insert("@value".to_string(), other);
            }
        }
        Ok(Json::Object(document))
    }

    pub fn encode_string<T: ToValue + ?Sized>(&self, value: &T) -> LDResult<String> {
        let document = self.encode_value(value)?;
        let s = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(s)
    }

    pub fn encode_vec<T: ToValue + ?Sized>(&self, value: &T) -> LDResult<Vec<u8>> {
        let document = self.encode_value(value)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };
        Ok(bytes)
    }
}
