//! Decoding JSON-LD documents into records.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::binder::{Binder, FromValue};
use crate::context::{Context, ContextFetch};
use crate::error::LDResult;
use crate::node::Value;
use crate::resource::NodeParser;

/// Reusable decoding settings.
///
/// The initial context applies to the whole document and to the keys of
/// bound fields. A document's own `@context` nests under it.
#[derive(Clone, Default)]
pub struct Decoder {
    context: Option<Arc<Context>>,
    fetcher: Option<Arc<dyn ContextFetch + Send + Sync>>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("context", &self.context)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: Arc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// Enable remote `@context` references. Without a fetcher they fail
    /// with [`LDError::RemoteContextDisabled`](crate::LDError::RemoteContextDisabled).
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: ContextFetch + Send + Sync + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn context(&self) -> Option<&Arc<Context>> {
        self.context.as_ref()
    }

    /// Parse a document into the generic node model.
    pub fn decode_value(&self, raw: &Json) -> LDResult<Value> {
        let parser = match &self.fetcher {
            Some(fetcher) => NodeParser::with_fetcher(fetcher.as_ref()),
            None => NodeParser::new(),
        };
        parser.parse(self.context.as_ref(), raw)
    }

    pub fn decode<T: FromValue>(&self, raw: &Json) -> LDResult<T> {
        let value = self.decode_value(raw)?;
        tracing::trace!(kind = value.kind(), "decoded document");
        T::from_value(&value, &Binder::new(self.context.as_deref()))
    }

    pub fn decode_str<T: FromValue>(&self, s: &str) -> LDResult<T> {
        let raw: Json = serde_json::from_str(s)?;
        self.decode(&raw)
    }

    pub fn decode_slice<T: FromValue>(&self, bytes: &[u8]) -> LDResult<T> {
        let raw: Json = serde_json::from_slice(bytes)?;
        self.decode(&raw)
    }
}
