//! Schema-free resource model.
//!
//! A [`Node`] is an identifier plus a multi-valued property map keyed by
//! expanded IRIs. Decoding produces nodes before they are bound to records,
//! and encoding goes through them on the way back to JSON.

use indexmap::IndexMap;

use crate::models::RDF_TYPE;

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Node(Node),
    String(String),
    Integer(i64),
    Boolean(bool),
    Double(f64),
    /// An expanded IRI produced by `xsd:anyURI` or `@type` coercion.
    Uri(String),
    /// Untyped JSON passed through as-is.
    Json(serde_json::Value),
}

impl Value {
    /// Borrow the value as text if it is a string, a URI, or a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Uri(s) => Some(s),
            Value::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Node(_) => "node",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Double(_) => "double",
            Value::Uri(_) => "URI",
            Value::Json(json) => crate::error::json_kind(json),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

/// Insertion-ordered multimap from expanded property IRIs to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(IndexMap<String, Vec<Value>>);

impl Props {
    pub fn new() -> Self {
        Props(IndexMap::new())
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).and_then(|values| values.first())
    }

    pub fn get_all(&self, key: &str) -> &[Value] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Append a value under `key`, keeping earlier ones.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Replace every value under `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), vec![value.into()]);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<Value>> {
        self.0.shift_remove(key)
    }

    /// Append every entry of `other`, in its order.
    pub fn merge(&mut self, other: Props) {
        for (key, values) in other.0 {
            self.0.entry(key).or_default().extend(values);
        }
    }

    /// `@type` values of the node.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.get_all(RDF_TYPE).iter().filter_map(Value::as_str)
    }

    pub fn has_type(&self, iri: &str) -> bool {
        self.types().any(|t| t == iri)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Value>)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Value>)>>(iter: I) -> Self {
        Props(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Props {
    type Item = (String, Vec<Value>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A generic JSON-LD resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Expanded identifier. Empty for an anonymous node.
    pub id: String,
    pub props: Props,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            props: Props::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.add(key, value);
        self
    }

    /// A bare reference: an identifier and no properties.
    pub fn is_reference(&self) -> bool {
        !self.id.is_empty() && self.props.is_empty()
    }

    /// First `@type` of the node.
    pub fn type_iri(&self) -> Option<&str> {
        self.props.types().next()
    }
}
