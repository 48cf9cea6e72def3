//! Binding between [`Node`]s and Rust records.
//!
//! Records implement [`LinkedData`], usually through
//! `#[derive(LinkedData)]`. The derive emits a static binding plan
//! ([`LinkedData::FIELDS`]) in field declaration order and code that walks
//! it through the helpers on [`Binder`].

use crate::context::Context;
use crate::error::{LDError, LDResult};
use crate::iri::expand;
use crate::models::{RDF_TYPE, Type};
use crate::node::{Node, Value};
use crate::resource::NodeFormatter;

/// How many property values a field takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// The first value; later ones are ignored.
    First,
    /// Every value, in document order.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Bound to the node identifier.
    Id,
    /// Type witness. `expected` asserts the node's type.
    Type { expected: Option<&'static str> },
    /// Bound to the values under `key`, expanded against the binder context.
    Property {
        key: &'static str,
        multiplicity: Multiplicity,
    },
    /// Embedded record whose fields are promoted onto this one.
    Flatten,
    /// Excluded from binding.
    Skip,
}

/// One entry of a record's binding plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: &'static str,
    pub kind: FieldKind,
}

impl FieldBinding {
    pub const fn new(field: &'static str, kind: FieldKind) -> Self {
        FieldBinding { field, kind }
    }

    /// Property key of the field, before expansion.
    pub fn key(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Property { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// A record type that maps to and from a [`Node`].
pub trait LinkedData: Sized {
    /// Binding plan, in field declaration order.
    const FIELDS: &'static [FieldBinding];

    fn from_node(node: &Node, binder: &Binder<'_>) -> LDResult<Self>;

    fn to_node(&self, binder: &Binder<'_>) -> LDResult<Node>;
}

/// Conversion from a single property value.
pub trait FromValue: Sized {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self>;
}

/// Conversion to a single property value. `None` omits the property.
pub trait ToValue {
    fn to_value(&self, binder: &Binder<'_>) -> LDResult<Option<Value>>;
}

pub(crate) fn mismatch(expected: &str, found: &Value) -> LDError {
    LDError::TypeMismatch {
        key: String::new(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

/// Attach the property key to a mismatch raised by a value conversion.
fn at_key(err: LDError, key: &str) -> LDError {
    match err {
        LDError::TypeMismatch {
            key: k,
            expected,
            found,
        } if k.is_empty() => LDError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        },
        other => other,
    }
}

/// Carries the context used to expand field keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct Binder<'c> {
    ctx: Option<&'c Context>,
}

impl<'c> Binder<'c> {
    pub fn new(ctx: Option<&'c Context>) -> Self {
        Binder { ctx }
    }

    pub fn context(&self) -> Option<&'c Context> {
        self.ctx
    }

    /// Absolute property key for a field annotation.
    pub fn resolve_key(&self, key: &str) -> String {
        expand(self.ctx, key)
    }

    // === Decode ===

    pub fn decode_id(&self, node: &Node) -> String {
        node.id.clone()
    }

    pub fn decode_type(&self, node: &Node, binding: &FieldBinding) -> LDResult<Type> {
        let FieldKind::Type { expected } = binding.kind else {
            return Ok(Type::default());
        };
        match expected {
            Some(expected) => {
                let expected = self.resolve_key(expected);
                if node.props.has_type(&expected) {
                    Ok(Type::new(expected))
                } else {
                    Err(LDError::TypeMismatch {
                        key: "@type".to_string(),
                        expected,
                        found: node.type_iri().unwrap_or("no type").to_string(),
                    })
                }
            }
            None => Ok(Type::new(node.type_iri().unwrap_or_default())),
        }
    }

    /// First value under the field's key, or `T::default()` when absent.
    pub fn decode_field<T>(&self, node: &Node, binding: &FieldBinding) -> LDResult<T>
    where
        T: FromValue + Default,
    {
        let Some(key) = binding.key() else {
            return Ok(T::default());
        };
        let key = self.resolve_key(key);
        match node.props.get(&key) {
            Some(value) => T::from_value(value, self).map_err(|e| at_key(e, &key)),
            None => Ok(T::default()),
        }
    }

    /// Every value under the field's key.
    pub fn decode_all<T: FromValue>(&self, node: &Node, binding: &FieldBinding) -> LDResult<Vec<T>> {
        let Some(key) = binding.key() else {
            return Ok(Vec::new());
        };
        let key = self.resolve_key(key);
        node.props
            .get_all(&key)
            .iter()
            .map(|value| T::from_value(value, self).map_err(|e| at_key(e, &key)))
            .collect()
    }

    // === Encode ===

    pub fn encode_id(&self, node: &mut Node, id: &str) {
        if !id.is_empty() {
            node.id = id.to_string();
        }
    }

    /// Write the type witness. An annotated type wins over the field value.
    pub fn encode_type(&self, node: &mut Node, binding: &FieldBinding, value: &Type) {
        let iri = match binding.kind {
            FieldKind::Type {
                expected: Some(expected),
            } => self.resolve_key(expected),
            _ => value.iri.clone(),
        };
        if !iri.is_empty() {
            node.props.add(RDF_TYPE, Value::Uri(iri));
        }
    }

    pub fn encode_field<T>(&self, node: &mut Node, binding: &FieldBinding, value: &T) -> LDResult<()>
    where
        T: ToValue + ?Sized,
    {
        let Some(key) = binding.key() else {
            return Ok(());
        };
        let key = self.resolve_key(key);
        if let Some(value) = value.to_value(self).map_err(|e| at_key(e, &key))? {
            node.props.add(key, value);
        }
        Ok(())
    }

    pub fn encode_all<T: ToValue>(&self, node: &mut Node, binding: &FieldBinding, values: &[T]) -> LDResult<()> {
        for value in values {
            self.encode_field(node, binding, value)?;
        }
        Ok(())
    }

    /// Merge an embedded record's node into the enclosing one.
    pub fn encode_flatten(&self, node: &mut Node, inner: Node) {
        if !inner.id.is_empty() {
            node.id = inner.id;
        }
        node.props.merge(inner.props);
    }

    // === Records as values ===

    /// Bind a nested record from a node value.
    pub fn record_from_value<T: LinkedData>(&self, value: &Value) -> LDResult<T> {
        match value {
            Value::Node(node) => T::from_node(node, self),
            other => Err(mismatch("node", other)),
        }
    }

    pub fn record_to_value<T: LinkedData>(&self, record: &T) -> LDResult<Option<Value>> {
        Ok(Some(Value::Node(record.to_node(self)?)))
    }
}

// === Generic model ===

impl LinkedData for Node {
    const FIELDS: &'static [FieldBinding] = &[];

    fn from_node(node: &Node, _: &Binder<'_>) -> LDResult<Self> {
        Ok(node.clone())
    }

    fn to_node(&self, _: &Binder<'_>) -> LDResult<Node> {
        Ok(self.clone())
    }
}

impl FromValue for Node {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self> {
        binder.record_from_value(value)
    }
}

impl ToValue for Node {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::Node(self.clone())))
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _: &Binder<'_>) -> LDResult<Self> {
        Ok(value.clone())
    }
}

impl ToValue for Value {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(self.clone()))
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self> {
        Ok(NodeFormatter::new(binder.context()).format_value(value, None))
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok((!self.is_null()).then(|| Value::Json(self.clone())))
    }
}

// === Literals ===

impl FromValue for String {
    fn from_value(value: &Value, _: &Binder<'_>) -> LDResult<Self> {
        match value {
            // bare identifiers under an `@id` term
            Value::Node(node) if node.is_reference() => Ok(node.id.clone()),
            _ => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| mismatch("string", value)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::String(self.clone())))
    }
}

impl ToValue for str {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::String(self.to_string())))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, _: &Binder<'_>) -> LDResult<Self> {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::Json(serde_json::Value::Bool(b)) => Ok(*b),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::Boolean(*self)))
    }
}

macro_rules! integer_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value, _: &Binder<'_>) -> LDResult<Self> {
                    let wide = match value {
                        Value::Integer(i) => Some(*i),
                        Value::Json(serde_json::Value::Number(n)) => n.as_i64(),
                        _ => None,
                    };
                    wide.and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| mismatch(stringify!($ty), value))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
                    let wide = i64::try_from(*self).map_err(|_| LDError::TypeMismatch {
                        key: String::new(),
                        expected: "integer".to_string(),
                        found: self.to_string(),
                    })?;
                    Ok(Some(Value::Integer(wide)))
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl FromValue for f64 {
    fn from_value(value: &Value, _: &Binder<'_>) -> LDResult<Self> {
        match value {
            Value::Double(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            Value::Json(serde_json::Value::Number(n)) => n.as_f64().ok_or_else(|| mismatch("f64", value)),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::Double(*self)))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self> {
        f64::from_value(value, binder).map(|f| f as f32)
    }
}

impl ToValue for f32 {
    fn to_value(&self, _: &Binder<'_>) -> LDResult<Option<Value>> {
        Ok(Some(Value::Double(f64::from(*self))))
    }
}

// === Wrappers ===

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self> {
        T::from_value(value, binder).map(Some)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self, binder: &Binder<'_>) -> LDResult<Option<Value>> {
        match self {
            Some(value) => value.to_value(binder),
            None => Ok(None),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value, binder: &Binder<'_>) -> LDResult<Self> {
        T::from_value(value, binder).map(Box::new)
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self, binder: &Binder<'_>) -> LDResult<Option<Value>> {
        (**self).to_value(binder)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self, binder: &Binder<'_>) -> LDResult<Option<Value>> {
        (**self).to_value(binder)
    }
}
