//! Attribute values and read-only attribute access.
//!
//! Principals and resources are never inspected reflectively. Each type
//! exposes a fixed set of named attributes through [`Attributes`], usually
//! backed by an [`AccessorRegistry`] of read-only getters, and every lookup
//! goes through `&self`.

use crate::error::{AuthzError, Result};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// Read-only attribute access for principals and resources.
pub trait Attributes: fmt::Debug {
    /// The declared type name, qualified with the configured namespace
    /// before rules are looked up.
    fn type_name(&self) -> &str;

    /// Returns the named attribute, or `None` if the type does not declare it.
    fn attribute(&self, name: &str) -> Option<Value<'_>>;
}

/// A value produced by an attribute lookup or taken literally from a rule.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value<'a>>),
    /// An object borrowed from the principal/resource graph.
    Object(&'a dyn Attributes),
}

impl<'a> Value<'a> {
    /// Wraps a borrowed object.
    pub fn object(target: &'a dyn Attributes) -> Self {
        Value::Object(target)
    }

    /// Returns the object behind this value, if it is one.
    pub fn as_object(&self) -> Option<&'a dyn Attributes> {
        match self {
            Value::Object(target) => Some(*target),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Expands the value into a sequence: lists yield their elements, null
    /// yields nothing and anything else yields itself.
    pub fn into_sequence(self) -> Vec<Value<'a>> {
        match self {
            Value::Null => Vec::new(),
            Value::List(items) => items,
            other => vec![other],
        }
    }
}

impl Value<'static> {
    /// Converts a JSON literal into a value. Returns `None` if the literal
    /// is, or contains, a JSON object.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        Some(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.clone()),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            serde_json::Value::Object(_) => return None,
        })
    }
}

// A struct and a field stored inline at offset 0 share an address, so the
// address alone does not identify an object.
fn same_object(a: &dyn Attributes, b: &dyn Attributes) -> bool {
    std::ptr::eq(
        a as *const dyn Attributes as *const (),
        b as *const dyn Attributes as *const (),
    ) && a.type_name() == b.type_name()
}

/// Scalars compare by value; objects compare by identity.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => same_object(*a, *b),
            _ => false,
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<'a, T: Into<Value<'a>>> From<Vec<T>> for Value<'a> {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A read-only getter for one attribute of `T`.
pub type Getter<T> = for<'a> fn(&'a T) -> Value<'a>;

/// Typed map from attribute name to read-only getter.
///
/// Only registered names are reachable from rule expressions, so an
/// expression can never reach anything but a declared attribute.
///
/// Name the target type when building a registry; the getters' argument
/// type is not inferred from the surrounding static.
///
/// ```
/// use authz_engine::{AccessorRegistry, Attributes, Value};
/// use once_cell::sync::Lazy;
///
/// #[derive(Debug)]
/// struct Document {
///     owner_id: i64,
/// }
///
/// static DOCUMENT: Lazy<AccessorRegistry<Document>> = Lazy::new(|| {
///     AccessorRegistry::<Document>::new("Document")
///         .with("owner_id", |d| Value::from(d.owner_id))
/// });
///
/// impl Attributes for Document {
///     fn type_name(&self) -> &str {
///         DOCUMENT.type_name()
///     }
///
///     fn attribute(&self, name: &str) -> Option<Value<'_>> {
///         DOCUMENT.get(self, name)
///     }
/// }
///
/// let document = Document { owner_id: 7 };
/// assert_eq!(document.attribute("owner_id"), Some(Value::from(7)));
/// assert!(document.attribute("title").is_none());
/// ```
pub struct AccessorRegistry<T> {
    type_name: &'static str,
    getters: BTreeMap<&'static str, Getter<T>>,
}

impl<T> AccessorRegistry<T> {
    /// Creates an empty registry for the given type name.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            getters: BTreeMap::new(),
        }
    }

    /// Registers a getter under `name`, replacing any previous one.
    pub fn with(mut self, name: &'static str, getter: Getter<T>) -> Self {
        self.getters.insert(name, getter);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Looks up `name` on `target`.
    pub fn get<'a>(&self, target: &'a T, name: &str) -> Option<Value<'a>> {
        self.getters.get(name).map(|getter| getter(target))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.getters.contains_key(name)
    }

    /// Registered attribute names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.getters.keys().copied()
    }
}

impl<T> fmt::Debug for AccessorRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("type_name", &self.type_name)
            .field("attributes", &self.getters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A dynamically shaped principal or resource, typically built from JSON.
///
/// Nested records are owned by their parent and lent out as
/// [`Value::Object`], so paths like `user::manager::name` traverse them.
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    attributes: BTreeMap<String, Field>,
}

#[derive(Debug, Clone)]
enum Field {
    Scalar(Value<'static>),
    Record(Record),
    List(Vec<Field>),
}

impl Field {
    fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => Field::Record(Record::from_map("Object", map)),
            serde_json::Value::Array(items) => {
                Field::List(items.iter().map(Field::from_json).collect())
            }
            scalar => Field::Scalar(Value::from_json(scalar).unwrap_or(Value::Null)),
        }
    }

    fn view(&self) -> Value<'_> {
        match self {
            Field::Scalar(value) => value.clone(),
            Field::Record(record) => Value::Object(record),
            Field::List(items) => Value::List(items.iter().map(Field::view).collect()),
        }
    }
}

impl Record {
    /// Creates a record with no attributes.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets a scalar or list attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value<'static>>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute to a nested record.
    pub fn with_record(mut self, name: impl Into<String>, record: Record) -> Self {
        self.attributes.insert(name.into(), Field::Record(record));
        self
    }

    /// Sets a scalar or list attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value<'static>>) {
        self.attributes
            .insert(name.into(), Field::Scalar(value.into()));
    }

    /// Returns a nested record for in-place updates.
    pub fn record_mut(&mut self, name: &str) -> Option<&mut Record> {
        match self.attributes.get_mut(name) {
            Some(Field::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// Builds a record from a JSON object.
    pub fn from_json(type_name: impl Into<String>, json: &serde_json::Value) -> Result<Self> {
        let type_name = type_name.into();
        match json {
            serde_json::Value::Object(map) => Ok(Self::from_map(type_name, map)),
            other => Err(AuthzError::ValidationError(format!(
                "Record '{}' must be a JSON object, got {}",
                type_name, other
            ))),
        }
    }

    fn from_map(
        type_name: impl Into<String>,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: map
                .iter()
                .map(|(k, v)| (k.clone(), Field::from_json(v)))
                .collect(),
        }
    }
}

impl Attributes for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        self.attributes.get(name).map(Field::view)
    }
}
