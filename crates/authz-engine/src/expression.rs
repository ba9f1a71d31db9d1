//! Attribute-path expressions.
//!
//! An expression is either the bare root `user` / `resource`, or a root
//! followed by `::`-separated attribute names (`user::manager::name`).
//! Anything that does not match that shape is a literal and passes through
//! unchanged; `user::`, `user:::x` and `user::id=` are all literals.

use crate::cache::EvaluationCache;
use crate::value::{Attributes, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Root naming the principal.
pub const USER: &str = "user";

/// Root naming the resource.
pub const RESOURCE: &str = "resource";

/// Separator between path segments.
pub const SEPARATOR: &str = "::";

// Word characters are ASCII only.
static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:user|resource)$|^[A-Za-z0-9_]+::[A-Za-z0-9_]+(?:::[A-Za-z0-9_]+)*$")
        .expect("expression pattern compiles")
});

/// Errors raised while resolving an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("Expected '{0}' to be 'resource' or 'user'")]
    InvalidRoot(String),

    #[error("'{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },

    #[error("Cannot read attribute '{attribute}' of a {kind} value")]
    NotTraversable { attribute: String, kind: &'static str },

    #[error("Unsupported literal {0}: only scalars and lists may be compared")]
    UnsupportedLiteral(String),
}

/// Returns true if `candidate` has the shape of an expression. The root is
/// not checked here; `group::id` is an expression that fails to resolve.
pub fn is_expression(candidate: &str) -> bool {
    EXPRESSION.is_match(candidate)
}

/// Resolves an operand into a flat sequence of values.
///
/// Arrays are resolved element by element and flattened one level; `null`
/// resolves to nothing. String elements shaped like expressions are looked
/// up on the principal or resource through `cache`, everything else is
/// taken literally.
pub fn resolve<'a>(
    operand: &serde_json::Value,
    principal: &'a dyn Attributes,
    resource: &'a dyn Attributes,
    cache: &dyn EvaluationCache<'a>,
) -> Result<Vec<Value<'a>>, ExpressionError> {
    let elements = match operand {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };

    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            serde_json::Value::String(path) if is_expression(path) => {
                values.extend(resolve_path(path, principal, resource, cache)?);
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    values.push(literal(item)?);
                }
            }
            other => values.push(literal(other)?),
        }
    }
    Ok(values)
}

/// Resolves a single expression string, consulting the cache first.
pub fn resolve_path<'a>(
    path: &str,
    principal: &'a dyn Attributes,
    resource: &'a dyn Attributes,
    cache: &dyn EvaluationCache<'a>,
) -> Result<Vec<Value<'a>>, ExpressionError> {
    let mut compute = || -> Result<Vec<Value<'a>>, ExpressionError> {
        let mut segments = path.split(SEPARATOR);
        let root = match segments.next() {
            Some(USER) => principal,
            Some(RESOURCE) => resource,
            other => return Err(ExpressionError::InvalidRoot(other.unwrap_or_default().to_string())),
        };

        let mut current = Value::Object(root);
        for attribute in segments {
            current = lookup(current, attribute)?;
        }
        Ok(current.into_sequence())
    };

    cache.fetch(path, &mut compute)
}

fn lookup<'a>(target: Value<'a>, attribute: &str) -> Result<Value<'a>, ExpressionError> {
    match target {
        Value::Object(object) => {
            object
                .attribute(attribute)
                .ok_or_else(|| ExpressionError::UnknownAttribute {
                    type_name: object.type_name().to_string(),
                    attribute: attribute.to_string(),
                })
        }
        other => Err(ExpressionError::NotTraversable {
            attribute: attribute.to_string(),
            kind: other.kind(),
        }),
    }
}

fn literal(json: &serde_json::Value) -> Result<Value<'static>, ExpressionError> {
    Value::from_json(json).ok_or_else(|| ExpressionError::UnsupportedLiteral(json.to_string()))
}
