// ABOUTME: Value types representing Asterisk's dynamically-tagged runtime values

use crate::error::AsteriskError;
use crate::tree::Node;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A hashable primitive usable as a mapping key. Floats are deliberately
/// excluded: IEEE 754 equality/hashing is not well-behaved enough to make a
/// trustworthy map key, so a float key is reported the same way an
/// unhashable key would be in the source language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Int(i64),
    Bool(bool),
    Str(Rc<str>),
}

impl MapKey {
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int(n) => write!(f, "{n}"),
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A user-defined function: parameter names and a shared body node. No
/// captured environment — per spec, Asterisk functions have no lexical
/// closures, only the arguments bound when called.
#[derive(Debug)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Node>,
}

pub type HostFn = fn(&[Value]) -> Result<Value, AsteriskError>;

#[derive(Clone)]
pub enum Callable {
    Host { name: &'static str, func: HostFn },
    User(Rc<UserFunction>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Host { name, .. } => write!(f, "Callable::Host({name})"),
            Callable::User(func) => write!(f, "Callable::User({})", func.name),
        }
    }
}

/// A dynamically-tagged value. Containers that the source language can
/// mutate in place (`List`, `Map`) use `Rc<RefCell<_>>` so that aliases of
/// the same container observe each other's writes, the way indexed
/// assignment requires; `Tuple` and `Module` are immutable after
/// construction, so a plain `Rc` is enough.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Map(Rc<RefCell<HashMap<MapKey, Value>>>),
    Callable(Callable),
    Module(Rc<HashMap<String, Value>>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::from(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(items))
    }

    pub fn map(entries: HashMap<MapKey, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Callable(_) => "callable",
            Value::Module(_) => "module",
        }
    }

    /// The boolean projection used by `if`/`while`/`and`/`or`/`not`: numbers
    /// truthy iff nonzero, strings/lists/tuples/maps truthy iff non-empty,
    /// booleans as themselves. Callables and modules are always truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Map(entries) => !entries.borrow().is_empty(),
            Value::Callable(_) => true,
            Value::Module(_) => true,
        }
    }

    /// Converts this value into a mapping key, or a `TypeError` matching the
    /// source language's "dict key is not hashable" wording.
    pub fn as_map_key(&self) -> Result<MapKey, AsteriskError> {
        match self {
            Value::Int(n) => Ok(MapKey::Int(*n)),
            Value::Bool(b) => Ok(MapKey::Bool(*b)),
            Value::Str(s) => Ok(MapKey::Str(s.clone())),
            other => Err(AsteriskError::type_error(format!(
                "dict key is not hashable: {} value",
                other.type_name()
            ))),
        }
    }

    /// Materializes this value's iteration sequence for `for`: lists and
    /// tuples yield their elements, strings yield one-character strings per
    /// Unicode code point, and maps yield their keys.
    pub fn iter_items(&self) -> Result<Vec<Value>, AsteriskError> {
        match self {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Tuple(items) => Ok((**items).clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            Value::Map(entries) => Ok(entries.borrow().keys().map(MapKey::to_value).collect()),
            other => Err(AsteriskError::type_error(format!(
                "for target is not iterable: {}",
                other.type_name()
            ))),
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, AsteriskError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
                Some(sum) => Ok(Value::Int(sum)),
                None => Ok(Value::Float(*a as f64 + *b as f64)),
            },
            (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut merged = a.borrow().clone();
                merged.extend(b.borrow().iter().cloned());
                Ok(Value::list(merged))
            }
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => Ok(Value::Float(a + b)),
                _ => Err(AsteriskError::type_error(format!(
                    "cannot add {} and {}",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, AsteriskError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => match a.checked_sub(*b) {
                Some(diff) => Ok(Value::Int(diff)),
                None => Ok(Value::Float(*a as f64 - *b as f64)),
            },
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => Ok(Value::Float(a - b)),
                _ => Err(AsteriskError::type_error(format!(
                    "cannot subtract {} from {}",
                    other.type_name(),
                    self.type_name()
                ))),
            },
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value, AsteriskError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => match a.checked_mul(*b) {
                Some(prod) => Ok(Value::Int(prod)),
                None => Ok(Value::Float(*a as f64 * *b as f64)),
            },
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => Ok(Value::Float(a * b)),
                _ => Err(AsteriskError::type_error(format!(
                    "cannot multiply {} and {}",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }

    /// True division: always yields a float, and dividing by zero is an
    /// error regardless of operand types.
    pub fn div(&self, other: &Value) -> Result<Value, AsteriskError> {
        let (a, b) = match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(AsteriskError::type_error(format!(
                    "cannot divide {} by {}",
                    self.type_name(),
                    other.type_name()
                )))
            }
        };
        if b == 0.0 {
            return Err(AsteriskError::zero_division(format!(
                "division by zero: {a} / {b}"
            )));
        }
        Ok(Value::Float(a / b))
    }

    pub fn neg(&self) -> Result<Value, AsteriskError> {
        match self {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(AsteriskError::type_error(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        }
    }

    pub fn values_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.values_equal(y))
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.values_equal(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|v2| v.values_equal(v2)))
            }
            _ => false,
        }
    }

    pub fn compare(&self, other: &Value) -> Result<Ordering, AsteriskError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => {
                    a.partial_cmp(&b).ok_or_else(|| AsteriskError::type_error("cannot order NaN"))
                }
                _ => Err(AsteriskError::type_error(format!(
                    "cannot compare {} and {}",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Callable(Callable::Host { name, .. }) => write!(f, "<host fn {name}>"),
            Value::Callable(Callable::User(func)) => write!(f, "<fn {}>", func.name),
            Value::Module(_) => write!(f, "<module>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_overflow_promotes_to_float() {
        let sum = Value::Int(i64::MAX).add(&Value::Int(1)).unwrap();
        match sum {
            Value::Float(f) => assert!(f > 0.0),
            other => panic!("expected float promotion, got {other}"),
        }
    }

    #[test]
    fn division_is_always_true_division() {
        let result = Value::Int(6).div(&Value::Int(4)).unwrap();
        match result {
            Value::Float(f) => assert!((f - 1.5).abs() < f64::EPSILON),
            other => panic!("expected 1.5, got {other}"),
        }
    }

    #[test]
    fn division_by_zero_errors() {
        let err = Value::Int(1).div(&Value::Int(0)).unwrap_err();
        assert!(matches!(err, AsteriskError::ZeroDivisionError(_)));
    }

    #[test]
    fn truthiness_rules() {
        assert!(!Value::Int(0).truthy());
        assert!(Value::Int(1).truthy());
        assert!(!Value::string("").truthy());
        assert!(Value::string("x").truthy());
        assert!(!Value::list(vec![]).truthy());
    }

    #[test]
    fn string_plus_concatenates() {
        let result = Value::string("foo").add(&Value::string("bar")).unwrap();
        assert_eq!(result.to_string(), "foobar");
    }

    #[test]
    fn float_key_is_not_hashable() {
        let err = Value::Float(1.5).as_map_key().unwrap_err();
        assert!(matches!(err, AsteriskError::TypeError(_)));
    }
}
