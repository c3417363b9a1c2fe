//! State model: schema, merge classes and the merge function
//!
//! A run's state is a JSON object. Every field is declared up front in a
//! [`StateSchema`] together with its [`MergeClass`], which decides how a
//! node's partial output (a *delta*) is folded into the existing value:
//!
//! | Class | Result for a key present in the delta |
//! |-------|---------------------------------------|
//! | [`MergeClass::Overwrite`] | the delta's value |
//! | [`MergeClass::Append`] | existing array followed by the delta's array |
//!
//! Keys absent from a delta are copied from the old state unchanged.
//! [`StateSchema::merge`] never mutates its inputs; the returned state owns
//! all of its data, so runs on different threads never share structure.
//!
//! ```rust
//! use stepflow_core::state::{MergeClass, StateSchema};
//! use serde_json::json;
//!
//! let mut schema = StateSchema::new();
//! schema.add_field("log", MergeClass::Append);
//! schema.add_field("status", MergeClass::Overwrite);
//!
//! let old = json!({"log": ["a"], "status": "running"});
//! let new = schema.merge(&old, &json!({"log": ["b"], "status": "done"})).unwrap();
//!
//! assert_eq!(new, json!({"log": ["a", "b"], "status": "done"}));
//! assert_eq!(old, json!({"log": ["a"], "status": "running"}));
//! ```
//!
//! # Error field
//!
//! Every schema has one designated error field (named `error` unless
//! changed with [`StateSchema::with_error_field`]). It is implicitly declared
//! Overwrite; the engine writes a failing node's message into it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Default name of the error field
pub const DEFAULT_ERROR_FIELD: &str = "error";

/// Errors raised while validating or merging state
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    /// State or delta is not a JSON object
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Delta names a field the schema does not declare
    #[error("Unknown state field: {0}")]
    UnknownField(String),

    /// Reducer received a value it cannot merge
    #[error("Reducer error on field '{field}': {message}")]
    ReducerError {
        /// Field being merged
        field: String,
        /// Description of the mismatch
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Trait for reducing a field's current value with an update
///
/// Implemented by the two built-in reducers selected through [`MergeClass`].
pub trait Reducer: Send + Sync {
    /// Apply `update` to `current` (which is `Null` when the field is unset)
    fn reduce(&self, current: &Value, update: &Value) -> std::result::Result<Value, String>;

    /// Get a human-readable name for this reducer
    fn name(&self) -> &str;
}

/// Overwrite reducer - replaces the current value with the update
#[derive(Debug, Clone, Copy)]
pub struct OverwriteReducer;

impl Reducer for OverwriteReducer {
    fn reduce(&self, _current: &Value, update: &Value) -> std::result::Result<Value, String> {
        Ok(update.clone())
    }

    fn name(&self) -> &str {
        "overwrite"
    }
}

/// Append reducer - concatenates the update array onto the current array
///
/// Both sides must be arrays (an unset current value counts as `[]`).
#[derive(Debug, Clone, Copy)]
pub struct AppendReducer;

impl Reducer for AppendReducer {
    fn reduce(&self, current: &Value, update: &Value) -> std::result::Result<Value, String> {
        let Value::Array(items) = update else {
            return Err(format!("append update must be an array, got {}", type_name(update)));
        };

        match current {
            Value::Null => Ok(Value::Array(items.clone())),
            Value::Array(existing) => {
                let mut result = Vec::with_capacity(existing.len() + items.len());
                result.extend(existing.iter().cloned());
                result.extend(items.iter().cloned());
                Ok(Value::Array(result))
            }
            other => Err(format!("append target must be an array, found {}", type_name(other))),
        }
    }

    fn name(&self) -> &str {
        "append"
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// How a field combines an incoming delta with its current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeClass {
    /// Last write wins
    Overwrite,
    /// Sequence concatenation, old entries first
    Append,
}

impl MergeClass {
    /// Reducer implementing this class
    pub fn reducer(self) -> &'static dyn Reducer {
        match self {
            MergeClass::Overwrite => &OverwriteReducer,
            MergeClass::Append => &AppendReducer,
        }
    }
}

/// Declaration of one state field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Merge policy
    pub class: MergeClass,
    /// Initial value for a fresh thread
    ///
    /// Append fields without an explicit default start as `[]`; Overwrite
    /// fields without one stay absent until first written.
    pub default: Option<Value>,
}

/// State schema mapping field names to their merge policy
#[derive(Debug, Clone)]
pub struct StateSchema {
    fields: HashMap<String, FieldSpec>,
    error_field: String,
}

impl Default for StateSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSchema {
    /// Create a schema declaring only the error field
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            error_field: DEFAULT_ERROR_FIELD.to_string(),
        }
    }

    /// Declare a field with no default
    pub fn add_field(&mut self, name: impl Into<String>, class: MergeClass) -> &mut Self {
        self.fields
            .insert(name.into(), FieldSpec { class, default: None });
        self
    }

    /// Declare a field with an initial value for fresh threads
    pub fn add_field_with_default(
        &mut self,
        name: impl Into<String>,
        class: MergeClass,
        default: Value,
    ) -> &mut Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                class,
                default: Some(default),
            },
        );
        self
    }

    /// Use `name` as the designated error field instead of `error`
    pub fn with_error_field(mut self, name: impl Into<String>) -> Self {
        self.error_field = name.into();
        self
    }

    /// Name of the designated error field
    pub fn error_field(&self) -> &str {
        &self.error_field
    }

    /// Declaration of a field, including the implicit error field
    pub fn field(&self, name: &str) -> Option<FieldSpec> {
        match self.fields.get(name) {
            Some(spec) => Some(spec.clone()),
            None if name == self.error_field => Some(FieldSpec {
                class: MergeClass::Overwrite,
                default: None,
            }),
            None => None,
        }
    }

    /// Merge class of a field, `None` if undeclared
    pub fn class_of(&self, name: &str) -> Option<MergeClass> {
        self.field(name).map(|spec| spec.class)
    }

    /// Sorted names of all declared fields, including the error field
    pub fn fields(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.keys().cloned().collect();
        if !self.fields.contains_key(&self.error_field) {
            names.push(self.error_field.clone());
        }
        names.sort();
        names
    }

    /// Initial state of a thread with no checkpoint
    pub fn defaults(&self) -> Value {
        let mut state = Map::new();
        for (name, spec) in &self.fields {
            match (&spec.default, spec.class) {
                (Some(default), _) => {
                    state.insert(name.clone(), default.clone());
                }
                (None, MergeClass::Append) => {
                    state.insert(name.clone(), Value::Array(Vec::new()));
                }
                (None, MergeClass::Overwrite) => {}
            }
        }
        Value::Object(state)
    }

    /// Check the schema itself; returns a description of the first problem
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.error_field.is_empty() {
            return Err("error field name must not be empty".to_string());
        }
        if self.class_of(&self.error_field) == Some(MergeClass::Append) {
            return Err(format!(
                "error field '{}' must use the overwrite merge class",
                self.error_field
            ));
        }
        for (name, spec) in &self.fields {
            if spec.class == MergeClass::Append {
                if let Some(default) = &spec.default {
                    if !default.is_array() {
                        return Err(format!("default of append field '{name}' must be an array"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Fold `delta` into `old`, returning a fresh state
    ///
    /// A `null` delta is treated as empty. Fails if either side is not an
    /// object, if the delta names an undeclared field, or if an Append field
    /// receives a non-array.
    pub fn merge(&self, old: &Value, delta: &Value) -> Result<Value> {
        let old = old
            .as_object()
            .ok_or_else(|| StateError::InvalidState("State must be an object".to_string()))?;

        let delta = match delta {
            Value::Null => return Ok(Value::Object(old.clone())),
            Value::Object(map) => map,
            other => {
                return Err(StateError::InvalidState(format!(
                    "Delta must be an object, got {}",
                    type_name(other)
                )))
            }
        };

        let mut result = old.clone();
        for (name, update) in delta {
            let class = self
                .class_of(name)
                .ok_or_else(|| StateError::UnknownField(name.clone()))?;

            let current = old.get(name).unwrap_or(&Value::Null);
            let merged = class
                .reducer()
                .reduce(current, update)
                .map_err(|message| StateError::ReducerError {
                    field: name.clone(),
                    message,
                })?;
            result.insert(name.clone(), merged);
        }

        Ok(Value::Object(result))
    }

    /// Delta that records `message` in the error field
    pub fn error_delta(&self, message: impl Into<String>) -> Value {
        let mut delta = Map::new();
        delta.insert(self.error_field.clone(), Value::String(message.into()));
        Value::Object(delta)
    }
}
