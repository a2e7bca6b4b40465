//! Core types for the tap system.
//!
//! Defines calling conventions, tap records, and the registration options
//! model. Options accept either typed builders or a dynamic
//! [`serde_json::Value`] form (a bare name string, or an object with `name`,
//! `before`, and `stage` keys); unrecognized keys are preserved as opaque
//! metadata and handed through to interceptors and the hook compiler.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::HookError;

/// Calling convention a tap was registered under.
///
/// The convention determines how completion is signaled when the compiled
/// callable runs the tap: a plain return (`Sync`), a completion callback
/// (`Async`), or a future (`Promise`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapKind {
    /// Plain synchronous call.
    Sync,
    /// Callback-style asynchronous call.
    Async,
    /// Future-based call.
    Promise,
}

impl fmt::Display for TapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
            Self::Promise => write!(f, "promise"),
        }
    }
}

/// One registered callback plus its ordering constraints.
///
/// The callback is opaque to the registry: it is stored, reordered, and
/// handed to the hook compiler, but never invoked here. Records are
/// immutable once inserted; only their position in the tap sequence can
/// change as later registrations are ordered around them.
#[derive(Clone)]
pub struct Tap<F> {
    /// Identifying name. Not required to be unique.
    pub name: String,
    /// Calling convention the registering component used.
    pub kind: TapKind,
    /// The registered callback. Only the hook compiler invokes it.
    pub callback: F,
    /// Names of taps this tap must precede. Empty means unconstrained.
    pub before: Vec<String>,
    /// Ordering priority. Lower stages sort earlier. Default 0.
    pub stage: i32,
    /// Free-form metadata carried through to interceptors and the compiler.
    pub extra: Map<String, Value>,
}

impl<F> fmt::Debug for Tap<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("before", &self.before)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

/// Caller-facing registration options.
///
/// Built either with the typed constructors ([`named`](TapOptions::named),
/// [`before`](TapOptions::before), [`stage`](TapOptions::stage)) or parsed
/// from a [`serde_json::Value`] via [`from_value`](TapOptions::from_value).
/// Every field except the name is optional; absent fields can be filled in
/// by a scoped view's fixed options.
#[derive(Debug, Clone, Default)]
pub struct TapOptions {
    /// Tap name. Required by the time the tap is registered.
    pub name: Option<String>,
    /// Names of taps the new tap must precede.
    pub before: Vec<String>,
    /// Ordering priority. `None` falls back to stage 0.
    pub stage: Option<i32>,
    /// Free-form metadata preserved on the tap record.
    pub extra: Map<String, Value>,
    /// Set when the legacy `context` key was supplied.
    pub(crate) legacy_context: bool,
}

impl TapOptions {
    /// Options carrying just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Require the new tap to precede the named tap.
    #[must_use]
    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before.push(name.into());
        self
    }

    /// Set the ordering stage. Lower stages sort earlier.
    #[must_use]
    pub fn stage(mut self, stage: i32) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attach a free-form metadata entry.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.extra.insert(key.into(), value);
        self
    }

    /// Parse options from their dynamic JSON form.
    ///
    /// A string is shorthand for `{ "name": <trimmed string> }`. An object
    /// maps `name` (string), `before` (string or array of strings), `stage`
    /// (integer), and the legacy `context` marker; any other key is kept as
    /// opaque metadata. Every other JSON type is rejected.
    pub fn from_value(value: Value) -> Result<Self, HookError> {
        match value {
            Value::String(name) => Ok(Self::named(name.trim())),
            Value::Object(fields) => {
                let mut options = Self::default();
                for (key, value) in fields {
                    if key == "name" {
                        options.name = value.as_str().map(ToString::to_string);
                    } else if key == "before" {
                        options.before = parse_before(&value);
                    } else if key == "stage" {
                        options.stage = value.as_i64().and_then(|stage| i32::try_from(stage).ok());
                    } else {
                        if key == "context" {
                            options.legacy_context = true;
                        }
                        let _ = options.extra.insert(key, value);
                    }
                }
                Ok(options)
            }
            other => Err(HookError::InvalidOptions {
                got: json_type_name(&other),
            }),
        }
    }

    /// Overlay these options on top of a scoped view's fixed options.
    ///
    /// Fields present here win; absent fields inherit from `fixed`. Metadata
    /// maps merge key-wise with the caller's entries taking precedence.
    pub(crate) fn merged_over(self, fixed: &TapOptions) -> TapOptions {
        let mut extra = fixed.extra.clone();
        extra.extend(self.extra);
        TapOptions {
            name: self.name.or_else(|| fixed.name.clone()),
            before: if self.before.is_empty() {
                fixed.before.clone()
            } else {
                self.before
            },
            stage: self.stage.or(fixed.stage),
            extra,
            legacy_context: self.legacy_context || fixed.legacy_context,
        }
    }
}

/// Conversion into [`TapOptions`] accepted by the registration entry points.
///
/// Implemented for `&str`/`String` (a bare tap name, trimmed), for
/// [`TapOptions`] itself, and for [`serde_json::Value`] (the dynamic form,
/// which is the only one that can fail).
pub trait IntoTapOptions {
    /// Convert into registration options.
    fn into_tap_options(self) -> Result<TapOptions, HookError>;
}

impl IntoTapOptions for TapOptions {
    fn into_tap_options(self) -> Result<TapOptions, HookError> {
        Ok(self)
    }
}

impl IntoTapOptions for &str {
    fn into_tap_options(self) -> Result<TapOptions, HookError> {
        Ok(TapOptions::named(self.trim()))
    }
}

impl IntoTapOptions for String {
    fn into_tap_options(self) -> Result<TapOptions, HookError> {
        self.as_str().into_tap_options()
    }
}

impl IntoTapOptions for Value {
    fn into_tap_options(self) -> Result<TapOptions, HookError> {
        TapOptions::from_value(self)
    }
}

fn parse_before(value: &Value) -> Vec<String> {
    match value {
        Value::String(name) => vec![name.clone()],
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
