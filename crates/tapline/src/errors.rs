//! Hook error types.

use thiserror::Error;

use crate::types::TapKind;

/// Errors reported by tap registration and hook dispatch.
#[derive(Debug, Error)]
pub enum HookError {
    /// Registration options were neither a name string nor an options object.
    #[error("invalid tap options: expected a name string or an options object, got {got}")]
    InvalidOptions {
        /// JSON type of the rejected value.
        got: &'static str,
    },

    /// Registration options carried no usable (non-empty string) name.
    #[error("missing name for tap on hook '{hook}'")]
    MissingName {
        /// Hook the registration was made against.
        hook: String,
    },

    /// An invocation entry point was used for a calling convention the
    /// hook's compiler does not implement.
    #[error("hook '{hook}' has no {kind} compiler: the hook flavor must implement this convention")]
    AbstractCompile {
        /// Hook the invocation was made against.
        hook: String,
        /// Calling convention that was requested.
        kind: TapKind,
    },
}

impl HookError {
    pub(crate) fn missing_name(hook: Option<&str>) -> Self {
        Self::MissingName {
            hook: display_name(hook),
        }
    }

    pub(crate) fn abstract_compile(hook: Option<&str>, kind: TapKind) -> Self {
        Self::AbstractCompile {
            hook: display_name(hook),
            kind,
        }
    }
}

fn display_name(hook: Option<&str>) -> String {
    hook.unwrap_or("<unnamed>").to_string()
}
