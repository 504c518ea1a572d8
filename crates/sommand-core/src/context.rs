//! Execution context handed to an executor on a full match.

use std::any::{Any, type_name};
use std::collections::HashMap;

use sommand_types::error::{Result, SommandError};
use sommand_types::identity::Identity;

use crate::argument::ArgValue;

/// Everything an executor knows about the invocation.
pub struct ExecutionContext<'a> {
    identity: &'a dyn Identity,
    label: &'a str,
    raw_tokens: &'a [String],
    parsed: HashMap<String, ArgValue>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        identity: &'a dyn Identity,
        label: &'a str,
        raw_tokens: &'a [String],
        parsed: HashMap<String, ArgValue>,
    ) -> Self {
        Self {
            identity,
            label,
            raw_tokens,
            parsed,
        }
    }

    /// Who issued the command.
    pub fn identity(&self) -> &'a dyn Identity {
        self.identity
    }

    /// The root alias as typed.
    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Tokens after the label, as typed.
    pub fn raw_tokens(&self) -> &'a [String] {
        self.raw_tokens
    }

    /// Borrow the value parsed for argument `name`.
    ///
    /// Fails if no argument of that name was matched on this path, or if the
    /// stored value is not a `T`.
    pub fn get_ref<T: Any>(&self, name: &str) -> Result<&T> {
        let value = self.parsed.get(name).ok_or_else(|| {
            SommandError::Argument(format!("argument '{name}' was not provided"))
        })?;
        value.downcast_ref::<T>().ok_or_else(|| {
            SommandError::Argument(format!(
                "argument '{name}' expected {} but got {}",
                type_name::<T>(),
                value.type_name()
            ))
        })
    }

    /// Clone out the value parsed for argument `name`.
    pub fn get<T: Any + Clone>(&self, name: &str) -> Result<T> {
        self.get_ref::<T>(name).cloned()
    }

    /// Like [`Self::get`], but `None` when the argument was not matched.
    /// A type mismatch is still an error.
    pub fn get_opt<T: Any + Clone>(&self, name: &str) -> Result<Option<T>> {
        if self.contains(name) {
            self.get(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parsed.contains_key(name)
    }

    /// All parsed arguments.
    pub fn all(&self) -> &HashMap<String, ArgValue> {
        &self.parsed
    }

    /// Send a message to the issuing identity.
    pub fn reply(&self, message: &str) {
        self.identity.send_message(message);
    }
}

impl std::fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("identity", &self.identity.name())
            .field("label", &self.label)
            .field("raw_tokens", &self.raw_tokens)
            .field("parsed", &self.parsed)
            .finish()
    }
}
