//! Line-level front end over a registry and a dispatcher.
//!
//! The service owns the user-facing side of dispatch: it turns raw input
//! into a label and tokens, resolves the label, and tells the identity why a
//! command did not run.

use sommand_types::config::{MessagesConfig, SommandConfig};
use sommand_types::identity::Identity;
use sommand_types::suggestion::starts_with_ignore_case;

use crate::dispatcher::{DefaultDispatcher, DispatchOutcome, Dispatcher};
use crate::line::CommandLine;
use crate::registry::CommandRegistry;

/// Executes and completes raw input lines against a registry.
#[derive(Debug)]
pub struct CommandService<'r, D: Dispatcher = DefaultDispatcher> {
    registry: &'r CommandRegistry,
    dispatcher: D,
    messages: MessagesConfig,
    prefix: String,
}

impl<'r> CommandService<'r, DefaultDispatcher> {
    /// A service using the default walker, default messages and the `/`
    /// prefix.
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self::with_dispatcher(registry, DefaultDispatcher)
    }

    /// A service using the default walker, configured from `config`.
    pub fn from_config(registry: &'r CommandRegistry, config: &SommandConfig) -> Self {
        Self::new(registry)
            .with_messages(config.messages.clone())
            .with_prefix(config.command_prefix.clone())
    }
}

impl<'r, D: Dispatcher> CommandService<'r, D> {
    pub fn with_dispatcher(registry: &'r CommandRegistry, dispatcher: D) -> Self {
        Self {
            registry,
            dispatcher,
            messages: MessagesConfig::default(),
            prefix: "/".to_string(),
        }
    }

    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = messages;
        self
    }

    /// Prefix stripped from input lines. Empty disables stripping.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn registry(&self) -> &'r CommandRegistry {
        self.registry
    }

    pub fn messages(&self) -> &MessagesConfig {
        &self.messages
    }

    /// Run `line` as `identity`.
    ///
    /// Returns `None` for a blank line. Every other outcome except
    /// [`DispatchOutcome::Executed`] has already been reported to the
    /// identity when this returns.
    pub fn execute(&self, identity: &dyn Identity, line: &str) -> Option<DispatchOutcome> {
        let parsed = match CommandLine::parse(line, &self.prefix) {
            Ok(parsed) => parsed?,
            Err(e) => {
                let reason = e.to_string();
                identity.send_message(&reason);
                return Some(DispatchOutcome::InvalidInput { reason });
            },
        };

        let Some(root) = self.registry.lookup(&parsed.label) else {
            identity.send_message(&self.messages.unknown_command_for(&parsed.label));
            return Some(DispatchOutcome::UnknownCommand {
                label: parsed.label,
            });
        };

        log::debug!(
            "'{}' runs '{}' with {:?}",
            identity.name(),
            parsed.label,
            parsed.tokens
        );
        let outcome = self
            .dispatcher
            .dispatch(identity, &parsed.label, &parsed.tokens, &root);

        match &outcome {
            DispatchOutcome::Executed => {},
            DispatchOutcome::NoMatch { .. } | DispatchOutcome::NoExecutor { .. } => {
                identity.send_message(&self.messages.unknown_subcommand_for(root.name()));
            },
            DispatchOutcome::PermissionDenied { .. } => {
                identity.send_message(&self.messages.no_permission);
            },
            DispatchOutcome::ExecutionFailed { .. } => {
                identity.send_message(&self.messages.execution_error);
            },
            DispatchOutcome::UnknownCommand { .. } | DispatchOutcome::InvalidInput { .. } => {},
        }
        Some(outcome)
    }

    /// Completion candidates for the partially typed `line`.
    pub fn complete(&self, identity: &dyn Identity, line: &str) -> Vec<String> {
        let parsed = match CommandLine::parse(line, &self.prefix) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return self.complete_label(identity, ""),
            Err(e) => {
                log::debug!("no completions for unparsable input: {e}");
                return Vec::new();
            },
        };
        if parsed.is_completing_label() {
            return self.complete_label(identity, &parsed.label);
        }
        match self.registry.lookup(&parsed.label) {
            Some(root) => self.dispatcher.suggest(
                identity,
                &parsed.label,
                &parsed.completion_tokens(),
                &root,
            ),
            None => Vec::new(),
        }
    }

    fn complete_label(&self, identity: &dyn Identity, partial: &str) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .filter(|name| starts_with_ignore_case(name, partial))
            .filter(|name| {
                self.registry
                    .lookup(name)
                    .is_some_and(|root| root.permits(identity))
            })
            .collect()
    }

    /// One line per root `identity` may run, sorted by name.
    pub fn help_lines(&self, identity: &dyn Identity) -> Vec<String> {
        self.registry
            .all_distinct()
            .into_iter()
            .filter(|root| root.permits(identity))
            .map(|root| {
                let mut line = format!("{}{}", self.prefix, root.name());
                let others: Vec<&str> = root
                    .aliases()
                    .iter()
                    .skip(1)
                    .map(String::as_str)
                    .collect();
                if !others.is_empty() {
                    line.push_str(&format!(" ({})", others.join(", ")));
                }
                if let Some(description) = root.description() {
                    line.push_str(" - ");
                    line.push_str(description);
                }
                line
            })
            .collect()
    }
}
