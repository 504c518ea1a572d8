//! Exposing trees to foreign protocols.
//!
//! [`NodeInfo`] is a serializable snapshot of a tree for protocols that keep
//! their own tree representation. [`SourceAdapter`] lets a host hand over
//! its own sender type and raw input, mapping the sender into an
//! [`Identity`] on each call.

use std::marker::PhantomData;

use serde::Serialize;
use sommand_types::error::Result;
use sommand_types::identity::Identity;

use crate::argument::ArgumentKind;
use crate::dispatcher::{DefaultDispatcher, DispatchOutcome, Dispatcher};
use crate::node::{CommandNode, NodeKind};
use crate::registry::CommandRegistry;

/// Serializable description of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub name: String,
    /// `root`, `literal` or `argument`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub greedy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument: Option<ArgumentKind>,
    pub executable: bool,
    pub children: Vec<NodeInfo>,
}

impl NodeInfo {
    pub fn describe(node: &CommandNode) -> Self {
        let kind = match node.kind() {
            NodeKind::Root { .. } => "root",
            NodeKind::Literal => "literal",
            NodeKind::Argument { .. } => "argument",
        };
        Self {
            name: node.name().to_string(),
            kind,
            description: node.description().map(str::to_string),
            permission: node.permission().map(str::to_string),
            aliases: node.aliases().to_vec(),
            greedy: node.is_greedy(),
            argument: node.argument_descriptor().map(|a| a.kind().clone()),
            executable: node.has_executor(),
            children: node.children().iter().map(Self::describe).collect(),
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Pretty-printed JSON description of the tree under `root`.
pub fn tree_to_json(root: &CommandNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(&NodeInfo::describe(root))?)
}

/// Split raw host input into a label and tokens.
///
/// A leading `/` is dropped. When the input ends in whitespace an empty
/// final token is kept, so completion sees the start of a new word.
pub fn split_input(input: &str) -> Option<(String, Vec<String>)> {
    let body = input.trim_start();
    let body = body.strip_prefix('/').unwrap_or(body);
    let mut words = body.split_whitespace().map(str::to_string);
    let label = words.next()?;
    let mut tokens: Vec<String> = words.collect();
    if body.ends_with(char::is_whitespace) {
        tokens.push(String::new());
    }
    Some((label, tokens))
}

/// Dispatch entry points for a host source type `S`.
pub struct SourceAdapter<S, F, D = DefaultDispatcher> {
    dispatcher: D,
    map: F,
    _source: PhantomData<fn(&S)>,
}

impl<S, F, I> SourceAdapter<S, F, DefaultDispatcher>
where
    F: Fn(&S) -> I,
    I: Identity,
{
    pub fn new(map: F) -> Self {
        Self::with_dispatcher(DefaultDispatcher, map)
    }
}

impl<S, F, I, D> SourceAdapter<S, F, D>
where
    F: Fn(&S) -> I,
    I: Identity,
    D: Dispatcher,
{
    pub fn with_dispatcher(dispatcher: D, map: F) -> Self {
        Self {
            dispatcher,
            map,
            _source: PhantomData,
        }
    }

    /// The identity `source` maps to.
    pub fn identity(&self, source: &S) -> I {
        (self.map)(source)
    }

    /// Dispatch pre-split tokens against `root`.
    pub fn dispatch_tokens(
        &self,
        source: &S,
        label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> DispatchOutcome {
        let identity = self.identity(source);
        self.dispatcher.dispatch(&identity, label, tokens, root)
    }

    /// Suggestions for pre-split tokens against `root`.
    pub fn suggest_tokens(
        &self,
        source: &S,
        label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> Vec<String> {
        let identity = self.identity(source);
        self.dispatcher.suggest(&identity, label, tokens, root)
    }

    /// Dispatch raw host input, resolving the label through `registry`.
    /// Blank input is reported as an unknown, empty label.
    pub fn dispatch(&self, source: &S, input: &str, registry: &CommandRegistry) -> DispatchOutcome {
        let Some((label, mut tokens)) = split_input(input) else {
            return DispatchOutcome::UnknownCommand {
                label: String::new(),
            };
        };
        let Some(root) = registry.lookup(&label) else {
            return DispatchOutcome::UnknownCommand { label };
        };
        if tokens.last().is_some_and(String::is_empty) {
            tokens.pop();
        }
        self.dispatch_tokens(source, &label, &tokens, &root)
    }

    /// Suggestions for raw host input after its label.
    pub fn suggest(&self, source: &S, input: &str, registry: &CommandRegistry) -> Vec<String> {
        let Some((label, tokens)) = split_input(input) else {
            return Vec::new();
        };
        match registry.lookup(&label) {
            Some(root) => self.suggest_tokens(source, &label, &tokens, &root),
            None => Vec::new(),
        }
    }
}

impl<S, F, D: std::fmt::Debug> std::fmt::Debug for SourceAdapter<S, F, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("dispatcher", &self.dispatcher)
            .field("source", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}
