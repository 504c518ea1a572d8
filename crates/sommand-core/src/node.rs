//! The command tree.
//!
//! A tree is assembled once: construct a node, append it to its parent, and
//! attach executors before or after appending. Once a root is registered the
//! tree is treated as frozen; dispatch only ever reads it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use sommand_types::error::{Result, SommandError};
use sommand_types::identity::Identity;
use sommand_types::suggestion::eq_ignore_case;

use crate::argument::{ArgumentDescriptor, ErasedArgument};
use crate::context::ExecutionContext;

/// Callback run when a walk ends on its node.
pub type Executor = Arc<dyn Fn(&ExecutionContext<'_>) -> Result<()> + Send + Sync>;

/// The three node variants.
#[derive(Clone)]
pub enum NodeKind {
    /// Top of a tree, looked up by name or alias.
    Root { aliases: Vec<String> },
    /// Matched by its name, case-insensitively.
    Literal,
    /// Matched by a descriptor. A greedy argument consumes every remaining
    /// token and can have no children.
    Argument {
        argument: Arc<dyn ErasedArgument>,
        greedy: bool,
    },
}

/// A point in the command tree.
#[derive(Clone)]
pub struct CommandNode {
    name: String,
    description: Option<String>,
    permission: Option<String>,
    children: Vec<CommandNode>,
    executor: Option<Executor>,
    kind: NodeKind,
}

impl CommandNode {
    fn with_kind(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            description: None,
            permission: None,
            children: Vec::new(),
            executor: None,
            kind,
        }
    }

    /// A root node. The first alias is the primary name; the alias list
    /// keeps it as well.
    pub fn root<I, S>(aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        let Some(primary) = aliases.first() else {
            return Err(SommandError::Config(
                "root command needs at least one alias".to_string(),
            ));
        };
        for alias in &aliases {
            check_word(alias, "alias")?;
        }
        let primary = primary.clone();
        Ok(Self::with_kind(primary, NodeKind::Root { aliases }))
    }

    /// A literal node matched by `name`.
    pub fn literal(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_word(&name, "literal name")?;
        Ok(Self::with_kind(name, NodeKind::Literal))
    }

    /// An argument node consuming one token.
    pub fn argument<T: Any + Send + Sync>(descriptor: ArgumentDescriptor<T>) -> Self {
        Self::erased_argument(Arc::new(descriptor), false)
    }

    /// An argument node consuming the rest of the line, joined by spaces.
    pub fn greedy_argument<T: Any + Send + Sync>(descriptor: ArgumentDescriptor<T>) -> Self {
        Self::erased_argument(Arc::new(descriptor), true)
    }

    /// An argument node over an already-erased descriptor.
    pub fn erased_argument(argument: Arc<dyn ErasedArgument>, greedy: bool) -> Self {
        let name = argument.name().to_string();
        Self::with_kind(name, NodeKind::Argument { argument, greedy })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Require `permission` to enter this node. A blank permission means none.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        self.permission = (!permission.trim().is_empty()).then_some(permission);
        self
    }

    /// Attach an executor, returning `self` for chaining.
    pub fn executes<F>(mut self, executor: F) -> Self
    where
        F: Fn(&ExecutionContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.set_executor(executor);
        self
    }

    pub fn set_executor<F>(&mut self, executor: F)
    where
        F: Fn(&ExecutionContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(executor));
    }

    /// Append `child`, returning `self` for chaining.
    pub fn then(mut self, child: CommandNode) -> Result<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Append `child` after the existing children.
    ///
    /// Rejected when this node is a greedy argument (its children could never
    /// be reached), when `child` is a root, or when the child's name clashes
    /// with a sibling of the same kind.
    pub fn add_child(&mut self, child: CommandNode) -> Result<()> {
        if self.is_greedy() {
            return Err(SommandError::Config(format!(
                "greedy argument '{}' cannot have children (tried to add '{}')",
                self.name, child.name
            )));
        }
        match child.kind {
            NodeKind::Root { .. } => {
                return Err(SommandError::Config(format!(
                    "root '{}' cannot be a child of '{}'",
                    child.name, self.name
                )));
            },
            NodeKind::Literal => {
                if self
                    .literal_children()
                    .any(|c| eq_ignore_case(&c.name, &child.name))
                {
                    return Err(SommandError::Config(format!(
                        "duplicate literal '{}' under '{}'",
                        child.name, self.name
                    )));
                }
            },
            NodeKind::Argument { .. } => {
                if self.argument_children().any(|c| c.name == child.name) {
                    return Err(SommandError::Config(format!(
                        "duplicate argument '{}' under '{}'",
                        child.name, self.name
                    )));
                }
            },
        }
        self.children.push(child);
        Ok(())
    }

    /// Detach and return the first child called `name`.
    pub fn remove_child(&mut self, name: &str) -> Option<CommandNode> {
        let idx = self
            .children
            .iter()
            .position(|c| c.matches_name(name))?;
        Some(self.children.remove(idx))
    }

    /// Mutable access to a child during assembly, e.g. to attach an executor.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        self.children.iter_mut().find(|c| c.matches_name(name))
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.matches_name(name))
    }

    fn matches_name(&self, name: &str) -> bool {
        match self.kind {
            NodeKind::Literal | NodeKind::Root { .. } => eq_ignore_case(&self.name, name),
            NodeKind::Argument { .. } => self.name == name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn literal_children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.iter().filter(|c| c.is_literal())
    }

    pub fn argument_children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.iter().filter(|c| c.is_argument())
    }

    pub fn executor(&self) -> Option<&Executor> {
        self.executor.as_ref()
    }

    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Aliases of a root node (including the primary name); empty otherwise.
    pub fn aliases(&self) -> &[String] {
        match &self.kind {
            NodeKind::Root { aliases } => aliases,
            _ => &[],
        }
    }

    /// The descriptor of an argument node.
    pub fn argument_descriptor(&self) -> Option<&dyn ErasedArgument> {
        match &self.kind {
            NodeKind::Argument { argument, .. } => Some(argument.as_ref()),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal)
    }

    pub fn is_argument(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { .. })
    }

    pub fn is_greedy(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { greedy: true, .. })
    }

    /// Whether `identity` may enter this node.
    pub fn permits(&self, identity: &dyn Identity) -> bool {
        self.permission
            .as_deref()
            .is_none_or(|perm| identity.has_permission(perm))
    }

    /// One-line usage for each executable path below this node, e.g.
    /// `give item <amount:integer>`.
    pub fn usage_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_usage(self.name.clone(), &mut lines);
        lines
    }

    fn collect_usage(&self, prefix: String, out: &mut Vec<String>) {
        if self.has_executor() {
            out.push(prefix.clone());
        }
        for child in &self.children {
            let segment = match &child.kind {
                NodeKind::Argument { argument, greedy } => {
                    let dots = if *greedy { "..." } else { "" };
                    format!("<{}:{}{dots}>", argument.name(), argument.kind().label())
                },
                _ => child.name.clone(),
            };
            child.collect_usage(format!("{prefix} {segment}"), out);
        }
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Root { .. } => "root",
            NodeKind::Literal => "literal",
            NodeKind::Argument { greedy: true, .. } => "greedy argument",
            NodeKind::Argument { .. } => "argument",
        };
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("permission", &self.permission)
            .field("executable", &self.has_executor())
            .field("children", &self.children)
            .finish()
    }
}

fn check_word(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SommandError::Config(format!("{what} must not be blank")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(SommandError::Config(format!(
            "{what} '{value}' must not contain whitespace"
        )));
    }
    Ok(())
}
