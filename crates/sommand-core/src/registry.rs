//! Registry of root command nodes keyed by lowercase name and alias.
//!
//! Lifecycle: populated during bootstrap, read on every incoming command,
//! cleared only for test isolation or a full reload. There is no partial
//! removal.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use sommand_types::error::{Result, SommandError};

use crate::node::CommandNode;

static GLOBAL: LazyLock<CommandRegistry> = LazyLock::new(CommandRegistry::new);

/// Thread-safe table of root nodes.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    roots: RwLock<HashMap<String, Arc<CommandNode>>>,
}

impl CommandRegistry {
    /// Create an empty, isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static CommandRegistry {
        &GLOBAL
    }

    /// Register a root node, returning the shared handle.
    pub fn add(&self, root: CommandNode) -> Result<Arc<CommandNode>> {
        let root = Arc::new(root);
        self.add_shared(Arc::clone(&root))?;
        Ok(root)
    }

    /// Register an already-shared root node.
    ///
    /// The primary name always takes its slot, replacing any previous
    /// holder. Every other alias is put-if-absent: the earliest registrant
    /// keeps a contested alias and the newcomer's claim is dropped with a
    /// warning only.
    pub fn add_shared(&self, root: Arc<CommandNode>) -> Result<()> {
        if !root.is_root() {
            return Err(SommandError::Config(format!(
                "'{}' is not a root node",
                root.name()
            )));
        }
        let mut roots = self.roots.write().unwrap_or_else(PoisonError::into_inner);
        roots.insert(root.name().to_lowercase(), Arc::clone(&root));
        for alias in root.aliases() {
            match roots.entry(alias.to_lowercase()) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(&root));
                },
                Entry::Occupied(slot) => {
                    if !Arc::ptr_eq(slot.get(), &root) {
                        log::warn!(
                            "alias '{alias}' of '{}' already belongs to '{}'; keeping the earlier registration",
                            root.name(),
                            slot.get().name()
                        );
                    }
                },
            }
        }
        log::info!(
            "registered command '{}' (aliases: {})",
            root.name(),
            root.aliases().join(", ")
        );
        Ok(())
    }

    /// Case-insensitive lookup by name or alias.
    pub fn lookup(&self, name_or_alias: &str) -> Option<Arc<CommandNode>> {
        let roots = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        roots.get(&name_or_alias.to_lowercase()).map(Arc::clone)
    }

    /// Every registered root once, sorted by primary name.
    pub fn all_distinct(&self) -> Vec<Arc<CommandNode>> {
        let roots = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        let mut distinct: Vec<Arc<CommandNode>> = Vec::new();
        for root in roots.values() {
            if !distinct.iter().any(|seen| Arc::ptr_eq(seen, root)) {
                distinct.push(Arc::clone(root));
            }
        }
        distinct.sort_by(|a, b| a.name().cmp(b.name()));
        distinct
    }

    /// Every lookup key (lowercase names and aliases), sorted.
    pub fn names(&self) -> Vec<String> {
        let roots = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = roots.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of lookup keys.
    pub fn len(&self) -> usize {
        self.roots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.roots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        log::debug!("command registry cleared");
    }
}
