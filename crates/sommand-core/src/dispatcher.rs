//! Tree walking: dispatch and completion.
//!
//! The walk starts at a root with token index 0. At each node, literal
//! children are tried first (case-insensitive, declaration order), then
//! argument children (declaration order, first successful parse wins). A
//! permission failure on a matching literal, or on any argument child that
//! is tried, ends the walk immediately. There is no backtracking: once a
//! child accepts a token, a failure deeper down is a failure of the whole
//! walk.
//!
//! All walk state (index and accumulated arguments) lives on the stack of a
//! single call, so one tree can serve any number of concurrent dispatches.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use sommand_types::identity::Identity;
use sommand_types::suggestion::{eq_ignore_case, starts_with_ignore_case};

use crate::argument::ArgValue;
use crate::context::ExecutionContext;
use crate::node::CommandNode;

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An executor ran to completion.
    Executed,
    /// The tokens resolved to a node that has no executor.
    NoExecutor { node: String },
    /// No child of the current node accepted the token at `index`.
    NoMatch { index: usize, token: String },
    /// The identity lacks the permission guarding `node`.
    PermissionDenied { node: String, permission: String },
    /// The executor returned an error or panicked.
    ExecutionFailed { message: String },
    /// The label names no registered root.
    UnknownCommand { label: String },
    /// The raw input line could not be tokenized.
    InvalidInput { reason: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Executed)
    }

    /// Whether the tokens failed to resolve to an executable node.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::NoExecutor { .. } | Self::NoMatch { .. })
    }
}

/// A dispatch strategy over a command tree.
pub trait Dispatcher: Send + Sync {
    /// Walk `root` with `tokens` and run the resolved executor.
    fn dispatch(
        &self,
        identity: &dyn Identity,
        label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> DispatchOutcome;

    /// Completion candidates for the last token, treated as a prefix.
    fn suggest(
        &self,
        identity: &dyn Identity,
        label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> Vec<String>;
}

/// The standard literal-first, non-backtracking walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDispatcher;

/// Where a walk stopped.
#[derive(Debug)]
pub enum Resolution<'n> {
    /// Every token was consumed; the walk ended on this node.
    Reached(&'n CommandNode),
    Denied { node: &'n CommandNode, permission: String },
    NoMatch { index: usize },
}

impl DefaultDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Walk `root` over every token in `tokens`, collecting parsed arguments
    /// into `parsed`.
    pub fn resolve<'n>(
        &self,
        identity: &dyn Identity,
        tokens: &[String],
        root: &'n CommandNode,
        parsed: &mut HashMap<String, ArgValue>,
    ) -> Resolution<'n> {
        if let Some(denied) = deny(root, identity) {
            return denied;
        }
        let mut node = root;
        let mut index = 0;

        'walk: while index < tokens.len() {
            let token = &tokens[index];

            if let Some(literal) = node
                .literal_children()
                .find(|c| eq_ignore_case(c.name(), token))
            {
                if let Some(denied) = deny(literal, identity) {
                    return denied;
                }
                log::debug!("token {index} '{token}' matched literal '{}'", literal.name());
                node = literal;
                index += 1;
                continue;
            }

            for child in node.argument_children() {
                if let Some(denied) = deny(child, identity) {
                    return denied;
                }
                let Some(argument) = child.argument_descriptor() else {
                    continue;
                };
                let (input, consumed) = if child.is_greedy() {
                    (tokens[index..].join(" "), tokens.len() - index)
                } else {
                    (token.clone(), 1)
                };
                match argument.parse_value(&input) {
                    Some(value) => {
                        log::debug!("token {index} '{input}' accepted by argument '{}'", child.name());
                        parsed.insert(child.name().to_string(), value);
                        node = child;
                        index += consumed;
                        continue 'walk;
                    },
                    None => {
                        log::debug!("token {index} '{input}' rejected by argument '{}'", child.name());
                    },
                }
            }

            return Resolution::NoMatch { index };
        }

        Resolution::Reached(node)
    }

    /// Visible completion candidates among `node`'s children for `prefix`,
    /// deduplicated and sorted case-insensitively.
    pub fn candidates(
        &self,
        identity: &dyn Identity,
        node: &CommandNode,
        prefix: &str,
    ) -> Vec<String> {
        let mut out: Vec<String> = node
            .literal_children()
            .filter(|c| c.permits(identity) && starts_with_ignore_case(c.name(), prefix))
            .map(|c| c.name().to_string())
            .collect();

        for child in node.argument_children().filter(|c| c.permits(identity)) {
            if let Some(argument) = child.argument_descriptor() {
                out.extend(
                    argument
                        .suggest(prefix, identity)
                        .into_iter()
                        .map(|s| s.value)
                        .filter(|v| starts_with_ignore_case(v, prefix)),
                );
            }
        }

        let mut seen = HashSet::new();
        out.retain(|v| seen.insert(v.clone()));
        out.sort_by_cached_key(|v| v.to_lowercase());
        out
    }
}

fn deny<'n>(node: &'n CommandNode, identity: &dyn Identity) -> Option<Resolution<'n>> {
    if node.permits(identity) {
        return None;
    }
    let permission = node.permission().unwrap_or_default().to_string();
    log::debug!(
        "'{}' lacks permission '{permission}' for '{}'",
        identity.name(),
        node.name()
    );
    Some(Resolution::Denied { node, permission })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "executor panicked".to_string()
    }
}

impl Dispatcher for DefaultDispatcher {
    fn dispatch(
        &self,
        identity: &dyn Identity,
        label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> DispatchOutcome {
        let mut parsed = HashMap::new();
        let node = match self.resolve(identity, tokens, root, &mut parsed) {
            Resolution::Reached(node) => node,
            Resolution::Denied { node, permission } => {
                return DispatchOutcome::PermissionDenied {
                    node: node.name().to_string(),
                    permission,
                };
            },
            Resolution::NoMatch { index } => {
                return DispatchOutcome::NoMatch {
                    index,
                    token: tokens[index].clone(),
                };
            },
        };

        let Some(executor) = node.executor() else {
            return DispatchOutcome::NoExecutor {
                node: node.name().to_string(),
            };
        };

        let ctx = ExecutionContext::new(identity, label, tokens, parsed);
        match panic::catch_unwind(AssertUnwindSafe(|| executor(&ctx))) {
            Ok(Ok(())) => DispatchOutcome::Executed,
            Ok(Err(e)) => {
                log::error!("command '{label}' failed: {e}");
                DispatchOutcome::ExecutionFailed {
                    message: e.to_string(),
                }
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("command '{label}' panicked: {message}");
                DispatchOutcome::ExecutionFailed { message }
            },
        }
    }

    fn suggest(
        &self,
        identity: &dyn Identity,
        _label: &str,
        tokens: &[String],
        root: &CommandNode,
    ) -> Vec<String> {
        let (prefix, interior) = match tokens.split_last() {
            Some((last, interior)) => (last.as_str(), interior),
            None => ("", tokens),
        };
        let mut parsed = HashMap::new();
        match self.resolve(identity, interior, root, &mut parsed) {
            Resolution::Reached(node) => self.candidates(identity, node, prefix),
            Resolution::Denied { .. } | Resolution::NoMatch { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::argument;
    use sommand_types::error::SommandError;
    use sommand_types::identity::PermissionSet;
    use sommand_types::suggestion::Suggestion;

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(
        log: &Log,
        tag: &'static str,
    ) -> impl Fn(&ExecutionContext<'_>) -> sommand_types::error::Result<()> + Send + Sync + 'static
    {
        let log = Arc::clone(log);
        move |ctx: &ExecutionContext<'_>| {
            let args = ctx
                .raw_tokens()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",");
            log.lock().unwrap().push(format!("{tag}:{args}"));
            Ok(())
        }
    }

    fn give_tree(log: &Log) -> CommandNode {
        let amounts = Arc::clone(log);
        CommandNode::root(["give", "g"])
            .unwrap()
            .then(
                CommandNode::literal("item")
                    .unwrap()
                    .then(
                        CommandNode::argument(argument::integer("amount", Some(1), Some(64)).unwrap())
                            .executes(move |ctx| {
                                let amount: i64 = ctx.get("amount")?;
                                amounts.lock().unwrap().push(format!("amount={amount}"));
                                Ok(())
                            }),
                    )
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn scenario_a_give_item_amount() {
        let log: Log = Arc::default();
        let root = give_tree(&log);
        let id = PermissionSet::new("p");
        let d = DefaultDispatcher::new();

        let outcome = d.dispatch(&id, "give", &toks(&["item", "10"]), &root);
        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(log.lock().unwrap().as_slice(), ["amount=10"]);

        let outcome = d.dispatch(&id, "g", &toks(&["item", "0"]), &root);
        assert_eq!(
            outcome,
            DispatchOutcome::NoMatch {
                index: 1,
                token: "0".into()
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn scenario_b_permission_guards_whole_subtree() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["admin"])
            .unwrap()
            .then(
                CommandNode::literal("give")
                    .unwrap()
                    .with_permission("cmd.give")
                    .then(
                        CommandNode::argument(argument::integer("amount", None, None).unwrap())
                            .executes(recorder(&log, "give")),
                    )
                    .unwrap(),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "admin", &toks(&["give", "5"]), &root);
        assert_eq!(
            outcome,
            DispatchOutcome::PermissionDenied {
                node: "give".into(),
                permission: "cmd.give".into()
            }
        );
        assert!(log.lock().unwrap().is_empty());

        let allowed = PermissionSet::new("q").with("cmd.give");
        let outcome = DefaultDispatcher.dispatch(&allowed, "admin", &toks(&["give", "5"]), &root);
        assert!(outcome.is_success());
    }

    #[test]
    fn denied_root_blocks_dispatch_and_suggest() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["give"])
            .unwrap()
            .with_permission("cmd.give")
            .executes(recorder(&log, "root"))
            .then(CommandNode::literal("item").unwrap())
            .unwrap();
        let id = PermissionSet::new("p");
        assert!(matches!(
            DefaultDispatcher.dispatch(&id, "give", &[], &root),
            DispatchOutcome::PermissionDenied { .. }
        ));
        assert!(DefaultDispatcher.suggest(&id, "give", &[], &root).is_empty());
    }

    #[test]
    fn scenario_c_suggest_hides_unpermitted_literal() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("item").unwrap())
            .unwrap()
            .then(CommandNode::literal("info").unwrap().with_permission("cmd.info"))
            .unwrap();
        let id = PermissionSet::new("p");
        let out = DefaultDispatcher.suggest(&id, "r", &toks(&["it"]), &root);
        assert_eq!(out, vec!["item"]);
        let out = DefaultDispatcher.suggest(&id, "r", &toks(&["i"]), &root);
        assert_eq!(out, vec!["item"]);
    }

    #[test]
    fn literal_beats_argument() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap())
                    .executes(recorder(&log, "arg")),
            )
            .unwrap()
            .then(CommandNode::literal("5").unwrap().executes(recorder(&log, "lit")))
            .unwrap();
        let id = PermissionSet::new("p");
        for _ in 0..3 {
            assert!(DefaultDispatcher.dispatch(&id, "r", &toks(&["5"]), &root).is_success());
        }
        assert!(DefaultDispatcher.dispatch(&id, "r", &toks(&["6"]), &root).is_success());
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["lit:5", "lit:5", "lit:5", "arg:6"]
        );
    }

    #[test]
    fn denied_literal_does_not_fall_through_to_argument() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("5").unwrap().with_permission("secret"))
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap())
                    .executes(recorder(&log, "arg")),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "r", &toks(&["5"]), &root);
        assert!(matches!(outcome, DispatchOutcome::PermissionDenied { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn denied_argument_short_circuits_later_arguments() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(
                CommandNode::argument(argument::boolean("flag").unwrap())
                    .with_permission("secret")
                    .executes(recorder(&log, "flag")),
            )
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap())
                    .executes(recorder(&log, "n")),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "r", &toks(&["7"]), &root);
        assert_eq!(
            outcome,
            DispatchOutcome::PermissionDenied {
                node: "flag".into(),
                permission: "secret".into()
            }
        );
    }

    #[test]
    fn arguments_tried_in_declaration_order() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap())
                    .executes(recorder(&log, "int")),
            )
            .unwrap()
            .then(
                CommandNode::argument(argument::string("word", false).unwrap())
                    .executes(recorder(&log, "word")),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        DefaultDispatcher.dispatch(&id, "r", &toks(&["12"]), &root);
        DefaultDispatcher.dispatch(&id, "r", &toks(&["twelve"]), &root);
        assert_eq!(log.lock().unwrap().as_slice(), ["int:12", "word:twelve"]);
    }

    #[test]
    fn no_backtracking_after_first_accepting_argument() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap())
                    .then(CommandNode::literal("only").unwrap().executes(recorder(&log, "n")))
                    .unwrap(),
            )
            .unwrap()
            .then(
                CommandNode::argument(argument::string("word", false).unwrap())
                    .then(CommandNode::literal("other").unwrap().executes(recorder(&log, "w")))
                    .unwrap(),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "r", &toks(&["3", "other"]), &root);
        assert_eq!(
            outcome,
            DispatchOutcome::NoMatch {
                index: 1,
                token: "other".into()
            }
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn no_executor_is_distinct_from_no_match() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("sub").unwrap())
            .unwrap();
        let id = PermissionSet::new("p");
        assert_eq!(
            DefaultDispatcher.dispatch(&id, "r", &toks(&["sub"]), &root),
            DispatchOutcome::NoExecutor { node: "sub".into() }
        );
        assert_eq!(
            DefaultDispatcher.dispatch(&id, "r", &[], &root),
            DispatchOutcome::NoExecutor { node: "r".into() }
        );
        let miss = DefaultDispatcher.dispatch(&id, "r", &toks(&["nope"]), &root);
        assert!(miss.is_unresolved());
        assert!(matches!(miss, DispatchOutcome::NoMatch { index: 0, .. }));
    }

    #[test]
    fn literal_match_is_case_insensitive() {
        let log: Log = Arc::default();
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("Reload").unwrap().executes(recorder(&log, "reload")))
            .unwrap();
        let id = PermissionSet::new("p");
        assert!(DefaultDispatcher.dispatch(&id, "r", &toks(&["RELOAD"]), &root).is_success());
    }

    #[test]
    fn greedy_argument_joins_remaining_tokens() {
        let said: Arc<Mutex<Option<String>>> = Arc::default();
        let sink = Arc::clone(&said);
        let root = CommandNode::root(["say"])
            .unwrap()
            .then(
                CommandNode::greedy_argument(argument::greedy_string("message").unwrap()).executes(
                    move |ctx| {
                        *sink.lock().unwrap() = Some(ctx.get::<String>("message")?);
                        Ok(())
                    },
                ),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "say", &toks(&["hello", "big", "world"]), &root);
        assert!(outcome.is_success());
        assert_eq!(said.lock().unwrap().as_deref(), Some("hello big world"));
    }

    #[test]
    fn arguments_accumulate_along_path() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let root = CommandNode::root(["tp"])
            .unwrap()
            .then(
                CommandNode::argument(argument::float("x", None, None).unwrap())
                    .then(
                        CommandNode::argument(argument::float("y", None, None).unwrap()).executes(
                            move |ctx| {
                                let x: f64 = ctx.get("x")?;
                                let y: f64 = ctx.get("y")?;
                                sink.lock().unwrap().push(format!("{x},{y}"));
                                Ok(())
                            },
                        ),
                    )
                    .unwrap(),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        assert!(DefaultDispatcher.dispatch(&id, "tp", &toks(&["1.5", "-2"]), &root).is_success());
        assert_eq!(seen.lock().unwrap().as_slice(), ["1.5,-2"]);
    }

    #[test]
    fn executor_error_is_contained() {
        let root = CommandNode::root(["boom"])
            .unwrap()
            .executes(|_| Err(SommandError::Execution("kaput".into())));
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "boom", &[], &root);
        assert_eq!(
            outcome,
            DispatchOutcome::ExecutionFailed {
                message: "execution error: kaput".into()
            }
        );
        // The tree is untouched and still usable.
        assert_eq!(DefaultDispatcher.dispatch(&id, "boom", &[], &root), outcome);
    }

    #[test]
    fn executor_panic_is_contained() {
        let root = CommandNode::root(["boom"])
            .unwrap()
            .executes(|_| panic!("exploded"));
        let id = PermissionSet::new("p");
        let outcome = DefaultDispatcher.dispatch(&id, "boom", &[], &root);
        assert_eq!(
            outcome,
            DispatchOutcome::ExecutionFailed {
                message: "exploded".into()
            }
        );
    }

    #[test]
    fn wrong_type_access_fails_execution() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(
                CommandNode::argument(argument::integer("n", None, None).unwrap()).executes(|ctx| {
                    let _: bool = ctx.get("n")?;
                    Ok(())
                }),
            )
            .unwrap();
        let id = PermissionSet::new("p");
        match DefaultDispatcher.dispatch(&id, "r", &toks(&["1"]), &root) {
            DispatchOutcome::ExecutionFailed { message } => assert!(message.contains("expected bool")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn suggest_empty_tokens_lists_children() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("zeta").unwrap())
            .unwrap()
            .then(CommandNode::literal("Alpha").unwrap())
            .unwrap()
            .then(CommandNode::argument(argument::boolean("flag").unwrap()))
            .unwrap();
        let id = PermissionSet::new("p");
        let out = DefaultDispatcher.suggest(&id, "r", &[], &root);
        assert_eq!(out, vec!["Alpha", "false", "true", "zeta"]);
        let with_blank = DefaultDispatcher.suggest(&id, "r", &toks(&[""]), &root);
        assert_eq!(with_blank, out);
    }

    #[test]
    fn suggest_walks_interior_tokens() {
        let log: Log = Arc::default();
        let mut root = give_tree(&log);
        root.child_mut("item")
            .unwrap()
            .add_child(CommandNode::literal("info").unwrap())
            .unwrap();
        let id = PermissionSet::new("p");
        assert_eq!(
            DefaultDispatcher.suggest(&id, "give", &toks(&["ITEM", "i"]), &root),
            vec!["info"]
        );
        assert!(DefaultDispatcher.suggest(&id, "give", &toks(&["nope", ""]), &root).is_empty());
        assert!(
            DefaultDispatcher
                .suggest(&id, "give", &toks(&["item", "5", ""]), &root)
                .is_empty()
        );
    }

    #[test]
    fn suggest_deduplicates_literal_and_argument_values() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::literal("true").unwrap())
            .unwrap()
            .then(CommandNode::argument(argument::boolean("flag").unwrap()))
            .unwrap();
        let id = PermissionSet::new("p");
        assert_eq!(
            DefaultDispatcher.suggest(&id, "r", &toks(&["t"]), &root),
            vec!["true"]
        );
    }

    #[test]
    fn suggest_skips_unpermitted_arguments_and_candidates() {
        let root = CommandNode::root(["r"])
            .unwrap()
            .then(CommandNode::argument(argument::boolean("flag").unwrap()).with_permission("x"))
            .unwrap()
            .then(CommandNode::argument(
                argument::string("who", false)
                    .unwrap()
                    .with_suggestions(|_, _| {
                        vec![
                            Suggestion::new("alex"),
                            Suggestion::new("admin").with_permission("see.admin"),
                        ]
                    }),
            ))
            .unwrap();
        let id = PermissionSet::new("p");
        assert_eq!(DefaultDispatcher.suggest(&id, "r", &toks(&["a"]), &root), vec!["alex"]);
        let seer = PermissionSet::new("q").with("x").with("see.admin");
        assert_eq!(
            DefaultDispatcher.suggest(&seer, "r", &[], &root),
            vec!["admin", "alex", "false", "true"]
        );
    }

    #[test]
    fn concurrent_dispatch_on_shared_tree() {
        let log: Log = Arc::default();
        let root = Arc::new(give_tree(&log));
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let root = Arc::clone(&root);
                std::thread::spawn(move || {
                    let id = PermissionSet::new("t");
                    let tokens = vec!["item".to_string(), n.to_string()];
                    DefaultDispatcher.dispatch(&id, "give", &tokens, &root)
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_success());
        }
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen.len(), 8);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn dispatch_is_deterministic(tokens in proptest::collection::vec("[a-z0-9]{0,4}", 0..4)) {
                let log: Log = Arc::default();
                let root = give_tree(&log);
                let id = PermissionSet::new("p");
                let first = DefaultDispatcher.dispatch(&id, "give", &tokens, &root);
                let second = DefaultDispatcher.dispatch(&id, "give", &tokens, &root);
                prop_assert_eq!(&first, &second);
                let entries = log.lock().unwrap().clone();
                if first.is_success() {
                    prop_assert_eq!(entries.len(), 2);
                    prop_assert_eq!(&entries[0], &entries[1]);
                } else {
                    prop_assert!(entries.is_empty());
                }
            }

            #[test]
            fn suggestions_match_prefix_and_are_sorted(prefix in "[a-zA-Z]{0,3}") {
                let root = CommandNode::root(["r"])
                    .unwrap()
                    .then(CommandNode::literal("Item").unwrap())
                    .unwrap()
                    .then(CommandNode::literal("info").unwrap().with_permission("hidden"))
                    .unwrap()
                    .then(CommandNode::argument(argument::choice("c", &["alpha", "Beta", "iron"]).unwrap()))
                    .unwrap();
                let id = PermissionSet::new("p");
                let out = DefaultDispatcher.suggest(&id, "r", &[prefix.clone()], &root);
                let lower = prefix.to_lowercase();
                for v in &out {
                    prop_assert!(v.to_lowercase().starts_with(&lower));
                    prop_assert_ne!(v.as_str(), "info");
                }
                let keys: Vec<String> = out.iter().map(|v| v.to_lowercase()).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
            }
        }
    }
}
