//! Command-tree dispatch engine.
//!
//! Commands are trees of literal and argument nodes hanging off a root. The
//! registry maps root names and aliases to trees; the dispatcher walks a tree
//! with the tokens of an input line, collects typed argument values, enforces
//! per-node permissions, and runs the executor of the node it lands on. The
//! same walk produces completion candidates for partial input.

pub mod argument;
mod context;
mod dispatcher;
mod line;
pub mod mirror;
mod node;
mod registry;
mod service;

/// Argument type tag used by tree mirrors.
pub use argument::ArgumentKind;
/// A named, typed argument with parse, validate and suggest operations.
pub use argument::ArgumentDescriptor;
/// Type-erased view of an argument descriptor.
pub use argument::ErasedArgument;
/// A parsed argument value carrying its runtime type.
pub use argument::ArgValue;
/// Closed Rust enums usable with [`argument::enumeration`].
pub use argument::ArgEnum;
/// Host capability resolving entity references.
pub use argument::EntityResolver;
/// What an executor sees: identity, label, raw tokens, parsed arguments.
pub use context::ExecutionContext;
/// The standard literal-first walker.
pub use dispatcher::DefaultDispatcher;
/// Result of a dispatch.
pub use dispatcher::DispatchOutcome;
/// Dispatch and completion over a tree.
pub use dispatcher::Dispatcher;
/// Where a walk stopped.
pub use dispatcher::Resolution;
/// A tokenized input line.
pub use line::CommandLine;
/// Split an input line into tokens.
pub use line::tokenize;
/// Serializable tree snapshot for foreign protocols.
pub use mirror::NodeInfo;
/// Host source type adapter over a dispatcher.
pub use mirror::SourceAdapter;
/// A point in the command tree.
pub use node::CommandNode;
/// Executor callback type.
pub use node::Executor;
/// Root, literal or argument.
pub use node::NodeKind;
/// Thread-safe table of root nodes.
pub use registry::CommandRegistry;
/// Line-level execute, complete and help over a registry.
pub use service::CommandService;
