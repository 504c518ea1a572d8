//! Argument descriptors.
//!
//! A descriptor is a named, typed unit with three independent operations:
//! `parse` (lexical, total over strings), `validate` (semantic filter on an
//! already-parsed value) and `suggest` (completion candidates for a prefix).
//! Only `parse` followed by `validate` accepts a token; suggestions are never
//! consulted while parsing.
//!
//! Descriptors are type-erased through [`ErasedArgument`] so that argument
//! nodes of different value types can live side by side in one tree.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sommand_types::error::{Result, SommandError};
use sommand_types::identity::Identity;
use sommand_types::suggestion::{self, Suggestion, eq_ignore_case};

type Parser<T> = Box<dyn Fn(&str) -> Option<T> + Send + Sync>;
type Validator<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Suggester = Box<dyn Fn(&str, &dyn Identity) -> Vec<Suggestion> + Send + Sync>;

/// Type tag describing what an argument accepts.
///
/// Tree mirrors use this to pick a matching argument type in their own
/// protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgumentKind {
    /// A single token.
    Word { allow_empty: bool },
    /// The remainder of the line.
    GreedyString,
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean,
    /// One of a closed set of names.
    Enumeration { values: Vec<String> },
    /// A host-resolved entity such as a player.
    Entity { kind: String },
    /// A user-defined descriptor.
    Custom { type_name: String },
}

impl ArgumentKind {
    /// Short label used in usage strings.
    pub fn label(&self) -> &str {
        match self {
            Self::Word { .. } => "word",
            Self::GreedyString => "text",
            Self::Integer { .. } => "integer",
            Self::Float { .. } => "number",
            Self::Boolean => "boolean",
            Self::Enumeration { .. } => "choice",
            Self::Entity { kind } => kind,
            Self::Custom { type_name } => type_name,
        }
    }
}

/// A parsed argument value with its runtime type tag.
#[derive(Clone)]
pub struct ArgValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl ArgValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Name of the stored value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.value).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A named, typed argument.
pub struct ArgumentDescriptor<T> {
    name: String,
    kind: ArgumentKind,
    parser: Parser<T>,
    validator: Validator<T>,
    suggester: Suggester,
}

impl<T: Any + Send + Sync> ArgumentDescriptor<T> {
    /// A custom descriptor that accepts whatever `parser` returns.
    ///
    /// Fails only when `name` is blank.
    pub fn new<P>(name: impl Into<String>, parser: P) -> Result<Self>
    where
        P: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SommandError::Config(
                "argument name must not be blank".to_string(),
            ));
        }
        let short = type_name::<T>().rsplit("::").next().unwrap_or("value");
        Ok(Self {
            name,
            kind: ArgumentKind::Custom {
                type_name: short.to_string(),
            },
            parser: Box::new(parser),
            validator: Box::new(|_| true),
            suggester: Box::new(|_, _| Vec::new()),
        })
    }

    /// Replace the semantic filter applied after parsing.
    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the candidate generator.
    ///
    /// Candidates are prefix- and permission-filtered by [`Self::suggest`],
    /// so the generator may return its full candidate set.
    pub fn with_suggestions<S>(mut self, suggester: S) -> Self
    where
        S: Fn(&str, &dyn Identity) -> Vec<Suggestion> + Send + Sync + 'static,
    {
        self.suggester = Box::new(suggester);
        self
    }

    pub fn with_kind(mut self, kind: ArgumentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    /// Lexical parse. Never panics; malformed input yields `None`.
    pub fn parse(&self, token: &str) -> Option<T> {
        (self.parser)(token)
    }

    /// Semantic acceptance of an already-parsed value.
    pub fn validate(&self, value: &T) -> bool {
        (self.validator)(value)
    }

    /// `parse` then `validate`.
    pub fn accept(&self, token: &str) -> Option<T> {
        self.parse(token).filter(|value| self.validate(value))
    }

    /// Candidates visible to `identity` starting with `prefix`, sorted
    /// case-insensitively.
    pub fn suggest(&self, prefix: &str, identity: &dyn Identity) -> Vec<Suggestion> {
        suggestion::filter_for((self.suggester)(prefix, identity), prefix, identity)
    }
}

impl<T> fmt::Debug for ArgumentDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for ArgumentDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.name, self.kind.label())
    }
}

/// Object-safe view of an [`ArgumentDescriptor`] with its value type erased.
pub trait ErasedArgument: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> &ArgumentKind;

    /// Parse and validate `token`, boxing the accepted value.
    fn parse_value(&self, token: &str) -> Option<ArgValue>;

    fn suggest(&self, prefix: &str, identity: &dyn Identity) -> Vec<Suggestion>;
}

impl<T: Any + Send + Sync> ErasedArgument for ArgumentDescriptor<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    fn parse_value(&self, token: &str) -> Option<ArgValue> {
        self.accept(token).map(ArgValue::new)
    }

    fn suggest(&self, prefix: &str, identity: &dyn Identity) -> Vec<Suggestion> {
        ArgumentDescriptor::suggest(self, prefix, identity)
    }
}

// ---------------------------------------------------------------------------
// Standard descriptors
// ---------------------------------------------------------------------------

/// A single token, optionally rejecting the empty string.
pub fn string(name: impl Into<String>, allow_empty: bool) -> Result<ArgumentDescriptor<String>> {
    Ok(ArgumentDescriptor::new(name, move |token: &str| {
        (allow_empty || !token.is_empty()).then(|| token.to_string())
    })?
    .with_kind(ArgumentKind::Word { allow_empty }))
}

/// The remaining tokens joined by single spaces. Attach to a greedy node.
pub fn greedy_string(name: impl Into<String>) -> Result<ArgumentDescriptor<String>> {
    Ok(ArgumentDescriptor::new(name, |token: &str| Some(token.to_string()))?
        .with_kind(ArgumentKind::GreedyString))
}

/// A base-10 integer within optional inclusive bounds.
pub fn integer(
    name: impl Into<String>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<ArgumentDescriptor<i64>> {
    let name = name.into();
    if let (Some(lo), Some(hi)) = (min, max)
        && lo > hi
    {
        return Err(SommandError::Config(format!(
            "argument '{name}': min {lo} is greater than max {hi}"
        )));
    }
    Ok(ArgumentDescriptor::new(name, |token: &str| token.parse::<i64>().ok())?
        .with_validator(move |value: &i64| within(*value, min, max))
        .with_kind(ArgumentKind::Integer { min, max }))
}

/// A finite floating-point number within optional inclusive bounds.
pub fn float(
    name: impl Into<String>,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<ArgumentDescriptor<f64>> {
    let name = name.into();
    if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
        return Err(SommandError::Config(format!(
            "argument '{name}': bounds must not be NaN"
        )));
    }
    if let (Some(lo), Some(hi)) = (min, max)
        && lo > hi
    {
        return Err(SommandError::Config(format!(
            "argument '{name}': min {lo} is greater than max {hi}"
        )));
    }
    Ok(ArgumentDescriptor::new(name, |token: &str| {
        token.parse::<f64>().ok().filter(|v| v.is_finite())
    })?
    .with_validator(move |value: &f64| within(*value, min, max))
    .with_kind(ArgumentKind::Float { min, max }))
}

const TRUTHY: &[&str] = &["true", "yes", "y", "on", "1"];
const FALSY: &[&str] = &["false", "no", "n", "off", "0"];

/// `true`/`yes`/`y`/`on`/`1` or `false`/`no`/`n`/`off`/`0`, any case.
pub fn boolean(name: impl Into<String>) -> Result<ArgumentDescriptor<bool>> {
    Ok(ArgumentDescriptor::new(name, |token: &str| {
        let lower = token.to_lowercase();
        if TRUTHY.contains(&lower.as_str()) {
            Some(true)
        } else if FALSY.contains(&lower.as_str()) {
            Some(false)
        } else {
            None
        }
    })?
    .with_suggestions(|_, _| {
        Suggestion::with_tooltips(&[("true", "Boolean true"), ("false", "Boolean false")])
    })
    .with_kind(ArgumentKind::Boolean))
}

/// One of a fixed set of names, matched case-insensitively.
///
/// Accepted values are returned in their declared spelling; suggestions are
/// the lowercase names.
pub fn choice<S: AsRef<str>>(
    name: impl Into<String>,
    values: &[S],
) -> Result<ArgumentDescriptor<String>> {
    let name = name.into();
    let values: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
    if values.is_empty() {
        return Err(SommandError::Config(format!(
            "argument '{name}': choice needs at least one value"
        )));
    }
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(SommandError::Config(format!(
            "argument '{name}': choice values must not be blank"
        )));
    }
    let kind = ArgumentKind::Enumeration {
        values: values.clone(),
    };
    let lowered: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
    Ok(ArgumentDescriptor::new(name, move |token: &str| {
        values.iter().find(|v| eq_ignore_case(v, token)).cloned()
    })?
    .with_suggestions(move |_, _| Suggestion::of(&lowered))
    .with_kind(kind))
}

/// A closed Rust enum usable as a command argument.
pub trait ArgEnum: Copy + Send + Sync + 'static {
    /// Every variant, in suggestion order.
    fn variants() -> &'static [Self];

    /// The name typed by the user.
    fn name(&self) -> &'static str;
}

/// One variant of `E`, matched case-insensitively by name.
pub fn enumeration<E: ArgEnum>(name: impl Into<String>) -> Result<ArgumentDescriptor<E>> {
    let name = name.into();
    if E::variants().is_empty() {
        return Err(SommandError::Config(format!(
            "argument '{name}': enumeration has no variants"
        )));
    }
    let kind = ArgumentKind::Enumeration {
        values: E::variants().iter().map(|v| v.name().to_lowercase()).collect(),
    };
    Ok(ArgumentDescriptor::new(name, |token: &str| {
        E::variants()
            .iter()
            .copied()
            .find(|v| eq_ignore_case(v.name(), token))
    })?
    .with_suggestions(|_, _| {
        E::variants()
            .iter()
            .map(|v| Suggestion::new(v.name().to_lowercase()))
            .collect()
    })
    .with_kind(kind))
}

/// Host capability that turns tokens into entities (players, worlds, ...).
pub trait EntityResolver<E>: Send + Sync {
    /// Label for the entity type, e.g. `"player"`.
    fn kind(&self) -> &str;

    /// Look up the entity named by `token`.
    fn resolve(&self, token: &str) -> Option<E>;

    /// Every entity `identity` could name. Filtering happens downstream.
    fn candidates(&self, identity: &dyn Identity) -> Vec<Suggestion>;
}

/// An entity reference resolved by an injected host capability.
pub fn entity<E, R>(name: impl Into<String>, resolver: R) -> Result<ArgumentDescriptor<E>>
where
    E: Any + Send + Sync,
    R: EntityResolver<E> + 'static,
{
    let kind = ArgumentKind::Entity {
        kind: resolver.kind().to_string(),
    };
    let resolver = Arc::new(resolver);
    let suggester = Arc::clone(&resolver);
    Ok(
        ArgumentDescriptor::new(name, move |token: &str| resolver.resolve(token))?
            .with_suggestions(move |_, identity| suggester.candidates(identity))
            .with_kind(kind),
    )
}

fn within<N: PartialOrd + Copy>(value: N, min: Option<N>, max: Option<N>) -> bool {
    min.is_none_or(|lo| value >= lo) && max.is_none_or(|hi| value <= hi)
}
