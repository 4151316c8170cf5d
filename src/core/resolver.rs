/// Instruction resolver: runs scripts by name and resolves chained
/// expressions such as `actor(mara):name` or `pc:stat(hunger)`.
use log::debug;
use std::fmt;
use thiserror::Error;

use crate::core::state::GameState;
use crate::schema::content::Inline;
use crate::schema::instruction::Instruction;
use crate::schema::value::{Params, Value};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script not found: {0}")]
    NotFound(String),
    #[error("script '{script}' is missing required parameter '{key}'")]
    MissingParam { script: String, key: String },
    #[error("script '{script}' parameter '{key}' must be {expected}")]
    InvalidParam {
        script: String,
        key: String,
        expected: &'static str,
    },
    #[error("invalid duration: {0}")]
    InvalidDuration(i64),
    #[error("cannot resolve expression: {0}")]
    Resolution(String),
    #[error("no option at index {0}")]
    NoSuchOption(usize),
    #[error("unknown {kind} definition: {id}")]
    UnknownDefinition { kind: &'static str, id: String },
    #[error("{0}")]
    Failed(String),
}

/// A chainable resolution capability returned by a script.
///
/// Accessors are built fresh on every resolution and never stored.
pub trait Accessor {
    /// Value used when no further expression follows.
    fn default_value(&self, state: &mut GameState) -> Result<Output, ScriptError>;

    /// Consume the rest of an expression, which starts with `:` or `(`.
    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError>;
}

/// Whatever a script returns.
pub enum Output {
    Unit,
    Value(Value),
    Inline(Inline),
    Accessor(Box<dyn Accessor>),
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Value(Value::String(text.into()))
    }

    pub fn bool(b: bool) -> Self {
        Self::Value(Value::Bool(b))
    }

    pub fn number(n: f64) -> Self {
        Self::Value(Value::Float(n))
    }

    pub fn styled(text: impl Into<String>, color: &str) -> Self {
        Self::Inline(Inline::Styled {
            text: text.into(),
            color: color.to_string(),
        })
    }

    pub fn accessor(accessor: impl Accessor + 'static) -> Self {
        Self::Accessor(Box::new(accessor))
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor(_))
    }

    /// Converts a settled output to inline display content. Accessors have
    /// no display form.
    pub fn into_inline(self) -> Result<Inline, ScriptError> {
        match self {
            Self::Unit => Ok(Inline::Text(String::new())),
            Self::Value(value) => Ok(Inline::Text(value.display())),
            Self::Inline(inline) => Ok(inline),
            Self::Accessor(_) => Err(ScriptError::Resolution(
                "expression resolved to an unsettled accessor".to_string(),
            )),
        }
    }

    pub fn is_truthy(&self) -> Result<bool, ScriptError> {
        match self {
            Self::Unit => Ok(false),
            Self::Value(value) => Ok(value.is_truthy()),
            Self::Inline(inline) => Ok(!inline.text().is_empty()),
            Self::Accessor(_) => Err(ScriptError::Resolution(
                "cannot test an unsettled accessor".to_string(),
            )),
        }
    }

    /// Plain-text rendering, mostly for tests and tools.
    pub fn display(&self) -> String {
        match self {
            Self::Unit => String::new(),
            Self::Value(value) => value.display(),
            Self::Inline(inline) => inline.text().to_string(),
            Self::Accessor(_) => "[accessor]".to_string(),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "Unit"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Inline(inline) => f.debug_tuple("Inline").field(inline).finish(),
            Self::Accessor(_) => write!(f, "Accessor"),
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Split an expression into its leading bare name and the remainder, which
/// is empty or starts at the first `:` or `(`.
pub fn split_head(expr: &str) -> (&str, &str) {
    match expr.find([':', '(']) {
        Some(at) => (&expr[..at], &expr[at..]),
        None => (expr, ""),
    }
}

/// Parse an optional argument list off the front of a remainder.
///
/// `(argline)tail` yields `argline` (up to the first `)`, no nesting) and
/// `tail` with one leading `:` stripped. `:tail` yields no argument.
pub fn parse_call(rest: &str) -> Result<(Option<&str>, &str), ScriptError> {
    if let Some(after_open) = rest.strip_prefix('(') {
        let close = after_open.find(')').ok_or_else(|| {
            ScriptError::Resolution(format!("unclosed argument list in '{}'", rest))
        })?;
        let arg = &after_open[..close];
        let tail = &after_open[close + 1..];
        let tail = tail.strip_prefix(':').unwrap_or(tail);
        Ok((Some(arg.trim()), tail))
    } else if let Some(tail) = rest.strip_prefix(':') {
        Ok((None, tail))
    } else if rest.is_empty() {
        Ok((None, rest))
    } else {
        Err(ScriptError::Resolution(format!(
            "expected ':' or '(' before '{}'",
            rest
        )))
    }
}

/// One `name(arg)` step of a chain plus whatever follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    pub name: &'a str,
    pub arg: Option<&'a str>,
    pub tail: &'a str,
}

/// Read the next `name(arg)` step from a chain tail such as `stat(hunger):x`.
pub fn next_step(chain: &str) -> Result<Step<'_>, ScriptError> {
    let (name, rest) = split_head(chain);
    let (arg, tail) = parse_call(rest)?;
    Ok(Step {
        name: name.trim(),
        arg,
        tail,
    })
}

impl GameState {
    /// Run a registered script. Errors raised by the script propagate as-is.
    pub fn run(&mut self, name: &str, params: &Params) -> Result<Output, ScriptError> {
        let script = self
            .runtime()
            .scripts
            .lookup(name)
            .ok_or_else(|| ScriptError::NotFound(name.to_string()))?;
        debug!("run {} ({} params)", name, params.len());
        script(self, params)
    }

    pub fn run_instruction(&mut self, instruction: &Instruction) -> Result<Output, ScriptError> {
        self.run(&instruction.name, &instruction.params)
    }

    /// Resolve an expression string: run its leading name with empty
    /// parameters, then hand any remainder to the returned accessor.
    /// Non-accessor results are final and any remainder is ignored.
    pub fn resolve(&mut self, expr: &str) -> Result<Output, ScriptError> {
        let expr = expr.trim();
        let (name, rest) = split_head(expr);
        let name = name.trim();
        if name.is_empty() {
            return Err(ScriptError::Resolution(format!(
                "no script name in '{}'",
                expr
            )));
        }
        match self.run(name, &Params::new())? {
            Output::Accessor(accessor) if rest.is_empty() => accessor.default_value(self),
            Output::Accessor(accessor) => accessor.resolve(self, rest),
            other => Ok(other),
        }
    }

    /// Resolve an expression and test its truthiness, as gates do.
    pub fn test(&mut self, expr: &str) -> Result<bool, ScriptError> {
        self.resolve(expr)?.is_truthy()
    }
}
