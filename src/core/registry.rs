/// Script registry: the name-keyed table every instruction is dispatched through.
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use crate::core::resolver::{Output, ScriptError};
use crate::core::state::GameState;
use crate::schema::value::Params;

/// A registered callable. Scripts receive the whole game state and their own
/// parameter record, and validate that record themselves.
pub type Script = Rc<dyn Fn(&mut GameState, &Params) -> Result<Output, ScriptError>>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("script '{0}' is already registered")]
    DuplicateName(String),
}

/// Write-once-per-name table of scripts.
///
/// There is no unregistration. A registry is populated during start-up and
/// then frozen inside a [`Runtime`](crate::core::runtime::Runtime).
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: FxHashMap<String, Script>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `script` under `name`. A name that is already present is
    /// rejected and the existing script is left untouched.
    pub fn register<F>(&mut self, name: &str, script: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut GameState, &Params) -> Result<Output, ScriptError> + 'static,
    {
        self.register_rc(name, Rc::new(script))
    }

    pub fn register_rc(&mut self, name: &str, script: Script) -> Result<(), RegistryError> {
        if self.scripts.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.scripts.insert(name.to_string(), script);
        Ok(())
    }

    /// Sequential `register` calls. Registrations made before a duplicate is
    /// hit stay in place.
    pub fn register_all<I>(&mut self, scripts: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (String, Script)>,
    {
        for (name, script) in scripts {
            self.register_rc(&name, script)?;
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Script> {
        self.scripts.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("scripts", &self.names())
            .finish()
    }
}
