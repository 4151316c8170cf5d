use serde::{Deserialize, Serialize};

use super::value::{Params, Value};

/// A deferred action: the name of a registered script plus its parameters.
///
/// Instructions are plain data. The same value may be queued, cloned into a
/// menu option, saved, and replayed any number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl Instruction {
    pub fn new(name: &str, params: Params) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    /// An instruction with an empty parameter record.
    pub fn bare(name: &str) -> Self {
        Self::new(name, Params::new())
    }

    /// Builder-style parameter insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_has_no_params() {
        let i = Instruction::bare("advance");
        assert_eq!(i.name, "advance");
        assert!(i.params.is_empty());
    }

    #[test]
    fn instructions_compare_by_value() {
        let a = Instruction::bare("text").with("text", "Hello");
        let b = Instruction::new("text", Params::new().with("text", "Hello"));
        assert_eq!(a, b);
        assert_ne!(a, Instruction::bare("text"));
    }

    #[test]
    fn ron_params_default_to_empty() {
        let i: Instruction = ron::from_str("(name: \"clear\")").unwrap();
        assert_eq!(i, Instruction::bare("clear"));
    }
}
