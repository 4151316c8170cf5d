/// Parameter validation helpers used by script bodies.
use crate::core::resolver::ScriptError;
use crate::schema::instruction::Instruction;
use crate::schema::value::{Params, Value};

fn missing(script: &str, key: &str) -> ScriptError {
    ScriptError::MissingParam {
        script: script.to_string(),
        key: key.to_string(),
    }
}

fn invalid(script: &str, key: &str, expected: &'static str) -> ScriptError {
    ScriptError::InvalidParam {
        script: script.to_string(),
        key: key.to_string(),
        expected,
    }
}

impl Params {
    pub fn require(&self, script: &str, key: &str) -> Result<&Value, ScriptError> {
        self.get(key).ok_or_else(|| missing(script, key))
    }

    pub fn require_str(&self, script: &str, key: &str) -> Result<&str, ScriptError> {
        self.require(script, key)?
            .as_str()
            .ok_or_else(|| invalid(script, key, "a string"))
    }

    pub fn opt_str(&self, script: &str, key: &str) -> Result<Option<&str>, ScriptError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| invalid(script, key, "a string")),
        }
    }

    pub fn require_i64(&self, script: &str, key: &str) -> Result<i64, ScriptError> {
        self.require(script, key)?
            .as_i64()
            .ok_or_else(|| invalid(script, key, "an integer"))
    }

    pub fn require_f64(&self, script: &str, key: &str) -> Result<f64, ScriptError> {
        self.require(script, key)?
            .as_f64()
            .ok_or_else(|| invalid(script, key, "a number"))
    }

    pub fn opt_bool(&self, script: &str, key: &str) -> Result<Option<bool>, ScriptError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| invalid(script, key, "a boolean")),
        }
    }

    pub fn require_instruction(
        &self,
        script: &str,
        key: &str,
    ) -> Result<&Instruction, ScriptError> {
        self.require(script, key)?
            .as_instruction()
            .ok_or_else(|| invalid(script, key, "an instruction"))
    }

    pub fn opt_instruction(
        &self,
        script: &str,
        key: &str,
    ) -> Result<Option<&Instruction>, ScriptError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_instruction()
                .map(Some)
                .ok_or_else(|| invalid(script, key, "an instruction")),
        }
    }

    /// A list of instructions. A single instruction is accepted as a list of one.
    pub fn require_instructions(
        &self,
        script: &str,
        key: &str,
    ) -> Result<Vec<Instruction>, ScriptError> {
        match self.require(script, key)? {
            Value::Instruction(instruction) => Ok(vec![(**instruction).clone()]),
            Value::List(items) => items
                .iter()
                .map(|item| {
                    item.as_instruction()
                        .cloned()
                        .ok_or_else(|| invalid(script, key, "a list of instructions"))
                })
                .collect(),
            _ => Err(invalid(script, key, "a list of instructions")),
        }
    }
}
