use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::value::Params;

/// Pronoun set for the player or an actor, used by the `pc` and `actor`
/// accessors (`{actor(mara):they}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Pronouns {
    /// she/her/her/herself
    SheHer,
    /// he/him/his/himself
    HeHim,
    /// they/them/their/themselves
    #[default]
    TheyThem,
    /// it/its/its/itself
    ItIts,
}

impl Pronouns {
    /// Nominative/subject form: "she", "he", "they", "it".
    pub fn subject(&self) -> &'static str {
        match self {
            Self::SheHer => "she",
            Self::HeHim => "he",
            Self::TheyThem => "they",
            Self::ItIts => "it",
        }
    }

    /// Accusative/object form: "her", "him", "them", "it".
    pub fn object(&self) -> &'static str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "him",
            Self::TheyThem => "them",
            Self::ItIts => "it",
        }
    }

    /// Possessive determiner: "her", "his", "their", "its".
    pub fn possessive(&self) -> &'static str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "his",
            Self::TheyThem => "their",
            Self::ItIts => "its",
        }
    }

    /// Reflexive: "herself", "himself", "themselves", "itself".
    pub fn reflexive(&self) -> &'static str {
        match self {
            Self::SheHer => "herself",
            Self::HeHim => "himself",
            Self::TheyThem => "themselves",
            Self::ItIts => "itself",
        }
    }

    /// Looks up a form by the keyword used in templates.
    pub fn form(&self, key: &str) -> Option<&'static str> {
        match key {
            "they" | "subject" => Some(self.subject()),
            "them" | "object" => Some(self.object()),
            "their" | "possessive" => Some(self.possessive()),
            "themselves" | "reflexive" => Some(self.reflexive()),
            _ => None,
        }
    }
}

/// A concrete item the player holds or wears. `fields` is free-form
/// per-instance state owned by the item's definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    pub id: String,
    #[serde(default)]
    pub fields: Params,
}

impl ItemInstance {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fields: Params::new(),
        }
    }
}

/// An active timed effect ("card"). Definitions may mark an instance
/// `expired` from their tick callback; expired instances are dropped after
/// the tick pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    pub id: String,
    #[serde(default)]
    pub fields: Params,
    #[serde(default)]
    pub expired: bool,
}

impl EffectInstance {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fields: Params::new(),
            expired: false,
        }
    }
}

/// Mutable per-actor state; static data lives in the actor's definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// `None` means the actor is absent from every location.
    pub location: Option<String>,
    #[serde(default)]
    pub stats: FxHashMap<String, f64>,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub pronouns: Pronouns,
    pub location: Option<String>,
    #[serde(default)]
    pub stats: FxHashMap<String, f64>,
    /// Suppresses passive per-tick depletion while set.
    #[serde(default)]
    pub asleep: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "You".to_string(),
            pronouns: Pronouns::default(),
            location: None,
            stats: FxHashMap::default(),
            asleep: false,
        }
    }
}

impl Player {
    pub fn stat(&self, key: &str) -> f64 {
        self.stats.get(key).copied().unwrap_or(0.0)
    }

    pub fn adjust_stat(&mut self, key: &str, delta: f64) -> f64 {
        let value = self.stats.entry(key.to_string()).or_insert(0.0);
        *value += delta;
        *value
    }
}
