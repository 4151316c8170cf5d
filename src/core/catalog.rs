/// Static definitions registered by story content, and the callbacks the
/// engine invokes on them.
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::entity::{EffectInstance, ItemInstance, Pronouns};
use crate::schema::schedule::ScheduleEntry;

pub type Hook = Rc<dyn Fn(&mut GameState) -> Result<(), ScriptError>>;
/// Receives an elapsed duration (seconds for time hooks, minutes for waits).
pub type DurationHook = Rc<dyn Fn(&mut GameState, u64) -> Result<(), ScriptError>>;
pub type ItemHook = Rc<dyn Fn(&mut GameState, &mut ItemInstance) -> Result<(), ScriptError>>;
pub type EffectHook = Rc<dyn Fn(&mut GameState, &mut EffectInstance) -> Result<(), ScriptError>>;
pub type EffectTickHook =
    Rc<dyn Fn(&mut GameState, &mut EffectInstance, u64) -> Result<(), ScriptError>>;
/// Receives the actor id.
pub type ActorHook = Rc<dyn Fn(&mut GameState, &str) -> Result<(), ScriptError>>;
/// Receives the actor id and the chunk length in minutes.
pub type ActorWaitHook = Rc<dyn Fn(&mut GameState, &str, u64) -> Result<(), ScriptError>>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate {kind} definition: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

pub struct ItemDef {
    pub id: String,
    pub name: String,
    /// Equipment slot the item occupies when worn, if wearable.
    pub slot: Option<String>,
    pub on_added: Option<ItemHook>,
    pub on_worn: Option<ItemHook>,
}

impl ItemDef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slot: None,
            on_added: None,
            on_worn: None,
        }
    }

    pub fn slot(mut self, slot: &str) -> Self {
        self.slot = Some(slot.to_string());
        self
    }

    pub fn on_added<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &mut ItemInstance) -> Result<(), ScriptError> + 'static,
    {
        self.on_added = Some(Rc::new(f));
        self
    }

    pub fn on_worn<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &mut ItemInstance) -> Result<(), ScriptError> + 'static,
    {
        self.on_worn = Some(Rc::new(f));
        self
    }
}

/// A timed effect ("card") definition.
pub struct EffectDef {
    pub id: String,
    pub name: String,
    pub on_added: Option<EffectHook>,
    pub on_tick: Option<EffectTickHook>,
}

impl EffectDef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            on_added: None,
            on_tick: None,
        }
    }

    pub fn on_added<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &mut EffectInstance) -> Result<(), ScriptError> + 'static,
    {
        self.on_added = Some(Rc::new(f));
        self
    }

    pub fn on_tick<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &mut EffectInstance, u64) -> Result<(), ScriptError> + 'static,
    {
        self.on_tick = Some(Rc::new(f));
        self
    }
}

pub struct LocationDef {
    pub id: String,
    pub name: String,
    pub on_wait: Option<DurationHook>,
}

impl LocationDef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            on_wait: None,
        }
    }

    pub fn on_wait<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, u64) -> Result<(), ScriptError> + 'static,
    {
        self.on_wait = Some(Rc::new(f));
        self
    }
}

pub struct ActorDef {
    pub id: String,
    pub name: String,
    pub pronouns: Pronouns,
    pub color: String,
    pub start_location: Option<String>,
    pub schedule: Vec<ScheduleEntry>,
    /// Custom movement run on every hour boundary, after the schedule.
    pub on_hour: Option<ActorHook>,
    pub on_wait: Option<ActorWaitHook>,
    /// Runs before the actor walks away from the player's location.
    pub on_leave: Option<ActorHook>,
}

impl ActorDef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            pronouns: Pronouns::default(),
            color: "white".to_string(),
            start_location: None,
            schedule: Vec::new(),
            on_hour: None,
            on_wait: None,
            on_leave: None,
        }
    }

    pub fn pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn starts_at(mut self, location: &str) -> Self {
        self.start_location = Some(location.to_string());
        self
    }

    pub fn schedule(mut self, entries: Vec<ScheduleEntry>) -> Self {
        self.schedule = entries;
        self
    }

    pub fn on_hour<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &str) -> Result<(), ScriptError> + 'static,
    {
        self.on_hour = Some(Rc::new(f));
        self
    }

    pub fn on_wait<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &str, u64) -> Result<(), ScriptError> + 'static,
    {
        self.on_wait = Some(Rc::new(f));
        self
    }

    pub fn on_leave<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, &str) -> Result<(), ScriptError> + 'static,
    {
        self.on_leave = Some(Rc::new(f));
        self
    }
}

/// Engine-wide callbacks supplied by collaborators.
#[derive(Clone, Default)]
pub struct TickHooks {
    /// Invoked once per depletion tick boundary crossed while awake.
    pub passive_depletion: Option<Hook>,
    /// Invoked once per clock advance with the elapsed seconds.
    pub time_effects: Option<DurationHook>,
    /// Stat-modifier recombination, run after equipment or effects change.
    pub recalculate: Option<Hook>,
}

impl TickHooks {
    pub fn passive_depletion<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState) -> Result<(), ScriptError> + 'static,
    {
        self.passive_depletion = Some(Rc::new(f));
        self
    }

    pub fn time_effects<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState, u64) -> Result<(), ScriptError> + 'static,
    {
        self.time_effects = Some(Rc::new(f));
        self
    }

    pub fn recalculate<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut GameState) -> Result<(), ScriptError> + 'static,
    {
        self.recalculate = Some(Rc::new(f));
        self
    }
}

/// Definition lookups. Actors keep registration order, which is the order
/// their hooks run in.
#[derive(Default)]
pub struct Catalog {
    items: FxHashMap<String, ItemDef>,
    effects: FxHashMap<String, EffectDef>,
    locations: FxHashMap<String, LocationDef>,
    actors: Vec<ActorDef>,
    actor_index: FxHashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, def: ItemDef) -> Result<(), CatalogError> {
        if self.items.contains_key(&def.id) {
            return Err(CatalogError::Duplicate { kind: "item", id: def.id });
        }
        self.items.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn add_effect(&mut self, def: EffectDef) -> Result<(), CatalogError> {
        if self.effects.contains_key(&def.id) {
            return Err(CatalogError::Duplicate { kind: "effect", id: def.id });
        }
        self.effects.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn add_location(&mut self, def: LocationDef) -> Result<(), CatalogError> {
        if self.locations.contains_key(&def.id) {
            return Err(CatalogError::Duplicate {
                kind: "location",
                id: def.id,
            });
        }
        self.locations.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn add_actor(&mut self, def: ActorDef) -> Result<(), CatalogError> {
        if self.actor_index.contains_key(&def.id) {
            return Err(CatalogError::Duplicate { kind: "actor", id: def.id });
        }
        self.actor_index.insert(def.id.clone(), self.actors.len());
        self.actors.push(def);
        Ok(())
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn effect(&self, id: &str) -> Option<&EffectDef> {
        self.effects.get(id)
    }

    pub fn location(&self, id: &str) -> Option<&LocationDef> {
        self.locations.get(id)
    }

    pub fn actor(&self, id: &str) -> Option<&ActorDef> {
        self.actor_index.get(id).map(|&i| &self.actors[i])
    }

    pub fn actors(&self) -> &[ActorDef] {
        &self.actors
    }
}

// RON world files carry only the data half of each definition; callbacks
// are attached in code.

#[derive(Debug, Deserialize)]
struct RonItem {
    name: String,
    #[serde(default)]
    slot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RonActor {
    name: String,
    #[serde(default)]
    pronouns: Pronouns,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "World")]
struct RonWorld {
    #[serde(default)]
    locations: Vec<(String, String)>,
    #[serde(default)]
    items: Vec<(String, RonItem)>,
    #[serde(default)]
    effects: Vec<(String, String)>,
    #[serde(default)]
    actors: Vec<(String, RonActor)>,
}

impl Catalog {
    /// Load a catalog from a RON world file.
    pub fn load_from_ron(path: &Path) -> Result<Catalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog::new();
        catalog.add_ron(input)?;
        Ok(catalog)
    }

    /// Add every definition of a RON world file. Actors keep file order.
    pub fn add_ron(&mut self, input: &str) -> Result<(), CatalogError> {
        let world: RonWorld = ron::from_str(input)?;
        for (id, name) in world.locations {
            self.add_location(LocationDef::new(&id, &name))?;
        }
        for (id, item) in world.items {
            let mut def = ItemDef::new(&id, &item.name);
            def.slot = item.slot;
            self.add_item(def)?;
        }
        for (id, name) in world.effects {
            self.add_effect(EffectDef::new(&id, &name))?;
        }
        for (id, actor) in world.actors {
            let mut def = ActorDef::new(&id, &actor.name)
                .pronouns(actor.pronouns)
                .schedule(actor.schedule);
            if let Some(color) = actor.color {
                def.color = color;
            }
            def.start_location = actor.start;
            self.add_actor(def)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("items", &self.items.len())
            .field("effects", &self.effects.len())
            .field("locations", &self.locations.len())
            .field(
                "actors",
                &self.actors.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
