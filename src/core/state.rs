/// The single mutable game-state aggregate every script operates on.
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::core::clock::GameClock;
use crate::core::config::EngineConfig;
use crate::core::resolver::ScriptError;
use crate::core::runtime::Runtime;
use crate::core::scene::Scene;
use crate::schema::entity::{ActorState, EffectInstance, ItemInstance, Player};
use crate::schema::value::Value;

pub struct GameState {
    runtime: Rc<Runtime>,
    pub clock: GameClock,
    pub scene: Scene,
    pub player: Player,
    pub actors: BTreeMap<String, ActorState>,
    pub inventory: Vec<ItemInstance>,
    pub equipped: BTreeMap<String, ItemInstance>,
    pub effects: Vec<EffectInstance>,
    pub flags: BTreeMap<String, Value>,
    present: Vec<String>,
    rng: StdRng,
}

impl GameState {
    /// A fresh session. The random source is seeded from entropy.
    pub fn new(runtime: impl Into<Rc<Runtime>>) -> Self {
        Self::with_rng(runtime.into(), StdRng::from_entropy())
    }

    /// A fresh session with a pinned random source.
    pub fn with_seed(runtime: impl Into<Rc<Runtime>>, seed: u64) -> Self {
        Self::with_rng(runtime.into(), StdRng::seed_from_u64(seed))
    }

    fn with_rng(runtime: Rc<Runtime>, rng: StdRng) -> Self {
        let actors = runtime
            .catalog
            .actors()
            .iter()
            .map(|def| {
                (
                    def.id.clone(),
                    ActorState {
                        location: def.start_location.clone(),
                        ..ActorState::default()
                    },
                )
            })
            .collect();
        let mut state = Self {
            clock: GameClock::at(runtime.config.start_seconds),
            scene: Scene::default(),
            player: runtime.player.clone(),
            actors,
            inventory: Vec::new(),
            equipped: BTreeMap::new(),
            effects: Vec::new(),
            flags: BTreeMap::new(),
            present: Vec::new(),
            rng,
            runtime,
        };
        state.refresh_presence();
        state
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// A clone of the shared runtime, for callers that need definition
    /// references while mutating the state.
    pub fn runtime_handle(&self) -> Rc<Runtime> {
        Rc::clone(&self.runtime)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.runtime.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn hour(&self) -> u32 {
        self.clock.hour()
    }

    pub fn weekday(&self) -> u32 {
        self.clock.weekday(self.runtime.config.epoch_weekday)
    }

    /// Actors at the player's location, in catalog order.
    pub fn present(&self) -> &[String] {
        &self.present
    }

    pub fn is_present(&self, actor: &str) -> bool {
        self.present.iter().any(|id| id == actor)
    }

    /// Recompute which actors share the player's location.
    pub fn refresh_presence(&mut self) {
        let here = self.player.location.clone();
        self.present = match here {
            None => Vec::new(),
            Some(here) => self
                .runtime
                .catalog
                .actors()
                .iter()
                .filter(|def| {
                    self.actors
                        .get(&def.id)
                        .and_then(|a| a.location.as_deref())
                        == Some(here.as_str())
                })
                .map(|def| def.id.clone())
                .collect(),
        };
    }

    /// Whether an actor may interrupt the player: awake and not already
    /// facing a choice.
    pub fn is_interruptible(&self) -> bool {
        !self.player.asleep && !self.scene.has_options()
    }

    pub fn move_player(&mut self, location: &str) -> Result<(), ScriptError> {
        if self.runtime.catalog.location(location).is_none() {
            return Err(ScriptError::UnknownDefinition {
                kind: "location",
                id: location.to_string(),
            });
        }
        debug!("player moves to {}", location);
        self.player.location = Some(location.to_string());
        self.refresh_presence();
        Ok(())
    }

    /// Display name for a speaker: an actor id maps to the actor's name,
    /// anything else is used verbatim.
    pub fn speaker_name(&self, speaker: &str) -> String {
        self.runtime
            .catalog
            .actor(speaker)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| speaker.to_string())
    }

    pub fn set_flag(&mut self, key: &str, value: impl Into<Value>) {
        self.flags.insert(key.to_string(), value.into());
    }

    pub fn flag(&self, key: &str) -> Option<&Value> {
        self.flags.get(key)
    }

    /// Run the stat-modifier recombination collaborator, if any.
    pub fn recalculate(&mut self) -> Result<(), ScriptError> {
        match self.runtime.hooks.recalculate.clone() {
            Some(hook) => hook(self),
            None => Ok(()),
        }
    }

    /// Select an option of the current frame: the frame is cleared and the
    /// option's instruction runs to build the next one.
    pub fn choose(&mut self, index: usize) -> Result<(), ScriptError> {
        let instruction = self
            .scene
            .options()
            .get(index)
            .map(|option| option.instruction.clone())
            .ok_or(ScriptError::NoSuchOption(index))?;
        self.scene.clear();
        self.run_instruction(&instruction)?;
        Ok(())
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("clock", &self.clock)
            .field("scene", &self.scene)
            .field("player", &self.player)
            .field("actors", &self.actors)
            .field("present", &self.present)
            .finish_non_exhaustive()
    }
}
