/// Actor schedule follower: weekly time-tables mapped onto locations.
use log::debug;

use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::schedule::ScheduleEntry;

/// The location of the first entry that covers `hour` on `weekday`.
///
/// Entries are evaluated in order; overlaps are settled purely by order.
pub fn resolve_location(entries: &[ScheduleEntry], hour: u32, weekday: u32) -> Option<&str> {
    entries
        .iter()
        .filter(|entry| entry.applies_on(weekday))
        .find(|entry| entry.covers_hour(hour))
        .map(|entry| entry.location.as_str())
}

/// Where an actor should be now, given where they are.
///
/// With no matching entry, an actor standing somewhere the schedule governs
/// has ended their shift and becomes absent (`Some(None)`); an actor
/// elsewhere is left alone (`None`).
pub fn next_location(
    entries: &[ScheduleEntry],
    current: Option<&str>,
    hour: u32,
    weekday: u32,
) -> Option<Option<String>> {
    match resolve_location(entries, hour, weekday) {
        Some(location) => Some(Some(location.to_string())),
        None => {
            let governed = current
                .map(|here| entries.iter().any(|entry| entry.location == here))
                .unwrap_or(false);
            if governed {
                Some(None)
            } else {
                None
            }
        }
    }
}

impl GameState {
    /// Move one actor according to their schedule.
    ///
    /// If the move takes the actor away from the player's location and the
    /// player can be interrupted, the actor's `on_leave` hook runs first.
    pub fn follow_schedule(&mut self, actor: &str) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        let def = runtime
            .catalog
            .actor(actor)
            .ok_or_else(|| ScriptError::UnknownDefinition {
                kind: "actor",
                id: actor.to_string(),
            })?;
        if def.schedule.is_empty() {
            return Ok(());
        }

        let current = self
            .actors
            .get(actor)
            .and_then(|state| state.location.clone());
        let Some(target) = next_location(
            &def.schedule,
            current.as_deref(),
            self.hour(),
            self.weekday(),
        ) else {
            return Ok(());
        };
        if target == current {
            return Ok(());
        }

        let leaving_player = current.is_some() && current == self.player.location;
        if leaving_player && self.is_interruptible() {
            if let Some(on_leave) = &def.on_leave {
                on_leave(self, actor)?;
            }
        }

        debug!("{} moves {:?} -> {:?}", actor, current, target);
        self.actors.entry(actor.to_string()).or_default().location = target;
        Ok(())
    }

    /// One movement pass over every actor, in catalog order, then a
    /// presence refresh at the player's location.
    pub fn move_actors(&mut self) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        for def in runtime.catalog.actors() {
            self.follow_schedule(&def.id)?;
            if let Some(on_hour) = &def.on_hour {
                on_hour(self, &def.id)?;
            }
        }
        self.refresh_presence();
        Ok(())
    }
}
