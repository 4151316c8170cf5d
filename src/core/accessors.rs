/// Built-in accessors for chained expressions: `pc`, `actor(id)`, `time`,
/// `flag`, `not`, `chance(p)`, `has(item)`, `present(actor)`.
use rand::Rng;

use crate::core::clock::WEEKDAY_NAMES;
use crate::core::resolver::{next_step, parse_call, Accessor, Output, ScriptError};
use crate::core::state::GameState;
use crate::schema::entity::Pronouns;

const PLAYER_COLOR: &str = "cyan";

fn unresolved(what: &str) -> ScriptError {
    ScriptError::Resolution(what.to_string())
}

/// The argument of `name(arg)` or, failing that, the next chain segment.
fn argument<'a>(rest: &'a str, accessor: &str) -> Result<&'a str, ScriptError> {
    let (arg, tail) = parse_call(rest)?;
    let key = match arg {
        Some(arg) => arg,
        None => next_step(tail)?.name,
    };
    if key.is_empty() {
        return Err(unresolved(&format!("{} needs an argument", accessor)));
    }
    Ok(key)
}

fn pronoun(pronouns: Pronouns, key: &str) -> Option<Output> {
    pronouns.form(key).map(Output::text)
}

/// `pc`, `pc:name`, `pc:location`, `pc:they`, `pc:stat(hunger)`, `pc:hunger`.
pub struct PlayerAccessor;

impl Accessor for PlayerAccessor {
    fn default_value(&self, state: &mut GameState) -> Result<Output, ScriptError> {
        Ok(Output::styled(state.player.name.clone(), PLAYER_COLOR))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let (_, tail) = parse_call(rest)?;
        let step = next_step(tail)?;
        let player = &state.player;
        match step.name {
            "" => self.default_value(state),
            "name" => Ok(Output::text(player.name.clone())),
            "location" => Ok(Output::text(
                player.location.clone().unwrap_or_default(),
            )),
            "asleep" => Ok(Output::bool(player.asleep)),
            "stat" => {
                let key = step.arg.ok_or_else(|| unresolved("pc:stat needs (key)"))?;
                Ok(Output::number(player.stat(key)))
            }
            key => pronoun(player.pronouns, key)
                .or_else(|| player.stats.get(key).map(|v| Output::number(*v)))
                .ok_or_else(|| unresolved(&format!("pc has no '{}'", key))),
        }
    }
}

/// `actor(mara)`, `actor(mara):location`, `actor(mara):here`,
/// `actor(mara):their`, `actor(mara):stat(trust)`.
pub struct ActorAccessor;

impl Accessor for ActorAccessor {
    fn default_value(&self, _state: &mut GameState) -> Result<Output, ScriptError> {
        Err(unresolved("actor needs (id)"))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let (arg, tail) = parse_call(rest)?;
        let id = arg.ok_or_else(|| unresolved("actor needs (id)"))?;
        let runtime = state.runtime_handle();
        let def = runtime
            .catalog
            .actor(id)
            .ok_or_else(|| ScriptError::UnknownDefinition {
                kind: "actor",
                id: id.to_string(),
            })?;
        let actor = state.actors.get(id).cloned().unwrap_or_default();
        let step = next_step(tail)?;
        match step.name {
            "" => Ok(Output::styled(def.name.clone(), &def.color)),
            "name" => Ok(Output::text(def.name.clone())),
            "location" => Ok(Output::text(actor.location.unwrap_or_default())),
            "here" => Ok(Output::bool(state.is_present(id))),
            "stat" => {
                let key = step.arg.ok_or_else(|| unresolved("actor stat needs (key)"))?;
                Ok(Output::number(actor.stats.get(key).copied().unwrap_or(0.0)))
            }
            key => pronoun(def.pronouns, key)
                .ok_or_else(|| unresolved(&format!("actor has no '{}'", key))),
        }
    }
}

/// `time` → `HH:MM`; `time:hour`, `time:minute`, `time:day`,
/// `time:weekday`, `time:now`.
pub struct TimeAccessor;

impl Accessor for TimeAccessor {
    fn default_value(&self, state: &mut GameState) -> Result<Output, ScriptError> {
        Ok(Output::text(state.clock.time_of_day()))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let (_, tail) = parse_call(rest)?;
        match next_step(tail)?.name {
            "" => self.default_value(state),
            "hour" => Ok(Output::number(f64::from(state.hour()))),
            "minute" => Ok(Output::number(f64::from(state.clock.minute()))),
            "day" => Ok(Output::number(state.clock.day() as f64)),
            "weekday" => Ok(Output::text(WEEKDAY_NAMES[state.weekday() as usize])),
            "now" => Ok(Output::number(state.now() as f64)),
            other => Err(unresolved(&format!("time has no '{}'", other))),
        }
    }
}

/// `flag:met_mara` or `flag(met_mara)`. Unset flags resolve to nothing.
pub struct FlagAccessor;

impl Accessor for FlagAccessor {
    fn default_value(&self, _state: &mut GameState) -> Result<Output, ScriptError> {
        Err(unresolved("flag needs a key"))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let key = argument(rest, "flag")?;
        Ok(state
            .flag(key)
            .cloned()
            .map(Output::Value)
            .unwrap_or(Output::Unit))
    }
}

/// `not:flag:met` or `not(flag:met)`: negated truthiness of an expression.
pub struct NotAccessor;

impl Accessor for NotAccessor {
    fn default_value(&self, _state: &mut GameState) -> Result<Output, ScriptError> {
        Err(unresolved("not needs an expression"))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let (arg, tail) = parse_call(rest)?;
        let expr = arg.unwrap_or(tail);
        Ok(Output::bool(!state.test(expr)?))
    }
}

/// `chance(0.25)`: a fresh random draw each time; bare `chance` is a coin flip.
pub struct ChanceAccessor;

impl Accessor for ChanceAccessor {
    fn default_value(&self, state: &mut GameState) -> Result<Output, ScriptError> {
        Ok(Output::bool(state.rng().gen_bool(0.5)))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let raw = argument(rest, "chance")?;
        let p: f64 = raw
            .parse()
            .ok()
            .filter(|p: &f64| !p.is_nan())
            .ok_or_else(|| unresolved(&format!("chance '{}' is not a number", raw)))?;
        Ok(Output::bool(state.rng().gen_bool(p.clamp(0.0, 1.0))))
    }
}

/// `has(cloak)`: carried or worn.
pub struct HasAccessor;

impl Accessor for HasAccessor {
    fn default_value(&self, _state: &mut GameState) -> Result<Output, ScriptError> {
        Err(unresolved("has needs an item id"))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let id = argument(rest, "has")?;
        Ok(Output::bool(state.has_item(id)))
    }
}

/// `present(mara)`: the actor is at the player's location.
pub struct PresentAccessor;

impl Accessor for PresentAccessor {
    fn default_value(&self, state: &mut GameState) -> Result<Output, ScriptError> {
        Ok(Output::bool(!state.present().is_empty()))
    }

    fn resolve(&self, state: &mut GameState, rest: &str) -> Result<Output, ScriptError> {
        let id = argument(rest, "present")?;
        Ok(Output::bool(state.is_present(id)))
    }
}
