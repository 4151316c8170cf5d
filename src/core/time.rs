/// Time simulation: clock advance with boundary hooks, and the chunked,
/// interruptible wait.
use log::{debug, trace};

use crate::core::clock::SECONDS_PER_MINUTE;
use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::instruction::Instruction;

/// How a chunked wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every chunk ran; the follow-up instruction, if any, ran too.
    Completed,
    /// A hook offered the player a choice after `elapsed_minutes`.
    Interrupted { elapsed_minutes: u64 },
}

fn interrupted(elapsed_minutes: u64) -> WaitOutcome {
    WaitOutcome::Interrupted { elapsed_minutes }
}

impl GameState {
    /// Advance the clock by `seconds` and fire the time hooks.
    ///
    /// Order: passive depletion once per tick boundary crossed (skipped
    /// while asleep), the time-effects hook, every active effect's tick,
    /// then one actor movement pass if at least one hour boundary was
    /// crossed.
    pub fn advance_clock(&mut self, seconds: i64) -> Result<(), ScriptError> {
        if seconds < 0 {
            return Err(ScriptError::InvalidDuration(seconds));
        }
        if seconds == 0 {
            return Ok(());
        }
        let seconds = seconds as u64;
        let runtime = self.runtime_handle();
        let before = self.clock;
        self.clock.advance(seconds);
        let after = self.clock;

        if !self.player.asleep {
            if let Some(deplete) = &runtime.hooks.passive_depletion {
                let tick = runtime.config.tick_seconds;
                let ticks = after.now() / tick - before.now() / tick;
                for _ in 0..ticks {
                    deplete(self)?;
                }
            }
        }

        if let Some(time_effects) = &runtime.hooks.time_effects {
            time_effects(self, seconds)?;
        }

        self.tick_effects(seconds)?;

        let hours = after.total_hours() - before.total_hours();
        if hours > 0 {
            debug!("{} hour boundaries crossed at {}", hours, after.time_of_day());
            self.move_actors()?;
        }
        Ok(())
    }

    /// Run every active effect's tick callback, then drop expired effects.
    ///
    /// The effect list stays live during the pass, so callbacks see and may
    /// remove other effects. Each instance is handed to its callback as a
    /// copy and written back if it is still active afterwards. Effects added
    /// by a callback are first ticked on the next advance.
    fn tick_effects(&mut self, seconds: u64) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        let ids: Vec<String> = self.effects.iter().map(|effect| effect.id.clone()).collect();
        for (n, id) in ids.iter().enumerate() {
            let Some(on_tick) = runtime.catalog.effect(id).and_then(|def| def.on_tick.as_ref())
            else {
                continue;
            };
            // Which instance of this id the snapshot entry refers to.
            let occurrence = ids[..n].iter().filter(|other| *other == id).count();
            let Some(index) = self.nth_effect(id, occurrence) else {
                trace!("effect {} removed before its tick", id);
                continue;
            };
            let mut effect = self.effects[index].clone();
            on_tick(self, &mut effect, seconds)?;
            if let Some(index) = self.nth_effect(id, occurrence) {
                self.effects[index] = effect;
            }
        }

        let count = self.effects.len();
        self.effects.retain(|effect| !effect.expired);
        if self.effects.len() != count {
            self.recalculate()?;
        }
        Ok(())
    }

    fn nth_effect(&self, id: &str, occurrence: usize) -> Option<usize> {
        self.effects
            .iter()
            .enumerate()
            .filter(|(_, effect)| effect.id == id)
            .nth(occurrence)
            .map(|(index, _)| index)
    }

    /// Pass `minutes` in fixed chunks so hooks can interrupt between them.
    ///
    /// After each chunk, present actors' `on_wait` hooks run in order, then
    /// the location's. As soon as the scene gains an option the wait stops
    /// and no later hook or chunk runs, including when the option was added
    /// while the clock advanced (an `on_leave` or an effect tick). `then`
    /// only runs when nothing interrupted.
    pub fn wait(
        &mut self,
        minutes: i64,
        then: Option<&Instruction>,
    ) -> Result<WaitOutcome, ScriptError> {
        if minutes < 0 {
            return Err(ScriptError::InvalidDuration(minutes));
        }
        let runtime = self.runtime_handle();
        let chunk = runtime.config.wait_chunk_minutes;
        let mut remaining = minutes as u64;
        let mut elapsed = 0;
        // Options already on screen when the wait starts do not interrupt it.
        let baseline = self.scene.options().len();

        while remaining > 0 {
            let step = remaining.min(chunk);
            remaining -= step;
            elapsed += step;
            trace!("wait chunk of {} min, {} min left", step, remaining);
            self.advance_clock((step * SECONDS_PER_MINUTE) as i64)?;
            if self.scene.options().len() > baseline {
                debug!("wait interrupted by the clock after {} min", elapsed);
                return Ok(interrupted(elapsed));
            }

            let present = self.present().to_vec();
            for actor in &present {
                let on_wait = runtime
                    .catalog
                    .actor(actor)
                    .and_then(|def| def.on_wait.as_ref());
                if let Some(on_wait) = on_wait {
                    on_wait(self, actor, step)?;
                }
                if self.scene.options().len() > baseline {
                    debug!("wait interrupted by {} after {} min", actor, elapsed);
                    return Ok(interrupted(elapsed));
                }
            }

            let on_wait = self
                .player
                .location
                .as_deref()
                .and_then(|here| runtime.catalog.location(here))
                .and_then(|def| def.on_wait.as_ref());
            if let Some(on_wait) = on_wait {
                on_wait(self, step)?;
                if self.scene.options().len() > baseline {
                    debug!("wait interrupted by location after {} min", elapsed);
                    return Ok(interrupted(elapsed));
                }
            }
        }

        if let Some(then) = then {
            self.run_instruction(then)?;
        }
        Ok(WaitOutcome::Completed)
    }

    /// A wait during which the player sleeps, suppressing passive depletion.
    pub fn sleep(
        &mut self,
        minutes: i64,
        then: Option<&Instruction>,
    ) -> Result<WaitOutcome, ScriptError> {
        let was_asleep = self.player.asleep;
        self.player.asleep = true;
        let outcome = self.wait(minutes, then);
        self.player.asleep = was_asleep;
        outcome
    }
}
