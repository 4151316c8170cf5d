/// Item and effect bookkeeping at the collaborator boundary: instances are
/// validated against the catalog, lifecycle callbacks fire, and stats are
/// recombined afterwards.
use log::debug;

use crate::core::resolver::ScriptError;
use crate::core::state::GameState;
use crate::schema::entity::{EffectInstance, ItemInstance};

fn unknown(kind: &'static str, id: &str) -> ScriptError {
    ScriptError::UnknownDefinition {
        kind,
        id: id.to_string(),
    }
}

impl GameState {
    pub fn give_item(&mut self, id: &str) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        let def = runtime.catalog.item(id).ok_or_else(|| unknown("item", id))?;
        let mut item = ItemInstance::new(id);
        if let Some(on_added) = &def.on_added {
            on_added(self, &mut item)?;
        }
        debug!("item {} added", id);
        self.inventory.push(item);
        self.recalculate()
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.inventory.iter().any(|item| item.id == id)
            || self.equipped.values().any(|item| item.id == id)
    }

    /// Wear a carried item in `slot`, or in its definition's slot. Whatever
    /// occupied the slot goes back to the inventory.
    pub fn equip(&mut self, id: &str, slot: Option<&str>) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        let def = runtime.catalog.item(id).ok_or_else(|| unknown("item", id))?;
        let slot = slot
            .or(def.slot.as_deref())
            .ok_or_else(|| ScriptError::Failed(format!("item '{}' cannot be worn", id)))?
            .to_string();
        let mut item = self
            .carried(id)
            .map(|index| self.inventory[index].clone())
            .ok_or_else(|| ScriptError::Failed(format!("item '{}' is not carried", id)))?;

        // The carried instance is only taken once the hook has succeeded.
        if let Some(on_worn) = &def.on_worn {
            on_worn(self, &mut item)?;
        }
        let index = self
            .carried(id)
            .ok_or_else(|| ScriptError::Failed(format!("item '{}' is not carried", id)))?;
        self.inventory.remove(index);
        if let Some(previous) = self.equipped.insert(slot, item) {
            self.inventory.push(previous);
        }
        self.recalculate()
    }

    fn carried(&self, id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == id)
    }

    pub fn unequip(&mut self, slot: &str) -> Result<(), ScriptError> {
        let item = self
            .equipped
            .remove(slot)
            .ok_or_else(|| ScriptError::Failed(format!("nothing worn in '{}'", slot)))?;
        self.inventory.push(item);
        self.recalculate()
    }

    pub fn add_effect(&mut self, id: &str) -> Result<(), ScriptError> {
        let runtime = self.runtime_handle();
        let def = runtime
            .catalog
            .effect(id)
            .ok_or_else(|| unknown("effect", id))?;
        let mut effect = EffectInstance::new(id);
        if let Some(on_added) = &def.on_added {
            on_added(self, &mut effect)?;
        }
        debug!("effect {} added", id);
        self.effects.push(effect);
        self.recalculate()
    }

    /// Remove every active instance of an effect. Returns how many went.
    pub fn remove_effect(&mut self, id: &str) -> Result<usize, ScriptError> {
        let count = self.effects.len();
        self.effects.retain(|effect| effect.id != id);
        let removed = count - self.effects.len();
        if removed > 0 {
            self.recalculate()?;
        }
        Ok(removed)
    }

    pub fn has_effect(&self, id: &str) -> bool {
        self.effects.iter().any(|effect| effect.id == id)
    }
}
