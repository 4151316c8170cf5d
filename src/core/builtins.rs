/// Built-in scripts: scene mutation, time, world state and accessors.
use crate::core::accessors::{
    ActorAccessor, ChanceAccessor, FlagAccessor, HasAccessor, NotAccessor, PlayerAccessor,
    PresentAccessor, TimeAccessor,
};
use crate::core::menu::{entries_from_params, PAGES};
use crate::core::registry::{RegistryError, ScriptRegistry};
use crate::core::resolver::Output;
use crate::core::scene::ADVANCE;
use crate::core::time::WaitOutcome;
use crate::schema::instruction::Instruction;
use crate::schema::value::Value;

/// Names claimed by [`register_builtins`].
pub const BUILTIN_NAMES: &[&str] = &[
    "text", "say", "option", "clear", ADVANCE, PAGES, "push_pages", "menu", "when",
    "pass_time", "wait", "sleep", "go", "set_flag", "give_item", "equip", "unequip",
    "add_effect", "remove_effect", "pc", "actor", "time", "flag", "not", "chance", "has",
    "present",
];

fn completed(outcome: WaitOutcome) -> Output {
    Output::bool(outcome == WaitOutcome::Completed)
}

pub fn register_builtins(scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
    register_scene(scripts)?;
    register_time(scripts)?;
    register_world(scripts)?;
    register_accessors(scripts)
}

fn register_scene(scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
    scripts.register("text", |state, params| {
        let text = params.require_str("text", "text")?;
        state.narrate(text);
        Ok(Output::Unit)
    })?;

    // `speaker` may be an actor id, shown by the actor's name.
    scripts.register("say", |state, params| {
        let speaker = params.require_str("say", "speaker")?;
        let text = params.require_str("say", "text")?;
        let name = state.speaker_name(speaker);
        state.speak(&name, text);
        Ok(Output::Unit)
    })?;

    scripts.register("option", |state, params| {
        let label = params.require_str("option", "label")?;
        let then = params.require_instruction("option", "then")?;
        state.scene.add_option(label, then.clone());
        Ok(Output::Unit)
    })?;

    scripts.register("clear", |state, _| {
        state.scene.clear();
        Ok(Output::Unit)
    })?;

    scripts.register(ADVANCE, |state, params| {
        let push = params.opt_instruction(ADVANCE, "push")?.cloned();
        state.advance(push)?;
        Ok(Output::Unit)
    })?;

    scripts.register(PAGES, |state, params| {
        let pages = params.require_instructions(PAGES, "pages")?;
        state.advance_with(pages)?;
        Ok(Output::Unit)
    })?;

    scripts.register("push_pages", |state, params| {
        let pages = params.require_instructions("push_pages", "pages")?;
        state.push_pages(pages);
        Ok(Output::Unit)
    })?;

    scripts.register("menu", |state, params| {
        let entries = entries_from_params("menu", params)?;
        if let Some(prompt) = params.opt_str("menu", "prompt")? {
            state.narrate(prompt);
        }
        let again = Instruction::new("menu", params.clone());
        state.render_menu(&entries, &again)?;
        Ok(Output::Unit)
    })?;

    // A gated page: runs `then` only when `condition` holds, otherwise
    // `else` if given. A failed gate with no `else` produces nothing.
    scripts.register("when", |state, params| {
        let condition = params.require_str("when", "condition")?;
        let branch = if state.test(condition)? {
            params.require_instructions("when", "then")?
        } else if params.contains_key("else") {
            params.require_instructions("when", "else")?
        } else {
            Vec::new()
        };
        for instruction in &branch {
            state.run_instruction(instruction)?;
        }
        Ok(Output::Unit)
    })?;
    Ok(())
}

fn register_time(scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
    scripts.register("pass_time", |state, params| {
        let seconds = params.require_i64("pass_time", "seconds")?;
        state.advance_clock(seconds)?;
        Ok(Output::Unit)
    })?;

    scripts.register("wait", |state, params| {
        let minutes = params.require_i64("wait", "minutes")?;
        let then = params.opt_instruction("wait", "then")?.cloned();
        Ok(completed(state.wait(minutes, then.as_ref())?))
    })?;

    scripts.register("sleep", |state, params| {
        let minutes = params.require_i64("sleep", "minutes")?;
        let then = params.opt_instruction("sleep", "then")?.cloned();
        Ok(completed(state.sleep(minutes, then.as_ref())?))
    })?;
    Ok(())
}

fn register_world(scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
    scripts.register("go", |state, params| {
        let location = params.require_str("go", "location")?;
        state.move_player(location)?;
        Ok(Output::Unit)
    })?;

    scripts.register("set_flag", |state, params| {
        let key = params.require_str("set_flag", "key")?;
        let value = params.get("value").cloned().unwrap_or(Value::Bool(true));
        state.set_flag(key, value);
        Ok(Output::Unit)
    })?;

    scripts.register("give_item", |state, params| {
        let id = params.require_str("give_item", "id")?;
        state.give_item(id)?;
        Ok(Output::Unit)
    })?;

    scripts.register("equip", |state, params| {
        let id = params.require_str("equip", "id")?;
        let slot = params.opt_str("equip", "slot")?;
        state.equip(id, slot)?;
        Ok(Output::Unit)
    })?;

    scripts.register("unequip", |state, params| {
        let slot = params.require_str("unequip", "slot")?;
        state.unequip(slot)?;
        Ok(Output::Unit)
    })?;

    scripts.register("add_effect", |state, params| {
        let id = params.require_str("add_effect", "id")?;
        state.add_effect(id)?;
        Ok(Output::Unit)
    })?;

    scripts.register("remove_effect", |state, params| {
        let id = params.require_str("remove_effect", "id")?;
        let removed = state.remove_effect(id)?;
        Ok(Output::Value(Value::Int(removed as i64)))
    })?;
    Ok(())
}

fn register_accessors(scripts: &mut ScriptRegistry) -> Result<(), RegistryError> {
    scripts.register("pc", |_, _| Ok(Output::accessor(PlayerAccessor)))?;
    scripts.register("actor", |_, _| Ok(Output::accessor(ActorAccessor)))?;
    scripts.register("time", |_, _| Ok(Output::accessor(TimeAccessor)))?;
    scripts.register("flag", |_, _| Ok(Output::accessor(FlagAccessor)))?;
    scripts.register("not", |_, _| Ok(Output::accessor(NotAccessor)))?;
    scripts.register("chance", |_, _| Ok(Output::accessor(ChanceAccessor)))?;
    scripts.register("has", |_, _| Ok(Output::accessor(HasAccessor)))?;
    scripts.register("present", |_, _| Ok(Output::accessor(PresentAccessor)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runtime::Runtime;
    use crate::core::state::GameState;
    use crate::core::menu::{menu_instruction, MenuEntry};
    use crate::schema::value::Params;

    fn state() -> GameState {
        GameState::with_seed(Runtime::builder().build().unwrap(), 2)
    }

    fn text(t: &str) -> Instruction {
        Instruction::bare("text").with("text", t)
    }

    #[test]
    fn every_builtin_name_is_registered() {
        let mut scripts = ScriptRegistry::new();
        register_builtins(&mut scripts).unwrap();
        assert_eq!(scripts.len(), BUILTIN_NAMES.len());
        for name in BUILTIN_NAMES {
            assert!(scripts.contains(name), "missing builtin {}", name);
        }
    }

    #[test]
    fn registering_twice_fails() {
        let mut scripts = ScriptRegistry::new();
        register_builtins(&mut scripts).unwrap();
        assert!(register_builtins(&mut scripts).is_err());
    }

    #[test]
    fn text_requires_text() {
        let mut s = state();
        assert!(s.run("text", &Params::new()).is_err());
        s.run("text", &Params::new().with("text", "It is {time}.")).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "It is 08:00.");
    }

    #[test]
    fn when_gates_and_branches() {
        let mut s = state();
        let gate = Instruction::bare("when")
            .with("condition", "flag:lamp_lit")
            .with("then", text("The room glows."))
            .with("else", text("It is dark."));
        s.run_instruction(&gate).unwrap();
        s.set_flag("lamp_lit", true);
        s.run_instruction(&gate).unwrap();
        let texts: Vec<String> = s.scene.content().iter().map(|c| c.plain_text()).collect();
        assert_eq!(texts, vec!["It is dark.", "The room glows."]);
    }

    #[test]
    fn repeating_menu_re_pushes_itself() {
        let mut s = state();
        let menu = menu_instruction(&[
            MenuEntry::new("Ask about rumours", vec![text("She shrugs.")]).repeating(),
            MenuEntry::new("Ask about the key", vec![text("She hands it over.")])
                .when("not:flag:has_key")
                .repeating(),
            MenuEntry::new("Leave", vec![text("You leave.")]),
        ]);
        s.run_instruction(&menu).unwrap();
        assert_eq!(s.scene.options().len(), 3);

        s.choose(0).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "She shrugs.");
        assert_eq!(s.scene.pending()[0], menu);
        assert_eq!(s.scene.options()[0].label, "Continue");

        // The menu re-renders with gates evaluated afresh.
        s.set_flag("has_key", true);
        s.choose(0).unwrap();
        let labels: Vec<&str> = s.scene.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Ask about rumours", "Leave"]);

        s.choose(1).unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "You leave.");
        assert!(s.scene.pending().is_empty());
        assert!(!s.scene.has_options());
    }

    #[test]
    fn set_flag_defaults_to_true() {
        let mut s = state();
        s.run("set_flag", &Params::new().with("key", "met")).unwrap();
        assert_eq!(s.flag("met"), Some(&Value::Bool(true)));
        s.run("set_flag", &Params::new().with("key", "coins").with("value", 3i64))
            .unwrap();
        assert_eq!(s.flag("coins"), Some(&Value::Int(3)));
    }

    #[test]
    fn say_uses_speaker_verbatim_without_actor() {
        let mut s = state();
        s.run("say", &Params::new().with("speaker", "Voice").with("text", "Hello."))
            .unwrap();
        assert_eq!(s.scene.content()[0].plain_text(), "Voice: \"Hello.\"");
    }
}
