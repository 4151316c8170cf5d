/// Clock advance and chunked wait integration tests.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

use narrative_runtime::core::catalog::{ActorDef, Catalog, LocationDef, TickHooks};
use narrative_runtime::core::runtime::Runtime;
use narrative_runtime::core::state::GameState;
use narrative_runtime::core::time::WaitOutcome;
use narrative_runtime::schema::instruction::Instruction;
use narrative_runtime::schema::schedule::ScheduleEntry;

type Log = Rc<RefCell<Vec<u64>>>;

/// A camp with one companion. The companion's wait hook logs each chunk and
/// interrupts on chunk number `interrupt_on` (1-based, 0 = never).
fn camp(interrupt_on: usize, actor_log: &Log, location_log: &Log) -> GameState {
    let mut catalog = Catalog::new();
    let location_log = Rc::clone(location_log);
    catalog
        .add_location(LocationDef::new("camp", "Camp").on_wait(move |_, minutes| {
            location_log.borrow_mut().push(minutes);
            Ok(())
        }))
        .unwrap();
    let actor_log = Rc::clone(actor_log);
    catalog
        .add_actor(
            ActorDef::new("wren", "Wren")
                .starts_at("camp")
                .on_wait(move |state, _, minutes| {
                    let mut log = actor_log.borrow_mut();
                    log.push(minutes);
                    if log.len() == interrupt_on {
                        state.scene.add_text("Wren taps your shoulder.");
                        state
                            .scene
                            .add_option("Listen", Instruction::bare("clear"));
                    }
                    Ok(())
                }),
        )
        .unwrap();
    let runtime = Runtime::builder().with_catalog(catalog).build().unwrap();
    let mut state = GameState::with_seed(runtime, 7);
    state.move_player("camp").unwrap();
    state
}

fn follow_up() -> Instruction {
    Instruction::bare("text").with("text", "You rise.")
}

#[test]
fn wait_runs_partial_final_chunk() {
    let actor_log = Log::default();
    let location_log = Log::default();
    let mut state = camp(0, &actor_log, &location_log);
    let before = state.now();

    let outcome = state.wait(25, Some(&follow_up())).unwrap();

    assert_eq!(outcome, WaitOutcome::Completed);
    assert_eq!(*actor_log.borrow(), vec![10, 10, 5]);
    assert_eq!(*location_log.borrow(), vec![10, 10, 5]);
    assert_eq!(state.now(), before + 25 * 60);
    assert_eq!(state.scene.content()[0].plain_text(), "You rise.");
}

#[test]
fn actor_interruption_stops_wait() {
    let actor_log = Log::default();
    let location_log = Log::default();
    let mut state = camp(2, &actor_log, &location_log);
    let before = state.now();

    let outcome = state.wait(25, Some(&follow_up())).unwrap();

    assert_eq!(outcome, WaitOutcome::Interrupted { elapsed_minutes: 20 });
    assert_eq!(*actor_log.borrow(), vec![10, 10]);
    // The location hook ran after the first chunk only.
    assert_eq!(*location_log.borrow(), vec![10]);
    assert_eq!(state.now(), before + 20 * 60);
    // The interruption wins over the follow-up.
    let texts: Vec<String> = state.scene.content().iter().map(|c| c.plain_text()).collect();
    assert_eq!(texts, vec!["Wren taps your shoulder."]);
}

#[test]
fn absent_actor_hooks_do_not_run() {
    let actor_log = Log::default();
    let location_log = Log::default();
    let mut state = camp(1, &actor_log, &location_log);
    state.actors.get_mut("wren").unwrap().location = None;
    state.refresh_presence();

    assert_eq!(state.wait(15, None).unwrap(), WaitOutcome::Completed);
    assert!(actor_log.borrow().is_empty());
    assert_eq!(*location_log.borrow(), vec![10, 5]);
}

#[test]
fn wait_builtin_reports_completion() {
    let actor_log = Log::default();
    let location_log = Log::default();
    let mut state = camp(1, &actor_log, &location_log);
    let result = state
        .run_instruction(&Instruction::bare("wait").with("minutes", 30i64))
        .unwrap();
    assert!(!result.is_truthy().unwrap());
    assert!(state.scene.has_options());
}

fn texts(state: &GameState) -> Vec<String> {
    state.scene.content().iter().map(|c| c.plain_text()).collect()
}

#[test]
fn departure_during_clock_advance_interrupts_wait() {
    let mut catalog = Catalog::new();
    catalog.add_location(LocationDef::new("tavern", "Tavern")).unwrap();
    catalog
        .add_actor(
            ActorDef::new("mara", "Mara")
                .starts_at("tavern")
                .schedule(vec![ScheduleEntry::new(8, 9, "tavern")])
                .on_leave(|state, _| {
                    state.scene.add_text("Mara: wait!");
                    state.scene.add_option("Talk", Instruction::bare("clear"));
                    Ok(())
                }),
        )
        .unwrap();
    let runtime = Runtime::builder().with_catalog(catalog).build().unwrap();
    let mut state = GameState::with_seed(runtime, 3);
    state.move_player("tavern").unwrap();

    let outcome = state.wait(120, Some(&follow_up())).unwrap();

    // Mara's shift ends at 09:00, after the sixth chunk.
    assert_eq!(outcome, WaitOutcome::Interrupted { elapsed_minutes: 60 });
    assert_eq!(state.clock.time_of_day(), "09:00");
    assert_eq!(texts(&state), vec!["Mara: wait!"]);
    assert_eq!(state.scene.options()[0].label, "Talk");
}

#[test]
fn location_interruption_suppresses_follow_up() {
    let mut catalog = Catalog::new();
    catalog
        .add_location(LocationDef::new("hall", "Hall").on_wait(|state, _| {
            state.scene.add_text("A bell rings.");
            state.scene.add_option("Answer", Instruction::bare("clear"));
            Ok(())
        }))
        .unwrap();
    let runtime = Runtime::builder().with_catalog(catalog).build().unwrap();
    let mut state = GameState::with_seed(runtime, 3);
    state.move_player("hall").unwrap();

    let outcome = state.wait(30, Some(&follow_up())).unwrap();

    assert_eq!(outcome, WaitOutcome::Interrupted { elapsed_minutes: 10 });
    assert_eq!(texts(&state), vec!["A bell rings."]);
}

#[test]
fn earlier_actor_interruption_skips_later_hooks() {
    let later_log = Log::default();
    let location_log = Log::default();
    let mut catalog = Catalog::new();
    let location_hook_log = Rc::clone(&location_log);
    catalog
        .add_location(LocationDef::new("hall", "Hall").on_wait(move |_, minutes| {
            location_hook_log.borrow_mut().push(minutes);
            Ok(())
        }))
        .unwrap();
    catalog
        .add_actor(ActorDef::new("ana", "Ana").starts_at("hall").on_wait(|state, _, _| {
            state.scene.add_option("Reply", Instruction::bare("clear"));
            Ok(())
        }))
        .unwrap();
    let later_hook_log = Rc::clone(&later_log);
    catalog
        .add_actor(ActorDef::new("bo", "Bo").starts_at("hall").on_wait(move |_, _, minutes| {
            later_hook_log.borrow_mut().push(minutes);
            Ok(())
        }))
        .unwrap();
    let runtime = Runtime::builder().with_catalog(catalog).build().unwrap();
    let mut state = GameState::with_seed(runtime, 3);
    state.move_player("hall").unwrap();
    assert_eq!(state.present(), &["ana".to_string(), "bo".to_string()]);

    let outcome = state.wait(25, None).unwrap();

    assert_eq!(outcome, WaitOutcome::Interrupted { elapsed_minutes: 10 });
    assert!(later_log.borrow().is_empty());
    assert!(location_log.borrow().is_empty());
}

fn counting_runtime(counter: &Rc<RefCell<u32>>) -> Runtime {
    let mut catalog = Catalog::new();
    let counter = Rc::clone(counter);
    catalog
        .add_actor(ActorDef::new("watch", "Watchman").on_hour(move |_, _| {
            *counter.borrow_mut() += 1;
            Ok(())
        }))
        .unwrap();
    Runtime::builder()
        .with_catalog(catalog)
        .with_hooks(TickHooks::default())
        .build()
        .unwrap()
}

#[test]
fn hour_hook_fires_once_per_advance() {
    let counter = Rc::new(RefCell::new(0));
    let mut state = GameState::with_seed(counting_runtime(&counter), 1);

    // 08:00 → 08:30, no boundary.
    state.advance_clock(30 * 60).unwrap();
    assert_eq!(*counter.borrow(), 0);

    // 08:30 → 11:30 crosses three boundaries; one movement pass.
    state.advance_clock(3 * 3600).unwrap();
    assert_eq!(*counter.borrow(), 1);

    // 11:30 → 12:00 lands exactly on a boundary.
    state.advance_clock(30 * 60).unwrap();
    assert_eq!(*counter.borrow(), 2);
}

proptest! {
    #[test]
    fn advance_adds_exactly_and_moves_actors_at_most_once(seconds in 1i64..200_000) {
        let counter = Rc::new(RefCell::new(0));
        let mut state = GameState::with_seed(counting_runtime(&counter), 1);
        let before = state.now();
        state.advance_clock(seconds).unwrap();
        prop_assert_eq!(state.now(), before + seconds as u64);

        let crossed = (before + seconds as u64) / 3600 > before / 3600;
        prop_assert_eq!(*counter.borrow(), u32::from(crossed));
    }
}
