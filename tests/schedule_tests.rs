/// Actor schedules driven by the clock, loaded from a RON world file.

use narrative_runtime::core::catalog::{ActorDef, Catalog, LocationDef};
use narrative_runtime::core::runtime::Runtime;
use narrative_runtime::core::state::GameState;
use narrative_runtime::schema::schedule::ScheduleEntry;

const HOUR: i64 = 3600;

fn town() -> GameState {
    let runtime = Runtime::builder()
        .world_file("tests/fixtures/world.ron")
        .build()
        .unwrap();
    let mut state = GameState::with_seed(runtime, 3);
    state.move_player("tavern").unwrap();
    state
}

fn location_of<'a>(state: &'a GameState, actor: &str) -> Option<&'a str> {
    state.actors[actor].location.as_deref()
}

#[test]
fn mara_works_the_market_then_the_tavern() {
    let mut state = town();
    assert_eq!(state.hour(), 8);
    assert_eq!(location_of(&state, "mara"), Some("market"));
    assert!(!state.is_present("mara"));
    assert!(state.is_present("olek"));

    // 20:00: the market shift is over and nothing else applies yet.
    state.advance_clock(12 * HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), None);

    // 22:00: the late shift at the tavern.
    state.advance_clock(2 * HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), Some("tavern"));
    assert!(state.is_present("mara"));
    assert!(state.test("present(mara)").unwrap());

    // 01:00 on Tuesday: still inside the wrapped entry.
    state.advance_clock(3 * HOUR).unwrap();
    assert_eq!(state.weekday(), 2);
    assert_eq!(location_of(&state, "mara"), Some("tavern"));

    // 02:00: gone home.
    state.advance_clock(HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), None);
    assert!(!state.is_present("mara"));

    // Olek has no schedule and never moves.
    assert_eq!(location_of(&state, "olek"), Some("tavern"));
}

#[test]
fn sunday_skips_the_market() {
    let mut state = town();
    // Monday 08:00 → Sunday 09:00.
    state.advance_clock(6 * 24 * HOUR + HOUR).unwrap();
    assert_eq!(state.weekday(), 0);
    assert_eq!(location_of(&state, "mara"), None);
}

#[test]
fn unscheduled_location_is_left_alone() {
    let mut state = town();
    state.actors.get_mut("mara").unwrap().location = Some("street".to_string());
    // 20:00: no entry matches and the street is not on the schedule.
    state.advance_clock(12 * HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), Some("street"));
}

fn farewell_state() -> GameState {
    let mut catalog = Catalog::new();
    catalog.add_location(LocationDef::new("tavern", "Tavern")).unwrap();
    catalog
        .add_actor(
            ActorDef::new("mara", "Mara")
                .starts_at("tavern")
                .schedule(vec![ScheduleEntry::new(8, 9, "tavern")])
                .on_leave(|state, actor| {
                    let name = state.speaker_name(actor);
                    state.speak(&name, "I'm off, see you tomorrow.");
                    Ok(())
                }),
        )
        .unwrap();
    let runtime = Runtime::builder().with_catalog(catalog).build().unwrap();
    let mut state = GameState::with_seed(runtime, 3);
    state.move_player("tavern").unwrap();
    state
}

#[test]
fn leaving_actor_says_goodbye_when_player_is_free() {
    let mut state = farewell_state();
    state.advance_clock(HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), None);
    assert_eq!(
        state.scene.content()[0].plain_text(),
        "Mara: \"I'm off, see you tomorrow.\""
    );
}

#[test]
fn leaving_actor_stays_quiet_while_player_sleeps() {
    let mut state = farewell_state();
    state.sleep(60, None).unwrap();
    assert_eq!(location_of(&state, "mara"), None);
    assert!(state.scene.content().is_empty());
}

#[test]
fn leaving_actor_stays_quiet_when_player_is_choosing() {
    let mut state = farewell_state();
    state
        .scene
        .add_option("Stay", narrative_runtime::schema::instruction::Instruction::bare("clear"));
    state.advance_clock(HOUR).unwrap();
    assert_eq!(location_of(&state, "mara"), None);
    assert!(state.scene.content().is_empty());
}
