/// Story Linter: validates story books against the registered scripts.
///
/// Usage: story_linter <story_dir|story_file> [--world <world.ron>]

use narrative_runtime::core::builtins::register_builtins;
use narrative_runtime::core::catalog::Catalog;
use narrative_runtime::core::interpolate::{scan, Piece};
use narrative_runtime::core::registry::ScriptRegistry;
use narrative_runtime::core::resolver::split_head;
use narrative_runtime::core::story::{Passage, StoryBook};
use narrative_runtime::schema::instruction::Instruction;
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <story_dir|story_file> [--world <world.ron>]");
        process::exit(0);
    }

    let story_arg = &args[1];
    let mut world_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--world" && i + 1 < args.len() {
            i += 1;
            world_path = Some(args[i].clone());
        }
        i += 1;
    }

    let mut story = StoryBook::default();
    let story_path = Path::new(story_arg);

    if story_path.is_file() {
        match StoryBook::load_from_ron(story_path) {
            Ok(book) => story.merge(book),
            Err(e) => {
                eprintln!("ERROR: Failed to load story file: {}", e);
                process::exit(1);
            }
        }
    } else if story_path.is_dir() {
        load_stories_recursive(story_path, &mut story);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", story_arg);
        process::exit(1);
    }

    println!("Loaded {} passages", story.len());

    let catalog = match world_path {
        Some(ref path) => match Catalog::load_from_ron(Path::new(path)) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                eprintln!("ERROR: Failed to load world file: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    let mut scripts = ScriptRegistry::new();
    let mut errors = Vec::new();
    if let Err(e) = register_builtins(&mut scripts) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
    if let Err(e) = story.register(&mut scripts) {
        errors.push(format!("Passage id collides with a built-in script: {}", e));
    }

    let (mut lint_errors, warnings) = lint_story(&story, &scripts, catalog.as_ref());
    errors.append(&mut lint_errors);

    println!("\n=== Story Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_stories_recursive(dir: &Path, story: &mut StoryBook) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_stories_recursive(&path, story);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match StoryBook::load_from_ron(&path) {
                    Ok(book) => {
                        println!("  Loaded: {}", path.display());
                        story.merge(book);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

/// The script an expression would run first.
fn head(expr: &str) -> &str {
    split_head(expr.trim()).0.trim()
}

fn check_expression(
    passage: &str,
    what: &str,
    expr: &str,
    scripts: &ScriptRegistry,
    errors: &mut Vec<String>,
) {
    let name = head(expr);
    if name.is_empty() {
        errors.push(format!("Passage '{}' has an empty {} expression", passage, what));
    } else if !scripts.contains(name) {
        errors.push(format!(
            "Passage '{}' {} '{}' calls unknown script '{}'",
            passage, what, expr, name
        ));
    }
}

/// Check the catalog ids named by world-changing instructions.
fn check_ids(passage: &str, instruction: &Instruction, catalog: &Catalog, errors: &mut Vec<String>) {
    let (key, kind) = match instruction.name.as_str() {
        "go" => ("location", "location"),
        "give_item" | "equip" => ("id", "item"),
        "add_effect" | "remove_effect" => ("id", "effect"),
        _ => return,
    };
    let Some(id) = instruction.params.get(key).and_then(|v| v.as_str()) else {
        return;
    };
    let known = match kind {
        "location" => catalog.location(id).is_some(),
        "item" => catalog.item(id).is_some(),
        _ => catalog.effect(id).is_some(),
    };
    if !known {
        errors.push(format!(
            "Passage '{}' {} refers to unknown {} '{}'",
            passage, instruction.name, kind, id
        ));
    }
}

fn instructions(passage: &Passage) -> impl Iterator<Item = &Instruction> {
    passage
        .run
        .iter()
        .chain(passage.options.iter().flat_map(|o| o.then.iter()))
}

fn lint_story(
    story: &StoryBook,
    scripts: &ScriptRegistry,
    catalog: Option<&Catalog>,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut referenced: HashSet<&str> = HashSet::new();

    for id in story.ids() {
        let Some(passage) = story.passage(id) else {
            continue;
        };

        for template in passage.templates() {
            for piece in scan(template) {
                if let Piece::Placeholder(expr) = piece {
                    check_expression(id, "placeholder", &expr, scripts, &mut errors);
                }
            }
        }

        if let Some(gate) = &passage.when {
            check_expression(id, "gate", gate, scripts, &mut errors);
        }
        for option in &passage.options {
            if let Some(gate) = &option.when {
                check_expression(id, "option gate", gate, scripts, &mut errors);
            }
            if option.goto.is_none() && option.then.is_empty() && !option.repeat {
                warnings.push(format!(
                    "Passage '{}' option '{}' leads nowhere",
                    id, option.label
                ));
            }
        }

        for target in passage.targets() {
            if !scripts.contains(target) {
                errors.push(format!(
                    "Passage '{}' refers to unknown script or passage '{}'",
                    id, target
                ));
            }
            if target != id {
                referenced.insert(target);
            }
        }

        if let Some(catalog) = catalog {
            for instruction in instructions(passage) {
                check_ids(id, instruction, catalog, &mut errors);
            }
        }

        let empty = passage.run.is_empty()
            && passage.text.is_empty()
            && passage.speech.is_empty()
            && passage.options.is_empty()
            && passage.next.is_empty();
        if empty {
            warnings.push(format!("Passage '{}' does nothing", id));
        }
    }

    for id in story.ids() {
        if id != "start" && !referenced.contains(id) {
            warnings.push(format!(
                "Passage '{}' is never referenced by another passage",
                id
            ));
        }
    }

    (errors, warnings)
}
