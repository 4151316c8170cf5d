/// Play: interactive terminal player for story books.
///
/// Usage: play --stories <dir> [--world <file>] [--config <file>] [--start <passage>] [--seed <n>]
///
/// Commands:
///   <n>             choose option n
///   look            show the current frame again
///   time            show the game time
///   wait <minutes>  let time pass
///   save <file>     write a save game
///   load <file>     restore a save game
///   help            list commands
///   quit            exit

use narrative_runtime::core::runtime::Runtime;
use narrative_runtime::core::state::GameState;
use narrative_runtime::schema::content::{Content, Fragment, Inline};
use narrative_runtime::schema::value::Params;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

const RESET: &str = "\x1b[0m";

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut stories_path = None;
    let mut world_path = None;
    let mut config_path = None;
    let mut start = "start".to_string();
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stories" if i + 1 < args.len() => {
                i += 1;
                stories_path = Some(args[i].clone());
            }
            "--world" if i + 1 < args.len() => {
                i += 1;
                world_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--start" if i + 1 < args.len() => {
                i += 1;
                start = args[i].clone();
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse::<u64>().ok();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(stories_path) = stories_path else {
        eprintln!("Missing --stories <dir>");
        print_usage();
        std::process::exit(1);
    };

    let mut builder = Runtime::builder().story_dir(&stories_path);
    if let Some(ref path) = world_path {
        builder = builder.world_file(path);
    }
    if let Some(ref path) = config_path {
        builder = builder.config_file(path);
    }
    let runtime = match builder.build() {
        Ok(runtime) => Rc::new(runtime),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} passages", runtime.story.len());
    println!("Type 'help' for commands.\n");

    let mut state = match seed {
        Some(seed) => GameState::with_seed(Rc::clone(&runtime), seed),
        None => GameState::new(Rc::clone(&runtime)),
    };
    if let Err(e) = state.run(&start, &Params::new()) {
        eprintln!("ERROR: cannot start at '{}': {}", start, e);
        std::process::exit(1);
    }
    print_frame(&state);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("play> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        if let Ok(n) = cmd.parse::<usize>() {
            if n == 0 || n > state.scene.options().len() {
                println!("No option {}.", n);
                continue;
            }
            match state.choose(n - 1) {
                Ok(()) => print_frame(&state),
                Err(e) => println!("ERROR: {}", e),
            }
            continue;
        }

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "look" | "l" => {
                print_frame(&state);
            }
            "time" | "t" => {
                println!(
                    "Day {}, {} {}",
                    state.clock.day() + 1,
                    weekday_name(&state),
                    state.clock.time_of_day()
                );
            }
            "wait" => {
                let minutes = match parts.get(1).map(|m| m.parse::<i64>()) {
                    Some(Ok(m)) => m,
                    _ => {
                        println!("Usage: wait <minutes>");
                        continue;
                    }
                };
                match state.wait(minutes, None) {
                    Ok(outcome) => {
                        println!("{:?} at {}", outcome, state.clock.time_of_day());
                        print_frame(&state);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "save" => {
                let Some(path) = parts.get(1) else {
                    println!("Usage: save <file>");
                    continue;
                };
                match state.save_to_file(Path::new(path)) {
                    Ok(()) => println!("Saved to {}", path),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "load" => {
                let Some(path) = parts.get(1) else {
                    println!("Usage: load <file>");
                    continue;
                };
                match GameState::load_from_file(Rc::clone(&runtime), Path::new(path)) {
                    Ok(loaded) => {
                        state = loaded;
                        println!("Loaded {}", path);
                        print_frame(&state);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn weekday_name(state: &GameState) -> &'static str {
    narrative_runtime::core::clock::WEEKDAY_NAMES[state.weekday() as usize % 7]
}

fn ansi(color: &str) -> &'static str {
    match color {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "gold" | "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        _ => "",
    }
}

fn render(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Literal(text) | Fragment::Resolved(Inline::Text(text)) => out.push_str(text),
            Fragment::Resolved(Inline::Styled { text, color })
            | Fragment::Error { marker: text, color } => {
                out.push_str(&format!("{}{}{}", ansi(color), text, RESET));
            }
        }
    }
    out
}

fn print_frame(state: &GameState) {
    println!();
    for content in state.scene.content() {
        match content {
            Content::Paragraph(fragments) => println!("{}\n", render(fragments)),
            Content::Speech { speaker, line } => {
                println!("{}: \"{}\"\n", speaker, render(line));
            }
        }
    }
    if state.scene.has_options() {
        for (i, option) in state.scene.options().iter().enumerate() {
            println!("  {}. {}", i + 1, option.label);
        }
    } else {
        println!("  (the story pauses here; try 'wait' or 'quit')");
    }
    println!();
}

fn print_usage() {
    println!("Usage: play --stories <dir> [--world <file>] [--config <file>] [--start <passage>] [--seed <n>]");
    println!();
    println!("  --stories <dir>    Directory of story .ron files");
    println!("  --world <file>     World definitions (locations, items, effects, actors)");
    println!("  --config <file>    Engine config .ron file");
    println!("  --start <passage>  Passage to begin at (default: start)");
    println!("  --seed <n>         Pin the random source");
}

fn print_help() {
    println!("Commands:");
    println!("  <n>             Choose option n");
    println!("  look            Show the current frame again");
    println!("  time            Show the game time");
    println!("  wait <minutes>  Let time pass");
    println!("  save <file>     Write a save game");
    println!("  load <file>     Restore a save game");
    println!("  help            Show this help");
    println!("  quit            Exit");
}
