use clap::{Arg, ArgMatches, Command};
use intcode_vm::compose::painter::Color;
use intcode_vm::compose::{amplifier, arcade, diagnostic, droid, painter, ComposeError};
use intcode_vm::config::{self, CONFIG};
use intcode_vm::program::{load_program, ProgramError};
use intcode_vm::vm::{InstructionSet, VMError};
use log::debug;
use serde_json::json;
use std::process;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("VM error: {0}")]
    VM(#[from] VMError),

    #[error("{0}")]
    Compose(#[from] ComposeError),

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Other(s.to_string())
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Other(s)
    }
}

fn program_arg() -> Arg {
    Arg::new("program")
        .short('p')
        .long("program")
        .value_name("FILE")
        .help("Comma-separated program file")
        .required(true)
}

fn cli() -> Command {
    Command::new("intcode-vm")
        .version("0.5.1")
        .about("Integer-instruction virtual machine and machine compositions")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log machine activity at debug level")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about("Run a program with queued input and print its output")
                .arg(program_arg())
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("VALUE")
                        .help("Input value (can be used multiple times)")
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i64))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("SET")
                        .help("Instruction set: basic, diagnostic or full")
                        .default_value("full"),
                ),
        )
        .subcommand(
            Command::new("alarm")
                .about("Run the gravity-assist program with a patched noun and verb")
                .arg(program_arg())
                .arg(
                    Arg::new("noun")
                        .long("noun")
                        .value_parser(clap::value_parser!(i64))
                        .default_value("12"),
                )
                .arg(
                    Arg::new("verb")
                        .long("verb")
                        .value_parser(clap::value_parser!(i64))
                        .default_value("2"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_name("VALUE")
                        .help("Search for the noun and verb producing VALUE instead")
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("amplify")
                .about("Find the phase ordering with the highest amplifier signal")
                .arg(program_arg())
                .arg(
                    Arg::new("phases")
                        .long("phases")
                        .value_name("LIST")
                        .help("Comma-separated phase set (default 0-4, or 5-9 with --feedback)"),
                )
                .arg(
                    Arg::new("feedback")
                        .long("feedback")
                        .help("Wire the amplifiers into a feedback ring")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("paint")
                .about("Run the hull-painting robot")
                .arg(program_arg())
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_parser(["black", "white"])
                        .default_value("black")
                        .help("Colour of the starting panel"),
                ),
        )
        .subcommand(
            Command::new("arcade")
                .about("Count blocks on the arcade screen, or play the game")
                .arg(program_arg())
                .arg(
                    Arg::new("play")
                        .long("play")
                        .help("Insert a coin and play until every block is gone")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("explore")
                .about("Map the maze with the repair droid")
                .arg(program_arg()),
        )
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    config::init();
    debug!("configuration: {:?}", *CONFIG);

    if let Err(err) = dispatch(&matches).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn dispatch(matches: &ArgMatches) -> Result<(), AppError> {
    let as_json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("run", sub)) => run_program(sub, as_json).await,
        Some(("alarm", sub)) => run_alarm(sub, as_json).await,
        Some(("amplify", sub)) => run_amplify(sub, as_json).await,
        Some(("paint", sub)) => run_paint(sub, as_json).await,
        Some(("arcade", sub)) => run_arcade(sub, as_json).await,
        Some(("explore", sub)) => run_explore(sub, as_json).await,
        _ => Err("No subcommand given".into()),
    }
}

fn load(sub: &ArgMatches) -> Result<Vec<i64>, AppError> {
    let path = sub
        .get_one::<String>("program")
        .ok_or("Missing --program")?;
    let image = load_program(path)?;
    debug!("loaded {} words from {}", image.len(), path);
    Ok(image)
}

fn parse_list(list: &str) -> Result<Vec<i64>, AppError> {
    list.split(',')
        .map(|token| {
            token
                .trim()
                .parse()
                .map_err(|_| AppError::Other(format!("Invalid phase '{}'", token.trim())))
        })
        .collect()
}

async fn run_program(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;
    let inputs: Vec<i64> = sub
        .get_many::<i64>("input")
        .map(|values| values.copied().collect())
        .unwrap_or_default();
    let set: InstructionSet = sub
        .get_one::<String>("set")
        .map(String::as_str)
        .unwrap_or("full")
        .parse()?;

    let outputs = diagnostic::run_with_inputs(image, &inputs, set).await?;

    if as_json {
        println!("{}", serde_json::to_string(&json!({ "outputs": outputs }))?);
    } else {
        for value in outputs {
            println!("{}", value);
        }
    }
    Ok(())
}

async fn run_alarm(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;

    if let Some(&target) = sub.get_one::<i64>("target") {
        let answer = diagnostic::find_noun_verb(&image, target).await?;
        if as_json {
            let result = json!({ "target": target, "noun": answer / 100, "verb": answer % 100, "answer": answer });
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("{}", answer);
        }
        return Ok(());
    }

    let noun = sub.get_one::<i64>("noun").copied().unwrap_or(12);
    let verb = sub.get_one::<i64>("verb").copied().unwrap_or(2);
    let value = diagnostic::run_patched(&image, noun, verb).await?;

    if as_json {
        let result = json!({ "noun": noun, "verb": verb, "value": value });
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

async fn run_amplify(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;
    let feedback = sub.get_flag("feedback");
    let phase_set = match sub.get_one::<String>("phases") {
        Some(list) => parse_list(list)?,
        None if feedback => (5..=9).collect(),
        None => (0..=4).collect(),
    };

    let best = if feedback {
        amplifier::best_ring(&image, &phase_set).await?
    } else {
        amplifier::best_pipeline(&image, &phase_set).await?
    };

    if as_json {
        println!("{}", serde_json::to_string(&best)?);
    } else {
        println!("{}", best.signal);
    }
    Ok(())
}

async fn run_paint(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;
    let start = match sub.get_one::<String>("start").map(String::as_str) {
        Some("white") => Color::White,
        _ => Color::Black,
    };

    let hull = painter::paint(image, start, CONFIG.quiet_period).await?;

    if as_json {
        let result = json!({
            "painted": hull.painted(),
            "white": hull.white_panels(),
            "image": hull.render(),
        });
        println!("{}", serde_json::to_string(&result)?);
    } else if start == Color::White {
        println!("{}", hull.render());
    } else {
        println!("{}", hull.painted());
    }
    Ok(())
}

async fn run_arcade(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;

    if sub.get_flag("play") {
        let game = arcade::play(image, CONFIG.quiet_period).await?;
        if as_json {
            println!("{}", serde_json::to_string(&game)?);
        } else {
            println!("{}", game.score);
        }
    } else {
        let blocks = arcade::count_blocks(image).await?;
        if as_json {
            println!("{}", serde_json::to_string(&json!({ "blocks": blocks }))?);
        } else {
            println!("{}", blocks);
        }
    }
    Ok(())
}

async fn run_explore(sub: &ArgMatches, as_json: bool) -> Result<(), AppError> {
    let image = load(sub)?;
    let map = droid::explore_program(image, CONFIG.quiet_period).await?;

    let shortest = map
        .shortest_path()
        .ok_or("Droid never found the oxygen system")?;
    let fill = map.fill_time().unwrap_or(0);

    if as_json {
        let result = json!({
            "shortest_path": shortest,
            "fill_time": fill,
            "map": map.render(),
        });
        println!("{}", serde_json::to_string(&result)?);
    } else {
        println!("{}", map.render());
        println!("shortest path: {}", shortest);
        println!("fill time: {}", fill);
    }
    Ok(())
}
