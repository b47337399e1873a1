use std::error::Error;
use std::fs;
use std::process;
use std::time::Duration;

use clap::{App, Arg, ArgGroup, ArgMatches};
use log::debug;

use sokoban_planner::config::{Decoding, Format, GoalSteps, Method, Scoring, SolverConfig};
use sokoban_planner::level::Level;
use sokoban_planner::parser;
use sokoban_planner::solver::{self, Plan, Planner, SatPlanner, SatSession, SolverErr};
use sokoban_planner::LoadLevel;

const DEFAULT_HORIZON: &str = "40";

fn main() {
    env_logger::init();

    let matches = App::new("sokoban-planner")
        .author("martin-t")
        .version("0.1")
        .about("Solves sokoban levels using best-first search or a SAT solver")
        .arg(
            Arg::with_name("search")
                .short("s")
                .long("search")
                .help("best-first search over states (default)"),
        )
        .arg(
            Arg::with_name("sat")
                .long("sat")
                .help("bounded planning formula solved by CaDiCaL"),
        )
        .group(ArgGroup::with_name("method").arg("search").arg("sat"))
        .arg(
            Arg::with_name("horizon")
                .short("t")
                .long("horizon")
                .takes_value(true)
                .default_value(DEFAULT_HORIZON)
                .help("number of timesteps the SAT formula covers"),
        )
        .arg(
            Arg::with_name("increase-horizon")
                .long("increase-horizon")
                .requires("sat")
                .help("try horizons 0, 1, ... up to --horizon until one is satisfiable"),
        )
        .arg(
            Arg::with_name("depth-only")
                .long("depth-only")
                .conflicts_with("sat")
                .help("rank search states by depth alone, finds the fewest moves"),
        )
        .arg(
            Arg::with_name("max-states")
                .long("max-states")
                .takes_value(true)
                .help("stop the search after creating this many states (default 5 000 000)"),
        )
        .arg(
            Arg::with_name("unlimited")
                .long("unlimited")
                .conflicts_with("max-states")
                .help("don't limit the number of search states"),
        )
        .arg(
            Arg::with_name("time-limit")
                .long("time-limit")
                .takes_value(true)
                .help("give up after this many seconds"),
        )
        .arg(
            Arg::with_name("any-step")
                .long("any-step")
                .help("accept the goal at any timestep, not just the last one"),
        )
        .arg(
            Arg::with_name("decode-workers")
                .long("decode-workers")
                .help("decode the SAT model from worker positions instead of actions"),
        )
        .arg(
            Arg::with_name("solutions")
                .short("n")
                .long("solutions")
                .takes_value(true)
                .requires("sat")
                .conflicts_with("increase-horizon")
                .help("print up to this many different SAT solutions"),
        )
        .arg(
            Arg::with_name("custom")
                .short("c")
                .long("custom")
                .help("parse and print using the custom format"),
        )
        .arg(
            Arg::with_name("xsb")
                .short("x")
                .long("xsb")
                .help("parse and print using XSB format (default is to detect it)"),
        )
        .group(ArgGroup::with_name("format").arg("custom").arg("xsb"))
        .arg(
            Arg::with_name("steps")
                .long("steps")
                .help("print the level after every move, not just pushes"),
        )
        .arg(Arg::with_name("file").required(true))
        .get_matches();

    if let Err(err) = run(&matches) {
        println!("{}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> Result<(), Box<dyn Error>> {
    let format = if matches.is_present("custom") {
        Some(Format::Custom)
    } else if matches.is_present("xsb") {
        Some(Format::Xsb)
    } else {
        None
    };
    let config = solver_config(matches)?;
    let include_steps = matches.is_present("steps");
    let path = matches.value_of("file").ok_or("Missing level file")?;

    let level = load(path, format)
        .map_err(|err| format!("Can't load level {}: {}", path, err))?;
    let format = format.unwrap_or(Format::Xsb);
    debug!("Config: {:?}", config);

    println!("Solving {}...", path);
    if let Some(solutions) = matches.value_of("solutions") {
        let solutions: usize = solutions.parse()?;
        let mut session = SatSession::new(&level, config.horizon, config.sat);
        for i in 0..solutions {
            if i > 0 {
                println!();
            }
            let finished = print_result(&level, session.next_plan(), include_steps, format)?;
            if !finished {
                break;
            }
        }
        return Ok(());
    }

    let result = if matches.is_present("increase-horizon") {
        increasing_horizon(&level, &config)
    } else {
        solver::planner(&config).plan(&level, config.horizon)
    };
    print_result(&level, result, include_steps, format)?;
    Ok(())
}

fn solver_config(matches: &ArgMatches<'_>) -> Result<SolverConfig, Box<dyn Error>> {
    let method = if matches.is_present("sat") {
        Method::Sat
    } else {
        Method::Search
    };
    let horizon = matches.value_of("horizon").unwrap_or(DEFAULT_HORIZON).parse()?;
    let mut config = SolverConfig::new(method, horizon);

    if let Some(max_states) = matches.value_of("max-states") {
        config.search.max_states = Some(max_states.parse()?);
    }
    if matches.is_present("unlimited") {
        config.search.max_states = None;
    }
    if let Some(secs) = matches.value_of("time-limit") {
        let limit = Duration::from_secs(secs.parse()?);
        config.search.time_limit = Some(limit);
        config.sat.time_limit = Some(limit);
    }
    if matches.is_present("depth-only") {
        config.scoring = Scoring::Depth;
    }
    if matches.is_present("any-step") {
        config.sat.goal_steps = GoalSteps::Any;
    }
    if matches.is_present("decode-workers") {
        config.sat.decoding = Decoding::WorkerPositions;
    }
    Ok(config)
}

fn load(path: &str, format: Option<Format>) -> Result<Level, Box<dyn Error>> {
    match format {
        None => path.load_level(),
        Some(format) => {
            let text = fs::read_to_string(path)?;
            Ok(parser::parse_format(&text, format)?)
        }
    }
}

/// Retries with a longer horizon while the formula is unsatisfiable
fn increasing_horizon(level: &Level, config: &SolverConfig) -> Result<Plan, SolverErr> {
    let planner = SatPlanner {
        options: config.sat,
    };
    for horizon in 0..config.horizon {
        match planner.plan(level, horizon) {
            Err(SolverErr::NoSolution) => debug!("Horizon {} is too short", horizon),
            result => return result,
        }
    }
    planner.plan(level, config.horizon)
}

/// Prints the plan or why there is none.
///
/// Returns whether a plan was found, solver defects are errors.
fn print_result(
    level: &Level,
    result: Result<Plan, SolverErr>,
    include_steps: bool,
    format: Format,
) -> Result<bool, Box<dyn Error>> {
    match result {
        Ok(plan) => {
            println!("Found solution:");
            print!("{}", level.solution(&plan.moves, include_steps, format));
            println!("{}", plan.moves);
            println!("Moves: {}", plan.moves.move_cnt());
            println!("Pushes: {}", plan.moves.push_cnt());
            println!();
            print!("{}", plan.stats);
            Ok(true)
        }
        Err(SolverErr::NoSolution) => {
            println!("No solution");
            Ok(false)
        }
        Err(SolverErr::ResourceExhausted) => {
            println!("Gave up: {}", SolverErr::ResourceExhausted);
            Ok(false)
        }
        Err(err) => Err(Box::new(err)),
    }
}
