// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]
// Clippy
#![allow(unknown_lints)] // necessary because rustc doesn't know about clippy
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod level;
pub mod map_formatter;
pub mod moves;
pub mod parser;
pub mod solution_formatter;
pub mod solver;
pub mod state;

mod fs;
mod vec2d;

use std::error::Error;

use crate::config::SolverConfig;
use crate::level::Level;
use crate::solver::{Plan, SolverErr};

pub trait LoadLevel {
    fn load_level(&self) -> Result<Level, Box<dyn Error>>;
}

pub trait Solve {
    fn solve(&self, config: &SolverConfig) -> Result<Plan, SolverErr>;
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use separator::Separatable;

    use crate::config::Method::{self, Sat, Search};

    use super::*;

    /// Expected LURD, `None` if the level has no solution
    type Expected = Option<&'static str>;

    #[test]
    fn test_levels() {
        // (method, file, horizon, expected)
        let levels: &[(Method, &str, u32, Expected)] = &[
            (Search, "00-solved.txt", 0, Some("")),
            (Search, "01-simplest-custom.txt", 0, Some("R")),
            (Search, "01-simplest-xsb.txt", 0, Some("R")),
            (Search, "02-one-way.txt", 0, Some("UUU")),
            (Search, "02-one-way-xsb.txt", 0, Some("rRR")),
            (Search, "no-solution-cornered.txt", 0, None),
            (Sat, "00-solved.txt", 0, Some("")),
            (Sat, "01-simplest-custom.txt", 1, Some("R")),
            (Sat, "01-simplest-xsb.txt", 5, Some("R")),
            (Sat, "02-one-way.txt", 3, Some("UUU")),
            (Sat, "02-one-way-xsb.txt", 3, Some("rRR")),
            (Sat, "no-solution-cornered.txt", 8, None),
        ];

        let mut threads = Vec::new();
        for &(method, name, horizon, expected) in levels {
            threads.push(thread::spawn(move || {
                test_level(method, name, horizon, expected);
            }));
        }
        for t in threads {
            t.join().unwrap();
        }
    }

    fn test_level(method: Method, name: &str, horizon: u32, expected: Expected) {
        let level_path = format!("levels/custom/{}", name);
        let level = level_path.load_level().unwrap();

        let started = Instant::now();
        let result = level.solve(&SolverConfig::new(method, horizon));
        // innacurate, only useful to quickly see which levels are difficult
        println!(
            "Solved {} using {} in approximately {} ms",
            level_path,
            method,
            (started.elapsed().as_millis() as u64).separated_string(),
        );

        match (result, expected) {
            (Ok(plan), Some(lurd)) => {
                assert_eq!(plan.moves.to_string(), lurd, "{}", level_path);
                let end = level.replay(plan.controls()).unwrap();
                assert!(level.is_solved(&end));
            }
            (Err(SolverErr::NoSolution), None) => {}
            (Ok(plan), None) => panic!("{}: unexpected solution {:?}", level_path, plan),
            (Err(err), _) => panic!("{}: {}", level_path, err),
        }
    }

    #[test]
    fn two_boxes_both_methods() {
        let level = "levels/custom/03-two-boxes.txt".load_level().unwrap();
        let search = level.solve(&SolverConfig::new(Search, 0)).unwrap();
        let sat = level.solve(&SolverConfig::new(Sat, 12)).unwrap();
        for plan in &[search, sat] {
            let end = level.replay(plan.controls()).unwrap();
            assert!(level.is_solved(&end), "{:?}", plan);
            assert!(plan.moves.push_cnt() >= 4);
        }
    }
}
