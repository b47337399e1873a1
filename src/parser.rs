use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::config::Format;
use crate::data::{MapCell, Pos};
use crate::level::Level;
use crate::state::State;
use crate::vec2d::Vec2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErr {
    Pos(usize, usize),
    MultiplePlayers,
    NoPlayer,
    BoxesGoals,
}

impl Display for ParserErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ParserErr::Pos(r, c) => write!(f, "Invalid cell at pos: [{}, {}]", r, c),
            ParserErr::MultiplePlayers => write!(f, "More than one player"),
            ParserErr::NoPlayer => write!(f, "No player"),
            ParserErr::BoxesGoals => write!(f, "Different number of boxes and goals"),
        }
    }
}

impl Error for ParserErr {}

impl FromStr for Level {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Detects the format - anything with `<>` walls is custom, everything else XSB
pub fn parse(level: &str) -> Result<Level, ParserErr> {
    if level.trim_start().contains('<') {
        parse_format(level, Format::Custom)
    } else {
        parse_format(level, Format::Xsb)
    }
}

pub fn parse_format(level: &str, format: Format) -> Result<Level, ParserErr> {
    // trim so we can specify levels using raw strings more easily
    let level = level.trim_matches('\n').trim_end();

    let mut parsed = Parsed::default();
    match format {
        Format::Custom => parse_custom(level, &mut parsed)?,
        Format::Xsb => parse_xsb(level, &mut parsed)?,
    }

    let player_pos = parsed.player_pos.ok_or(ParserErr::NoPlayer)?;
    if parsed.boxes.len() != parsed.goals.len() {
        return Err(ParserErr::BoxesGoals);
    }

    Ok(Level::new(
        Vec2d::new(&parsed.grid),
        parsed.goals,
        State::new(player_pos, parsed.boxes),
    ))
}

#[derive(Default)]
struct Parsed {
    grid: Vec<Vec<MapCell>>,
    goals: Vec<Pos>,
    boxes: Vec<Pos>,
    player_pos: Option<Pos>,
}

impl Parsed {
    fn set_player(&mut self, pos: Pos) -> Result<(), ParserErr> {
        if self.player_pos.is_some() {
            return Err(ParserErr::MultiplePlayers);
        }
        self.player_pos = Some(pos);
        Ok(())
    }
}

/// Parses my custom format
fn parse_custom(level: &str, parsed: &mut Parsed) -> Result<(), ParserErr> {
    for (r, line) in level.lines().enumerate() {
        parsed.grid.push(Vec::new());
        let mut chars = line.chars();
        while let (Some(c1), Some(c2)) = (chars.next(), chars.next()) {
            let c = parsed.grid[r].len();
            let pos = Pos::new(r as i32, c as i32);

            match c1 {
                '<' => {
                    if c2 != '>' {
                        return Err(ParserErr::Pos(r, c));
                    }
                    parsed.grid[r].push(MapCell::Wall);
                    continue; // skip parsing c2
                }
                ' ' => {}
                'B' => parsed.boxes.push(pos),
                'P' => parsed.set_player(pos)?,
                _ => return Err(ParserErr::Pos(r, c)),
            }
            match c2 {
                ' ' => parsed.grid[r].push(MapCell::Empty),
                '_' => {
                    parsed.goals.push(pos);
                    parsed.grid[r].push(MapCell::Goal);
                }
                _ => return Err(ParserErr::Pos(r, c)),
            }
        }
    }

    Ok(())
}

/// Parses (a subset of) the format described [here](http://www.sokobano.de/wiki/index.php?title=Level_format)
fn parse_xsb(level: &str, parsed: &mut Parsed) -> Result<(), ParserErr> {
    for (r, line) in level.lines().enumerate() {
        let mut line_tiles = Vec::new();
        for (c, cur_char) in line.chars().enumerate() {
            let pos = Pos::new(r as i32, c as i32);

            let tile = match cur_char {
                '#' => MapCell::Wall,
                'p' | '@' => {
                    parsed.set_player(pos)?;
                    MapCell::Empty
                }
                'P' | '+' => {
                    parsed.set_player(pos)?;
                    parsed.goals.push(pos);
                    MapCell::Goal
                }
                'b' | '$' => {
                    parsed.boxes.push(pos);
                    MapCell::Empty
                }
                'B' | '*' => {
                    parsed.boxes.push(pos);
                    parsed.goals.push(pos);
                    MapCell::Goal
                }
                '.' => {
                    parsed.goals.push(pos);
                    MapCell::Goal
                }
                ' ' | '-' | '_' => MapCell::Empty,
                _ => return Err(ParserErr::Pos(r, c)),
            };
            line_tiles.push(tile);
        }
        parsed.grid.push(line_tiles)
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_levels() {
        let cases: &[(&str, ParserErr)] = &[
            ("", ParserErr::NoPlayer),
            ("<><><><>\n<>B  _<>\n<><><><>", ParserErr::NoPlayer),
            ("<><><><><>\n<>P   P <>\n<><><><><>", ParserErr::MultiplePlayers),
            ("<><><><>\n<>P B <>\n<><>B_<>", ParserErr::BoxesGoals),
            ("<><><>\n<>P <>\n<>x <>", ParserErr::Pos(2, 1)),
            ("<><><>\n<>P <>\n<>< <>", ParserErr::Pos(2, 1)),
            ("######\n#@ $?#\n######", ParserErr::Pos(1, 4)),
            ("#######\n#@ .$+#\n#######", ParserErr::MultiplePlayers),
            ("#####\n#.$$#\n#@###", ParserErr::BoxesGoals),
            ("  ###\n  #.#", ParserErr::NoPlayer),
        ];
        for &(text, expected) in cases {
            assert_eq!(text.parse::<Level>().unwrap_err(), expected, "{:?}", text);
        }
    }

    #[test]
    fn custom_cells() {
        // worker starts on a dock
        let level = r"
<><><><><><>
<>P_B     <>
<>B_  B  _<>
<><><><><><>
";
        let parsed = assert_custom_round_trip(level);
        assert_eq!(parsed.docks().len(), 3);
        assert_eq!(parsed.initial_boxes().len(), 3);
        assert_eq!(parsed.initial_worker(), Pos::new(1, 1));
    }

    #[test]
    fn xsb_alternative_chars() {
        let level = parse_format("######\n#P_b-#\n#-B--#\n######", Format::Xsb).unwrap();
        assert_eq!(level.to_string(), "######\n#+ $ #\n# *  #\n######\n");
        assert_eq!(level.initial_worker(), Pos::new(1, 1));
    }

    #[test]
    fn xsb_open_edges() {
        let level = r"
  ####
###  #
#@$ *#
#  . #
######
";
        assert_xsb_round_trip(level);
    }

    #[test]
    fn xsb_irregular_rows() {
        let level = r"
    #####
    #   #
    #$  #
  ###  $##
  #  $ $ #
### # ## #   ######
#   # ## #####  ..#
# $  $          ..#
##### ### #@##  ..#
    #     #########
    #######
";
        let parsed = assert_xsb_round_trip(level);
        assert_eq!(parsed.rows(), 11);
        assert_eq!(parsed.cols(), 19);
        assert_eq!(parsed.docks().len(), 6);
    }

    #[test]
    fn format_detection() {
        let custom = "<><><><><>\n<>P B  _<>\n<><><><><>";
        let xsb = "#####\n#@$.#\n#####";
        let from_custom = parse(custom).unwrap();
        assert_eq!(from_custom.custom().to_string(), format!("{}\n", custom));
        assert_eq!(from_custom.to_string(), parse(xsb).unwrap().to_string());
        assert_eq!(parse_format(xsb, Format::Custom).unwrap_err(), ParserErr::Pos(0, 0));
    }

    fn assert_custom_round_trip(text: &str) -> Level {
        let level = parse_format(text, Format::Custom).unwrap();
        assert_eq!(level.custom().to_string(), text.trim_start_matches('\n'));
        level
    }

    fn assert_xsb_round_trip(text: &str) -> Level {
        let level = parse_format(text, Format::Xsb).unwrap();
        assert_eq!(level.to_string(), text.trim_start_matches('\n'));
        level
    }
}
