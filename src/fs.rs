use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::level::Level;
use crate::parser;
use crate::LoadLevel;

pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<String, Box<dyn Error>> {
    let mut file = File::open(path)?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

impl LoadLevel for str {
    /// Reads the file at this path, detecting the format from its contents
    fn load_level(&self) -> Result<Level, Box<dyn Error>> {
        let text = read_file(self)?;
        Ok(parser::parse(&text)?)
    }
}
