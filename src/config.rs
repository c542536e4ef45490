use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Which document `grc` reads, and what it turns it into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// JSON request in, XML `<methodCall>` out.
    XmlRequest,
    /// XML `<methodCall>` in, JSON request out.
    JsonRequest,
    /// XML `<methodResponse>` in, one JSON value object per line out.
    Response,
}

pub struct Config {
    pub conversion: Conversion,
    /// Read from stdin when absent.
    pub input: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    pub fn read_input(&self) -> io::Result<Vec<u8>> {
        match self.input {
            Some(ref path) => {
                debug!("Reading {}", path.display());
                fs::read(path)
            }
            None => {
                debug!("Reading stdin");
                let mut body = Vec::new();
                io::stdin().lock().read_to_end(&mut body)?;
                Ok(body)
            }
        }
    }
}
