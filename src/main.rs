#[macro_use]
extern crate log;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use generic_rpc_codec::error::Result;
use generic_rpc_codec::xmlrpc::{Fault, MethodResponse, Request, Response};

use crate::config::{Config, Conversion};

mod config;

#[derive(Parser)]
#[command(
    name = "grc",
    version,
    about = "Converts RPC requests and responses between XML-RPC and JSON"
)]
struct Cli {
    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a JSON request and print it as an XML-RPC methodCall
    XmlRequest { input: Option<PathBuf> },
    /// Read an XML-RPC methodCall and print it as a JSON request
    JsonRequest { input: Option<PathBuf> },
    /// Read an XML-RPC methodResponse and print its values as JSON
    Response { input: Option<PathBuf> },
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Config {
        let (conversion, input) = match cli.command {
            Commands::XmlRequest { input } => (Conversion::XmlRequest, input),
            Commands::JsonRequest { input } => (Conversion::JsonRequest, input),
            Commands::Response { input } => (Conversion::Response, input),
        };
        Config {
            conversion,
            input,
            verbose: cli.verbose,
        }
    }
}

fn main() {
    let config = Config::from(Cli::parse());

    // Init logging to DEBUG only if user required it
    let mut logger = env_logger::Builder::from_default_env();
    if config.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&config) {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn run(config: &Config) -> Result<i32> {
    debug!("Conversion: {:?}", config.conversion);
    let body = config.read_input()?;
    let mut out = io::stdout().lock();

    match config.conversion {
        Conversion::XmlRequest => {
            let request = Request::from_json(&body)?;
            out.write_all(&request.to_xml())?;
            writeln!(out)?;
        }
        Conversion::JsonRequest => {
            let request = Request::from_xml(&body)?;
            out.write_all(&request.to_json()?)?;
            writeln!(out)?;
        }
        Conversion::Response => match Response::new(body).parse()? {
            MethodResponse::Params(values) => {
                for value in values {
                    serde_json::to_writer(&mut out, &value)?;
                    writeln!(out)?;
                }
            }
            MethodResponse::Fault(value) => {
                match Fault::from_value(&value) {
                    Some(fault) => eprintln!("fault {}: {}", fault.code, fault.string),
                    None => eprintln!("fault: {}", serde_json::to_string(&value)?),
                }
                return Ok(1);
            }
        },
    }

    out.flush()?;
    Ok(0)
}
