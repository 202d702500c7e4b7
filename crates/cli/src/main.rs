use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clopts::{Matches, OptionDefinition, OptionName, Parser, TRAILING_KEY, convert, processor};
use clopts_schema::Schema;
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "\
clopts - parse a command line against a JSON option schema

Usage: clopts [OPTIONS] [--] [ARGS]...

Options:
  -s, --schema <FILE>      Option schema to parse ARGS with [default: clopts.json]
  -j, --json               Print the result as a JSON object
      --log-level <LEVEL>  Log filter (overrides RUST_LOG) [default: warn]
  -h, --help               Show help information

Option scanning stops at the first argument that is not one of the options
above, so put `--` before ARGS when they start with an option.
";

/// Exit status for command lines that fail to parse.
const USAGE_ERROR: u8 = 2;

struct Cli {
    schema: PathBuf,
    json: bool,
    log_level: Option<String>,
    help: bool,
    args: Vec<String>,
}

fn cli_parser() -> clopts::Result<Parser> {
    Ok(Parser::new()
        .option(
            OptionDefinition::replace(
                OptionName::both("schema", 's')?,
                processor::required(convert::path()),
            )
            .with_default(PathBuf::from("clopts.json")),
        )
        .option(
            OptionDefinition::replace(OptionName::both("json", 'j')?, processor::flag())
                .with_default(false),
        )
        .option(OptionDefinition::replace(
            OptionName::long("log-level")?,
            processor::required(convert::string()),
        ))
        .option(
            OptionDefinition::replace(OptionName::both("help", 'h')?, processor::flag())
                .with_default(false),
        ))
}

impl Cli {
    fn from_matches(m: &Matches) -> clopts::Result<Self> {
        Ok(Self {
            schema: m.get("schema")?,
            json: m.get("json")?,
            log_level: m.get_optional("log-level")?,
            help: m.get("help")?,
            args: m.get(TRAILING_KEY)?,
        })
    }
}

fn main() -> ExitCode {
    let cli = match cli_parser()
        .and_then(|parser| parser.parse_env())
        .and_then(|m| Cli::from_matches(&m))
    {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    if cli.help {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.log_level.as_deref());

    let parser = match load_parser(&cli) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let m = match parser.parse(cli.args.iter().cloned()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    match print_matches(&cli, &parser, &m) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_parser(cli: &Cli) -> Result<Parser> {
    tracing::debug!(schema = %cli.schema.display(), "loading option schema");
    let schema = Schema::from_file(&cli.schema)?;
    schema
        .to_parser()
        .with_context(|| format!("invalid schema in {}", cli.schema.display()))
}

/// Print one line per matched option (canonical name only) and the trailing
/// arguments, or the same as a JSON object.
fn print_matches(cli: &Cli, parser: &Parser, m: &Matches) -> Result<()> {
    let canonical: Vec<String> = parser
        .definitions()
        .iter()
        .map(|d| d.name().canonical())
        .collect();

    if cli.json {
        let mut object = serde_json::Map::new();
        for name in &canonical {
            if let Some(value) = m.value(name) {
                object.insert(name.clone(), serde_json::to_value(value)?);
            }
        }
        object.insert(TRAILING_KEY.to_string(), serde_json::json!(m.trailing()));
        println!("{}", serde_json::to_string_pretty(&object)?);
    } else {
        for name in &canonical {
            if let Some(value) = m.value(name) {
                println!("{name} = {value}");
            }
        }
        println!("{TRAILING_KEY} = {:?}", m.trailing());
    }

    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
