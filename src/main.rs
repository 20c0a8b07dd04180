//! tmplvars CLI
//!
//! Usage:
//!   tmplvars [OPTIONS] [MESSAGE]
//!
//! Options:
//!   -f, --file <PATH>        Read the message from a file
//!   -c, --config <FILE>      Registry configuration (TOML format)
//!       --now <RFC3339>      Freeze the clock at this instant
//!       --local-tz <NAME>    Zone for today_date / yesterday_date
//!       --strict             Report errors instead of echoing the message
//!   -l, --list               List the available functions
//!   -v, --verbose            Raise log level (repeatable)
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::info;

use tmplvars::{substitute, try_substitute, Builtin, Config, SubstituteError};

#[derive(Parser)]
#[command(name = "tmplvars")]
#[command(about = "Expand ${function args} date placeholders in a message")]
struct Cli {
    /// Message to expand (reads from --file or stdin if not provided)
    message: Option<String>,

    /// Read the message from a file
    #[arg(short, long, conflicts_with = "message")]
    file: Option<PathBuf>,

    /// Registry configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed current time as an RFC 3339 timestamp
    #[arg(long)]
    now: Option<String>,

    /// Zone used by today_date and yesterday_date
    #[arg(long)]
    local_tz: Option<String>,

    /// Print the diagnostic and exit 1 when the message cannot be expanded
    #[arg(long)]
    strict: bool,

    /// List the available functions
    #[arg(short, long)]
    list: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if cli.list {
        print_functions();
        return;
    }

    if cli.message.is_none() && cli.file.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Load config, then apply command line overrides
    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(zone) = &cli.local_tz {
        config = config.with_local_timezone(zone.clone());
    }
    if let Some(now) = &cli.now {
        config = config.with_now(now.clone());
    }

    let registry = match config.build_registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Local zone is {}", registry.local_zone());

    // Read input
    let (message, filename) = match (&cli.message, &cli.file) {
        (Some(message), _) => (message.clone(), "<message>".to_string()),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        (None, None) => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    if !cli.strict {
        print!("{}", substitute(&message, &registry));
        return;
    }

    match try_substitute(&message, &registry) {
        Ok(out) => print!("{}", out),
        Err(SubstituteError::Parse(errors)) => {
            for err in &errors {
                eprint!("{}", err.format(&message, &filename));
            }
            std::process::exit(1);
        }
        Err(e @ SubstituteError::Exec(_)) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_functions() {
    for builtin in Builtin::ALL {
        println!("{}", builtin.signature());
    }
}

fn print_intro() {
    println!(
        r#"tmplvars - date placeholders for messages

USAGE:
    tmplvars [OPTIONS] [MESSAGE]
    echo '<message>' | tmplvars

OPTIONS:
    -f, --file       Read the message from a file
    -c, --config     Registry configuration (TOML file)
    --now            Freeze the clock (RFC 3339)
    --local-tz       Zone for today_date / yesterday_date
    --strict         Report errors instead of echoing the message
    -l, --list       List the available functions
    -v, --verbose    Raise log level (repeatable)
    -h, --help       Print help

QUICK START:
    tmplvars 'Report for ${{yesterday "Mon Jan 2" "Europe/Berlin"}}'

Layouts use the reference time Mon Jan 2 15:04:05 MST 2006."#
    );
}
