use onelook::convert::{Format, ImportOptions};
use onelook::headless::{self, HeadlessError};
use onelook::layout::{Direction, LayoutConfig, LayoutOptions, Point};
use onelook::{ConnectionStyle, LayoutKind, Theme};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    InvalidValue { flag: &'static str, value: String },
    Io(std::io::Error),
    Headless(HeadlessError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::InvalidValue { flag, value } => {
                write!(f, "invalid value `{value}` for {flag}")
            }
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Headless(value)
    }
}

impl From<onelook::convert::Error> for CliError {
    fn from(value: onelook::convert::Error) -> Self {
        Self::Headless(value.into())
    }
}

impl From<onelook::layout::Error> for CliError {
    fn from(value: onelook::layout::Error) -> Self {
        Self::Headless(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Convert,
    Validate,
    Info,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    from: Option<Format>,
    to: Option<Format>,
    out: Option<String>,
    algorithm: Option<LayoutKind>,
    connector: Option<ConnectionStyle>,
    direction: Option<Direction>,
    center: Point,
    config: Option<String>,
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoOut<'a> {
    name: &'a str,
    format: &'static str,
    nodes: usize,
    depth: usize,
    layout: LayoutKind,
    theme: Theme,
}

fn usage() -> &'static str {
    "onelook-cli\n\
\n\
USAGE:\n\
  onelook-cli [layout] [--algorithm mind|tree|org|fishbone] [--connector curve|straight|polyline] [--direction right|left|both] [--center-x <n>] [--center-y <n>] [--config <json>|<path>] [--from <format>] [--pretty] [<path>|-]\n\
  onelook-cli convert --to <format> [--from <format>] [--out <path>] [<path>|-]\n\
  onelook-cli validate [--from <format>] [<path>|-]\n\
  onelook-cli info [--from <format>] [--pretty] [<path>|-]\n\
\n\
FORMATS:\n\
  json, onelook (.olook), opml, freemind (.mm), xmind, markdown (.md)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - The input format follows the file extension unless --from is given; stdin defaults to json.\n\
  - layout prints {nodes, connectors, bounds} as JSON.\n\
  - convert writes to stdout unless --out is given.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "convert" => args.command = Command::Convert,
            "validate" => args.command = Command::Validate,
            "info" => args.command = Command::Info,
            "--pretty" => args.pretty = true,
            "--from" => {
                args.from = Some(next_value(&mut it)?.parse::<Format>()?);
            }
            "--to" => {
                args.to = Some(next_value(&mut it)?.parse::<Format>()?);
            }
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--algorithm" => {
                let raw = next_value(&mut it)?;
                args.algorithm = Some(raw.parse::<LayoutKind>().map_err(|_| {
                    CliError::InvalidValue {
                        flag: "--algorithm",
                        value: raw.clone(),
                    }
                })?);
            }
            "--connector" => {
                let raw = next_value(&mut it)?;
                args.connector = Some(raw.parse::<ConnectionStyle>().map_err(|_| {
                    CliError::InvalidValue {
                        flag: "--connector",
                        value: raw.clone(),
                    }
                })?);
            }
            "--direction" => {
                args.direction = Some(next_value(&mut it)?.parse::<Direction>()?);
            }
            "--center-x" => {
                args.center.x = parse_coordinate("--center-x", next_value(&mut it)?)?;
            }
            "--center-y" => {
                args.center.y = parse_coordinate("--center-y", next_value(&mut it)?)?;
            }
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Convert) && args.to.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn parse_coordinate(flag: &'static str, raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::InvalidValue {
            flag,
            value: raw.to_string(),
        })
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read(path)?),
    }
}

fn input_format(args: &Args) -> Format {
    args.from
        .or_else(|| {
            args.input
                .as_deref()
                .filter(|p| *p != "-")
                .and_then(Format::from_file_name)
        })
        .unwrap_or(Format::Json)
}

fn import_options(args: &Args) -> ImportOptions {
    ImportOptions {
        file_name: args
            .input
            .as_deref()
            .filter(|p| *p != "-")
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned()),
    }
}

/// Inline JSON when the value looks like an object, otherwise a path to a JSON file.
fn load_config(raw: &str) -> Result<LayoutConfig, CliError> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw)?
    };
    Ok(LayoutConfig::from_json(&text)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_bytes(bytes: &[u8], out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
        Some(path) => std::fs::write(path, bytes)?,
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let bytes = read_input(args.input.as_deref())?;
    let from = input_format(&args);
    let options = import_options(&args);
    tracing::debug!(command = ?args.command, %from, bytes = bytes.len(), "running");

    match args.command {
        Command::Layout => {
            let mut config = match args.config.as_deref() {
                Some(raw) => load_config(raw)?,
                None => LayoutConfig::default(),
            };
            if let Some(direction) = args.direction {
                config.direction = direction;
            }
            let layout_options = LayoutOptions {
                config,
                center: args.center,
                ..LayoutOptions::default()
            };
            let document = headless::open(from, &bytes, &options)?;
            let layout = onelook::layout::layout_document(
                &document,
                args.algorithm,
                args.connector,
                &layout_options,
            );
            write_json(&layout, args.pretty)
        }
        Command::Convert => {
            let Some(to) = args.to else {
                return Err(CliError::Usage(usage()));
            };
            let out = headless::convert(from, to, &bytes, &options)?;
            write_bytes(&out, args.out.as_deref())
        }
        Command::Validate => {
            let document = onelook::convert::import(from, &bytes, &options)?;
            println!("ok: {} nodes ({from})", document.root.count());
            Ok(())
        }
        Command::Info => {
            let document = onelook::convert::import(from, &bytes, &options)?;
            let info = InfoOut {
                name: &document.name,
                format: from.info().name,
                nodes: document.root.count(),
                depth: document.root.max_depth(),
                layout: document.layout,
                theme: document.theme,
            };
            write_json(&info, args.pretty)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("onelook-cli: diagnostics disabled: {err}");
    }
}

fn main() {
    init_tracing();

    // Malformed command lines exit 2; well-formed ones with bad values fail like runtime errors.
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
