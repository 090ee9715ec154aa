use cm_graphs::{ChartRequest, Charts, normalized_config};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Chart(cm_graphs::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Chart(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<cm_graphs::Error> for CliError {
    fn from(value: cm_graphs::Error) -> Self {
        Self::Chart(value)
    }
}

impl From<cm_graphs::core::Error> for CliError {
    fn from(value: cm_graphs::core::Error) -> Self {
        Self::Chart(value.into())
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
    Config,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
}

fn usage() -> &'static str {
    "cm-graphs\n\
\n\
USAGE:\n\
  cm-graphs [layout] [--pretty] [<request.json>|-]\n\
  cm-graphs config [--pretty] [<request.json>|-]\n\
\n\
NOTES:\n\
  - If <request.json> is omitted or '-', the request is read from stdin.\n\
  - A request is {\"config\": {\"type\": ...}, \"data\": ..., \"width\": <w>, \"height\": <h>}.\n\
  - layout prints the chart layout; config prints the configuration merged over its defaults.\n\
  - Set RUST_LOG (for example RUST_LOG=debug) to log layout passes on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" | "config" if !command_seen && args.input.is_none() => {
                args.command = if a == "layout" {
                    Command::Layout
                } else {
                    Command::Config
                };
                command_seen = true;
            }
            "--pretty" => args.pretty = true,
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
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(a.clone());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    std::io::Write::write_all(&mut out, b"\n")?;
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let request = ChartRequest::from_json(&text)?;

    match args.command {
        Command::Layout => {
            let layout = Charts::new().layout(&request)?;
            tracing::info!(
                chart = %layout.kind(),
                generation = layout.generation(),
                "layout computed"
            );
            write_json(&layout, args.pretty)
        }
        Command::Config => {
            let config = normalized_config(&request)?.to_value()?;
            write_json(&config, args.pretty)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
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
    init_logging();

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("cm-graphs")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn layout_is_the_default_command() {
        let args = parse_args(&argv(&["request.json"])).unwrap();
        assert!(matches!(args.command, Command::Layout));
        assert_eq!(args.input.as_deref(), Some("request.json"));
        assert!(!args.pretty);
    }

    #[test]
    fn config_command_with_stdin() {
        let args = parse_args(&argv(&["config", "--pretty", "-"])).unwrap();
        assert!(matches!(args.command, Command::Config));
        assert_eq!(args.input.as_deref(), Some("-"));
        assert!(args.pretty);
    }

    #[test]
    fn a_file_named_like_a_command_is_still_an_input() {
        let args = parse_args(&argv(&["layout", "config"])).unwrap();
        assert!(matches!(args.command, Command::Layout));
        assert_eq!(args.input.as_deref(), Some("config"));
    }

    #[test]
    fn unknown_flags_and_extra_inputs_are_usage_errors() {
        assert!(matches!(
            parse_args(&argv(&["--width", "3"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["a.json", "b.json"])),
            Err(CliError::Usage(_))
        ));
    }
}
