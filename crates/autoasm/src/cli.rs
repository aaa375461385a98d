#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand. Environment variables with the `AUTOASM_` prefix
//! are applied first; explicit flags override them.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::programs::Program;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
autoasm - keep assembler stock at target levels

USAGE:
    autoasm [OPTIONS] [PROGRAM] [ARGS...]

PROGRAMS:
    assembler-control    Reconcile goals and disassemble surplus (default)
    list-item-ids        Print every stored item with its count

OPTIONS:
    --grid=PATH          Simulated grid snapshot (JSON, required)
    --plan=PATH          Stock plan (JSON); built-in goals when omitted
    --state=PATH         Launch counter file; in-memory when omitted
    --write-back         Save the grid (queues, panel text) after the run
    --log-json           Emit logs as JSON lines on stderr
    --help, -h           Show this help message
    --version, -V        Show version

Panel text is printed to stdout, one block per panel. Without panels the
transcript goes to stderr and the exit status is 1.

ENVIRONMENT VARIABLES:
    AUTOASM_GRID         Override --grid
    AUTOASM_PLAN         Override --plan
    AUTOASM_STATE        Override --state
    AUTOASM_PROGRAM      Default program name
    AUTOASM_LOG_JSON     Set to 1 for --log-json
    AUTOASM_LOG          Log filter (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Opts {
    pub program: Program,
    pub grid: Option<PathBuf>,
    pub plan: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub write_back: bool,
    pub log_json: bool,
    /// Free-form trailing arguments, joined with spaces.
    pub argument: String,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Opts),
    Help,
    Version,
}

fn truthy(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl Opts {
    /// Parse process arguments and environment, exiting on `--help`,
    /// `--version`, or a usage error.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Action::Run(opts)) => opts,
            Ok(Action::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Action::Version) => {
                println!("autoasm {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    /// Parse `args` with environment lookups through `var`.
    pub fn parse_from<I, F>(args: I, var: F) -> Result<Action, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = var("AUTOASM_GRID") {
            opts.grid = Some(val.into());
        }
        if let Some(val) = var("AUTOASM_PLAN") {
            opts.plan = Some(val.into());
        }
        if let Some(val) = var("AUTOASM_STATE") {
            opts.state = Some(val.into());
        }
        if let Some(val) = var("AUTOASM_PROGRAM") {
            opts.program = val.parse()?;
        }
        if let Some(val) = var("AUTOASM_LOG_JSON") {
            opts.log_json = truthy(&val);
        }

        let mut positional = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Action::Help),
                "--version" | "-V" => return Ok(Action::Version),
                "--write-back" => opts.write_back = true,
                "--log-json" => opts.log_json = true,
                "--" => {
                    positional.extend(args.by_ref());
                }
                other => {
                    if let Some(val) = other.strip_prefix("--grid=") {
                        opts.grid = Some(val.into());
                    } else if let Some(val) = other.strip_prefix("--plan=") {
                        opts.plan = Some(val.into());
                    } else if let Some(val) = other.strip_prefix("--state=") {
                        opts.state = Some(val.into());
                    } else if other.starts_with("--") {
                        return Err(format!("Unknown argument: {other}"));
                    } else {
                        positional.push(other.to_string());
                    }
                }
            }
        }

        let mut positional = positional.into_iter();
        if let Some(name) = positional.next() {
            opts.program = name.parse()?;
        }
        opts.argument = positional.collect::<Vec<_>>().join(" ");

        if opts.grid.is_none() {
            return Err("Missing --grid=PATH".into());
        }
        Ok(Action::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Action, String> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Opts::parse_from(args.iter().map(|a| a.to_string()), |k| env.get(k).cloned())
    }

    fn run_opts(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Action::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn grid_is_required() {
        assert_eq!(parse(&[], &[]), Err("Missing --grid=PATH".to_string()));
    }

    #[test]
    fn defaults_to_assembler_control() {
        let opts = run_opts(&["--grid=g.json"], &[]);
        assert_eq!(opts.program, Program::AssemblerControl);
        assert_eq!(opts.grid, Some(PathBuf::from("g.json")));
        assert_eq!(opts.plan, None);
        assert!(!opts.write_back);
        assert_eq!(opts.argument, "");
    }

    #[test]
    fn positional_program_and_trailing_args() {
        let opts = run_opts(
            &["--grid=g.json", "list-item-ids", "extra", "words", "--", "--raw"],
            &[],
        );
        assert_eq!(opts.program, Program::ListItemIds);
        assert_eq!(opts.argument, "extra words --raw");
    }

    #[test]
    fn flags_override_environment() {
        let opts = run_opts(
            &["--plan=cli.json", "--write-back"],
            &[
                ("AUTOASM_GRID", "env-grid.json"),
                ("AUTOASM_PLAN", "env-plan.json"),
                ("AUTOASM_STATE", "state.json"),
                ("AUTOASM_PROGRAM", "list-item-ids"),
                ("AUTOASM_LOG_JSON", "true"),
            ],
        );
        assert_eq!(opts.grid, Some(PathBuf::from("env-grid.json")));
        assert_eq!(opts.plan, Some(PathBuf::from("cli.json")));
        assert_eq!(opts.state, Some(PathBuf::from("state.json")));
        assert_eq!(opts.program, Program::ListItemIds);
        assert!(opts.log_json);
        assert!(opts.write_back);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--grid=g", "--help"], &[]), Ok(Action::Help));
        assert_eq!(parse(&["-V"], &[]), Ok(Action::Version));
    }

    #[test]
    fn unknown_flag_and_program_are_errors() {
        assert!(
            parse(&["--grid=g", "--frobnicate"], &[])
                .unwrap_err()
                .contains("--frobnicate")
        );
        assert!(
            parse(&["--grid=g", "reactor-control"], &[])
                .unwrap_err()
                .contains("reactor-control")
        );
    }

    #[test]
    fn help_text_lists_programs() {
        for program in Program::ALL {
            assert!(HELP_TEXT.contains(program.name()));
        }
        assert!(!VERSION.is_empty());
    }
}
