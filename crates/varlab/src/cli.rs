#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand and supports environment variable overrides via the
//! `VARLAB_*` prefix. Explicit flags beat environment variables, which beat
//! defaults.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
varlab - sort experimental variables into the right bucket

USAGE:
    varlab [OPTIONS]

OPTIONS:
    --level=N            Start on level N, 1-indexed (default: 1)
    --catalog=PATH       Load levels from a JSON catalog file
    --wrap               Start over at level 1 after the last level
    --no-mouse           Disable mouse event capture
    --ascii              Draw status icons as plain ASCII
    --exit-after-ms=N    Quit automatically after N milliseconds
    --log-file=PATH      Write JSON logs to PATH
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    mouse drag          Drag a variable from the pool onto a bucket
    Left / Right        Choose a variable in the pool
    a / s / d           Drop the chosen variable on bucket 1 / 2 / 3
    1-9                 Jump to a level
    n / Enter           Next level (after clearing)
    r                   Reset the level
    Esc                 Cancel a drag or dismiss the message
    q / Ctrl+C          Quit

ENVIRONMENT VARIABLES:
    VARLAB_LEVEL            Override --level
    VARLAB_CATALOG          Override --catalog
    VARLAB_WRAP             Set to 1 to enable --wrap
    VARLAB_ASCII            Set to 1 to enable --ascii
    VARLAB_EXIT_AFTER_MS    Override --exit-after-ms
    VARLAB_LOG_FILE         Override --log-file
    VARLAB_LOG              Log filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Starting level (1-indexed).
    pub level: usize,
    /// Catalog file to load instead of the built-in levels.
    pub catalog: Option<PathBuf>,
    /// Wrap to level 1 after the last level instead of finishing.
    pub wrap: bool,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Status icons without Unicode symbols.
    pub ascii: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// JSON log destination. Logging is off without one.
    pub log_file: Option<PathBuf>,
    /// `EnvFilter` directives for the log.
    pub log_filter: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            level: 1,
            catalog: None,
            wrap: false,
            mouse: true,
            ascii: false,
            exit_after_ms: 0,
            log_file: None,
            log_filter: "info".into(),
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

fn truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(flag: &str, val: &str) -> Result<T, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}

/// Parse `args` (without the program name) on top of environment values
/// looked up through `var`.
///
/// # Errors
///
/// Returns a message for unknown flags and malformed numbers.
pub fn parse_args<I, S, F>(args: I, var: F) -> Result<Parsed, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    // Environment first
    if let Some(val) = var("VARLAB_LEVEL")
        && let Ok(n) = val.parse()
    {
        opts.level = n;
    }
    if let Some(val) = var("VARLAB_CATALOG")
        && !val.is_empty()
    {
        opts.catalog = Some(PathBuf::from(val));
    }
    if let Some(val) = var("VARLAB_WRAP") {
        opts.wrap = truthy(&val);
    }
    if let Some(val) = var("VARLAB_ASCII") {
        opts.ascii = truthy(&val);
    }
    if let Some(val) = var("VARLAB_EXIT_AFTER_MS")
        && let Ok(n) = val.parse()
    {
        opts.exit_after_ms = n;
    }
    if let Some(val) = var("VARLAB_LOG_FILE")
        && !val.is_empty()
    {
        opts.log_file = Some(PathBuf::from(val));
    }
    if let Some(val) = var("VARLAB_LOG")
        && !val.is_empty()
    {
        opts.log_filter = val;
    }

    // Flags override the environment
    for arg in args {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(Parsed::Help),
            "--version" | "-V" => return Ok(Parsed::Version),
            "--no-mouse" => opts.mouse = false,
            "--wrap" => opts.wrap = true,
            "--ascii" => opts.ascii = true,
            other => {
                if let Some(val) = other.strip_prefix("--level=") {
                    opts.level = parse_number("--level", val)?;
                } else if let Some(val) = other.strip_prefix("--catalog=") {
                    opts.catalog = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = parse_number("--exit-after-ms", val)?;
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else {
                    return Err(format!(
                        "Unknown argument: {other}\nRun with --help for usage information."
                    ));
                }
            }
        }
    }

    if opts.level == 0 {
        return Err("Invalid --level value: levels start at 1".into());
    }
    Ok(Parsed::Run(opts))
}

impl Opts {
    /// Parse the process arguments and environment, printing help or
    /// version and exiting when asked to.
    pub fn parse() -> Self {
        match parse_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("varlab {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                process::exit(1);
            }
        }
    }

    /// Zero-based start level.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.level.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str]) -> Opts {
        match parse_args(args.iter().copied(), no_env) {
            Ok(Parsed::Run(opts)) => opts,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = run(&[]);
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.start_index(), 0);
        assert!(opts.mouse);
        assert!(!opts.wrap);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run(&[
            "--level=3",
            "--catalog=levels.json",
            "--wrap",
            "--no-mouse",
            "--ascii",
            "--exit-after-ms=250",
            "--log-file=/tmp/varlab.log",
        ]);
        assert_eq!(opts.start_index(), 2);
        assert_eq!(opts.catalog, Some(PathBuf::from("levels.json")));
        assert!(opts.wrap);
        assert!(!opts.mouse);
        assert!(opts.ascii);
        assert_eq!(opts.exit_after_ms, 250);
        assert_eq!(opts.log_file, Some(PathBuf::from("/tmp/varlab.log")));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_args(["--help", "--bogus"], no_env), Ok(Parsed::Help));
        assert_eq!(parse_args(["-V"], no_env), Ok(Parsed::Version));
    }

    #[test]
    fn bad_input_is_an_error() {
        let err = parse_args(["--level=abc"], no_env).expect_err("bad number");
        assert!(err.contains("--level"));
        let err = parse_args(["--frobnicate"], no_env).expect_err("unknown flag");
        assert!(err.contains("Unknown argument"));
        assert!(parse_args(["--level=0"], no_env).is_err());
    }

    #[test]
    fn env_is_applied_and_flags_win() {
        let env: HashMap<&str, &str> = [
            ("VARLAB_LEVEL", "2"),
            ("VARLAB_WRAP", "yes"),
            ("VARLAB_ASCII", "on"),
            ("VARLAB_EXIT_AFTER_MS", "900"),
            ("VARLAB_LOG", "debug"),
            ("VARLAB_CATALOG", "env.json"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| (*v).to_string());

        let Ok(Parsed::Run(opts)) = parse_args(Vec::<String>::new(), lookup) else {
            panic!("expected Run");
        };
        assert_eq!(opts.level, 2);
        assert!(opts.wrap);
        assert!(opts.ascii);
        assert_eq!(opts.exit_after_ms, 900);
        assert_eq!(opts.log_filter, "debug");
        assert_eq!(opts.catalog, Some(PathBuf::from("env.json")));

        let Ok(Parsed::Run(opts)) = parse_args(["--level=4", "--catalog=flag.json"], lookup)
        else {
            panic!("expected Run");
        };
        assert_eq!(opts.level, 4);
        assert_eq!(opts.catalog, Some(PathBuf::from("flag.json")));
    }

    #[test]
    fn malformed_env_number_is_ignored() {
        let lookup = |k: &str| (k == "VARLAB_LEVEL").then(|| "many".to_string());
        let Ok(Parsed::Run(opts)) = parse_args(Vec::<String>::new(), lookup) else {
            panic!("expected Run");
        };
        assert_eq!(opts.level, 1);
    }

    #[test]
    fn help_mentions_env_vars() {
        assert!(HELP_TEXT.contains("VARLAB_LEVEL"));
        assert!(HELP_TEXT.contains("VARLAB_EXIT_AFTER_MS"));
        assert!(HELP_TEXT.contains("--catalog=PATH"));
    }
}
