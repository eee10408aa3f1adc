//! `leafkit` command line. With no subcommand it runs the fixed-sample demo;
//! the other subcommands expose each operation directly.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use zeroize::Zeroizing;

use leafkit::config::{
    load_flat_config, load_flat_config_lenient, parse_flat_config, parse_flat_config_lenient,
    LenientParse,
};
use leafkit::credentials::{format_credential_query, hash_secret, verify_secret};
use leafkit::telemetry::init_tracing;
use leafkit::{average_of_doubled_positives, average_of_doubled_positives_lossy, demo};

#[derive(Parser)]
#[command(name = "leafkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Positive-doubling average, credential query, and flat config utilities", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every operation on the built-in sample data
    Demo,

    /// Average the doubled strictly positive values
    Average {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,

        /// Divide even when nothing is positive (prints NaN)
        #[arg(long)]
        lossy: bool,
    },

    /// Print the legacy string-built user query (unsafe; for comparison only)
    FormatQuery { identifier: String, secret: String },

    /// Parse a flat key=value file ("-" for stdin)
    ParseConfig {
        #[arg(env = "LEAFKIT_CONFIG")]
        path: Option<PathBuf>,

        /// Skip malformed lines instead of failing
        #[arg(long)]
        lenient: bool,

        /// Print the mapping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hash a secret with Argon2id
    HashSecret { secret: String },

    /// Check a secret against an Argon2 PHC hash
    VerifySecret { secret: String, hash: String },
}

// Secrets arrive as argv, so the process already holds copies (the OS
// argument block, clap's parsed values) that nothing here can wipe.
// `Zeroizing` only clears the owned `String` handed to each command.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json_logs, level);

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let mut stdout = io::stdout().lock();
            let report = demo::run(&mut stdout).context("failed to write demo output")?;
            debug!(failed = report.failed.len(), "demo finished");
        }
        Commands::Average { values, lossy } => {
            let avg = if lossy {
                average_of_doubled_positives_lossy(&values)
            } else {
                average_of_doubled_positives(&values)?
            };
            println!("{avg:.6}");
        }
        Commands::FormatQuery { identifier, secret } => {
            let secret = Zeroizing::new(secret);
            println!("{}", format_credential_query(&identifier, &secret));
        }
        Commands::ParseConfig { path, lenient, json } => {
            let source = ConfigSource::from_arg(path)?;
            let LenientParse { config, skipped } = read_config(&source, lenient, io::stdin().lock())?;
            for line in &skipped {
                eprintln!("skipped line {}: {:?}", line.line_number, line.line);
            }
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config).context("failed to render config")?
                );
            } else {
                println!("{config}");
            }
        }
        Commands::HashSecret { secret } => {
            let secret = Zeroizing::new(secret);
            println!("{}", hash_secret(&secret)?);
        }
        Commands::VerifySecret { secret, hash } => {
            let secret = Zeroizing::new(secret);
            let matches = verify_secret(&secret, &hash);
            println!("{}", if matches { "match" } else { "no-match" });
        }
    }

    Ok(())
}

/// Where `parse-config` reads from. `-` is stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    Stdin,
    File(PathBuf),
}

impl ConfigSource {
    fn from_arg(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            bail!("no config path given and LEAFKIT_CONFIG is unset");
        };
        if path.as_os_str() == "-" {
            Ok(ConfigSource::Stdin)
        } else {
            Ok(ConfigSource::File(path))
        }
    }
}

/// Strict reads come back with an empty `skipped` list.
fn read_config(source: &ConfigSource, lenient: bool, mut stdin: impl Read) -> Result<LenientParse> {
    let parsed = match source {
        ConfigSource::File(path) if lenient => load_flat_config_lenient(path)?,
        ConfigSource::File(path) => LenientParse {
            config: load_flat_config(path)?,
            skipped: Vec::new(),
        },
        ConfigSource::Stdin => {
            let mut blob = String::new();
            stdin
                .read_to_string(&mut blob)
                .context("failed to read config from stdin")?;
            if lenient {
                parse_flat_config_lenient(&blob)
            } else {
                LenientParse {
                    config: parse_flat_config(&blob)?,
                    skipped: Vec::new(),
                }
            }
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafkit::config::{ConfigError, SkippedLine};
    use std::fs;
    use tempfile::NamedTempFile;

    fn parse_config_path(args: &[&str]) -> Option<PathBuf> {
        let cli = Cli::try_parse_from(args.iter().copied()).expect("arguments should parse");
        match cli.command {
            Some(Commands::ParseConfig { path, .. }) => path,
            _ => panic!("expected parse-config subcommand"),
        }
    }

    #[test]
    fn config_path_falls_back_to_env() {
        std::env::remove_var("LEAFKIT_CONFIG");
        let path = parse_config_path(&["leafkit", "parse-config"]);
        assert!(path.is_none());
        assert!(ConfigSource::from_arg(path).is_err());

        std::env::set_var("LEAFKIT_CONFIG", "/etc/leafkit.conf");
        let path = parse_config_path(&["leafkit", "parse-config"]);
        std::env::remove_var("LEAFKIT_CONFIG");
        assert_eq!(
            ConfigSource::from_arg(path).expect("env path is used"),
            ConfigSource::File(PathBuf::from("/etc/leafkit.conf"))
        );
    }

    #[test]
    fn explicit_path_and_dash_are_recognised() {
        let path = parse_config_path(&["leafkit", "parse-config", "settings.conf", "--lenient"]);
        assert_eq!(
            ConfigSource::from_arg(path).expect("path given"),
            ConfigSource::File(PathBuf::from("settings.conf"))
        );

        let path = parse_config_path(&["leafkit", "parse-config", "-"]);
        assert_eq!(
            ConfigSource::from_arg(path).expect("dash given"),
            ConfigSource::Stdin
        );
    }

    #[test]
    fn reads_stdin_strictly_and_leniently() {
        let strict = read_config(&ConfigSource::Stdin, false, "a=1\nb=2\n".as_bytes())
            .expect("valid config parses");
        assert_eq!(strict.config.get("b"), Some("2"));
        assert!(strict.skipped.is_empty());

        let err = read_config(&ConfigSource::Stdin, false, "a=1\nbad\n".as_bytes())
            .expect_err("malformed config should fail");
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MalformedLine { line_number: 2, .. })
        ));

        let lenient = read_config(&ConfigSource::Stdin, true, "a=1\nbad\n".as_bytes())
            .expect("lenient parse never fails on content");
        assert_eq!(lenient.config.get("a"), Some("1"));
        assert_eq!(
            lenient.skipped,
            vec![SkippedLine {
                line_number: 2,
                line: "bad".to_string()
            }]
        );
    }

    #[test]
    fn reads_file_leniently() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), "a=1\nbad\n").expect("write temp file");
        let source = ConfigSource::File(file.path().to_path_buf());

        let parsed = read_config(&source, true, io::empty()).expect("lenient file parses");
        assert_eq!(parsed.config.get("a"), Some("1"));
        assert_eq!(parsed.skipped.len(), 1);

        assert!(read_config(&source, false, io::empty()).is_err());
    }

    #[test]
    fn missing_file_fails_the_same_way_in_both_modes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = ConfigSource::File(dir.path().join("absent.conf"));

        for lenient in [false, true] {
            let err = read_config(&source, lenient, io::empty()).expect_err("missing file");
            assert!(matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::Io { .. })
            ));
        }
    }
}
