//! iocscan CLI
//!
//! Scans C headers for macros that look like ioctl request codes and dumps
//! their tokens, one macro per line.

use anyhow::{Context, Result};
use clap::Parser;
use iocscan_core::{FrontendKind, ScanConfig};
use iocscan_scanner::{write_macros, HeaderEnumerator, Scanner};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "iocscan")]
#[command(author, version, long_about = None)]
#[command(about = "Find ioctl request-code macros in C headers")]
struct Cli {
    /// Directories to scan for headers [default: /usr/include]
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,

    /// Include search path for the front end (repeatable)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    /// File name suffix of headers [default: .h]
    #[arg(long, value_name = "SUFFIX")]
    suffix: Option<String>,

    /// Front end: clang or tree-sitter [default: clang]
    #[arg(long, value_parser = parse_frontend)]
    frontend: Option<FrontendKind>,

    /// Path to the clang executable
    #[arg(long, value_name = "PATH")]
    clang: Option<PathBuf>,

    /// Extra argument passed to the front end (repeatable)
    #[arg(long = "extra-arg", value_name = "ARG", allow_hyphen_values = true)]
    extra_args: Vec<String>,

    /// YAML config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the headers that would be scanned and exit
    #[arg(long)]
    list_headers: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_frontend(s: &str) -> std::result::Result<FrontendKind, String> {
    s.parse().map_err(|e: iocscan_core::Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    debug!("Effective config: {:?}", config);

    if cli.list_headers {
        cmd_list_headers(&config)
    } else {
        cmd_scan(&config)
    }
}

/// Logs go to stderr; stdout carries only the macro dump
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    if !cli.roots.is_empty() {
        config.roots = cli.roots.clone();
    }
    if !cli.include_dirs.is_empty() {
        config.include_dirs = cli.include_dirs.clone();
    }
    if let Some(suffix) = &cli.suffix {
        config.header_suffix = suffix.clone();
    }
    if let Some(frontend) = cli.frontend {
        config.frontend = frontend;
    }
    if let Some(clang) = &cli.clang {
        config.clang_path = Some(clang.clone());
    }
    if !cli.extra_args.is_empty() {
        config.extra_args = cli.extra_args.clone();
    }

    config.validate()?;
    Ok(config)
}

fn cmd_scan(config: &ScanConfig) -> Result<()> {
    let mut scanner = Scanner::from_config(config)
        .with_context(|| format!("failed to start {} front end", config.frontend))?;
    let report = scanner.scan().context("scan aborted")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_macros(&mut out, &report.macros)?;

    Ok(())
}

fn cmd_list_headers(config: &ScanConfig) -> Result<()> {
    let headers = HeaderEnumerator::from_config(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in headers.iter() {
        let path = path?;
        writeln!(out, "{}", path.display())?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["iocscan"]);
        assert_eq!(build_config(&cli).unwrap(), ScanConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "iocscan",
            "/opt/sdk/include",
            "-I/opt/sdk/include",
            "--frontend",
            "tree-sitter",
            "--suffix",
            ".hpp",
            "--extra-arg",
            "-D__APPLE__",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/opt/sdk/include")]);
        assert_eq!(config.include_dirs, vec![PathBuf::from("/opt/sdk/include")]);
        assert_eq!(config.frontend, FrontendKind::TreeSitter);
        assert_eq!(config.header_suffix, ".hpp");
        assert_eq!(config.extra_args, vec!["-D__APPLE__".to_string()]);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iocscan.yaml");
        fs::write(&path, "roots: [/from/file]\nheader_suffix: .hh\n").unwrap();

        let cli = Cli::parse_from([
            "iocscan".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--suffix".to_string(),
            ".h".to_string(),
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/from/file")]);
        assert_eq!(config.header_suffix, ".h");
    }

    #[test]
    fn test_unknown_frontend_rejected() {
        assert!(Cli::try_parse_from(["iocscan", "--frontend", "gcc"]).is_err());
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let cli = Cli::parse_from(["iocscan", "--suffix", ""]);
        assert!(build_config(&cli).is_err());
    }
}
