use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wiredecode_core::{DecodeOptions, IcvPolicy, WepKey};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("WIREDECODE_BUILD_COMMIT"),
    ", built ",
    env!("WIREDECODE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  wiredecode pcap decode capture.pcap -o report.json\n  wiredecode pcap dissect wlan.pcapng --stdout --pretty\n  wiredecode pcap decode wep.pcap --wep-key 01:02:03:04:05 -o report.json";

#[derive(Parser, Debug)]
#[command(name = "wiredecode")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Layered packet decoder for Ethernet, IPv4 and 802.11 captures.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log decoder decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode every packet of a capture into a JSON layer report.
    #[command(alias = "dissect")]
    #[command(after_help = EXAMPLES)]
    Decode(DecodeArgs),
}

#[derive(clap::Args, Debug)]
struct DecodeArgs {
    /// Path to a .pcap or .pcapng file (a glob matching exactly one file is accepted)
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// WEP secret as hex (5 or 13 bytes, ':' separators allowed)
    #[arg(long, value_name = "HEX")]
    wep_key: Option<String>,

    /// What to do with decrypted WEP payloads
    #[arg(long, value_enum, default_value_t = IcvPolicyArg::Verify)]
    icv_policy: IcvPolicyArg,

    /// Raw 802.11 frames carry no trailing FCS
    #[arg(long)]
    no_fcs: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any packet failed to decode
    #[arg(long)]
    strict: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum IcvPolicyArg {
    /// Check the ICV and fail the packet on mismatch
    Verify,
    /// Decrypt but keep the encrypted body opaque
    Discard,
}

impl From<IcvPolicyArg> for IcvPolicy {
    fn from(value: IcvPolicyArg) -> Self {
        match value {
            IcvPolicyArg::Verify => IcvPolicy::Verify,
            IcvPolicyArg::Discard => IcvPolicy::Discard,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Decode(args) => {
                init_tracing(cli.verbose, args.quiet);
                cmd_pcap_decode(args)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pcap_decode(args: DecodeArgs) -> Result<(), CliError> {
    let options = decode_options(&args)?;
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    // clap guarantees exactly one of --stdout and --report.
    let output = args.report.as_deref().filter(|_| !args.stdout);
    if let Some(report_path) = output {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    debug!(input = %resolved_input.display(), ?options, "decoding capture");
    let rep = wiredecode_core::decode_capture_file(&resolved_input, &options)
        .context("PCAP/PCAPNG decoding failed")?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&rep)
    } else {
        serde_json::to_string(&rep)
    }
    .context("JSON serialization failed")?;

    match output {
        None => print!("{json}"),
        Some(report_path) => {
            if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            info!(report = %report_path.display(), "report written");
            if !args.quiet {
                eprintln!("OK: report written -> {}", report_path.display());
            }
        }
    }

    let failed = rep
        .capture_summary
        .as_ref()
        .map_or(0, |summary| summary.packets_failed);
    if args.strict && failed > 0 {
        return Err(CliError::new(
            format!("{failed} packet(s) failed to decode"),
            Some("inspect the `error` field of each packet, or rerun with --verbose".to_string()),
        ));
    }
    Ok(())
}

fn decode_options(args: &DecodeArgs) -> Result<DecodeOptions, CliError> {
    let mut options = DecodeOptions::default()
        .with_icv_policy(args.icv_policy.into())
        .with_dot11_fcs_at_end(!args.no_fcs);
    if let Some(hex) = &args.wep_key {
        let key = WepKey::from_hex(hex).map_err(|err| {
            CliError::new(
                format!("invalid --wep-key: {err}"),
                Some("pass 10 or 26 hex digits, e.g. 01:02:03:04:05".to_string()),
            )
        })?;
        options = options.with_wep_key(key);
    }
    Ok(options)
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    // A report that does not exist yet cannot be the input.
    match fs::canonicalize(report_path) {
        Ok(report_abs) if report_abs == input_abs => Err(CliError::new(
            format!("report path must differ from input: {}", report_path.display()),
            Some("choose a different output path".to_string()),
        )),
        _ => Ok(()),
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    let hint = || Some("expected a .pcap or .pcapng file".to_string());
    if !input.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            hint(),
        ));
    }
    let is_capture = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pcap") || ext.eq_ignore_ascii_case("pcapng"));
    if !is_capture {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            hint(),
        ));
    }
    Ok(())
}

/// Expand a glob input; it has to name exactly one capture file.
fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Ok(input.to_path_buf());
    }

    let bad_pattern =
        |detail: String| CliError::new(format!("invalid input pattern '{pattern}'"), Some(detail));
    let mut matches = Vec::new();
    for entry in glob(&pattern).map_err(|err| bad_pattern(err.msg.to_string()))? {
        let path = entry.map_err(|err| bad_pattern(err.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    <[PathBuf; 1]>::try_from(matches)
        .map(|[path]| path)
        .map_err(|matches| {
            CliError::new(
                format!("pattern '{pattern}' matched {} files", matches.len()),
                Some("pass exactly one .pcap or .pcapng file, or quote the pattern".to_string()),
            )
        })
}
