use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use telemdash_core::protocols::f1::{
    CarTelemetryRecord, CarTelemetryTrailer, F1Header, layout as f1_layout, write_car_telemetry,
};
use telemdash_core::protocols::pcars::ForwarderRecord;
use telemdash_core::{
    Clock, Dashboard, DecodeOutcome, DisplayTelemetry, MonotonicClock, Protocol, RawPacket,
    ReplayReport, TelemetryConfig,
};
use tracing::{debug, info};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("TELEMDASH_BUILD_COMMIT"),
    ", built ",
    env!("TELEMDASH_BUILD_DATE"),
    ")"
);

const REPLAY_EXAMPLES: &str = "Examples:\n  telemdash replay session.pcapng -o report.json\n  telemdash replay 'captures/*.pcapng' --stdout --pretty\n  telemdash replay session.pcap --stdout --strict --list-rejections";

#[derive(Parser, Debug)]
#[command(name = "telemdash")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and replay tool for F1 2020 and Project CARS 2 UDP telemetry.",
    long_about = None,
    after_help = REPLAY_EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a PCAP/PCAPNG capture through both decoders and write a JSON report.
    #[command(after_help = REPLAY_EXAMPLES)]
    Replay {
        /// Path or glob pattern matching one .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any packet was rejected
        #[arg(long)]
        strict: bool,

        /// List rejected packets by error id after replay
        #[arg(long)]
        list_rejections: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Decode one raw datagram payload and print the resulting display state.
    Decode {
        /// Protocol the payload was received on
        #[arg(long, value_enum)]
        protocol: ProtocolArg,

        /// File holding the raw UDP payload
        input: PathBuf,

        /// Sender address reported in the output
        #[arg(long, default_value = "127.0.0.1:0")]
        source: SocketAddr,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Write a synthetic telemetry datagram payload to a file.
    Encode {
        #[command(subcommand)]
        packet: EncodeCommands,
    },
}

#[derive(Subcommand, Debug)]
enum EncodeCommands {
    /// F1 2020 car telemetry packet with one populated car slot
    F1 {
        /// Speed in km/h
        #[arg(long)]
        speed: u16,

        /// Gear: -1 reverse, 0 neutral, 1..=8
        #[arg(long, allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-1..=8))]
        gear: i8,

        /// Engine RPM
        #[arg(long)]
        rpm: u16,

        /// Throttle 0.0..=1.0
        #[arg(long, default_value_t = 0.0)]
        throttle: f32,

        /// Brake 0.0..=1.0
        #[arg(long, default_value_t = 0.0)]
        brake: f32,

        /// Car slot of the player
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..22))]
        player_index: u8,

        /// Frame identifier written to the header
        #[arg(long, default_value_t = 0)]
        frame: u32,

        /// Output payload path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
    /// Project CARS forwarder JSON document
    Forwarder {
        /// Speed in km/h
        #[arg(long)]
        speed: Option<f32>,

        #[arg(long, allow_hyphen_values = true)]
        gear: Option<i64>,

        #[arg(long)]
        rpm: Option<i64>,

        /// Fuel percentage
        #[arg(long)]
        fuel: Option<f32>,

        /// Lap time in seconds
        #[arg(long)]
        lap_time: Option<f32>,

        /// Output payload path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(long, env = "TELEMDASH_CONFIG")]
    config: Option<PathBuf>,

    /// F1 listener port
    #[arg(long, env = "TELEMDASH_F1_PORT")]
    f1_port: Option<u16>,

    /// Project CARS listener port
    #[arg(long, env = "TELEMDASH_PCARS_PORT")]
    pcars_port: Option<u16>,

    /// Forwarder JSON listener port
    #[arg(long, env = "TELEMDASH_FORWARDER_PORT")]
    forwarder_port: Option<u16>,

    /// Receive buffer size; longer datagrams are truncated
    #[arg(long, env = "TELEMDASH_MAX_PACKET_LEN")]
    max_packet_len: Option<usize>,

    /// Forwarder JSON parse limit
    #[arg(long, env = "TELEMDASH_MAX_JSON_LEN")]
    max_json_len: Option<usize>,

    /// F1 data goes stale after this many milliseconds
    #[arg(long, env = "TELEMDASH_F1_STALE_AFTER_MS")]
    f1_stale_after_ms: Option<u64>,

    /// Project CARS data goes stale after this many milliseconds
    #[arg(long, env = "TELEMDASH_PCARS_STALE_AFTER_MS")]
    pcars_stale_after_ms: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProtocolArg {
    F1,
    Pcars,
}

impl From<ProtocolArg> for Protocol {
    fn from(value: ProtocolArg) -> Self {
        match value {
            ProtocolArg::F1 => Protocol::F1,
            ProtocolArg::Pcars => Protocol::Pcars,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Replay {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
            list_rejections,
            config,
        } => cmd_replay(ReplayOptions {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
            list_rejections,
            config,
        }),
        Commands::Decode {
            protocol,
            input,
            source,
            pretty,
            config,
        } => cmd_decode(protocol.into(), &input, source, pretty, &config),
        Commands::Encode { packet } => cmd_encode(packet),
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

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("telemdash={level},telemdash_core={level}").into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
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

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn load_config(args: &ConfigArgs) -> Result<TelemetryConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => TelemetryConfig::load(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("config files are JSON objects with optional keys such as \"f1_port\"".to_string()),
            )
        })?,
        None => TelemetryConfig::default(),
    };
    if let Some(port) = args.f1_port {
        config.f1_port = port;
    }
    if let Some(port) = args.pcars_port {
        config.pcars_port = port;
    }
    if let Some(port) = args.forwarder_port {
        config.forwarder_port = port;
    }
    if let Some(len) = args.max_packet_len {
        config.max_packet_len = len;
    }
    if let Some(len) = args.max_json_len {
        config.max_json_len = len;
    }
    if let Some(ms) = args.f1_stale_after_ms {
        config.f1_stale_after_ms = ms;
    }
    if let Some(ms) = args.pcars_stale_after_ms {
        config.pcars_stale_after_ms = ms;
    }
    config.validate().map_err(|err| {
        CliError::new(
            format!("invalid configuration: {err}"),
            Some("check --config and the port, size and staleness flags".to_string()),
        )
    })?;
    debug!(?config, "loaded configuration");
    Ok(config)
}

struct ReplayOptions {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_rejections: bool,
    config: ConfigArgs,
}

fn cmd_replay(opts: ReplayOptions) -> Result<(), CliError> {
    let config = load_config(&opts.config)?;
    let resolved_input = resolve_input_path(&opts.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if opts.stdout {
        None
    } else {
        let path = opts.report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&path, &input_abs)?;
        Some(path)
    };

    let rep = telemdash_core::replay_capture_file(&resolved_input, &config)
        .context("capture replay failed")?;
    let json = serialize_json(&rep, opts.pretty, opts.compact)?;

    match &report_path {
        None => print!("{}", json),
        Some(path) => {
            write_output(path, json.as_bytes())?;
            info!(path = %path.display(), "report written");
        }
    }

    if opts.list_rejections && !opts.quiet {
        print_rejections(&rep);
    }
    if let Some(path) = &report_path {
        if !opts.quiet {
            eprintln!("OK: report written -> {}", path.display());
        }
    }
    if opts.strict && has_rejections(&rep) {
        return Err(CliError::new(
            "rejected packets detected",
            Some("use --list-rejections to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot alias the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct DecodeSummary {
    input: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    packet_id: Option<u8>,
    display: DisplayTelemetry,
}

fn cmd_decode(
    protocol: Protocol,
    input: &Path,
    source: SocketAddr,
    pretty: bool,
    config: &ConfigArgs,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let bytes = fs::read(input).map_err(|err| {
        CliError::new(
            format!("failed to read payload {}: {err}", input.display()),
            Some("pass a file holding one raw UDP payload".to_string()),
        )
    })?;
    let payload = &bytes[..bytes.len().min(config.max_packet_len)];

    let clock = MonotonicClock::new();
    let mut dashboard = Dashboard::new(&config);
    dashboard.set_active(protocol);
    let outcome = dashboard
        .ingest(RawPacket::new(payload, source), clock.now())
        .map_err(|err| {
            CliError::new(
                format!("{err}"),
                Some(format!("error id {}", err.id())),
            )
        })?;

    let (outcome, packet_id) = match outcome {
        DecodeOutcome::Updated(_) => ("updated", None),
        DecodeOutcome::Ignored { packet_id } => ("ignored", Some(packet_id)),
    };
    let summary = DecodeSummary {
        input: input.display().to_string(),
        outcome,
        packet_id,
        display: dashboard.display(clock.now()),
    };
    println!("{}", serialize_json(&summary, pretty, false)?);
    Ok(())
}

fn cmd_encode(packet: EncodeCommands) -> Result<(), CliError> {
    let (bytes, output) = match packet {
        EncodeCommands::F1 {
            speed,
            gear,
            rpm,
            throttle,
            brake,
            player_index,
            frame,
            output,
        } => {
            if !(0.0..=1.0).contains(&throttle) || !(0.0..=1.0).contains(&brake) {
                return Err(CliError::new(
                    "throttle and brake must be within 0.0..=1.0",
                    None,
                ));
            }
            let mut cars = [CarTelemetryRecord::default(); f1_layout::MAX_CARS];
            cars[usize::from(player_index)] = CarTelemetryRecord {
                speed,
                gear,
                engine_rpm: rpm,
                throttle,
                brake,
                ..CarTelemetryRecord::default()
            };
            let header = F1Header::car_telemetry(player_index, frame, 0.0);
            let bytes = write_car_telemetry(&header, &cars, &CarTelemetryTrailer::default());
            (bytes, output)
        }
        EncodeCommands::Forwarder {
            speed,
            gear,
            rpm,
            fuel,
            lap_time,
            output,
        } => {
            let record = ForwarderRecord {
                speed,
                gear,
                rpm,
                fuel,
                lap_time,
            };
            let bytes = serde_json::to_vec(&record).context("JSON serialization failed")?;
            (bytes, output)
        }
    };
    write_output(&output, &bytes)?;
    info!(path = %output.display(), bytes = bytes.len(), "payload written");
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_rejections(rep: &ReplayReport) -> bool {
    rep.streams.iter().any(|stream| stream.rejected > 0)
}

fn print_rejections(rep: &ReplayReport) {
    eprintln!("Rejected packets:");
    for stream in &rep.streams {
        for rejection in &stream.rejections {
            eprintln!(
                "  {} {} ({}): {}",
                stream.protocol, rejection.id, rejection.count, rejection.example
            );
        }
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
