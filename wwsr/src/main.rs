//! wwsr: Wireless Weather Station Reader.
//!
//! Supports:
//! - Reading the current sensor record from a USB receiver and printing it
//!   through a template, as XML, or as JSON
//! - Hex-dumping raw station memory
//! - Decoding records offline from hex strings or saved memory images
//! - Resetting the station's history memory

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};

use wwsr_core::config::{self, Config};
use wwsr_core::dump::{hex_dump, DumpRange, DEFAULT_DUMP_WIDTH};
use wwsr_core::station::{self, StationIo};
use wwsr_core::template::{DEFAULT_TEMPLATE, XML_TEMPLATE};
use wwsr_core::{hex_encode, DeviceId, Reading, SensorRecord, Tag, Template, WwsrError};

mod image;
mod usb;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "wwsr", version, about = "Wireless weather station reader")]
struct Cli {
    /// USB vendor:product of the receiver, in hex
    #[arg(short = 'a', long, env = "WWSR_DEVICE", global = true)]
    device: Option<DeviceId>,

    /// Station altitude in meters, used for relative pressure
    #[arg(
        short = 'A',
        long,
        env = "WWSR_ALTITUDE",
        global = true,
        allow_negative_numbers = true
    )]
    altitude: Option<i32>,

    /// Config file (default: ~/.wwsr/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug and warning messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the current record from the station (default)
    Read,

    /// Decode a 16-byte record given as hex
    Decode {
        /// 32 hex digits, spaces allowed
        hex: String,
    },

    /// Dump raw station memory
    Dump {
        /// [address][:size], decimal or 0x-prefixed hex
        #[arg(default_value = "0:0x100")]
        range: DumpRange,

        /// Also save the bytes as a raw image for `wwsr image`
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Decode the current record from a saved memory image
    Image {
        /// Raw binary image or text output of `wwsr dump`
        file: PathBuf,
    },

    /// Reset the station's history memory
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// List template tags
    Tags,

    /// Show the effective configuration, or write a default config file
    Config {
        /// Write the config file if it does not exist yet
        #[arg(long)]
        init: bool,
    },
}

/// Record output options, accepted before or after the subcommand.
#[derive(Args, Default)]
struct OutputArgs {
    /// Output template, see `wwsr tags`
    #[arg(short, long, global = true, conflicts_with_all = ["xml", "json"])]
    format: Option<String>,

    /// XML output
    #[arg(short = 'x', long, global = true, conflicts_with = "json")]
    xml: bool,

    /// JSON output
    #[arg(long, global = true)]
    json: bool,
}

/// Settings after merging command line, environment and config file.
struct Settings {
    config_path: PathBuf,
    config: Config,
    device: DeviceId,
    altitude: i32,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn run(mut cli: Cli) -> CliResult {
    // The config file is only read by commands that use it.
    match cli.command.take().unwrap_or(Commands::Read) {
        Commands::Read => cmd_read(&load_settings(&cli)?, &cli.output),
        Commands::Decode { hex } => cmd_decode(&load_settings(&cli)?, &hex, &cli.output),
        Commands::Dump { range, save } => cmd_dump(&load_settings(&cli)?, range, save.as_deref()),
        Commands::Image { file } => cmd_image(&load_settings(&cli)?, &file, &cli.output),
        Commands::Reset { yes } => cmd_reset(&load_settings(&cli)?, yes),
        Commands::Tags => cmd_tags(),
        Commands::Config { init: true } => cmd_config_init(&config_path(&cli)),
        Commands::Config { init: false } => cmd_config(&load_settings(&cli)?),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(config::config_file)
}

fn load_settings(cli: &Cli) -> Result<Settings, WwsrError> {
    let config_path = config_path(cli);
    let config = config::load_config_from(&config_path)?;

    let device = cli.device.unwrap_or(config.station.device);
    if cli.device.is_some() {
        debug!("USB device set to {device}");
    }
    let altitude = cli.altitude.unwrap_or(config.station.altitude);
    debug!("Altitude set to {altitude} m");

    Ok(Settings {
        config_path,
        config,
        device,
        altitude,
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_read(settings: &Settings, output: &OutputArgs) -> CliResult {
    let mut station = usb::open_station(settings.device)?;
    let record = station::read_current_record(station.as_mut())?;
    print_record(settings, &record, output)
}

fn cmd_decode(settings: &Settings, hex: &str, output: &OutputArgs) -> CliResult {
    let record = SensorRecord::from_hex(hex)?;
    print_record(settings, &record, output)
}

fn cmd_image(settings: &Settings, file: &Path, output: &OutputArgs) -> CliResult {
    let mut image = image::load_image(file)?;
    info!("Loaded {} bytes from {}", image.len(), file.display());

    let record = station::read_current_record(&mut image)?;
    print_record(settings, &record, output)
}

fn cmd_dump(settings: &Settings, range: DumpRange, save: Option<&Path>) -> CliResult {
    debug!(
        "Dump options address=0x{:04X} size={}",
        range.address, range.size
    );
    let mut station = usb::open_station(settings.device)?;
    let data = read_range(station.as_mut(), range)?;

    info!(
        "Dump {} bytes from address 0x{:04X}",
        range.size, range.address
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in hex_dump(range.address, &data, DEFAULT_DUMP_WIDTH) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    if let Some(path) = save {
        image::save_image(path, range.address, &data)?;
        info!(
            "Saved {} bytes from 0x{:04X} to {}",
            data.len(),
            range.address,
            path.display()
        );
    }
    Ok(())
}

fn read_range(station: &mut dyn StationIo, range: DumpRange) -> Result<Vec<u8>, WwsrError> {
    debug!(
        "Reading {} bytes from 0x{:04X}",
        range.size, range.address
    );
    station::read_memory(station, range.address, range.size as usize)
}

fn cmd_reset(settings: &Settings, yes: bool) -> CliResult {
    if !yes {
        return Err("resetting erases the station history; pass --yes to confirm".into());
    }
    let mut station = usb::open_station(settings.device)?;
    println!("Resetting station history");
    station::reset_history(station.as_mut())?;
    Ok(())
}

fn cmd_tags() -> CliResult {
    println!("Template tags:");
    for tag in Tag::ALL {
        println!("  %{} - {}", tag.symbol(), tag.description());
    }
    println!("  %% - literal percent sign");
    println!("Escapes: \\n newline, \\r carriage return, \\t tab");
    Ok(())
}

fn cmd_config_init(path: &Path) -> CliResult {
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    config::save_config_to(&Config::default(), path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config(settings: &Settings) -> CliResult {
    let path = &settings.config_path;
    let mut effective = settings.config.clone();
    effective.station.device = settings.device;
    effective.station.altitude = settings.altitude;

    println!("# {}", path.display());
    print!("{}", config::serialize_config(&effective));
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_record(settings: &Settings, record: &SensorRecord, output: &OutputArgs) -> CliResult {
    debug!("Record: {}", hex_encode(record.as_bytes()));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if output.json {
        let reading = Reading::from_record(record, settings.altitude);
        serde_json::to_writer_pretty(&mut out, &reading)?;
        writeln!(out)?;
    } else {
        let source = template_source(settings, output);
        debug!("Format output using '{source}'");
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let text = Template::parse(source).render(record, settings.altitude, &now);
        out.write_all(text.as_bytes())?;
    }

    out.flush()?;
    Ok(())
}

/// Pick the template: `-x`, then `-f`, then the config file, then the default.
fn template_source<'a>(settings: &'a Settings, output: &'a OutputArgs) -> &'a str {
    if output.xml {
        return XML_TEMPLATE;
    }
    output
        .format
        .as_deref()
        .or(settings.config.output.format.as_deref())
        .unwrap_or(DEFAULT_TEMPLATE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
