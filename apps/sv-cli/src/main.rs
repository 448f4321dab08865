use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use sv_app::{
    AppError, AppResult, ControlLoop, ControllerConfig, Preset, SimulationRun, error_chain,
    load_config, simulate,
};
use sv_controls::TemperatureSensor;
use sv_core::{ShutdownToken, SystemClock, celsius_to_fahrenheit};
use sv_io::{JsonlRecorder, SysfsGpio, W1Sensor};
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "sv-cli")]
#[command(about = "Sous-vide controller - PID duty-cycle heater control", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop against the configured probe and heater
    Run {
        #[command(flatten)]
        target: TargetArgs,
        /// Stop after this many duty cycles instead of running forever
        #[arg(long)]
        iterations: Option<u64>,
    },
    /// Run the control loop against a simulated water bath
    Simulate {
        #[command(flatten)]
        target: TargetArgs,
        /// Simulated time in minutes
        #[arg(long, default_value_t = 60.0)]
        minutes: f64,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print one reading from the configured probe
    ReadSensor,
    /// Validate the configuration
    Validate,
    /// Print the effective configuration as YAML
    ShowConfig {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl Commands {
    fn target(&self) -> Option<&TargetArgs> {
        match self {
            Commands::Run { target, .. }
            | Commands::Simulate { target, .. }
            | Commands::ShowConfig { target } => Some(target),
            Commands::ReadSensor | Commands::Validate => None,
        }
    }
}

#[derive(clap::Args)]
struct TargetArgs {
    /// Named setpoint
    #[arg(long, value_enum, conflicts_with = "setpoint_f")]
    preset: Option<PresetArg>,
    /// Setpoint in degrees Fahrenheit
    #[arg(long)]
    setpoint_f: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Steak,
    Pork,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Steak => Preset::Steak,
            PresetArg::Pork => Preset::Pork,
        }
    }
}

impl TargetArgs {
    fn apply(&self, mut config: ControllerConfig) -> AppResult<ControllerConfig> {
        if let Some(preset) = self.preset {
            config = config.with_preset(preset.into());
        }
        if let Some(setpoint_f) = self.setpoint_f {
            config.setpoint_f = setpoint_f;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = match effective_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(cli.verbose, None)?;
            error!(error = %error_chain(&e), "invalid configuration");
            return Err(e);
        }
    };

    let log_file = match cli.command {
        Commands::Run { .. } => config.log_file.as_deref(),
        _ => None,
    };
    if let Err(e) = init_tracing(cli.verbose, log_file) {
        init_tracing(cli.verbose, None)?;
        error!(error = %error_chain(&e), "cannot open log file");
        return Err(e);
    }

    let result = match cli.command {
        Commands::Run { iterations, .. } => cmd_run(&config, iterations),
        Commands::Simulate {
            minutes, output, ..
        } => cmd_simulate(&config, minutes, output.as_deref()),
        Commands::ReadSensor => cmd_read_sensor(&config),
        Commands::Validate => cmd_validate(&config),
        Commands::ShowConfig { .. } => cmd_show_config(&config),
    };
    if let Err(e) = &result {
        error!(error = %error_chain(e), "command failed");
    }
    result
}

/// Configuration file (or defaults) with command-line overrides applied.
fn effective_config(cli: &Cli) -> AppResult<ControllerConfig> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ControllerConfig::default(),
    };
    match cli.command.target() {
        Some(target) => target.apply(config),
        None => Ok(config),
    }
}

/// Log to stderr and, if configured, append the same lines to `log_file`.
///
/// Stdout is left to command output such as the simulation CSV.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> AppResult<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = open_append(path, "log")?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(level)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn open_append(path: &Path, what: &'static str) -> AppResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::OpenFile {
            what,
            path: path.to_path_buf(),
            source,
        })
}

fn cmd_run(config: &ControllerConfig, iterations: Option<u64>) -> AppResult<()> {
    let shutdown = ShutdownToken::new();
    let sensor = W1Sensor::with_root(&config.w1_root, config.sensor_id.as_str());
    let heater = SysfsGpio::with_root(&config.gpio_root, config.heater_gpio);
    let clock = SystemClock::new().with_shutdown(shutdown.clone());

    let on_signal = shutdown.clone();
    match ctrlc::set_handler(move || on_signal.cancel()) {
        Ok(()) => info!("press Ctrl-C to stop"),
        Err(e) => warn!(error = %e, "could not install Ctrl-C handler"),
    }

    let mut control = ControlLoop::new(config, sensor, heater, clock)?.with_shutdown(shutdown);
    if let Some(path) = &config.record_file {
        let recorder =
            JsonlRecorder::append(path).map_err(|source| AppError::OpenFile {
                what: "record",
                path: path.clone(),
                source,
            })?;
        control = control.with_recorder(Box::new(recorder));
    }
    if let Some(iterations) = iterations {
        control = control.with_max_iterations(iterations);
    }

    let summary = control.run()?;
    println!(
        "Stopped after {} iterations ({:?})",
        summary.iterations, summary.reason
    );
    Ok(())
}

fn cmd_simulate(config: &ControllerConfig, minutes: f64, output: Option<&Path>) -> AppResult<()> {
    let duration = Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| {
        sv_controls::ControlError::config(format!("invalid simulation length: {minutes} min"))
    })?;
    let run = simulate(config, duration)?;

    match output {
        Some(path) => {
            let mut file = File::create(path).map_err(|source| AppError::OpenFile {
                what: "output",
                path: path.to_path_buf(),
                source,
            })?;
            write_csv(&mut file, &run)?;
            println!("✓ Wrote {} samples to {}", run.reports.len(), path.display());
        }
        None => write_csv(&mut io::stdout().lock(), &run)?,
    }

    eprintln!(
        "Final temperature {:.3} C (target {:.3} C), heater on for {:.1} of {:.1} min",
        run.final_temperature_c,
        config.setpoint_c(),
        run.heated_for.as_secs_f64() / 60.0,
        run.simulated.as_secs_f64() / 60.0
    );
    Ok(())
}

fn write_csv(out: &mut impl Write, run: &SimulationRun) -> io::Result<()> {
    writeln!(out, "time_min,temperature_c,error_c,duty")?;
    for report in &run.reports {
        writeln!(
            out,
            "{:.3},{:.3},{:.3},{:.4}",
            report.started_at.as_secs_f64() / 60.0,
            report.measured_c,
            report.error_c(),
            report.output
        )?;
    }
    Ok(())
}

fn cmd_read_sensor(config: &ControllerConfig) -> AppResult<()> {
    let mut sensor = W1Sensor::with_root(&config.w1_root, config.sensor_id.as_str());
    let celsius = sensor.read_celsius()?;
    println!(
        "{}: {:.3} C ({:.3} F)",
        sensor.id(),
        celsius,
        celsius_to_fahrenheit(celsius)
    );
    Ok(())
}

fn cmd_validate(config: &ControllerConfig) -> AppResult<()> {
    config.validate()?;
    println!("✓ Configuration is valid");
    println!(
        "  setpoint {:.1} F ({:.3} C), period {} s, probe {}, heater gpio{}",
        config.setpoint_f,
        config.setpoint_c(),
        config.period_s,
        config.sensor_id,
        config.heater_gpio
    );
    Ok(())
}

fn cmd_show_config(config: &ControllerConfig) -> AppResult<()> {
    let yaml = serde_yaml::to_string(config).map_err(|e| AppError::ConfigParse {
        path: PathBuf::from("<stdout>"),
        message: e.to_string(),
    })?;
    print!("{yaml}");
    Ok(())
}
