use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use pump_core::{Device, Ticker};
use pump_server::cli::{Cli, FILE_GUARD};
use pump_server::{AppState, DynDevice, router};
use pump_traits::clock::MonotonicClock;
use pump_traits::{GlucoseSensor, Indicator, Pump};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging);

    let users_file = cli
        .users_file
        .clone()
        .unwrap_or_else(|| cfg.storage.users_file.clone().into());
    let port = cli.port.unwrap_or(cfg.server.port);

    let (sensor, pump, indicator) = build_hardware(&cli)?;
    let device: Arc<Mutex<DynDevice>> = Arc::new(Mutex::new(Device::new(
        sensor,
        pump,
        indicator,
        Box::new(pump_core::JsonUserStore::new(users_file)),
        (&cfg.sensor).into(),
        (&cfg.injection).into(),
        Arc::new(MonotonicClock::new()),
    )));

    // Delivery progress is advanced by this thread, never by request
    // handling.
    let ticker = Ticker::spawn(device.clone(), Duration::from_millis(cfg.injection.tick_ms));

    let app = router(AppState::new(device.clone()));
    let addr = format!("{}:{}", cfg.server.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "pump server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Guaranteed shutdown sequence: stop ticking, force-stop any active
    // delivery and de-energize the actuator before exiting.
    drop(ticker);
    match device.lock() {
        Ok(mut dev) => dev.force_stop(),
        Err(poisoned) => poisoned.into_inner().force_stop(),
    }
    tracing::info!("shutdown complete");

    served.wrap_err("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for interrupt");
        return;
    }
    tracing::info!("interrupt received, shutting down");
}

fn load_config(path: &Path) -> eyre::Result<pump_config::Config> {
    if !path.exists() {
        eprintln!("config {} not found; using defaults", path.display());
        return Ok(pump_config::Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let cfg = pump_config::load_toml(&text)
        .wrap_err_with(|| format!("parsing config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &pump_config::Logging) {
    let level = logging.level.as_deref().unwrap_or(&cli.log_level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if cli.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("pump.log"));
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer).boxed()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();
}

type HardwareSet = (
    Box<dyn GlucoseSensor + Send>,
    Box<dyn Pump + Send>,
    Box<dyn Indicator + Send>,
);

#[cfg(not(feature = "hardware"))]
fn build_hardware(cli: &Cli) -> eyre::Result<HardwareSet> {
    use pump_hardware::{SimulatedIndicator, SimulatedPotentiometer, SimulatedPump};
    tracing::debug!(level = cli.sim_level, "using simulated hardware");
    Ok((
        Box::new(SimulatedPotentiometer::new(cli.sim_level)),
        Box::new(SimulatedPump::new()),
        Box::new(SimulatedIndicator::new()),
    ))
}

#[cfg(feature = "hardware")]
fn build_hardware(_cli: &Cli) -> eyre::Result<HardwareSet> {
    use pump_hardware::gpio::{LedIndicator, Mcp3008Sensor, RelayPump};
    let sensor = Mcp3008Sensor::new(0).wrap_err("open ADC")?;
    let pump = RelayPump::new(17).wrap_err("open relay pin")?;
    let led = LedIndicator::new(22).wrap_err("open LED pin")?;
    Ok((Box::new(sensor), Box::new(pump), Box::new(led)))
}
