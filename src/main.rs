use anyhow::{bail, Context, Result};
use std::time::Duration;
use thermolink_edge::hardware::SimulatedThermostat;
use thermolink_edge::{
    ConnectionConfig, ConnectionManager, DeviceProfile, HardwareCallbacks, ThermostatConfig,
    ThermostatHandler, TransportEvent, WebSocketTransport,
};
use thermolink_shared::{LocalChange, ThermostatMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Room temperature the simulated plant starts at
const AMBIENT_TEMPERATURE: f64 = 18.0;
/// One simulated minute passes per tick
const PLANT_TICK: Duration = Duration::from_secs(1);

/// Credentials and identity read from the environment
struct Settings {
    connection: ConnectionConfig,
    client_id: String,
    client_token: String,
    device_id: String,
    device_name: Option<String>,
}

enum Step {
    Transport(Result<TransportEvent>),
    Local(LocalChange),
    Shutdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    #[cfg(feature = "tls")]
    {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            debug!("TLS crypto provider already installed");
        }
    }

    let settings = settings_from_env()?;
    info!("Thermostat {} starting", settings.device_id);

    let plant = SimulatedThermostat::new(AMBIENT_TEMPERATURE);
    let mut callbacks = HardwareCallbacks::new();
    plant.install(&mut callbacks);

    let mut profile = DeviceProfile::default();
    if let Some(name) = settings.device_name {
        profile.friendly_name = name;
    }
    let handler = ThermostatHandler::new(
        ThermostatConfig {
            profile,
            ..Default::default()
        },
        callbacks,
    );

    let mut manager = ConnectionManager::connect(
        WebSocketTransport::new(),
        &settings.connection,
        &settings.client_id,
        &settings.client_token,
        &settings.device_id,
        handler,
    )?;

    // Spawn plant simulation
    let plant_clone = plant.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PLANT_TICK);
        loop {
            ticker.tick().await;
            plant_clone.step(1.0);
            let reading = plant_clone.reading();
            debug!(
                "[PLANT] {:.1}C target={:.1} mode={}",
                reading.temperature, reading.target, reading.mode
            );
        }
    });

    // Spawn console reader; each line is a physical interaction
    let (local_tx, mut local_rx) = mpsc::channel::<LocalChange>(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_console_line(&line) {
                Some(change) => {
                    match change {
                        LocalChange::TargetTemperature(target) => plant.turn_dial(target),
                        LocalChange::Mode(mode) => plant.press_mode(mode),
                    }
                    if local_tx.send(change).await.is_err() {
                        break;
                    }
                }
                None => warn!("[CONSOLE] Expected `target <celsius>` or `mode <HEAT|COOL|AUTO|OFF>`"),
            }
        }
    });

    // Main event loop
    loop {
        let step = tokio::select! {
            event = manager.next_event() => Step::Transport(event),
            Some(change) = local_rx.recv() => Step::Local(change),
            _ = tokio::signal::ctrl_c() => Step::Shutdown,
        };

        match step {
            Step::Transport(Ok(event)) => manager.service(event).await,
            Step::Transport(Err(e)) => {
                error!("Transport closed: {:#}", e);
                break;
            }
            Step::Local(change) => match manager.report_change(change).await {
                Ok(true) => info!("Reported local change {:?}", change),
                Ok(false) => {}
                Err(e) => warn!("Could not report local change: {:#}", e),
            },
            Step::Shutdown => {
                info!("Shutting down");
                if let Err(e) = manager.close().await {
                    warn!("Close failed: {:#}", e);
                }
                break;
            }
        }
    }

    Ok(())
}

fn settings_from_env() -> Result<Settings> {
    let mut connection = ConnectionConfig::default();

    if let Ok(host) = std::env::var("THERMOLINK_HOST") {
        connection.host = host;
    }
    if let Ok(tls) = std::env::var("THERMOLINK_TLS") {
        connection.use_tls = matches!(tls.as_str(), "1" | "true" | "yes");
        connection.port = if connection.use_tls { 443 } else { 80 };
    }
    if let Ok(port) = std::env::var("THERMOLINK_PORT") {
        connection.port = port
            .parse()
            .with_context(|| format!("Invalid THERMOLINK_PORT {:?}", port))?;
    }
    if connection.use_tls && !cfg!(feature = "tls") {
        bail!("THERMOLINK_TLS requested but built without the `tls` feature");
    }

    let client_id =
        std::env::var("THERMOLINK_CLIENT_ID").context("THERMOLINK_CLIENT_ID is not set")?;
    let client_token =
        std::env::var("THERMOLINK_CLIENT_TOKEN").context("THERMOLINK_CLIENT_TOKEN is not set")?;
    let device_id =
        std::env::var("THERMOLINK_DEVICE_ID").unwrap_or_else(|_| "thermostat-001".into());

    Ok(Settings {
        connection,
        client_id,
        client_token,
        device_id,
        device_name: std::env::var("THERMOLINK_DEVICE_NAME").ok(),
    })
}

/// Parse `target <celsius>` or `mode <MODE>`
fn parse_console_line(line: &str) -> Option<LocalChange> {
    let mut words = line.split_whitespace();
    let change = match (words.next()?, words.next()?) {
        ("target", value) => LocalChange::TargetTemperature(value.parse().ok()?),
        ("mode", value) => LocalChange::Mode(value.to_ascii_uppercase().parse::<ThermostatMode>().ok()?),
        _ => return None,
    };
    if words.next().is_some() {
        return None;
    }
    Some(change)
}
