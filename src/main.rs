//! # ChairBot Teleop
//!
//! Drive a ChairBot from a hand-held joystick or a steering console.
//!
//! Usage: `chairbot-teleop [config.toml]` (defaults to `config/default.toml`).

use anyhow::{Context, Result};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chairbot_teleop::config::{Config, LoggingConfig};
use chairbot_teleop::drive::{DriveMixer, MotorOutput};
use chairbot_teleop::input::{DeviceRole, InputDevice, InputLayout, InputState};
use chairbot_teleop::serial::MotorSerial;
use chairbot_teleop::teleop::status::LogStatusSink;
use chairbot_teleop::teleop::{TeleopParams, TeleopSession};

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Buffered input events between the device readers and the control loop
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What a device reader task reports
#[derive(Debug)]
enum DeviceUpdate {
    Event(DeviceRole, evdev::InputEvent),
    Lost(DeviceRole),
}

/// Main entry point for ChairBot teleop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration and set up logging
///    - Open the joystick, console and panels, seed their current state
///    - Open the serial link to the motor controller
///    - Start the session (captures the potentiometer baseline)
///
/// 2. **Main Loop**
///    - Fold device events into the input state as they arrive
///    - On every tick run one control cycle and send the motor frame
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Send a stop frame so the wheels do not keep the last command
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("ChairBot teleop v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    // Input devices
    let mut inputs = InputState::new(InputLayout::from_config(&config));
    let devices = open_devices(&config)?;
    for device in &devices {
        for event in device.initial_events()? {
            inputs.process_event(device.role(), &event);
        }
    }

    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    for device in devices {
        spawn_reader(device, tx.clone())?;
    }
    drop(tx);

    // Motor controller
    let serial = MotorSerial::open(
        &config.serial.port,
        config.serial.baud_rate,
        config.serial.timeout_ms,
    )?;
    let output = MotorOutput::new(DriveMixer::new(
        config.drive.kinematics,
        config.drive.squared_inputs,
        config.drive.inverted,
    ));

    let session = TeleopSession::start(TeleopParams::from_config(&config), &mut inputs);
    let status = LogStatusSink::new(config.control.status_interval_cycles);

    let mut tick = interval(tick_period(config.control.rate_hz));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Starting control loop at {}Hz", config.control.rate_hz);
    info!("Press Ctrl+C to exit");

    let mut control = ControlLoop {
        inputs,
        session,
        output,
        status,
        serial,
        send_failures: 0,
    };
    control.run(rx, tick, tokio::signal::ctrl_c()).await;

    info!("Total control cycles: {}", control.session.cycles());

    Ok(())
}

/// Everything the running loop owns
struct ControlLoop {
    inputs: InputState,
    session: TeleopSession,
    output: MotorOutput,
    status: LogStatusSink,
    serial: MotorSerial,
    send_failures: u64,
}

impl ControlLoop {
    /// Run until `shutdown` resolves, then send a stop frame
    async fn run<F: Future>(
        &mut self,
        mut rx: mpsc::Receiver<DeviceUpdate>,
        mut tick: Interval,
        shutdown: F,
    ) {
        // One future for the whole loop, so a Ctrl+C during a frame write is not lost
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                // Handle Ctrl+C for graceful shutdown
                _ = &mut shutdown => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }

                Some(update) = rx.recv() => self.apply(update),

                _ = tick.tick() => self.cycle().await,
            }
        }

        if let Err(e) = self.serial.send_frame(&MotorOutput::stop_frame()).await {
            error!("Failed to send stop frame: {}", e);
        }
    }

    fn apply(&mut self, update: DeviceUpdate) {
        match update {
            DeviceUpdate::Event(role, event) => self.inputs.process_event(role, &event),
            DeviceUpdate::Lost(role) => {
                warn!("Lost {}, treating its inputs as released", role);
                self.inputs.reset_role(role);
            }
        }
    }

    /// One control cycle plus the frame it produced
    async fn cycle(&mut self) {
        self.session
            .periodic(&mut self.inputs, &mut self.output, &mut self.status);

        let Some(frame) = self.output.take_frame() else {
            return;
        };

        match self.serial.send_frame(&frame).await {
            Ok(()) => {
                if self.send_failures > 0 {
                    info!("Motor link recovered after {} failed frames", self.send_failures);
                    self.send_failures = 0;
                }
            }
            Err(e) => {
                self.send_failures += 1;
                if self.send_failures == 1 {
                    warn!("Failed to send motor frame: {}", e);
                } else {
                    debug!("Failed to send motor frame: {}", e);
                }
            }
        }
    }
}

/// Console logging, plus a daily rolling file when a directory is configured
///
/// The returned guard flushes the file writer and must outlive the loop.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Joystick and console are required; every configured panel must open too
fn open_devices(config: &Config) -> Result<Vec<InputDevice>> {
    let mut devices = vec![
        InputDevice::open(
            DeviceRole::Joystick,
            &config.joystick.device_path,
            &config.joystick.name_hint,
        )?,
        InputDevice::open(
            DeviceRole::Console,
            &config.console.device_path,
            &config.console.name_hint,
        )?,
    ];

    for (index, path) in config.console.panel_device_paths.iter().enumerate() {
        devices.push(InputDevice::open(DeviceRole::Panel(index), path, "")?);
    }

    Ok(devices)
}

/// Forward every event from `device` until it disconnects
fn spawn_reader(device: InputDevice, tx: mpsc::Sender<DeviceUpdate>) -> Result<()> {
    let role = device.role();
    let mut stream = device.into_stream()?;

    tokio::spawn(async move {
        loop {
            match stream.next_event().await {
                Ok(event) => {
                    if tx.send(DeviceUpdate::Event(role, event)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read {}: {}", role, e);
                    let _ = tx.send(DeviceUpdate::Lost(role)).await;
                    break;
                }
            }
        }
    });

    Ok(())
}

fn tick_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}
