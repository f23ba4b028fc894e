use std::{io::ErrorKind, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::NaiveDateTime;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use kitchen_timer_common::{
    CivilTimestamp, ClockSource, ControlLoop, EngineAction, Gate, Peripherals, RuntimeConfig,
};

use crate::console::{
    self, ChannelKeypad, ConsoleBuzzer, ConsoleDisplay, ConsoleRing, InstantClock, SystemRtc,
};

const PROVISIONING_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

struct ConfigStore {
    runtime_path: PathBuf,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = ConfigStore::new();
    let runtime = store.load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config from store: {err:#}");
        RuntimeConfig::default()
    });

    let mut rtc = SystemRtc::default();
    if let Ok(raw) = std::env::var("KITCHEN_TIMER_SET_UTC") {
        let utc = parse_provisioning_time(&raw)?;
        rtc.set(utc);
        info!("rtc set to {utc}");
    }

    let (key_tx, key_rx) = mpsc::unbounded_channel();
    console::spawn_keypad_reader(key_tx);

    let peripherals = Peripherals {
        keys: Box::new(ChannelKeypad::new(key_rx)),
        clock: Box::new(rtc),
        display: Box::new(ConsoleDisplay::default()),
        ring: Box::new(ConsoleRing::new(runtime.timer.animation_color)),
        alarm: Box::new(ConsoleBuzzer::default()),
        monotonic: Box::new(InstantClock::new()),
    };
    let mut control = ControlLoop::new(runtime.timer.clone(), peripherals);
    info!("current rtc date and time (UTC): {}", control.read_clock());

    run_boot_sequence(&mut control).await;

    let mut status_gate = Gate::new(runtime.status_log_interval_ms, control.now_millis());
    let mut interval = tokio::time::interval(Duration::from_millis(runtime.loop_period_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("kitchen timer running; type 0-9, * or # and press enter");
    let mut state = control.engine().state();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut shutdown => {
                control.silence();
                result.context("failed to listen for ctrl-c")?;
                info!("shutting down");
                return Ok(());
            }
        }

        if let Some(key) = control.iterate() {
            debug!(?key, "key pressed");
        }

        let next = control.engine().state();
        if next != state {
            info!(from = state.as_str(), to = next.as_str(), "state changed");
            state = next;
        }

        if status_gate.should_fire(control.now_millis()) {
            match serde_json::to_string(&control.engine().status()) {
                Ok(body) => debug!("status {body}"),
                Err(err) => warn!("status serialization failed: {err}"),
            }
        }
    }
}

async fn run_boot_sequence(control: &mut ControlLoop) {
    for action in control.boot_sequence() {
        if let EngineAction::Delay(ms) = action {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            continue;
        }
        control.apply(&action);
    }
}

fn parse_provisioning_time(raw: &str) -> anyhow::Result<CivilTimestamp> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), PROVISIONING_FORMAT)
        .with_context(|| {
            format!("KITCHEN_TIMER_SET_UTC must look like 2026-01-05T18:18:00, got {raw:?}")
        })?;
    Ok(naive.into())
}

impl ConfigStore {
    fn new() -> Self {
        let data_dir = std::env::var("KITCHEN_TIMER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.kitchen-timer"));

        Self {
            runtime_path: data_dir.join("runtime.json"),
        }
    }

    async fn load_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        match tokio::fs::read(&self.runtime_path).await {
            Ok(raw) => RuntimeConfig::from_json(&raw)
                .with_context(|| format!("invalid config in {}", self.runtime_path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }
}
