use std::{
    sync::{Arc, OnceLock},
    time::{Duration, Instant},
};

use anyhow::Context;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tokio::sync::Mutex;
use tracing::{info, warn};

use smartac_common::{
    dispatch, ControlConfig, ControlEngine, EngineAction, EventKind, Inbound, NetworkConfig,
    Outcome, TOPIC_CMD_MODE, TOPIC_CMD_POWER, TOPIC_CMD_TARGET, TOPIC_CMD_TEMP_REQUEST,
    TOPIC_PEER_LOG, TOPIC_PEER_OCC_CHANGE, TOPIC_PEER_TEMP, TOPIC_SERVER_STATUS, TOPIC_USER_MODE,
    TOPIC_USER_OCCUPANCY, TOPIC_USER_POWER, TOPIC_USER_REFRESH, TOPIC_USER_TARGET,
};

use crate::{
    sensor::{SensorDriver, SimulatedSensor},
    sink::EventSink,
};

const MAX_MQTT_PAYLOAD_BYTES: usize = 512;

#[derive(Clone)]
struct AppState {
    engine: Arc<Mutex<ControlEngine>>,
    mqtt: AsyncClient,
    sink: EventSink,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = ControlConfig::default();
    config.sanitize();

    let network = network_config_from_env();
    let mut mqtt_options =
        MqttOptions::new("smartac-controller", network.mqtt_host, network.mqtt_port);
    if !network.mqtt_user.is_empty() {
        mqtt_options.set_credentials(network.mqtt_user, network.mqtt_pass);
    }

    let (mqtt, eventloop) = AsyncClient::new(mqtt_options, 64);

    let app_state = AppState {
        engine: Arc::new(Mutex::new(ControlEngine::new(config.clone()))),
        sink: EventSink::new(mqtt.clone()),
        mqtt,
    };

    subscribe_topics(&app_state.mqtt).await?;
    spawn_mqtt_loop(app_state.clone(), eventloop);
    spawn_control_loop(app_state.clone(), config.tick_interval_ms);
    spawn_poll_loop(
        app_state.clone(),
        config.poll_interval_ms,
        SimulatedSensor::new(),
    );

    info!("smart AC controller active");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("shutting down");
    app_state.mqtt.disconnect().await?;
    Ok(())
}

fn network_config_from_env() -> NetworkConfig {
    let defaults = NetworkConfig::default();
    NetworkConfig {
        mqtt_host: std::env::var("MQTT_HOST").unwrap_or(defaults.mqtt_host),
        mqtt_port: std::env::var("MQTT_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.mqtt_port),
        mqtt_user: std::env::var("MQTT_USER").unwrap_or(defaults.mqtt_user),
        mqtt_pass: std::env::var("MQTT_PASS").unwrap_or(defaults.mqtt_pass),
    }
}

async fn subscribe_topics(mqtt: &AsyncClient) -> anyhow::Result<()> {
    let topics = [
        TOPIC_PEER_TEMP,
        TOPIC_PEER_OCC_CHANGE,
        TOPIC_PEER_LOG,
        TOPIC_USER_POWER,
        TOPIC_USER_MODE,
        TOPIC_USER_TARGET,
        TOPIC_USER_OCCUPANCY,
        TOPIC_USER_REFRESH,
    ];

    for topic in topics {
        mqtt.subscribe(topic, QoS::AtMostOnce).await?;
    }
    Ok(())
}

fn spawn_mqtt_loop(app_state: AppState, mut eventloop: rumqttc::EventLoop) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    if let Err(err) =
                        handle_mqtt_message(&app_state, &message.topic, message.payload.to_vec())
                            .await
                    {
                        warn!("mqtt message handling error: {err:#}");
                    }
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

/// Fast tick: quiet-mode rule and vacancy-timer evaluation.
fn spawn_control_loop(app_state: AppState, tick_interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_interval_ms));

        loop {
            interval.tick().await;
            let outcome = {
                let mut engine = app_state.engine.lock().await;
                engine.tick(monotonic_ms())
            };
            apply_outcome(&app_state, outcome).await;
        }
    });
}

/// Slow tick: peer liveness bookkeeping, temperature request, local sensor
/// read. A failed read skips the rest of the period and retries next time.
fn spawn_poll_loop(app_state: AppState, poll_interval_ms: u64, mut sensor: impl SensorDriver + 'static) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(poll_interval_ms));

        loop {
            interval.tick().await;

            let outcome = {
                let mut engine = app_state.engine.lock().await;
                engine.begin_poll()
            };
            apply_outcome(&app_state, outcome).await;

            match sensor.read_temperature() {
                Ok(value) => {
                    let outcome = {
                        let mut engine = app_state.engine.lock().await;
                        engine.local_temperature(value)
                    };
                    apply_outcome(&app_state, outcome).await;
                }
                Err(err) => {
                    app_state
                        .sink
                        .record(EventKind::SensorFailure, &err.to_string())
                        .await;
                }
            }
        }
    });
}

async fn handle_mqtt_message(
    app_state: &AppState,
    topic: &str,
    payload: Vec<u8>,
) -> anyhow::Result<()> {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return Ok(());
    }

    let message = String::from_utf8(payload).context("non utf8 mqtt payload")?;
    let Some(inbound) = Inbound::from_topic(topic, &message) else {
        return Ok(());
    };

    let outcome = {
        let mut engine = app_state.engine.lock().await;
        dispatch(&mut engine, inbound, monotonic_ms())
    };
    apply_outcome(app_state, outcome).await;
    Ok(())
}

/// Executes an engine outcome against the outside world, strictly in order:
/// event records first, then actuator commands (with their delays), then the
/// snapshot reply. Runs outside the engine lock so no network I/O or sleep
/// happens while state is held.
async fn apply_outcome(app_state: &AppState, outcome: Outcome) {
    for notice in &outcome.notices {
        app_state.sink.record(notice.kind, &notice.detail).await;
    }

    for action in outcome.actions {
        let (topic, payload) = match action {
            EngineAction::Delay(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                continue;
            }
            EngineAction::Power(power) => (TOPIC_CMD_POWER, power.as_str().to_string()),
            EngineAction::SetMode(mode) => (TOPIC_CMD_MODE, mode.as_str().to_string()),
            EngineAction::SetTarget(temp) => (TOPIC_CMD_TARGET, temp.to_string()),
            // Payload is irrelevant for a request but cannot be empty.
            EngineAction::RequestPeerTemp => (TOPIC_CMD_TEMP_REQUEST, "0".to_string()),
        };

        if let Err(err) = app_state
            .mqtt
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
        {
            warn!("actuator command publish to {topic} failed: {err}");
        }
    }

    if let Some(snapshot) = outcome.snapshot {
        match serde_json::to_vec(&snapshot) {
            Ok(body) => {
                if let Err(err) = app_state
                    .mqtt
                    .publish(TOPIC_SERVER_STATUS, QoS::AtMostOnce, false, body)
                    .await
                {
                    warn!("status publish failed: {err}");
                }
            }
            Err(err) => warn!("status serialization failed: {err}"),
        }
    }
}

fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
