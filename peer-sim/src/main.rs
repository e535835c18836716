//! Host-side simulator of the remote peer: answers the controller's
//! temperature requests with synthetic readings, acknowledges actuator
//! commands on the peer log topic, and can optionally walk an occupancy
//! pattern for exercising the vacancy timeout end to end.

use std::time::Duration;

use anyhow::Context;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use tracing::{info, warn};

use smartac_common::{
    TOPIC_CMD_MODE, TOPIC_CMD_POWER, TOPIC_CMD_TARGET, TOPIC_CMD_TEMP_REQUEST, TOPIC_PEER_LOG,
    TOPIC_PEER_OCC_CHANGE, TOPIC_PEER_TEMP,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mqtt_host = std::env::var("MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mqtt_port = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(1883);

    let mut mqtt_options = MqttOptions::new("smartac-peer-sim", mqtt_host, mqtt_port);
    if let Ok(user) = std::env::var("MQTT_USER") {
        let pass = std::env::var("MQTT_PASS").unwrap_or_default();
        mqtt_options.set_credentials(user, pass);
    }

    let (mqtt, mut eventloop) = AsyncClient::new(mqtt_options, 32);

    for topic in [
        TOPIC_CMD_TEMP_REQUEST,
        TOPIC_CMD_POWER,
        TOPIC_CMD_MODE,
        TOPIC_CMD_TARGET,
    ] {
        mqtt.subscribe(topic, QoS::AtMostOnce).await?;
    }

    mqtt.publish(TOPIC_PEER_LOG, QoS::AtMostOnce, false, "peer simulator online")
        .await
        .context("failed to publish online notice")?;

    if std::env::var("SMARTAC_SIM_OCCUPANCY").is_ok() {
        spawn_occupancy_pattern(mqtt.clone());
    }

    info!("peer simulator started");

    let mut readings: u64 = 0;
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::Publish(message))) => {
                let payload = String::from_utf8_lossy(&message.payload).into_owned();
                match message.topic.as_str() {
                    TOPIC_CMD_TEMP_REQUEST => {
                        readings = readings.saturating_add(1);
                        let temperature = 26.0 + ((readings % 10) as f32 * 0.3);
                        mqtt.publish(
                            TOPIC_PEER_TEMP,
                            QoS::AtMostOnce,
                            false,
                            format!("{temperature:.1}"),
                        )
                        .await
                        .context("failed to publish temperature reading")?;
                    }
                    topic => {
                        info!("actuator command on {topic}: {payload}");
                        mqtt.publish(
                            TOPIC_PEER_LOG,
                            QoS::AtMostOnce,
                            false,
                            format!("executed {topic} command '{payload}'"),
                        )
                        .await
                        .context("failed to publish command acknowledgment")?;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!("peer sim mqtt poll error: {err}");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

/// Walks people in and out of the room: +1, +1, then -1, -1, repeating.
/// Two consecutive departures leave the room empty long enough to arm the
/// vacancy timer on the controller side.
fn spawn_occupancy_pattern(mqtt: AsyncClient) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(45));
        let deltas = [1, 1, -1, -1];
        let mut step = 0usize;

        loop {
            interval.tick().await;
            let delta = deltas[step % deltas.len()];
            step += 1;

            if let Err(err) = mqtt
                .publish(
                    TOPIC_PEER_OCC_CHANGE,
                    QoS::AtMostOnce,
                    false,
                    delta.to_string(),
                )
                .await
            {
                warn!("occupancy pattern publish failed: {err}");
            }
        }
    });
}
