use std::{path::PathBuf, sync::Arc};

use chrono::Local;
use rumqttc::{AsyncClient, QoS};
use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::{info, warn};

use smartac_common::{EventKind, TOPIC_GLOBAL_LOG, TOPIC_SERVER_LOG};

/// Append-only record of every accepted and rejected event. Each record goes
/// three places: the local log file, the server log topic, and the global
/// log topic that user clients watch. Sink failures are logged and swallowed;
/// losing a log line must never take the controller down.
#[derive(Clone)]
pub struct EventSink {
    mqtt: AsyncClient,
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl EventSink {
    pub fn new(mqtt: AsyncClient) -> Self {
        let path = std::env::var("SMARTAC_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.smartac/server-log.txt"));

        Self {
            mqtt,
            path: Arc::new(path),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn record(&self, kind: EventKind, detail: &str) {
        info!(kind = kind.as_str(), "{detail}");

        let line = format!(
            "{}\t{}\t{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            kind.as_str(),
            detail
        );

        if let Err(err) = self.append(&line).await {
            warn!("event log append failed: {err:#}");
        }

        for topic in [TOPIC_SERVER_LOG, TOPIC_GLOBAL_LOG] {
            if let Err(err) = self
                .mqtt
                .publish(topic, QoS::AtMostOnce, false, line.trim_end())
                .await
            {
                warn!("event publish to {topic} failed: {err}");
            }
        }
    }

    async fn append(&self, line: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_ref())
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}
