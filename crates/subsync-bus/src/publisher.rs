//! Event publication via Redis Streams.

use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, info};

use subsync_models::JobEvent;

use crate::error::{BusError, BusResult};

/// Bus configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for job notifications
    pub stream_name: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "job.notifications".to_string(),
        }
    }
}

impl BusConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            stream_name: std::env::var("JOB_STREAM")
                .unwrap_or_else(|_| "job.notifications".to_string()),
        }
    }
}

/// Job notification publisher.
///
/// Owns the one process-wide bus connection. `connect` is called once at
/// startup and `close` once at shutdown; every request task publishes
/// through the same multiplexed connection, which handles its own internal
/// serialization. While disconnected, `publish` fails fast instead of
/// blocking.
pub struct EventPublisher {
    client: redis::Client,
    stream_name: String,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl EventPublisher {
    /// Create a new publisher. Performs no I/O until `connect`.
    pub fn new(config: BusConfig) -> BusResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self {
            client,
            stream_name: config.stream_name,
            conn: RwLock::new(None),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> BusResult<Self> {
        Self::new(BusConfig::from_env())
    }

    /// Open the bus connection. Called once at process startup; a failure
    /// here leaves the publisher disconnected but usable (publishes will
    /// fail fast).
    pub async fn connect(&self) -> BusResult<()> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BusError::connection_failed(e.to_string()))?;

        *self.conn.write().await = Some(conn);
        info!("Connected to bus, stream: {}", self.stream_name);
        Ok(())
    }

    /// Whether a connection has been established.
    pub async fn is_connected(&self) -> bool {
        self.conn.read().await.is_some()
    }

    /// Publish a job event to the notification stream.
    ///
    /// Fire-and-forget: at-least-once delivery with no ordering guarantee
    /// across calls, no retry on failure.
    ///
    /// Returns the broker-assigned message id.
    pub async fn publish_event(&self, event: &JobEvent) -> BusResult<String> {
        self.publish(&event.to_bytes()?).await
    }

    /// Publish a raw payload to the notification stream.
    pub async fn publish(&self, payload: &[u8]) -> BusResult<String> {
        // Clone the handle out so the lock is not held across the write
        let mut conn = match self.conn.read().await.as_ref() {
            Some(conn) => conn.clone(),
            None => return Err(BusError::NotConnected),
        };

        let message_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("*")
            .arg("event")
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| BusError::publish_failed(e.to_string()))?;

        debug!(
            "Published event to {} as message {}",
            self.stream_name, message_id
        );
        Ok(message_id)
    }

    /// Release the bus connection. Called once at process shutdown.
    /// In-flight publishes may be dropped.
    pub async fn close(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Closed bus connection");
        }
    }
}
