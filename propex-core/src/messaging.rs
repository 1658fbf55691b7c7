use lapin::options::{
    BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde::Serialize;
use tracing::{debug, info};

use propex_config::AmqpConfig;
use propex_model::events::{EntityKind, EventKind, queue_name, routing_key};

use crate::Result;

const ALL_ENTITIES: [EntityKind; 2] = [EntityKind::Listing, EntityKind::Property];
const ALL_EVENTS: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

/// Publishes one message per mutating write on a topic exchange.
///
/// Publishes happen on the mutation's own execution path after the store
/// write has committed; there is no shared transaction, no retry, and no
/// confirm wait. A broker failure surfaces as an error the mutation site
/// logs — the committed write stands, so a write can succeed while its
/// event is lost.
#[derive(Clone)]
pub struct EventDispatcher {
    channel: Channel,
    exchange: String,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("exchange", &self.exchange)
            .finish()
    }
}

impl EventDispatcher {
    /// Connects to the broker and declares the full topology: one durable
    /// topic exchange, one durable queue per (entity, event) pair, bound
    /// under that pair's fixed routing key.
    pub async fn connect(config: &AmqpConfig) -> Result<Self> {
        info!(url = %config.url, exchange = %config.exchange, "connecting to message broker");
        let connection =
            Connection::connect(&config.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        for entity in ALL_ENTITIES {
            for kind in ALL_EVENTS {
                let queue = queue_name(entity, kind);
                let key = routing_key(entity, kind);
                channel
                    .queue_declare(
                        &queue,
                        QueueDeclareOptions {
                            durable: true,
                            ..Default::default()
                        },
                        FieldTable::default(),
                    )
                    .await?;
                channel
                    .queue_bind(
                        &queue,
                        &config.exchange,
                        &key,
                        QueueBindOptions::default(),
                        FieldTable::default(),
                    )
                    .await?;
            }
        }

        info!("message topology declared");
        Ok(Self {
            channel,
            exchange: config.exchange.clone(),
        })
    }

    /// Publishes the full post-mutation snapshot under the routing key
    /// fixed for (entity, kind). Fire-and-forget: the returned confirmation
    /// future is dropped without being awaited.
    pub async fn publish<T: Serialize + Sync>(
        &self,
        entity: EntityKind,
        kind: EventKind,
        snapshot: &T,
    ) -> Result<()> {
        let key = routing_key(entity, kind);
        let payload = serde_json::to_vec(snapshot)?;

        // Confirmation future dropped on purpose: no acknowledgment wait.
        let _confirm = self
            .channel
            .basic_publish(
                &self.exchange,
                &key,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(2),
            )
            .await?;

        debug!(routing_key = %key, bytes = payload.len(), "event published");
        Ok(())
    }
}
