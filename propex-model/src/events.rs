use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity families that emit domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Listing,
    Property,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Listing => "listing",
            EntityKind::Property => "property",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle transitions that are broadcast to other services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing key a mutation publishes under. Fixed per (entity, event) pair;
/// consumers bind their queues with exactly these keys.
pub fn routing_key(entity: EntityKind, kind: EventKind) -> String {
    format!("{}.{}", entity.as_str(), kind.as_str())
}

/// Queue name bound to a routing key on the domain exchange.
pub fn queue_name(entity: EntityKind, kind: EventKind) -> String {
    format!("{}.{}.queue", entity.as_str(), kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_keys_are_fixed_per_entity_and_event() {
        assert_eq!(
            routing_key(EntityKind::Listing, EventKind::Created),
            "listing.created"
        );
        assert_eq!(
            routing_key(EntityKind::Listing, EventKind::Deleted),
            "listing.deleted"
        );
        assert_eq!(
            routing_key(EntityKind::Property, EventKind::Updated),
            "property.updated"
        );
    }

    #[test]
    fn queue_names_follow_routing_keys() {
        assert_eq!(
            queue_name(EntityKind::Property, EventKind::Created),
            "property.created.queue"
        );
    }
}
