//! Event system for catalog change notification
//!
//! Writers emit a [`CatalogEvent`] after each committed change; continuous
//! readers subscribe through the [`EventBus`] and re-query whenever an event
//! touches their result set. Events are emitted only after the database
//! transaction commits, so a subscriber that re-queries on receipt always
//! observes the new state or a newer one, never an uncommitted intermediate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Catalog change events
///
/// Every variant carries the module it concerns and the UTC timestamp of the
/// committed change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// A module was created, either directly or by sample seeding
    ModuleCreated {
        module_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    /// A module's own fields changed (currently only the cover photo)
    ModuleUpdated {
        module_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    /// A review was added and the module's rating statistics were recomputed
    ReviewAdded {
        module_id: Uuid,
        review_id: Uuid,
        rating: i64,
        timestamp: DateTime<Utc>,
    },
}

impl CatalogEvent {
    /// Event type name, as used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::ModuleCreated { .. } => "ModuleCreated",
            CatalogEvent::ModuleUpdated { .. } => "ModuleUpdated",
            CatalogEvent::ReviewAdded { .. } => "ReviewAdded",
        }
    }

    /// The module this event concerns
    pub fn module_id(&self) -> Uuid {
        match self {
            CatalogEvent::ModuleCreated { module_id, .. }
            | CatalogEvent::ModuleUpdated { module_id, .. }
            | CatalogEvent::ReviewAdded { module_id, .. } => *module_id,
        }
    }

    /// Whether this event can change the review list of `module_id`
    pub fn touches_reviews_of(&self, module_id: Uuid) -> bool {
        match self {
            CatalogEvent::ReviewAdded { module_id: id, .. }
            | CatalogEvent::ModuleCreated { module_id: id, .. } => *id == module_id,
            CatalogEvent::ModuleUpdated { .. } => false,
        }
    }
}

/// Broadcast bus carrying [`CatalogEvent`]s to all subscribers
///
/// # Examples
///
/// ```
/// use gnomercy_common::events::{CatalogEvent, EventBus};
/// use uuid::Uuid;
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(CatalogEvent::ModuleCreated {
///     module_id: Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    ///
    /// A subscriber that falls more than `capacity` events behind observes a
    /// lag error on its receiver and can recover by re-querying.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` when no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CatalogEvent,
    ) -> Result<usize, broadcast::error::SendError<CatalogEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the absence of subscribers
    ///
    /// Catalog writers use this form: a change with no continuous reader
    /// attached is not an error.
    pub fn emit_lossy(&self, event: CatalogEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
