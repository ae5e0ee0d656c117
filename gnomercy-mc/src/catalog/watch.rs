//! Continuous catalog reads
//!
//! A watch delivers the current query result immediately on subscription,
//! then re-queries and delivers again whenever a catalog event touches the
//! result set. Each watch runs on its own task and holds its own event bus
//! subscription; dropping or cancelling the handle tears the task down. A
//! receiver that goes away mid-delivery is logged and the task stops, it is
//! never an error for the writer side.

use std::future::Future;

use gnomercy_common::db::models::{Module, Review};
use gnomercy_common::error::Result;
use gnomercy_common::events::{CatalogEvent, EventBus};
use sqlx::SqlitePool;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::filter::ListingFilter;
use super::store;

/// Buffered deliveries per watch before the producer task awaits
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// Spawns continuous read tasks against one database and event bus
#[derive(Clone)]
pub struct CatalogWatcher {
    db: SqlitePool,
    bus: EventBus,
}

/// Handle to one continuous read
///
/// Deliveries arrive through [`CatalogWatch::next`]. The subscription is
/// released when the handle is dropped; [`CatalogWatch::cancel`] releases it
/// early and is safe to call more than once.
pub struct CatalogWatch<T> {
    rx: mpsc::Receiver<T>,
    cancel: CancellationToken,
}

impl<T> CatalogWatch<T> {
    /// Next delivery, or `None` once the watch has ended
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Release the subscription
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for CatalogWatch<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl CatalogWatcher {
    pub fn new(db: SqlitePool, bus: EventBus) -> Self {
        Self { db, bus }
    }

    /// Watch the filtered module listing
    ///
    /// The first delivery is the current listing; later deliveries follow
    /// any catalog change, since creations, photo updates and new reviews
    /// can all reorder or extend the listing.
    pub fn watch_listing(&self, filter: ListingFilter) -> CatalogWatch<Vec<Module>> {
        let compiled = filter.compile();
        let db = self.db.clone();
        self.spawn_watch(
            |_event| true,
            move || {
                let db = db.clone();
                let compiled = compiled.clone();
                async move { store::list_modules(&db, &compiled).await }
            },
        )
    }

    /// Watch a single module
    ///
    /// A missing module delivers `None`, both initially and if it never
    /// appears.
    pub fn watch_module(&self, module_id: Uuid) -> CatalogWatch<Option<Module>> {
        let db = self.db.clone();
        self.spawn_watch(
            move |event: &CatalogEvent| event.module_id() == module_id,
            move || {
                let db = db.clone();
                async move { store::get_module(&db, module_id).await }
            },
        )
    }

    /// Watch the review list of a single module, most recent first
    pub fn watch_reviews(&self, module_id: Uuid) -> CatalogWatch<Vec<Review>> {
        let db = self.db.clone();
        self.spawn_watch(
            move |event: &CatalogEvent| event.touches_reviews_of(module_id),
            move || {
                let db = db.clone();
                async move { store::list_reviews(&db, module_id).await }
            },
        )
    }

    fn spawn_watch<T, Match, Query, Fut>(&self, relevant: Match, query: Query) -> CatalogWatch<T>
    where
        T: Send + 'static,
        Match: Fn(&CatalogEvent) -> bool + Send + 'static,
        Query: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);

        // Subscribe before the initial query so a change landing between
        // the query and the first delivery still triggers a refresh.
        let mut events = self.bus.subscribe();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            match query().await {
                Ok(initial) => {
                    if tx.send(initial).await.is_err() {
                        debug!("Watch receiver went away before the first delivery");
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Initial watch query failed");
                    return;
                }
            }

            loop {
                let refresh = tokio::select! {
                    _ = task_cancel.cancelled() => {
                        debug!("Watch cancelled");
                        break;
                    }
                    event = events.recv() => match event {
                        Ok(event) => relevant(&event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Watch lagged behind the event bus, refreshing");
                            true
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };
                if !refresh {
                    continue;
                }

                match query().await {
                    Ok(value) => {
                        if tx.send(value).await.is_err() {
                            debug!("Watch receiver went away, stopping");
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Watch refresh query failed"),
                }
            }
        });

        CatalogWatch { rx, cancel }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnomercy_common::db::init::init_memory_database;
    use gnomercy_common::db::models::{Genre, NewModule, Players};
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn new_module(name: &str, genre: Genre) -> NewModule {
        NewModule {
            name: name.to_string(),
            genre,
            players: Players::Two,
            difficulty: 2,
            description: String::new(),
            photo: String::new(),
        }
    }

    async fn watcher() -> (SqlitePool, EventBus, CatalogWatcher) {
        let pool = init_memory_database().await.unwrap();
        let bus = EventBus::new(64);
        let watcher = CatalogWatcher::new(pool.clone(), bus.clone());
        (pool, bus, watcher)
    }

    #[tokio::test]
    async fn test_listing_watch_delivers_immediately() {
        let (pool, bus, watcher) = watcher().await;
        store::create_module(&pool, &bus, &new_module("A", Genre::Fantasy))
            .await
            .unwrap();

        let mut watch = watcher.watch_listing(ListingFilter::default());
        let first = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "A");
    }

    #[tokio::test]
    async fn test_listing_watch_redelivers_on_creation() {
        let (pool, bus, watcher) = watcher().await;

        let mut watch = watcher.watch_listing(ListingFilter::default());
        let first = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert!(first.is_empty());

        store::create_module(&pool, &bus, &new_module("B", Genre::Action))
            .await
            .unwrap();
        let second = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "B");
    }

    #[tokio::test]
    async fn test_module_watch_missing_delivers_none() {
        let (_pool, _bus, watcher) = watcher().await;

        let mut watch = watcher.watch_module(Uuid::new_v4());
        let first = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert!(first.is_none());
    }

    #[tokio::test]
    async fn test_module_watch_ignores_other_modules() {
        let (pool, bus, watcher) = watcher().await;
        let watched = store::create_module(&pool, &bus, &new_module("W", Genre::Noir))
            .await
            .unwrap();

        let mut watch = watcher.watch_module(watched.module_id);
        let first = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert_eq!(first.unwrap().name, "W");

        // A change to an unrelated module must not wake this watch
        store::create_module(&pool, &bus, &new_module("Other", Genre::Noir))
            .await
            .unwrap();
        assert!(timeout(Duration::from_millis(300), watch.next())
            .await
            .is_err());

        store::update_module_photo(&pool, &bus, watched.module_id, "/images/w/cover.png")
            .await
            .unwrap();
        let updated = timeout(WAIT, watch.next()).await.unwrap().unwrap();
        assert_eq!(updated.unwrap().photo, "/images/w/cover.png");
    }

    #[tokio::test]
    async fn test_cancel_ends_the_watch() {
        let (_pool, _bus, watcher) = watcher().await;

        let mut watch = watcher.watch_listing(ListingFilter::default());
        let _ = timeout(WAIT, watch.next()).await.unwrap().unwrap();

        watch.cancel();
        watch.cancel();
        let ended = timeout(WAIT, watch.next()).await.unwrap();
        assert!(ended.is_none());
    }

    #[tokio::test]
    async fn test_drop_releases_the_subscription() {
        let (_pool, bus, watcher) = watcher().await;

        {
            let mut watch = watcher.watch_listing(ListingFilter::default());
            let _ = timeout(WAIT, watch.next()).await.unwrap().unwrap();
            assert!(bus.subscriber_count() >= 1);
        }

        // The task observes the cancellation and drops its receiver
        let gone = timeout(WAIT, async {
            loop {
                if bus.subscriber_count() == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(gone.is_ok());
    }
}
