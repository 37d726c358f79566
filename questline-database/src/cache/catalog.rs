use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::database::Database;
use crate::impls::courses::list_courses;
use crate::model::course::Course;

#[derive(Debug)]
struct Snapshot {
    courses: Arc<Vec<Course>>,
    loaded_at: Instant,
}

/// In-process copy of the course catalog, reloaded once it is older than `max_age`.
#[derive(Clone, Debug)]
pub struct CatalogCache {
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    max_age: Duration,
}

impl CatalogCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(None)),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Current catalog, loading it first when missing or stale.
    pub async fn courses(&self, db: &Database) -> anyhow::Result<Arc<Vec<Course>>> {
        {
            let guard = self.snapshot.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.loaded_at.elapsed() < self.max_age {
                    return Ok(Arc::clone(&snapshot.courses));
                }
            }
        }

        self.refresh(db).await
    }

    /// Reload from the store. A failed reload keeps serving the previous snapshot.
    pub async fn refresh(&self, db: &Database) -> anyhow::Result<Arc<Vec<Course>>> {
        match list_courses(db).await {
            Ok(courses) => {
                let courses = Arc::new(courses);
                let mut guard = self.snapshot.write().await;
                *guard = Some(Snapshot {
                    courses: Arc::clone(&courses),
                    loaded_at: Instant::now(),
                });
                info!(course_count = courses.len(), "Course catalog refreshed.");
                Ok(courses)
            }
            Err(err) => {
                let guard = self.snapshot.read().await;
                match guard.as_ref() {
                    Some(stale) => {
                        warn!(?err, "Catalog refresh failed; serving previous snapshot.");
                        Ok(Arc::clone(&stale.courses))
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Refresh on a fixed interval for the lifetime of the process.
    pub fn spawn_refresh_task(&self, db: Database) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cache.max_age.max(Duration::from_secs(1)));
            loop {
                ticker.tick().await;
                if let Err(err) = cache.refresh(&db).await {
                    warn!(?err, "Scheduled catalog refresh failed.");
                }
            }
        })
    }
}
