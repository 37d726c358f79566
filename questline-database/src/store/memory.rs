use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::SaveOutcome;
use crate::model::course::{Course, sort_catalog};
use crate::model::profile::UserProfile;

/// Development/test backend holding profile documents and the catalog in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
    courses: Arc<RwLock<Vec<Course>>>,
}

impl MemoryStore {
    pub fn new(mut catalog: Vec<Course>) -> Self {
        sort_catalog(&mut catalog);
        Self {
            profiles: Arc::default(),
            courses: Arc::new(RwLock::new(catalog)),
        }
    }

    pub async fn get_profile(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.read().await.get(uid).cloned()
    }

    pub async fn insert_profile_if_missing(&self, profile: &UserProfile) -> UserProfile {
        self.profiles
            .write()
            .await
            .entry(profile.uid.clone())
            .or_insert_with(|| profile.clone())
            .clone()
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> SaveOutcome {
        let mut profiles = self.profiles.write().await;
        let Some(stored) = profiles.get_mut(&profile.uid) else {
            return SaveOutcome::Conflict;
        };
        if stored.version != profile.version {
            return SaveOutcome::Conflict;
        }

        let mut next = profile.clone();
        next.version += 1;
        *stored = next.clone();
        SaveOutcome::Saved(next)
    }

    pub async fn list_courses(&self) -> Vec<Course> {
        self.courses.read().await.clone()
    }

    #[cfg(test)]
    pub(crate) async fn upsert_course(&self, course: &Course) {
        let mut courses = self.courses.write().await;
        match courses.iter_mut().find(|existing| existing.id == course.id) {
            Some(existing) => *existing = course.clone(),
            None => courses.push(course.clone()),
        }
        sort_catalog(&mut courses);
    }
}
