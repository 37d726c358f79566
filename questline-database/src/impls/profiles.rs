use anyhow::Context as _;
use sqlx::types::Json;
use tracing::info;

use questline_utils::time::now_unix_secs;

use crate::database::{Database, StoreBackend};
use crate::model::course::Course;
use crate::model::profile::UserProfile;
use crate::store::SaveOutcome;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    version: i64,
    document: Json<UserProfile>,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        let mut profile = self.document.0;
        profile.version = self.version;
        profile.normalize();
        profile
    }
}

/// Fetch a stored profile document.
pub async fn get_profile(db: &Database, uid: &str) -> anyhow::Result<Option<UserProfile>> {
    match db.backend() {
        StoreBackend::Memory(store) => Ok(store.get_profile(uid).await.map(|mut profile| {
            profile.normalize();
            profile
        })),
        StoreBackend::Postgres(pool) => {
            let row: Option<ProfileRow> =
                sqlx::query_as("SELECT version, document FROM user_profiles WHERE uid = $1")
                    .bind(uid)
                    .fetch_optional(pool)
                    .await
                    .with_context(|| format!("failed to load profile `{uid}`"))?;

            Ok(row.map(ProfileRow::into_profile))
        }
    }
}

/// Return the learner's profile, creating and persisting a default one on first use.
///
/// Creation is an insert-if-absent, so two first requests racing for the same
/// uid both end up with the single stored document.
pub async fn get_or_create_profile(
    db: &Database,
    uid: &str,
    email: &str,
    catalog: &[Course],
) -> anyhow::Result<UserProfile> {
    if let Some(profile) = get_profile(db, uid).await? {
        return Ok(profile);
    }

    let fresh = UserProfile::new_default(uid, email, catalog);

    match db.backend() {
        StoreBackend::Memory(store) => {
            let stored = store.insert_profile_if_missing(&fresh).await;
            info!(uid, "Created learner profile.");
            Ok(stored)
        }
        StoreBackend::Postgres(pool) => {
            let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;
            let inserted = sqlx::query(
                "INSERT INTO user_profiles (uid, email, version, document, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $5)
                 ON CONFLICT (uid) DO NOTHING",
            )
            .bind(uid)
            .bind(email)
            .bind(fresh.version)
            .bind(Json(&fresh))
            .bind(now)
            .execute(pool)
            .await
            .with_context(|| format!("failed to create profile `{uid}`"))?
            .rows_affected();

            if inserted > 0 {
                info!(uid, "Created learner profile.");
            }

            get_profile(db, uid)
                .await?
                .with_context(|| format!("profile `{uid}` missing after insert"))
        }
    }
}

/// Overwrite the whole document if nobody saved since `profile.version` was read.
pub async fn save_profile(db: &Database, profile: &UserProfile) -> anyhow::Result<SaveOutcome> {
    match db.backend() {
        StoreBackend::Memory(store) => Ok(store.save_profile(profile).await),
        StoreBackend::Postgres(pool) => {
            let mut next = profile.clone();
            next.version = profile.version + 1;
            let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

            let updated = sqlx::query(
                "UPDATE user_profiles
                 SET document = $1, email = $2, version = $3, updated_at = $4
                 WHERE uid = $5 AND version = $6",
            )
            .bind(Json(&next))
            .bind(&next.email)
            .bind(next.version)
            .bind(now)
            .bind(&next.uid)
            .bind(profile.version)
            .execute(pool)
            .await
            .with_context(|| format!("failed to save profile `{}`", profile.uid))?
            .rows_affected();

            if updated == 0 {
                Ok(SaveOutcome::Conflict)
            } else {
                Ok(SaveOutcome::Saved(next))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_or_create_profile, get_profile, save_profile};
    use crate::database::Database;
    use crate::model::course::builtin_catalog;
    use crate::store::SaveOutcome;

    #[tokio::test]
    async fn creates_once_then_returns_stored() {
        let db = Database::in_memory(builtin_catalog());
        assert!(get_profile(&db, "u1").await.expect("get").is_none());

        let created = get_or_create_profile(&db, "u1", "a@b.c", &builtin_catalog())
            .await
            .expect("create");
        assert_eq!(created.profile.level, 1);

        let again = get_or_create_profile(&db, "u1", "other@b.c", &[])
            .await
            .expect("fetch");
        assert_eq!(again, created);
    }

    #[tokio::test]
    async fn stale_versions_conflict() {
        let db = Database::in_memory(builtin_catalog());
        let profile = get_or_create_profile(&db, "u1", "", &builtin_catalog())
            .await
            .expect("create");

        let mut first = profile.clone();
        first.profile.total_xp = 20;
        let SaveOutcome::Saved(saved) = save_profile(&db, &first).await.expect("save") else {
            panic!("first save should win");
        };
        assert_eq!(saved.version, profile.version + 1);

        let mut second = profile;
        second.profile.total_xp = 40;
        assert_eq!(
            save_profile(&db, &second).await.expect("save"),
            SaveOutcome::Conflict
        );

        let stored = get_profile(&db, "u1").await.expect("get").expect("exists");
        assert_eq!(stored.profile.total_xp, 20);
    }
}
