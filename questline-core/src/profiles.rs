use thiserror::Error;
use tracing::warn;

use questline_database::impls::profiles::{get_or_create_profile, save_profile};
use questline_database::model::course::Course;
use questline_database::model::profile::UserProfile;
use questline_database::{Database, SaveOutcome};

use crate::auth::Identity;

/// Read-modify-write attempts before giving up on a contended profile.
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ProfileUpdateError {
    #[error("profile was modified concurrently")]
    Conflict,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Load (or create) the learner's profile, apply `apply`, and persist it.
///
/// The stored email follows the token's email whenever one is present.
/// Unchanged profiles are not written. When another request saved in between,
/// the profile is re-read and `apply` runs again on the fresh copy.
pub async fn update_profile<T, F>(
    db: &Database,
    identity: &Identity,
    catalog: &[Course],
    mut apply: F,
) -> Result<(UserProfile, T), ProfileUpdateError>
where
    F: FnMut(&mut UserProfile) -> T,
{
    for attempt in 1..=MAX_SAVE_ATTEMPTS {
        let original = get_or_create_profile(db, &identity.uid, &identity.email, catalog).await?;
        let mut profile = original.clone();
        if !identity.email.is_empty() && profile.email != identity.email {
            profile.email = identity.email.clone();
        }
        let value = apply(&mut profile);

        if profile == original {
            return Ok((profile, value));
        }

        match save_profile(db, &profile).await? {
            SaveOutcome::Saved(saved) => return Ok((saved, value)),
            SaveOutcome::Conflict => {
                warn!(uid = %identity.uid, attempt, "Profile save conflicted; retrying.");
            }
        }
    }

    Err(ProfileUpdateError::Conflict)
}

#[cfg(test)]
mod tests {
    use questline_database::Database;
    use questline_database::impls::profiles::{get_profile, save_profile};
    use questline_database::model::course::builtin_catalog;

    use super::{ProfileUpdateError, update_profile};
    use crate::auth::Identity;

    fn identity() -> Identity {
        Identity {
            uid: "u1".to_owned(),
            email: "u1@example.com".to_owned(),
        }
    }

    #[tokio::test]
    async fn applies_and_persists() {
        let db = Database::in_memory(builtin_catalog());
        let (profile, ()) = update_profile(&db, &identity(), &builtin_catalog(), |profile| {
            profile.profile.total_xp += 5;
        })
        .await
        .expect("update");

        assert_eq!(profile.profile.total_xp, 5);
        assert_eq!(profile.version, 1);
        let stored = get_profile(&db, "u1").await.expect("get").expect("exists");
        assert_eq!(stored, profile);
    }

    #[tokio::test]
    async fn unchanged_profiles_are_not_written() {
        let db = Database::in_memory(builtin_catalog());
        let (profile, ()) = update_profile(&db, &identity(), &builtin_catalog(), |_| {})
            .await
            .expect("noop");
        assert_eq!(profile.version, 0);
    }

    #[tokio::test]
    async fn stored_email_follows_the_token() {
        let db = Database::in_memory(builtin_catalog());
        update_profile(&db, &identity(), &builtin_catalog(), |_| {})
            .await
            .expect("create");

        let moved = Identity {
            uid: "u1".to_owned(),
            email: "new@example.com".to_owned(),
        };
        let (profile, ()) = update_profile(&db, &moved, &builtin_catalog(), |_| {})
            .await
            .expect("update");
        assert_eq!(profile.email, "new@example.com");

        let anonymous = Identity {
            uid: "u1".to_owned(),
            email: String::new(),
        };
        let (profile, ()) = update_profile(&db, &anonymous, &builtin_catalog(), |_| {})
            .await
            .expect("keep");
        assert_eq!(profile.email, "new@example.com");

        let stored = get_profile(&db, "u1").await.expect("get").expect("exists");
        assert_eq!(stored.email, "new@example.com");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retries_after_a_concurrent_write() {
        let db = Database::in_memory(builtin_catalog());
        let mut calls = 0;

        let (profile, ()) = update_profile(&db, &identity(), &builtin_catalog(), |profile| {
            calls += 1;
            if calls == 1 {
                // Simulate another request landing between our read and write.
                let mut competing = profile.clone();
                competing.profile.badges.push("other".to_owned());
                block_on(save_profile(&db, &competing)).expect("competing save");
            }
            profile.profile.total_xp += 20;
        })
        .await
        .expect("second attempt wins");

        assert_eq!(calls, 2);
        assert_eq!(profile.profile.total_xp, 20);
        assert_eq!(profile.profile.badges, vec!["other".to_owned()]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn gives_up_when_always_contended() {
        let db = Database::in_memory(builtin_catalog());
        let result = update_profile(&db, &identity(), &builtin_catalog(), |profile| {
            let mut competing = profile.clone();
            competing.profile.current_xp += 1;
            block_on(save_profile(&db, &competing)).expect("competing save");
            profile.profile.total_xp += 1;
        })
        .await;

        assert!(matches!(result, Err(ProfileUpdateError::Conflict)));
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
    }
}
