use serde::{Deserialize, Serialize};

use questline_database::model::course::Course;
use questline_database::model::profile::{
    CourseProgress, ProfileStats, TheoreticalRecord, UserProfile,
};

/// A catalog course with the learner's progress laid over it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseView {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub sub_levels: u32,
    pub current: u32,
    pub completed_sub_levels: Vec<u32>,
    pub theoretical: TheoreticalRecord,
}

impl CourseView {
    /// The per-user part of the view, as it would be stored.
    pub fn progress(&self) -> CourseProgress {
        CourseProgress {
            course_id: self.id,
            current: self.current,
            completed_sub_levels: self.completed_sub_levels.clone(),
            theoretical: self.theoretical,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressView {
    pub goals: Vec<String>,
    pub courses: Vec<CourseView>,
}

/// Profile as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub uid: String,
    pub email: String,
    pub profile: ProfileStats,
    pub progress: ProgressView,
}

/// Overlay user progress onto the catalog, in catalog order.
///
/// Courses the user never touched come back as not started. Progress for
/// courses no longer in the catalog is left out of the view. `current` is
/// clamped and completed entries outside the course are hidden, so a
/// catalog edit never needs a stored-progress migration.
pub fn merge_courses(catalog: &[Course], progress: &[CourseProgress]) -> Vec<CourseView> {
    catalog
        .iter()
        .map(|course| {
            let user = progress
                .iter()
                .find(|entry| entry.course_id == course.id)
                .cloned()
                .unwrap_or_else(|| CourseProgress::not_started(course.id));

            let mut completed: Vec<u32> = user
                .completed_sub_levels
                .iter()
                .copied()
                .filter(|sub_level| course.has_sub_level(*sub_level))
                .collect();
            completed.sort_unstable();
            completed.dedup();

            CourseView {
                id: course.id,
                title: course.title.clone(),
                description: course.description.clone(),
                sub_levels: course.sub_levels,
                current: user.current.clamp(1, course.sub_levels.max(1)),
                completed_sub_levels: completed,
                theoretical: user.theoretical,
            }
        })
        .collect()
}

pub fn profile_view(profile: &UserProfile, catalog: &[Course]) -> ProfileView {
    ProfileView {
        uid: profile.uid.clone(),
        email: profile.email.clone(),
        profile: profile.profile.clone(),
        progress: ProgressView {
            goals: profile.progress.goals.clone(),
            courses: merge_courses(catalog, &profile.progress.courses),
        },
    }
}

#[cfg(test)]
mod tests {
    use questline_database::model::course::Course;
    use questline_database::model::profile::{CourseProgress, TheoreticalRecord};
    use questline_utils::grade::Grade;

    use super::{CourseView, merge_courses};

    fn catalog() -> Vec<Course> {
        vec![
            Course {
                id: 2,
                title: "Second".to_owned(),
                description: String::new(),
                sub_levels: 4,
                position: 1,
            },
            Course {
                id: 1,
                title: "First".to_owned(),
                description: String::new(),
                sub_levels: 3,
                position: 2,
            },
        ]
    }

    fn stored() -> Vec<CourseProgress> {
        vec![
            CourseProgress {
                course_id: 1,
                current: 3,
                completed_sub_levels: vec![2, 1, 2, 7],
                theoretical: TheoreticalRecord {
                    score: 90,
                    grade: Grade::Gold,
                },
            },
            CourseProgress::not_started(42),
        ]
    }

    #[test]
    fn follows_catalog_order_and_defaults_missing() {
        let merged = merge_courses(&catalog(), &stored());
        let ids: Vec<u64> = merged.iter().map(|course| course.id).collect();
        assert_eq!(ids, vec![2, 1]);

        assert_eq!(merged[0].current, 1);
        assert!(merged[0].completed_sub_levels.is_empty());
        assert_eq!(merged[0].theoretical, TheoreticalRecord::default());

        assert_eq!(merged[1].current, 3);
        assert_eq!(merged[1].completed_sub_levels, vec![1, 2]);
        assert_eq!(merged[1].theoretical.grade, Grade::Gold);
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge_courses(&catalog(), &stored());
        let again = merge_courses(&catalog(), &stored());
        assert_eq!(once, again);

        let round_tripped: Vec<CourseProgress> = once.iter().map(CourseView::progress).collect();
        assert_eq!(merge_courses(&catalog(), &round_tripped), once);
    }

    #[test]
    fn catalog_shrink_clamps_current() {
        let mut shrunk = catalog();
        shrunk[1].sub_levels = 2;
        let merged = merge_courses(&shrunk, &stored());
        assert_eq!(merged[1].current, 2);
        assert_eq!(merged[1].completed_sub_levels, vec![1, 2]);
    }

    #[test]
    fn catalog_edits_show_through() {
        let mut renamed = catalog();
        renamed[1].title = "First, revised".to_owned();
        let merged = merge_courses(&renamed, &stored());
        assert_eq!(merged[1].title, "First, revised");
        assert_eq!(merged[1].current, 3);
    }
}
