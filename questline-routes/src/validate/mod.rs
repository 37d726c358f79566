//! Progress-granting endpoints: sub-level code checks and theoretical quiz scores.

pub mod course_one;
pub mod sub_level;
pub mod theoretical;

use std::sync::Arc;

use questline_core::AppState;
use questline_database::model::course::Course;
use questline_utils::java::Rule;

use crate::error::AppError;

/// Rule set for one sub-level, if that course has code exercises.
pub fn sub_level_rules(course_id: u64, sub_level: u32) -> Option<&'static [Rule]> {
    match course_id {
        1 => course_one::rules(sub_level),
        _ => None,
    }
}

/// Current catalog plus the requested course, or 404 when it is not listed.
pub(crate) async fn find_course(
    state: &AppState,
    course_id: u64,
) -> Result<(Arc<Vec<Course>>, Course), AppError> {
    let catalog = state.catalog.courses(&state.db).await?;
    let course = catalog
        .iter()
        .find(|course| course.id == course_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("course {course_id}")))?;

    Ok((catalog, course))
}

#[cfg(test)]
mod tests {
    use questline_database::model::course::builtin_catalog;

    use super::sub_level_rules;

    #[test]
    fn every_builtin_sub_level_has_rules() {
        for course in builtin_catalog() {
            for sub_level in 1..=course.sub_levels {
                assert!(
                    sub_level_rules(course.id, sub_level).is_some(),
                    "course {} sub-level {sub_level}",
                    course.id
                );
            }
        }
    }

    #[test]
    fn unknown_course_has_no_rules() {
        assert!(sub_level_rules(99, 1).is_none());
    }
}
