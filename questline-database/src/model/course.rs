use serde::{Deserialize, Serialize};

/// A course in the global catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub description: String,
    /// Number of sub-levels, numbered `1..=sub_levels`.
    pub sub_levels: u32,
    pub position: i32,
}

impl Course {
    pub fn has_sub_level(&self, sub_level: u32) -> bool {
        (1..=self.sub_levels).contains(&sub_level)
    }
}

/// Catalog used when no database is configured. Mirrors the seed migration.
pub fn builtin_catalog() -> Vec<Course> {
    vec![Course {
        id: 1,
        title: "Raising your pet".to_owned(),
        description:
            "Model a pet egg in Java: classes, fields, constructors, methods and inheritance."
                .to_owned(),
        sub_levels: 6,
        position: 1,
    }]
}

/// Order courses the way the catalog presents them.
pub fn sort_catalog(courses: &mut [Course]) {
    courses.sort_by_key(|course| (course.position, course.id));
}
