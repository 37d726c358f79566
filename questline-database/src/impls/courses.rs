use anyhow::Context as _;

use crate::cache::{CATALOG_CACHE_TTL, catalog_key};
use crate::database::{Database, StoreBackend};
use crate::model::course::{Course, sort_catalog};

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: i64,
    position: i32,
    title: String,
    description: String,
    sub_levels: i32,
}

impl TryFrom<CourseRow> for Course {
    type Error = anyhow::Error;

    fn try_from(row: CourseRow) -> anyhow::Result<Self> {
        Ok(Course {
            id: u64::try_from(row.id).context("course id out of u64 range")?,
            title: row.title,
            description: row.description,
            sub_levels: u32::try_from(row.sub_levels).context("sub_levels out of u32 range")?,
            position: row.position,
        })
    }
}

/// The global catalog in presentation order.
pub async fn list_courses(db: &Database) -> anyhow::Result<Vec<Course>> {
    match db.backend() {
        StoreBackend::Memory(store) => Ok(store.list_courses().await),
        StoreBackend::Postgres(pool) => {
            let cache_key = catalog_key(db.cache());
            db.cache()
                .get_or_load_json(&cache_key, CATALOG_CACHE_TTL, || async {
                    let rows: Vec<CourseRow> = sqlx::query_as(
                        "SELECT id, position, title, description, sub_levels
                         FROM courses
                         ORDER BY position ASC, id ASC",
                    )
                    .fetch_all(pool)
                    .await
                    .context("failed to load course catalog")?;

                    let mut courses = rows
                        .into_iter()
                        .map(Course::try_from)
                        .collect::<anyhow::Result<Vec<_>>>()?;
                    sort_catalog(&mut courses);
                    Ok(courses)
                })
                .await
        }
    }
}
