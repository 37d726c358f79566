pub mod courses;
pub mod profiles;
