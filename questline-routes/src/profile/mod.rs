pub mod select_pet;
pub mod view;
