pub mod catalog;
pub mod timeline;

pub use catalog::CatalogService;
pub use timeline::{group_by_area, Timeline};
