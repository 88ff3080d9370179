//! Derived views over the catalog: categories, grouping, filtering,
//! pagination and recommendations.

mod config;
mod projector;

pub use config::ViewConfig;
pub use projector::{
    by_category, categories, category_label, filter_local, group_by_category, paginate,
    recommendations, search, CategoryGroup, MatchFields, Paged,
};
