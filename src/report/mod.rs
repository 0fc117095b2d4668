pub mod builder;
pub mod json;
pub mod model;
pub mod render;
pub mod style;
