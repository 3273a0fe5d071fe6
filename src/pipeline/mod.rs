pub mod evaluation;
pub mod render;
