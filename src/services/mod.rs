pub mod starter_catalog;
pub mod starter_content;
