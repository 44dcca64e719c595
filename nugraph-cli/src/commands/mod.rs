pub mod authors;
pub mod clean;
pub mod graph;
