//! Property test modules

mod graph_construction;
