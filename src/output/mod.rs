//! Result reporting: console text, JSON documents and the CSV scaling table

pub mod csv;
pub mod json;
pub mod text;
