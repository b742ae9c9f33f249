//! Thumbnail generation and the stores it depends on.

pub mod codec;
pub mod naming;
pub mod object_store;
pub mod pipeline;
pub mod record_builder;
pub mod record_table;
pub mod records;
pub mod transform;

#[cfg(test)]
pub mod testing;
