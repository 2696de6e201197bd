//! Disk-backed B+Tree secondary index: page codec, leaf/internal nodes,
//! the tree engine, and forward cursor iteration.

pub mod btree;
pub mod cursor;
pub mod metadata;
pub mod node;

pub use btree::BPlusTree;
pub use cursor::IndexCursor;
pub use metadata::TreeMetadata;
pub use node::{internal_capacity, leaf_capacity, InternalNode, LeafNode};
