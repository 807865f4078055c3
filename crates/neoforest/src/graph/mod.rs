//! Core graph types.
//!
//! This module defines the fundamental building blocks:
//! - [`NodeRecord`], [`ContainmentEdge`], [`Edge`]: flat records returned by a data source
//! - [`TreeNode`]: a node placed in the containment forest
//! - [`PropertyMap`], [`PropertyValue`]: schema-less, ordered metadata

mod property;
mod types;

pub use property::{PropertyMap, PropertyValue, Temporal};
pub use types::{ContainmentEdge, Edge, NodeId, NodeRecord, PreOrder, TreeNode};
