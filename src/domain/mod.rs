//! Domain module for todo items.
//!
//! This module contains the item model and its value objects.

pub mod item;

pub use item::{Description, DescriptionError, Item, ItemId};
