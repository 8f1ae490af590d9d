//! Schema domain types.
//!
//! The document is a strict containment chain: a [`SchemaTree`] owns
//! [`Module`]s, a module owns [`Form`]s, a form owns [`Field`]s. Children are
//! held as `Arc`s so that every mutation can rebuild only the path from the
//! changed node to the root while untouched siblings stay shared between the
//! old and the new snapshot.
//!
//! The collaborators the tree needs from the outside world (identifiers,
//! wall-clock time and the clipboard) are expressed as ports below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

pub mod error;
pub mod field;
pub mod form;
pub mod module;
pub mod schema;

pub use error::{ClipboardError, SchemaError, SchemaResult};
pub use field::{Conditional, Field, FieldOption, FieldPatch, FieldType, Tooltip};
pub use form::{Form, FormPatch};
pub use module::{Module, ModulePatch};
pub use schema::SchemaTree;

/// Source of opaque identifiers.
///
/// Implementations must never hand out the same value twice within a process,
/// across all entity kinds.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Wall-clock used to stamp `createdAt` / `updatedAt` on modules and forms.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Destination for the exported JSON document.
pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Entities that carry a display position.
pub trait Ordered {
    fn order(&self) -> i64;
}

/// Reads an `order` value, taking `null` as 0.
///
/// Documents exported after an order input was cleared carry `"order": null`.
pub(crate) fn order_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Returns `items` in display order: ascending `order`, ties kept in storage order.
pub fn display_order<T: Ordered>(items: &[Arc<T>]) -> Vec<&Arc<T>> {
    let mut sorted: Vec<&Arc<T>> = items.iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|item| item.order());
    sorted
}

/// Copies `items` with the first element matching `pred` rebuilt by `rebuild`.
///
/// Only the vector of pointers is copied; every other element stays shared.
/// Returns `None` when nothing matches.
pub(crate) fn replace_first<T, P, F>(items: &[Arc<T>], pred: P, rebuild: F) -> Option<Vec<Arc<T>>>
where
    P: Fn(&T) -> bool,
    F: FnOnce(&T) -> Option<T>,
{
    let idx = items.iter().position(|item| pred(item.as_ref()))?;
    let replacement = rebuild(items[idx].as_ref())?;
    let mut next = items.to_vec();
    next[idx] = Arc::new(replacement);
    Some(next)
}

/// Copies `items` without the first element matching `pred`. Returns `None` when nothing matches.
pub(crate) fn remove_first<T, P>(items: &[Arc<T>], pred: P) -> Option<Vec<Arc<T>>>
where
    P: Fn(&T) -> bool,
{
    let idx = items.iter().position(|item| pred(item.as_ref()))?;
    let mut next = items.to_vec();
    next.remove(idx);
    Some(next)
}
