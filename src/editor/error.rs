// src/editor/error.rs

use crate::scene::ListId;
use thiserror::Error;

/// A request the editor refused because it would break its invariants.
///
/// These are programming errors on the caller's side. The editor checks the
/// whole request before touching anything, so receiving one of these means
/// the scene, selection and history are exactly as they were.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("list {0:?} does not exist")]
    UnknownList(ListId),

    #[error("index {index} is out of range for list {list:?} of length {len}")]
    IndexOutOfRange { list: ListId, index: usize, len: usize },

    #[error("range {start}..{end} is out of range for list {list:?} of length {len}")]
    RangeOutOfBounds {
        list: ListId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("object is not a member of list {0:?}")]
    ObjectNotInList(ListId),

    #[error("object is already a member of list {0:?}")]
    ObjectAlreadyInList(ListId),

    #[error("object appears more than once in one request")]
    DuplicateObject,

    #[error("object is not reachable from any list of the scene")]
    ObjectNotInScene,

    #[error("deletion entry for list {0:?} has no objects")]
    EmptyDeletionEntry(ListId),

    #[error("operation needs at least one object")]
    NoObjects,

    #[error("a {0} drag is already in progress")]
    DragInProgress(&'static str),

    #[error("no drag is in progress")]
    NoDragInProgress,

    #[error("cannot switch a {active} drag to {requested}")]
    DragKindMismatch {
        active: &'static str,
        requested: &'static str,
    },
}
