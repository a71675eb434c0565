//! Field tree walker.
//!
//! Responsibilities:
//! - Flatten a record into the leaves the policy resolver consumes.
//! - Build each leaf's path from alt names (for the active tag) or field names.
//!
//! Does NOT handle:
//! - Applying policies or reading the environment (see `policy.rs`).
//!
//! Invariants:
//! - Fields are visited in declaration order; a composite leaf precedes its
//!   children.
//! - `None` optional records are not descended into.
//! - Only existing sequence elements are visited; the walker never grows a
//!   sequence.
//! - Records, and sequences/options holding records, produce a leaf only when
//!   they declare a policy. Their slot is a snapshot since their children are
//!   borrowed by their own leaves.

use super::{Assign, Config, FieldPath, Kind, Policy, Segment};
use crate::coerce::{CoerceError, Coercer};

/// Handle to a leaf's storage.
pub enum Slot<'a> {
    /// A coercible destination, borrowed for the rest of the load.
    Value(&'a mut dyn Assign),
    /// A record-bearing destination whose set-ness was captured by the walk.
    Composite { kind: Kind, set: bool },
}

impl Slot<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Slot::Value(value) => value.target_kind(),
            Slot::Composite { kind, .. } => kind.clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            Slot::Value(value) => value.has_value(),
            Slot::Composite { set, .. } => *set,
        }
    }

    /// Coerce `raw` into the destination.
    pub fn assign(&mut self, raw: &str, coercer: &Coercer) -> Result<(), CoerceError> {
        match self {
            Slot::Value(value) => value.assign(raw, coercer),
            Slot::Composite { kind, .. } => Err(CoerceError::Unsupported { kind: kind.clone() }),
        }
    }
}

/// One terminal field of a record.
pub struct Leaf<'a> {
    pub path: FieldPath,
    pub policy: Policy,
    pub slot: Slot<'a>,
}

/// Collects leaves while a record describes itself through `Field::visit`.
pub struct Walker<'a> {
    tag: String,
    leaves: Vec<Leaf<'a>>,
}

impl<'a> Walker<'a> {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            leaves: Vec::new(),
        }
    }

    /// Tag key whose alt names form the paths.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Record a coercible leaf.
    pub fn leaf(&mut self, path: &FieldPath, policy: Policy, slot: &'a mut dyn Assign) {
        self.leaves.push(Leaf {
            path: path.clone(),
            policy,
            slot: Slot::Value(slot),
        });
    }

    /// Record a record-bearing field; skipped when it declares no policy.
    pub fn composite(&mut self, path: &FieldPath, policy: Policy, kind: Kind, set: bool) {
        if policy.is_none() {
            return;
        }
        self.leaves.push(Leaf {
            path: path.clone(),
            policy,
            slot: Slot::Composite { kind, set },
        });
    }

    /// Path of a record's field below `parent`.
    pub fn child_path(&self, parent: &FieldPath, segment: &Segment) -> FieldPath {
        if segment.is_promoted(&self.tag) {
            parent.clone()
        } else {
            parent.child(segment.name(&self.tag))
        }
    }

    pub fn finish(self) -> Vec<Leaf<'a>> {
        self.leaves
    }
}

/// Flatten `root` into its leaves using alt names declared for `tag`.
pub fn walk<'a, T: Config>(root: &'a mut T, tag: &str) -> Vec<Leaf<'a>> {
    let mut walker = Walker::new(tag);
    root.visit(&mut walker, &FieldPath::root(), Policy::None);
    walker.finish()
}
