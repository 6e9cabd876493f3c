//! Grid layout for window children.
//!
//! A container window may carry one layout. `Layout` solves child rectangles
//! as soon as the container changes; `DeferredLayout` batches those solves to
//! once per frame, in the pre-render pass.
//!
//! # Architecture
//!
//! ```text
//! size_move(container) -> stage / solve -> LayoutSolution -> size_move(children)
//! ```

pub mod deferred;
pub mod grid;

pub use deferred::{DeferredLayout, DeferredState, StageOutcome};
pub use grid::{ChildMetrics, Layout, LayoutCell, LayoutSolution, Track};

/// The layout attached to a window, in either solve mode.
#[derive(Debug, Clone)]
pub enum AttachedLayout {
    Immediate(Layout),
    Deferred(DeferredLayout),
}

impl AttachedLayout {
    pub fn layout(&self) -> &Layout {
        match self {
            AttachedLayout::Immediate(layout) => layout,
            AttachedLayout::Deferred(deferred) => deferred.layout(),
        }
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        match self {
            AttachedLayout::Immediate(layout) => layout,
            AttachedLayout::Deferred(deferred) => deferred.layout_mut(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, AttachedLayout::Deferred(_))
    }

    pub fn deferred(&self) -> Option<&DeferredLayout> {
        match self {
            AttachedLayout::Deferred(deferred) => Some(deferred),
            AttachedLayout::Immediate(_) => None,
        }
    }
}

impl From<Layout> for AttachedLayout {
    fn from(layout: Layout) -> Self {
        AttachedLayout::Immediate(layout)
    }
}

impl From<DeferredLayout> for AttachedLayout {
    fn from(deferred: DeferredLayout) -> Self {
        AttachedLayout::Deferred(deferred)
    }
}
