//! Layout whose solve is postponed to the next pre-render pass.
//!
//! Resizing a container with a `DeferredLayout` only stages the new geometry
//! and marks the window as needing a pre-render. However many resizes happen
//! during a frame, the grid is solved once, in `PreRender`, for the last
//! staged rectangle. A resize that arrives while that solve is running is
//! applied in place instead of being staged again.
//!
//! ```text
//! Idle --stage(new size)--> Staged --begin_solve--> Solving --finish_solve--> Idle
//!                             |                        |
//!                             +--stage(applied size)--> Idle (unless forced)
//!                                                      +--stage(any)--> solve now
//! ```
//!
//! A solve staged by `invalidate` is forced: later resizes in the same frame
//! replace its rectangle but never cancel it.

use crate::primitives::Rect;

use super::grid::Layout;

/// Where a `DeferredLayout` is in its frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeferredState {
    /// Nothing pending.
    #[default]
    Idle,

    /// A new container rectangle waits for the next pre-render pass.
    /// `forced` solves survive a resize back to the applied extent.
    Staged { rect: Rect, forced: bool },

    /// The pre-render solve is running.
    Solving,
}

/// What the caller of `DeferredLayout::stage` must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The rectangle was staged; schedule a pre-render.
    Staged,

    /// The geometry already in effect was requested; nothing to do.
    Unchanged,

    /// A solve is in progress; solve again immediately.
    SolveNow,
}

#[derive(Debug, Clone)]
pub struct DeferredLayout {
    layout: Layout,
    state: DeferredState,
    applied: Option<Rect>,
}

impl DeferredLayout {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            state: DeferredState::Idle,
            applied: None,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn state(&self) -> DeferredState {
        self.state
    }

    /// The container rectangle of the last completed solve.
    pub fn applied(&self) -> Option<Rect> {
        self.applied
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DeferredState::Staged { .. })
    }

    /// Stage a container resize.
    ///
    /// Only the extent matters to the grid, so a pure move of the container
    /// compares equal to the geometry already applied.
    pub fn stage(&mut self, rect: Rect) -> StageOutcome {
        let forced = match self.state {
            DeferredState::Solving => return StageOutcome::SolveNow,
            DeferredState::Staged { forced, .. } => forced,
            DeferredState::Idle => false,
        };
        if !forced && self.applied.map(|a| a.size()) == Some(rect.size()) {
            self.state = DeferredState::Idle;
            return StageOutcome::Unchanged;
        }
        self.state = DeferredState::Staged { rect, forced };
        StageOutcome::Staged
    }

    /// Stage a re-solve even though the container extent did not change,
    /// e.g. after stretch or margin settings were edited.
    pub fn invalidate(&mut self, rect: Rect) -> StageOutcome {
        match self.state {
            DeferredState::Solving => StageOutcome::SolveNow,
            _ => {
                self.state = DeferredState::Staged { rect, forced: true };
                StageOutcome::Staged
            }
        }
    }

    /// Enter `Solving`, returning the staged rectangle. `None` when idle.
    pub fn begin_solve(&mut self) -> Option<Rect> {
        match self.state {
            DeferredState::Staged { rect, .. } => {
                self.state = DeferredState::Solving;
                Some(rect)
            }
            _ => None,
        }
    }

    /// Leave `Solving`, recording the rectangle the children now reflect.
    pub fn finish_solve(&mut self, applied: Rect) {
        self.state = DeferredState::Idle;
        self.applied = Some(applied);
    }
}
