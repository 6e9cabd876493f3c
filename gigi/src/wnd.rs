//! Window System
//!
//! Windows live in a `WndTree` arena keyed by `WndId`. Each node pairs the
//! state every window has (`WndData`: geometry, flags, parent link, ordered
//! children, optional layout) with a boxed `Wnd` implementation supplying the
//! variant-specific behavior (drawing, pre-render work, input handling).
//!
//! # Ownership
//!
//! A window exclusively owns its children; destroying it destroys the whole
//! subtree. The parent link is a plain `WndId`, which never keeps anything
//! alive. Stale ids are detected by the arena and reported as
//! `GuiError::UnknownWindow`.
//!
//! # Coordinates
//!
//! A window's `ul`/`lr` are relative to its parent's upper-left corner (or
//! the screen, for top-level windows). Screen positions are recomputed from
//! the ancestor chain on every query, so nothing can go stale.
//!
//! # Frame lifecycle
//!
//! ```text
//! pre_render_pass(): windows flagged "requires pre-render", top-down
//! render():          visible windows, parent before children, back to front
//! ```
//!
//! The tree is single-threaded: it holds `Rc`-shared browse-info windows and
//! is neither `Send` nor `Sync`.

use std::any::Any;

use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tracing::{trace, warn};

use crate::browse_info::BrowseInfoMode;
use crate::error::{GuiError, Result};
use crate::event::{EventContext, EventResult, WndEvent};
use crate::flags::{Alignment, WndFlags};
use crate::layout::{AttachedLayout, ChildMetrics, StageOutcome};
use crate::primitives::{Pt, Rect};
use crate::render::Renderer;

new_key_type! {
    /// Stable handle to a window in a `WndTree`.
    pub struct WndId;
}

/// Bound on in-place re-solves when children keep resizing a container
/// during its own deferred solve.
const MAX_NESTED_SOLVES: usize = 8;

/// Downcasting support for `Wnd` implementations.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior of a window variant.
///
/// Every method has a default, so a plain container is just `impl Wnd for T {}`.
/// Overrides that want the default behavior for some inputs call the
/// corresponding free function (e.g. `control::forward_to_parent()`) rather
/// than relying on implicit fallthrough.
pub trait Wnd: AsAny {
    /// Draw within `rect`, this window's absolute rectangle.
    ///
    /// Called parent-first; later children draw over earlier ones. Not called
    /// for windows whose rectangle is empty.
    fn render(&self, _renderer: &mut dyn Renderer, _data: &WndData, _rect: Rect) {}

    /// Per-frame work, run before rendering for windows flagged as requiring
    /// it. Any staged deferred layout has already been applied.
    fn pre_render(&mut self, _cx: &mut WndContext<'_>) {}

    /// Notification that the window's relative rectangle changed.
    fn size_moved(&mut self, _cx: &mut WndContext<'_>, _old: Rect, _new: Rect) {}

    /// Handle an input or notification event.
    ///
    /// Returning `Ignored` sends bubbling events on to the parent window.
    fn handle_event(&mut self, _cx: &mut EventContext<'_>, _event: &WndEvent) -> EventResult {
        EventResult::Ignored
    }

    /// Whether this window can hold keyboard focus.
    fn accepts_focus(&self) -> bool {
        false
    }
}

/// Context passed to `Wnd` lifecycle hooks.
pub struct WndContext<'a> {
    /// The window tree. The calling window's own behavior is checked out
    /// while the hook runs.
    pub tree: &'a mut WndTree,
    id: WndId,
}

impl<'a> WndContext<'a> {
    pub fn new(tree: &'a mut WndTree, id: WndId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> WndId {
        self.id
    }
}

/// State common to every window.
#[derive(Debug)]
pub struct WndData {
    name: String,
    ul: Pt,
    lr: Pt,
    min_size: Option<Pt>,
    max_size: Option<Pt>,
    flags: WndFlags,
    visible: bool,
    enabled: bool,
    parent: Option<WndId>,
    children: Vec<WndId>,
    layout: Option<AttachedLayout>,
    requires_pre_render: bool,
    browse_text: String,
    browse_modes: Option<Vec<BrowseInfoMode>>,
}

impl WndData {
    fn new(rect: Rect, flags: WndFlags) -> Self {
        Self {
            name: String::new(),
            ul: rect.ul,
            lr: rect.lr,
            min_size: None,
            max_size: None,
            flags,
            visible: true,
            enabled: true,
            parent: None,
            children: Vec::new(),
            layout: None,
            requires_pre_render: false,
            browse_text: String::new(),
            browse_modes: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rectangle relative to the parent's upper-left corner.
    pub fn relative_rect(&self) -> Rect {
        Rect::new(self.ul, self.lr)
    }

    pub fn size(&self) -> Pt {
        self.lr - self.ul
    }

    /// This window's own area, with its upper-left at the origin.
    pub fn client_rect(&self) -> Rect {
        Rect::new(Pt::ORIGIN, self.size())
    }

    pub fn min_size(&self) -> Option<Pt> {
        self.min_size
    }

    pub fn max_size(&self) -> Option<Pt> {
        self.max_size
    }

    pub fn flags(&self) -> WndFlags {
        self.flags
    }

    pub fn interactive(&self) -> bool {
        self.flags.contains(WndFlags::INTERACTIVE)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn parent(&self) -> Option<WndId> {
        self.parent
    }

    pub fn children(&self) -> &[WndId] {
        &self.children
    }

    pub fn layout(&self) -> Option<&AttachedLayout> {
        self.layout.as_ref()
    }

    pub fn requires_pre_render(&self) -> bool {
        self.requires_pre_render
    }

    pub fn browse_text(&self) -> &str {
        &self.browse_text
    }

    /// Per-window browse-info modes; `None` means "use the GUI defaults".
    pub fn browse_modes(&self) -> Option<&[BrowseInfoMode]> {
        self.browse_modes.as_deref()
    }

    fn clamp_lr(&self, ul: Pt, lr: Pt) -> Pt {
        let mut size = lr - ul;
        if let Some(min) = self.min_size {
            size.x = size.x.max(min.x);
            size.y = size.y.max(min.y);
        }
        if let Some(max) = self.max_size {
            size.x = size.x.min(max.x);
            size.y = size.y.min(max.y);
        }
        ul + size
    }
}

struct Node {
    data: WndData,
    behavior: Option<Box<dyn Wnd>>,
}

/// Arena holding every window plus the z-ordered list of top-level windows.
#[derive(Default)]
pub struct WndTree {
    nodes: SlotMap<WndId, Node>,
    /// Registered top-level windows, back to front.
    roots: Vec<WndId>,
}

impl WndTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Creation and lookup
    // =========================================================================

    /// Create a detached window. It is not drawn or hit-tested until it is
    /// registered as top-level or attached under a registered window.
    pub fn create(&mut self, rect: Rect, flags: WndFlags, behavior: impl Wnd) -> WndId {
        self.create_boxed(rect, flags, Box::new(behavior))
    }

    pub fn create_boxed(&mut self, rect: Rect, flags: WndFlags, behavior: Box<dyn Wnd>) -> WndId {
        let id = self.nodes.insert(Node {
            data: WndData::new(rect, flags),
            behavior: Some(behavior),
        });
        trace!(?id, %rect, "window created");
        id
    }

    pub fn contains(&self, id: WndId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: WndId) -> Option<&WndData> {
        self.nodes.get(id).map(|n| &n.data)
    }

    pub fn data(&self, id: WndId) -> Result<&WndData> {
        self.get(id).ok_or(GuiError::UnknownWindow(id))
    }

    fn data_mut(&mut self, id: WndId) -> Result<&mut WndData> {
        self.nodes
            .get_mut(id)
            .map(|n| &mut n.data)
            .ok_or(GuiError::UnknownWindow(id))
    }

    /// Borrow the behavior of `id` as a concrete type.
    ///
    /// `None` if the window is unknown, has a different type, or is currently
    /// running one of its own hooks.
    pub fn behavior<T: Wnd>(&self, id: WndId) -> Option<&T> {
        self.nodes
            .get(id)?
            .behavior
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Wnd>(&mut self, id: WndId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)?
            .behavior
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Run `f` with the behavior of `id` checked out of the tree, so it can
    /// mutate both itself and the tree.
    ///
    /// Returns `None` if the window is unknown or its behavior is already
    /// checked out. If `f` destroys the window, the behavior is dropped.
    pub fn with_behavior<R>(
        &mut self,
        id: WndId,
        f: impl FnOnce(&mut dyn Wnd, &mut WndTree) -> R,
    ) -> Option<R> {
        let mut behavior = self.nodes.get_mut(id)?.behavior.take()?;
        let result = f(behavior.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
        Some(result)
    }

    pub fn accepts_focus(&self, id: WndId) -> bool {
        self.nodes
            .get(id)
            .and_then(|n| n.behavior.as_deref())
            .is_some_and(|b| b.accepts_focus())
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    pub fn parent(&self, id: WndId) -> Option<WndId> {
        self.get(id).and_then(|d| d.parent)
    }

    pub fn children(&self, id: WndId) -> &[WndId] {
        self.get(id).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[WndId] {
        &self.roots
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: WndId, id: WndId) -> bool {
        let mut current = Some(id);
        while let Some(wnd) = current {
            if wnd == ancestor {
                return true;
            }
            current = self.parent(wnd);
        }
        false
    }

    /// The top-level window `id` lives under.
    pub fn root_of(&self, id: WndId) -> Option<WndId> {
        let mut current = id;
        self.get(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Make `child` the front-most child of `parent`, taking it away from any
    /// previous parent or the top-level list.
    pub fn attach_child(&mut self, parent: WndId, child: WndId) -> Result<()> {
        self.data(parent)?;
        self.data(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(GuiError::WouldCreateCycle { parent, child });
        }
        if self.parent(child) == Some(parent) {
            return Ok(());
        }

        self.detach(child)?;
        self.data_mut(parent)?.children.push(child);
        self.data_mut(child)?.parent = Some(parent);
        trace!(?parent, ?child, "child attached");
        Ok(())
    }

    /// Release `id` from its parent (and the parent's layout) or from the
    /// top-level list. The window and its subtree stay alive, owned by the
    /// caller through `id`, until attached again or destroyed.
    pub fn detach(&mut self, id: WndId) -> Result<()> {
        let parent = self.data(id)?.parent;
        if let Some(parent) = parent {
            let mut relayout = false;
            if let Ok(data) = self.data_mut(parent) {
                data.children.retain(|c| *c != id);
                if let Some(layout) = data.layout.as_mut() {
                    relayout = layout.layout_mut().remove(id).is_ok();
                }
            }
            self.data_mut(id)?.parent = None;
            if relayout {
                self.invalidate_layout(parent)?;
            }
        }
        self.roots.retain(|r| *r != id);
        Ok(())
    }

    /// Detach and drop `id` with its whole subtree. Returns the number of
    /// windows destroyed.
    ///
    /// Pending pre-render work and staged layouts die with the windows.
    pub fn destroy(&mut self, id: WndId) -> Result<usize> {
        self.detach(id)?;
        let doomed = self.subtree(id);
        for wnd in &doomed {
            self.nodes.remove(*wnd);
        }
        trace!(?id, count = doomed.len(), "window destroyed");
        Ok(doomed.len())
    }

    /// `id` followed by all its descendants, parents before children.
    pub fn subtree(&self, id: WndId) -> Vec<WndId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(wnd) = stack.pop() {
            if let Some(data) = self.get(wnd) {
                out.push(wnd);
                stack.extend(data.children.iter().rev());
            }
        }
        out
    }

    // =========================================================================
    // Top-level windows
    // =========================================================================

    /// Register `id` as a top-level window in front of the others.
    ///
    /// Windows without `ONTOP` are kept behind any `ONTOP` window.
    pub fn register(&mut self, id: WndId) -> Result<()> {
        self.detach(id)?;
        let ontop = self.data(id)?.flags.contains(WndFlags::ONTOP);
        let index = if ontop {
            self.roots.len()
        } else {
            self.roots
                .iter()
                .position(|r| {
                    self.get(*r)
                        .is_some_and(|d| d.flags.contains(WndFlags::ONTOP))
                })
                .unwrap_or(self.roots.len())
        };
        self.roots.insert(index, id);
        Ok(())
    }

    pub fn unregister(&mut self, id: WndId) -> Result<()> {
        self.data(id)?;
        self.roots.retain(|r| *r != id);
        Ok(())
    }

    pub fn is_registered(&self, id: WndId) -> bool {
        self.roots.contains(&id)
    }

    /// Bring a top-level window to the front of its `ONTOP` class.
    pub fn move_to_front(&mut self, id: WndId) -> Result<()> {
        if self.is_registered(id) {
            self.register(id)
        } else {
            self.data(id).map(|_| ())
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn relative_rect(&self, id: WndId) -> Result<Rect> {
        Ok(self.data(id)?.relative_rect())
    }

    pub fn client_rect(&self, id: WndId) -> Result<Rect> {
        Ok(self.data(id)?.client_rect())
    }

    /// Absolute rectangle: the sum of the ancestors' offsets plus this
    /// window's relative rectangle.
    pub fn screen_rect(&self, id: WndId) -> Result<Rect> {
        let data = self.data(id)?;
        let mut origin = Pt::ORIGIN;
        let mut current = data.parent;
        while let Some(parent) = current {
            let p = self.data(parent)?;
            origin += p.ul;
            current = p.parent;
        }
        Ok(data.relative_rect().offset(origin))
    }

    /// Set the relative rectangle of `id`.
    ///
    /// The new size is clamped to the window's min/max sizes when set;
    /// inverted rectangles are otherwise stored as given. If the size changed
    /// and the window has a layout, the layout is re-solved (immediately, or
    /// staged for the next pre-render pass).
    pub fn size_move(&mut self, id: WndId, ul: Pt, lr: Pt) -> Result<()> {
        let data = self.data_mut(id)?;
        let old = data.relative_rect();
        let lr = data.clamp_lr(ul, lr);
        let new = Rect::new(ul, lr);
        if new == old {
            return Ok(());
        }

        data.ul = ul;
        data.lr = lr;
        trace!(?id, %old, %new, "size_move");

        if old.size() != new.size() {
            self.relayout(id, false)?;
        }

        self.with_behavior(id, |behavior, tree| {
            behavior.size_moved(&mut WndContext::new(tree, id), old, new)
        });
        Ok(())
    }

    pub fn move_to(&mut self, id: WndId, ul: Pt) -> Result<()> {
        let size = self.data(id)?.size();
        self.size_move(id, ul, ul + size)
    }

    pub fn offset_move(&mut self, id: WndId, delta: Pt) -> Result<()> {
        let rect = self.relative_rect(id)?.offset(delta);
        self.size_move(id, rect.ul, rect.lr)
    }

    pub fn resize(&mut self, id: WndId, size: Pt) -> Result<()> {
        let ul = self.data(id)?.ul;
        self.size_move(id, ul, ul + size)
    }

    /// Set the minimum size, growing the window if needed and re-solving the
    /// parent's layout.
    pub fn set_min_size(&mut self, id: WndId, min: Option<Pt>) -> Result<()> {
        self.data_mut(id)?.min_size = min;
        self.reclamp_and_notify_parent(id)
    }

    pub fn set_max_size(&mut self, id: WndId, max: Option<Pt>) -> Result<()> {
        self.data_mut(id)?.max_size = max;
        self.reclamp_and_notify_parent(id)
    }

    fn reclamp_and_notify_parent(&mut self, id: WndId) -> Result<()> {
        let rect = self.relative_rect(id)?;
        self.size_move(id, rect.ul, rect.lr)?;
        if let Some(parent) = self.parent(id) {
            let in_layout = self
                .get(parent)
                .and_then(|p| p.layout.as_ref())
                .is_some_and(|l| l.layout().contains(id));
            if in_layout {
                self.invalidate_layout(parent)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn show(&mut self, id: WndId) -> Result<()> {
        self.data_mut(id)?.visible = true;
        Ok(())
    }

    pub fn hide(&mut self, id: WndId) -> Result<()> {
        self.data_mut(id)?.visible = false;
        Ok(())
    }

    /// Visible itself and through all its ancestors.
    pub fn is_visible(&self, id: WndId) -> bool {
        let mut current = Some(id);
        while let Some(wnd) = current {
            match self.get(wnd) {
                Some(data) if data.visible => current = data.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn enable(&mut self, id: WndId, enabled: bool) -> Result<()> {
        self.data_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_flags(&mut self, id: WndId, flags: WndFlags) -> Result<()> {
        self.data_mut(id)?.flags = flags;
        Ok(())
    }

    pub fn set_name(&mut self, id: WndId, name: impl Into<String>) -> Result<()> {
        self.data_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_browse_text(&mut self, id: WndId, text: impl Into<String>) -> Result<()> {
        self.data_mut(id)?.browse_text = text.into();
        Ok(())
    }

    pub fn set_browse_modes(
        &mut self,
        id: WndId,
        modes: Option<Vec<BrowseInfoMode>>,
    ) -> Result<()> {
        self.data_mut(id)?.browse_modes = modes;
        Ok(())
    }

    /// Ask for `id`'s pre-render hook to run in the next pre-render pass.
    pub fn request_pre_render(&mut self, id: WndId) -> Result<()> {
        self.data_mut(id)?.requires_pre_render = true;
        Ok(())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Attach a layout to `id`, adopting every window it places as a child,
    /// then solve (or stage) it for the current size.
    pub fn set_layout(&mut self, id: WndId, layout: impl Into<AttachedLayout>) -> Result<()> {
        let layout = layout.into();
        if self.data(id)?.layout.is_some() {
            return Err(GuiError::LayoutAlreadyAttached(id));
        }
        let members: Vec<WndId> = layout.layout().cells().iter().map(|c| c.wnd).collect();
        for member in &members {
            self.data(*member)?;
        }
        for member in members {
            self.attach_child(id, member)?;
        }
        self.data_mut(id)?.layout = Some(layout);
        self.invalidate_layout(id)
    }

    /// Detach the layout from `id`. Children keep their current geometry.
    pub fn take_layout(&mut self, id: WndId) -> Result<AttachedLayout> {
        self.data_mut(id)?.layout.take().ok_or(GuiError::NoLayout(id))
    }

    pub fn layout(&self, id: WndId) -> Option<&crate::layout::Layout> {
        self.get(id)?.layout.as_ref().map(|l| l.layout())
    }

    /// Place `child` in `container`'s layout, adopting it as a child.
    pub fn layout_add(
        &mut self,
        container: WndId,
        child: WndId,
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
        alignment: Alignment,
    ) -> Result<()> {
        self.data(child)?;
        if self.is_ancestor_or_self(child, container) {
            return Err(GuiError::WouldCreateCycle {
                parent: container,
                child,
            });
        }
        self.data_mut(container)?
            .layout
            .as_mut()
            .ok_or(GuiError::NoLayout(container))?
            .layout_mut()
            .add(child, row, column, rows, columns, alignment)?;
        if self.parent(child) != Some(container) {
            self.detach(child)?;
            self.data_mut(container)?.children.push(child);
            self.data_mut(child)?.parent = Some(container);
        }
        self.invalidate_layout(container)
    }

    /// Remove `child` from `container`'s layout. It stays a child window.
    pub fn layout_remove(&mut self, container: WndId, child: WndId) -> Result<()> {
        self.data_mut(container)?
            .layout
            .as_mut()
            .ok_or(GuiError::NoLayout(container))?
            .layout_mut()
            .remove(child)?;
        self.invalidate_layout(container)
    }

    /// Edit `id`'s layout settings, then re-solve (or stage) it.
    pub fn update_layout<R>(
        &mut self,
        id: WndId,
        f: impl FnOnce(&mut crate::layout::Layout) -> Result<R>,
    ) -> Result<R> {
        let result = f(self
            .data_mut(id)?
            .layout
            .as_mut()
            .ok_or(GuiError::NoLayout(id))?
            .layout_mut())?;
        self.invalidate_layout(id)?;
        Ok(result)
    }

    /// Re-solve `id`'s layout even though its size did not change.
    pub fn invalidate_layout(&mut self, id: WndId) -> Result<()> {
        self.relayout(id, true)
    }

    fn relayout(&mut self, id: WndId, force: bool) -> Result<()> {
        let data = self.data_mut(id)?;
        let client = data.client_rect();
        let solve_now = match data.layout.as_mut() {
            None => false,
            Some(AttachedLayout::Immediate(_)) => true,
            Some(AttachedLayout::Deferred(deferred)) => {
                let outcome = if force {
                    deferred.invalidate(client)
                } else {
                    deferred.stage(client)
                };
                match outcome {
                    StageOutcome::Staged => {
                        data.requires_pre_render = true;
                        false
                    }
                    StageOutcome::Unchanged => false,
                    StageOutcome::SolveNow => true,
                }
            }
        };
        if solve_now {
            self.redo_layout(id)?;
        }
        Ok(())
    }

    /// Solve `id`'s layout for its current size and move the children.
    fn redo_layout(&mut self, id: WndId) -> Result<()> {
        let extent = self.data(id)?.size();
        let members: Vec<WndId> = match self.data(id)?.layout.as_ref() {
            Some(layout) => layout.layout().cells().iter().map(|c| c.wnd).collect(),
            None => return Ok(()),
        };

        let mut metrics = SecondaryMap::new();
        for member in members {
            if let Some(data) = self.get(member) {
                let m = ChildMetrics {
                    min: data.min_size.unwrap_or_default(),
                    size: data.size(),
                };
                metrics.insert(member, m);
            }
        }

        let solution = match self.data_mut(id)?.layout.as_mut() {
            Some(layout) => layout
                .layout_mut()
                .solve(extent, |wnd| metrics.get(wnd).copied().unwrap_or_default()),
            None => return Ok(()),
        };

        for (child, rect) in solution.placements {
            if self.contains(child) {
                self.size_move(child, rect.ul, rect.lr)?;
            } else {
                warn!(?id, ?child, "layout refers to a destroyed window");
            }
        }
        Ok(())
    }

    /// Apply a staged deferred layout for `id`, if any.
    fn apply_deferred_layout(&mut self, id: WndId) -> Result<()> {
        let staged = match self.data_mut(id)?.layout.as_mut() {
            Some(AttachedLayout::Deferred(deferred)) => deferred.begin_solve(),
            _ => None,
        };
        let Some(staged) = staged else {
            return Ok(());
        };
        trace!(?id, %staged, "deferred layout solve");

        let mut solved_for = self.client_rect(id)?;
        let mut result = self
            .redo_layout(id)
            .and_then(|()| self.pre_render_members(id));
        for _ in 0..MAX_NESTED_SOLVES {
            // A resize applied in place mid-solve leaves later placements stale.
            let current = match self.client_rect(id) {
                Ok(rect) => rect,
                Err(e) => return result.and(Err(e)),
            };
            if result.is_err() || current.size() == solved_for.size() {
                break;
            }
            solved_for = current;
            result = self.redo_layout(id);
        }

        if let Ok(data) = self.data_mut(id) {
            if let Some(AttachedLayout::Deferred(deferred)) = data.layout.as_mut() {
                deferred.finish_solve(solved_for);
            }
        }
        result
    }

    /// Pre-render the flagged windows `id`'s layout places while its solve is
    /// still running. A member that resizes `id` from its hook is solved in
    /// place rather than staged for the next frame.
    fn pre_render_members(&mut self, id: WndId) -> Result<()> {
        let members: Vec<WndId> = match self.data(id)?.layout.as_ref() {
            Some(layout) => layout.layout().cells().iter().map(|c| c.wnd).collect(),
            None => return Ok(()),
        };
        for member in members {
            if self.get(member).is_some_and(|d| d.visible && d.requires_pre_render) {
                self.pre_render(member)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Frame passes
    // =========================================================================

    /// Run `id`'s pre-render work: apply any staged layout, then call its
    /// `Wnd::pre_render` hook. Clears the pre-render flag.
    pub fn pre_render(&mut self, id: WndId) -> Result<()> {
        self.data_mut(id)?.requires_pre_render = false;
        self.apply_deferred_layout(id)?;
        self.with_behavior(id, |behavior, tree| {
            behavior.pre_render(&mut WndContext::new(tree, id))
        });
        Ok(())
    }

    /// Pre-render every visible registered window that asked for it,
    /// parents before children. Returns the number of windows processed.
    pub fn pre_render_pass(&mut self) -> usize {
        let order: Vec<WndId> = self
            .roots
            .clone()
            .into_iter()
            .flat_map(|root| self.visible_subtree(root))
            .collect();

        let mut count = 0;
        for id in order {
            let flagged = self.get(id).is_some_and(|d| d.requires_pre_render);
            if !flagged {
                continue;
            }
            match self.pre_render(id) {
                Ok(()) => count += 1,
                Err(e) => warn!(?id, error = %e, "pre-render failed"),
            }
        }
        count
    }

    fn visible_subtree(&self, id: WndId) -> Vec<WndId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(wnd) = stack.pop() {
            if let Some(data) = self.get(wnd).filter(|d| d.visible) {
                out.push(wnd);
                stack.extend(data.children.iter().rev());
            }
        }
        out
    }

    /// Render all registered windows, back to front.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        for root in &self.roots {
            self.render_at(*root, Pt::ORIGIN, renderer);
        }
    }

    /// Render `id` and its subtree at its current screen position.
    pub fn render_subtree(&self, id: WndId, renderer: &mut dyn Renderer) -> Result<()> {
        let rect = self.screen_rect(id)?;
        let origin = rect.ul - self.data(id)?.ul;
        self.render_at(id, origin, renderer);
        Ok(())
    }

    fn render_at(&self, id: WndId, origin: Pt, renderer: &mut dyn Renderer) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.data.visible {
            return;
        }
        let rect = node.data.relative_rect().offset(origin);
        if !rect.is_empty() {
            if let Some(behavior) = node.behavior.as_deref() {
                behavior.render(renderer, &node.data, rect);
            }
        }
        for child in &node.data.children {
            self.render_at(*child, rect.ul, renderer);
        }
    }

    // =========================================================================
    // Hit-testing
    // =========================================================================

    /// Front-most visible, interactive window under `pt` among all registered
    /// windows.
    pub fn wnd_at(&self, pt: Pt) -> Option<WndId> {
        self.roots
            .iter()
            .rev()
            .find_map(|root| self.hit_at(*root, Pt::ORIGIN, pt))
    }

    /// Like `wnd_at`, restricted to `id`'s subtree.
    pub fn wnd_at_within(&self, id: WndId, pt: Pt) -> Option<WndId> {
        let rect = self.screen_rect(id).ok()?;
        let origin = rect.ul - self.get(id)?.ul;
        self.hit_at(id, origin, pt)
    }

    fn hit_at(&self, id: WndId, origin: Pt, pt: Pt) -> Option<WndId> {
        let data = self.get(id)?;
        if !data.visible {
            return None;
        }
        let rect = data.relative_rect().offset(origin);
        if !rect.contains(pt) {
            return None;
        }
        data.children
            .iter()
            .rev()
            .find_map(|child| self.hit_at(*child, rect.ul, pt))
            .or_else(|| data.interactive().then_some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DeferredLayout, DeferredState, Layout};
    use crate::primitives::{X, Y};
    use crate::render::RecordingRenderer;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Plain;
    impl Wnd for Plain {}

    /// Records the order it is drawn in.
    struct Painted {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Wnd for Painted {
        fn render(&self, _renderer: &mut dyn Renderer, _data: &WndData, _rect: Rect) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    fn interactive() -> WndFlags {
        WndFlags::INTERACTIVE
    }

    fn grid_2x2() -> Layout {
        let mut layout = Layout::new(2, 2, 0, 0);
        for i in 0..2 {
            layout.set_row_stretch(i, 1.0).unwrap();
            layout.set_column_stretch(i, 1.0).unwrap();
        }
        layout
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    #[test]
    fn destroy_removes_subtree_and_detaches() {
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ltrb(0, 0, 10, 10), interactive(), Plain);
        let grandchild = tree.create(Rect::ltrb(0, 0, 5, 5), interactive(), Plain);
        tree.register(root).unwrap();
        tree.attach_child(root, child).unwrap();
        tree.attach_child(child, grandchild).unwrap();

        assert_eq!(tree.destroy(child).unwrap(), 2);
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(matches!(
            tree.size_move(grandchild, Pt::ORIGIN, Pt::xy(1, 1)),
            Err(GuiError::UnknownWindow(_))
        ));
    }

    #[test]
    fn detach_releases_to_caller() {
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ltrb(0, 0, 10, 10), interactive(), Plain);
        tree.attach_child(root, child).unwrap();
        tree.detach(child).unwrap();
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.parent(child), None);
        assert!(tree.contains(child));
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut tree = WndTree::new();
        let a = tree.create(Rect::ZERO, interactive(), Plain);
        let b = tree.create(Rect::ZERO, interactive(), Plain);
        tree.attach_child(a, b).unwrap();
        assert!(matches!(
            tree.attach_child(b, a),
            Err(GuiError::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            tree.attach_child(a, a),
            Err(GuiError::WouldCreateCycle { .. })
        ));
    }

    #[test]
    fn reattaching_moves_between_parents() {
        let mut tree = WndTree::new();
        let a = tree.create(Rect::ZERO, interactive(), Plain);
        let b = tree.create(Rect::ZERO, interactive(), Plain);
        let c = tree.create(Rect::ZERO, interactive(), Plain);
        tree.attach_child(a, c).unwrap();
        tree.attach_child(b, c).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[c]);
        assert_eq!(tree.root_of(c), Some(b));
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    #[test]
    fn screen_rect_accumulates_parent_offsets() {
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(10, 20, 200, 200), interactive(), Plain);
        let child = tree.create(Rect::ltrb(5, 5, 50, 50), interactive(), Plain);
        let grandchild = tree.create(Rect::ltrb(1, 2, 11, 12), interactive(), Plain);
        tree.attach_child(root, child).unwrap();
        tree.attach_child(child, grandchild).unwrap();
        assert_eq!(tree.screen_rect(grandchild).unwrap(), Rect::ltrb(16, 27, 26, 37));

        tree.move_to(root, Pt::xy(0, 0)).unwrap();
        assert_eq!(tree.screen_rect(grandchild).unwrap(), Rect::ltrb(6, 7, 16, 17));
    }

    #[test]
    fn size_move_clamps_to_min_and_max() {
        let mut tree = WndTree::new();
        let w = tree.create(Rect::ltrb(0, 0, 50, 50), interactive(), Plain);
        tree.set_min_size(w, Some(Pt::xy(20, 20))).unwrap();
        tree.set_max_size(w, Some(Pt::xy(100, 80))).unwrap();
        tree.size_move(w, Pt::xy(0, 0), Pt::xy(5, 500)).unwrap();
        assert_eq!(tree.relative_rect(w).unwrap(), Rect::ltrb(0, 0, 20, 80));
    }

    #[test]
    fn inverted_rect_is_stored_as_given() {
        let mut tree = WndTree::new();
        let w = tree.create(Rect::ZERO, interactive(), Plain);
        tree.size_move(w, Pt::xy(30, 30), Pt::xy(10, 10)).unwrap();
        assert_eq!(tree.relative_rect(w).unwrap(), Rect::ltrb(30, 30, 10, 10));
        tree.register(w).unwrap();
        assert_eq!(tree.wnd_at(Pt::xy(20, 20)), None);

        let mut renderer = RecordingRenderer::new();
        tree.render(&mut renderer);
        assert!(renderer.commands.is_empty());
    }

    // =========================================================================
    // Rendering and hit-testing
    // =========================================================================

    #[test]
    fn render_order_is_parent_then_children_in_sequence() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let painted = |tag| Painted {
            tag,
            log: log.clone(),
        };
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), painted("root"));
        let a = tree.create(Rect::ltrb(0, 0, 10, 10), interactive(), painted("a"));
        let b = tree.create(Rect::ltrb(0, 0, 10, 10), interactive(), painted("b"));
        let hidden = tree.create(Rect::ltrb(0, 0, 10, 10), interactive(), painted("hidden"));
        tree.register(root).unwrap();
        tree.attach_child(root, a).unwrap();
        tree.attach_child(root, b).unwrap();
        tree.attach_child(root, hidden).unwrap();
        tree.hide(hidden).unwrap();

        tree.render(&mut RecordingRenderer::new());
        assert_eq!(*log.borrow(), vec!["root", "a", "b"]);
    }

    #[test]
    fn hit_test_prefers_later_sibling() {
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let first = tree.create(Rect::ltrb(10, 10, 60, 60), interactive(), Plain);
        let second = tree.create(Rect::ltrb(40, 40, 90, 90), interactive(), Plain);
        tree.register(root).unwrap();
        tree.attach_child(root, first).unwrap();
        tree.attach_child(root, second).unwrap();

        assert_eq!(tree.wnd_at(Pt::xy(50, 50)), Some(second));
        assert_eq!(tree.wnd_at(Pt::xy(20, 20)), Some(first));
        assert_eq!(tree.wnd_at(Pt::xy(95, 5)), Some(root));
        assert_eq!(tree.wnd_at(Pt::xy(150, 5)), None);
    }

    #[test]
    fn non_interactive_windows_are_transparent() {
        let mut tree = WndTree::new();
        let root = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let overlay = tree.create(Rect::ltrb(0, 0, 100, 100), WndFlags::empty(), Plain);
        let button = tree.create(Rect::ltrb(10, 10, 20, 20), interactive(), Plain);
        tree.register(root).unwrap();
        tree.attach_child(root, overlay).unwrap();
        tree.attach_child(overlay, button).unwrap();

        assert_eq!(tree.wnd_at(Pt::xy(15, 15)), Some(button));
        assert_eq!(tree.wnd_at(Pt::xy(50, 50)), Some(root));
    }

    #[test]
    fn ontop_windows_stay_in_front() {
        let mut tree = WndTree::new();
        let top = tree.create(Rect::ltrb(0, 0, 50, 50), interactive() | WndFlags::ONTOP, Plain);
        let normal = tree.create(Rect::ltrb(0, 0, 50, 50), interactive(), Plain);
        tree.register(top).unwrap();
        tree.register(normal).unwrap();
        assert_eq!(tree.roots(), &[normal, top]);
        assert_eq!(tree.wnd_at(Pt::xy(5, 5)), Some(top));
    }

    // =========================================================================
    // Layout application
    // =========================================================================

    #[test]
    fn immediate_layout_follows_container_resize() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let cells: Vec<WndId> = (0..4)
            .map(|_| tree.create(Rect::ZERO, interactive(), Plain))
            .collect();
        tree.set_layout(container, grid_2x2()).unwrap();
        for (i, cell) in cells.iter().enumerate() {
            tree.layout_add(container, *cell, i / 2, i % 2, 1, 1, Alignment::empty())
                .unwrap();
        }
        assert_eq!(tree.relative_rect(cells[3]).unwrap(), Rect::ltrb(50, 50, 100, 100));

        tree.resize(container, Pt::xy(200, 60)).unwrap();
        assert_eq!(tree.relative_rect(cells[3]).unwrap(), Rect::ltrb(100, 30, 200, 60));
        assert_eq!(tree.parent(cells[0]), Some(container));
    }

    #[test]
    fn deferred_layout_solves_once_per_frame() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), Plain);
        tree.register(container).unwrap();
        let mut layout = Layout::new(1, 1, 0, 0);
        layout.set_row_stretch(0, 1.0).unwrap();
        layout.set_column_stretch(0, 1.0).unwrap();
        layout.add(child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.set_layout(container, DeferredLayout::new(layout)).unwrap();
        tree.pre_render_pass();
        let base = tree.layout(container).unwrap().solve_count();

        tree.resize(container, Pt::xy(120, 100)).unwrap();
        tree.resize(container, Pt::xy(140, 100)).unwrap();
        tree.resize(container, Pt::xy(160, 90)).unwrap();
        assert_eq!(tree.layout(container).unwrap().solve_count(), base);
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(0, 0, 100, 100));
        assert!(tree.data(container).unwrap().requires_pre_render());

        tree.pre_render_pass();
        assert_eq!(tree.layout(container).unwrap().solve_count(), base + 1);
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(0, 0, 160, 90));
        assert!(!tree.data(container).unwrap().requires_pre_render());

        // Same rectangle again: nothing staged, nothing solved.
        tree.size_move(container, Pt::ORIGIN, Pt::xy(160, 90)).unwrap();
        tree.pre_render_pass();
        assert_eq!(tree.layout(container).unwrap().solve_count(), base + 1);
    }

    /// Grows its parent the first time it is resized during a solve.
    struct Greedy {
        fired: bool,
    }

    impl Wnd for Greedy {
        fn size_moved(&mut self, cx: &mut WndContext<'_>, _old: Rect, _new: Rect) {
            if self.fired {
                return;
            }
            self.fired = true;
            let id = cx.id();
            let parent = cx.tree.parent(id).unwrap();
            cx.tree.resize(parent, Pt::xy(300, 300)).unwrap();
        }
    }

    #[test]
    fn resize_during_deferred_solve_applies_in_place() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), Greedy { fired: false });
        tree.register(container).unwrap();
        let mut layout = Layout::new(1, 1, 0, 0);
        layout.set_row_stretch(0, 1.0).unwrap();
        layout.set_column_stretch(0, 1.0).unwrap();
        layout.add(child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.set_layout(container, DeferredLayout::new(layout)).unwrap();

        tree.pre_render_pass();

        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(0, 0, 300, 300));
        let deferred = tree
            .data(container)
            .unwrap()
            .layout()
            .unwrap()
            .deferred()
            .unwrap();
        assert_eq!(deferred.state(), DeferredState::Idle);
        assert_eq!(deferred.applied(), Some(Rect::ltrb(0, 0, 300, 300)));
        assert!(!tree.data(container).unwrap().requires_pre_render());
    }

    /// Grows its parent from its pre-render hook, once.
    struct GrowsParent {
        fired: bool,
    }

    impl Wnd for GrowsParent {
        fn pre_render(&mut self, cx: &mut WndContext<'_>) {
            if self.fired {
                return;
            }
            self.fired = true;
            let parent = cx.tree.parent(cx.id()).unwrap();
            cx.tree.resize(parent, Pt::xy(240, 180)).unwrap();
        }
    }

    #[test]
    fn child_pre_render_resizing_container_applies_in_place() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), GrowsParent { fired: false });
        tree.register(container).unwrap();
        let mut layout = Layout::new(1, 1, 0, 0);
        layout.set_row_stretch(0, 1.0).unwrap();
        layout.set_column_stretch(0, 1.0).unwrap();
        layout.add(child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.set_layout(container, DeferredLayout::new(layout)).unwrap();
        tree.request_pre_render(child).unwrap();

        tree.pre_render_pass();

        assert!(tree.behavior::<GrowsParent>(child).unwrap().fired);
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(0, 0, 240, 180));
        let deferred = tree
            .data(container)
            .unwrap()
            .layout()
            .unwrap()
            .deferred()
            .unwrap();
        assert_eq!(deferred.state(), DeferredState::Idle);
        assert_eq!(deferred.applied(), Some(Rect::ltrb(0, 0, 240, 180)));
        assert!(!tree.data(container).unwrap().requires_pre_render());
        assert!(!tree.data(child).unwrap().requires_pre_render());
    }

    #[test]
    fn settings_change_survives_resizing_back_within_a_frame() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), Plain);
        tree.register(container).unwrap();
        let mut layout = Layout::new(1, 1, 0, 0);
        layout.add(child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.set_layout(container, DeferredLayout::new(layout)).unwrap();
        tree.pre_render_pass();
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ZERO);

        tree.update_layout(container, |layout| {
            layout.set_row_stretch(0, 1.0)?;
            layout.set_column_stretch(0, 1.0)
        })
        .unwrap();
        tree.resize(container, Pt::xy(150, 150)).unwrap();
        tree.resize(container, Pt::xy(100, 100)).unwrap();
        assert!(tree.data(container).unwrap().requires_pre_render());

        tree.pre_render_pass();
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(0, 0, 100, 100));
    }

    #[test]
    fn destroying_staged_container_cancels_pending_work() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        tree.register(container).unwrap();
        tree.set_layout(container, DeferredLayout::new(Layout::new(1, 1, 0, 0)))
            .unwrap();
        assert!(tree.data(container).unwrap().requires_pre_render());
        tree.destroy(container).unwrap();
        assert_eq!(tree.pre_render_pass(), 0);
    }

    #[test]
    fn child_min_size_change_relayouts_parent() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 10), interactive(), Plain);
        let left = tree.create(Rect::ZERO, interactive(), Plain);
        let right = tree.create(Rect::ZERO, interactive(), Plain);
        let mut layout = Layout::new(1, 2, 0, 0);
        layout.set_column_stretch(0, 1.0).unwrap();
        layout.set_column_stretch(1, 1.0).unwrap();
        tree.set_layout(container, layout).unwrap();
        tree.layout_add(container, left, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.layout_add(container, right, 0, 1, 1, 1, Alignment::empty()).unwrap();
        assert_eq!(tree.relative_rect(left).unwrap().width(), X(50));

        tree.set_min_size(left, Some(Pt::xy(80, 0))).unwrap();
        // Leftover 100 - 80 = 20 is split 10/10.
        assert_eq!(tree.relative_rect(left).unwrap().width(), X(90));
        assert_eq!(tree.relative_rect(right).unwrap().width(), X(10));
        assert_eq!(tree.relative_rect(right).unwrap().height(), Y(0));
    }

    #[test]
    fn update_layout_resolves() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), Plain);
        tree.set_layout(container, Layout::new(1, 1, 0, 0)).unwrap();
        tree.layout_add(container, child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ZERO);

        tree.update_layout(container, |layout| {
            layout.set_row_stretch(0, 1.0)?;
            layout.set_column_stretch(0, 1.0)?;
            layout.set_border_margin(10);
            Ok(())
        })
        .unwrap();
        assert_eq!(tree.relative_rect(child).unwrap(), Rect::ltrb(10, 10, 90, 90));
    }

    #[test]
    fn detaching_a_laid_out_child_frees_its_cell() {
        let mut tree = WndTree::new();
        let container = tree.create(Rect::ltrb(0, 0, 100, 100), interactive(), Plain);
        let child = tree.create(Rect::ZERO, interactive(), Plain);
        tree.set_layout(container, grid_2x2()).unwrap();
        tree.layout_add(container, child, 0, 0, 1, 1, Alignment::empty()).unwrap();
        tree.destroy(child).unwrap();
        assert_eq!(tree.layout(container).unwrap().wnd_at(0, 0), None);
        assert!(matches!(
            tree.set_layout(container, Layout::new(1, 1, 0, 0)),
            Err(GuiError::LayoutAlreadyAttached(_))
        ));
    }

    #[test]
    fn behavior_downcast() {
        let mut tree = WndTree::new();
        let w = tree.create(Rect::ZERO, interactive(), Greedy { fired: true });
        assert!(tree.behavior::<Greedy>(w).is_some());
        assert!(tree.behavior::<Plain>(w).is_none());
        tree.behavior_mut::<Greedy>(w).unwrap().fired = false;
        assert!(!tree.behavior::<Greedy>(w).unwrap().fired);
    }
}
