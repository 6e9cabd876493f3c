//! GiGi: a retained-mode GUI core.
//!
//! GiGi provides the pieces a windowing toolkit is built from:
//! - A window tree with parent-relative geometry and subtree ownership
//! - Grid layouts, solved immediately or deferred to once per frame
//! - Hit-testing, focus, modality and event bubbling
//! - Hover-activated browse info (tooltips)
//!
//! # Architecture
//!
//! Windows live in a `WndTree` arena. Each window pairs common state
//! (`WndData`) with a boxed `Wnd` behavior. The `Gui` owns the tree and turns
//! host input into window events, then runs each frame as a pre-render pass
//! followed by a render pass through a `Renderer`.
//!
//! # Usage
//!
//! ```ignore
//! use gigi::{Gui, GuiConfig, Rect, WndFlags, control::Button};
//!
//! let mut gui = Gui::new(GuiConfig::default());
//! let ok = gui
//!     .tree_mut()
//!     .create(Rect::ltrb(10, 10, 90, 30), WndFlags::INTERACTIVE, Button::new("OK"));
//! gui.register(ok)?;
//!
//! loop {
//!     for input in host.poll() {
//!         gui.handle_input(input, Instant::now());
//!     }
//!     gui.frame(Instant::now(), &mut host.renderer());
//! }
//! ```

// Core values
pub mod primitives;
pub mod flags;
pub mod error;

// Ambient setup
pub mod config;
pub mod logging;

// Window tree and layout
pub mod wnd;
pub mod layout;
pub mod control;

// Dispatch
pub mod event;
pub mod gui;
pub mod browse_info;

// Drawing
pub mod render;

// Performance instrumentation
pub mod frame_timing;

// Re-export core types
pub use primitives::{Clr, Pt, Rect, X, Y};
pub use flags::{Alignment, FlagRegistry, WndFlags};
pub use error::{GuiError, Result};
pub use config::GuiConfig;
pub use wnd::{Wnd, WndContext, WndData, WndId, WndTree};
pub use layout::{AttachedLayout, DeferredLayout, Layout, LayoutSolution};
pub use event::{
    EventContext, EventResult, GuiInput, Key, Modifiers, MouseButton, NamedKey, WndEvent,
};
pub use gui::Gui;
pub use browse_info::{BrowseInfoMode, BrowseInfoWnd, TextBoxBrowseInfoWnd};
pub use render::{DrawCommand, RecordingRenderer, Renderer};
