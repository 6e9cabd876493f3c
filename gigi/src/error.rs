//! Error types for the window core.
//!
//! Only structural misuse is an error. Odd geometry (inverted or zero-size
//! rectangles) is tolerated everywhere and never reported here.

use thiserror::Error;

use crate::wnd::WndId;

#[derive(Debug, Error)]
pub enum GuiError {
    #[error("unknown window: {0:?}")]
    UnknownWindow(WndId),

    #[error("window {0:?} has no layout")]
    NoLayout(WndId),

    #[error("window {0:?} already has a layout")]
    LayoutAlreadyAttached(WndId),

    #[error("cell ({row}, {column}) is outside a {rows}x{columns} layout")]
    CellOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("cell ({row}, {column}) is already occupied by {occupant:?}")]
    CellOccupied {
        row: usize,
        column: usize,
        occupant: WndId,
    },

    #[error("window {0:?} is not in this layout")]
    NotInLayout(WndId),

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: WndId, child: WndId },

    #[error("window {0:?} does not accept focus")]
    NotFocusable(WndId),

    #[error("window {0:?} is not running modally")]
    NotModal(WndId),

    #[error("flag registry already initialized")]
    FlagsAlreadyInitialized,

    #[error("unknown flag name {name:?} for {flag_type}")]
    UnknownFlagName {
        flag_type: &'static str,
        name: String,
    },

    #[error("invalid stretch factor: {0}")]
    InvalidStretch(f64),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GuiError>;
