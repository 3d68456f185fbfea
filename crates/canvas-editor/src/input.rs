//! Host-agnostic input events.
//!
//! The host (browser bridge, native shell, tests) translates its own events
//! into `InputEvent`s and feeds them, in delivery order, to
//! `GraphEditorSession::handle`. Pointer coordinates are screen space.

use crate::context_menu::MenuAction;
use canvas_core::kurbo::Point;
use canvas_core::{Category, RelationType, SubType};
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A unified input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// Pointer left the canvas element. Ends drag and pan like a release.
    PointerLeave,
    /// One wheel tick. Negative `delta_y` (scrolling up) zooms in.
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// A palette item dropped at a screen point.
    PaletteDrop {
        x: f64,
        y: f64,
        category: Category,
        sub_type: SubType,
        label: String,
    },
    /// The relation picker reported a choice.
    PickRelation {
        relation: RelationType,
    },
    /// The relation picker was closed without a choice.
    DismissPicker,
    /// A context-menu entry was chosen.
    MenuAction {
        action: MenuAction,
    },
    /// The host is about to paint. Runs deferred work.
    Frame,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, button: PointerButton, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            x,
            y,
            button,
            modifiers,
        }
    }

    /// Primary-button press with no modifiers.
    pub fn click(x: f64, y: f64) -> Self {
        Self::pointer_down(x, y, PointerButton::Primary, Modifiers::NONE)
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Screen position, if this is a positioned event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Wheel { x, y, .. }
            | Self::PaletteDrop { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}
