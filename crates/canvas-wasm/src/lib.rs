//! WASM bridge for the diagnostics canvas: exposes the graph editor session
//! to the browser console.
//!
//! Compiled via `wasm-pack build --target web`. Structured data crosses the
//! boundary as JSON strings; every event method returns the session's
//! effects as a JSON array.

mod render2d;

use canvas_core::kurbo::{Point, Size};
use canvas_core::{EdgeId, EdgePatch, GraphDocument, GraphModel, NodeId, NodePatch};
use canvas_editor::{Effect, GraphEditorSession, InputEvent, Modifiers, PointerButton};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing canvas controller. All interaction from the host page
/// goes through this struct.
#[wasm_bindgen]
pub struct DiagramCanvas {
    session: GraphEditorSession,
}

#[wasm_bindgen]
impl DiagramCanvas {
    /// Create a controller for a canvas element of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let mut session = GraphEditorSession::default();
        session.set_surface(Point::ZERO, Size::new(width, height));
        Self { session }
    }

    // ─── Surface ─────────────────────────────────────────────────────────

    /// Resize the canvas, keeping its page offset.
    pub fn resize(&mut self, width: f64, height: f64) {
        let origin = self.session.surface().origin;
        self.session.set_surface(origin, Size::new(width, height));
    }

    /// Page offset of the canvas element, for hosts that send client coordinates.
    pub fn set_origin(&mut self, left: f64, top: f64) {
        let size = self.session.surface().size;
        self.session.set_surface(Point::new(left, top), size);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.session.set_theme(is_dark);
    }

    /// Render the scene to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let size = self.session.surface().size;
        render2d::render_scene(
            ctx,
            &self.session.scene(),
            self.session.theme(),
            size.width,
            size.height,
        );
    }

    /// Paint-ready scene as JSON, for hosts that draw overlays themselves.
    pub fn scene_json(&self) -> String {
        to_json(&self.session.scene())
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Apply one JSON-encoded `InputEvent`. Malformed events are dropped.
    pub fn handle_event(&mut self, json: &str) -> String {
        match serde_json::from_str::<InputEvent>(json) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                log::warn!("dropping malformed event: {e}");
                "[]".to_string()
            }
        }
    }

    /// Pointer press. `button` is the DOM `MouseEvent.button` value.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(button) = PointerButton::from_dom(button) else {
            return "[]".to_string();
        };
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.dispatch(InputEvent::pointer_down(x, y, button, modifiers))
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    pub fn handle_pointer_leave(&mut self) -> String {
        self.dispatch(InputEvent::PointerLeave)
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        self.dispatch(InputEvent::Wheel { x, y, delta_y })
    }

    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// Relation chosen in the picker, by wire name (`"CAUSES"`).
    pub fn pick_relation(&mut self, name: &str) -> String {
        match parse_name(name) {
            Some(relation) => self.dispatch(InputEvent::PickRelation { relation }),
            None => {
                log::warn!("unknown relation {name:?}");
                "[]".to_string()
            }
        }
    }

    pub fn dismiss_picker(&mut self) -> String {
        self.dispatch(InputEvent::DismissPicker)
    }

    /// Context-menu choice by action name (`"edit"`, `"delete"`).
    pub fn menu_action(&mut self, name: &str) -> String {
        match parse_name(name) {
            Some(action) => self.dispatch(InputEvent::MenuAction { action }),
            None => {
                log::warn!("unknown menu action {name:?}");
                "[]".to_string()
            }
        }
    }

    /// Call once per animation frame before `render`.
    pub fn frame(&mut self) -> String {
        self.dispatch(InputEvent::Frame)
    }

    /// Effects produced by direct calls (`drop_palette_item`, `update_*`, ...).
    pub fn take_effects(&mut self) -> String {
        effects_json(&self.session.take_effects())
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the graph. Returns
    /// `{"ok":true,"report":{...},"requestFrame":bool}` or `{"ok":false,"error":"..."}`.
    pub fn load_json(&mut self, json: &str) -> String {
        match GraphDocument::from_json(json) {
            Ok(doc) => {
                let report = self.session.load(doc);
                serde_json::json!({
                    "ok": true,
                    "report": report,
                    "requestFrame": self.session.needs_frame(),
                })
                .to_string()
            }
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// `{nodes, edges, viewport}` as JSON.
    pub fn serialize_json(&self) -> String {
        match self.session.serialize().to_json() {
            Ok(json) => json,
            Err(e) => error_json(&e.to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    // ─── Palette & property panel ────────────────────────────────────────

    /// Create a node from a palette drop. `category` and `sub_type` are wire
    /// names (`"fault"`, `"mechanical_fault"`).
    pub fn drop_palette_item(
        &mut self,
        category: &str,
        sub_type: &str,
        label: &str,
        x: f64,
        y: f64,
    ) -> bool {
        let (Some(category), Some(sub_type)) = (parse_name(category), parse_name(sub_type)) else {
            log::warn!("unknown palette item {category:?}/{sub_type:?}");
            return false;
        };
        match self
            .session
            .drop_palette_item(category, sub_type, label, Point::new(x, y))
        {
            Ok(_) => true,
            Err(e) => {
                log::warn!("palette drop rejected: {e}");
                false
            }
        }
    }

    /// Apply a JSON `NodePatch`. `false` for a missing node or malformed patch.
    pub fn update_node_json(&mut self, id: &str, patch: &str) -> bool {
        match serde_json::from_str::<NodePatch>(patch) {
            Ok(patch) => self.session.update_node(NodeId::intern(id), patch),
            Err(e) => {
                log::warn!("bad node patch for {id}: {e}");
                false
            }
        }
    }

    /// Apply a JSON `EdgePatch`. `false` for a missing edge or malformed patch.
    pub fn update_edge_json(&mut self, id: &str, patch: &str) -> bool {
        match serde_json::from_str::<EdgePatch>(patch) {
            Ok(patch) => self.session.update_edge(EdgeId::intern(id), patch),
            Err(e) => {
                log::warn!("bad edge patch for {id}: {e}");
                false
            }
        }
    }

    /// Remove a node and its edges. Ask the user first; this does not.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.session.remove_node(NodeId::intern(id))
    }

    pub fn remove_edge(&mut self, id: &str) -> bool {
        self.session.remove_edge(EdgeId::intern(id))
    }

    /// `{"node":id|null,"edge":id|null,"multi":[ids]}`.
    pub fn get_selection(&self) -> String {
        let selection = self.session.selection();
        serde_json::json!({
            "node": selection.focused_node(),
            "edge": selection.focused_edge(),
            "multi": selection.multi(),
        })
        .to_string()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) {
        self.session.set_zoom(zoom);
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.session.set_pan(x, y);
    }

    pub fn fit_to_view(&mut self) -> bool {
        self.session.fit_to_view()
    }

    /// `{"zoom":..,"panX":..,"panY":..}`.
    pub fn get_viewport(&self) -> String {
        to_json(self.session.viewport())
    }
}

impl DiagramCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        effects_json(&self.session.handle(event))
    }
}

fn effects_json(effects: &[Effect]) -> String {
    serde_json::to_string(effects).unwrap_or_else(|_| "[]".to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(&e.to_string()))
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

/// Parse a snake_case / SCREAMING_SNAKE_CASE wire name into a unit enum.
fn parse_name<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
}

// ─── Console logging and panic hook ──────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            let _ = console_log::init_with_level(log::Level::Warn);
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("diagram canvas panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Check a document without loading it into an editor. Returns
/// `{"ok":true,"report":{...}}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> String {
    match GraphDocument::from_json(json) {
        Ok(doc) => {
            let (_, report) = GraphModel::from_document(doc.nodes, doc.edges);
            serde_json::json!({ "ok": true, "report": report }).to_string()
        }
        Err(e) => error_json(&e.to_string()),
    }
}
