//! The editor session: one owner for the model, the viewport, and every
//! piece of interaction state.
//!
//! `handle` is the transition function. It consumes one `InputEvent`,
//! routes it through hit testing to exactly one controller, applies the
//! resulting mutations, and returns the effects the host should act on.
//! Nothing in here panics or returns an error on a bad event; stale ids and
//! refused gestures are logged and dropped.

use crate::connection::{ConnectionCommit, ConnectionController};
use crate::context_menu::{ContextMenuController, MenuAction, MenuTarget};
use crate::drag::DragSession;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::mutation::GraphMutation;
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use canvas_core::kurbo::{Point, Size};
use canvas_core::{
    Category, Edge, EdgeId, EdgePatch, EditError, EditorConfig, GraphDocument, GraphModel,
    LoadReport, Node, NodeId, NodePatch, PanSession, PortSide, RelationType, SubType, Surface,
    Viewport,
};
use canvas_render::{CanvasTheme, HitTarget, InteractionView, Scene, build_scene, hit_test};
use serde::Serialize;

/// Something the host should do after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Effect {
    /// Interaction or model state changed; rebuild the scene.
    Render,
    /// The focused node/edge changed; refresh the property panel.
    SelectionChanged {
        node: Option<NodeId>,
        edge: Option<EdgeId>,
    },
    /// A mutation was applied to the model.
    Mutated { mutation: GraphMutation },
    /// Show the relation picker at a screen point.
    OpenRelationPicker {
        source: NodeId,
        anchor: Point,
        options: Vec<RelationType>,
    },
    CloseRelationPicker,
    /// The user asked to edit a node from the context menu.
    EditNode { id: NodeId },
    /// The user asked to edit an edge from the context menu.
    EditEdge { id: EdgeId },
    /// Deferred work is pending; deliver `InputEvent::Frame` next paint.
    RequestFrame,
}

#[derive(Debug, Clone)]
pub struct GraphEditorSession {
    model: GraphModel,
    viewport: Viewport,
    surface: Surface,
    config: EditorConfig,
    theme: CanvasTheme,
    selection: Selection,
    drag: Option<DragSession>,
    pan: Option<PanSession>,
    connection: ConnectionController,
    menu: ContextMenuController,
    /// Last known pointer, canvas space.
    pointer: Point,
    /// One-shot fit scheduled by the first non-empty load.
    fit_pending: bool,
    auto_fitted: bool,
    // Per-event scratch.
    effects: Vec<Effect>,
    dirty: bool,
}

impl Default for GraphEditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl GraphEditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            model: GraphModel::new(),
            viewport: Viewport::default(),
            surface: Surface::default(),
            config,
            theme: CanvasTheme::light(),
            selection: Selection::new(),
            drag: None,
            pan: None,
            connection: ConnectionController::new(),
            menu: ContextMenuController::new(),
            pointer: Point::ZERO,
            fit_pending: false,
            auto_fitted: false,
            effects: Vec::new(),
            dirty: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn theme(&self) -> &CanvasTheme {
        &self.theme
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn connection(&self) -> &ConnectionController {
        &self.connection
    }

    pub fn context_menu(&self) -> &ContextMenuController {
        &self.menu
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Whether a deferred fit is waiting for the next `Frame`.
    pub fn needs_frame(&self) -> bool {
        self.fit_pending
    }

    // ─── Host surface ────────────────────────────────────────────────────

    /// Record where the canvas element sits on screen and how big it is.
    pub fn set_surface(&mut self, origin: Point, size: Size) {
        self.surface = Surface { origin, size };
    }

    pub fn set_theme(&mut self, dark: bool) {
        self.theme = if dark {
            CanvasTheme::dark()
        } else {
            CanvasTheme::light()
        };
    }

    // ─── Persistence boundary ────────────────────────────────────────────

    /// Replace the model wholesale. Resets selection, drag, pan, the
    /// connection draft and any open menu.
    ///
    /// A viewport in the document is adopted as-is. Otherwise the first
    /// non-empty load schedules a one-shot fit for the next frame.
    pub fn load(&mut self, document: GraphDocument) -> LoadReport {
        let (model, report) = GraphModel::from_document(document.nodes, document.edges);
        self.model.adopt(model);
        self.reset_interaction();
        match document.viewport {
            Some(viewport) => {
                self.viewport.set_zoom(viewport.zoom);
                self.viewport.set_pan(viewport.pan_x, viewport.pan_y);
                self.fit_pending = false;
                self.auto_fitted = true;
            }
            None if !self.auto_fitted && !self.model.is_empty() => self.fit_pending = true,
            None => {}
        }
        log::debug!("load: {report:?}, fit pending: {}", self.fit_pending);
        report
    }

    /// `{nodes, edges, viewport}` as plain data.
    pub fn serialize(&self) -> GraphDocument {
        self.model.to_document(self.viewport)
    }

    /// Wipe the model and every piece of interaction state, including a
    /// pending auto-fit.
    pub fn clear(&mut self) {
        self.model.clear();
        self.fit_pending = false;
        self.reset_interaction();
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Create a node from a palette drop at a screen point. The node's
    /// top-left corner lands under the pointer.
    ///
    /// # Errors
    /// [`EditError::NonFiniteGeometry`] for a malformed drop point and
    /// [`EditError::CategoryMismatch`] when `sub_type` does not refine
    /// `category`.
    pub fn drop_palette_item(
        &mut self,
        category: Category,
        sub_type: SubType,
        label: &str,
        screen: Point,
    ) -> Result<NodeId, EditError> {
        let position = self.viewport.screen_to_canvas(&self.surface, screen);
        let id = self.model.fresh_node_id(&sub_type.id_prefix());
        let mut node = Node::new(id, sub_type, label, position);
        node.category = category;
        let id = self.model.add_node(node)?;
        if let Some(stored) = self.model.node(id) {
            self.effects.push(Effect::Mutated {
                mutation: GraphMutation::AddNode {
                    node: Box::new(stored.clone()),
                },
            });
        }
        self.dirty = true;
        log::debug!("palette: created {id:?}");
        Ok(id)
    }

    // ─── Property panel ──────────────────────────────────────────────────

    /// Missing ids are a no-op returning `false`.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        self.apply(GraphMutation::UpdateNode { id, patch })
    }

    pub fn update_edge(&mut self, id: EdgeId, patch: EdgePatch) -> bool {
        self.apply(GraphMutation::UpdateEdge { id, patch })
    }

    /// Remove a node and its edges. Confirmation is the caller's job.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.apply(GraphMutation::RemoveNode { id })
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.apply(GraphMutation::RemoveEdge { id })
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.dirty = true;
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.viewport.set_pan(x, y);
        self.dirty = true;
    }

    /// Fit every node in the surface. `false` for an empty model.
    pub fn fit_to_view(&mut self) -> bool {
        let Some(bounds) = self.model.content_bounds() else {
            return false;
        };
        let fitted = self
            .viewport
            .fit_to(bounds, self.config.fit_padding, &self.surface);
        self.dirty |= fitted;
        fitted
    }

    // ─── Render ──────────────────────────────────────────────────────────

    /// Project the current state to a paint-ready scene.
    pub fn scene(&self) -> Scene {
        let menu = self.menu.view();
        let view = InteractionView {
            selected_node: self.selection.focused_node(),
            selected_edge: self.selection.focused_edge(),
            multi_select: self.selection.multi(),
            connection_source: self.connection.source(),
            rubber_band_to: self.connection.rubber_band_to(),
            picker: self.connection.picker(),
            menu: menu.as_ref(),
        };
        build_scene(&self.model, &self.viewport, &view, &self.config, &self.theme)
    }

    // ─── Transition function ─────────────────────────────────────────────

    /// Drain effects produced by direct API calls (`drop_palette_item`,
    /// `update_node`, ...) outside of `handle`.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        if std::mem::take(&mut self.dirty) {
            self.effects.push(Effect::Render);
        }
        std::mem::take(&mut self.effects)
    }

    /// Apply one input event and return the resulting effects.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Effect> {
        let focus_before = (self.selection.focused_node(), self.selection.focused_edge());

        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(x, y), button, modifiers),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => self.end_sessions(),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(Point::new(x, y), delta_y),
            InputEvent::Key { key, modifiers } => self.key(&key, modifiers),
            InputEvent::PaletteDrop {
                x,
                y,
                category,
                sub_type,
                label,
            } => {
                if let Err(err) = self.drop_palette_item(category, sub_type, &label, Point::new(x, y))
                {
                    log::warn!("palette drop rejected: {err}");
                }
            }
            InputEvent::PickRelation { relation } => self.pick_relation(relation),
            InputEvent::DismissPicker => self.cancel_connection(),
            InputEvent::MenuAction { action } => self.menu_action(action),
            InputEvent::Frame => self.frame(),
        }

        let focus_after = (self.selection.focused_node(), self.selection.focused_edge());
        if focus_after != focus_before {
            self.effects.push(Effect::SelectionChanged {
                node: focus_after.0,
                edge: focus_after.1,
            });
            self.dirty = true;
        }
        if self.fit_pending {
            self.effects.push(Effect::RequestFrame);
        }
        if std::mem::take(&mut self.dirty) {
            self.effects.push(Effect::Render);
        }
        std::mem::take(&mut self.effects)
    }

    fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(&self.surface, screen);
        self.pointer = canvas;
        let hit = hit_test(&self.model, &self.viewport, &self.config, canvas);

        match button {
            PointerButton::Secondary => {
                self.end_sessions();
                let target = match hit {
                    HitTarget::Port { node, .. } | HitTarget::Node(node) => MenuTarget::Node(node),
                    HitTarget::Edge(edge) => MenuTarget::Edge(edge),
                    HitTarget::Empty => MenuTarget::Empty,
                };
                self.menu.open(screen, target);
                self.dirty = true;
            }
            PointerButton::Middle => {
                self.dirty |= self.menu.dismiss();
                self.pan = Some(PanSession::begin(&self.viewport, screen));
            }
            PointerButton::Primary => {
                self.dirty |= self.menu.dismiss();
                self.primary_down(hit, screen, canvas, modifiers);
            }
        }
    }

    fn primary_down(&mut self, hit: HitTarget, screen: Point, canvas: Point, modifiers: Modifiers) {
        if modifiers.command() {
            if let Some(node) = hit.node() {
                let member = self.selection.toggle_multi(node);
                log::debug!("multi-select: {node:?} member={member}");
                self.dirty = true;
                return;
            }
        }

        match hit {
            HitTarget::Port {
                node,
                side: PortSide::Output,
            } => self.start_connection(node, screen),
            HitTarget::Port {
                node,
                side: PortSide::Input,
            } => {
                if let Some(commit) = self.connection.click_input_port(node) {
                    self.commit_connection(commit);
                }
            }
            HitTarget::Node(node) => self.start_drag(node, canvas),
            HitTarget::Edge(edge) => {
                self.selection.select_edge(edge);
            }
            HitTarget::Empty => {
                self.selection.clear_focus();
                if !modifiers.any() {
                    self.dirty |= !self.selection.multi().is_empty();
                    self.selection.clear_multi();
                }
                self.pan = Some(PanSession::begin(&self.viewport, screen));
            }
        }
    }

    fn start_connection(&mut self, from: NodeId, anchor: Point) {
        let Some(node) = self.model.node(from) else {
            return;
        };
        let options = RelationType::offered_in(node.category.editor()).to_vec();
        self.connection.click_output_port(from, anchor);
        self.effects.push(Effect::OpenRelationPicker {
            source: from,
            anchor,
            options,
        });
        self.dirty = true;
    }

    fn pick_relation(&mut self, relation: RelationType) {
        let Some((from, _)) = self.connection.picker() else {
            log::debug!("relation pick with no picker open");
            return;
        };
        let offered = self
            .model
            .node(from)
            .is_some_and(|n| RelationType::offered_in(n.category.editor()).contains(&relation));
        if !offered {
            log::warn!("relation {relation:?} not offered for {from:?}");
            return;
        }
        let start = self
            .model
            .node(from)
            .map_or(self.pointer, |n| n.port(PortSide::Output));
        if self.connection.pick_relation(relation, start) {
            self.effects.push(Effect::CloseRelationPicker);
            self.dirty = true;
        }
    }

    fn commit_connection(&mut self, commit: ConnectionCommit) {
        let edge = Edge::new(
            self.model.fresh_edge_id(),
            commit.source,
            commit.target,
            commit.relation,
        );
        self.apply(GraphMutation::AddEdge { edge });
        self.dirty = true;
    }

    fn cancel_connection(&mut self) {
        let choosing = self.connection.picker().is_some();
        if self.connection.cancel() {
            if choosing {
                self.effects.push(Effect::CloseRelationPicker);
            }
            self.dirty = true;
        }
    }

    fn start_drag(&mut self, node_id: NodeId, canvas: Point) {
        let Some(node) = self.model.node(node_id) else {
            return;
        };
        if !self.selection.is_multi(node_id) && !self.selection.multi().is_empty() {
            self.selection.clear_multi();
            self.dirty = true;
        }
        self.drag = Some(DragSession::begin(node, canvas));
        self.selection.select_node(node_id);
        log::debug!("drag: begin {node_id:?}");
    }

    fn pointer_move(&mut self, screen: Point) {
        let canvas = self.viewport.screen_to_canvas(&self.surface, screen);
        self.pointer = canvas;

        if let Some(pan) = self.pan {
            pan.update(&mut self.viewport, screen);
            self.dirty = true;
        } else if let Some(drag) = self.drag {
            let mutations = drag.step(&self.model, canvas, self.selection.multi());
            for mutation in mutations {
                self.apply(mutation);
            }
        }
        self.dirty |= self.connection.pointer_moved(canvas);
    }

    /// Pointer up and pointer leave end drag and pan identically.
    fn end_sessions(&mut self) {
        if let Some(drag) = self.drag.take() {
            log::debug!("drag: end {:?}", drag.node_id());
        }
        self.pan = None;
    }

    fn wheel(&mut self, screen: Point, delta_y: f64) {
        let ticks = if delta_y < 0.0 {
            1.0
        } else if delta_y > 0.0 {
            -1.0
        } else {
            return;
        };
        self.viewport
            .zoom_at(&self.surface, screen, ticks, self.config.zoom_step);
        self.dirty = true;
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) {
        let Some(action) =
            ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta)
        else {
            return;
        };
        log::debug!("shortcut: {key} -> {}", action.name());
        match action {
            ShortcutAction::Delete => self.delete_focused(),
            ShortcutAction::Cancel => {
                self.cancel_connection();
                self.dirty |= self.menu.dismiss();
            }
            ShortcutAction::ZoomIn => self.set_zoom(self.viewport.zoom + self.config.zoom_step),
            ShortcutAction::ZoomOut => self.set_zoom(self.viewport.zoom - self.config.zoom_step),
            ShortcutAction::ZoomToFit => {
                self.fit_to_view();
            }
            ShortcutAction::SelectAll => {
                let ids: Vec<NodeId> = self.model.nodes().map(|n| n.id).collect();
                self.selection.set_multi(ids);
                self.dirty = true;
            }
        }
    }

    fn delete_focused(&mut self) {
        if let Some(node) = self.selection.focused_node() {
            self.remove_node(node);
        } else if let Some(edge) = self.selection.focused_edge() {
            self.remove_edge(edge);
        }
    }

    fn menu_action(&mut self, action: MenuAction) {
        let Some((action, target)) = self.menu.choose(action) else {
            return;
        };
        self.dirty = true;
        match (action, target) {
            (MenuAction::Edit, MenuTarget::Node(id)) => {
                self.selection.select_node(id);
                self.effects.push(Effect::EditNode { id });
            }
            (MenuAction::Edit, MenuTarget::Edge(id)) => {
                self.selection.select_edge(id);
                self.effects.push(Effect::EditEdge { id });
            }
            (MenuAction::Delete, MenuTarget::Node(id)) => {
                self.remove_node(id);
            }
            (MenuAction::Delete, MenuTarget::Edge(id)) => {
                self.remove_edge(id);
            }
            (_, MenuTarget::Empty) => {}
        }
    }

    fn frame(&mut self) {
        if std::mem::take(&mut self.fit_pending) {
            self.auto_fitted = self.fit_to_view();
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Apply a mutation, report it, and drop interaction state that now
    /// points at missing ids.
    fn apply(&mut self, mutation: GraphMutation) -> bool {
        if !mutation.apply(&mut self.model) {
            log::debug!("mutation was a no-op: {mutation:?}");
            return false;
        }
        self.effects.push(Effect::Mutated { mutation });
        self.prune_stale();
        self.dirty = true;
        true
    }

    fn prune_stale(&mut self) {
        self.selection.retain_existing(&self.model);
        if self
            .drag
            .is_some_and(|d| !self.model.contains_node(d.node_id()))
        {
            self.drag = None;
        }
        let choosing = self.connection.picker().is_some();
        if self.connection.retain_existing(&self.model) && choosing {
            self.effects.push(Effect::CloseRelationPicker);
        }
        self.menu.retain_existing(&self.model);
    }

    fn reset_interaction(&mut self) {
        self.selection.reset();
        self.drag = None;
        self.pan = None;
        self.cancel_connection();
        self.menu.dismiss();
        self.dirty = true;
    }
}
