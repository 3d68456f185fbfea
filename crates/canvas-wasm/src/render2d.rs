//! Canvas2D renderer.
//!
//! Paints a [`Scene`] onto an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! Scene geometry is canvas space, so everything below the grid is drawn
//! under one zoom/pan transform. The context menu and relation picker are
//! DOM popovers owned by the host and are not painted here.

use canvas_render::{CanvasTheme, EdgeVisual, Highlight, NodeVisual, RubberBand, Scene};
use canvas_core::kurbo::{Point, Rect};
use canvas_core::NodeStatus;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const GRID_SPACING: f64 = 20.0;
const CORNER_RADIUS: f64 = 8.0;
const ACCENT_WIDTH: f64 = 4.0;
const ARROW_SIZE: f64 = 8.0;
const FONT: &str = "Inter, system-ui, sans-serif";

/// Render one frame.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    theme: &CanvasTheme,
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.set_fill_style_str(scene.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    draw_grid(ctx, scene, canvas_width, canvas_height);

    let vp = scene.viewport;
    ctx.save();
    let _ = ctx.set_transform(vp.zoom, 0.0, 0.0, vp.zoom, vp.pan_x, vp.pan_y);

    // Edges sit under nodes so port circles stay clickable-looking.
    for edge in &scene.edges {
        draw_edge(ctx, edge, theme, vp.zoom);
    }
    for node in &scene.nodes {
        draw_node(ctx, node, theme, vp.zoom);
    }
    if let Some(band) = &scene.rubber_band {
        draw_rubber_band(ctx, band, vp.zoom);
    }

    ctx.restore();
}

// ─── Background ─────────────────────────────────────────────────────────

/// Dot grid that follows pan and zoom.
fn draw_grid(ctx: &CanvasRenderingContext2d, scene: &Scene, width: f64, height: f64) {
    let vp = scene.viewport;
    let spacing = GRID_SPACING * vp.zoom;
    if spacing < 4.0 {
        return;
    }
    ctx.set_fill_style_str(scene.grid);
    let mut x = vp.pan_x.rem_euclid(spacing);
    while x < width {
        let mut y = vp.pan_y.rem_euclid(spacing);
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}

// ─── Nodes ──────────────────────────────────────────────────────────────

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeVisual, theme: &CanvasTheme, zoom: f64) {
    let Rect { x0, y0, x1, y1 } = node.rect;
    let (w, h) = (x1 - x0, y1 - y0);

    ctx.save();
    ctx.set_global_alpha(node.opacity);

    rounded_rect_path(ctx, x0, y0, w, h, CORNER_RADIUS);
    ctx.set_fill_style_str(node.fill);
    ctx.fill();

    // Category accent along the left edge.
    ctx.save();
    ctx.clip();
    ctx.set_fill_style_str(node.accent);
    ctx.fill_rect(x0, y0, ACCENT_WIDTH, h);
    ctx.restore();

    let line_width = match node.highlight {
        Highlight::Default => 1.0,
        _ => 2.0,
    };
    ctx.set_stroke_style_str(node.stroke);
    ctx.set_line_width(line_width / zoom.max(1.0));
    if node.dashed {
        set_dash(ctx, &[5.0, 4.0]);
    }
    rounded_rect_path(ctx, x0, y0, w, h, CORNER_RADIUS);
    ctx.stroke();
    set_dash(ctx, &[]);

    draw_node_text(ctx, node, w, h);
    draw_port(ctx, node.input_port, node.port_radius, theme, node.stroke);
    draw_port(ctx, node.output_port, node.port_radius, theme, node.stroke);

    if node.hit_count > 0 {
        draw_hit_badge(ctx, node, theme);
    }

    ctx.restore();
}

fn draw_node_text(ctx: &CanvasRenderingContext2d, node: &NodeVisual, w: f64, h: f64) {
    let cx = node.rect.x0 + ACCENT_WIDTH / 2.0 + w / 2.0;
    let cy = node.rect.y0 + h / 2.0;

    ctx.set_fill_style_str(node.text);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    ctx.set_font(&format!("500 13px {FONT}"));
    let label = if node.status == NodeStatus::Deprecated {
        format!("{} (deprecated)", node.label)
    } else {
        node.label.clone()
    };
    let _ = ctx.fill_text_with_max_width(&label, cx, cy - 7.0, w - 24.0);

    ctx.set_font(&format!("400 10px {FONT}"));
    ctx.set_global_alpha(node.opacity * 0.7);
    let _ = ctx.fill_text_with_max_width(node.caption, cx, cy + 9.0, w - 24.0);
    ctx.set_global_alpha(node.opacity);
}

fn draw_port(
    ctx: &CanvasRenderingContext2d,
    at: Point,
    radius: f64,
    theme: &CanvasTheme,
    stroke: &str,
) {
    ctx.begin_path();
    let _ = ctx.arc(at.x, at.y, radius, 0.0, std::f64::consts::TAU);
    ctx.set_fill_style_str(theme.port_fill);
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(1.0);
    ctx.stroke();
}

/// Hit counter in the top-right corner.
fn draw_hit_badge(ctx: &CanvasRenderingContext2d, node: &NodeVisual, theme: &CanvasTheme) {
    let text = node.hit_count.to_string();
    let r = 8.0_f64.max(3.5 * text.len() as f64 + 2.0);
    let (cx, cy) = (node.rect.x1 - 2.0, node.rect.y0 + 2.0);

    ctx.begin_path();
    let _ = ctx.arc(cx, cy, r, 0.0, std::f64::consts::TAU);
    ctx.set_fill_style_str(node.accent);
    ctx.fill();

    ctx.set_font(&format!("600 9px {FONT}"));
    ctx.set_fill_style_str(theme.port_fill);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(&text, cx, cy);
}

// ─── Edges ──────────────────────────────────────────────────────────────

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeVisual, theme: &CanvasTheme, zoom: f64) {
    ctx.save();
    ctx.set_stroke_style_str(edge.stroke);
    let width = if edge.selected { 2.5 } else { 1.5 };
    ctx.set_line_width(width / zoom.max(1.0));

    ctx.begin_path();
    ctx.move_to(edge.from.x, edge.from.y);
    ctx.bezier_curve_to(
        edge.ctrl1.x,
        edge.ctrl1.y,
        edge.ctrl2.x,
        edge.ctrl2.y,
        edge.to.x,
        edge.to.y,
    );
    ctx.stroke();

    draw_arrowhead(ctx, edge.ctrl2, edge.to, edge.stroke);

    ctx.set_font(&format!("11px {FONT}"));
    ctx.set_fill_style_str(theme.edge_label);
    ctx.set_text_align("center");
    ctx.set_text_baseline("bottom");
    let _ = ctx.fill_text(&edge.label, edge.label_pos.x, edge.label_pos.y);
    if let Some(weight) = &edge.weight_label {
        ctx.set_font(&format!("10px {FONT}"));
        ctx.set_text_baseline("top");
        let _ = ctx.fill_text(weight, edge.label_pos.x, edge.label_pos.y + 2.0);
    }

    ctx.restore();
}

/// Filled arrowhead at `tip`, pointing along `from → tip`.
fn draw_arrowhead(ctx: &CanvasRenderingContext2d, from: Point, tip: Point, color: &str) {
    let dir = tip - from;
    let len = dir.hypot();
    if len < f64::EPSILON {
        return;
    }
    let (ux, uy) = (dir.x / len, dir.y / len);
    let (bx, by) = (tip.x - ux * ARROW_SIZE, tip.y - uy * ARROW_SIZE);
    let half = ARROW_SIZE * 0.5;

    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(bx - uy * half, by + ux * half);
    ctx.line_to(bx + uy * half, by - ux * half);
    ctx.close_path();
    ctx.set_fill_style_str(color);
    ctx.fill();
}

fn draw_rubber_band(ctx: &CanvasRenderingContext2d, band: &RubberBand, zoom: f64) {
    ctx.save();
    ctx.set_stroke_style_str(band.stroke);
    ctx.set_line_width(1.5 / zoom.max(1.0));
    set_dash(ctx, &[6.0, 4.0]);
    ctx.begin_path();
    ctx.move_to(band.from.x, band.from.y);
    ctx.bezier_curve_to(
        band.ctrl1.x,
        band.ctrl1.y,
        band.ctrl2.x,
        band.ctrl2.y,
        band.to.x,
        band.to.y,
    );
    ctx.stroke();
    ctx.restore();
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
    let array = js_sys::Array::new();
    for s in segments {
        array.push(&JsValue::from_f64(*s));
    }
    let _ = ctx.set_line_dash(&array);
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
