//! Graph renderer
//!
//! Lays out a [`ChainGraph`] with the seeded spring layout and draws it onto
//! a white canvas: arrowed edges, fixed-size discs in one colour, labels in
//! the built-in font. Output is PNG.

use crate::error::ChainError;
use crate::font;
use crate::graph::ChainGraph;
use crate::layout::{Layout, SpringLayout, DEFAULT_LAYOUT_ITERATIONS, DEFAULT_LAYOUT_SEED};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const NODE_COLOR: Rgba<u8> = Rgba([31, 119, 180, 255]);
const EDGE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Largest canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;
/// Largest node disc radius, in pixels
pub const MAX_NODE_RADIUS: u32 = 512;
/// Largest label font scale
pub const MAX_LABEL_SCALE: u32 = 32;

/// Arrowhead length in pixels
const ARROW_LENGTH: f64 = 12.0;
/// Arrowhead half-width in pixels
const ARROW_HALF_WIDTH: f64 = 5.0;

/// Fixed presentation constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Layout seed
    pub seed: u64,
    /// Layout iterations
    pub iterations: usize,
    /// Node disc radius in pixels
    pub node_radius: u32,
    /// Label font scale (1 = 5x7 pixel glyphs)
    pub label_scale: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            seed: DEFAULT_LAYOUT_SEED,
            iterations: DEFAULT_LAYOUT_ITERATIONS,
            node_radius: 28,
            label_scale: 2,
        }
    }
}

impl RenderStyle {
    /// With a different layout seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// With a different canvas size
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn layout(&self) -> SpringLayout {
        SpringLayout {
            seed: self.seed,
            iterations: self.iterations,
        }
    }
}

/// A rendered chain image
#[derive(Debug, Clone)]
pub struct RenderedGraph {
    layout: Layout,
    centres: Vec<[f64; 2]>,
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl RenderedGraph {
    /// Normalised layout coordinates
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Pixel centres of the nodes, in node order
    #[inline]
    #[must_use]
    pub fn centres(&self) -> &[[f64; 2]] {
        &self.centres
    }

    /// Canvas size in pixels
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encoded PNG
    #[inline]
    #[must_use]
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Write the PNG to `path`
    ///
    /// # Errors
    /// [`ChainError::Io`] if the file cannot be written.
    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<(), ChainError> {
        let path = path.as_ref();
        std::fs::write(path, &self.png).map_err(|source| ChainError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Draws chain graphs as PNG images
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    style: RenderStyle,
}

impl GraphRenderer {
    /// Create a renderer with the given style
    #[must_use]
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Style in use
    #[inline]
    #[must_use]
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Lay out and draw `graph`
    ///
    /// # Errors
    /// [`ChainError::EmptyGraph`] for a graph without nodes,
    /// [`ChainError::CanvasSize`] for a canvas that cannot be allocated, or
    /// any layout or encoding failure.
    pub fn render(&self, graph: &ChainGraph) -> Result<RenderedGraph, ChainError> {
        self.check_canvas()?;
        let layout = self.style.layout().compute(graph)?;
        let centres = self.to_canvas(&layout);
        let radius = f64::from(self.style.node_radius);

        let mut canvas = RgbaImage::from_pixel(self.style.width, self.style.height, BACKGROUND);

        for (a, b) in graph.edge_endpoints() {
            let (from, to) = (centres[a.index()], centres[b.index()]);
            if a == b {
                draw_self_loop(&mut canvas, from, radius);
            } else {
                draw_arrow(&mut canvas, from, to, radius);
            }
        }

        for centre in &centres {
            fill_disc(&mut canvas, *centre, radius, NODE_COLOR);
        }

        for (node, centre) in graph.nodes().zip(&centres) {
            font::draw_centred(
                &mut canvas,
                node.name(),
                *centre,
                self.style.label_scale,
                LABEL_COLOR,
            );
        }

        let mut png = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bytes = png.len(),
            "chain graph rendered"
        );

        Ok(RenderedGraph {
            layout,
            centres,
            width: self.style.width,
            height: self.style.height,
            png,
        })
    }

    /// Reject sizes `RgbaImage` would panic on, before allocating
    fn check_canvas(&self) -> Result<(), ChainError> {
        let (width, height) = (self.style.width, self.style.height);
        let bytes = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .and_then(|pixels| pixels.checked_mul(4));
        match bytes {
            Some(bytes)
                if bytes > 0 && width <= MAX_CANVAS_SIDE && height <= MAX_CANVAS_SIDE =>
            {
                Ok(())
            }
            _ => Err(ChainError::CanvasSize { width, height }),
        }
    }

    /// Map `[-1, 1]²` onto the canvas, keeping a node-sized margin
    fn to_canvas(&self, layout: &Layout) -> Vec<[f64; 2]> {
        let margin = f64::from(self.style.node_radius) + 4.0;
        let w = f64::from(self.style.width);
        let h = f64::from(self.style.height);
        let usable_w = (w - 2.0 * margin).max(1.0);
        let usable_h = (h - 2.0 * margin).max(1.0);

        layout
            .positions()
            .iter()
            .map(|p| {
                [
                    margin + (p[0] + 1.0) / 2.0 * usable_w,
                    // Image y grows downwards
                    margin + (1.0 - p[1]) / 2.0 * usable_h,
                ]
            })
            .collect()
    }
}

fn put(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(canvas.width()) && y < i64::from(canvas.height()) {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, two pixels wide
fn draw_line(canvas: &mut RgbaImage, from: [f64; 2], to: [f64; 2], color: Rgba<u8>) {
    let (mut x0, mut y0) = (from[0].round() as i64, from[1].round() as i64);
    let (x1, y1) = (to[0].round() as i64, to[1].round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let steep = dx < -dy;
    let mut err = dx + dy;

    loop {
        put(canvas, x0, y0, color);
        if steep {
            put(canvas, x0 + 1, y0, color);
        } else {
            put(canvas, x0, y0 + 1, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Edge from disc border to disc border with a filled arrowhead at `to`
fn draw_arrow(canvas: &mut RgbaImage, from: [f64; 2], to: [f64; 2], radius: f64) {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 2.0 * radius {
        // Discs overlap; nothing visible between them
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let start = [from[0] + ux * radius, from[1] + uy * radius];
    let tip = [to[0] - ux * radius, to[1] - uy * radius];
    draw_line(canvas, start, tip, EDGE_COLOR);

    let base = [tip[0] - ux * ARROW_LENGTH, tip[1] - uy * ARROW_LENGTH];
    let left = [base[0] - uy * ARROW_HALF_WIDTH, base[1] + ux * ARROW_HALF_WIDTH];
    let right = [base[0] + uy * ARROW_HALF_WIDTH, base[1] - ux * ARROW_HALF_WIDTH];
    fill_triangle(canvas, tip, left, right, EDGE_COLOR);
}

/// Ring sitting on top of the node
fn draw_self_loop(canvas: &mut RgbaImage, centre: [f64; 2], radius: f64) {
    let ring = radius * 0.6;
    let ring_centre = [centre[0], centre[1] - radius - ring * 0.5];
    let r = ring.ceil() as i64 + 1;
    let (cx, cy) = (ring_centre[0].round() as i64, ring_centre[1].round() as i64);
    let (xs, ys) = clipped(canvas, cx, cy, r);
    for y in ys {
        for x in xs.clone() {
            let d = ((x as f64 - ring_centre[0]).powi(2) + (y as f64 - ring_centre[1]).powi(2))
                .sqrt();
            if (d - ring).abs() <= 1.0 {
                put(canvas, x, y, EDGE_COLOR);
            }
        }
    }
}

/// The part of the square of half-side `r` around `(cx, cy)` on the canvas
fn clipped(
    canvas: &RgbaImage,
    cx: i64,
    cy: i64,
    r: i64,
) -> (std::ops::Range<i64>, std::ops::Range<i64>) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    (
        (cx - r).max(0)..(cx + r + 1).min(width),
        (cy - r).max(0)..(cy + r + 1).min(height),
    )
}

fn fill_disc(canvas: &mut RgbaImage, centre: [f64; 2], radius: f64, color: Rgba<u8>) {
    let r = radius.ceil() as i64;
    let (cx, cy) = (centre[0].round() as i64, centre[1].round() as i64);
    let r_sq = radius * radius;
    let (xs, ys) = clipped(canvas, cx, cy, r);
    for y in ys {
        for x in xs.clone() {
            let ddx = x as f64 - centre[0];
            let ddy = y as f64 - centre[1];
            if ddx * ddx + ddy * ddy <= r_sq {
                put(canvas, x, y, color);
            }
        }
    }
}

fn fill_triangle(canvas: &mut RgbaImage, a: [f64; 2], b: [f64; 2], c: [f64; 2], color: Rgba<u8>) {
    let min_x = (a[0].min(b[0]).min(c[0]).floor() as i64).max(0);
    let max_x = (a[0].max(b[0]).max(c[0]).ceil() as i64).min(i64::from(canvas.width()) - 1);
    let min_y = (a[1].min(b[1]).min(c[1]).floor() as i64).max(0);
    let max_y = (a[1].max(b[1]).max(c[1]).ceil() as i64).min(i64::from(canvas.height()) - 1);

    let edge = |p: [f64; 2], q: [f64; 2], x: f64, y: f64| {
        (q[0] - p[0]) * (y - p[1]) - (q[1] - p[1]) * (x - p[0])
    };

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f64, y as f64);
            let w0 = edge(a, b, px, py);
            let w1 = edge(b, c, px, py);
            let w2 = edge(c, a, px, py);
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                put(canvas, x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SelfLoopPolicy;
    use crate::tokenizer::PathTokenizer;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn graph(path: &str) -> ChainGraph {
        ChainGraph::from_path(path, &PathTokenizer::default(), SelfLoopPolicy::Allow).unwrap()
    }

    #[test]
    fn renders_png() {
        let rendered = GraphRenderer::default()
            .render(&graph("explorer.exe → cmd.exe → powershell.exe"))
            .unwrap();
        assert!(rendered.png_bytes().starts_with(&PNG_SIGNATURE));
        assert_eq!(rendered.dimensions(), (1000, 500));
        assert_eq!(rendered.centres().len(), 3);
    }

    #[test]
    fn single_node_renders() {
        let rendered = GraphRenderer::default().render(&graph("A")).unwrap();
        assert_eq!(rendered.layout().len(), 1);
        // Centred on the canvas
        assert_eq!(rendered.centres()[0], [500.0, 250.0]);
    }

    #[test]
    fn self_loop_renders() {
        let rendered = GraphRenderer::default().render(&graph("A → A → B")).unwrap();
        assert_eq!(rendered.layout().len(), 2);
    }

    #[test]
    fn empty_graph_fails() {
        let result = GraphRenderer::default().render(&ChainGraph::default());
        assert!(matches!(result, Err(ChainError::EmptyGraph)));
    }

    #[test]
    fn repeated_render_is_identical() {
        let renderer = GraphRenderer::default();
        let g = graph("A → B → C → D");
        let first = renderer.render(&g).unwrap();
        let second = renderer.render(&g).unwrap();
        assert_eq!(first.layout(), second.layout());
        assert_eq!(first.png_bytes(), second.png_bytes());
    }

    #[test]
    fn centres_stay_on_canvas() {
        let style = RenderStyle::default().with_size(300, 200);
        let rendered = GraphRenderer::new(style)
            .render(&graph("a → b → c → d → e → f"))
            .unwrap();
        for c in rendered.centres() {
            assert!(c[0] >= 0.0 && c[0] <= 300.0);
            assert!(c[1] >= 0.0 && c[1] <= 200.0);
        }
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        for (width, height) in [(u32::MAX, u32::MAX), (MAX_CANVAS_SIDE + 1, 10), (0, 10)] {
            let style = RenderStyle::default().with_size(width, height);
            let result = GraphRenderer::new(style).render(&graph("A → B"));
            assert!(
                matches!(result, Err(ChainError::CanvasSize { width: w, height: h }) if w == width && h == height),
                "{width}x{height}"
            );
        }
    }

    #[test]
    fn largest_node_and_label_still_render() {
        let style = RenderStyle {
            node_radius: MAX_NODE_RADIUS,
            label_scale: MAX_LABEL_SCALE,
            ..RenderStyle::default().with_size(64, 64)
        };
        let rendered = GraphRenderer::new(style).render(&graph("A → A → B")).unwrap();
        assert!(rendered.png_bytes().starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn case_distinct_labels_draw_differently() {
        let renderer = GraphRenderer::default();
        let lower = renderer.render(&graph("cmd.exe")).unwrap();
        let upper = renderer.render(&graph("CMD.EXE")).unwrap();
        assert_eq!(lower.centres(), upper.centres());
        assert_ne!(lower.png_bytes(), upper.png_bytes());
    }

    #[test]
    fn non_ascii_labels_draw_differently() {
        let renderer = GraphRenderer::default();
        let first = renderer.render(&graph("пример")).unwrap();
        let second = renderer.render(&graph("задача")).unwrap();
        assert_ne!(first.png_bytes(), second.png_bytes());
    }

    #[test]
    fn node_colour_is_fixed() {
        let style = RenderStyle::default().with_size(200, 200);
        let rendered = GraphRenderer::new(style).render(&graph("x")).unwrap();
        let img = image::load_from_memory(rendered.png_bytes())
            .unwrap()
            .to_rgba8();
        // Just inside the disc, clear of the label
        let c = rendered.centres()[0];
        let px = img.get_pixel(c[0] as u32, (c[1] - 20.0) as u32);
        assert_eq!(*px, NODE_COLOR);
    }
}
