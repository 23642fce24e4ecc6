use eframe::egui::{
    self,
    epaint::{Mesh, Vertex, WHITE_UV},
    Color32, Pos2, Rect,
};

use crate::channels::{AnimationError, Channel, Repeat, TimingSpec};

/// Screen background, panels and the blobs all share the same near-black.
pub const BACKGROUND: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);
pub const BLOB_FILL: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);
pub const SHADOW_DARK: Color32 = Color32::from_rgb(0x00, 0x00, 0x00);
pub const SHADOW_LIGHT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0xaa, 0xaa, 0xaa);

/// First gradient stop per hue-cycle step.
pub fn start_palette() -> Palette {
    Palette::new(vec![
        Color32::from_rgba_unmultiplied(0, 255, 255, 204),
        Color32::from_rgba_unmultiplied(34, 193, 195, 204),
        Color32::from_rgba_unmultiplied(63, 94, 251, 204),
        Color32::from_rgba_unmultiplied(0, 128, 255, 204),
    ])
    .expect("built-in palette has four entries")
}

/// Second gradient stop per hue-cycle step.
pub fn end_palette() -> Palette {
    Palette::new(vec![
        Color32::from_rgba_unmultiplied(0, 212, 255, 255),
        Color32::from_rgba_unmultiplied(72, 61, 139, 255),
        Color32::from_rgba_unmultiplied(0, 191, 255, 255),
        Color32::from_rgba_unmultiplied(25, 25, 112, 255),
    ])
    .expect("built-in palette has four entries")
}

/// A fixed ordered set of colors sampled with a continuous index:
/// `sample(1.5)` is the halfway blend of entries 1 and 2.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color32>,
}

impl Palette {
    pub fn new(colors: Vec<Color32>) -> Result<Self, AnimationError> {
        if colors.len() < 2 {
            return Err(AnimationError::invalid(format!(
                "palette needs at least 2 entries, got {}",
                colors.len()
            )));
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn max_index(&self) -> f32 {
        (self.colors.len() - 1) as f32
    }

    pub fn sample(&self, index: f32) -> Color32 {
        let index = index.clamp(0.0, self.max_index());
        let lower = index.floor() as usize;
        let upper = (lower + 1).min(self.colors.len() - 1);
        lerp_color(self.colors[lower], self.colors[upper], index - lower as f32)
    }
}

/// The free-running hue cycle: a color index ping-ponging across both
/// palettes, exposing the current gradient stop pair.
#[derive(Debug, Clone)]
pub struct GradientCycle {
    index: Channel,
    start: Palette,
    end: Palette,
}

impl GradientCycle {
    pub fn new(cycle_secs: f32) -> Result<Self, AnimationError> {
        Self::with_palettes(start_palette(), end_palette(), cycle_secs)
    }

    pub fn with_palettes(
        start: Palette,
        end: Palette,
        cycle_secs: f32,
    ) -> Result<Self, AnimationError> {
        if start.len() != end.len() {
            return Err(AnimationError::invalid(format!(
                "gradient palettes must have matching lengths, got {} and {}",
                start.len(),
                end.len()
            )));
        }
        let index = Channel::timing(
            0.0,
            start.max_index(),
            TimingSpec::new(cycle_secs).with_repeat(Repeat::Reverse),
        )?;
        Ok(Self { index, start, end })
    }

    pub fn advance(&mut self, dt: f32) {
        self.index.advance(dt);
    }

    pub fn index(&self) -> f32 {
        self.index.value()
    }

    pub fn max_index(&self) -> f32 {
        self.start.max_index()
    }

    /// Current (start, end) gradient stops.
    pub fn stops(&self) -> (Color32, Color32) {
        let index = self.index.value();
        (self.start.sample(index), self.end.sample(index))
    }
}

pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    Color32::from_rgba_unmultiplied(
        (a.r() as f32 * inv + b.r() as f32 * t).round() as u8,
        (a.g() as f32 * inv + b.g() as f32 * t).round() as u8,
        (a.b() as f32 * inv + b.b() as f32 * t).round() as u8,
        (a.a() as f32 * inv + b.a() as f32 * t).round() as u8,
    )
}

fn push_vertex(mesh: &mut Mesh, pos: Pos2, color: Color32) -> u32 {
    let idx = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex {
        pos,
        uv: WHITE_UV,
        color,
    });
    idx
}

/// Pill-shaped horizontal gradient strip: a vertex-colored quad between two
/// end caps filled with the respective stop colors.
pub fn paint_gradient_pill(painter: &egui::Painter, rect: Rect, start: Color32, end: Color32) {
    if rect.width() <= f32::EPSILON || rect.height() <= f32::EPSILON {
        return;
    }
    let radius = rect.height() / 2.0;
    let left_center = Pos2::new(rect.min.x + radius, rect.center().y);
    let right_center = Pos2::new(rect.max.x - radius, rect.center().y);

    painter.circle_filled(left_center, radius, start);
    painter.circle_filled(right_center, radius, end);

    let body = Rect::from_min_max(
        Pos2::new(left_center.x, rect.min.y),
        Pos2::new(right_center.x, rect.max.y),
    );
    if body.width() <= f32::EPSILON {
        return;
    }
    let mut mesh = Mesh::default();
    let v0 = push_vertex(&mut mesh, body.left_top(), start);
    let v1 = push_vertex(&mut mesh, body.right_top(), end);
    let v2 = push_vertex(&mut mesh, body.left_bottom(), start);
    let v3 = push_vertex(&mut mesh, body.right_bottom(), end);
    mesh.add_triangle(v0, v2, v1);
    mesh.add_triangle(v1, v2, v3);
    painter.add(egui::Shape::mesh(mesh));
}

/// Circle filled with a linear gradient running along the top-left to
/// bottom-right diagonal: a triangle fan with per-vertex colors projected
/// onto the gradient axis.
pub fn paint_gradient_circle(
    painter: &egui::Painter,
    center: Pos2,
    radius: f32,
    start: Color32,
    end: Color32,
) {
    if radius <= f32::EPSILON {
        return;
    }
    const SEGMENTS: usize = 48;
    // Unit diagonal; a rim point's projection onto it spans [-r, r].
    let axis = egui::Vec2::new(
        std::f32::consts::FRAC_1_SQRT_2,
        std::f32::consts::FRAC_1_SQRT_2,
    );

    let mut mesh = Mesh::default();
    let center_idx = push_vertex(&mut mesh, center, lerp_color(start, end, 0.5));
    let mut rim = Vec::with_capacity(SEGMENTS + 1);
    for i in 0..=SEGMENTS {
        let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        let offset = egui::Vec2::angled(angle) * radius;
        let t = (offset.dot(axis) / radius + 1.0) / 2.0;
        rim.push(push_vertex(
            &mut mesh,
            center + offset,
            lerp_color(start, end, t),
        ));
    }
    for pair in rim.windows(2) {
        mesh.add_triangle(center_idx, pair[0], pair[1]);
    }
    painter.add(egui::Shape::mesh(mesh));
}

/// Soft dual drop shadow under a circle: a dark copy toward the lower
/// right, a light copy toward the upper left, each fading over a few
/// expanding rings.
pub fn paint_neumorphic_circle(painter: &egui::Painter, center: Pos2, radius: f32, fill: Color32) {
    if radius <= f32::EPSILON {
        return;
    }
    const LAYERS: u8 = 4;
    for i in (1..=LAYERS).rev() {
        let spread = f32::from(i) * 2.5;
        let alpha = 36 / i;
        painter.circle_filled(
            center + egui::Vec2::splat(6.0),
            radius + spread,
            Color32::from_rgba_unmultiplied(
                SHADOW_DARK.r(),
                SHADOW_DARK.g(),
                SHADOW_DARK.b(),
                alpha,
            ),
        );
        painter.circle_filled(
            center - egui::Vec2::splat(6.0),
            radius + spread,
            Color32::from_rgba_unmultiplied(
                SHADOW_LIGHT.r(),
                SHADOW_LIGHT.g(),
                SHADOW_LIGHT.b(),
                alpha,
            ),
        );
    }
    painter.circle_filled(center, radius, fill);
}

/// Multiply a color's alpha by `opacity` in [0, 1].
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity).round() as u8,
    )
}
