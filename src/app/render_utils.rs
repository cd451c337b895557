use eframe::egui::{Color32, Pos2, Rect, Vec2, pos2};

pub(super) const FAMILY_PALETTE: [&str; 15] = [
    "#8b5cf6", "#6366f1", "#3b82f6", "#0ea5e9", "#14b8a6", "#22c55e", "#84cc16", "#eab308",
    "#f97316", "#ef4444", "#ec4899", "#d946ef", "#a855f7", "#7c3aed", "#2dd4bf",
];

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(15, 23, 42);
pub(super) const GRID_LINE: Color32 = Color32::from_rgba_premultiplied(30, 41, 59, 160);
pub(super) const PARENT_EDGE: Color32 = Color32::from_rgb(148, 163, 184);
pub(super) const SPOUSE_EDGE: Color32 = Color32::from_rgb(236, 72, 153);
pub(super) const PATH_EDGE: Color32 = Color32::from_rgb(34, 197, 94);
pub(super) const FOCUS_RING: Color32 = Color32::from_rgb(250, 204, 21);

const GRID_STEP: f32 = 40.0;

pub(super) fn parse_hex_color(hex: &str) -> Option<Color32> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub(super) fn family_color(family_index: usize) -> Color32 {
    parse_hex_color(FAMILY_PALETTE[family_index % FAMILY_PALETTE.len()]).unwrap_or(Color32::GRAY)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn grid_lines(rect: Rect, pan: Vec2, zoom: f32) -> Vec<[Pos2; 2]> {
    let step = (GRID_STEP * zoom).max(8.0);
    let origin = rect.center() + pan;
    let mut lines = Vec::new();

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x <= rect.right() {
        lines.push([pos2(x, rect.top()), pos2(x, rect.bottom())]);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y <= rect.bottom() {
        lines.push([pos2(rect.left(), y), pos2(rect.right(), y)]);
        y += step;
    }

    lines
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
