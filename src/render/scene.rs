//! Arena scene drawing
//!
//! Z-order is fixed: background, bodies (core circle, guard arc, weapon
//! blade), health bars above cores, then damage popups rising and fading out.

use glam::Vec2;

use crate::arena::{Arena, PartKind, TeamColor};

use super::frame::PixelFrame;

const BACKGROUND: [u8; 4] = [24, 26, 33, 255];
const OUTLINE: [u8; 4] = [0, 0, 0, 255];
const HP_BACK: [u8; 4] = [204, 204, 204, 255];
const HP_FILL: [u8; 4] = [46, 255, 71, 255];
const POPUP_COLOR: [u8; 4] = [240, 128, 128, 255];

fn team_rgba(color: TeamColor) -> [u8; 4] {
    match color {
        TeamColor::Red => [214, 48, 49, 255],
        TeamColor::Blue => [9, 132, 227, 255],
    }
}

/// Draws an [`Arena`] into a [`PixelFrame`]
pub struct ArenaRenderer;

impl ArenaRenderer {
    /// World units to pixels. The frame is expected to share the arena's 4:3
    /// aspect; a mismatched frame letterboxes on the larger axis.
    fn scale(arena: &Arena, frame: &PixelFrame) -> f32 {
        let sx = frame.width as f32 / arena.config().width;
        let sy = frame.height as f32 / arena.config().height;
        sx.min(sy)
    }

    pub fn render(arena: &Arena, frame: &mut PixelFrame) {
        frame.clear(BACKGROUND);
        let scale = Self::scale(arena, frame);

        for body in arena.render_bodies() {
            let px = body.pos.x * scale;
            let py = body.pos.y * scale;
            match body.kind {
                PartKind::Core => {
                    let r = (arena.config().core_radius * scale) as i32;
                    frame.draw_filled_circle(px as i32, py as i32, r, team_rgba(body.color));
                    frame.draw_circle_outline(px as i32, py as i32, r, 2, OUTLINE);
                    Self::draw_health_bar(frame, px, py, scale, body.hp_fraction);
                }
                PartKind::Guard => {
                    // Opens upward in body space; sweep follows body rotation
                    let half = arena.config().guard_angle / 2.0;
                    let facing = body.angle - std::f32::consts::FRAC_PI_2;
                    frame.draw_arc(
                        px,
                        py,
                        arena.config().guard_radius * scale,
                        facing - half,
                        facing + half,
                        scale * 0.12,
                        [120, 120, 130, 255],
                    );
                }
                PartKind::Weapon => {
                    Self::draw_weapon(arena, frame, Vec2::new(px, py), body.angle, scale);
                }
            }
        }

        Self::draw_popups(arena, frame, scale);
    }

    fn draw_health_bar(frame: &mut PixelFrame, px: f32, py: f32, scale: f32, fraction: f32) {
        let bar_w = scale;
        let bar_h = (0.1 * scale).max(2.0);
        let x = (px - bar_w / 2.0) as i32;
        let y = (py - 0.9 * scale) as i32;
        frame.fill_rect(x, y, bar_w as i32, bar_h as i32, HP_BACK);
        frame.fill_rect(x, y, (bar_w * fraction) as i32, bar_h as i32, HP_FILL);
    }

    fn draw_weapon(arena: &Arena, frame: &mut PixelFrame, center: Vec2, angle: f32, scale: f32) {
        let (hx, hy) = arena.config().weapon_half_extents;
        let (sin, cos) = angle.sin_cos();
        let rotate = |local: Vec2| -> (f32, f32) {
            let x = local.x * cos - local.y * sin;
            let y = local.x * sin + local.y * cos;
            (center.x + x * scale, center.y + y * scale)
        };

        // Blade box
        let blade = [
            rotate(Vec2::new(-hx, -hy)),
            rotate(Vec2::new(hx, -hy)),
            rotate(Vec2::new(hx, hy)),
            rotate(Vec2::new(-hx, hy)),
        ];
        frame.fill_convex_poly(&blade, [235, 235, 235, 255]);

        // Tip and fuller line along the blade axis
        let (tip_x, tip_y) = rotate(Vec2::new(hx, 0.0));
        let (base_x, base_y) = rotate(Vec2::new(-hx * 0.4, 0.0));
        frame.draw_line(base_x, base_y, tip_x, tip_y, 2.0, [160, 160, 160, 255]);

        // Crossguard at the hilt
        let (g0x, g0y) = rotate(Vec2::new(-hx * 0.4, -hy * 2.0));
        let (g1x, g1y) = rotate(Vec2::new(-hx * 0.4, hy * 2.0));
        frame.draw_line(g0x, g0y, g1x, g1y, 3.0, OUTLINE);
    }

    fn draw_popups(arena: &Arena, frame: &mut PixelFrame, scale: f32) {
        let now = arena.now_ms();
        let lifetime = arena.config().popup_lifetime_ms;
        for popup in arena.popups() {
            let progress = ((now - popup.spawned_ms) / lifetime).clamp(0.0, 1.0) as f32;
            if progress >= 1.0 {
                continue;
            }
            let x = popup.pos.x * scale;
            // Rises fast at first, then decelerates
            let y = popup.pos.y * scale - scale * progress.sqrt();
            let alpha = (255.0 * (1.0 - progress)) as u8;
            let mut color = POPUP_COLOR;
            color[3] = alpha;
            frame.draw_number(x as i32, y as i32, popup.value.floor() as u32, 2, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;

    #[test]
    fn test_render_paints_background_and_bodies() {
        let arena = Arena::new(ArenaConfig::default(), 3);
        let mut frame = PixelFrame::new(200, 150);
        ArenaRenderer::render(&arena, &mut frame);

        // Corner pixel is background
        assert_eq!(frame.pixel(0, 0), BACKGROUND);

        // A core pixel somewhere carries a team color
        let red = arena.observe(TeamColor::Red).unwrap();
        let scale = 200.0 / 20.0;
        let cx = (red.pos.x * scale) as usize;
        let cy = (red.pos.y * scale) as usize;
        assert_eq!(frame.pixel(cx, cy), team_rgba(TeamColor::Red));
    }

    #[test]
    fn test_render_is_pure_of_arena_state() {
        let arena = Arena::new(ArenaConfig::default(), 3);
        let mut a = PixelFrame::new(80, 60);
        let mut b = PixelFrame::new(80, 60);
        ArenaRenderer::render(&arena, &mut a);
        ArenaRenderer::render(&arena, &mut b);
        assert_eq!(a.buffer, b.buffer);
    }
}
