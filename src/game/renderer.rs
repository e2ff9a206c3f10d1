//! Stereo Renderer
//!
//! Draws the playfield twice, side by side, once per eye. Each entity kind
//! sits at its own depth behind (or in front of) the focal plane, and each
//! eye projects it from a camera shifted by half the eye separation, which
//! gives the parallax. With stereo off a single centered view fills the
//! window.
//!
//! Screen-space drawing only; the world is 2D plus a per-kind depth.

use macroquad::prelude::*;

use super::components::{Team, WeaponKind};
use super::context::GameContext;
use super::world::{World, PROJECTILE_RADIUS};
use crate::config::StereoSettings;

// Depth of each kind relative to the focal plane (positive = farther)
const DEPTH_ENEMY: f32 = 1.0;
const DEPTH_SHOT: f32 = 0.3;
const DEPTH_PLAYER: f32 = 0.0;
const DEPTH_COIN: f32 = -0.8;

const BACKGROUND: Color = Color::new(0.04, 0.05, 0.09, 1.0);
const FIELD_BORDER: Color = Color::new(0.25, 0.3, 0.45, 1.0);
const PLAYER_COLOR: Color = Color::new(0.45, 0.85, 1.0, 1.0);
const ENEMY_COLOR: Color = Color::new(0.95, 0.3, 0.25, 1.0);
const COIN_COLOR: Color = Color::new(1.0, 0.85, 0.2, 1.0);
const COLLIDER_COLOR: Color = Color::new(0.2, 1.0, 0.3, 0.9);

/// One eye's slice of the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Camera x offset in world units (negative = left eye)
    pub eye: f32,
}

impl EyeView {
    pub fn center(&self) -> Vec2 {
        vec2(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

/// Split the window into eye views.
pub fn eye_views(screen_w: f32, screen_h: f32, stereo: &StereoSettings) -> Vec<EyeView> {
    if !stereo.enabled {
        return vec![EyeView {
            x: 0.0,
            y: 0.0,
            w: screen_w,
            h: screen_h,
            eye: 0.0,
        }];
    }
    let half = screen_w * 0.5;
    let offset = stereo.eye_separation * 0.5;
    vec![
        EyeView { x: 0.0, y: 0.0, w: half, h: screen_h, eye: -offset },
        EyeView { x: half, y: 0.0, w: half, h: screen_h, eye: offset },
    ]
}

/// Project a world point at `depth` for a camera at x = `eye`, `distance`
/// in front of the focal plane. Returns the point on the focal plane and
/// the size factor.
pub fn project(point: Vec2, depth: f32, eye: f32, distance: f32) -> (Vec2, f32) {
    let scale = distance / (distance + depth).max(0.01);
    let x = eye + (point.x - eye) * scale;
    (vec2(x, point.y * scale), scale)
}

/// Maps world units to pixels for one view
struct ViewTransform {
    view: EyeView,
    pixels_per_unit: f32,
    distance: f32,
}

impl ViewTransform {
    fn new(view: EyeView, stereo: &StereoSettings) -> Self {
        Self {
            view,
            pixels_per_unit: view.h / stereo.view_height,
            distance: stereo.camera_distance,
        }
    }

    /// Screen position and radius in pixels
    fn to_screen(&self, point: Vec2, depth: f32, radius: f32) -> (Vec2, f32) {
        let (p, scale) = project(point, depth, self.view.eye, self.distance);
        let c = self.view.center();
        // World y is up, screen y is down. The focal plane lands at the same
        // spot in both views.
        let screen = vec2(c.x + p.x * self.pixels_per_unit, c.y - p.y * self.pixels_per_unit);
        (screen, radius * scale * self.pixels_per_unit)
    }
}

pub fn draw_frame(ctx: &GameContext) {
    clear_background(BACKGROUND);

    let stereo = &ctx.config.stereo;
    for view in eye_views(screen_width(), screen_height(), stereo) {
        let t = ViewTransform::new(view, stereo);
        draw_playfield(&t, ctx);
        draw_world(&t, &ctx.world);
        if ctx.show_colliders {
            draw_colliders(&t, &ctx.world);
        }
        draw_hud(&view, ctx);
        if let Some(menu) = ctx.menu {
            draw_menu(&view, menu.lines());
        }
    }

    if stereo.enabled {
        let mid = screen_width() * 0.5;
        draw_line(mid, 0.0, mid, screen_height(), 2.0, BLACK);
    }
}

fn draw_playfield(t: &ViewTransform, ctx: &GameContext) {
    let (bx, by) = ctx.config.player.bounds;
    let (top_left, _) = t.to_screen(vec2(-bx, by), DEPTH_PLAYER, 0.0);
    let (bottom_right, _) = t.to_screen(vec2(bx, -by), DEPTH_PLAYER, 0.0);
    let size = bottom_right - top_left;
    draw_rectangle_lines(top_left.x, top_left.y, size.x, size.y, 1.0, FIELD_BORDER);
}

fn draw_world(t: &ViewTransform, world: &World) {
    // Far to near
    for (idx, _) in world.enemies.iter() {
        let e = world.entity_at(idx);
        let (Some(pos), Some(col)) = (world.position(e), world.colliders.get(e)) else { continue };
        let (p, r) = t.to_screen(pos, DEPTH_ENEMY, col.radius);
        draw_triangle(vec2(p.x - r, p.y - r), vec2(p.x + r, p.y - r), vec2(p.x, p.y + r), ENEMY_COLOR);
    }

    for (idx, shot) in world.projectiles.iter() {
        let e = world.entity_at(idx);
        let Some(pos) = world.position(e) else { continue };
        let (p, r) = t.to_screen(pos, DEPTH_SHOT, PROJECTILE_RADIUS);
        let color = match shot.team {
            Team::Player => WHITE,
            Team::Enemy => ORANGE,
        };
        draw_circle(p.x, p.y, r.max(1.5), color);
    }

    for (idx, player) in world.players.iter() {
        let e = world.entity_at(idx);
        if !player.is_alive() {
            continue;
        }
        let (Some(pos), Some(col)) = (world.position(e), world.colliders.get(e)) else { continue };
        // Blink while invincible
        let blinking = world.health.get(e).is_some_and(|h| h.invincible_frames / 4 % 2 == 1);
        if blinking {
            continue;
        }
        let (p, r) = t.to_screen(pos, DEPTH_PLAYER, col.radius);
        draw_triangle(vec2(p.x, p.y - r * 1.4), vec2(p.x - r, p.y + r), vec2(p.x + r, p.y + r), PLAYER_COLOR);

        let guns = world
            .weapons_of(e)
            .iter()
            .filter(|w| w.kind == WeaponKind::MassMachineGun)
            .count();
        for i in 0..guns {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let step = (i / 2 + 1) as f32;
            draw_circle(p.x + side * r * (0.8 + 0.3 * step), p.y + r * 0.6, r * 0.2, PLAYER_COLOR);
        }
    }

    for (idx, coin) in world.coins.iter() {
        let e = world.entity_at(idx);
        let (Some(pos), Some(col)) = (world.position(e), world.colliders.get(e)) else { continue };
        let (p, r) = t.to_screen(pos, DEPTH_COIN, col.radius);
        let mut color = COIN_COLOR;
        if coin.is_appearing() {
            color.a = 0.5;
        }
        draw_circle(p.x, p.y, r, color);
    }
}

fn draw_colliders(t: &ViewTransform, world: &World) {
    for (idx, col) in world.colliders.iter() {
        let e = world.entity_at(idx);
        let Some(pos) = world.position(e) else { continue };
        let depth = if world.enemies.contains(e) {
            DEPTH_ENEMY
        } else if world.coins.contains(e) {
            DEPTH_COIN
        } else if world.projectiles.contains(e) {
            DEPTH_SHOT
        } else {
            DEPTH_PLAYER
        };
        let (p, r) = t.to_screen(pos, depth, col.radius);
        draw_circle_lines(p.x, p.y, r, 1.0, COLLIDER_COLOR);
    }
}

fn draw_hud(view: &EyeView, ctx: &GameContext) {
    let text = ctx.hud.text();
    if text.is_empty() {
        return;
    }
    let size = 24.0;
    let dims = measure_text(text, None, size as u16, 1.0);
    draw_text(text, view.x + view.w - dims.width - 12.0, view.y + 28.0, size, COIN_COLOR);
}

/// Overlay for a host frozen by the break fault policy
pub fn draw_halted_banner() {
    let text = "HALTED - press Esc to quit";
    let size = 28.0;
    let dims = measure_text(text, None, size as u16, 1.0);
    let (w, h) = (screen_width(), screen_height());
    draw_rectangle(0.0, h * 0.5 - 30.0, w, 48.0, Color::new(0.3, 0.0, 0.0, 0.85));
    draw_text(text, (w - dims.width) * 0.5, h * 0.5 + 2.0, size, WHITE);
}

fn draw_menu(view: &EyeView, lines: &[&str]) {
    draw_rectangle(view.x, view.y, view.w, view.h, Color::new(0.0, 0.0, 0.0, 0.55));

    let size = 20.0;
    let spacing = 30.0;
    let start_y = view.y + view.h * 0.5 - spacing * (lines.len() as f32 - 1.0) * 0.5;
    for (i, line) in lines.iter().enumerate() {
        let dims = measure_text(line, None, size as u16, 1.0);
        let x = view.x + (view.w - dims.width) * 0.5;
        draw_text(line, x, start_y + i as f32 * spacing, size, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focal_plane_has_no_parallax() {
        let p = vec2(1.5, -2.0);
        let (left, ls) = project(p, 0.0, -0.2, 8.0);
        let (right, rs) = project(p, 0.0, 0.2, 8.0);
        assert!(left.distance(p) < 1e-5);
        assert!(right.distance(p) < 1e-5);
        assert_eq!(ls, 1.0);
        assert_eq!(rs, 1.0);
    }

    #[test]
    fn test_far_objects_shift_toward_eye() {
        let p = vec2(0.0, 0.0);
        let (left, scale) = project(p, 2.0, -0.2, 8.0);
        let (right, _) = project(p, 2.0, 0.2, 8.0);
        assert!(left.x < 0.0 && right.x > 0.0);
        assert!(scale < 1.0);
    }

    #[test]
    fn test_eye_views() {
        let stereo = StereoSettings::default();
        let views = eye_views(1000.0, 500.0, &stereo);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].w, 500.0);
        assert_eq!(views[1].x, 500.0);
        assert!(views[0].eye < 0.0 && views[1].eye > 0.0);

        let mono = StereoSettings {
            enabled: false,
            ..StereoSettings::default()
        };
        let views = eye_views(1000.0, 500.0, &mono);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].eye, 0.0);
    }
}
