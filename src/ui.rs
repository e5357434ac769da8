//! Layout and drawing: half-block world canvas, title bar, effect timers, panels, flash.

use crate::bird::Bird;
use crate::game::{Phase, RenderModel};
use crate::particles::{Cloud, GOLD, Mountain};
use crate::pipes::Pipe;
use crate::power_ups::{PowerUp, PowerUpKind};
use crate::theme::{Theme, mix};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Two pixels per terminal cell: fg is the upper one, bg the lower.
const HALF_BLOCK: &str = "▀";

/// Length of the milestone / shield-break flash (TachyonFX fade back to the scene).
const FLASH_MS: u32 = 350;

const PIPE_CAP_HEIGHT: f64 = 20.0;
const PIPE_CAP_OVERHANG: f64 = 5.0;
const GRASS_HEIGHT: f64 = 10.0;
const SHIELD_RING_GAP: f64 = 8.0;
/// Effect timer bars, in terminal cells.
const TIMER_BAR_CELLS: usize = 12;
/// Screen-wide tint while an effect is active.
const TINT_ALPHA: f64 = 0.1;

const SLOW_MOTION_TINT: Color = Color::Rgb(0, 150, 255);
const SLOW_MOTION_EDGE: Color = Color::Rgb(0x00, 0x88, 0xCC);
const SHIELD_EDGE: Color = Color::Rgb(0xFF, 0xA5, 0x00);
const DOUBLE_POINTS_EDGE: Color = Color::Rgb(0xFF, 0x14, 0x93);

/// World size that fills `area` (minus the border) at `world_height` world units tall.
pub fn world_size_for_area(area: Rect, world_height: f64) -> (f64, f64) {
    let cols = area.width.saturating_sub(2).max(1);
    let rows = area.height.saturating_sub(2).max(1);
    let scale = f64::from(rows) * 2.0 / world_height;
    (f64::from(cols) / scale, world_height)
}

/// Flash used for milestones and shield breaks: the scene fades in from `color`.
pub fn flash_effect(color: Color) -> Effect {
    fx::fade_from(color, color, (FLASH_MS, Interpolation::QuadOut))
}

/// Draw one frame: world, title, effect timers, phase panel, pause overlay and any running flash.
pub fn draw(
    frame: &mut Frame,
    model: &RenderModel<'_>,
    theme: &Theme,
    paused: bool,
    flash: &mut Option<Effect>,
    flash_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title_line(model), theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut canvas = Canvas::new(inner.width, inner.height, model.world.height);
    draw_world(&mut canvas, model, theme);
    canvas.blit(frame.buffer_mut(), inner);
    draw_effect_timers(frame.buffer_mut(), model, theme, inner);

    apply_flash(frame, inner, flash, flash_process_time, now);

    match model.phase {
        Phase::Start => draw_start_panel(frame, model, theme, inner),
        Phase::GameOver => draw_game_over(frame, model, theme, inner),
        Phase::Playing => {}
    }
    if paused {
        draw_pause_overlay(frame, theme, inner);
    }
}

fn title_line(model: &RenderModel<'_>) -> String {
    let mut title = format!(
        " Flying Birdie │ Score: {} │ Best: {} ",
        model.score, model.best
    );
    if model.combo >= 5 {
        title.push_str(&format!("│ Combo: {}x ", model.combo));
    }
    title
}

/// Advance the flash by the wall time since the last frame (TachyonFX).
fn apply_flash(
    frame: &mut Frame,
    area: Rect,
    flash: &mut Option<Effect>,
    flash_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let Some(effect) = flash else {
        return;
    };
    let delta = flash_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *flash_process_time = Some(now);
    frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
}

/// Pixel buffer in world space: `scale` pixels per world unit, shifted by the screen shake.
struct Canvas {
    w: usize,
    h: usize,
    px: Vec<Color>,
    scale: f64,
    shift: (f64, f64),
}

impl Canvas {
    fn new(cols: u16, rows: u16, world_height: f64) -> Self {
        let w = usize::from(cols);
        let h = usize::from(rows) * 2;
        Self {
            w,
            h,
            px: vec![Color::Black; w * h],
            scale: h as f64 / world_height,
            shift: (0.0, 0.0),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.w && y < self.h).then(|| y * self.w + x)
    }

    fn get(&self, x: usize, y: usize) -> Color {
        self.px[y * self.w + x]
    }

    fn blend(&mut self, x: i32, y: i32, c: Color, alpha: f64) {
        if let Some(i) = self.index(x, y) {
            self.px[i] = if alpha >= 1.0 {
                c
            } else {
                mix(self.px[i], c, alpha)
            };
        }
    }

    /// Pixels whose centres fall in world `[a, b)` on one axis.
    fn span(&self, a: f64, b: f64, shift: f64, limit: usize) -> std::ops::Range<i32> {
        let lo = ((a + shift) * self.scale).round().max(0.0) as i32;
        let hi = ((b + shift) * self.scale).round().min(limit as f64) as i32;
        lo..hi.max(lo)
    }

    /// World coordinates of a pixel centre.
    fn world(&self, x: i32, y: i32) -> (f64, f64) {
        (
            (f64::from(x) + 0.5) / self.scale - self.shift.0,
            (f64::from(y) + 0.5) / self.scale - self.shift.1,
        )
    }

    /// Evaluate `shade` at every pixel centre in the world box `(x0, y0)..(x1, y1)`.
    fn paint(
        &mut self,
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
        shade: impl Fn(f64, f64) -> Option<(Color, f64)>,
    ) {
        let ys = self.span(y0, y1, self.shift.1, self.h);
        let xs = self.span(x0, x1, self.shift.0, self.w);
        for py in ys {
            for px in xs.clone() {
                let (wx, wy) = self.world(px, py);
                if let Some((c, alpha)) = shade(wx, wy) {
                    self.blend(px, py, c, alpha);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, c: Color) {
        self.paint((x, y), (x + w, y + h), |_, _| Some((c, 1.0)));
    }

    /// Filled rectangle with a one-pixel border.
    fn fill_rect_outlined(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color, edge: Color) {
        let ys = self.span(y, y + h, self.shift.1, self.h);
        let xs = self.span(x, x + w, self.shift.0, self.w);
        for py in ys.clone() {
            for px in xs.clone() {
                let on_edge = px == xs.start || px == xs.end - 1 || py == ys.start || py == ys.end - 1;
                self.blend(px, py, if on_edge { edge } else { fill }, 1.0);
            }
        }
    }

    /// A disc that never vanishes: below about one pixel it becomes a single pixel.
    fn dot(&mut self, x: f64, y: f64, r: f64, c: Color, alpha: f64) {
        if r * self.scale < 0.75 {
            let px = ((x + self.shift.0) * self.scale).floor() as i32;
            let py = ((y + self.shift.1) * self.scale).floor() as i32;
            self.blend(px, py, c, alpha);
            return;
        }
        self.paint((x - r, y - r), (x + r, y + r), |wx, wy| {
            ((wx - x).hypot(wy - y) <= r).then_some((c, alpha))
        });
    }

    /// Wash the whole canvas with `c`.
    fn tint(&mut self, c: Color, alpha: f64) {
        for p in &mut self.px {
            *p = mix(*p, c, alpha);
        }
    }

    fn blit(&self, buf: &mut Buffer, area: Rect) {
        let rows = (self.h / 2).min(usize::from(area.height));
        let cols = self.w.min(usize::from(area.width));
        for row in 0..rows {
            for x in 0..cols {
                let style = Style::default()
                    .fg(self.get(x, row * 2))
                    .bg(self.get(x, row * 2 + 1));
                buf[(area.x + x as u16, area.y + row as u16)]
                    .set_symbol(HALF_BLOCK)
                    .set_style(style);
            }
        }
    }
}

fn draw_world(canvas: &mut Canvas, model: &RenderModel<'_>, theme: &Theme) {
    draw_sky(canvas, model.daylight);
    canvas.shift = model.shake;

    for cloud in model.clouds {
        draw_cloud(canvas, cloud, theme);
    }
    for mountain in model.mountains {
        draw_mountain(canvas, mountain, theme);
    }
    for pipe in model.pipes {
        draw_pipe(canvas, pipe, theme);
    }
    draw_ground(canvas, model, theme);

    for t in &model.bird.trail {
        let a = t.alpha();
        canvas.dot(t.x, t.y, 3.0 * a, theme.bird_body, a * 0.3);
    }
    draw_bird(canvas, model.bird, theme, model.effects.shield > 0.0);
    for p in model.power_ups.iter().filter(|p| !p.collected) {
        draw_power_up(canvas, p);
    }
    for p in model.particles {
        canvas.dot(p.x, p.y, p.size, p.color, p.alpha());
    }

    for kind in PowerUpKind::ALL {
        if model.effects.get(kind) > 0.0 {
            canvas.tint(tint_color(kind), TINT_ALPHA);
        }
    }
}

fn tint_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::SlowMotion => SLOW_MOTION_TINT,
        PowerUpKind::Shield | PowerUpKind::DoublePoints => kind.color(),
    }
}

/// Top and bottom sky colours. Day brightens towards noon; night brightens away from midnight.
fn sky_gradient(daylight: f64) -> (Color, Color) {
    let sun = daylight * 2.0 - 1.0;
    let ch = |base: f64, k: f64, i: f64| (base + k * i).floor().clamp(0.0, 255.0) as u8;
    if sun > 0.0 {
        let i = sun;
        (
            Color::Rgb(ch(135.0, 50.0, i), ch(206.0, 25.0, i), ch(235.0, 20.0, i)),
            Color::Rgb(ch(152.0, 50.0, i), ch(251.0, 4.0, i), ch(152.0, 50.0, i)),
        )
    } else {
        let i = -sun;
        (
            Color::Rgb(ch(25.0, 50.0, i), ch(25.0, 75.0, i), ch(112.0, 50.0, i)),
            Color::Rgb(ch(72.0, 50.0, i), ch(61.0, 75.0, i), ch(139.0, 50.0, i)),
        )
    }
}

fn draw_sky(canvas: &mut Canvas, daylight: f64) {
    let (top, bottom) = sky_gradient(daylight);
    let last = canvas.h.saturating_sub(1).max(1) as f64;
    for y in 0..canvas.h {
        let c = mix(top, bottom, y as f64 / last);
        canvas.px[y * canvas.w..(y + 1) * canvas.w].fill(c);
    }
}

fn draw_cloud(canvas: &mut Canvas, cloud: &Cloud, theme: &Theme) {
    let (x, y, w) = (cloud.x, cloud.y, cloud.width);
    let puffs = [(x, y, w / 3.0), (x + w / 3.0, y, w / 4.0), (x + w / 2.0, y, w / 3.0)];
    // Flat underside.
    let base = y + cloud.height / 2.0;
    canvas.paint((x - w / 3.0, y - w / 3.0), (x + w * 5.0 / 6.0, base), |wx, wy| {
        puffs
            .iter()
            .any(|&(cx, cy, r)| (wx - cx).hypot(wy - cy) <= r)
            .then_some((theme.cloud, 0.8))
    });
}

/// Piecewise-linear interpolation through `points` (sorted by x).
fn ridge(points: &[(f64, f64)], x: f64) -> f64 {
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
        }
    }
    points.last().map_or(0.0, |p| p.1)
}

fn draw_mountain(canvas: &mut Canvas, m: &Mountain, theme: &Theme) {
    let (w, h) = (m.width, m.height);
    let profile = [
        (0.0, h),
        (w / 4.0, 0.0),
        (w / 2.0, h / 2.0),
        (w * 3.0 / 4.0, h / 4.0),
        (w, h),
    ];
    canvas.paint((m.x, m.y), (m.x + w, m.y + h), |wx, wy| {
        let (lx, ly) = (wx - m.x, wy - m.y);
        if ly < ridge(&profile, lx) {
            return None;
        }
        let shaded = (w / 4.0..=w / 2.0).contains(&lx) && ly <= h / 2.0;
        Some((if shaded { theme.mountain_shade } else { theme.mountain }, 1.0))
    });
}

fn draw_pipe(canvas: &mut Canvas, pipe: &Pipe, theme: &Theme) {
    let (fill, edge) = (theme.pipe, theme.pipe_edge);
    canvas.fill_rect_outlined(pipe.x, 0.0, pipe.width, pipe.top_height, fill, edge);
    canvas.fill_rect_outlined(pipe.x, pipe.bottom_y, pipe.width, pipe.bottom_height, fill, edge);

    let cap_x = pipe.x - PIPE_CAP_OVERHANG;
    let cap_w = pipe.width + PIPE_CAP_OVERHANG * 2.0;
    canvas.fill_rect_outlined(
        cap_x,
        pipe.top_height - PIPE_CAP_HEIGHT,
        cap_w,
        PIPE_CAP_HEIGHT,
        fill,
        edge,
    );
    canvas.fill_rect_outlined(cap_x, pipe.bottom_y, cap_w, PIPE_CAP_HEIGHT, fill, edge);
}

fn draw_ground(canvas: &mut Canvas, model: &RenderModel<'_>, theme: &Theme) {
    let ground_y = model.world.ground_y();
    // Overdraw by the shake range so the edges never show sky.
    let (x0, x1) = (-20.0, model.world.width + 20.0);
    canvas.fill_rect(x0, ground_y, x1 - x0, model.world.height - ground_y + 20.0, theme.ground);
    canvas.fill_rect(x0, ground_y, x1 - x0, GRASS_HEIGHT, theme.grass);
}

fn inside_ellipse(x: f64, y: f64, (cx, cy): (f64, f64), (rx, ry): (f64, f64)) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let (dx, dy) = ((x - cx) / rx, (y - cy) / ry);
    dx * dx + dy * dy <= 1.0
}

/// Colour of the bird at body-local `(x, y)` (unrotated, origin at the centre). Topmost layer wins.
fn bird_pixel(
    x: f64,
    y: f64,
    (rx, ry): (f64, f64),
    wing: f64,
    shield: bool,
    theme: &Theme,
) -> Option<(Color, f64)> {
    if (12.0..=18.0).contains(&x) && y.abs() <= (x - 12.0) / 3.0 {
        return Some((theme.beak, 1.0));
    }
    if inside_ellipse(x, y, (4.0, -5.0), (2.0, 2.0)) {
        return Some((Color::Black, 1.0));
    }
    if inside_ellipse(x, y, (3.0, -5.0), (4.0, 4.0)) {
        return Some((Color::White, 1.0));
    }
    let inner = wing * 0.5;
    if inside_ellipse(x, y, (-3.0, inner), (6.0, 8.0 - inner.abs())) {
        return Some((theme.wing_inner, 1.0));
    }
    if inside_ellipse(x, y, (-5.0, wing), (8.0, 12.0 - wing.abs())) {
        return Some((theme.wing, 1.0));
    }
    let r = ((x / rx).powi(2) + (y / ry).powi(2)).sqrt();
    if r <= 1.0 {
        let c = if r > 0.85 { theme.bird_outline } else { theme.bird_body };
        return Some((c, 1.0));
    }
    if shield && (x.hypot(y) - (rx + SHIELD_RING_GAP)).abs() <= 1.5 {
        return Some((GOLD, 0.7));
    }
    None
}

fn draw_bird(canvas: &mut Canvas, bird: &Bird, theme: &Theme, shield: bool) {
    let (cx, cy) = bird.center();
    let (sin, cos) = bird.rotation.to_radians().sin_cos();
    let radii = (bird.width / 2.0, bird.height / 2.0);
    let wing = bird.wing_phase.sin() * 3.0;
    let reach = radii.0.max(radii.1) + SHIELD_RING_GAP + 4.0;
    canvas.paint((cx - reach, cy - reach), (cx + reach, cy + reach), |wx, wy| {
        let (dx, dy) = (wx - cx, wy - cy);
        let lx = dx * cos + dy * sin;
        let ly = -dx * sin + dy * cos;
        bird_pixel(lx, ly, radii, wing, shield, theme)
    });
}

/// Colour of a pickup icon at icon-local `(x, y)`, origin at its centre.
fn power_up_pixel(kind: PowerUpKind, x: f64, y: f64, size: f64) -> Option<(Color, f64)> {
    let half = size / 2.0;
    let d = x.hypot(y);
    let fill = kind.color();
    let c = match kind {
        PowerUpKind::SlowMotion => {
            if d > half {
                return None;
            }
            let hand = (x.abs() <= 1.0 && (-size / 3.0..=0.0).contains(&y))
                || (y.abs() <= 1.0 && (0.0..=size / 4.0).contains(&x));
            if hand {
                Color::White
            } else if d > half - 2.0 {
                SLOW_MOTION_EDGE
            } else {
                fill
            }
        }
        PowerUpKind::Shield => {
            let limit = half - 0.75 * x.abs();
            if x.abs() > size / 3.0 || y.abs() > limit {
                return None;
            }
            if x.abs() > size / 3.0 - 2.0 || y.abs() > limit - 2.0 {
                SHIELD_EDGE
            } else {
                fill
            }
        }
        PowerUpKind::DoublePoints => {
            if d > half {
                return None;
            }
            if d > half - 2.0 {
                DOUBLE_POINTS_EDGE
            } else if d < 3.0 {
                Color::White
            } else {
                fill
            }
        }
    };
    Some((c, 1.0))
}

fn draw_power_up(canvas: &mut Canvas, p: &PowerUp) {
    let scale = 1.0 + p.pulse.sin() * 0.1;
    let (cx, cy) = (p.x + p.width / 2.0, p.y + p.height / 2.0);
    let reach = p.width / 2.0 * scale + 1.0;
    canvas.paint((cx - reach, cy - reach), (cx + reach, cy + reach), |wx, wy| {
        power_up_pixel(p.kind, (wx - cx) / scale, (wy - cy) / scale, p.width)
    });
}

/// One row per active effect in the top-left corner: label and a draining bar.
fn draw_effect_timers(buf: &mut Buffer, model: &RenderModel<'_>, theme: &Theme, area: Rect) {
    let mut row = area.y;
    for kind in PowerUpKind::ALL {
        let fraction = model.effects.get(kind);
        if fraction <= 0.0 || row >= area.y + area.height {
            continue;
        }
        let filled = ((fraction * TIMER_BAR_CELLS as f64).ceil() as usize).min(TIMER_BAR_CELLS);
        let text = format!(
            " {:<8}{}{} ",
            kind.label(),
            "█".repeat(filled),
            "░".repeat(TIMER_BAR_CELLS - filled)
        );
        buf.set_string(area.x, row, text, Style::default().fg(kind.color()).bg(theme.bg));
        row += 1;
    }
}

/// `w`×`h` rect centred in `area`, clipped to it.
fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_panel(frame: &mut Frame, theme: &Theme, area: Rect, width: u16, lines: Vec<Line<'_>>) {
    let popup = centered(area, width, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Flying Birdie ", theme.title)),
        );
    p.render(popup, frame.buffer_mut());
}

fn draw_start_panel(frame: &mut Frame, model: &RenderModel<'_>, theme: &Theme, area: Rect) {
    let text = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Get ready! ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Space / Up / k   Flap ", text)),
        Line::from(Span::styled(" Enter            Start ", text)),
        Line::from(Span::styled(" P  Pause    Q  Quit ", text)),
        Line::from(""),
        Line::from(Span::styled(format!(" Best: {} ", model.best), text)),
    ];
    draw_panel(frame, theme, area, 34, lines);
}

fn draw_game_over(frame: &mut Frame, model: &RenderModel<'_>, theme: &Theme, area: Rect) {
    let text = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", model.score), text)),
        Line::from(Span::styled(format!(" Best: {} ", model.best), text)),
        Line::from(Span::styled(format!(" Max combo: {} ", model.max_combo), text)),
    ];
    if model.new_best {
        lines.push(Line::from(Span::styled(
            " New high score! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Enter / R  Restart    Q  Quit ", text)));
    draw_panel(frame, theme, area, 36, lines);
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P  Resume    Q  Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_panel(frame, theme, area, 28, lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_world_size_follows_terminal_aspect() {
        // 80x32 terminal: 78 columns, 30 rows = 60 pixel rows for 600 units.
        let (w, h) = world_size_for_area(Rect::new(0, 0, 80, 32), 600.0);
        assert_eq!(h, 600.0);
        assert!((w - 780.0).abs() < 1e-9);
    }

    #[test]
    fn test_sky_noon_and_midnight() {
        assert_eq!(
            sky_gradient(1.0),
            (Color::Rgb(185, 231, 255), Color::Rgb(202, 255, 202))
        );
        assert_eq!(
            sky_gradient(0.0),
            (Color::Rgb(75, 100, 162), Color::Rgb(122, 136, 189))
        );
    }

    #[test]
    fn test_ridge_interpolates() {
        let points = [(0.0, 100.0), (100.0, 0.0), (200.0, 50.0)];
        assert_eq!(ridge(&points, 0.0), 100.0);
        assert_eq!(ridge(&points, 50.0), 50.0);
        assert_eq!(ridge(&points, 150.0), 25.0);
        assert_eq!(ridge(&points, 300.0), 50.0);
    }

    #[test]
    fn test_bird_layers() {
        let theme = Theme::classic();
        let r = (15.0, 15.0);
        assert_eq!(bird_pixel(16.0, 0.0, r, 0.0, false, &theme), Some((theme.beak, 1.0)));
        assert_eq!(bird_pixel(4.0, -5.0, r, 0.0, false, &theme), Some((Color::Black, 1.0)));
        assert_eq!(bird_pixel(0.0, 14.0, r, 0.0, false, &theme), Some((theme.bird_outline, 1.0)));
        assert_eq!(bird_pixel(23.0, 0.0, r, 0.0, false, &theme), None);
        assert_eq!(bird_pixel(23.0, 0.0, r, 0.0, true, &theme), Some((GOLD, 0.7)));
    }

    #[test]
    fn test_power_up_icons_stay_inside_their_box() {
        for kind in PowerUpKind::ALL {
            assert!(power_up_pixel(kind, 0.0, 0.0, 20.0).is_some());
            assert!(power_up_pixel(kind, 11.0, 11.0, 20.0).is_none());
        }
    }

    #[test]
    fn test_blit_packs_two_pixels_per_cell() {
        let mut canvas = Canvas::new(2, 1, 2.0);
        canvas.blend(0, 0, Color::Red, 1.0);
        canvas.blend(0, 1, Color::Blue, 1.0);
        canvas.blend(5, 5, Color::Green, 1.0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        canvas.blit(&mut buf, Rect::new(0, 0, 2, 1));
        assert_eq!(buf[(0, 0)].symbol(), HALF_BLOCK);
        assert_eq!(buf[(0, 0)].fg, Color::Red);
        assert_eq!(buf[(0, 0)].bg, Color::Blue);
        assert_eq!(buf[(1, 0)].fg, Color::Black);
    }

    #[test]
    fn test_title_shows_combo_from_five() {
        let mut game = Game::with_rng(Default::default(), 9, StdRng::seed_from_u64(1), false);
        let title = title_line(&game.render_model());
        assert!(title.contains("Best: 9"));
        assert!(!title.contains("Combo"));
        game.request_start();
        game.step();
        let mut model = game.render_model();
        model.combo = 5;
        assert!(title_line(&model).contains("Combo: 5x"));
    }

    #[test]
    fn test_draw_every_phase() {
        let theme = Theme::classic();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let (w, h) = world_size_for_area(Rect::new(0, 0, 60, 20), 600.0);
        let mut game = Game::with_rng(crate::game::World::new(w, h), 0, StdRng::seed_from_u64(2), false);
        let mut flash = Some(flash_effect(Color::White));
        let mut flash_time = None;

        let mut render = |game: &Game, paused: bool| {
            terminal
                .draw(|f| {
                    draw(f, &game.render_model(), &theme, paused, &mut flash, &mut flash_time, Instant::now());
                })
                .unwrap();
            terminal.backend().buffer().clone()
        };

        let start = render(&game, false);
        assert_eq!(start[(1, 1)].symbol(), HALF_BLOCK);

        game.request_start();
        for _ in 0..5 {
            game.step();
        }
        render(&game, true);

        while game.phase() == Phase::Playing {
            game.step();
        }
        let over = render(&game, false);
        let text: String = over.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Game Over"));
    }
}
