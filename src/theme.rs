//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Colours for the world and the chrome around it.
#[derive(Debug, Clone)]
pub struct Theme {
    pub pipe: Color,
    pub pipe_edge: Color,
    pub ground: Color,
    pub grass: Color,
    pub mountain: Color,
    pub mountain_shade: Color,
    pub cloud: Color,
    pub bird_body: Color,
    pub bird_outline: Color,
    pub wing: Color,
    pub wing_inner: Color,
    pub beak: Color,
    /// Panel background (start / game over / pause).
    pub bg: Color,
    /// Border.
    pub div_line: Color,
    /// Text (score, best).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Forest-green pipes, brown ground, golden bird.
    pub fn classic() -> Self {
        Self {
            pipe: Color::Rgb(0x22, 0x8B, 0x22),
            pipe_edge: Color::Rgb(0x00, 0x64, 0x00),
            ground: Color::Rgb(0x8B, 0x45, 0x13),
            grass: Color::Rgb(0x22, 0x8B, 0x22),
            mountain: Color::Rgb(0x6B, 0x8E, 0x23),
            mountain_shade: Color::Rgb(0x55, 0x6B, 0x2F),
            cloud: Color::Rgb(0xFF, 0xFF, 0xFF),
            bird_body: Color::Rgb(0xFF, 0xD7, 0x00),
            bird_outline: Color::Rgb(0xFF, 0xA5, 0x00),
            wing: Color::Rgb(0xFF, 0x8C, 0x00),
            wing_inner: Color::Rgb(0xFF, 0x63, 0x47),
            beak: Color::Rgb(0xFF, 0x45, 0x00),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic theme if path is None or the file is missing.
    /// Keys that are absent or unparsable keep their classic value.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::classic();
        Self {
            pipe: get("pipe").unwrap_or(d.pipe),
            pipe_edge: get("pipe_edge").unwrap_or(d.pipe_edge),
            ground: get("ground").unwrap_or(d.ground),
            grass: get("grass").unwrap_or(d.grass),
            mountain: get("mountain").unwrap_or(d.mountain),
            mountain_shade: get("mountain_shade").unwrap_or(d.mountain_shade),
            cloud: get("cloud").unwrap_or(d.cloud),
            bird_body: get("bird").unwrap_or(d.bird_body),
            bird_outline: get("bird_outline").unwrap_or(d.bird_outline),
            wing: get("wing").unwrap_or(d.wing),
            wing_inner: get("wing_inner").unwrap_or(d.wing_inner),
            beak: get("beak").unwrap_or(d.beak),
            bg: get("meter_bg").or_else(|| get("bg")).unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |hex: &str| {
        u8::from_str_radix(hex, 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

/// HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
pub fn hsl(h: f64, s: f64, l: f64) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// RGB components of a colour; named colours map to their usual terminal values.
pub fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Blue => (0, 0, 255),
        Color::Magenta => (255, 0, 255),
        Color::Cyan => (0, 255, 255),
        Color::Gray => (128, 128, 128),
        Color::DarkGray => (64, 64, 64),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    }
}

/// Linear mix: `t = 0` gives `a`, `t = 1` gives `b`.
pub fn mix(a: Color, b: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let (ar, ag, ab) = rgb(a);
    let (br, bg, bb) = rgb(b);
    let ch = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    Color::Rgb(ch(ar, br), ch(ag, bg), ch(ab, bb))
}
