// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, Theme};

/// Colors for one theme, degraded to what the terminal can show.
/// `ramp` runs dim to bright and backs every fading effect (rain trails,
/// boot fade-out, particle decay).
#[derive(Clone, Debug)]
pub struct Palette {
    pub ramp: Vec<Color>,
    pub head: Option<Color>,
    pub text: Option<Color>,
    pub dim: Option<Color>,
    pub accent: Option<Color>,
    pub error: Option<Color>,
    pub bg: Option<Color>,
    mono: bool,
}

impl Palette {
    /// Trail shade for an intensity byte; 0 maps to no color at all.
    pub fn shade(&self, intensity: u8) -> Option<Color> {
        if self.mono || intensity == 0 || self.ramp.is_empty() {
            return None;
        }
        let idx = (intensity as usize * self.ramp.len()) / 256;
        self.ramp.get(idx.min(self.ramp.len() - 1)).copied()
    }

    /// Shade for a 0.0..=1.0 opacity fraction.
    pub fn level(&self, frac: f32) -> Option<Color> {
        if self.mono || self.ramp.is_empty() {
            return None;
        }
        let f = frac.clamp(0.0, 1.0);
        let idx = (f * (self.ramp.len() - 1) as f32).round() as usize;
        self.ramp.get(idx).copied()
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn to_color(mode: ColorMode, rgb: (u8, u8, u8)) -> Color {
    let (r, g, b) = rgb;
    match mode {
        ColorMode::Mono => Color::White,
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn ramp(mode: ColorMode, dark: (u8, u8, u8), bright: (u8, u8, u8), steps: usize) -> Vec<Color> {
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let rgb = (
            lerp_u8(dark.0, bright.0, t),
            lerp_u8(dark.1, bright.1, t),
            lerp_u8(dark.2, bright.2, t),
        );
        out.push(to_color(mode, rgb));
    }
    out
}

struct ThemeSpec {
    dark: (u8, u8, u8),
    bright: (u8, u8, u8),
    head: (u8, u8, u8),
    dim: (u8, u8, u8),
    accent: (u8, u8, u8),
}

fn theme_spec(theme: Theme) -> ThemeSpec {
    match theme {
        Theme::Green => ThemeSpec {
            dark: (0, 48, 16),
            bright: (0, 255, 70),
            head: (190, 255, 190),
            dim: (0, 130, 50),
            accent: (255, 255, 0),
        },
        Theme::Amber => ThemeSpec {
            dark: (56, 28, 0),
            bright: (255, 176, 0),
            head: (255, 236, 180),
            dim: (150, 96, 0),
            accent: (0, 255, 200),
        },
        Theme::Cyan => ThemeSpec {
            dark: (0, 40, 48),
            bright: (0, 230, 255),
            head: (200, 250, 255),
            dim: (0, 120, 140),
            accent: (255, 140, 255),
        },
        Theme::Violet => ThemeSpec {
            dark: (36, 16, 56),
            bright: (190, 120, 255),
            head: (240, 220, 255),
            dim: (110, 70, 150),
            accent: (120, 255, 170),
        },
    }
}

const RAMP_STEPS: usize = 8;

pub fn build_palette(theme: Theme, mode: ColorMode, default_background: bool) -> Palette {
    let spec = theme_spec(theme);
    let mono = mode == ColorMode::Mono;
    let bg = if mono || default_background {
        None
    } else {
        Some(to_color(mode, (0, 0, 0)))
    };

    let opt = |rgb| if mono { None } else { Some(to_color(mode, rgb)) };

    Palette {
        ramp: if mono {
            Vec::new()
        } else {
            ramp(mode, spec.dark, spec.bright, RAMP_STEPS)
        },
        head: opt(spec.head),
        text: opt(spec.bright),
        dim: opt(spec.dim),
        accent: opt(spec.accent),
        error: opt((255, 64, 64)),
        bg,
        mono,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_maps_intensity_across_the_ramp() {
        let p = build_palette(Theme::Green, ColorMode::TrueColor, false);
        assert_eq!(p.shade(0), None);
        assert_eq!(p.shade(255), p.ramp.last().copied());
        assert_eq!(p.shade(1), p.ramp.first().copied());
    }

    #[test]
    fn mono_palette_has_no_colors() {
        let p = build_palette(Theme::Green, ColorMode::Mono, false);
        assert_eq!(p.shade(200), None);
        assert_eq!(p.text, None);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn ansi256_degrades_primaries_into_the_cube() {
        let p = build_palette(Theme::Green, ColorMode::Color256, false);
        for c in &p.ramp {
            assert!(matches!(*c, Color::AnsiValue(_)));
        }
    }
}
