// Copyright (c) 2026 rezky_nightky

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::page::{ElementId, Rect};
use crate::palette::Palette;

pub const EXPLOSION_COUNT: usize = 8;
pub const EXPLOSION_RADIUS: f32 = 50.0;
const EXPLOSION_TTL: Duration = Duration::from_millis(500);

const SPARKLE_COUNT: usize = 5;
const SPARKLE_TTL: Duration = Duration::from_millis(500);
const SPARKLE_GLYPHS: [char; 3] = ['.', '+', '*'];

const GLOW_TTL: Duration = Duration::from_millis(300);
const RIPPLE_TTL: Duration = Duration::from_millis(600);

pub const TYPE_TICK: Duration = Duration::from_millis(100);

const SCAN_ROW_MS: u64 = 120;

/// A short-lived point marker. Sparkles stay where they spawned and only
/// grow; burst particles travel outward along `angle` to `radius`.
#[derive(Clone, Debug)]
pub struct Point {
    pub origin: (f32, f32),
    pub angle: f32,
    pub radius: f32,
    born: Instant,
    ttl: Duration,
    travels: bool,
}

impl Point {
    pub fn age_frac(&self, now: Instant) -> f32 {
        let age = now.saturating_duration_since(self.born).as_secs_f32();
        (age / self.ttl.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn pos(&self, now: Instant) -> (f32, f32) {
        if !self.travels {
            return self.origin;
        }
        let t = self.age_frac(now);
        (
            self.origin.0 + self.angle.cos() * self.radius * t,
            self.origin.1 + self.angle.sin() * self.radius * t,
        )
    }

    #[allow(dead_code)]
    pub fn target(&self) -> (f32, f32) {
        (
            self.origin.0 + self.angle.cos() * self.radius,
            self.origin.1 + self.angle.sin() * self.radius,
        )
    }

    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.born) >= self.ttl
    }
}

struct Glow {
    id: ElementId,
    until: Instant,
}

struct Ripple {
    rect: Rect,
    born: Instant,
}

struct ScanLine {
    rect: Rect,
    born: Instant,
}

struct Typer {
    id: ElementId,
    text: String,
    shown: usize,
    next_at: Instant,
    done: bool,
}

/// Pointer-driven decoration: sparkles, glows, ripples, click bursts,
/// the profile scan line, and the typewriter reveal. Everything here is
/// deadline-driven and self-removing.
pub struct Particles {
    points: Vec<Point>,
    glows: Vec<Glow>,
    ripples: Vec<Ripple>,
    scan: Option<ScanLine>,
    typers: Vec<Typer>,
    rng: StdRng,
    rand_frac: Uniform<f32>,
}

impl Particles {
    pub fn new(seed: u64) -> Self {
        Self {
            points: Vec::new(),
            glows: Vec::new(),
            ripples: Vec::new(),
            scan: None,
            typers: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            rand_frac: Uniform::new(0.0, 1.0).expect("valid range"),
        }
    }

    #[allow(dead_code)]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Sparkle burst inside a chip's bounds on pointer enter.
    pub fn sparkle_burst(&mut self, rect: Rect, now: Instant) {
        for _ in 0..SPARKLE_COUNT {
            let dx = self.rand_frac.sample(&mut self.rng) * rect.w.max(1) as f32;
            let dy = self.rand_frac.sample(&mut self.rng) * rect.h.max(1) as f32;
            self.points.push(Point {
                origin: (rect.x as f32 + dx, rect.y as f32 + dy),
                angle: 0.0,
                radius: 0.0,
                born: now,
                ttl: SPARKLE_TTL,
                travels: false,
            });
        }
    }

    /// Eight particles at equal angular spacing, flying out to a fixed
    /// radius from the click point.
    pub fn explode(&mut self, x: f32, y: f32, now: Instant) {
        for i in 0..EXPLOSION_COUNT {
            let angle = (i as f32 / EXPLOSION_COUNT as f32) * TAU;
            self.points.push(Point {
                origin: (x, y),
                angle,
                radius: EXPLOSION_RADIUS,
                born: now,
                ttl: EXPLOSION_TTL,
                travels: true,
            });
        }
    }

    /// Panel glow on pointer enter. Entering again while lit keeps the
    /// first deadline.
    pub fn glow(&mut self, id: ElementId, now: Instant) {
        if self.is_glowing(id, now) {
            return;
        }
        self.glows.push(Glow {
            id,
            until: now + GLOW_TTL,
        });
    }

    pub fn is_glowing(&self, id: ElementId, now: Instant) -> bool {
        self.glows.iter().any(|g| g.id == id && g.until > now)
    }

    /// Radial overlay on a link's bounds on pointer enter.
    pub fn ripple(&mut self, rect: Rect, now: Instant) {
        self.ripples.push(Ripple { rect, born: now });
    }

    /// One-shot: the scan line is attached to the profile frame at init
    /// and sweeps it for the rest of the run.
    pub fn attach_scan_line(&mut self, rect: Rect, now: Instant) {
        if self.scan.is_none() {
            self.scan = Some(ScanLine { rect, born: now });
        }
    }

    pub fn rebind_scan_line(&mut self, rect: Rect) {
        if let Some(scan) = &mut self.scan {
            scan.rect = rect;
        }
    }

    /// Starts replaying an element's text one character per tick. A
    /// second request while the same element is still replaying is
    /// ignored; once finished it may be replayed.
    pub fn start_typing(&mut self, id: ElementId, text: &str, now: Instant) {
        if self.typers.iter().any(|t| t.id == id && !t.done) {
            return;
        }
        self.typers.retain(|t| t.id != id);
        self.typers.push(Typer {
            id,
            text: text.to_string(),
            shown: 0,
            next_at: now + TYPE_TICK,
            done: text.is_empty(),
        });
    }

    /// The currently revealed prefix, or None if the element has no
    /// typewriter attached (callers then draw the full label).
    pub fn typed_text(&self, id: ElementId) -> Option<&str> {
        let t = self.typers.iter().find(|t| t.id == id)?;
        if t.done {
            return Some(&t.text);
        }
        let end = t
            .text
            .char_indices()
            .nth(t.shown)
            .map(|(i, _)| i)
            .unwrap_or(t.text.len());
        Some(&t.text[..end])
    }

    pub fn update(&mut self, now: Instant) {
        self.points.retain(|p| !p.expired(now));
        self.glows.retain(|g| g.until > now);
        self.ripples
            .retain(|r| now.saturating_duration_since(r.born) < RIPPLE_TTL);

        for t in &mut self.typers {
            if t.done {
                continue;
            }
            let total = t.text.chars().count();
            while now >= t.next_at && t.shown < total {
                t.shown += 1;
                t.next_at += TYPE_TICK;
            }
            if t.shown >= total {
                t.done = true;
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette, now: Instant) {
        for r in &self.ripples {
            draw_ripple(frame, palette, r, now);
        }
        if let Some(scan) = &self.scan {
            draw_scan_line(frame, palette, scan, now);
        }
        for p in &self.points {
            let t = p.age_frac(now);
            let (px, py) = p.pos(now);
            if px < 0.0 || py < 0.0 {
                continue;
            }
            let (x, y) = (px.round() as u16, py.round() as u16);
            if x >= frame.width || y >= frame.height {
                continue;
            }
            let ch = if p.travels {
                '*'
            } else {
                // Scale 1 -> 2 over the sparkle's life.
                let idx = (t * SPARKLE_GLYPHS.len() as f32) as usize;
                SPARKLE_GLYPHS[idx.min(SPARKLE_GLYPHS.len() - 1)]
            };
            frame.set(x, y, Cell::glyph(ch, palette.level(1.0 - t)));
        }
    }
}

fn draw_ripple(frame: &mut Frame, palette: &Palette, r: &Ripple, now: Instant) {
    let age = now.saturating_duration_since(r.born).as_secs_f32();
    let t = (age / RIPPLE_TTL.as_secs_f32()).clamp(0.0, 1.0);
    // Fade in then out while the ring expands.
    let alpha = 1.0 - (2.0 * t - 1.0).abs();
    let (cx, cy) = r.rect.center();
    let max_r = (r.rect.w.max(r.rect.h) as f32) / 2.0;
    let ring = t * max_r;
    let fg = palette.level(alpha);

    for yy in r.rect.y..r.rect.y.saturating_add(r.rect.h) {
        for xx in r.rect.x..r.rect.x.saturating_add(r.rect.w) {
            let dx = xx as f32 + 0.5 - cx;
            // Terminal cells are about twice as tall as wide.
            let dy = (yy as f32 + 0.5 - cy) * 2.0;
            let dist = (dx * dx + dy * dy).sqrt();
            if (dist - ring).abs() <= 0.9 {
                frame.set(xx, yy, Cell::glyph('~', fg));
            }
        }
    }
}

fn draw_scan_line(frame: &mut Frame, palette: &Palette, scan: &ScanLine, now: Instant) {
    if scan.rect.h <= 2 || scan.rect.w <= 2 {
        return;
    }
    let inner_h = (scan.rect.h - 2) as u64;
    let step = now.saturating_duration_since(scan.born).as_millis() as u64 / SCAN_ROW_MS;
    let row = scan.rect.y + 1 + (step % inner_h) as u16;
    for xx in scan.rect.x + 1..scan.rect.x + scan.rect.w - 1 {
        frame.set(xx, row, Cell::glyph('-', palette.head));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn explosion_spawns_eight_points_at_even_angles_and_fixed_radius() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        p.explode(10.0, 5.0, now);

        assert_eq!(p.points().len(), EXPLOSION_COUNT);
        for (i, pt) in p.points().iter().enumerate() {
            let expect = (i as f32 / EXPLOSION_COUNT as f32) * TAU;
            assert!((pt.angle - expect).abs() < 1e-6);
            let (tx, ty) = pt.target();
            let dx = tx - 10.0;
            let dy = ty - 5.0;
            let dist = (dx * dx + dy * dy).sqrt();
            assert!((dist - EXPLOSION_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn points_expire_after_their_lifetime() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        p.explode(0.0, 0.0, now);
        p.sparkle_burst(Rect::new(0, 0, 4, 2), now);
        assert_eq!(p.points().len(), EXPLOSION_COUNT + SPARKLE_COUNT);

        p.update(now + ms(499));
        assert_eq!(p.points().len(), EXPLOSION_COUNT + SPARKLE_COUNT);
        p.update(now + ms(500));
        assert!(p.points().is_empty());
    }

    #[test]
    fn sparkles_spawn_inside_the_element_bounds() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        let rect = Rect::new(4, 2, 10, 3);
        p.sparkle_burst(rect, now);
        for pt in p.points() {
            assert!(pt.origin.0 >= 4.0 && pt.origin.0 <= 14.0);
            assert!(pt.origin.1 >= 2.0 && pt.origin.1 <= 5.0);
        }
    }

    #[test]
    fn glow_keeps_the_first_deadline_and_expires() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        let id = ElementId(2);
        p.glow(id, now);
        p.glow(id, now + ms(200));
        p.update(now + ms(299));
        assert!(p.is_glowing(id, now + ms(299)));
        p.update(now + ms(300));
        assert!(!p.is_glowing(id, now + ms(300)));
    }

    #[test]
    fn typewriter_reveals_one_char_per_tick_and_never_overruns() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        let id = ElementId(7);
        p.start_typing(id, "root", now);
        assert_eq!(p.typed_text(id), Some(""));

        let expect = ["r", "ro", "roo", "root"];
        for (i, want) in expect.iter().enumerate() {
            p.update(now + TYPE_TICK * (i as u32 + 1));
            assert_eq!(p.typed_text(id), Some(*want));
        }

        // Extra ticks never extend past the original text.
        p.update(now + TYPE_TICK * 20);
        assert_eq!(p.typed_text(id), Some("root"));
    }

    #[test]
    fn typing_does_not_restart_while_running() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        let id = ElementId(7);
        p.start_typing(id, "root", now);
        p.update(now + TYPE_TICK * 2);
        p.start_typing(id, "root", now + TYPE_TICK * 2);
        assert_eq!(p.typed_text(id), Some("ro"));
    }

    #[test]
    fn scan_line_attaches_only_once() {
        let mut p = Particles::new(1);
        let now = Instant::now();
        p.attach_scan_line(Rect::new(0, 0, 10, 6), now);
        p.attach_scan_line(Rect::new(5, 5, 4, 4), now);
        assert!(p.scan.as_ref().is_some_and(|s| s.rect.w == 10));
    }
}
