// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::page::ElementId;

/// How long one trigger keeps the distortion on screen.
pub const GLITCH_WINDOW: Duration = Duration::from_millis(2000);

const GLITCH_GLYPHS: &[u8] = b"#$%&@*+=?!<>/\\|^~";
const SUBSTITUTE_CHANCE: f32 = 0.2;

/// Timed distortion applied to registered banner elements. One trigger
/// arms a single teardown deadline; triggers while active are ignored.
pub struct GlitchEffect {
    elements: Vec<(ElementId, String)>,
    active: bool,
    clear_at: Option<Instant>,
    rng: StdRng,
    rand_chance: Uniform<f32>,
    rand_glyph: Uniform<usize>,
    rand_jitter: Uniform<i16>,
}

impl GlitchEffect {
    pub fn new(seed: u64) -> Self {
        Self {
            elements: Vec::new(),
            active: false,
            clear_at: None,
            rng: StdRng::seed_from_u64(seed),
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
            rand_glyph: Uniform::new(0, GLITCH_GLYPHS.len()).expect("valid range"),
            rand_jitter: Uniform::new_inclusive(-2, 2).expect("valid range"),
        }
    }

    /// Captures an element's text. Registering the same element again
    /// keeps the text recorded the first time.
    pub fn register(&mut self, id: ElementId, text: &str) {
        if self.elements.iter().any(|(eid, _)| *eid == id) {
            return;
        }
        self.elements.push((id, text.to_string()));
    }

    pub fn original_text(&self, id: ElementId) -> Option<&str> {
        self.elements
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, t)| t.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn clear_at(&self) -> Option<Instant> {
        self.clear_at
    }

    /// Arms the distortion window. Returns false while a window is
    /// already running; the first trigger's deadline governs.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.clear_at = Some(now + GLITCH_WINDOW);
        true
    }

    pub fn update(&mut self, now: Instant) {
        if let Some(at) = self.clear_at {
            if now >= at {
                self.active = false;
                self.clear_at = None;
            }
        }
    }

    /// Distorted rendition of a registered element's text for this frame:
    /// the text with random glyph substitutions plus a horizontal jitter.
    /// Meaningless while inactive; callers draw the original then.
    pub fn scrambled(&mut self, id: ElementId) -> Option<(String, i16)> {
        let text = self
            .elements
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, t)| t.clone())?;
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch != ' ' && self.rand_chance.sample(&mut self.rng) < SUBSTITUTE_CHANCE {
                out.push(GLITCH_GLYPHS[self.rand_glyph.sample(&mut self.rng)] as char);
            } else {
                out.push(ch);
            }
        }
        let jitter = self.rand_jitter.sample(&mut self.rng);
        Some((out, jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn trigger_during_window_keeps_the_original_deadline() {
        let mut g = GlitchEffect::new(1);
        let t0 = Instant::now();
        assert!(g.trigger(t0));
        let first = g.clear_at().unwrap();

        assert!(!g.trigger(t0 + ms(500)));
        assert_eq!(g.clear_at().unwrap(), first);

        g.update(t0 + ms(1999));
        assert!(g.is_active());
        g.update(t0 + ms(2000));
        assert!(!g.is_active());
    }

    #[test]
    fn can_retrigger_after_teardown() {
        let mut g = GlitchEffect::new(1);
        let t0 = Instant::now();
        g.trigger(t0);
        g.update(t0 + ms(2500));
        assert!(g.trigger(t0 + ms(2500)));
    }

    #[test]
    fn register_does_not_overwrite_recorded_text() {
        let mut g = GlitchEffect::new(1);
        let id = ElementId(3);
        g.register(id, "REZKY");
        g.register(id, "#E$KY");
        assert_eq!(g.original_text(id), Some("REZKY"));
    }

    #[test]
    fn scrambled_preserves_length_and_spaces() {
        let mut g = GlitchEffect::new(1);
        let id = ElementId(0);
        g.register(id, "A B C");
        g.trigger(Instant::now());
        let (s, jitter) = g.scrambled(id).unwrap();
        assert_eq!(s.chars().count(), 5);
        assert_eq!(s.chars().nth(1), Some(' '));
        assert!((-2..=2).contains(&jitter));
    }
}
