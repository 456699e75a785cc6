// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::Palette;

pub const BOOT_MESSAGES: &[&str] = &[
    "Initializing system...",
    "Loading portfolio modules...",
    "Connecting to neural network...",
    "Establishing secure connection...",
    "Loading user interface...",
    "System ready.",
];

const MARKER: &str = "> ";
const STEP: Duration = Duration::from_millis(800);
const HOLD: Duration = Duration::from_millis(1000);
const FADE: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Revealing,
    Holding,
    Fading,
    Done,
}

/// One-shot startup overlay: reveal the script one line per step, hold,
/// fade out, gone. No cancellation, no replay; `next_at` is the single
/// pending deadline driving every transition.
pub struct Boot {
    phase: Phase,
    shown: usize,
    next_at: Option<Instant>,
}

impl Boot {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            shown: 0,
            next_at: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Idle {
            return;
        }
        if BOOT_MESSAGES.is_empty() {
            self.phase = Phase::Holding;
            self.next_at = Some(now + HOLD);
            return;
        }
        self.shown = 1;
        self.phase = Phase::Revealing;
        self.next_at = Some(now + STEP);
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    #[allow(dead_code)]
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn update(&mut self, now: Instant) {
        loop {
            let Some(at) = self.next_at else {
                return;
            };
            if now < at {
                return;
            }
            match self.phase {
                Phase::Idle | Phase::Done => return,
                Phase::Revealing => {
                    self.shown += 1;
                    if self.shown >= BOOT_MESSAGES.len() {
                        self.shown = BOOT_MESSAGES.len();
                        self.phase = Phase::Holding;
                        self.next_at = Some(at + HOLD);
                    } else {
                        self.next_at = Some(at + STEP);
                    }
                }
                Phase::Holding => {
                    self.phase = Phase::Fading;
                    self.next_at = Some(at + FADE);
                }
                Phase::Fading => {
                    self.phase = Phase::Done;
                    self.next_at = None;
                }
            }
        }
    }

    /// Remaining overlay opacity: 1.0 until the fade starts, then down
    /// to 0.0 at teardown.
    pub fn fade_frac(&self, now: Instant) -> f32 {
        match self.phase {
            Phase::Fading => {
                let Some(at) = self.next_at else {
                    return 0.0;
                };
                (at.saturating_duration_since(now).as_secs_f32() / FADE.as_secs_f32())
                    .clamp(0.0, 1.0)
            }
            Phase::Done => 0.0,
            _ => 1.0,
        }
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette, now: Instant) {
        frame.fill_rect(0, 0, frame.width, frame.height, Cell::blank_with_bg(palette.bg));
        if self.shown == 0 {
            return;
        }
        let fg = palette.level(self.fade_frac(now));

        let lines = &BOOT_MESSAGES[..self.shown.min(BOOT_MESSAGES.len())];
        let block_w = lines
            .iter()
            .map(|m| m.chars().count() + MARKER.len())
            .max()
            .unwrap_or(0) as u16;
        let x = (frame.width.saturating_sub(block_w)) / 2;
        let top = (frame.height.saturating_sub(lines.len() as u16)) / 2;

        for (i, msg) in lines.iter().enumerate() {
            let y = top + i as u16;
            frame.put_str(x, y, MARKER, fg, false);
            frame.put_str(x + MARKER.len() as u16, y, msg, fg, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn reveals_one_message_per_step() {
        let mut boot = Boot::new();
        let t0 = Instant::now();
        boot.start(t0);
        assert_eq!(boot.shown(), 1);

        boot.update(t0 + ms(799));
        assert_eq!(boot.shown(), 1);
        boot.update(t0 + ms(800));
        assert_eq!(boot.shown(), 2);
        boot.update(t0 + ms(800) * (BOOT_MESSAGES.len() as u32 - 1));
        assert_eq!(boot.shown(), BOOT_MESSAGES.len());
    }

    #[test]
    fn holds_then_fades_then_finishes() {
        let mut boot = Boot::new();
        let t0 = Instant::now();
        boot.start(t0);

        let reveal_end = t0 + ms(800) * (BOOT_MESSAGES.len() as u32 - 1);
        boot.update(reveal_end);
        assert!(!boot.is_done());
        assert!((boot.fade_frac(reveal_end) - 1.0).abs() < f32::EPSILON);

        // Still holding just before the fade begins.
        boot.update(reveal_end + ms(999));
        assert!((boot.fade_frac(reveal_end + ms(999)) - 1.0).abs() < f32::EPSILON);

        // Mid-fade opacity is partial.
        let mid_fade = reveal_end + ms(1500);
        boot.update(mid_fade);
        let f = boot.fade_frac(mid_fade);
        assert!(f > 0.0 && f < 1.0);
        assert!(!boot.is_done());

        boot.update(reveal_end + ms(2000));
        assert!(boot.is_done());
        assert_eq!(boot.fade_frac(reveal_end + ms(2000)), 0.0);
    }

    #[test]
    fn a_far_jump_cascades_through_every_phase() {
        let mut boot = Boot::new();
        let t0 = Instant::now();
        boot.start(t0);
        boot.update(t0 + ms(60_000));
        assert!(boot.is_done());
        assert_eq!(boot.shown(), BOOT_MESSAGES.len());
    }

    #[test]
    fn start_is_one_shot() {
        let mut boot = Boot::new();
        let t0 = Instant::now();
        boot.start(t0);
        boot.update(t0 + ms(60_000));
        boot.start(t0 + ms(60_000));
        assert!(boot.is_done());
    }
}
