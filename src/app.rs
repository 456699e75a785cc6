// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

use crate::boot::Boot;
use crate::cell::Cell;
use crate::command::CommandLine;
use crate::frame::Frame;
use crate::glitch::GlitchEffect;
use crate::page::{ElementId, ElementKind, Page, ROLE, ROLE_ID, SUBTITLE, SUBTITLE_ID, TITLE, TITLE_ID};
use crate::palette::Palette;
use crate::particles::Particles;
use crate::rain::Rain;
use crate::shortcuts::{ShortcutAction, ShortcutRouter, DIAGNOSTIC_BANNER};

/// Rain auto-starts this long after the boot sequence tears down.
const RAIN_AUTOSTART_DELAY: Duration = Duration::from_millis(2000);
const WELCOME_DELAY: Duration = Duration::from_millis(3000);

const WELCOME_BANNER: &[&str] = &[
    ">> Welcome to Rezky's portfolio!",
    "Press H for keyboard shortcuts",
];

enum Phase {
    Boot,
    Page(Page),
}

/// The whole application state, built once at startup and threaded
/// through the event loop; nothing here is global. Startup order: boot
/// overlay runs to full teardown, then the page is laid out and every
/// component registered, then the rain auto-starts on its own deadline.
pub struct App {
    width: u16,
    height: u16,
    pub palette: Palette,
    phase: Phase,
    boot: Boot,
    rain: Rain,
    glitch: GlitchEffect,
    particles: Particles,
    command: CommandLine,
    shortcuts: ShortcutRouter,
    input_focused: bool,
    hovered: Option<ElementId>,
    rain_start_at: Option<Instant>,
    welcome_at: Option<Instant>,
    needs_clear: bool,
    pub running: bool,
}

impl App {
    pub fn new(width: u16, height: u16, palette: Palette, seed: u64, now: Instant) -> Self {
        let mut boot = Boot::new();
        boot.start(now);
        Self {
            width,
            height,
            palette,
            phase: Phase::Boot,
            boot,
            rain: Rain::new(seed),
            glitch: GlitchEffect::new(seed.wrapping_add(1)),
            particles: Particles::new(seed.wrapping_add(2)),
            command: CommandLine::new(),
            shortcuts: ShortcutRouter::new(),
            input_focused: false,
            hovered: None,
            rain_start_at: None,
            welcome_at: None,
            needs_clear: false,
            running: true,
        }
    }

    #[cfg(test)]
    pub fn rain(&self) -> &Rain {
        &self.rain
    }

    #[cfg(test)]
    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    #[cfg(test)]
    pub fn is_booting(&self) -> bool {
        matches!(self.phase, Phase::Boot)
    }

    /// Builds the page, registers every element with its component, and
    /// arms the post-boot deadlines. Runs exactly once, after the boot
    /// overlay is gone.
    fn init_page(&mut self, now: Instant) {
        let page = Page::new(self.width, self.height);

        self.glitch.register(TITLE_ID, TITLE);
        self.glitch.register(ROLE_ID, ROLE);
        self.particles.start_typing(SUBTITLE_ID, SUBTITLE, now);
        if let Some(rect) = page.profile_rect {
            self.particles.attach_scan_line(rect, now);
        }
        if page.output_rect.is_some() {
            self.command.attach();
        }

        self.rain.init(self.width, self.height);
        self.rain_start_at = Some(now + RAIN_AUTOSTART_DELAY);
        self.welcome_at = Some(now + WELCOME_DELAY);
        self.needs_clear = true;
        self.phase = Phase::Page(page);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let Phase::Page(page) = &mut self.phase {
            *page = Page::new(width, height);
            if let Some(rect) = page.profile_rect {
                self.particles.rebind_scan_line(rect);
            }
            self.rain.resize(width, height);
            self.needs_clear = true;
        }
    }

    pub fn handle_event(&mut self, ev: &Event, now: Instant) {
        // The boot sequence accepts no input at all.
        if matches!(self.phase, Phase::Boot) {
            return;
        }
        match ev {
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                self.handle_key(k.code, k.modifiers, now);
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Moved => self.pointer_moved(m.column, m.row, now),
                MouseEventKind::Down(MouseButton::Left) => {
                    self.pointer_click(m.column, m.row, now);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if self.input_focused {
            match code {
                KeyCode::Enter => {
                    self.command.submit(&mut self.rain, &mut self.glitch, now);
                }
                KeyCode::Up => self.command.recall_previous(),
                KeyCode::Down => self.command.recall_next(),
                KeyCode::Backspace => self.command.backspace(),
                KeyCode::Esc => self.input_focused = false,
                KeyCode::Char(c)
                    if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.command.push_char(c);
                }
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.running = false;
                return;
            }
            _ => {}
        }

        match self.shortcuts.handle_key(code, modifiers) {
            Some(ShortcutAction::TriggerGlitch) => {
                self.glitch.trigger(now);
            }
            Some(ShortcutAction::ToggleRain) => self.rain.toggle(),
            Some(ShortcutAction::ShowDiagnostics) => {
                self.command
                    .append_response_lines(DIAGNOSTIC_BANNER.iter().copied());
            }
            Some(ShortcutAction::ShowHelp) | None => {}
        }
    }

    fn pointer_moved(&mut self, x: u16, y: u16, now: Instant) {
        let Phase::Page(page) = &self.phase else {
            return;
        };
        let hit = page.hit_test(x, y).map(|el| (el.id, el.kind, el.rect));
        if hit.map(|(id, _, _)| id) == self.hovered {
            return;
        }
        self.hovered = hit.map(|(id, _, _)| id);
        let Some((id, kind, rect)) = hit else {
            return;
        };
        match kind {
            ElementKind::Chip => self.particles.sparkle_burst(rect, now),
            ElementKind::Panel => self.particles.glow(id, now),
            ElementKind::Link => self.particles.ripple(rect, now),
            ElementKind::PromptPanel => {}
        }
    }

    fn pointer_click(&mut self, x: u16, y: u16, now: Instant) {
        // A click with the help overlay up dismisses it, then routes on
        // as usual, the way the original's document listener bubbled.
        let _ = self.shortcuts.handle_click();

        let Phase::Page(page) = &self.phase else {
            return;
        };
        match page.hit_test(x, y).map(|el| (el.kind, el.id)) {
            Some((ElementKind::PromptPanel, _)) => {
                self.input_focused = true;
            }
            Some((_, _)) => {
                self.input_focused = false;
                self.particles.explode(x as f32, y as f32, now);
            }
            None => self.input_focused = false,
        }
    }

    pub fn update(&mut self, now: Instant) {
        match self.phase {
            Phase::Boot => {
                self.boot.update(now);
                if self.boot.is_done() {
                    self.init_page(now);
                }
            }
            Phase::Page(_) => {
                if self.rain_start_at.is_some_and(|at| now >= at) {
                    self.rain_start_at = None;
                    self.rain.start();
                }
                if self.welcome_at.is_some_and(|at| now >= at) {
                    self.welcome_at = None;
                    self.command
                        .append_response_lines(WELCOME_BANNER.iter().copied());
                }
                self.glitch.update(now);
                self.particles.update(now);
                self.rain.tick();
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, now: Instant) {
        if self.needs_clear {
            frame.fill_rect(
                0,
                0,
                frame.width,
                frame.height,
                Cell::blank_with_bg(self.palette.bg),
            );
            self.needs_clear = false;
        }
        match &self.phase {
            Phase::Boot => self.boot.draw(frame, &self.palette, now),
            Phase::Page(page) => {
                self.rain.draw(frame, &self.palette);
                page.render(
                    frame,
                    &self.palette,
                    now,
                    &mut self.glitch,
                    &self.particles,
                    &self.command,
                    self.input_focused,
                );
                self.particles.draw(frame, &self.palette, now);
                if self.shortcuts.help_visible() {
                    page.draw_help(frame, &self.palette);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::build_palette;
    use crate::runtime::{ColorMode, Theme};
    use crossterm::event::{KeyEvent, MouseEvent};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn app(now: Instant) -> App {
        let palette = build_palette(Theme::Green, ColorMode::TrueColor, true);
        App::new(100, 30, palette, 42, now)
    }

    /// Runs the boot sequence to completion and lands in the page phase.
    fn booted(now: Instant) -> App {
        let mut a = app(now);
        a.update(now + ms(20_000));
        assert!(!a.is_booting());
        a
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn boot_completes_before_components_initialize() {
        let t0 = Instant::now();
        let mut a = app(t0);
        a.update(t0 + ms(100));
        assert!(a.is_booting());
        assert!(!a.command().is_attached());

        // Reveal (5 * 800ms) + hold (1s) + fade (1s).
        a.update(t0 + ms(6_000));
        assert!(!a.is_booting());
        assert!(a.command().is_attached());
        assert!(!a.rain().is_active());
    }

    #[test]
    fn rain_autostarts_after_the_deferred_delay() {
        let t0 = Instant::now();
        let mut a = app(t0);
        a.update(t0 + ms(6_000));
        assert!(!a.rain().is_active());
        a.update(t0 + ms(6_000) + ms(1_999));
        assert!(!a.rain().is_active());
        a.update(t0 + ms(6_000) + ms(2_000));
        assert!(a.rain().is_active());
    }

    #[test]
    fn welcome_banner_lands_in_the_log_after_its_delay() {
        let t0 = Instant::now();
        let mut a = app(t0);
        a.update(t0 + ms(6_000));
        assert!(a.command().log().is_empty());
        a.update(t0 + ms(6_000) + ms(3_000));
        assert!(a
            .command()
            .log()
            .iter()
            .any(|l| l.text.contains("Welcome")));
    }

    #[test]
    fn input_during_boot_is_ignored() {
        let t0 = Instant::now();
        let mut a = app(t0);
        a.handle_event(&key(KeyCode::Char('q')), t0 + ms(100));
        assert!(a.running);
    }

    #[test]
    fn quit_keys_work_only_while_the_input_is_unfocused() {
        let t0 = Instant::now();
        let mut a = booted(t0);

        // Focus the prompt by clicking inside the prompt panel.
        a.handle_event(&click(10, 25), t0 + ms(21_000));
        a.handle_event(&key(KeyCode::Char('q')), t0 + ms(21_000));
        assert!(a.running);
        assert_eq!(a.command().input(), "q");

        // Blur, then quit.
        a.handle_event(&key(KeyCode::Esc), t0 + ms(21_000));
        a.handle_event(&key(KeyCode::Char('q')), t0 + ms(21_000));
        assert!(!a.running);
    }

    #[test]
    fn shortcut_key_toggles_the_rain_when_unfocused() {
        let t0 = Instant::now();
        let mut a = booted(t0);
        let was = a.rain().is_active();
        a.handle_event(&key(KeyCode::Char('m')), t0 + ms(21_000));
        assert_ne!(a.rain().is_active(), was);
    }

    #[test]
    fn clicking_a_chip_spawns_an_explosion_and_blurs_the_input() {
        let t0 = Instant::now();
        let mut a = booted(t0);
        a.handle_event(&click(10, 25), t0 + ms(21_000));

        let chip = {
            let Phase::Page(page) = &a.phase else {
                unreachable!()
            };
            page.elements()
                .iter()
                .find(|e| e.kind == ElementKind::Chip)
                .unwrap()
                .rect
        };
        a.handle_event(&click(chip.x, chip.y), t0 + ms(21_000));
        assert!(!a.input_focused);
        assert_eq!(a.particles.points().len(), crate::particles::EXPLOSION_COUNT);
    }
}
