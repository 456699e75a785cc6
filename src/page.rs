// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use crossterm::style::Color;

use crate::cell::Cell;
use crate::command::{CommandLine, LineKind, PROMPT};
use crate::frame::Frame;
use crate::glitch::GlitchEffect;
use crate::palette::Palette;
use crate::particles::Particles;
use crate::shortcuts::HELP_LINES;

/// Opaque handle the components get instead of querying the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Chip,
    Panel,
    Link,
    PromptPanel,
}

#[derive(Clone, Debug)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub rect: Rect,
    pub label: &'static str,
}

pub const TITLE: &str = "REZKY NIGHTKY";
pub const ROLE: &str = "FULL-STACK DEVELOPER";
pub const SUBTITLE: &str = "welcome to my corner of the wired";

const CHIPS: &[&str] = &["rust", "crossterm", "linux", "docker", "ci"];
const PANELS: &[(&str, &str)] = &[
    ("cosmostrix", "matrix rain, terminal native"),
    ("termfolio", "this page, as a binary"),
    ("dotfiles", "config as a lifestyle"),
];
const LINKS: &[&str] = &["github", "email", "blog"];

pub const TITLE_ID: ElementId = ElementId(1);
pub const ROLE_ID: ElementId = ElementId(2);
pub const SUBTITLE_ID: ElementId = ElementId(3);
const PROMPT_PANEL_ID: ElementId = ElementId(4);
const CHIP_ID_BASE: u32 = 10;
const PANEL_ID_BASE: u32 = 20;
const LINK_ID_BASE: u32 = 30;

const MARGIN_X: u16 = 2;
const PROFILE_W: u16 = 18;
const PROFILE_H: u16 = 6;
const PANEL_H: u16 = 4;
const PROMPT_MIN_H: u16 = 5;

/// The portfolio content and its layout for one terminal size. Sections
/// that do not fit are dropped; the affected component goes inert
/// instead of crashing anything (missing-collaborator policy).
pub struct Page {
    title_pos: (u16, u16),
    role_pos: (u16, u16),
    subtitle_pos: (u16, u16),
    pub profile_rect: Option<Rect>,
    elements: Vec<Element>,
    prompt_rect: Option<Rect>,
    pub output_rect: Option<Rect>,
    input_row: Option<u16>,
}

impl Page {
    pub fn new(width: u16, height: u16) -> Self {
        let centered = |text: &str, y: u16| {
            let w = text.chars().count() as u16;
            ((width.saturating_sub(w)) / 2, y)
        };

        let mut page = Self {
            title_pos: centered(TITLE, 1),
            role_pos: centered(ROLE, 2),
            subtitle_pos: centered(SUBTITLE, 3),
            profile_rect: None,
            elements: Vec::new(),
            prompt_rect: None,
            output_rect: None,
            input_row: None,
        };

        let mut y: u16 = 5;

        if y + PROFILE_H < height && width > PROFILE_W + MARGIN_X {
            page.profile_rect = Some(Rect::new(MARGIN_X, y, PROFILE_W, PROFILE_H));

            // Chips flow to the right of the profile frame.
            let mut cx = MARGIN_X + PROFILE_W + 4;
            let mut cy = y + 1;
            for (i, label) in CHIPS.iter().copied().enumerate() {
                let w = label.chars().count() as u16 + 4;
                if cx + w >= width {
                    cx = MARGIN_X + PROFILE_W + 4;
                    cy += 2;
                }
                if cy >= y + PROFILE_H {
                    break;
                }
                page.elements.push(Element {
                    id: ElementId(CHIP_ID_BASE + i as u32),
                    kind: ElementKind::Chip,
                    rect: Rect::new(cx, cy, w, 1),
                    label,
                });
                cx += w + 2;
            }
            y += PROFILE_H + 1;
        }

        if y + PANEL_H < height && width > 3 * 12 + 2 * MARGIN_X {
            let gap: u16 = 2;
            let w = (width - 2 * MARGIN_X - gap * (PANELS.len() as u16 - 1)) / PANELS.len() as u16;
            let mut px = MARGIN_X;
            for (i, &(label, _)) in PANELS.iter().enumerate() {
                page.elements.push(Element {
                    id: ElementId(PANEL_ID_BASE + i as u32),
                    kind: ElementKind::Panel,
                    rect: Rect::new(px, y, w, PANEL_H),
                    label,
                });
                px += w + gap;
            }
            y += PANEL_H + 1;
        }

        if y < height {
            let total: u16 = LINKS
                .iter()
                .map(|l| l.chars().count() as u16 + 2)
                .sum::<u16>()
                + 4 * (LINKS.len() as u16 - 1);
            let mut lx = (width.saturating_sub(total)) / 2;
            for (i, label) in LINKS.iter().copied().enumerate() {
                let w = label.chars().count() as u16 + 2;
                page.elements.push(Element {
                    id: ElementId(LINK_ID_BASE + i as u32),
                    kind: ElementKind::Link,
                    rect: Rect::new(lx, y, w, 1),
                    label,
                });
                lx += w + 4;
            }
            y += 2;
        }

        if height > y && height - y >= PROMPT_MIN_H {
            let rect = Rect::new(MARGIN_X, y, width.saturating_sub(2 * MARGIN_X), height - y - 1);
            page.prompt_rect = Some(rect);
            page.output_rect = Some(Rect::new(
                rect.x + 1,
                rect.y + 1,
                rect.w.saturating_sub(2),
                rect.h.saturating_sub(3),
            ));
            page.input_row = Some(rect.y + rect.h - 2);
            page.elements.push(Element {
                id: PROMPT_PANEL_ID,
                kind: ElementKind::PromptPanel,
                rect,
                label: "terminal",
            });
        }

        page
    }

    #[allow(dead_code)]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<&Element> {
        self.elements.iter().find(|e| e.rect.contains(x, y))
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        palette: &Palette,
        now: Instant,
        glitch: &mut GlitchEffect,
        particles: &Particles,
        command: &CommandLine,
        input_focused: bool,
    ) {
        self.draw_banner_line(frame, palette, TITLE_ID, TITLE, self.title_pos, glitch, true);
        self.draw_banner_line(frame, palette, ROLE_ID, ROLE, self.role_pos, glitch, false);

        let subtitle = particles.typed_text(SUBTITLE_ID).unwrap_or(SUBTITLE);
        frame.put_str(self.subtitle_pos.0, self.subtitle_pos.1, subtitle, palette.dim, false);

        if let Some(rect) = self.profile_rect {
            draw_box(frame, palette, rect, palette.dim, true);
            let (cx, _) = rect.center();
            frame.put_str(cx as u16 - 1, rect.y + 2, "[@]", palette.text, true);
            let tag = "operator";
            let tx = rect.x + (rect.w.saturating_sub(tag.len() as u16)) / 2;
            frame.put_str(tx, rect.y + rect.h - 2, tag, palette.dim, false);
        }

        for el in &self.elements {
            match el.kind {
                ElementKind::Chip => {
                    let text = format!("[ {} ]", el.label);
                    frame.put_str(el.rect.x, el.rect.y, &text, palette.accent, false);
                }
                ElementKind::Panel => {
                    let lit = particles.is_glowing(el.id, now);
                    let border = if lit { palette.head } else { palette.dim };
                    draw_box(frame, palette, el.rect, border, true);
                    frame.put_str(el.rect.x + 2, el.rect.y + 1, el.label, palette.text, true);
                    let idx = (el.id.0 - PANEL_ID_BASE) as usize;
                    if let Some((_, desc)) = PANELS.get(idx) {
                        frame.put_str(el.rect.x + 2, el.rect.y + 2, desc, palette.dim, false);
                    }
                }
                ElementKind::Link => {
                    let text = format!("<{}>", el.label);
                    frame.put_str(el.rect.x, el.rect.y, &text, palette.accent, false);
                }
                ElementKind::PromptPanel => {
                    let border = if input_focused { palette.text } else { palette.dim };
                    draw_box(frame, palette, el.rect, border, true);
                }
            }
        }

        if let Some(out) = self.output_rect {
            let lines = command.log();
            let visible = out.h as usize;
            let tail = &lines[lines.len().saturating_sub(visible)..];
            for (i, line) in tail.iter().enumerate() {
                let fg = match line.kind {
                    LineKind::Echo => palette.head,
                    LineKind::Response => palette.text,
                    LineKind::Error => palette.error,
                };
                frame.put_str(out.x, out.y + i as u16, &line.text, fg, false);
            }
        }

        if let (Some(row), Some(rect)) = (self.input_row, self.prompt_rect) {
            let mut x = rect.x + 1;
            frame.put_str(x, row, PROMPT, palette.accent, true);
            x += PROMPT.chars().count() as u16 + 1;
            frame.put_str(x, row, command.input(), palette.text, false);
            if input_focused {
                let cx = x + command.input().chars().count() as u16;
                frame.set(cx, row, Cell::glyph('_', palette.head).bold());
            }
        }
    }

    fn draw_banner_line(
        &self,
        frame: &mut Frame,
        palette: &Palette,
        id: ElementId,
        fallback: &str,
        pos: (u16, u16),
        glitch: &mut GlitchEffect,
        bold: bool,
    ) {
        let len = fallback.chars().count() as u16;
        // Blank the jitter span so a shifted frame leaves no residue.
        frame.fill_rect(
            pos.0.saturating_sub(2),
            pos.1,
            len + 4,
            1,
            Cell::blank_with_bg(palette.bg),
        );

        if glitch.is_active() {
            if let Some((text, jitter)) = glitch.scrambled(id) {
                let x = (pos.0 as i32 + jitter as i32).max(0) as u16;
                frame.put_str(x, pos.1, &text, palette.head, bold);
                return;
            }
        }
        let text = glitch.original_text(id).unwrap_or(fallback);
        frame.put_str(pos.0, pos.1, text, palette.text, bold);
    }

    pub fn draw_help(&self, frame: &mut Frame, palette: &Palette) {
        let pad_x: u16 = 3;
        let pad_y: u16 = 1;
        let content_w = HELP_LINES
            .iter()
            .map(|l| l.chars().count() as u16)
            .max()
            .unwrap_or(0);
        let box_w = content_w + 2 * pad_x + 2;
        let box_h = HELP_LINES.len() as u16 + 2 * pad_y + 2;
        if frame.width < box_w || frame.height < box_h {
            return;
        }
        let rect = Rect::new(
            (frame.width - box_w) / 2,
            (frame.height - box_h) / 2,
            box_w,
            box_h,
        );
        draw_box(frame, palette, rect, palette.text, true);
        for (i, line) in HELP_LINES.iter().enumerate() {
            let fg = if i == 0 { palette.head } else { palette.text };
            let lx = rect.x + 1 + pad_x + (content_w.saturating_sub(line.chars().count() as u16)) / 2;
            frame.put_str(lx, rect.y + 1 + pad_y + i as u16, line, fg, i == 0);
        }
    }
}

/// Bordered box with +/-/| characters; optionally blanks the interior
/// so lower layers do not show through.
pub fn draw_box(frame: &mut Frame, palette: &Palette, rect: Rect, fg: Option<Color>, fill: bool) {
    if rect.w < 2 || rect.h < 2 {
        return;
    }
    if fill {
        frame.fill_rect(
            rect.x + 1,
            rect.y + 1,
            rect.w - 2,
            rect.h - 2,
            Cell::blank_with_bg(palette.bg),
        );
    }
    let right = rect.x + rect.w - 1;
    let bottom = rect.y + rect.h - 1;
    for x in rect.x..=right {
        let ch = if x == rect.x || x == right { '+' } else { '-' };
        frame.set(x, rect.y, Cell::glyph(ch, fg));
        frame.set(x, bottom, Cell::glyph(ch, fg));
    }
    for y in rect.y + 1..bottom {
        frame.set(rect.x, y, Cell::glyph('|', fg));
        frame.set(right, y, Cell::glyph('|', fg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_layout_registers_every_section() {
        let page = Page::new(100, 30);
        assert!(page.profile_rect.is_some());
        assert!(page.output_rect.is_some());
        let chips = page
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Chip)
            .count();
        let panels = page
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Panel)
            .count();
        let links = page
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Link)
            .count();
        assert_eq!(chips, CHIPS.len());
        assert_eq!(panels, PANELS.len());
        assert_eq!(links, LINKS.len());
    }

    #[test]
    fn tiny_layout_drops_the_prompt_panel() {
        let page = Page::new(30, 8);
        assert!(page.output_rect.is_none());
        assert!(page
            .elements()
            .iter()
            .all(|e| e.kind != ElementKind::PromptPanel));
    }

    #[test]
    fn hit_test_finds_the_element_under_the_pointer() {
        let page = Page::new(100, 30);
        let chip = page
            .elements()
            .iter()
            .find(|e| e.kind == ElementKind::Chip)
            .unwrap()
            .clone();
        let found = page.hit_test(chip.rect.x, chip.rect.y).unwrap();
        assert_eq!(found.id, chip.id);
        assert!(page.hit_test(0, 0).is_none());
    }

    #[test]
    fn elements_do_not_overlap() {
        let page = Page::new(100, 30);
        let els = page.elements();
        for (i, a) in els.iter().enumerate() {
            for b in els.iter().skip(i + 1) {
                let overlap = a.rect.x < b.rect.x + b.rect.w
                    && b.rect.x < a.rect.x + a.rect.w
                    && a.rect.y < b.rect.y + b.rect.h
                    && b.rect.y < a.rect.y + a.rect.h;
                assert!(!overlap, "{:?} overlaps {:?}", a.id, b.id);
            }
        }
    }
}
