//! Presentation state
//!
//! [`App`] only changes through [`App::apply`] (showcase output) and
//! [`App::handle_key`] (which turns key presses into showcase events). It
//! never talks to timers itself.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use folio_core::config::ContactConfig;
use folio_core::{FolioConfig, KeyToken, Section};
use folio_engine::contact::{check_field, ContactForm, Field, FieldError};
use folio_engine::particles::ParticleField;
use folio_engine::perf::PerfSnapshot;
use folio_engine::{FaviconFrame, OutputEvent, ScrollMetrics, ShowcaseEvent};

// ---------------------------------------------------------------------------
// Page content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLine {
    Heading(Section),
    Text(String),
    Blank,
}

const SECTION_BODY: [(Section, &[&str]); 5] = [
    (
        Section::About,
        &[
            "I build interfaces that feel fast and stay out of the way.",
            "Most of my work sits between design systems and the browser:",
            "component libraries, motion, accessibility, and the tooling",
            "that keeps all of it honest.",
            "",
            "Outside of work I tinker with generative art and keyboards.",
        ],
    ),
    (
        Section::Projects,
        &[
            "Lumen        Design-token pipeline with live theming",
            "             TypeScript, Rust, WebAssembly",
            "",
            "Orbit        3-D particle playground for the web",
            "             Three.js, GLSL",
            "",
            "Ledgerline   Accessible data tables for large datasets",
            "             React, virtualization, ARIA grid",
            "",
            "Driftwood    Offline-first notes with CRDT sync",
            "             Svelte, IndexedDB",
        ],
    ),
    (
        Section::Skills,
        &[
            "Languages    TypeScript  JavaScript  Rust  CSS",
            "Frameworks   React  Next.js  Svelte  Vue",
            "Graphics     WebGL  Three.js  Canvas  SVG",
            "Tooling      Vite  esbuild  Playwright  Storybook",
            "Practices    Accessibility  Performance budgets  Design systems",
        ],
    ),
    (
        Section::Experience,
        &[
            "2022 - now   Senior Frontend Engineer, Northwind Studio",
            "             Led the design-system rewrite and motion guidelines.",
            "",
            "2019 - 2022  Frontend Engineer, Parallax Labs",
            "             Built the data-visualization suite.",
            "",
            "2017 - 2019  Web Developer, Freelance",
            "             Marketing sites and small product launches.",
        ],
    ),
    (
        Section::Contact,
        &[
            "Have a project in mind? Press c to open the contact form.",
            "Tab moves between fields, Enter checks the form, Esc closes it.",
        ],
    ),
];

/// Blank rows after each section, so the page scrolls well past the navbar threshold.
const SECTION_GAP: usize = 12;

/// Every line of the scrollable page, top to bottom.
pub fn page_lines(name: &str, tagline: &str) -> Vec<PageLine> {
    let mut lines = vec![
        PageLine::Heading(Section::Hero),
        PageLine::Blank,
        PageLine::Text(name.to_string()),
        PageLine::Text(tagline.to_string()),
        PageLine::Blank,
        PageLine::Text("Scroll with arrows, j/k or PgUp/PgDn.".into()),
        PageLine::Blank,
    ];
    for (section, body) in SECTION_BODY {
        lines.push(PageLine::Heading(section));
        lines.push(PageLine::Blank);
        lines.extend(body.iter().map(|l| {
            if l.is_empty() {
                PageLine::Blank
            } else {
                PageLine::Text(l.to_string())
            }
        }));
        lines.extend(std::iter::repeat(PageLine::Blank).take(SECTION_GAP));
    }
    lines
}

/// Map a terminal key to the code the easter-egg watcher sees.
pub fn key_token(code: KeyCode) -> Option<KeyToken> {
    let named = |code: &str| KeyToken::parse(code).ok();
    match code {
        KeyCode::Up => named(KeyToken::ARROW_UP),
        KeyCode::Down => named(KeyToken::ARROW_DOWN),
        KeyCode::Left => named(KeyToken::ARROW_LEFT),
        KeyCode::Right => named(KeyToken::ARROW_RIGHT),
        KeyCode::Char(c) if c.is_ascii_alphabetic() => Some(KeyToken::letter(c)),
        KeyCode::Char(c) if c.is_ascii_digit() => c.to_digit(10).map(|d| KeyToken::digit(d as u8)),
        KeyCode::Char(' ') => named("Space"),
        KeyCode::Enter => named("Enter"),
        KeyCode::Esc => named("Escape"),
        KeyCode::Tab => named("Tab"),
        KeyCode::Backspace => named("Backspace"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

pub struct ContactPanel {
    pub open: bool,
    pub focus: Field,
    pub form: ContactForm,
    pub errors: Vec<FieldError>,
    /// Set after a successful check.
    pub status: Option<String>,
}

impl ContactPanel {
    fn new() -> Self {
        Self {
            open: false,
            focus: Field::Name,
            form: ContactForm::default(),
            errors: Vec::new(),
            status: None,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.form.name,
            Field::Email => &self.form.email,
            Field::Message => &self.form.message,
        }
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            Field::Name => Field::Email,
            Field::Email => Field::Message,
            Field::Message => Field::Name,
        };
    }

    fn edit(&mut self, rules: &ContactConfig, edit: impl FnOnce(&mut String)) {
        let mut value = self.value(self.focus).to_string();
        edit(&mut value);
        self.form.set(self.focus, value);
        self.status = None;

        let focus = self.focus;
        self.errors.retain(|e| e.field() != focus);
        if let Some(err) = check_field(focus, self.value(focus), rules) {
            self.errors.push(err);
        }
    }

    fn submit(&mut self, rules: &ContactConfig) {
        match self.form.validate(rules) {
            Ok(()) => {
                self.errors.clear();
                self.status = Some("Looks good! Message ready to send.".into());
            }
            Err(errors) => {
                self.errors = errors;
                self.status = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, rules: &ContactConfig) {
        match key.code {
            KeyCode::Esc => self.open = false,
            KeyCode::Tab => self.next_field(),
            KeyCode::Enter => self.submit(rules),
            KeyCode::Backspace => self.edit(rules, |v| {
                v.pop();
            }),
            KeyCode::Char(c) => self.edit(rules, |v| v.push(c)),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct App {
    // Intro
    pub name: String,
    pub tagline: String,
    pub intro_active: bool,
    /// Intro labels on screen, in reveal order.
    pub intro_shown: Vec<String>,
    pub subtitle: Option<String>,

    // Page chrome
    pub favicon: FaviconFrame,
    pub progress: f64,
    pub navbar_condensed: bool,
    pub scroll: ScrollMetrics,
    pub page: Vec<PageLine>,

    // Overlays
    pub unlocked: bool,
    pub perf_visible: bool,
    pub perf: Option<PerfSnapshot>,
    pub contact: ContactPanel,
    contact_rules: ContactConfig,

    pub particles: ParticleField,

    // Control
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &FolioConfig) -> Self {
        let name: String = config.intro.steps.iter().map(|s| s.label.as_str()).collect();
        let tagline = config.intro.subtitle.clone();
        let page = page_lines(&name, &tagline);
        Self {
            scroll: ScrollMetrics::new(0.0, page.len() as f64, 0.0),
            page,
            name,
            tagline,
            intro_active: true,
            intro_shown: Vec::new(),
            subtitle: None,
            favicon: FaviconFrame::at(0.0, config.favicon.glyph),
            progress: 0.0,
            navbar_condensed: false,
            unlocked: false,
            perf_visible: false,
            perf: None,
            contact: ContactPanel::new(),
            contact_rules: config.contact.clone(),
            particles: ParticleField::new(config.particles.count, config.particles.seed),
            should_quit: false,
        }
    }

    /// Fold one showcase output into the presentation state.
    pub fn apply(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::IntroStep { label, .. } => self.intro_shown.push(label.clone()),
            OutputEvent::IntroSubtitle { text } => self.subtitle = Some(text.clone()),
            OutputEvent::IntroComplete | OutputEvent::IntroDismissed { .. } => {
                self.intro_active = false;
            }
            OutputEvent::Unlocked => self.unlocked = true,
            OutputEvent::Relocked => self.unlocked = false,
            OutputEvent::Favicon(frame) => self.favicon = *frame,
            OutputEvent::ScrollProgress { progress } => self.progress = *progress,
            OutputEvent::Navbar { condensed } => self.navbar_condensed = *condensed,
            OutputEvent::PerfPanel { visible } => {
                self.perf_visible = *visible;
                if !visible {
                    self.perf = None;
                }
            }
            OutputEvent::PerfSample(sample) => self.perf = Some(sample.clone()),
        }
    }

    /// Record the height available to the page. Returns a scroll event if
    /// the metrics changed.
    pub fn set_viewport(&mut self, rows: u16) -> Option<ShowcaseEvent> {
        let viewport = rows as f64;
        if viewport == self.scroll.viewport_height {
            return None;
        }
        let resized = ScrollMetrics::new(self.scroll.offset, self.page.len() as f64, viewport);
        self.scroll = resized.scrolled_by(0.0);
        Some(ShowcaseEvent::Scroll(self.scroll))
    }

    fn scroll_by(&mut self, rows: f64) -> Option<ShowcaseEvent> {
        let next = self.scroll.scrolled_by(rows);
        if next == self.scroll {
            return None;
        }
        self.scroll = next;
        Some(ShowcaseEvent::Scroll(next))
    }

    /// Translate one key press into showcase events.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<ShowcaseEvent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return Vec::new();
        }
        // Ctrl+Shift+P; most terminals can't tell it apart from Ctrl+P.
        if ctrl && matches!(key.code, KeyCode::Char('p') | KeyCode::Char('P')) {
            return vec![ShowcaseEvent::TogglePerf];
        }

        let mut events: Vec<ShowcaseEvent> = key_token(key.code).map(ShowcaseEvent::Key).into_iter().collect();

        if key.code == KeyCode::Esc && self.unlocked {
            events.push(ShowcaseEvent::DismissEasterEgg);
            return events;
        }

        if self.contact.open {
            self.contact.handle_key(key, &self.contact_rules);
            return events;
        }

        let page = (self.scroll.viewport_height - 1.0).max(1.0);
        let scrolled = match key.code {
            KeyCode::Esc | KeyCode::Enter if self.intro_active => {
                events.push(ShowcaseEvent::SkipIntro);
                None
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            // The page isn't on screen yet; keys only reach the watcher.
            _ if self.intro_active => None,
            KeyCode::Char('c') => {
                self.contact.open = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1.0),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1.0),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page),
            KeyCode::Home => self.scroll_by(-self.scroll.offset),
            KeyCode::End => self.scroll_by(self.scroll.max_offset()),
            _ => None,
        };
        events.extend(scrolled);
        events
    }

    /// Section at the top of the viewport.
    pub fn current_section(&self) -> Section {
        let top = self.scroll.offset as usize;
        self.page
            .iter()
            .take(top + 1)
            .filter_map(|l| match l {
                PageLine::Heading(s) => Some(*s),
                _ => None,
            })
            .last()
            .unwrap_or(Section::Hero)
    }
}
