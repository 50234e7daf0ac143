//! Keyboard polling on top of crossterm raw mode.

use crate::config::KEY_HOLD_MS;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use phf::phf_map;
use simsync_module::visual::InputSource;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// Named keys; single characters and `shift+<letter>` are resolved in [`key_code`]
static NAMED_KEYS: phf::Map<&'static str, KeyCode> = phf_map! {
    "tab" => KeyCode::Tab,
    "esc" => KeyCode::Esc,
    "escape" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "return" => KeyCode::Enter,
    "space" => KeyCode::Char(' '),
    "backspace" => KeyCode::Backspace,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
};

pub fn key_code(name: &str) -> Option<KeyCode> {
    let name = name.trim().to_ascii_lowercase();
    if let Some(code) = NAMED_KEYS.get(name.as_str()) {
        return Some(*code);
    }
    let (shift, rest) = match name.strip_prefix("shift+") {
        Some(rest) => (true, rest),
        None => (false, name.as_str()),
    };
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if shift && c.is_ascii_alphabetic() => Some(KeyCode::Char(c.to_ascii_uppercase())),
        (Some(c), None) if !shift => Some(KeyCode::Char(c)),
        _ => None,
    }
}

/// Remembers which keys are down. Until the terminal reports a release event
/// a key counts as held for `hold` after its last press or repeat.
#[derive(Debug)]
pub struct KeyTracker {
    hold: Duration,
    reports_release: bool,
    held: HashMap<KeyCode, Instant>,
}

impl KeyTracker {
    pub fn new(hold: Duration) -> Self {
        KeyTracker { hold, reports_release: false, held: HashMap::new() }
    }

    pub fn record(&mut self, key: &KeyEvent, at: Instant) {
        let code = normalize(key);
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(code, at);
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.held.remove(&code);
            }
        }
    }

    pub fn is_held(&self, code: KeyCode, now: Instant) -> bool {
        match self.held.get(&code) {
            Some(_) if self.reports_release => true,
            Some(seen) => now.saturating_duration_since(*seen) <= self.hold,
            None => false,
        }
    }
}

// Raw mode swallows SIGINT; ctrl+c is read as esc so the session can still end.
fn normalize(key: &KeyEvent) -> KeyCode {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyCode::Esc,
        code => code,
    }
}

/// [`InputSource`] reading the controlling terminal. Raw mode lasts for the
/// lifetime of the value.
pub struct KeyboardInput {
    tracker: KeyTracker,
    enhanced: bool,
}

impl KeyboardInput {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        log::debug!("Keyboard input ready (release events: {})", enhanced);
        Ok(KeyboardInput {
            tracker: KeyTracker::new(Duration::from_millis(KEY_HOLD_MS)),
            enhanced,
        })
    }

    fn drain(&mut self) -> io::Result<()> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.tracker.record(&key, Instant::now());
            }
        }
        Ok(())
    }
}

impl InputSource for KeyboardInput {
    fn is_pressed(&mut self, key: &str) -> bool {
        let Some(code) = key_code(key) else {
            log::debug!("Unknown key name '{}'", key);
            return false;
        };
        if let Err(e) = self.drain() {
            log::warn!("Reading terminal events failed: {}", e);
        }
        self.tracker.is_held(code, Instant::now())
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}
