//! Walkthrough application state and logic.

use crate::config::Config;
use crate::playback::{PlaybackController, Transition};
use crate::script::ScriptStore;
use crossterm::event::KeyCode;
use std::time::{Duration, Instant};
use tracing::info;

/// Terminal walkthrough state.
pub struct WalkthroughApp {
    /// The playback session.
    pub controller: PlaybackController,
    /// Timing options.
    pub config: Config,
    /// Is the walkthrough advancing on its own?
    pub autoplay: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// When the current transition started.
    transition_started: Option<Instant>,
    /// When autoplay last advanced.
    last_autoplay: Instant,
}

impl WalkthroughApp {
    /// Create a new app at the first step of a script.
    pub fn new(script: ScriptStore, config: Config) -> Self {
        let autoplay = config.autoplay;
        Self {
            controller: PlaybackController::new(script),
            config,
            autoplay,
            should_quit: false,
            status: "Ready. Press → to step, ← to go back, 'a' to autoplay, 'q' to quit.".into(),
            transition_started: None,
            last_autoplay: Instant::now(),
        }
    }

    /// Step forward.
    pub fn advance(&mut self, now: Instant) {
        let transition = self.controller.advance();
        if transition.moved() {
            self.transition_started = Some(now);
        }
        self.report(transition);
    }

    /// Step back.
    pub fn retreat(&mut self) {
        let transition = self.controller.retreat();
        self.transition_started = None;
        self.report(transition);
    }

    /// Back to the first step.
    pub fn reset(&mut self) {
        let transition = self.controller.reset();
        self.transition_started = None;
        self.autoplay = false;
        self.report(transition);
    }

    /// Jump to the first or last step.
    pub fn jump(&mut self, to_end: bool, now: Instant) {
        let target = if to_end { self.controller.len() - 1 } else { 0 };
        match self.controller.jump_to(target) {
            Ok(transition) => {
                self.transition_started = self.controller.is_transitioning().then_some(now);
                self.report(transition);
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
    }

    /// Start or stop autoplay.
    pub fn toggle_autoplay(&mut self, now: Instant) {
        self.autoplay = !self.autoplay;
        self.last_autoplay = now;
        self.status = if self.autoplay { "Autoplay on." } else { "Autoplay paused." }.into();
        info!(autoplay = self.autoplay, "autoplay toggled");
    }

    /// Run timers: clear decayed transitions and drive autoplay.
    pub fn tick(&mut self, now: Instant) {
        if let Some(started) = self.transition_started {
            if now.saturating_duration_since(started) >= self.config.transition() {
                self.controller.finish_transition();
                self.transition_started = None;
            }
        }

        if self.autoplay && now.saturating_duration_since(self.last_autoplay) >= self.config.autoplay_interval() {
            self.last_autoplay = now;
            self.advance(now);
            if self.controller.is_at_end() {
                self.autoplay = false;
            }
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                self.autoplay = false;
                self.advance(now);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.autoplay = false;
                self.retreat();
            }
            KeyCode::Char('r') => self.reset(),
            KeyCode::Home => self.jump(false, now),
            KeyCode::End => self.jump(true, now),
            KeyCode::Char('a') => self.toggle_autoplay(now),
            _ => {}
        }
    }

    /// Time remaining before the next autoplay step.
    pub fn autoplay_remaining(&self, now: Instant) -> Option<Duration> {
        self.autoplay.then(|| {
            self.config
                .autoplay_interval()
                .saturating_sub(now.saturating_duration_since(self.last_autoplay))
        })
    }

    fn report(&mut self, transition: Transition) {
        let len = self.controller.len();
        self.status = match transition {
            Transition::Moved { to, .. } => {
                let step = self.controller.current_step();
                format!("Step {}/{}: {}", to + 1, len, step.title)
            }
            Transition::AtEnd => "Already at the last step. Press 'r' to start over.".into(),
            Transition::AtStart => "Already at the first step.".into(),
            Transition::Reset => "Reset. Ready.".into(),
        };
    }
}

/// Run the terminal walkthrough.
pub fn run_walkthrough(script: ScriptStore, config: Config) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let tick = config.tick();
    let mut app = WalkthroughApp::new(script, config);
    info!(steps = app.controller.len(), "walkthrough started");

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|frame| super::ui::draw(frame, &app)) {
            break Err(e);
        }

        match event::poll(tick) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key.code, Instant::now());
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        app.tick(Instant::now());

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    info!(position = app.controller.position(), "walkthrough closed");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> WalkthroughApp {
        WalkthroughApp::new(ScriptStore::builtin().unwrap(), Config::default())
    }

    #[test]
    fn test_keys_drive_playback() {
        let mut app = app();
        let now = Instant::now();

        app.handle_key(KeyCode::Right, now);
        app.handle_key(KeyCode::Char(' '), now);
        assert_eq!(app.controller.position(), 2);

        app.handle_key(KeyCode::Left, now);
        assert_eq!(app.controller.position(), 1);

        app.handle_key(KeyCode::End, now);
        assert!(app.controller.is_at_end());

        app.handle_key(KeyCode::Char('r'), now);
        assert_eq!(app.controller.position(), 0);

        app.handle_key(KeyCode::Char('q'), now);
        assert!(app.should_quit);
    }

    #[test]
    fn test_transition_decays_after_configured_delay() {
        let mut app = app();
        let start = Instant::now();

        app.advance(start);
        assert!(app.controller.is_transitioning());

        app.tick(start + Duration::from_millis(10));
        assert!(app.controller.is_transitioning());

        app.tick(start + app.config.transition());
        assert!(!app.controller.is_transitioning());
    }

    #[test]
    fn test_autoplay_stops_at_end() {
        let mut app = app();
        let mut now = Instant::now();
        app.toggle_autoplay(now);

        for _ in 0..app.controller.len() + 5 {
            now += app.config.autoplay_interval();
            app.tick(now);
        }

        assert!(app.controller.is_at_end());
        assert!(!app.autoplay);
    }

    #[test]
    fn test_boundary_status() {
        let mut app = app();
        app.retreat();
        assert_eq!(app.status, "Already at the first step.");
        assert_eq!(app.controller.position(), 0);
    }
}
