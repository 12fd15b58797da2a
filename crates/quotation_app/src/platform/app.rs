use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use quotation_core::{update, AppState, AppViewModel, Msg, View};
use quotation_engine::EngineEvent;

use super::effects::{to_msg, EffectRunner};
use super::ui::render;

/// How often simulated progress advances while waiting on the server.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// One dashboard session: owns the state, runs effects, prints views.
pub struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    live: bool,
    shown: Option<View>,
    processing_since: Option<Instant>,
}

impl<W: Write> Session<W> {
    pub fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            out,
            live: false,
            shown: None,
            processing_since: None,
        }
    }

    /// Runs one message through `update`, then any messages its effects
    /// produce on the spot. Views are only printed after [`Session::show`]
    /// has been called once.
    pub fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let mut pending = VecDeque::from([msg]);
        while let Some(msg) = pending.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            let was_dirty = state.consume_dirty();
            let view = state.view();
            self.state = state;

            self.track_processing(view.view);
            pending.extend(self.runner.enqueue(effects));

            if was_dirty && self.live {
                self.draw(&view)?;
            }
        }
        Ok(())
    }

    pub fn show(&mut self) -> io::Result<()> {
        self.live = true;
        let view = self.state.view();
        self.draw(&view)
    }

    pub fn print(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn current_view(&self) -> View {
        self.state.current_view()
    }

    /// Feeds engine events into the session until one matches `done` or the
    /// timeout passes. Returns whether a matching event arrived.
    pub fn wait_for(
        &mut self,
        timeout: Duration,
        done: fn(&EngineEvent) -> bool,
    ) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            let Some(event) = self.runner.next_event(remaining) else {
                break;
            };
            let matched = done(&event);
            self.dispatch(to_msg(event))?;
            if matched {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Ticks progress until the in-flight request settles.
    pub fn run_to_completion(&mut self) -> io::Result<View> {
        while self.state.current_view() == View::Processing {
            let msg = match self.runner.next_event(TICK_INTERVAL) {
                Some(event) => to_msg(event),
                None => Msg::Tick {
                    elapsed_ms: self.elapsed_ms(),
                },
            };
            self.dispatch(msg)?;
        }
        Ok(self.state.current_view())
    }

    fn track_processing(&mut self, view: View) {
        if view == View::Processing {
            self.processing_since.get_or_insert_with(Instant::now);
        } else {
            self.processing_since = None;
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.processing_since
            .map(|since| u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    fn draw(&mut self, view: &AppViewModel) -> io::Result<()> {
        let previous = self.shown.replace(view.view);
        if view.view == View::Processing {
            // Progress rewrites its own line.
            write!(self.out, "\r{}", render::progress_line(view))?;
        } else {
            if previous == Some(View::Processing) {
                writeln!(self.out)?;
            }
            for line in render::render(view) {
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()
    }
}

pub fn is_hydration(event: &EngineEvent) -> bool {
    matches!(
        event,
        EngineEvent::RemoteCredentials(_) | EngineEvent::RemoteCredentialsUnavailable
    )
}

pub fn is_save_result(event: &EngineEvent) -> bool {
    matches!(event, EngineEvent::CredentialsSaved { .. })
}
