use std::io::{self, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::SessionConfig;
use crate::input::KeyPoller;
use crate::phase::Phase;
use crate::quotes::random_completion_message;
use crate::render::{draw_frame, rule, write_line};
use crate::runtime::Clock;

pub const INTERRUPTED_MESSAGE: &str = "Session interrupted.";
pub const ATTRIBUTION: [&str; 2] = [
    "Terminal Zen by Bob Tianqi Wei",
    "GitHub: https://github.com/bobtianqiwei",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

/// Mutable state of one run, reset every time `run` starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub is_running: bool,
    /// Last rendered fill fraction, carried across phase boundaries.
    pub current_progress: f64,
    pub elapsed_since_start: Duration,
    pub cycle_count: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_running: false,
            current_progress: 0.0,
            elapsed_since_start: Duration::ZERO,
            cycle_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub outcome: Outcome,
    pub cycles: u32,
    pub elapsed: Duration,
    pub frames: u64,
}

/// The breathing loop: phase state machine, frame renderer and input polling.
///
/// Phases are scheduled on one timeline anchored at the session start, so a
/// slow frame shortens the remainder of the schedule instead of pushing every
/// later phase back. A stall longer than a frame moves the timeline forward.
pub struct Session<C, P, W> {
    config: SessionConfig,
    clock: C,
    poller: P,
    out: W,
    token: CancelToken,
    state: SessionState,
    started: Duration,
    schedule: Duration,
    frames: u64,
    completion_message: String,
}

impl<C: Clock, P: KeyPoller, W: Write> Session<C, P, W> {
    pub fn new(config: SessionConfig, clock: C, poller: P, out: W, token: CancelToken) -> Self {
        Self {
            config,
            clock,
            poller,
            out,
            token,
            state: SessionState::default(),
            started: Duration::ZERO,
            schedule: Duration::ZERO,
            frames: 0,
            completion_message: String::new(),
        }
    }

    pub fn with_completion_message(mut self, message: impl Into<String>) -> Self {
        self.completion_message = message.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run(&mut self) -> io::Result<SessionReport> {
        info!(
            total_secs = self.config.total_secs(),
            cycle_secs = self.config.cycle_secs(),
            fps = self.config.fps(),
            "session started"
        );

        self.started = self.clock.elapsed();
        self.schedule = Duration::ZERO;
        self.frames = 0;
        self.state = SessionState {
            is_running: true,
            ..SessionState::default()
        };

        while self.still_running() && self.elapsed() < self.config.total() {
            self.state.cycle_count += 1;
            write!(self.out, "\r\n")?;
            write_line(&mut self.out, &format!("Cycle {}", self.state.cycle_count))?;
            debug!(cycle = self.state.cycle_count, "cycle started");

            if !self.run_cycle()? {
                break;
            }
            self.state.elapsed_since_start = self.elapsed();
        }

        self.state.elapsed_since_start = self.elapsed();
        let outcome = if self.token.is_cancelled() {
            Outcome::Interrupted
        } else {
            Outcome::Completed
        };
        self.state.is_running = false;
        self.finish(outcome)?;

        info!(
            ?outcome,
            cycles = self.state.cycle_count,
            elapsed_ms = self.state.elapsed_since_start.as_millis() as u64,
            "session ended"
        );

        Ok(SessionReport {
            outcome,
            cycles: self.state.cycle_count,
            elapsed: self.state.elapsed_since_start,
            frames: self.frames,
        })
    }

    fn elapsed(&self) -> Duration {
        self.clock.elapsed().saturating_sub(self.started)
    }

    fn still_running(&mut self) -> bool {
        if self.token.is_cancelled() {
            self.state.is_running = false;
        }
        self.state.is_running
    }

    /// Where the next phase starts on the timeline. Lateness up to one frame
    /// interval is absorbed; anything longer (a suspended process, a stalled
    /// terminal) moves the timeline to now so the phase still runs in full.
    fn phase_start(&self) -> Duration {
        let now = self.elapsed();
        let frame_interval = Duration::from_secs(1) / self.config.fps();
        let late = now.saturating_sub(self.schedule);
        if late > frame_interval {
            debug!(late_ms = late.as_millis() as u64, "phase started late, re-anchoring");
            now
        } else {
            self.schedule
        }
    }

    fn run_cycle(&mut self) -> io::Result<bool> {
        for phase in Phase::CYCLE {
            if !self.run_phase(phase)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs one phase to its scheduled end. Returns false if cancelled.
    fn run_phase(&mut self, phase: Phase) -> io::Result<bool> {
        if !self.still_running() {
            return Ok(false);
        }

        let duration = self.config.phase_duration(phase);
        let total_frames = self.config.frames_for(phase);
        let phase_start = self.phase_start();
        let label = phase.to_string();
        self.state.current_progress = phase.entry_progress(self.state.current_progress);
        debug!(%phase, secs = duration.as_secs(), total_frames, "phase started");

        let mut frame: u64 = 0;
        loop {
            if !self.still_running() {
                return Ok(false);
            }
            self.state.elapsed_since_start = self.elapsed();

            if let Some(progress) = phase.sweep_progress(frame, total_frames) {
                self.state.current_progress = progress;
            }
            // holds draw once and then only poll
            if frame == 0 || phase.is_sweep() {
                draw_frame(&mut self.out, &label, self.state.current_progress)?;
                self.frames += 1;
            }

            if self.poller.poll_cancel_key() {
                self.token.cancel();
                self.state.is_running = false;
                return Ok(false);
            }

            let in_phase = self.elapsed().saturating_sub(phase_start);
            if in_phase >= duration {
                break;
            }

            let deadline = frame_deadline(duration, frame + 1, total_frames);
            self.clock.sleep(deadline.saturating_sub(in_phase));

            let in_phase = self.elapsed().saturating_sub(phase_start);
            frame = (frame + 1).max(frames_elapsed(in_phase, duration, total_frames));
        }

        self.schedule = phase_start + duration;
        Ok(true)
    }

    fn finish(&mut self, outcome: Outcome) -> io::Result<()> {
        if outcome == Outcome::Interrupted {
            return write_interrupted(&mut self.out);
        }

        let message = if self.completion_message.is_empty() {
            random_completion_message()
        } else {
            self.completion_message.clone()
        };
        write!(self.out, "\r\n")?;
        write_line(&mut self.out, &rule('='))?;
        write_line(&mut self.out, &message)?;
        write_line(&mut self.out, &rule('='))?;
        for line in ATTRIBUTION {
            write_line(&mut self.out, line)?;
        }
        write_line(&mut self.out, &rule('='))?;
        self.out.flush()
    }
}

/// The line printed instead of the completion block when a run is cut short.
pub fn write_interrupted<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    write!(out, "\r\n")?;
    write_line(out, INTERRUPTED_MESSAGE)?;
    out.flush()
}

/// Offset into the phase at which `frame` is due, never past the phase end.
fn frame_deadline(duration: Duration, frame: u64, total_frames: u64) -> Duration {
    if total_frames == 0 || frame >= total_frames {
        return duration;
    }
    let nanos = duration.as_nanos() * u128::from(frame) / u128::from(total_frames);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Whole frames that fit into `in_phase`.
fn frames_elapsed(in_phase: Duration, duration: Duration, total_frames: u64) -> u64 {
    if duration.is_zero() {
        return total_frames;
    }
    let frames = in_phase.as_nanos() * u128::from(total_frames) / duration.as_nanos();
    u64::try_from(frames).unwrap_or(u64::MAX)
}
