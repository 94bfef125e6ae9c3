//! Everything printed around a session: the mode menu, preparation tips,
//! the session header and the start countdown.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::{ConfigError, SessionConfig};
use crate::duration::format_duration;
use crate::input::KeyPoller;
use crate::phase::Phase;
use crate::render::{bar, rule, write_line};
use crate::runtime::{Clock, Ticker};

pub const COUNTDOWN_STEPS: u32 = 100;
pub const COUNTDOWN_SECS: u32 = 10;
const COUNTDOWN_PAUSE: Duration = Duration::from_millis(300);

/// Preset sessions offered in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Mode {
    #[strum(to_string = "Quick Relaxation")]
    Quick,
    #[strum(to_string = "Standard Meditation")]
    Standard,
    #[strum(to_string = "Deep Meditation")]
    Deep,
}

impl Mode {
    pub fn from_choice(choice: &str) -> Option<Mode> {
        match choice {
            "1" => Some(Mode::Quick),
            "2" => Some(Mode::Standard),
            "3" => Some(Mode::Deep),
            _ => None,
        }
    }

    pub fn total_secs(self) -> u64 {
        match self {
            Mode::Quick => 60,
            Mode::Standard => 180,
            Mode::Deep => 600,
        }
    }

    /// Presets breathe 7-3-7-3.
    pub fn session_config(self, fps: u32) -> Result<SessionConfig, ConfigError> {
        SessionConfig::new(self.total_secs(), 7, 3, 7, 3, fps)
    }
}

/// Show the menu until a valid choice is made. `None` means exit.
pub fn select_mode<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Mode>> {
    write_line(out, "Terminal Zen - Choose Your Meditation Mode")?;
    write_line(out, &rule('='))?;
    write_line(out, "1. Quick Relaxation (1 minute)")?;
    write_line(out, "2. Standard Meditation (3 minutes)")?;
    write_line(out, "3. Deep Meditation (10 minutes)")?;
    write_line(out, "0. Exit")?;
    write_line(out, &rule('='))?;

    let mut line = String::new();
    loop {
        write!(out, "Please select a mode (1-3, 0 to exit): ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let choice = line.trim();
        if choice == "0" {
            return Ok(None);
        }
        if let Some(mode) = Mode::from_choice(choice) {
            return Ok(Some(mode));
        }
        write_line(out, "Invalid choice, please enter 1, 2, 3, or 0")?;
    }
}

pub fn preparation_tips(total_secs: u64) -> &'static [&'static str] {
    if total_secs <= 60 {
        &[
            "Find a quiet, comfortable place",
            "Sit up straight, relax your shoulders",
            "Close your eyes or focus on the screen",
            "Get ready to follow the breathing rhythm",
        ]
    } else if total_secs <= 180 {
        &[
            "Find a quiet, comfortable place",
            "Sit up straight, relax your shoulders and facial muscles",
            "Close your eyes or focus on the screen",
            "Let go of all thoughts, focus on the present moment",
            "Get ready to follow the breathing rhythm",
        ]
    } else {
        &[
            "Find a quiet, comfortable place",
            "Sit up straight, relax all your muscles",
            "Close your eyes or focus on the screen",
            "Let go of all thoughts, focus on the present moment",
            "Get ready to follow the breathing rhythm",
            "Stay patient and enjoy the process",
        ]
    }
}

/// Print the tips for `mode` and wait for Enter (or end of input).
pub fn prepare<R: BufRead, W: Write>(mode: Mode, input: &mut R, out: &mut W) -> io::Result<()> {
    write_line(out, "")?;
    write_line(out, &format!("{mode} - Getting Ready"))?;
    write_line(out, &rule('='))?;
    write_line(out, "Preparation Tips:")?;
    for tip in preparation_tips(mode.total_secs()) {
        write_line(out, &format!("   • {tip}"))?;
    }
    write_line(out, "")?;
    write!(out, "Press Enter when you're ready to begin...")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

pub fn write_header<W: Write>(out: &mut W, config: &SessionConfig) -> io::Result<()> {
    write_line(out, "")?;
    write_line(out, &rule('='))?;
    write_line(out, "Terminal Zen - Breathing Guide")?;
    write_line(out, "Press 'q', 'Esc', or Ctrl+C to exit")?;
    write_line(
        out,
        &format!(
            "Session duration: {}",
            format_duration(config.total_secs())
        ),
    )?;
    write_line(
        out,
        &format!(
            "Cycle: Inhale {}s, Hold {}s, Exhale {}s, Hold {}s",
            config.phase_secs(Phase::Inhale),
            config.phase_secs(Phase::HoldAfterInhale),
            config.phase_secs(Phase::Exhale),
            config.phase_secs(Phase::HoldAfterExhale),
        ),
    )?;
    write_line(out, &rule('-'))?;
    out.flush()
}

/// Ten second lead-in bar. Returns false if cancelled before it finished.
pub fn countdown<C, T, P, W>(
    clock: &C,
    ticker: &T,
    token: &CancelToken,
    poller: &mut P,
    out: &mut W,
) -> io::Result<bool>
where
    C: Clock + ?Sized,
    T: Ticker + ?Sized,
    P: KeyPoller + ?Sized,
    W: Write + ?Sized,
{
    for step in 0..COUNTDOWN_STEPS {
        if token.is_cancelled() {
            return Ok(false);
        }
        if poller.poll_cancel_key() {
            token.cancel();
            return Ok(false);
        }
        let progress = f64::from(step) / f64::from(COUNTDOWN_STEPS);
        let remaining = (f64::from(COUNTDOWN_SECS) * (1.0 - progress)) as u32;
        write!(out, "\rStarting in {remaining}s: {}", bar(progress))?;
        out.flush()?;
        clock.sleep(ticker.interval());
    }

    // trailing spaces clear what's left of a longer line
    write!(out, "\rStarting in 0s: {}    ", bar(1.0))?;
    out.flush()?;
    clock.sleep(COUNTDOWN_PAUSE);

    if token.is_cancelled() {
        return Ok(false);
    }
    if poller.poll_cancel_key() {
        token.cancel();
        return Ok(false);
    }
    write_line(out, "")?;
    write_line(out, "Begin!")?;
    out.flush()?;
    Ok(true)
}
