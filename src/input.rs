use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use tracing::{debug, warn};

/// Non-blocking check for a quit request from the keyboard.
pub trait KeyPoller {
    /// Returns true if a cancel key was pressed since the last call.
    /// Must never block.
    fn poll_cancel_key(&mut self) -> bool;
}

impl<P: KeyPoller + ?Sized> KeyPoller for &mut P {
    fn poll_cancel_key(&mut self) -> bool {
        (**self).poll_cancel_key()
    }
}

impl<P: KeyPoller + ?Sized> KeyPoller for Box<P> {
    fn poll_cancel_key(&mut self) -> bool {
        (**self).poll_cancel_key()
    }
}

/// `q`, `Q`, Esc, or Ctrl+C (which arrives as a key while in raw mode).
pub fn is_cancel_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    matches!(
        key.code,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
    )
}

/// Poller used when the terminal can't be read without blocking.
/// Cancellation then relies on signals alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPoller;

impl KeyPoller for NoopPoller {
    fn poll_cancel_key(&mut self) -> bool {
        false
    }
}

/// Poller driven by a closure, handy for scripted input.
pub struct PollFn<F>(pub F);

impl<F: FnMut() -> bool> KeyPoller for PollFn<F> {
    fn poll_cancel_key(&mut self) -> bool {
        (self.0)()
    }
}

/// Raw-mode terminal poller. Raw mode is restored when dropped.
#[derive(Debug)]
pub struct TerminalPoller {
    failed: bool,
}

impl TerminalPoller {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { failed: false })
    }

    fn drain(&mut self) -> io::Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if is_cancel_key(&key) {
                    debug!(code = ?key.code, "cancel key pressed");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl KeyPoller for TerminalPoller {
    fn poll_cancel_key(&mut self) -> bool {
        if self.failed {
            return false;
        }
        match self.drain() {
            Ok(pressed) => pressed,
            Err(err) => {
                warn!(%err, "keyboard polling failed, relying on signals");
                self.failed = true;
                false
            }
        }
    }
}

impl Drop for TerminalPoller {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Pick the best poller for the current stdin.
pub fn terminal_poller() -> Box<dyn KeyPoller> {
    if !io::stdin().is_tty() {
        debug!("stdin is not a tty, key polling disabled");
        return Box::new(NoopPoller);
    }
    match TerminalPoller::enable() {
        Ok(poller) => Box::new(poller),
        Err(err) => {
            warn!(%err, "could not enable raw mode, relying on signals");
            Box::new(NoopPoller)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_cancel() {
        assert!(is_cancel_key(&key(KeyCode::Char('q'))));
        assert!(is_cancel_key(&key(KeyCode::Char('Q'))));
        assert!(is_cancel_key(&key(KeyCode::Esc)));
    }

    #[test]
    fn ctrl_c_cancels() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(is_cancel_key(&ctrl_c));
        assert!(!is_cancel_key(&key(KeyCode::Char('c'))));
    }

    #[test]
    fn other_keys_are_ignored() {
        for code in [
            KeyCode::Char('a'),
            KeyCode::Char(' '),
            KeyCode::Enter,
            KeyCode::Backspace,
            KeyCode::Up,
        ] {
            assert!(!is_cancel_key(&key(code)));
        }
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert!(!is_cancel_key(&release));
    }

    #[test]
    fn noop_never_cancels() {
        let mut poller = NoopPoller;
        for _ in 0..10 {
            assert!(!poller.poll_cancel_key());
        }
    }

    fn poll_once<P: KeyPoller>(mut poller: P) -> bool {
        poller.poll_cancel_key()
    }

    #[test]
    fn poll_fn_through_mut_ref_and_box() {
        let mut calls = 0;
        let mut poller = PollFn(|| {
            calls += 1;
            calls == 2
        });
        assert!(!poll_once(&mut poller));
        assert!(poll_once(&mut poller));

        let boxed: Box<dyn KeyPoller> = Box::new(NoopPoller);
        assert!(!poll_once(boxed));
    }
}
