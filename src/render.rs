use std::io::{self, Write};

pub const BAR_WIDTH: usize = 40;
pub const RULE_WIDTH: usize = 56;
const LABEL_WIDTH: usize = 8;
const FILLED: char = '█';
const EMPTY: char = '░';

/// Number of filled cells for a progress fraction.
pub fn filled_cells(progress: f64) -> usize {
    if progress.is_nan() {
        return 0;
    }
    ((BAR_WIDTH as f64) * progress.clamp(0.0, 1.0)).round() as usize
}

pub fn bar(progress: f64) -> String {
    let filled = filled_cells(progress).min(BAR_WIDTH);
    let mut out = String::with_capacity(BAR_WIDTH * FILLED.len_utf8());
    out.extend(std::iter::repeat(FILLED).take(filled));
    out.extend(std::iter::repeat(EMPTY).take(BAR_WIDTH - filled));
    out
}

/// Redraw the current line in place with `label` and the bar.
pub fn draw_frame<W: Write + ?Sized>(out: &mut W, label: &str, progress: f64) -> io::Result<()> {
    write!(out, "\r{label:<LABEL_WIDTH$}: {}", bar(progress))?;
    out.flush()
}

/// Write a full line. Uses `\r\n` so output stays aligned in raw mode.
pub fn write_line<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    write!(out, "{text}\r\n")
}

pub fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_full() {
        assert_eq!(filled_cells(0.0), 0);
        assert_eq!(filled_cells(1.0), BAR_WIDTH);
    }

    #[test]
    fn half_rounds_to_twenty() {
        assert_eq!(filled_cells(0.5), 20);
    }

    #[test]
    fn rounds_rather_than_truncates() {
        // 40 * 0.49 = 19.6
        assert_eq!(filled_cells(0.49), 20);
        // 40 * 0.013 = 0.52
        assert_eq!(filled_cells(0.013), 1);
        assert_eq!(filled_cells(0.01), 0);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(filled_cells(1.7), BAR_WIDTH);
        assert_eq!(filled_cells(-0.3), 0);
        assert_eq!(filled_cells(f64::NAN), 0);
    }

    #[test]
    fn every_step_is_within_bounds() {
        for step in 0..=1000 {
            let p = step as f64 / 1000.0;
            let filled = filled_cells(p);
            assert!(filled <= BAR_WIDTH);
            assert_eq!(filled, (40.0 * p).round() as usize);
        }
    }

    #[test]
    fn bar_is_fixed_width() {
        for p in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(bar(p).chars().count(), BAR_WIDTH);
        }
        let half = bar(0.5);
        assert_eq!(half.chars().filter(|c| *c == FILLED).count(), 20);
        assert_eq!(half.chars().filter(|c| *c == EMPTY).count(), 20);
    }

    #[test]
    fn frame_redraws_in_place() {
        let mut out = Vec::new();
        draw_frame(&mut out, "Inhale", 0.25).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\rInhale  : "));
        assert!(!text.contains('\n'));
        assert_eq!(text.chars().filter(|c| *c == FILLED).count(), 10);
    }

    #[test]
    fn label_is_padded_to_eight() {
        let mut out = Vec::new();
        draw_frame(&mut out, "Hold", 1.0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\rHold    : "));
    }

    #[test]
    fn lines_end_with_carriage_return() {
        let mut out = Vec::new();
        write_line(&mut out, "Begin!").unwrap();
        assert_eq!(out, b"Begin!\r\n");
    }

    #[test]
    fn rule_width() {
        assert_eq!(rule('=').len(), RULE_WIDTH);
    }
}
