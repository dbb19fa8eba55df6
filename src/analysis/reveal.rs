use std::time::{Duration, Instant};

/// Progressive disclosure of a string, one character (Unicode scalar) per step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reveal {
    #[default]
    Idle,
    /// `shown` is a byte offset that always sits on a char boundary of `text`.
    Revealing { text: String, shown: usize },
    Done { text: String },
}

impl Reveal {
    pub fn start(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::Done { text }
        } else {
            Self::Revealing { text, shown: 0 }
        }
    }

    /// Reveal up to `n` more characters. Returns how many were actually revealed.
    pub fn step(&mut self, n: usize) -> usize {
        let Self::Revealing { text, shown } = self else {
            return 0;
        };
        let mut revealed = 0;
        for ch in text[*shown..].chars().take(n) {
            *shown += ch.len_utf8();
            revealed += 1;
        }
        if *shown >= text.len() {
            let text = std::mem::take(text);
            *self = Self::Done { text };
        }
        revealed
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn visible(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Revealing { text, shown } => &text[..*shown],
            Self::Done { text } => text,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Revealing { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Turns elapsed wall time into whole reveal steps at a fixed rate.
#[derive(Debug, Clone)]
pub struct RevealClock {
    tick: Duration,
    last: Option<Instant>,
}

impl RevealClock {
    pub fn new(tick: Duration) -> Self {
        Self { tick, last: None }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    pub fn due_steps(&mut self, now: Instant) -> usize {
        let Some(last) = self.last else {
            return 0;
        };
        if self.tick.is_zero() {
            self.last = Some(now);
            return usize::MAX;
        }
        let elapsed = now.saturating_duration_since(last);
        let steps = elapsed.as_nanos() / self.tick.as_nanos();
        if steps == 0 {
            return 0;
        }
        // Carry the remainder so the rate stays fixed across uneven frames.
        let consumed = self.tick.as_nanos() * steps;
        self.last = Some(last + Duration::from_nanos(consumed.min(u64::MAX as u128) as u64));
        usize::try_from(steps).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_char_per_step_until_done() {
        let mut r = Reveal::start("abc");
        assert_eq!(r.visible(), "");
        assert_eq!(r.step(1), 1);
        assert_eq!(r.visible(), "a");
        assert_eq!(r.step(5), 2);
        assert!(r.is_done());
        assert_eq!(r.visible(), "abc");
        assert_eq!(r.step(1), 0);
    }

    #[test]
    fn steps_over_multibyte_chars() {
        let text = "市场📈 up";
        let mut r = Reveal::start(text);
        r.step(3);
        assert_eq!(r.visible(), "市场📈");
        r.step(usize::MAX);
        assert_eq!(r.visible(), text);
        assert!(r.is_done());
    }

    #[test]
    fn empty_text_is_immediately_done() {
        let r = Reveal::start("");
        assert!(r.is_done());
        assert_eq!(r.visible(), "");
    }

    #[test]
    fn cancel_mid_reveal() {
        let mut r = Reveal::start("hello");
        r.step(2);
        assert_eq!(r.visible(), "he");
        r.cancel();
        assert_eq!(r, Reveal::Idle);
        assert_eq!(r.visible(), "");
    }

    #[test]
    fn clock_converts_elapsed_time_to_steps() {
        let t0 = Instant::now();
        let mut clock = RevealClock::new(Duration::from_millis(10));
        assert_eq!(clock.due_steps(t0), 0);

        clock.reset(t0);
        assert_eq!(clock.due_steps(t0 + Duration::from_millis(9)), 0);
        assert_eq!(clock.due_steps(t0 + Duration::from_millis(25)), 2);
        // 5ms remainder carried over from the previous call.
        assert_eq!(clock.due_steps(t0 + Duration::from_millis(30)), 1);
    }
}
