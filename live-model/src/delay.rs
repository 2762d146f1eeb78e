use std::fmt::{Display, Formatter};

/// A parsed upstream delay such as `PT2M5S` or `-PT30S`.
///
/// Only the hour, minute, second and day designators are read; fractional
/// parts are dropped and anything unreadable counts as zero, so every input
/// yields a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delay {
    pub early: bool,
    pub seconds: u32,
}

impl Delay {
    pub fn parse(raw: &str) -> Delay {
        let raw = raw.trim();
        let (early, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let mut seconds: u32 = 0;
        let mut digits: u32 = 0;
        let mut in_fraction = false;
        for c in body.chars() {
            match c {
                '0'..='9' if !in_fraction => {
                    digits = digits.saturating_mul(10).saturating_add(c as u32 - '0' as u32);
                }
                '0'..='9' => {}
                '.' | ',' => in_fraction = true,
                _ => {
                    let unit = match c {
                        'D' => 86_400,
                        'H' => 3_600,
                        'M' => 60,
                        'S' => 1,
                        _ => 0,
                    };
                    seconds = seconds.saturating_add(digits.saturating_mul(unit));
                    digits = 0;
                    in_fraction = false;
                }
            }
        }

        Delay { early, seconds }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }

    pub fn is_early(&self) -> bool {
        self.early && !self.is_zero()
    }

    pub fn is_late(&self) -> bool {
        !self.early && !self.is_zero()
    }

    /// Whole minutes, hours folded in.
    pub fn minutes(&self) -> u32 {
        self.seconds / 60
    }

    pub fn remainder_seconds(&self) -> u32 {
        self.seconds % 60
    }
}

impl From<&str> for Delay {
    fn from(value: &str) -> Self {
        Delay::parse(value)
    }
}

impl Display for Delay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("On Time");
        }

        let mut parts = Vec::with_capacity(2);
        if self.minutes() > 0 {
            parts.push(format!("{} min", self.minutes()));
        }
        if self.remainder_seconds() > 0 {
            parts.push(format!("{} s", self.remainder_seconds()));
        }
        let text = parts.join(" ");

        if self.early {
            write!(f, "Early by {}", text)
        } else {
            write!(f, "Late by {}", text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Delay;

    #[test]
    fn zero_sentinels() {
        assert!(Delay::parse("PT0S").is_zero());
        assert!(Delay::parse("-PT0S").is_zero());
        assert!(Delay::parse("PT0M0S").is_zero());
        assert!(Delay::parse("").is_zero());
        assert!(Delay::parse("garbage").is_zero());
    }

    #[test]
    fn minutes_and_seconds() {
        let delay = Delay::parse("PT2M5S");
        assert_eq!(125, delay.seconds);
        assert!(delay.is_late());
        assert!(!delay.is_early());

        let delay = Delay::parse("-PT30S");
        assert_eq!(30, delay.seconds);
        assert!(delay.is_early());

        assert_eq!(3_660, Delay::parse("PT1H1M").seconds);
        assert_eq!(12, Delay::parse("PT12.75S").seconds);
    }

    #[test]
    fn display() {
        assert_eq!("On Time", Delay::parse("PT0S").to_string());
        assert_eq!("Late by 2 min 5 s", Delay::parse("PT2M5S").to_string());
        assert_eq!("Early by 30 s", Delay::parse("-PT30S").to_string());
        assert_eq!("Late by 3 min", Delay::parse("PT3M").to_string());
    }
}
