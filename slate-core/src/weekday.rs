//! Weekday set for recurrence patterns.
//!
//! Internally a fixed boolean array indexed Mon..Sun. The legacy bitmask
//! encoding (Mon=1, Tue=2, Wed=4, Thu=8, Fri=16, Sat=32, Sun=64) exists only
//! at the persistence boundary.

use anyhow::{Result, bail};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekdaySet([bool; 7]);

impl WeekdaySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|d| *d)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0[day.num_days_from_monday() as usize] = true;
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        let mut set = Self::empty();
        for d in days {
            set.insert(*d);
        }
        set
    }

    /// Decode the stored bitmask. Bits above Sun are ignored.
    pub fn from_bitmask(mask: i64) -> Self {
        let mut set = Self::empty();
        for i in 0..7 {
            if mask & (1 << i) != 0 {
                set.0[i] = true;
            }
        }
        set
    }

    /// Encode for storage (Mon=1 .. Sun=64).
    pub fn bitmask(&self) -> i64 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| 1_i64 << i)
            .sum()
    }

    /// Parse a comma-separated day list like "mon,wed" (full names accepted).
    pub fn parse(s: &str) -> Result<Self> {
        let mut set = Self::empty();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            set.insert(parse_day(part)?);
        }
        Ok(set)
    }
}

fn parse_day(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thur" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => bail!("unknown weekday '{other}'"),
    }
}

impl std::fmt::Display for WeekdaySet {
    /// "Mon, Wed" style, matching the original display encoding.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (i, on) in self.0.iter().enumerate() {
            if *on {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(DAY_NAMES[i])?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for WeekdaySet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        WeekdaySet::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_matches_legacy_encoding() {
        let set = WeekdaySet::from_days(&[Weekday::Mon, Weekday::Wed]);
        assert_eq!(set.bitmask(), 1 + 4);

        let sun = WeekdaySet::from_days(&[Weekday::Sun]);
        assert_eq!(sun.bitmask(), 64);
    }

    #[test]
    fn bitmask_round_trips() {
        let set = WeekdaySet::from_days(&[Weekday::Tue, Weekday::Fri, Weekday::Sun]);
        assert_eq!(WeekdaySet::from_bitmask(set.bitmask()), set);
    }

    #[test]
    fn parses_comma_list() {
        let set: WeekdaySet = "mon, Wednesday,fri".parse().unwrap();
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Sat));
        assert!("mon,noday".parse::<WeekdaySet>().is_err());
    }

    #[test]
    fn displays_in_week_order() {
        let set = WeekdaySet::from_days(&[Weekday::Wed, Weekday::Mon]);
        assert_eq!(set.to_string(), "Mon, Wed");
        assert_eq!(WeekdaySet::empty().to_string(), "");
    }
}
