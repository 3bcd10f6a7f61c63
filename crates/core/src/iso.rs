//! ISO-8601 date and date-time parsing
//!
//! Accepts the calendar, week and ordinal date forms in both extended and
//! basic notation, each optionally followed by `T`, a time of reduced
//! precision and a UTC offset. The whole input must match; surrounding
//! whitespace is rejected.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

/// Parse an ISO-8601 string into an instant.
///
/// A missing offset is taken as UTC and a missing time as midnight.
/// Malformed strings and out-of-range fields yield `None`.
pub fn parse_iso_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let (date_part, time_part) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };

    let date = parse_date(date_part)?;
    let (time, offset) = match time_part {
        Some(time) => parse_time(time)?,
        None => (NaiveTime::MIN, None),
    };

    let naive = date.and_time(time);
    match offset {
        Some(offset) => offset.from_local_datetime(&naive).single(),
        None => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_calendar_date(s)
        .or_else(|| parse_week_date(s))
        .or_else(|| parse_ordinal_date(s))
}

// YYYY, YYYY-MM, YYYY-MM-DD, YYYYMM, YYYYMMDD, or a signed six-digit year
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let mut cursor = Cursor::new(s);
    let year = cursor.year()?;
    let (mut month, mut day) = (1, 1);

    if let Some(m) = cursor.optional(|c| {
        c.eat(b'-');
        c.digits(2)
    }) {
        month = m;
        if let Some(d) = cursor.optional(|c| {
            c.eat(b'-');
            c.digits(2)
        }) {
            day = d;
        }
    }

    cursor.finish()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// YYYY-Www, YYYY-Www-D, YYYYWww, YYYYWwwD
fn parse_week_date(s: &str) -> Option<NaiveDate> {
    let mut cursor = Cursor::new(s);
    let year = cursor.digits(4)? as i32;
    cursor.eat(b'-');
    if !cursor.eat(b'W') {
        return None;
    }
    let week = cursor.digits(2)?;
    let weekday = cursor
        .optional(|c| {
            c.eat(b'-');
            c.digits(1)
        })
        .unwrap_or(1);

    cursor.finish()?;
    let weekday = Weekday::try_from(u8::try_from(weekday.checked_sub(1)?).ok()?).ok()?;
    NaiveDate::from_isoywd_opt(year, week, weekday)
}

// YYYY-DDD, YYYYDDD
fn parse_ordinal_date(s: &str) -> Option<NaiveDate> {
    let mut cursor = Cursor::new(s);
    let year = cursor.digits(4)? as i32;
    cursor.eat(b'-');
    let ordinal = cursor.digits(3)?;

    cursor.finish()?;
    NaiveDate::from_yo_opt(year, ordinal)
}

// HH, HH:mm, HH:mm:ss, HH:mm:ss.fff (or the basic forms), then an optional offset
fn parse_time(s: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let mut cursor = Cursor::new(s);
    let hour = cursor.digits(2)?;
    let (mut minute, mut second, mut nano) = (0, 0, 0);

    if let Some(m) = cursor.optional(|c| {
        c.eat(b':');
        c.digits(2)
    }) {
        minute = m;
        if let Some(sec) = cursor.optional(|c| {
            c.eat(b':');
            c.digits(2)
        }) {
            second = sec;
            if let Some(fraction) = cursor.optional(|c| {
                if c.eat(b'.') || c.eat(b',') {
                    c.fraction()
                } else {
                    None
                }
            }) {
                nano = fraction;
            }
        }
    }

    let offset = cursor.offset()?;
    cursor.finish()?;
    Some((NaiveTime::from_hms_nano_opt(hour, minute, second, nano)?, offset))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Run `parse`, rewinding if it fails
    fn optional<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let mark = self.pos;
        let parsed = parse(self);
        if parsed.is_none() {
            self.pos = mark;
        }
        parsed
    }

    /// Exactly `n` ASCII digits
    fn digits(&mut self, n: usize) -> Option<u32> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        if !slice.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.pos = end;
        Some(slice.iter().fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
    }

    fn year(&mut self) -> Option<i32> {
        match self.peek() {
            Some(sign @ (b'+' | b'-')) => {
                self.pos += 1;
                let year = self.digits(6)? as i32;
                Some(if sign == b'-' { -year } else { year })
            }
            _ => self.digits(4).map(|y| y as i32),
        }
    }

    /// One or more fraction digits as nanoseconds; digits past the ninth are dropped
    fn fraction(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.bytes[start..self.pos];
        if digits.is_empty() {
            return None;
        }
        let nanos = digits
            .iter()
            .chain(std::iter::repeat(&b'0'))
            .take(9)
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));
        Some(nanos)
    }

    /// `Z`, `+HH`, `+HH:mm` or `+HHmm`. `Some(None)` when no offset is present.
    fn offset(&mut self) -> Option<Option<FixedOffset>> {
        match self.peek() {
            None => Some(None),
            Some(b'Z') => {
                self.pos += 1;
                Some(Some(FixedOffset::east_opt(0)?))
            }
            Some(sign @ (b'+' | b'-')) => {
                self.pos += 1;
                let hours = self.digits(2)? as i32;
                let minutes = self
                    .optional(|c| {
                        c.eat(b':');
                        c.digits(2)
                    })
                    .unwrap_or(0) as i32;
                let seconds = hours * 3600 + minutes * 60;
                let seconds = if sign == b'-' { -seconds } else { seconds };
                Some(Some(FixedOffset::east_opt(seconds)?))
            }
            Some(_) => None,
        }
    }

    fn finish(&self) -> Option<()> {
        (self.pos == self.bytes.len()).then_some(())
    }
}
