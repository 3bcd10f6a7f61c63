//! Synthetic admission and discharge timestamps

use chrono::{DateTime, Duration, Months, NaiveDateTime, TimeZone, Timelike};
use rand::Rng;

use crate::model::{DateRole, TreatmentCategory};

/// Latest hour of the day an ambulant patient leaves
const AMBULANT_CLOSING_HOUR: u32 = 19;
/// Window for stationary discharges, both ends inclusive
const DISCHARGE_FIRST_HOUR: u32 = 6;
const DISCHARGE_LAST_HOUR: u32 = 10;

/// An ordered pair of instants, `start <= end`
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange<Tz: TimeZone> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl<Tz: TimeZone> DateRange<Tz> {
    /// Build a range. An inverted pair collapses to the degenerate range at `start`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        if end < start {
            Self {
                end: start.clone(),
                start,
            }
        } else {
            Self { start, end }
        }
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        &self.start <= instant && instant <= &self.end
    }
}

/// Same date and hour, minutes/seconds/milliseconds zeroed
pub fn round_down<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let naive = instant.date_naive().and_hms_opt(instant.hour(), 0, 0);
    resolve_local(instant, naive)
}

/// Same date and hour at `:59:59.000`
pub fn round_up<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let naive = instant.date_naive().and_hms_opt(instant.hour(), 59, 59);
    resolve_local(instant, naive)
}

/// Same date at `hour:00:00.000`
pub fn at_hour<Tz: TimeZone>(instant: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let naive = instant.date_naive().and_hms_opt(hour, 0, 0);
    resolve_local(instant, naive)
}

// Wall-clock times skipped by a DST transition fall back to the input instant.
fn resolve_local<Tz: TimeZone>(
    fallback: &DateTime<Tz>,
    naive: Option<NaiveDateTime>,
) -> DateTime<Tz> {
    naive
        .and_then(|n| fallback.timezone().from_local_datetime(&n).earliest())
        .unwrap_or_else(|| fallback.clone())
}

/// Draws synthetic timestamps relative to a fixed reference instant.
///
/// The random source is owned by the generator so callers can seed it.
pub struct DateGenerator<R, Tz: TimeZone> {
    rng: R,
    now: DateTime<Tz>,
}

impl<R: Rng, Tz: TimeZone> DateGenerator<R, Tz> {
    pub fn new(rng: R, now: DateTime<Tz>) -> Self {
        Self { rng, now }
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    /// Base range for entry dates: the last two months up to now
    pub fn entry_range(&self) -> DateRange<Tz> {
        let start = self
            .now
            .clone()
            .checked_sub_months(Months::new(2))
            .unwrap_or_else(|| self.now.clone() - Duration::days(61));
        DateRange::new(start, self.now.clone())
    }

    /// Base range for departure dates: now up to one month ahead
    pub fn departure_range(&self) -> DateRange<Tz> {
        let end = self
            .now
            .clone()
            .checked_add_months(Months::new(1))
            .unwrap_or_else(|| self.now.clone() + Duration::days(31));
        DateRange::new(self.now.clone(), end)
    }

    /// Derive an entry or departure instant for a patient of `category`.
    pub fn derive_date(
        &mut self,
        base: DateRange<Tz>,
        category: &TreatmentCategory,
        role: DateRole,
    ) -> DateTime<Tz> {
        if base.is_degenerate() {
            return base.start;
        }

        let range = self.narrow(base, category, role);
        let drawn = self.draw(&range);

        match (role, category) {
            (DateRole::Departure, TreatmentCategory::Stationary) => {
                let hour = self.rng.random_range(DISCHARGE_FIRST_HOUR..=DISCHARGE_LAST_HOUR);
                at_hour(&drawn, hour)
            }
            (DateRole::Departure, _) => round_down(&drawn),
            (DateRole::Entry, _) => drawn,
        }
    }

    fn narrow(
        &self,
        base: DateRange<Tz>,
        category: &TreatmentCategory,
        role: DateRole,
    ) -> DateRange<Tz> {
        match (category, role) {
            (TreatmentCategory::Ambulant, DateRole::Entry) => {
                DateRange::new(at_hour(&self.now, 0), self.now.clone())
            }
            (TreatmentCategory::Ambulant, DateRole::Departure) => {
                DateRange::new(self.now.clone(), at_hour(&self.now, AMBULANT_CLOSING_HOUR))
            }
            (TreatmentCategory::Stationary, DateRole::Departure) => DateRange::new(
                at_hour(base.start(), DISCHARGE_FIRST_HOUR),
                at_hour(base.end(), DISCHARGE_LAST_HOUR),
            ),
            _ => base,
        }
    }

    fn draw(&mut self, range: &DateRange<Tz>) -> DateTime<Tz> {
        let span = range
            .end
            .clone()
            .signed_duration_since(range.start.clone())
            .num_milliseconds();
        if span <= 0 {
            return range.start.clone();
        }
        let offset = self.rng.random_range(0..=span);
        range.start.clone() + Duration::milliseconds(offset)
    }
}
