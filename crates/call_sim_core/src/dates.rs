//! Weekday sampling over an inclusive calendar range.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

use crate::error::PipelineError;

/// Upper bound on rejection-sampling draws. Any range that passes the
/// weekday pre-check accepts a draw with probability at least 1/3.
pub const MAX_WEEKDAY_DRAWS: u32 = 1_000;

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True when `[start, end]` holds at least one Monday-Friday date.
pub fn range_has_weekday(start: NaiveDate, end: NaiveDate) -> bool {
    if start > end {
        return false;
    }
    // Three consecutive days always include a weekday.
    if (end - start).num_days() >= 2 {
        return true;
    }
    start.iter_days().take_while(|day| *day <= end).any(is_weekday)
}

/// Draws a uniform offset into `[start, end]` and keeps the first draw that
/// lands on a weekday.
pub fn random_weekday<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut R,
) -> Result<NaiveDate, PipelineError> {
    if start > end {
        return Err(PipelineError::InvalidDateRange { start, end });
    }
    if !range_has_weekday(start, end) {
        return Err(PipelineError::NoWeekdayInRange { start, end });
    }

    let span_days = (end - start).num_days();
    for _ in 0..MAX_WEEKDAY_DRAWS {
        let candidate = start + Duration::days(rng.gen_range(0..=span_days));
        if is_weekday(candidate) {
            return Ok(candidate);
        }
    }
    Err(PipelineError::NoWeekdayInRange { start, end })
}
