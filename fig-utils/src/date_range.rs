use chrono::NaiveDate;

/// Every calendar day from the start date through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Number of days the range covers; zero when start is after end.
    pub fn day_count(&self) -> usize {
        let days = (self.1 - self.0).num_days() + 1;
        usize::try_from(days).unwrap_or(0)
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0 <= *date && *date <= self.1
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            None => self.1 = NaiveDate::MIN,
        }
        Some(current)
    }
}
