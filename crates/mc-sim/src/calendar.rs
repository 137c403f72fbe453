//! Six-day weeks of fixed-length days.

/// Days per week; `day_index` runs `0..DAYS_PER_WEEK`.
pub const DAYS_PER_WEEK: u8 = 6;

/// Day index on which the mid-week city is founded.
pub const MID_WEEK_DAY: u8 = 3;

/// What a day change triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayChange {
    /// An ordinary new day.
    Day,
    /// The mid-week day; found a city.
    MidWeek,
    /// The week rolled over; place new houses.
    WeekEnd { completed: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    /// Current week, starting at 1.
    pub week: u32,
    pub day_index: u8,
    mid_week_done: bool,
}

impl Default for Calendar {
    fn default() -> Self {
        Self { week: 1, day_index: 0, mid_week_done: false }
    }
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume at a saved position.
    ///
    /// A save taken after the mid-week day does not found that week's city
    /// again.
    pub fn at(week: u32, day_index: u8) -> Self {
        let day_index = day_index.min(DAYS_PER_WEEK - 1);
        Self { week: week.max(1), day_index, mid_week_done: day_index >= MID_WEEK_DAY }
    }

    pub fn advance_day(&mut self) -> DayChange {
        self.day_index += 1;
        if self.day_index >= DAYS_PER_WEEK {
            let completed = self.week;
            self.day_index = 0;
            self.week += 1;
            self.mid_week_done = false;
            return DayChange::WeekEnd { completed };
        }
        if self.day_index == MID_WEEK_DAY && !self.mid_week_done {
            self.mid_week_done = true;
            return DayChange::MidWeek;
        }
        DayChange::Day
    }
}
