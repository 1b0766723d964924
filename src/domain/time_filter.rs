use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFilter {
    Last24h,
    Last72h,
    PastWeek,
    PastMonth,
    #[default]
    Any,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 5] = [
        TimeFilter::Any,
        TimeFilter::Last24h,
        TimeFilter::Last72h,
        TimeFilter::PastWeek,
        TimeFilter::PastMonth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::Last24h => "Last 24h",
            TimeFilter::Last72h => "Last 72h",
            TimeFilter::PastWeek => "Past Week",
            TimeFilter::PastMonth => "Past Month",
            TimeFilter::Any => "Any",
        }
    }

    pub fn hours(&self) -> Option<u32> {
        match self {
            TimeFilter::Last24h => Some(24),
            TimeFilter::Last72h => Some(72),
            TimeFilter::PastWeek => Some(168),
            TimeFilter::PastMonth => Some(720),
            TimeFilter::Any => None,
        }
    }

    pub fn days(&self) -> Option<u32> {
        self.hours().map(|h| h.div_ceil(24))
    }

    pub fn parse(label: &str) -> Option<TimeFilter> {
        let label = label.trim();
        if label.is_empty() {
            return Some(TimeFilter::Any);
        }
        TimeFilter::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
