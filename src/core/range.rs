use crate::domain::model::{DateRange, Window};
use chrono::{Days, NaiveDate};

/// 單一視窗最多涵蓋的天數（end - start）
pub const MAX_WINDOW_DAYS: u64 = 90;

/// 為了降低單次結果集的大小，從區間尾端往回每 90 天切一段
#[derive(Debug, Clone)]
pub struct RangeWalker {
    start_date: NaiveDate,
    next_end: Option<NaiveDate>,
    window_days: u64,
}

impl RangeWalker {
    pub fn new(range: DateRange) -> Self {
        Self::with_window_days(range, MAX_WINDOW_DAYS)
    }

    pub fn with_window_days(range: DateRange, window_days: u64) -> Self {
        Self {
            start_date: range.start_date(),
            next_end: Some(range.end_date()),
            window_days,
        }
    }
}

impl Iterator for RangeWalker {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let end = self.next_end?;
        let start = end
            .checked_sub_days(Days::new(self.window_days))
            .map_or(self.start_date, |candidate| candidate.max(self.start_date));

        // 已經碰到區間起點，這是最後一個視窗
        self.next_end = if start == self.start_date {
            None
        } else {
            start.pred_opt()
        };

        Some(Window { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn walk(start: NaiveDate, end: NaiveDate) -> Vec<Window> {
        RangeWalker::new(DateRange::new(start, end).unwrap()).collect()
    }

    fn assert_covers(windows: &[Window], start: NaiveDate, end: NaiveDate) {
        assert!(!windows.is_empty());
        assert_eq!(windows[0].end, end);
        assert_eq!(windows[windows.len() - 1].start, start);

        for window in windows {
            assert!(window.start <= window.end);
            assert!(window.span_days() <= MAX_WINDOW_DAYS as i64);
        }

        // 相鄰視窗必須首尾相接，不重疊也不留空隙
        for pair in windows.windows(2) {
            assert_eq!(pair[1].end.succ_opt().unwrap(), pair[0].start);
        }
    }

    #[test]
    fn test_single_day_range_yields_one_window() {
        let day = date(2013, 1, 1);
        let windows = walk(day, day);
        assert_eq!(windows, vec![Window { start: day, end: day }]);
    }

    #[test]
    fn test_short_range_is_one_clamped_window() {
        let windows = walk(date(2013, 1, 1), date(2013, 1, 31));
        assert_eq!(
            windows,
            vec![Window {
                start: date(2013, 1, 1),
                end: date(2013, 1, 31)
            }]
        );
    }

    #[test]
    fn test_exactly_ninety_days_is_one_window() {
        let windows = walk(date(2013, 1, 1), date(2013, 4, 1));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].span_days(), 90);
    }

    #[test]
    fn test_ninety_one_days_needs_two_windows() {
        let windows = walk(date(2013, 1, 1), date(2013, 4, 2));
        assert_eq!(
            windows,
            vec![
                Window {
                    start: date(2013, 1, 2),
                    end: date(2013, 4, 2)
                },
                Window {
                    start: date(2013, 1, 1),
                    end: date(2013, 1, 1)
                },
            ]
        );
    }

    #[test]
    fn test_windows_walk_backward_from_end() {
        let windows = walk(date(2012, 1, 1), date(2013, 1, 1));
        assert_eq!(windows.len(), 5);
        assert!(windows.windows(2).all(|w| w[0].start > w[1].end));
        assert_covers(&windows, date(2012, 1, 1), date(2013, 1, 1));
    }

    #[test]
    fn test_windows_cover_range_exactly_for_many_ranges() {
        let base = date(2011, 11, 17);
        for offset in [0u64, 1, 45, 89, 90, 91, 180, 181, 182, 365, 1000] {
            let end = base.checked_add_days(Days::new(offset)).unwrap();
            let windows = walk(base, end);
            assert_covers(&windows, base, end);

            let covered: i64 = windows.iter().map(|w| w.span_days() + 1).sum();
            assert_eq!(covered, offset as i64 + 1);
        }
    }

    #[test]
    fn test_walker_is_exhausted_after_last_window() {
        let mut walker = RangeWalker::new(DateRange::new(date(2013, 1, 1), date(2013, 1, 1)).unwrap());
        assert!(walker.next().is_some());
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_custom_window_width() {
        let range = DateRange::new(date(2013, 1, 1), date(2013, 1, 10)).unwrap();
        let windows: Vec<Window> = RangeWalker::with_window_days(range, 4).collect();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, date(2013, 1, 6));
        assert_covers(&windows, date(2013, 1, 1), date(2013, 1, 10));
    }
}
