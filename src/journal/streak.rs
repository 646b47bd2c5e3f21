use chrono::NaiveDate;

/// Compute the current journaling streak from the calendar dates the user
/// has journaled on, sorted most-recent-first.
///
/// The streak is the length of the maximal consecutive-day run ending at the
/// most recent entry date. Multiple entries on the same day count as one day.
/// A streak lapses (returns 0) once the most recent entry is more than one
/// day before `today`.
pub fn compute_streak(entry_dates: &[NaiveDate], today: NaiveDate) -> u32 {
    // Collapse same-day duplicates; input is sorted, so duplicates are adjacent.
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(entry_dates.len());
    for date in entry_dates {
        if dates.last() != Some(date) {
            dates.push(*date);
        }
    }

    let Some(&latest) = dates.first() else {
        return 0;
    };

    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1u32;
    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() - Duration::days(offset)
    }

    #[test]
    fn test_empty_dates_is_zero() {
        assert_eq!(compute_streak(&[], day(0)), 0);
    }

    #[test]
    fn test_single_entry_today() {
        assert_eq!(compute_streak(&[day(0)], day(0)), 1);
    }

    #[test]
    fn test_single_entry_yesterday_not_yet_lapsed() {
        assert_eq!(compute_streak(&[day(1)], day(0)), 1);
    }

    #[test]
    fn test_single_entry_two_days_ago_lapsed() {
        assert_eq!(compute_streak(&[day(2)], day(0)), 0);
    }

    #[test]
    fn test_streak_stops_at_first_gap() {
        // today, -1, -2, then a gap before -5: only the leading run counts.
        let dates = [day(0), day(1), day(2), day(5)];
        assert_eq!(compute_streak(&dates, day(0)), 3);
    }

    #[test]
    fn test_later_run_does_not_revive_lapsed_streak() {
        // A long consecutive run further back is irrelevant once the most
        // recent entry is more than one day old.
        let dates = [day(3), day(4), day(5), day(6)];
        assert_eq!(compute_streak(&dates, day(0)), 0);
    }

    #[test]
    fn test_streak_equals_consecutive_prefix_length() {
        let dates = [day(1), day(2), day(3), day(4), day(8), day(9)];
        assert_eq!(compute_streak(&dates, day(0)), 4);
    }

    #[test]
    fn test_same_day_duplicates_count_once() {
        let dates = [day(0), day(0), day(1), day(1), day(2)];
        assert_eq!(compute_streak(&dates, day(0)), 3);
    }

    #[test]
    fn test_duplicates_do_not_break_adjacency_scan() {
        // Without dedup the (day 0, day 0) pair would show a difference of 0
        // and incorrectly end the streak at 1.
        let dates = [day(0), day(0), day(1)];
        assert_eq!(compute_streak(&dates, day(0)), 2);
    }

    #[test]
    fn test_streak_anchored_at_most_recent_entry() {
        // Property from the contract: for a non-empty deduplicated list,
        // compute_streak(d, d[0]) is the maximal consecutive-day prefix.
        let dates = [day(2), day(3), day(4), day(7)];
        assert_eq!(compute_streak(&dates, day(2)), 3);
    }
}
