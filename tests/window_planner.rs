mod common;

use auditsweep_core::query::{DateRange, Window, WindowPlanner};
use chrono::Duration;
use common::*;

fn plan(from: i64, to: i64, interval_minutes: i64) -> Vec<Window> {
    WindowPlanner::new(Duration::minutes(interval_minutes))
        .unwrap()
        .plan(DateRange::new(at(from), at(to)))
        .collect()
}

#[test]
fn test_even_split() {
    let windows = plan(0, 60, 30);
    assert_eq!(windows, vec![window(0, 30), window(30, 60)]);
    assert!(windows.iter().all(|w| w.duration() == Duration::minutes(30)));
}

#[test]
fn test_last_window_is_clipped() {
    let windows = plan(0, 45, 30);
    assert_eq!(windows, vec![window(0, 30), window(30, 45)]);
}

#[test]
fn test_short_range_is_one_window() {
    for span in [1, 17, 29, 30] {
        let windows = plan(5, 5 + span, 30);
        assert_eq!(windows, vec![window(5, 5 + span)], "span {}", span);
    }
}

#[test]
fn test_windows_tile_the_range() {
    for span in [1i64, 2, 29, 30, 31, 59, 60, 61, 1440, 1441, 10_007] {
        for interval in [1i64, 7, 30, 60, 1440] {
            let windows = plan(0, span, interval);

            let expected = (span + interval - 1) / interval;
            assert_eq!(windows.len() as i64, expected, "span {} interval {}", span, interval);

            assert_eq!(windows.first().unwrap().start, at(0));
            assert_eq!(windows.last().unwrap().end, at(span));
            for pair in windows.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            for w in &windows {
                assert!(w.start < w.end);
                assert!(w.duration() <= Duration::minutes(interval));
            }
        }
    }
}

#[test]
fn test_sub_minute_precision() {
    let planner = WindowPlanner::new(Duration::seconds(90)).unwrap();
    let range = DateRange::new(at(0), at(0) + Duration::seconds(200));
    let windows: Vec<_> = planner.plan(range).collect();
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[2].duration(), Duration::seconds(20));
}

#[test]
fn test_ninety_day_plan_size() {
    let planner = WindowPlanner::new(Duration::minutes(30)).unwrap();
    let range = DateRange::new(at(0), at(0) + Duration::days(90));
    assert_eq!(planner.plan(range).len(), 90 * 48);
}
