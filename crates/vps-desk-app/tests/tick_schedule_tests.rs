//! Integration tests for host-timer schedule generation.

use vps_desk_app::schedule_ticks;
use vps_desk_countdown::LEASE_TICK_INTERVAL_MS;
use vps_desk_gauges::GAUGE_REFRESH_INTERVAL_MS;

#[test]
fn tick_schedule_tests_generates_one_hz_lease_schedule() {
    let times = schedule_ticks(LEASE_TICK_INTERVAL_MS, 1_000, 3).expect("schedule should build");
    assert_eq!(times, vec![1_000, 2_000, 3_000]);
}

#[test]
fn tick_schedule_tests_generates_five_second_gauge_schedule() {
    let times = schedule_ticks(GAUGE_REFRESH_INTERVAL_MS, 0, 3).expect("schedule should build");
    assert_eq!(times, vec![0, 5_000, 10_000]);
    assert!(schedule_ticks(0, 0, 3).is_err());
}
