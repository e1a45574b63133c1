//! Property-based tests for core types.

use idgate_types::{RecordStatus, TaskStatus, Timestamp};
use proptest::prelude::*;

proptest! {
    #[test]
    fn task_status_display_parse_round_trip(raw in "[a-z_]{1,24}") {
        let status = TaskStatus::parse(&raw);
        prop_assert_eq!(TaskStatus::parse(&status.to_string()), status);
    }

    #[test]
    fn timestamp_ist_rendering_round_trips(secs in 0i64..4_102_444_800i64) {
        let dt = chrono::DateTime::from_timestamp(secs, 0).unwrap();
        let ts = Timestamp::from_utc(dt);
        let back = Timestamp::parse(&ts.to_ist_string()).unwrap();
        prop_assert_eq!(back, ts);
    }
}

#[test]
fn record_status_terminal_partition() {
    let all = [
        RecordStatus::Pending,
        RecordStatus::Completed,
        RecordStatus::Failed,
        RecordStatus::VerificationFailed,
    ];
    let terminal = all.iter().filter(|s| s.is_terminal()).count();
    assert_eq!(terminal, 3);
}
