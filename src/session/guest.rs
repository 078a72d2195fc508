use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

use super::model::{GuestRecord, GUEST_DISPLAY_NAME, GUEST_PREFIX};
use super::ports::Clock;

static LAST_GUEST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Next guest timestamp: the clock reading, bumped past the last one issued.
fn next_guest_millis(now: i64) -> i64 {
    let mut issued = now;
    // fetch_update retries on contention so concurrent mints never collide.
    let _ = LAST_GUEST_MILLIS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        issued = now.max(last + 1);
        Some(issued)
    });
    issued
}

pub fn mint_guest<C: Clock + ?Sized>(clock: &C) -> GuestRecord {
    let millis = next_guest_millis(clock.now_millis());
    let created_at = OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    GuestRecord {
        id: format!("{GUEST_PREFIX}{millis}"),
        display_name: GUEST_DISPLAY_NAME.to_string(),
        is_guest: true,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ports::FixedClock;

    fn suffix(id: &str) -> i64 {
        id.strip_prefix(GUEST_PREFIX)
            .expect("guest prefix")
            .parse()
            .expect("numeric suffix")
    }

    #[test]
    fn guest_ids_are_prefixed_and_flagged() {
        let g = mint_guest(&FixedClock(1_700_000_000_000));
        assert!(g.id.starts_with("guest-"));
        assert!(g.is_guest);
        assert_eq!(g.display_name, "Guest");
    }

    #[test]
    fn same_tick_mints_strictly_increase() {
        let clock = FixedClock(1_700_000_000_000);
        let ids: Vec<i64> = (0..50).map(|_| suffix(&mint_guest(&clock).id)).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "{} !> {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn clock_going_backwards_still_increases() {
        let a = suffix(&mint_guest(&FixedClock(1_800_000_000_000)).id);
        let b = suffix(&mint_guest(&FixedClock(1_000)).id);
        assert!(b > a);
    }

    #[test]
    fn concurrent_mints_never_collide() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let clock = FixedClock(1_900_000_000_000);
                    (0..100).map(|_| mint_guest(&clock).id).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread"))
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
