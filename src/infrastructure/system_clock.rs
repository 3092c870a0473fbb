//! The production `Clock` adapter (A2): reads the real system clock via
//! `chrono`. Tests should inject a fixed `Clock` implementation instead.

use chrono::{DateTime, Local, Utc};

use crate::domain::Clock;

/// Reads wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_utc_and_now_local_agree_on_the_same_instant() {
        let clock = SystemClock;
        let utc = clock.now_utc();
        let local = clock.now_local();
        assert_eq!(utc.timestamp(), local.timestamp());
    }
}
