use std::cmp;

use serde::{Deserialize, Serialize};

use super::travel_cost_matrix::Time;

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    earliest: Time,
    latest: Time,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow {
            earliest: 0,
            latest: Time::MAX,
        }
    }
}

impl TimeWindow {
    pub fn new(earliest: Time, latest: Time) -> Self {
        TimeWindow { earliest, latest }
    }

    pub fn earliest(&self) -> Time {
        self.earliest
    }

    pub fn latest(&self) -> Time {
        self.latest
    }
}

impl TimeWindow {
    pub fn is_satisfied(&self, arrival: Time) -> bool {
        arrival <= self.latest
    }

    /// Time at which service can begin; waiting is free.
    #[inline(always)]
    pub fn service_start(&self, arrival: Time) -> Time {
        cmp::max(arrival, self.earliest)
    }

    #[inline(always)]
    pub fn overtime(&self, arrival: Time) -> Time {
        if arrival > self.latest {
            arrival - self.latest
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let window = TimeWindow::default();
        assert_eq!(window.service_start(12), 12);
        assert_eq!(window.overtime(1_000_000), 0);
        assert!(window.is_satisfied(Time::MAX));
    }

    #[test]
    fn test_waiting_does_not_move_time_backward() {
        let window = TimeWindow::new(10, 20);
        assert_eq!(window.service_start(4), 10);
        assert_eq!(window.service_start(15), 15);
    }

    #[test]
    fn test_overtime() {
        let window = TimeWindow::new(0, 5);
        assert_eq!(window.overtime(8), 3);
        assert_eq!(window.overtime(5), 0);
        assert!(!window.is_satisfied(6));
    }
}
