use chrono::{DateTime, Duration, Utc};

/// Per-dataset cooldown between computation passes.
///
/// There is no stored state flag: the gate is cooling while `now` is before
/// `next_run_time` and ready otherwise.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScheduleGate {
    next_run_time: Option<DateTime<Utc>>,
}

impl ScheduleGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn may_run(&self, now: DateTime<Utc>) -> bool {
        match self.next_run_time {
            None => true,
            Some(next_run_time) => now >= next_run_time,
        }
    }

    pub fn mark_ran(&mut self, now: DateTime<Utc>, period: Duration) {
        self.next_run_time = Some(
            now.checked_add_signed(period)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
    }

    pub fn next_run_time(&self) -> Option<DateTime<Utc>> {
        self.next_run_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_initially_ready() {
        let gate = ScheduleGate::new();
        assert!(gate.may_run(t0()));
        assert!(gate.next_run_time().is_none());
    }

    #[test]
    fn test_cooldown() {
        let mut gate = ScheduleGate::new();
        let period = Duration::seconds(10);
        gate.mark_ran(t0(), period);

        assert!(!gate.may_run(t0()));
        assert!(!gate.may_run(t0() + Duration::seconds(5)));
        assert!(gate.may_run(t0() + period));
        assert!(gate.may_run(t0() + Duration::seconds(20)));
        assert_eq!(gate.next_run_time(), Some(t0() + period));
    }

    #[test]
    fn test_zero_period_always_ready() {
        let mut gate = ScheduleGate::new();
        gate.mark_ran(t0(), Duration::zero());
        assert!(gate.may_run(t0()));
    }

    #[test]
    fn test_may_run_does_not_mutate() {
        let mut gate = ScheduleGate::new();
        gate.mark_ran(t0(), Duration::seconds(10));
        let before = gate.clone();

        gate.may_run(t0() + Duration::seconds(30));
        assert_eq!(gate, before);
    }
}
