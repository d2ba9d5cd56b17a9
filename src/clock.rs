use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Current time at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Current time, nudged forward if it would not land after `previous`.
pub fn now_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// ISO-8601 form used when a timestamp is written into a JSON column.
pub fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_after_is_strictly_later() {
        let future = now() + Duration::seconds(30);
        assert!(now_after(future) > future);

        let past = now() - Duration::seconds(30);
        assert!(now_after(past) > past);
    }

    #[test]
    fn now_has_microsecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
    }
}
