use chrono::{DateTime, Utc};

use crate::core::session::SessionData;
use crate::shared::constants::{LAST_VISIT_KEY, VISITS_KEY};

fn parse_last_visit(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Update the session's visit counter for a request made at `now`.
///
/// When at least one full day has passed since `last_visit`, the count goes
/// up by one and `last_visit` moves to `now`. Otherwise the count is reset
/// to 1 and `last_visit` keeps its stored value. Missing or unreadable
/// values fall back to `visits = 1` and `last_visit = now`.
///
/// Returns the visit count written back to the session.
pub fn visitor_cookie_handler(session: &mut SessionData, now: DateTime<Utc>) -> i64 {
    let visits = session.get::<i64>(VISITS_KEY).unwrap_or(1);

    let last_visit = match session.get::<String>(LAST_VISIT_KEY) {
        Some(raw) => parse_last_visit(&raw).unwrap_or_else(|| {
            tracing::debug!("Ignoring malformed last_visit value: {:?}", raw);
            now
        }),
        None => now,
    };

    let (visits, last_visit) = if (now - last_visit).num_days() > 0 {
        (visits + 1, now)
    } else {
        (1, last_visit)
    };

    session.insert(VISITS_KEY, visits);
    session.insert(LAST_VISIT_KEY, last_visit.to_rfc3339());
    visits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn session_with(visits: i64, last_visit: DateTime<Utc>) -> SessionData {
        let mut session = SessionData::default();
        session.insert(VISITS_KEY, visits);
        session.insert(LAST_VISIT_KEY, last_visit.to_rfc3339());
        session
    }

    #[test]
    fn test_first_visit_starts_at_one() {
        let mut session = SessionData::default();
        let now = at(10, 12);

        assert_eq!(visitor_cookie_handler(&mut session, now), 1);
        assert_eq!(session.get::<i64>(VISITS_KEY), Some(1));
        assert_eq!(session.get::<String>(LAST_VISIT_KEY), Some(now.to_rfc3339()));
        assert!(session.is_modified());
    }

    #[test]
    fn test_visit_after_more_than_a_day_increments() {
        let last = at(8, 9);
        let now = at(10, 12);
        let mut session = session_with(4, last);

        assert_eq!(visitor_cookie_handler(&mut session, now), 5);
        assert_eq!(session.get::<String>(LAST_VISIT_KEY), Some(now.to_rfc3339()));
    }

    #[test]
    fn test_exactly_one_day_counts_as_a_new_day() {
        let last = at(9, 12);
        let now = last + Duration::days(1);
        let mut session = session_with(2, last);

        assert_eq!(visitor_cookie_handler(&mut session, now), 3);
    }

    #[test]
    fn test_same_day_visit_resets_to_one_and_keeps_last_visit() {
        let last = at(10, 8);
        let now = at(10, 20);
        let mut session = session_with(7, last);

        assert_eq!(visitor_cookie_handler(&mut session, now), 1);
        assert_eq!(session.get::<String>(LAST_VISIT_KEY), Some(last.to_rfc3339()));
    }

    #[test]
    fn test_just_under_a_day_is_same_day() {
        let last = at(9, 12);
        let now = last + Duration::hours(23) + Duration::minutes(59);
        let mut session = session_with(3, last);

        assert_eq!(visitor_cookie_handler(&mut session, now), 1);
        assert_eq!(session.get::<String>(LAST_VISIT_KEY), Some(last.to_rfc3339()));
    }

    #[test]
    fn test_last_visit_in_future_is_same_day() {
        let now = at(10, 12);
        let mut session = session_with(3, at(12, 12));

        assert_eq!(visitor_cookie_handler(&mut session, now), 1);
    }

    #[test]
    fn test_malformed_last_visit_is_treated_as_now() {
        let now = at(10, 12);
        let mut session = SessionData::default();
        session.insert(VISITS_KEY, 6);
        session.insert(LAST_VISIT_KEY, "yesterday-ish");

        assert_eq!(visitor_cookie_handler(&mut session, now), 1);
        assert_eq!(session.get::<String>(LAST_VISIT_KEY), Some(now.to_rfc3339()));
    }

    #[test]
    fn test_malformed_visits_falls_back_to_default() {
        let last = at(1, 0);
        let now = at(10, 12);
        let mut session = SessionData::default();
        session.insert(VISITS_KEY, "lots");
        session.insert(LAST_VISIT_KEY, last.to_rfc3339());

        assert_eq!(visitor_cookie_handler(&mut session, now), 2);
    }
}
