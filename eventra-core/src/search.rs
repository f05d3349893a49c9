use chrono::NaiveDate;

use crate::models::Event;

/// Free-text filter for the event list/search read path. A term matches
/// when it is a case-insensitive substring of the title, description,
/// category name, or the rendered event date. Non-admin callers only
/// see events happening today or later.
#[derive(Debug, Clone)]
pub struct EventSearchFilter {
    pub term: String,
    pub include_past: bool,
}

impl EventSearchFilter {
    pub fn new(term: impl Into<String>, include_past: bool) -> Self {
        Self {
            term: term.into(),
            include_past,
        }
    }

    pub fn matches(&self, event: &Event, category_name: &str, today: NaiveDate) -> bool {
        if !self.include_past && event.event_date.date_naive() < today {
            return false;
        }

        // An empty term matches everything, same as the list endpoint.
        let term = self.term.to_lowercase();
        if term.is_empty() {
            return true;
        }

        let date_text = event.event_date.format("%Y-%m-%d %H:%M:%S").to_string();
        event.title.to_lowercase().contains(&term)
            || event.description.to_lowercase().contains(&term)
            || category_name.to_lowercase().contains(&term)
            || date_text.contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    fn event(title: &str, description: &str, event_date: DateTime<Utc>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            category_id: Uuid::new_v4(),
            max_seats: 50,
            booking_start: now,
            booking_end: event_date - Duration::days(1),
            event_date,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matches_title_case_insensitive() {
        let e = event("RustConf Keynote", "opening talk", Utc::now() + Duration::days(2));
        let filter = EventSearchFilter::new("rustconf", false);
        assert!(filter.matches(&e, "Conferences", Utc::now().date_naive()));
    }

    #[test]
    fn matches_category_name() {
        let e = event("Evening Jam", "live session", Utc::now() + Duration::days(2));
        let filter = EventSearchFilter::new("MUSIC", false);
        assert!(filter.matches(&e, "Music", Utc::now().date_naive()));
    }

    #[test]
    fn matches_rendered_event_date() {
        let date = Utc::now() + Duration::days(2);
        let e = event("Evening Jam", "live session", date);
        let filter = EventSearchFilter::new(date.format("%Y-%m-%d").to_string(), false);
        assert!(filter.matches(&e, "Music", Utc::now().date_naive()));
    }

    #[test]
    fn unrelated_term_does_not_match() {
        let e = event("Evening Jam", "live session", Utc::now() + Duration::days(2));
        let filter = EventSearchFilter::new("opera", false);
        assert!(!filter.matches(&e, "Music", Utc::now().date_naive()));
    }

    #[test]
    fn past_events_hidden_from_non_admins() {
        let e = event("Last Year Gala", "archive", Utc::now() - Duration::days(400));
        let today = Utc::now().date_naive();
        assert!(!EventSearchFilter::new("gala", false).matches(&e, "Galas", today));
        assert!(EventSearchFilter::new("gala", true).matches(&e, "Galas", today));
    }

    #[test]
    fn empty_term_matches_upcoming_events() {
        let e = event("Evening Jam", "live session", Utc::now() + Duration::days(2));
        let filter = EventSearchFilter::new("", false);
        assert!(filter.matches(&e, "Music", Utc::now().date_naive()));
    }
}
