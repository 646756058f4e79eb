use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::models::{Event, EventLocation};
use crate::utils::error::AppError;

/// Two half-open intervals `[s1, e1)` and `[s2, e2)` intersect. Touching
/// endpoints do not count as overlap.
pub fn intervals_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && s2 < e1
}

/// Validated input for a create operation.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: EventLocation,
    pub description: String,
}

/// Per-field changes for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<EventLocation>,
    pub description: Option<String>,
    pub last_update: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct EventStatistics {
    pub total: usize,
    pub current_week: usize,
    pub current_month: usize,
    pub per_day: BTreeMap<NaiveDate, usize>,
}

struct StoreInner {
    events: BTreeMap<u32, Event>,
    // Monotonic; never reset on delete so ids are never reused.
    next_id: u32,
}

/// The in-memory event table. One lock around every operation keeps the
/// check-then-insert sequences atomic under concurrent requests; no await
/// happens while the lock is held.
pub struct EventStore {
    inner: Mutex<StoreInner>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                events: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned lock only means a panic mid-operation; the table itself
        // is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self, draft: EventDraft, now: NaiveDateTime) -> Result<Event, AppError> {
        if draft.start_time >= draft.end_time {
            return Err(AppError::Validation(
                "Event start time must be before its end time.".to_string(),
            ));
        }

        let mut inner = self.lock();

        for event in inner.events.values() {
            if event.date == draft.date
                && intervals_overlap(
                    event.start_time,
                    event.end_time,
                    draft.start_time,
                    draft.end_time,
                )
            {
                return Err(AppError::Conflict(
                    "Event time is overlapping with an existing event.".to_string(),
                ));
            }
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let event = Event {
            id,
            name: draft.name,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location: draft.location,
            description: draft.description,
            last_update: now,
        };
        inner.events.insert(id, event.clone());

        info!(id, date = %event.date, "Event created");
        Ok(event)
    }

    pub fn get(&self, id: u32) -> Option<Event> {
        self.lock().events.get(&id).cloned()
    }

    /// All events in id order.
    pub fn snapshot(&self) -> Vec<Event> {
        self.lock().events.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    /// Nearest date-neighbours of an event: previous holds the largest date
    /// strictly before it, next the smallest date on or after it (self
    /// excluded). Scanned in id order, so the first-seen event wins ties.
    /// Returns `None` when the id itself is absent.
    pub fn neighbors(&self, id: u32) -> Option<(Option<u32>, Option<u32>)> {
        let inner = self.lock();
        let date = inner.events.get(&id)?.date;

        let mut previous: Option<&Event> = None;
        let mut next: Option<&Event> = None;
        for event in inner.events.values() {
            if event.id == id {
                continue;
            }
            if event.date < date {
                if previous.map_or(true, |p| p.date < event.date) {
                    previous = Some(event);
                }
            } else if next.map_or(true, |n| n.date > event.date) {
                next = Some(event);
            }
        }

        Some((previous.map(|e| e.id), next.map(|e| e.id)))
    }

    pub fn update(
        &self,
        id: u32,
        patch: EventPatch,
        now: NaiveDateTime,
    ) -> Result<Event, AppError> {
        let mut inner = self.lock();

        let mut updated = inner
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Event with ID {id} not found.")))?;

        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        if let Some(start_time) = patch.start_time {
            updated.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            updated.end_time = end_time;
        }
        if let Some(location) = patch.location {
            updated.location = location;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        // Callers may pin last_update explicitly; otherwise it tracks the
        // patch itself.
        updated.last_update = patch.last_update.unwrap_or(now);

        if updated.start_time >= updated.end_time {
            return Err(AppError::Validation(
                "Event start time must be before its end time.".to_string(),
            ));
        }

        for event in inner.events.values() {
            if event.id != id
                && event.date == updated.date
                && intervals_overlap(
                    event.start_time,
                    event.end_time,
                    updated.start_time,
                    updated.end_time,
                )
            {
                return Err(AppError::Conflict(
                    "Event time is overlapping with an existing event.".to_string(),
                ));
            }
        }

        inner.events.insert(id, updated.clone());

        info!(id, "Event updated");
        Ok(updated)
    }

    pub fn delete(&self, id: u32) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.events.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Event with ID {id} not found.")));
        }

        info!(id, "Event deleted");
        Ok(())
    }

    /// Aggregate counts relative to `today`: the Monday-based week and the
    /// calendar month containing it, plus a per-day histogram.
    pub fn statistics(&self, today: NaiveDate) -> EventStatistics {
        let inner = self.lock();

        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_end = week_start + Duration::days(6);

        let mut current_week = 0;
        let mut current_month = 0;
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for event in inner.events.values() {
            if event.date >= week_start && event.date <= week_end {
                current_week += 1;
            }
            if event.date.year() == today.year() && event.date.month() == today.month() {
                current_month += 1;
            }
            *per_day.entry(event.date).or_insert(0) += 1;
        }

        EventStatistics {
            total: inner.events.len(),
            current_week,
            current_month,
            per_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> EventLocation {
        EventLocation {
            street: "215B Night Av".to_string(),
            suburb: "Kensington".to_string(),
            state: "NSW".to_string(),
            post_code: "2033".to_string(),
        }
    }

    fn draft(name: &str, date: &str, from: &str, to: &str) -> EventDraft {
        EventDraft {
            name: name.to_string(),
            date: NaiveDate::parse_from_str(date, "%d-%m-%Y").unwrap(),
            start_time: NaiveTime::parse_from_str(from, "%H:%M:%S").unwrap(),
            end_time: NaiveTime::parse_from_str(to, "%H:%M:%S").unwrap(),
            location: location(),
            description: String::new(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn overlap_rule_uses_half_open_intervals() {
        let t = |s: &str| NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap();
        assert!(intervals_overlap(
            t("09:00:00"),
            t("10:00:00"),
            t("09:30:00"),
            t("10:30:00")
        ));
        // Touching endpoints are fine.
        assert!(!intervals_overlap(
            t("09:00:00"),
            t("10:00:00"),
            t("10:00:00"),
            t("11:00:00")
        ));
        // Containment overlaps.
        assert!(intervals_overlap(
            t("09:00:00"),
            t("12:00:00"),
            t("10:00:00"),
            t("11:00:00")
        ));
    }

    #[test]
    fn create_rejects_overlap_on_same_date() {
        let store = EventStore::new();
        store
            .create(draft("one", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        let err = store
            .create(draft("two", "01-07-2024", "09:30:00", "10:30:00"), now())
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn touching_intervals_both_succeed() {
        let store = EventStore::new();
        store
            .create(draft("one", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        store
            .create(draft("two", "01-07-2024", "10:00:00", "11:00:00"), now())
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn same_interval_on_other_date_succeeds() {
        let store = EventStore::new();
        store
            .create(draft("one", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        store
            .create(draft("two", "02-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_rejects_inverted_interval() {
        let store = EventStore::new();
        let err = store
            .create(draft("bad", "01-07-2024", "11:00:00", "10:00:00"), now())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn sequential_creates_get_sequential_ids() {
        let store = EventStore::new();
        for (i, day) in ["01-07-2024", "02-07-2024", "03-07-2024"].into_iter().enumerate() {
            let event = store
                .create(draft("e", day, "09:00:00", "10:00:00"), now())
                .unwrap();
            assert_eq!(event.id, i as u32 + 1);
        }
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let store = EventStore::new();
        store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        let b = store
            .create(draft("b", "02-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        store.delete(1).unwrap();

        let c = store
            .create(draft("c", "03-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        // Count-based assignment would hand out 2 again and collide with b.
        assert_eq!(c.id, 3);
        assert_ne!(c.id, b.id);
    }

    #[test]
    fn delete_unknown_id_is_not_found_and_leaves_table_alone() {
        let store = EventStore::new();
        store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        let err = store.delete(42).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_after_delete_is_gone() {
        let store = EventStore::new();
        let event = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        store.delete(event.id).unwrap();
        assert!(store.get(event.id).is_none());
    }

    #[test]
    fn patch_merges_fields_and_bumps_last_update() {
        let store = EventStore::new();
        let created = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        let later = now() + Duration::hours(2);
        let patch = EventPatch {
            name: Some("renamed".to_string()),
            ..EventPatch::default()
        };
        let updated = store.update(created.id, patch, later).unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.last_update, later);
    }

    #[test]
    fn patch_with_explicit_last_update_keeps_it() {
        let store = EventStore::new();
        let created = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        let pinned = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let patch = EventPatch {
            last_update: Some(pinned),
            ..EventPatch::default()
        };
        let updated = store.update(created.id, patch, now()).unwrap();
        assert_eq!(updated.last_update, pinned);
    }

    #[test]
    fn patch_rejects_overlap_with_other_event() {
        let store = EventStore::new();
        store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        let b = store
            .create(draft("b", "01-07-2024", "11:00:00", "12:00:00"), now())
            .unwrap();

        let patch = EventPatch {
            start_time: NaiveTime::from_hms_opt(9, 30, 0),
            end_time: NaiveTime::from_hms_opt(10, 30, 0),
            ..EventPatch::default()
        };
        let err = store.update(b.id, patch, now()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Rejected patch must not be committed.
        assert_eq!(
            store.get(b.id).unwrap().start_time,
            NaiveTime::from_hms_opt(11, 0, 0).unwrap()
        );
    }

    #[test]
    fn patch_may_keep_its_own_slot() {
        let store = EventStore::new();
        let a = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        // Shrinking within the original interval only "overlaps" itself.
        let patch = EventPatch {
            start_time: NaiveTime::from_hms_opt(9, 15, 0),
            ..EventPatch::default()
        };
        assert!(store.update(a.id, patch, now()).is_ok());
    }

    #[test]
    fn patch_rejects_inverted_merged_interval() {
        let store = EventStore::new();
        let a = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        let patch = EventPatch {
            end_time: NaiveTime::from_hms_opt(8, 0, 0),
            ..EventPatch::default()
        };
        let err = store.update(a.id, patch, now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn patch_unknown_id_is_not_found() {
        let store = EventStore::new();
        let err = store.update(9, EventPatch::default(), now()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn neighbors_pick_nearest_dates() {
        let store = EventStore::new();
        let a = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        let b = store
            .create(draft("b", "10-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        let c = store
            .create(draft("c", "20-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();

        assert_eq!(store.neighbors(b.id), Some((Some(a.id), Some(c.id))));
        assert_eq!(store.neighbors(a.id), Some((None, Some(b.id))));
        assert_eq!(store.neighbors(c.id), Some((Some(b.id), None)));
    }

    #[test]
    fn same_date_event_counts_as_next_not_previous() {
        let store = EventStore::new();
        let a = store
            .create(draft("a", "01-07-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        let b = store
            .create(draft("b", "01-07-2024", "11:00:00", "12:00:00"), now())
            .unwrap();

        assert_eq!(store.neighbors(a.id), Some((None, Some(b.id))));
        assert_eq!(store.neighbors(b.id), Some((None, Some(a.id))));
    }

    #[test]
    fn neighbors_of_unknown_id_is_none() {
        let store = EventStore::new();
        assert_eq!(store.neighbors(1), None);
    }

    #[test]
    fn statistics_bucket_week_month_and_days() {
        let store = EventStore::new();
        // 12-06-2024 is a Wednesday; its week runs 10-06 to 16-06.
        for day in ["10-06-2024", "12-06-2024", "16-06-2024", "20-06-2024"] {
            store
                .create(draft("e", day, "09:00:00", "10:00:00"), now())
                .unwrap();
        }
        store
            .create(draft("far", "01-09-2024", "09:00:00", "10:00:00"), now())
            .unwrap();
        // Two on the same day.
        store
            .create(draft("e2", "12-06-2024", "11:00:00", "12:00:00"), now())
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let stats = store.statistics(today);

        assert_eq!(stats.total, 6);
        assert_eq!(stats.current_week, 4);
        assert_eq!(stats.current_month, 5);
        assert_eq!(
            stats.per_day.get(&today).copied(),
            Some(2),
            "both same-day events counted"
        );
    }
}
