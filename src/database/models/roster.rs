use std::collections::HashSet;

use chrono::NaiveDate;

use crate::database::models::entry::Entry;
use crate::error::RosterError;
use crate::utils::datetime::format_date;
use crate::utils::validation::{
    validate_display_name, validate_session_date, validate_session_place, validate_session_time,
};

/// Capacity of the two lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLimits {
    pub max_main: usize,
    pub max_reserve: usize,
}

impl RosterLimits {
    /// Production limits.
    pub const STANDARD: RosterLimits = RosterLimits { max_main: 20, max_reserve: 10 };
    /// Reduced limits for trying the bot out with a handful of accounts.
    pub const TEST: RosterLimits = RosterLimits { max_main: 3, max_reserve: 2 };

    pub fn total(&self) -> usize {
        self.max_main + self.max_reserve
    }
}

impl Default for RosterLimits {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Free-text metadata of the upcoming training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub date: String,
    pub time: String,
    pub place: String,
}

/// Values a fresh session starts with. The date is always "today".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub time: String,
    pub place: String,
}

impl SessionDefaults {
    pub fn session_on(&self, date: NaiveDate) -> SessionInfo {
        SessionInfo {
            date: format_date(&date),
            time: self.time.clone(),
            place: self.place.clone(),
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            time: "20:45".to_string(),
            place: "Main hall".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Main,
    Reserve,
}

impl ListKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Main => "main list",
            ListKind::Reserve => "reserve",
        }
    }
}

/// Where a new entry landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub list: ListKind,
    /// 1-based position within `list`.
    pub position: usize,
    pub capacity: usize,
}

/// Result of taking an entry off the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub entry: Entry,
    pub from: ListKind,
    /// Reserve entry moved into the main list to fill the freed slot.
    pub promoted: Option<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Date,
    Time,
    Place,
}

/// The single active training roster.
///
/// All mutating methods validate first and only then touch the lists, so a
/// returned error always leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterState {
    pub main: Vec<Entry>,
    pub reserve: Vec<Entry>,
    pub session: SessionInfo,
    pub registration_open: bool,
}

impl RosterState {
    pub fn new(session: SessionInfo) -> Self {
        Self {
            main: Vec::new(),
            reserve: Vec::new(),
            session,
            registration_open: true,
        }
    }

    pub fn fresh(defaults: &SessionDefaults, today: NaiveDate) -> Self {
        Self::new(defaults.session_on(today))
    }

    pub fn total(&self) -> usize {
        self.main.len() + self.reserve.len()
    }

    /// Both lists in display order; index `i` here is participant number `i + 1`.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.main.iter().chain(self.reserve.iter())
    }

    /// Participant number `index` (1-based, main list first).
    pub fn entry_at(&self, index: usize) -> Option<&Entry> {
        index.checked_sub(1).and_then(|i| self.entries().nth(i))
    }

    /// List and 1-based position of the user's entry, if any.
    pub fn find_user(&self, user_id: i64) -> Option<(ListKind, usize)> {
        let lookup = |list: &[Entry]| list.iter().position(|e| e.user_id() == Some(user_id));
        if let Some(idx) = lookup(&self.main) {
            return Some((ListKind::Main, idx + 1));
        }
        lookup(&self.reserve).map(|idx| (ListKind::Reserve, idx + 1))
    }

    /// Self-registration by a Telegram user.
    pub fn register(
        &mut self,
        limits: RosterLimits,
        user_id: i64,
        display_name: &str,
        username: Option<String>,
        registered_at: &str,
    ) -> Result<Placement, RosterError> {
        if !self.registration_open {
            return Err(RosterError::RegistrationClosed);
        }
        if self.find_user(user_id).is_some() {
            return Err(RosterError::DuplicateUser);
        }
        let name = self.check_name(display_name)?;
        let entry = Entry::self_registered(user_id, name, username, registered_at);
        self.insert(limits, entry)
    }

    /// Administrator-added participant without a Telegram account.
    ///
    /// Not gated by `registration_open`.
    pub fn add_manual(
        &mut self,
        limits: RosterLimits,
        display_name: &str,
        registered_at: &str,
    ) -> Result<Placement, RosterError> {
        let name = self.check_name(display_name)?;
        self.insert(limits, Entry::manual(name, registered_at))
    }

    /// Removes the caller's own entry, promoting from the reserve if a main
    /// slot was freed.
    pub fn cancel(&mut self, user_id: i64) -> Result<Removal, RosterError> {
        let owned_by = |e: &Entry| !e.is_manual() && e.user_id() == Some(user_id);

        if let Some(idx) = self.main.iter().position(owned_by) {
            let entry = self.main.remove(idx);
            let promoted = self.promote();
            return Ok(Removal { entry, from: ListKind::Main, promoted });
        }

        if let Some(idx) = self.reserve.iter().position(owned_by) {
            let entry = self.reserve.remove(idx);
            return Ok(Removal { entry, from: ListKind::Reserve, promoted: None });
        }

        Err(RosterError::NotRegistered)
    }

    /// Removes participant number `index` (1-based over main then reserve).
    pub fn remove_by_index(&mut self, index: usize) -> Result<Removal, RosterError> {
        let total = self.total();
        if index == 0 || index > total {
            return Err(RosterError::IndexOutOfRange { index, total });
        }

        if index <= self.main.len() {
            let entry = self.main.remove(index - 1);
            let promoted = self.promote();
            Ok(Removal { entry, from: ListKind::Main, promoted })
        } else {
            let entry = self.reserve.remove(index - 1 - self.main.len());
            Ok(Removal { entry, from: ListKind::Reserve, promoted: None })
        }
    }

    /// Like `remove_by_index`, but only if participant `index` is still the
    /// entry with fingerprint `tag`.
    pub fn remove_tagged(&mut self, index: usize, tag: u32) -> Result<Removal, RosterError> {
        match self.entry_at(index) {
            None => Err(RosterError::IndexOutOfRange { index, total: self.total() }),
            Some(entry) if entry.tag() != tag => Err(RosterError::RosterChanged { index }),
            Some(_) => self.remove_by_index(index),
        }
    }

    pub fn set_field(&mut self, field: SessionField, value: &str) -> Result<(), RosterError> {
        match field {
            SessionField::Date => {
                let date = validate_session_date(value)?;
                self.session.date = format_date(&date);
            }
            SessionField::Time => {
                let time = validate_session_time(value)?;
                self.session.time = time.format("%H:%M").to_string();
            }
            SessionField::Place => {
                self.session.place = validate_session_place(value)?.to_string();
            }
        }
        Ok(())
    }

    pub fn set_registration_open(&mut self, open: bool) {
        self.registration_open = open;
    }

    /// Restores the list invariants on a state that came from disk or from
    /// an older configuration with different limits.
    ///
    /// Duplicate user ids keep their first occurrence, free main slots are
    /// filled from the reserve, main overflow moves to the front of the
    /// reserve, and whatever still does not fit is returned.
    pub fn normalize(&mut self, limits: RosterLimits) -> Vec<Entry> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();

        for list in [&mut self.main, &mut self.reserve] {
            let mut kept = Vec::with_capacity(list.len());
            for entry in list.drain(..) {
                match entry.user_id() {
                    Some(id) if !seen.insert(id) => dropped.push(entry),
                    _ => kept.push(entry),
                }
            }
            *list = kept;
        }

        if self.main.len() > limits.max_main {
            let mut overflow = self.main.split_off(limits.max_main);
            overflow.append(&mut self.reserve);
            self.reserve = overflow;
        }

        while self.main.len() < limits.max_main && !self.reserve.is_empty() {
            let next = self.reserve.remove(0);
            self.main.push(next);
        }

        if self.reserve.len() > limits.max_reserve {
            dropped.extend(self.reserve.split_off(limits.max_reserve));
        }

        dropped
    }

    fn check_name<'a>(&self, display_name: &'a str) -> Result<&'a str, RosterError> {
        let name = validate_display_name(display_name)?;
        if self.entries().any(|e| e.has_name(name)) {
            return Err(RosterError::DuplicateName(name.to_string()));
        }
        Ok(name)
    }

    fn insert(&mut self, limits: RosterLimits, entry: Entry) -> Result<Placement, RosterError> {
        if self.main.len() < limits.max_main {
            self.main.push(entry);
            Ok(Placement {
                list: ListKind::Main,
                position: self.main.len(),
                capacity: limits.max_main,
            })
        } else if self.reserve.len() < limits.max_reserve {
            self.reserve.push(entry);
            Ok(Placement {
                list: ListKind::Reserve,
                position: self.reserve.len(),
                capacity: limits.max_reserve,
            })
        } else {
            Err(RosterError::CapacityExceeded)
        }
    }

    fn promote(&mut self) -> Option<Entry> {
        if self.reserve.is_empty() {
            return None;
        }
        let promoted = self.reserve.remove(0);
        self.main.push(promoted.clone());
        Some(promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: RosterLimits = RosterLimits { max_main: 2, max_reserve: 1 };

    fn state() -> RosterState {
        RosterState::new(SessionInfo {
            date: "2024-05-14".to_string(),
            time: "20:45".to_string(),
            place: "Main hall".to_string(),
        })
    }

    fn names(list: &[Entry]) -> Vec<&str> {
        list.iter().map(|e| e.display_name.as_str()).collect()
    }

    #[test]
    fn test_register_fills_main_then_reserve() {
        let mut roster = state();
        let a = roster.register(LIMITS, 1, "A", None, "10:00").unwrap();
        let b = roster.register(LIMITS, 2, "B", None, "10:01").unwrap();
        let c = roster.register(LIMITS, 3, "C", None, "10:02").unwrap();

        assert_eq!(a, Placement { list: ListKind::Main, position: 1, capacity: 2 });
        assert_eq!(b.position, 2);
        assert_eq!(c, Placement { list: ListKind::Reserve, position: 1, capacity: 1 });
    }

    #[test]
    fn test_register_over_capacity_leaves_state_unchanged() {
        let mut roster = state();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
            roster.register(LIMITS, id, name, None, "10:00").unwrap();
        }
        let before = roster.clone();

        assert_eq!(
            roster.register(LIMITS, 4, "D", None, "10:00"),
            Err(RosterError::CapacityExceeded)
        );
        assert_eq!(roster, before);
    }

    #[test]
    fn test_register_closed() {
        let mut roster = state();
        roster.set_registration_open(false);
        assert_eq!(
            roster.register(LIMITS, 1, "A", None, "10:00"),
            Err(RosterError::RegistrationClosed)
        );
        assert_eq!(roster.total(), 0);
    }

    #[test]
    fn test_register_duplicate_user_and_name() {
        let mut roster = state();
        roster.register(LIMITS, 1, "Anna", None, "10:00").unwrap();

        assert_eq!(
            roster.register(LIMITS, 1, "Other", None, "10:00"),
            Err(RosterError::DuplicateUser)
        );
        assert_eq!(
            roster.register(LIMITS, 2, " anna ", None, "10:00"),
            Err(RosterError::DuplicateName("anna".to_string()))
        );
        assert_eq!(names(&roster.main), vec!["Anna"]);
    }

    #[test]
    fn test_register_stores_trimmed_name() {
        let mut roster = state();
        roster.register(LIMITS, 1, "  Anna  ", Some("anna".to_string()), "10:00").unwrap();
        assert_eq!(roster.main[0].display_name, "Anna");
        assert_eq!(roster.main[0].username(), Some("anna"));
    }

    #[test]
    fn test_cancel_promotes_first_reserve() {
        let mut roster = state();
        let limits = RosterLimits { max_main: 2, max_reserve: 3 };
        for (id, name) in [(1, "A"), (2, "B"), (3, "C"), (4, "D")] {
            roster.register(limits, id, name, None, "10:00").unwrap();
        }

        let removal = roster.cancel(1).unwrap();
        assert_eq!(removal.from, ListKind::Main);
        assert_eq!(removal.promoted.map(|e| e.display_name), Some("C".to_string()));
        assert_eq!(names(&roster.main), vec!["B", "C"]);
        assert_eq!(names(&roster.reserve), vec!["D"]);
    }

    #[test]
    fn test_cancel_from_reserve_does_not_promote() {
        let mut roster = state();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
            roster.register(LIMITS, id, name, None, "10:00").unwrap();
        }

        let removal = roster.cancel(3).unwrap();
        assert_eq!(removal.from, ListKind::Reserve);
        assert!(removal.promoted.is_none());
        assert_eq!(names(&roster.main), vec!["A", "B"]);
        assert!(roster.reserve.is_empty());
    }

    #[test]
    fn test_cancel_twice() {
        let mut roster = state();
        roster.register(LIMITS, 1, "A", None, "10:00").unwrap();
        assert!(roster.cancel(1).is_ok());
        assert_eq!(roster.cancel(1), Err(RosterError::NotRegistered));
    }

    #[test]
    fn test_manual_entry_bypasses_closed_registration() {
        let mut roster = state();
        roster.set_registration_open(false);
        let placement = roster.add_manual(LIMITS, "Guest", "10:00").unwrap();
        assert_eq!(placement.list, ListKind::Main);
        assert!(roster.main[0].is_manual());
    }

    #[test]
    fn test_manual_entry_respects_name_uniqueness() {
        let mut roster = state();
        roster.register(LIMITS, 1, "Guest", None, "10:00").unwrap();
        assert_eq!(
            roster.add_manual(LIMITS, "GUEST", "10:00"),
            Err(RosterError::DuplicateName("GUEST".to_string()))
        );
    }

    #[test]
    fn test_remove_by_index_spans_both_lists() {
        let mut roster = state();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
            roster.register(LIMITS, id, name, None, "10:00").unwrap();
        }

        let removal = roster.remove_by_index(3).unwrap();
        assert_eq!(removal.entry.display_name, "C");
        assert_eq!(removal.from, ListKind::Reserve);
        assert_eq!(roster.total(), 2);
    }

    #[test]
    fn test_remove_manual_from_main_promotes() {
        let mut roster = state();
        roster.add_manual(LIMITS, "Guest", "10:00").unwrap();
        roster.register(LIMITS, 2, "B", None, "10:00").unwrap();
        roster.register(LIMITS, 3, "C", None, "10:00").unwrap();

        let removal = roster.remove_by_index(1).unwrap();
        assert!(removal.entry.is_manual());
        assert_eq!(removal.promoted.and_then(|e| e.user_id()), Some(3));
        assert_eq!(names(&roster.main), vec!["B", "C"]);
    }

    #[test]
    fn test_remove_tagged_refuses_shifted_slot() {
        let mut roster = state();
        for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
            roster.register(LIMITS, id, name, None, "10:00").unwrap();
        }
        let tag_of_b = roster.entry_at(2).unwrap().tag();

        // A leaves, so B moves to slot 1 and C now holds slot 2
        roster.cancel(1).unwrap();
        assert_eq!(roster.remove_tagged(2, tag_of_b), Err(RosterError::RosterChanged { index: 2 }));
        assert_eq!(names(&roster.main), vec!["B", "C"]);

        let removal = roster.remove_tagged(1, tag_of_b).unwrap();
        assert_eq!(removal.entry.display_name, "B");
        assert_eq!(
            roster.remove_tagged(5, tag_of_b),
            Err(RosterError::IndexOutOfRange { index: 5, total: 1 })
        );
    }

    #[test]
    fn test_remove_by_index_out_of_range() {
        let mut roster = state();
        roster.register(LIMITS, 1, "A", None, "10:00").unwrap();
        assert_eq!(
            roster.remove_by_index(0),
            Err(RosterError::IndexOutOfRange { index: 0, total: 1 })
        );
        assert_eq!(
            roster.remove_by_index(2),
            Err(RosterError::IndexOutOfRange { index: 2, total: 1 })
        );
        assert_eq!(roster.total(), 1);
    }

    #[test]
    fn test_set_field_validates() {
        let mut roster = state();
        roster.set_field(SessionField::Date, "2024-06-01").unwrap();
        roster.set_field(SessionField::Time, "9:05").unwrap();
        roster.set_field(SessionField::Place, "  Stadium  ").unwrap();
        assert_eq!(roster.session.date, "2024-06-01");
        assert_eq!(roster.session.time, "09:05");
        assert_eq!(roster.session.place, "Stadium");

        let before = roster.clone();
        assert_eq!(
            roster.set_field(SessionField::Date, "June 1st"),
            Err(RosterError::InvalidDate("June 1st".to_string()))
        );
        assert_eq!(roster, before);
    }

    #[test]
    fn test_normalize_fills_main_and_drops_overflow() {
        let mut roster = state();
        roster.main = vec![Entry::manual("A", "")];
        roster.reserve = vec![
            Entry::manual("B", ""),
            Entry::manual("C", ""),
            Entry::manual("D", ""),
        ];

        let dropped = roster.normalize(LIMITS);
        assert_eq!(names(&roster.main), vec!["A", "B"]);
        assert_eq!(names(&roster.reserve), vec!["C"]);
        assert_eq!(names(&dropped), vec!["D"]);
    }

    #[test]
    fn test_normalize_moves_main_overflow_to_reserve_front() {
        let mut roster = state();
        roster.main = vec![Entry::manual("A", ""), Entry::manual("B", ""), Entry::manual("C", "")];
        roster.reserve = vec![];

        let dropped = roster.normalize(LIMITS);
        assert!(dropped.is_empty());
        assert_eq!(names(&roster.main), vec!["A", "B"]);
        assert_eq!(names(&roster.reserve), vec!["C"]);
    }

    #[test]
    fn test_normalize_removes_duplicate_users() {
        let mut roster = state();
        roster.main = vec![Entry::self_registered(1, "A", None, "")];
        roster.reserve = vec![Entry::self_registered(1, "A again", None, "")];

        let dropped = roster.normalize(LIMITS);
        assert_eq!(names(&roster.main), vec!["A"]);
        assert_eq!(names(&dropped), vec!["A again"]);
    }
}
