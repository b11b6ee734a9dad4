//! Client-side roster view
//!
//! A client holds exactly one cached roster. Every pull response and every
//! pushed snapshot replaces it wholesale; nothing is merged. Grouping,
//! counting and search are pure derivations of that cache and never touch
//! the network.

use crate::models::{Grade, GradeCounts, StudentRecord};

/// Disposable local copy of the roster
#[derive(Debug, Clone, Default)]
pub struct RosterView {
    students: Vec<StudentRecord>,
}

impl RosterView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached roster
    pub fn replace(&mut self, roster: Vec<StudentRecord>) {
        self.students = roster;
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn grade_counts(&self) -> GradeCounts {
        GradeCounts::from_records(&self.students)
    }

    /// Records whose names or contact contain `text` (case-insensitive)
    ///
    /// Blank text matches everything. Roster order is preserved.
    pub fn filter(&self, text: &str) -> Vec<&StudentRecord> {
        let needle = text.trim().to_lowercase();
        self.students
            .iter()
            .filter(|s| needle.is_empty() || matches_search(s, &needle))
            .collect()
    }

    /// Records grouped by grade in enumeration order; empty grades are omitted
    pub fn grouped_by_grade(&self) -> Vec<(Grade, Vec<&StudentRecord>)> {
        Grade::ALL
            .into_iter()
            .filter_map(|grade| {
                let members: Vec<&StudentRecord> =
                    self.students.iter().filter(|s| s.grade == grade).collect();
                (!members.is_empty()).then_some((grade, members))
            })
            .collect()
    }
}

fn matches_search(student: &StudentRecord, needle: &str) -> bool {
    [
        &student.full_name,
        &student.father_name,
        &student.mother_name,
        &student.contact,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(name: &str, grade: Grade, contact: &str) -> StudentRecord {
        let now = Utc::now();
        StudentRecord {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 5, 1).unwrap(),
            grade,
            father_name: "Sunil".to_string(),
            mother_name: "Kumari".to_string(),
            contact: contact.to_string(),
            photo_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_view() -> RosterView {
        let mut view = RosterView::new();
        view.replace(vec![
            record("Amal", Grade::Six, "0711111111"),
            record("Nimal", Grade::Six, "0722222222"),
            record("Kasun", Grade::Nine, "0733333333"),
        ]);
        view
    }

    #[test]
    fn test_replace_discards_previous_roster() {
        let mut view = sample_view();
        let fresh = vec![record("Ruwan", Grade::Ten, "0744444444")];
        view.replace(fresh.clone());

        assert_eq!(view.students(), fresh.as_slice());
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_grade_counts() {
        let counts = sample_view().grade_counts();
        assert_eq!(counts.get(Grade::Six), 2);
        assert_eq!(counts.get(Grade::Nine), 1);
        assert_eq!(counts.get(Grade::Eleven), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_filter_case_insensitive_and_ordered() {
        let view = sample_view();
        let names: Vec<_> = view.filter("MAL").iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Amal", "Nimal"]);
    }

    #[test]
    fn test_filter_matches_contact_and_parents() {
        let view = sample_view();
        assert_eq!(view.filter("0733").len(), 1);
        assert_eq!(view.filter("kumari").len(), 3);
    }

    #[test]
    fn test_filter_blank_returns_all() {
        let view = sample_view();
        assert_eq!(view.filter("   ").len(), 3);
        assert!(view.filter("zzz").is_empty());
    }

    #[test]
    fn test_grouped_by_grade_skips_empty_grades() {
        let view = sample_view();
        let groups = view.grouped_by_grade();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Grade::Six);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Grade::Nine);
    }

    #[test]
    fn test_empty_view() {
        let view = RosterView::new();
        assert!(view.is_empty());
        assert!(view.grouped_by_grade().is_empty());
        assert_eq!(view.grade_counts().total(), 0);
    }
}
