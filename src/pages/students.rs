use super::matches;
use crate::models::{Plan, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Exercises,
    /// Only reachable with a student selected
    Assessments,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Exercises, Tab::Assessments];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Exercises => "Exercises",
            Tab::Assessments => "Assessments",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub basic: usize,
    pub premium: usize,
    pub vip: usize,
}

impl PlanCounts {
    pub fn get(&self, plan: Plan) -> usize {
        match plan {
            Plan::Basic => self.basic,
            Plan::Premium => self.premium,
            Plan::Vip => self.vip,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentsPage {
    pub search: String,
    active_tab: Tab,
    selected_id: String,
}

impl StudentsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Students whose name or email contains the search text
    pub fn filtered<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        let needle = self.search.trim();
        students
            .iter()
            .filter(|s| matches(&s.name, needle) || matches(&s.email, needle))
            .collect()
    }

    /// Select `id`, or clear the selection when it is already selected
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected_id == id {
            self.selected_id.clear();
        } else {
            self.selected_id = id.to_string();
        }

        if self.selected_id.is_empty() && self.active_tab == Tab::Assessments {
            self.active_tab = Tab::Dashboard;
        }
    }

    /// Selected student id; empty when nothing is selected
    pub fn selected_id(&self) -> &str {
        &self.selected_id
    }

    pub fn selected<'a>(&self, students: &'a [Student]) -> Option<&'a Student> {
        if self.selected_id.is_empty() {
            return None;
        }
        students.iter().find(|s| s.id == self.selected_id)
    }

    /// Forget the selection when the selected student was deleted
    pub fn on_deleted(&mut self, id: &str) {
        if self.selected_id == id {
            self.selected_id.clear();
            if self.active_tab == Tab::Assessments {
                self.active_tab = Tab::Dashboard;
            }
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Switch tab. Returns `false` when the tab needs a selection that is
    /// missing.
    pub fn set_tab(&mut self, tab: Tab) -> bool {
        if tab == Tab::Assessments && self.selected_id.is_empty() {
            return false;
        }
        self.active_tab = tab;
        true
    }

    pub fn plan_counts(students: &[Student]) -> PlanCounts {
        students.iter().fold(PlanCounts::default(), |mut counts, s| {
            match s.plan {
                Plan::Basic => counts.basic += 1,
                Plan::Premium => counts.premium += 1,
                Plan::Vip => counts.vip += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn student(id: &str, name: &str, email: &str, plan: Plan) -> Student {
        Student {
            id: id.to_string(),
            user_id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            height: 165.0,
            weight: 60.0,
            goal: String::new(),
            plan,
            service_type: None,
            monthly_fee: None,
            portal_access: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("s1", "Ana Souza", "ana@example.com", Plan::Premium),
            student("s2", "Beatriz Lima", "bia@mail.com", Plan::Vip),
            student("s3", "Carla Dias", "carla@example.com", Plan::Basic),
        ]
    }

    #[test]
    fn test_search_matches_name_or_email() {
        let students = roster();
        let mut page = StudentsPage::new();

        page.search = "ANA".to_string();
        let names: Vec<_> = page.filtered(&students).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(names, vec!["s1"]);

        page.search = "example.com".to_string();
        assert_eq!(page.filtered(&students).len(), 2);

        page.search.clear();
        assert_eq!(page.filtered(&students).len(), 3);
    }

    #[test]
    fn test_selecting_twice_clears_selection() {
        let mut page = StudentsPage::new();
        page.toggle_selection("S1");
        assert_eq!(page.selected_id(), "S1");
        page.toggle_selection("S1");
        assert_eq!(page.selected_id(), "");

        page.toggle_selection("S1");
        page.toggle_selection("S2");
        assert_eq!(page.selected_id(), "S2");
    }

    #[test]
    fn test_assessments_tab_needs_selection() {
        let mut page = StudentsPage::new();
        assert!(!page.set_tab(Tab::Assessments));
        assert_eq!(page.active_tab(), Tab::Dashboard);

        page.toggle_selection("s1");
        assert!(page.set_tab(Tab::Assessments));

        page.on_deleted("s1");
        assert_eq!(page.selected_id(), "");
        assert_eq!(page.active_tab(), Tab::Dashboard);
    }

    #[test]
    fn test_plan_counts() {
        let counts = StudentsPage::plan_counts(&roster());
        assert_eq!(counts, PlanCounts { basic: 1, premium: 1, vip: 1 });
        assert_eq!(counts.get(Plan::Vip), 1);
    }
}
