use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    number_text, parse_date, parse_flag, parse_number, FieldErrors, FormErrors, FormField, FormModel,
};
use crate::models::{NewStudent, Plan, Student, StudentPatch};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

pub(crate) fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StudentField {
    Name,
    Email,
    Phone,
    BirthDate,
    Height,
    Weight,
    Goal,
    Plan,
    ServiceType,
    MonthlyFee,
    PortalAccess,
}

impl FormField for StudentField {
    const ALL: &'static [Self] = &[
        StudentField::Name,
        StudentField::Email,
        StudentField::Phone,
        StudentField::BirthDate,
        StudentField::Height,
        StudentField::Weight,
        StudentField::Goal,
        StudentField::Plan,
        StudentField::ServiceType,
        StudentField::MonthlyFee,
        StudentField::PortalAccess,
    ];

    fn key(&self) -> &'static str {
        match self {
            StudentField::Name => "name",
            StudentField::Email => "email",
            StudentField::Phone => "phone",
            StudentField::BirthDate => "birth_date",
            StudentField::Height => "height",
            StudentField::Weight => "weight",
            StudentField::Goal => "goal",
            StudentField::Plan => "plan",
            StudentField::ServiceType => "service_type",
            StudentField::MonthlyFee => "monthly_fee",
            StudentField::PortalAccess => "portal_access",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Email => "Email",
            StudentField::Phone => "Phone",
            StudentField::BirthDate => "Birth date",
            StudentField::Height => "Height (cm)",
            StudentField::Weight => "Weight (kg)",
            StudentField::Goal => "Goal",
            StudentField::Plan => "Plan",
            StudentField::ServiceType => "Service type",
            StudentField::MonthlyFee => "Monthly fee (R$)",
            StudentField::PortalAccess => "Portal access",
        }
    }
}

/// Student draft as typed. The birth date stays text until validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub height: f64,
    pub weight: f64,
    pub goal: String,
    pub plan: Plan,
    pub service_type: String,
    pub monthly_fee: f64,
    pub portal_access: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudentForm;

impl FormModel for StudentForm {
    type Field = StudentField;
    type Record = Student;
    type Input = StudentInput;
    type Draft = NewStudent;
    type Patch = StudentPatch;
    type Errors = FieldErrors<StudentField>;

    fn defaults() -> StudentInput {
        StudentInput::default()
    }

    fn from_record(student: &Student) -> StudentInput {
        StudentInput {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            birth_date: student.birth_date.format("%Y-%m-%d").to_string(),
            height: student.height,
            weight: student.weight,
            goal: student.goal.clone(),
            plan: student.plan,
            service_type: student.service_type.clone().unwrap_or_default(),
            monthly_fee: student.monthly_fee.unwrap_or_default(),
            portal_access: student.portal_access,
        }
    }

    fn set_field(input: &mut StudentInput, field: StudentField, raw: &str) {
        match field {
            StudentField::Name => input.name = raw.to_string(),
            StudentField::Email => input.email = raw.to_string(),
            StudentField::Phone => input.phone = raw.to_string(),
            StudentField::BirthDate => input.birth_date = raw.to_string(),
            StudentField::Height => input.height = parse_number(raw),
            StudentField::Weight => input.weight = parse_number(raw),
            StudentField::Goal => input.goal = raw.to_string(),
            StudentField::Plan => {
                if let Ok(plan) = raw.parse() {
                    input.plan = plan;
                }
            }
            StudentField::ServiceType => input.service_type = raw.to_string(),
            StudentField::MonthlyFee => input.monthly_fee = parse_number(raw),
            StudentField::PortalAccess => input.portal_access = parse_flag(raw),
        }
    }

    fn field_text(input: &StudentInput, field: StudentField) -> String {
        match field {
            StudentField::Name => input.name.clone(),
            StudentField::Email => input.email.clone(),
            StudentField::Phone => input.phone.clone(),
            StudentField::BirthDate => input.birth_date.clone(),
            StudentField::Height => number_text(input.height),
            StudentField::Weight => number_text(input.weight),
            StudentField::Goal => input.goal.clone(),
            StudentField::Plan => input.plan.as_str().to_string(),
            StudentField::ServiceType => input.service_type.clone(),
            StudentField::MonthlyFee => number_text(input.monthly_fee),
            StudentField::PortalAccess => if input.portal_access { "yes" } else { "no" }.to_string(),
        }
    }

    fn validate(input: &StudentInput) -> Result<NewStudent, FieldErrors<StudentField>> {
        let mut errors = FieldErrors::default();

        if input.name.trim().is_empty() {
            errors.insert(StudentField::Name, "Name is required");
        }

        if input.email.trim().is_empty() {
            errors.insert(StudentField::Email, "Email is required");
        } else if !is_email(&input.email) {
            errors.insert(StudentField::Email, "Invalid email");
        }

        if input.phone.trim().is_empty() {
            errors.insert(StudentField::Phone, "Phone is required");
        }

        let birth_date = if input.birth_date.trim().is_empty() {
            errors.insert(StudentField::BirthDate, "Birth date is required");
            None
        } else {
            let parsed = parse_date(&input.birth_date);
            if parsed.is_none() {
                errors.insert(StudentField::BirthDate, "Invalid birth date");
            }
            parsed
        };

        if input.height <= 0.0 {
            errors.insert(StudentField::Height, "Height must be greater than 0");
        }

        if input.weight <= 0.0 {
            errors.insert(StudentField::Weight, "Weight must be greater than 0");
        }

        if input.goal.trim().is_empty() {
            errors.insert(StudentField::Goal, "Goal is required");
        }

        let birth_date = match birth_date {
            Some(date) if errors.is_empty() => date,
            _ => return Err(errors),
        };

        let service_type = input.service_type.trim();
        Ok(NewStudent {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            birth_date,
            height: input.height,
            weight: input.weight,
            goal: input.goal.trim().to_string(),
            plan: input.plan,
            service_type: (!service_type.is_empty()).then(|| service_type.to_string()),
            monthly_fee: (input.monthly_fee > 0.0).then_some(input.monthly_fee),
            portal_access: input.portal_access,
        })
    }

    fn patch(draft: &NewStudent) -> StudentPatch {
        StudentPatch::from(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StudentInput {
        StudentInput {
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(11) 99999-9999".to_string(),
            birth_date: "2000-06-20".to_string(),
            height: 165.0,
            weight: 65.5,
            goal: "Hypertrophy".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_student() {
        let draft = StudentForm::validate(&valid()).unwrap();
        assert_eq!(draft.plan, Plan::Basic);
        assert_eq!(draft.service_type, None);
        assert_eq!(draft.monthly_fee, None);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = StudentForm::validate(&StudentForm::defaults()).unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                StudentField::Name,
                StudentField::Email,
                StudentField::Phone,
                StudentField::BirthDate,
                StudentField::Height,
                StudentField::Weight,
                StudentField::Goal,
            ]
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("ana@example"));
        assert!(!is_email("ana example.com"));

        let mut input = valid();
        input.email = "ana@example".to_string();
        let errors = StudentForm::validate(&input).unwrap_err();
        assert_eq!(errors.message(StudentField::Email), Some("Invalid email"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_plan_field_ignores_unknown_values() {
        let mut input = valid();
        StudentForm::set_field(&mut input, StudentField::Plan, "vip");
        assert_eq!(input.plan, Plan::Vip);
        StudentForm::set_field(&mut input, StudentField::Plan, "gold");
        assert_eq!(input.plan, Plan::Vip);
    }
}
