use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Entity;
use crate::metrics::{self, BmiCategory};

/// A trainer's student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    /// Centimetres
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub monthly_fee: Option<f64>,
    #[serde(default)]
    pub portal_access: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription tier, lowest first
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Basic,
    Premium,
    Vip,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Premium, Plan::Vip];

    pub fn label(&self) -> &'static str {
        match self {
            Plan::Basic => "Basic",
            Plan::Premium => "Premium",
            Plan::Vip => "VIP",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Premium => "premium",
            Plan::Vip => "vip",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Plan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "premium" => Ok(Plan::Premium),
            "vip" => Ok(Plan::Vip),
            _ => Err(anyhow::anyhow!("Invalid plan: {}", s)),
        }
    }
}

impl Student {
    /// Age in whole years on `today`
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        metrics::age(self.birth_date, today)
    }

    /// Body mass index rounded to one decimal
    pub fn bmi(&self) -> Option<f64> {
        metrics::bmi(self.weight, self.height)
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }
}

impl Entity for Student {
    fn id(&self) -> &str {
        &self.id
    }

    /// Newest first
    fn list_order(&self, other: &Self) -> Ordering {
        other.created_at.cmp(&self.created_at)
    }
}

/// Fields supplied when creating a student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub height: f64,
    pub weight: f64,
    pub goal: String,
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<f64>,
    pub portal_access: bool,
}

/// Partial update; absent fields are left untouched server-side.
/// `Some(None)` on an optional column clears it (sent as `null`).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_access: Option<bool>,
}

impl From<&NewStudent> for StudentPatch {
    fn from(fields: &NewStudent) -> Self {
        Self {
            name: Some(fields.name.clone()),
            email: Some(fields.email.clone()),
            phone: Some(fields.phone.clone()),
            birth_date: Some(fields.birth_date),
            height: Some(fields.height),
            weight: Some(fields.weight),
            goal: Some(fields.goal.clone()),
            plan: Some(fields.plan),
            service_type: Some(fields.service_type.clone()),
            monthly_fee: Some(fields.monthly_fee),
            portal_access: Some(fields.portal_access),
        }
    }
}
