use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Status written when an administrator edits a bill submitted by someone else.
pub const EDITED_BY_ADMIN: &str = "Edited By Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProgramLevel {
    UG,
    PG,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExamType {
    Theory,
    Internal,
    External,
    Practical,
    Department,
    Other,
}

impl ExamType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Theory => "Theory",
            Self::Internal => "Internal",
            Self::External => "External",
            Self::Practical => "Practical",
            Self::Department => "Department",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[schema(example = "B1")]
    pub batch_no: String,
    #[schema(example = 20)]
    pub students_present: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentTime {
    pub in_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[schema(example = "Dr. A. Kulkarni")]
    pub name: String,
    pub mobile: Option<String>,
    /// Pay per present student, kept as entered ("50", "12.5").
    #[schema(example = "50")]
    pub rate: String,
    #[serde(default)]
    pub extra_allowance: f64,
    pub total_amount: f64,
    /// Set when `total_amount` was entered by hand rather than derived.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manual_total: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_time: Option<PresentTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayment {
    #[schema(example = "External Examiner")]
    pub role: String,
    #[serde(default)]
    pub persons: Vec<Person>,
}

/// Everything about a bill except identity and lifecycle metadata. This is
/// what the derivation engine produces from a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillContent {
    #[schema(example = "Computer Science")]
    pub department: String,
    #[schema(example = "T.Y. B.Sc. (Comp Sci)")]
    pub class_name: String,
    #[schema(example = "Data Structures")]
    pub subject: String,
    #[schema(example = 5)]
    pub semester: u8,
    pub program_level: ProgramLevel,
    #[schema(example = "March/April 2025")]
    pub exam_session: String,
    pub exam_type: ExamType,
    pub paper_no: Option<String>,
    pub exam_start_time: Option<DateTime<Utc>>,
    pub exam_end_time: Option<DateTime<Utc>>,
    pub total_students: u32,
    pub present_students: u32,
    pub absent_students: u32,
    pub total_batches: u32,
    /// Hours per batch.
    #[serde(default)]
    pub duration_per_batch: f64,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub staff_payments: Vec<StaffPayment>,
    pub total_amount: f64,
    pub balance_payable: f64,
    #[schema(example = "One Thousand Eight Hundred Fifty Only")]
    pub amount_in_words: String,
}

/// Stored bill document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: Option<String>,
    #[serde(flatten)]
    pub content: BillContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(user_id: Uuid, content: BillContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: None,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn persons(&self) -> impl Iterator<Item = (&StaffPayment, &Person)> {
        self.content
            .staff_payments
            .iter()
            .flat_map(|group| group.persons.iter().map(move |person| (group, person)))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    pub name: String,
    pub mobile: Option<String>,
    /// Accepts either `"50"` or `50`.
    #[serde(deserialize_with = "deserialize_rate")]
    #[schema(value_type = String, example = "50")]
    pub rate: String,
    pub extra_allowance: Option<f64>,
    /// Only honoured together with `manualTotal`; otherwise the total is
    /// derived and any value sent here is ignored.
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub manual_total: bool,
    pub present_time: Option<PresentTime>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffPaymentRequest {
    pub role: String,
    #[serde(default)]
    pub persons: Vec<PersonRequest>,
}

/// Body of create and update calls. Aggregates (`totalAmount`,
/// `balancePayable`, `amountInWords`) are always derived server-side, so any
/// client-sent values for them are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillRequest {
    pub department: String,
    pub class_name: String,
    pub subject: String,
    pub semester: u8,
    pub program_level: ProgramLevel,
    pub exam_session: String,
    pub exam_type: ExamType,
    pub paper_no: Option<String>,
    pub exam_start_time: Option<DateTime<Utc>>,
    pub exam_end_time: Option<DateTime<Utc>>,
    pub total_students: u32,
    pub present_students: Option<u32>,
    pub absent_students: Option<u32>,
    pub total_batches: Option<u32>,
    #[serde(default)]
    pub duration_per_batch: f64,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub staff_payments: Vec<StaffPaymentRequest>,
}

/// Teacher listing response for `GET /teachers/{id}/bills`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherBillsResponse {
    pub data: Vec<Bill>,
    pub teacher_info: TeacherInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherInfo {
    pub name: String,
    pub email: String,
}

fn deserialize_rate<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RateRepr {
        Text(String),
        Number(f64),
    }

    Ok(match RateRepr::deserialize(deserializer)? {
        RateRepr::Text(text) => text.trim().to_string(),
        RateRepr::Number(number) => number.to_string(),
    })
}
