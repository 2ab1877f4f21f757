//! Printable documents.
//!
//! Rendering is pure: the same bill and context always produce the same
//! HTML bytes. Turning HTML into PDF is the dispatcher's job.

mod bank_form;
pub mod common;
mod main_summary;
mod personal_statement;

use chrono::FixedOffset;

use crate::bill::Bill;
use common::{format_exam_date, sanitize_filename};

const DEFAULT_SOCIETY: &str = "Progressive Education Society's";
const DEFAULT_COLLEGE: &str = "Modern College of Arts, Science, and Commerce (Autonomous),";
const DEFAULT_ADDRESS: &str = "Ganeshkhind, Pune - 411016";
const DEFAULT_LOGO_URL: &str = "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcRiDX-TI_GWDRoSUoutAJU6HDoAwjH9sPY_PUd2yOYyYNdY6g6un5KNinkcCQmHdmuqIPg&usqp=CAU";

/// Institution header printed at the top of bill pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub society: String,
    pub college: String,
    pub address: String,
    pub logo_url: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            society: DEFAULT_SOCIETY.to_string(),
            college: DEFAULT_COLLEGE.to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            logo_url: DEFAULT_LOGO_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub letterhead: Letterhead,
    /// Offset exam times are printed in.
    pub utc_offset: FixedOffset,
}

impl DocumentContext {
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self {
            letterhead: Letterhead::default(),
            utc_offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    MainSummary,
    PersonalStatement,
    BankDetailForm,
}

impl DocumentKind {
    fn file_prefix(&self, mailed: bool) -> &'static str {
        match (self, mailed) {
            (Self::MainSummary, false) => "bill",
            (Self::MainSummary, true) => "main_bill",
            (Self::PersonalStatement, _) => "personal_bills",
            (Self::BankDetailForm, _) => "Bank_Detail_Form",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::MainSummary => "Main Bill",
            Self::PersonalStatement => "Personal Bills",
            Self::BankDetailForm => "Bank Detail Form",
        }
    }
}

/// What to render. Bill-backed documents borrow the bill.
#[derive(Debug, Clone, Copy)]
pub enum DocumentRequest<'a> {
    MainSummary(&'a Bill),
    PersonalStatement(&'a Bill),
    BankDetailForm,
}

impl DocumentRequest<'_> {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::MainSummary(_) => DocumentKind::MainSummary,
            Self::PersonalStatement(_) => DocumentKind::PersonalStatement,
            Self::BankDetailForm => DocumentKind::BankDetailForm,
        }
    }
}

/// Rendered HTML plus the naming metadata used for downloads and mail.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub html: String,
    /// Bill subject; `None` for the blank bank form.
    pub subject: Option<String>,
    /// Formatted exam date; `None` for the blank bank form.
    pub exam_date: Option<String>,
}

impl RenderedDocument {
    /// `<prefix>_<subject>_<date>.pdf`, with unsafe characters replaced.
    pub fn filename(&self, mailed: bool) -> String {
        let prefix = self.kind.file_prefix(mailed);
        match (&self.subject, &self.exam_date) {
            (Some(subject), Some(date)) => format!(
                "{}.pdf",
                sanitize_filename(&format!("{}_{}_{}", prefix, subject, date), prefix)
            ),
            _ => format!("{}.pdf", prefix),
        }
    }

    pub fn mail_subject(&self) -> String {
        match (&self.subject, &self.exam_date) {
            (Some(subject), Some(date)) => format!("{} - {} - {}", self.kind.title(), subject, date),
            _ => self.kind.title().to_string(),
        }
    }

    pub fn mail_text(&self) -> String {
        match (&self.subject, &self.exam_date) {
            (Some(subject), Some(date)) => format!(
                "Please find attached the {} for {} examination held on {}.",
                self.kind.title().to_lowercase(),
                subject,
                date
            ),
            _ => format!(
                "Please find attached the {}.",
                self.kind.title().to_lowercase()
            ),
        }
    }
}

pub fn render(request: DocumentRequest<'_>, ctx: &DocumentContext) -> RenderedDocument {
    let kind = request.kind();
    match request {
        DocumentRequest::MainSummary(bill) => RenderedDocument {
            kind,
            html: main_summary::render(bill, ctx),
            subject: Some(bill.content.subject.clone()),
            exam_date: Some(format_exam_date(bill.content.exam_start_time, ctx.utc_offset)),
        },
        DocumentRequest::PersonalStatement(bill) => RenderedDocument {
            kind,
            html: personal_statement::render(bill, ctx),
            subject: Some(bill.content.subject.clone()),
            exam_date: Some(format_exam_date(bill.content.exam_start_time, ctx.utc_offset)),
        },
        DocumentRequest::BankDetailForm => RenderedDocument {
            kind,
            html: bank_form::render(),
            subject: None,
            exam_date: None,
        },
    }
}
