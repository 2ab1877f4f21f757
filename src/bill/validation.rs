//! Boundary checks for bill requests. Runs before derivation so the engine
//! only ever sees well-formed input.

use super::model::BillRequest;
use crate::validation::{
    validate_amount, validate_mobile, validate_required, FieldError, ValidationErrors,
};

pub fn validate_bill_request(request: &BillRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = ValidationErrors::new();

    validate_required(&request.department, "department", "Department", &mut errors);
    validate_required(&request.class_name, "className", "Class name", &mut errors);
    validate_required(&request.subject, "subject", "Subject", &mut errors);
    validate_required(&request.exam_session, "examSession", "Exam session", &mut errors);

    if !(1..=6).contains(&request.semester) {
        errors.add(FieldError::new(
            "semester",
            "Semester must be between 1 and 6",
        ));
    }

    validate_amount(
        request.duration_per_batch,
        "durationPerBatch",
        "Duration per batch",
        &mut errors,
    );

    if let (Some(start), Some(end)) = (request.exam_start_time, request.exam_end_time) {
        if end <= start {
            errors.add(FieldError::new(
                "examEndTime",
                "Exam end time must be after start time",
            ));
        }
    }

    if request.batches.is_empty() && request.present_students.is_none() {
        errors.add(FieldError::new(
            "presentStudents",
            "Present students are required when no batches are given",
        ));
    }

    for (i, batch) in request.batches.iter().enumerate() {
        validate_required(
            &batch.batch_no,
            &format!("batches[{}].batchNo", i),
            "Batch number",
            &mut errors,
        );
    }

    if request.staff_payments.is_empty() {
        errors.add(FieldError::new(
            "staffPayments",
            "At least one staff role is required",
        ));
    }

    for (i, group) in request.staff_payments.iter().enumerate() {
        let prefix = format!("staffPayments[{}]", i);
        validate_required(&group.role, &format!("{}.role", prefix), "Role", &mut errors);

        if group.persons.is_empty() {
            errors.add(FieldError::new(
                format!("{}.persons", prefix),
                "At least one person is required for each role",
            ));
        }

        for (j, person) in group.persons.iter().enumerate() {
            let field = |name: &str| format!("{}.persons[{}].{}", prefix, j, name);

            validate_required(&person.name, &field("name"), "Name", &mut errors);

            if let Some(mobile) = person.mobile.as_deref().filter(|m| !m.trim().is_empty()) {
                validate_mobile(mobile, &field("mobile"), &mut errors);
            }

            match person.rate.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate >= 0.0 => {}
                _ => errors.add(FieldError::new(
                    field("rate"),
                    "Rate must be a non-negative number",
                )),
            }

            if let Some(allowance) = person.extra_allowance {
                validate_amount(allowance, &field("extraAllowance"), "Extra allowance", &mut errors);
            }
            if let Some(total) = person.total_amount {
                validate_amount(total, &field("totalAmount"), "Total amount", &mut errors);
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::model::{Batch, ExamType, PersonRequest, ProgramLevel, StaffPaymentRequest};
    use chrono::{Duration, Utc};

    fn valid_request() -> BillRequest {
        BillRequest {
            department: "Physics".to_string(),
            class_name: "S.Y. B.Sc.".to_string(),
            subject: "Optics".to_string(),
            semester: 3,
            program_level: ProgramLevel::UG,
            exam_session: "Oct/Nov 2025".to_string(),
            exam_type: ExamType::Practical,
            paper_no: Some("Paper II".to_string()),
            exam_start_time: None,
            exam_end_time: None,
            total_students: 30,
            present_students: None,
            absent_students: None,
            total_batches: None,
            duration_per_batch: 2.5,
            batches: vec![Batch {
                batch_no: "1".to_string(),
                students_present: 28,
            }],
            staff_payments: vec![StaffPaymentRequest {
                role: "Internal Examiner".to_string(),
                persons: vec![PersonRequest {
                    name: "Prof. Joshi".to_string(),
                    mobile: Some("9876543210".to_string()),
                    rate: "15".to_string(),
                    extra_allowance: Some(0.0),
                    total_amount: None,
                    manual_total: false,
                    present_time: None,
                }],
            }],
        }
    }

    fn fields(result: Result<(), Vec<FieldError>>) -> Vec<String> {
        result.unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_bill_request(&valid_request()).is_ok());
    }

    #[test]
    fn test_semester_range() {
        let mut req = valid_request();
        req.semester = 7;
        assert_eq!(fields(validate_bill_request(&req)), vec!["semester"]);
        req.semester = 0;
        assert_eq!(fields(validate_bill_request(&req)), vec!["semester"]);
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut req = valid_request();
        let start = Utc::now();
        req.exam_start_time = Some(start);
        req.exam_end_time = Some(start);
        assert_eq!(fields(validate_bill_request(&req)), vec!["examEndTime"]);

        req.exam_end_time = Some(start + Duration::hours(3));
        assert!(validate_bill_request(&req).is_ok());
    }

    #[test]
    fn test_nested_person_fields_reported_with_path() {
        let mut req = valid_request();
        let person = &mut req.staff_payments[0].persons[0];
        person.name = " ".to_string();
        person.rate = "fifty".to_string();
        person.mobile = Some("123".to_string());
        person.extra_allowance = Some(-5.0);

        assert_eq!(
            fields(validate_bill_request(&req)),
            vec![
                "staffPayments[0].persons[0].name",
                "staffPayments[0].persons[0].mobile",
                "staffPayments[0].persons[0].rate",
                "staffPayments[0].persons[0].extraAllowance",
            ]
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut req = valid_request();
        req.staff_payments[0].persons[0].rate = "-10".to_string();
        assert_eq!(
            fields(validate_bill_request(&req)),
            vec!["staffPayments[0].persons[0].rate"]
        );
    }

    #[test]
    fn test_staff_and_present_required() {
        let mut req = valid_request();
        req.staff_payments.clear();
        req.batches.clear();
        assert_eq!(
            fields(validate_bill_request(&req)),
            vec!["presentStudents", "staffPayments"]
        );
    }

    #[test]
    fn test_empty_role_and_persons() {
        let mut req = valid_request();
        req.staff_payments[0].role = String::new();
        req.staff_payments[0].persons.clear();
        assert_eq!(
            fields(validate_bill_request(&req)),
            vec!["staffPayments[0].role", "staffPayments[0].persons"]
        );
    }
}
