//! Derivation engine: turns a validated [`BillRequest`] into [`BillContent`]
//! with attendance counts, per-person totals and bill aggregates filled in.
//!
//! Nothing here fails. Out-of-range derived values clamp to zero and numeric
//! inputs otherwise pass through unchanged.

use super::model::{BillContent, BillRequest, Person, PersonRequest, StaffPayment};
use super::words::{amount_in_words, whole_rupees};

/// Numeric value of a rate string. Unparseable or non-finite rates count as zero.
pub fn parse_rate(rate: &str) -> f64 {
    rate.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

pub fn absent_students(total_students: u32, present_students: u32) -> u32 {
    total_students.saturating_sub(present_students)
}

pub fn present_from_batches(batches: &[super::model::Batch]) -> u32 {
    batches
        .iter()
        .fold(0u32, |sum, batch| sum.saturating_add(batch.students_present))
}

/// `present * rate + allowance`, clamped at zero.
pub fn person_total(present_students: u32, rate: f64, extra_allowance: f64) -> f64 {
    let total = f64::from(present_students) * rate + extra_allowance;
    if total.is_finite() && total > 0.0 {
        total
    } else {
        0.0
    }
}

pub fn bill_total(staff_payments: &[StaffPayment]) -> f64 {
    staff_payments
        .iter()
        .flat_map(|group| group.persons.iter())
        .map(|person| person.total_amount)
        .sum()
}

pub fn derive(request: BillRequest) -> BillContent {
    let (present_students, total_batches) = if request.batches.is_empty() {
        (
            request.present_students.unwrap_or(0),
            request.total_batches.unwrap_or(0),
        )
    } else {
        (
            present_from_batches(&request.batches),
            request.batches.len() as u32,
        )
    };

    // With batches the absent count always follows their sum
    let absent_students = match request.absent_students {
        Some(absent) if request.batches.is_empty() => absent,
        _ => absent_students(request.total_students, present_students),
    };

    let staff_payments: Vec<StaffPayment> = request
        .staff_payments
        .into_iter()
        .map(|group| StaffPayment {
            role: group.role.trim().to_string(),
            persons: group
                .persons
                .into_iter()
                .map(|person| derive_person(person, present_students))
                .collect(),
        })
        .collect();

    let total_amount = bill_total(&staff_payments);

    BillContent {
        department: request.department.trim().to_string(),
        class_name: request.class_name.trim().to_string(),
        subject: request.subject.trim().to_string(),
        semester: request.semester,
        program_level: request.program_level,
        exam_session: request.exam_session.trim().to_string(),
        exam_type: request.exam_type,
        paper_no: request
            .paper_no
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        exam_start_time: request.exam_start_time,
        exam_end_time: request.exam_end_time,
        total_students: request.total_students,
        present_students,
        absent_students,
        total_batches,
        duration_per_batch: request.duration_per_batch.max(0.0),
        batches: request.batches,
        staff_payments,
        total_amount,
        balance_payable: total_amount,
        amount_in_words: amount_in_words(whole_rupees(total_amount)),
    }
}

fn derive_person(person: PersonRequest, present_students: u32) -> Person {
    let extra_allowance = person.extra_allowance.unwrap_or(0.0);
    let derived = person_total(present_students, parse_rate(&person.rate), extra_allowance);
    let (total_amount, manual_total) = match person.total_amount {
        Some(total) if person.manual_total => (total, true),
        _ => (derived, false),
    };

    Person {
        name: person.name.trim().to_string(),
        mobile: person
            .mobile
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        rate: person.rate,
        extra_allowance,
        total_amount,
        manual_total,
        present_time: person.present_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::model::{Batch, ExamType, ProgramLevel, StaffPaymentRequest};

    fn person(name: &str, rate: &str, allowance: Option<f64>) -> PersonRequest {
        PersonRequest {
            name: name.to_string(),
            mobile: None,
            rate: rate.to_string(),
            extra_allowance: allowance,
            total_amount: None,
            manual_total: false,
            present_time: None,
        }
    }

    fn request(batches: Vec<Batch>, staff: Vec<StaffPaymentRequest>) -> BillRequest {
        BillRequest {
            department: "Computer Science".to_string(),
            class_name: "T.Y. B.Sc.".to_string(),
            subject: "Data Structures".to_string(),
            semester: 5,
            program_level: ProgramLevel::UG,
            exam_session: "March/April 2025".to_string(),
            exam_type: ExamType::Practical,
            paper_no: None,
            exam_start_time: None,
            exam_end_time: None,
            total_students: 40,
            present_students: Some(0),
            absent_students: None,
            total_batches: None,
            duration_per_batch: 3.0,
            batches,
            staff_payments: staff,
        }
    }

    fn batch(no: &str, present: u32) -> Batch {
        Batch {
            batch_no: no.to_string(),
            students_present: present,
        }
    }

    #[test]
    fn test_external_examiner_scenario() {
        let content = derive(request(
            vec![batch("1", 20), batch("2", 15)],
            vec![StaffPaymentRequest {
                role: "External Examiner".to_string(),
                persons: vec![person("Dr. Patil", "50", Some(100.0))],
            }],
        ));

        assert_eq!(content.present_students, 35);
        assert_eq!(content.absent_students, 5);
        assert_eq!(content.total_batches, 2);
        assert_eq!(content.staff_payments[0].persons[0].total_amount, 1850.0);
        assert_eq!(content.total_amount, 1850.0);
        assert_eq!(content.balance_payable, 1850.0);
        assert_eq!(content.amount_in_words, "One Thousand Eight Hundred Fifty Only");
    }

    #[test]
    fn test_batches_override_supplied_present_count() {
        let mut req = request(vec![batch("A", 12), batch("B", 8)], vec![]);
        req.present_students = Some(99);
        req.total_batches = Some(7);

        let content = derive(req);
        assert_eq!(content.present_students, 20);
        assert_eq!(content.total_batches, 2);
    }

    #[test]
    fn test_present_used_when_no_batches() {
        let mut req = request(vec![], vec![]);
        req.present_students = Some(31);
        req.total_batches = Some(1);

        let content = derive(req);
        assert_eq!(content.present_students, 31);
        assert_eq!(content.absent_students, 9);
        assert_eq!(content.total_batches, 1);
    }

    #[test]
    fn test_absent_clamped_at_zero() {
        let mut req = request(vec![batch("1", 45)], vec![]);
        req.total_students = 40;
        assert_eq!(derive(req).absent_students, 0);
    }

    #[test]
    fn test_supplied_absent_ignored_with_batches() {
        let mut req = request(vec![batch("1", 30)], vec![]);
        req.absent_students = Some(4);
        assert_eq!(derive(req).absent_students, 10);
    }

    #[test]
    fn test_supplied_absent_kept_without_batches() {
        let mut req = request(vec![], vec![]);
        req.present_students = Some(30);
        req.absent_students = Some(4);
        assert_eq!(derive(req).absent_students, 4);
    }

    #[test]
    fn test_totals_sum_over_all_groups() {
        let content = derive(request(
            vec![batch("1", 10)],
            vec![
                StaffPaymentRequest {
                    role: "Internal Examiner".to_string(),
                    persons: vec![
                        person("A", "20", None),
                        person("B", "12.5", Some(50.0)),
                    ],
                },
                StaffPaymentRequest {
                    role: "Lab Assistant".to_string(),
                    persons: vec![person("C", "5", Some(0.0))],
                },
            ],
        ));

        let totals: Vec<f64> = content
            .staff_payments
            .iter()
            .flat_map(|g| g.persons.iter().map(|p| p.total_amount))
            .collect();
        assert_eq!(totals, vec![200.0, 175.0, 50.0]);
        assert_eq!(content.total_amount, 425.0);
        assert_eq!(content.amount_in_words, "Four Hundred Twenty Five Only");
    }

    #[test]
    fn test_manual_total_override_is_kept() {
        let mut p = person("A", "20", None);
        p.total_amount = Some(999.0);
        p.manual_total = true;
        let content = derive(request(
            vec![batch("1", 10)],
            vec![StaffPaymentRequest {
                role: "Supervisor".to_string(),
                persons: vec![p],
            }],
        ));
        assert_eq!(content.total_amount, 999.0);
        assert!(content.staff_payments[0].persons[0].manual_total);
    }

    #[test]
    fn test_stale_total_without_flag_is_recomputed() {
        // A previously derived total sent back after the rate changed
        let mut p = person("A", "60", Some(100.0));
        p.total_amount = Some(1850.0);
        let content = derive(request(
            vec![batch("1", 15), batch("2", 15)],
            vec![StaffPaymentRequest {
                role: "External Examiner".to_string(),
                persons: vec![p],
            }],
        ));
        assert_eq!(content.staff_payments[0].persons[0].total_amount, 1900.0);
        assert!(!content.staff_payments[0].persons[0].manual_total);
        assert_eq!(content.total_amount, 1900.0);
        assert_eq!(content.amount_in_words, "One Thousand Nine Hundred Only");
    }

    #[test]
    fn test_unparseable_rate_counts_as_zero() {
        assert_eq!(parse_rate("abc"), 0.0);
        assert_eq!(parse_rate(" 12.5 "), 12.5);
        assert_eq!(parse_rate("inf"), 0.0);
        assert_eq!(person_total(10, parse_rate("n/a"), 30.0), 30.0);
    }

    #[test]
    fn test_negative_total_clamps() {
        assert_eq!(person_total(10, -5.0, 0.0), 0.0);
    }

    #[test]
    fn test_empty_staff_gives_zero_words() {
        let content = derive(request(vec![batch("1", 10)], vec![]));
        assert_eq!(content.total_amount, 0.0);
        assert_eq!(content.amount_in_words, "Zero Only");
    }
}
