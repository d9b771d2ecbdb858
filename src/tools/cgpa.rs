//! Credit-weighted grade point average

use crate::state::{ComputationResult, Derived, FieldSpec, Record, ValidationError};

pub const STORAGE_KEY: &str = "cgpa_calculator_data";

pub const SUBJECTS: &str = "subjects";

pub const GRADES: &[&str] = &["A+", "A", "B+", "B", "C+", "C", "D", "F"];

/// Points awarded per credit for a letter grade
pub fn grade_points(grade: &str) -> Option<f64> {
    let points = match grade {
        "A+" => 10.0,
        "A" => 9.0,
        "B+" => 8.0,
        "B" => 7.0,
        "C+" => 6.0,
        "C" => 5.0,
        "D" => 4.0,
        "F" => 0.0,
        _ => return None,
    };
    Some(points)
}

pub fn specs() -> Vec<FieldSpec> {
    vec![FieldSpec::rows(
        SUBJECTS,
        "Subjects",
        vec![
            FieldSpec::text("name", "Subject Name").required(),
            FieldSpec::choice("grade", "Grade", GRADES),
            FieldSpec::number("credits", "Credits").min(1.0).max(10.0).required(),
        ],
        1,
    )]
}

struct Subject<'a> {
    name: &'a str,
    grade: &'a str,
    credits: f64,
    points: f64,
}

pub fn compute(record: &Record) -> ComputationResult {
    let rows = record
        .rows(SUBJECTS)
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| ValidationError::new(SUBJECTS, "Please add at least one subject"))?;

    let mut subjects = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let field = |key: &str| format!("{SUBJECTS}.{}.{key}", row.id);
        let name = row.record.text("name").trim();
        if name.is_empty() {
            return Err(ValidationError::new(
                field("name"),
                format!("Subject {}: Please enter subject name", index + 1),
            ));
        }
        let credits = row
            .record
            .number("credits")
            .filter(|c| *c > 0.0)
            .ok_or_else(|| {
                ValidationError::new(
                    field("credits"),
                    format!("Subject {}: Please enter valid credits", index + 1),
                )
            })?;
        let grade = row.record.text("grade");
        let per_credit = grade_points(grade).ok_or_else(|| {
            ValidationError::new(
                field("grade"),
                format!("Subject {}: Unknown grade '{grade}'", index + 1),
            )
        })?;
        subjects.push(Subject {
            name,
            grade,
            credits,
            points: per_credit * credits,
        });
    }

    let total_credits: f64 = subjects.iter().map(|s| s.credits).sum();
    let total_points: f64 = subjects.iter().map(|s| s.points).sum();
    if total_credits == 0.0 {
        return Err(ValidationError::new(SUBJECTS, "Total credits cannot be zero"));
    }

    let cgpa = total_points / total_credits;
    let mut derived = Derived::new()
        .headline("CGPA", format!("{cgpa:.2}"))
        .entry("Total Credits", super::format::number(total_credits))
        .entry("Total Grade Points", format!("{total_points:.2}"))
        .entry("GPA", format!("{cgpa:.2}"));
    for subject in &subjects {
        derived = derived.entry(
            subject.name,
            format!(
                "{} ({} credits) = {:.2} points",
                subject.grade,
                super::format::number(subject.credits),
                subject.points
            ),
        );
    }
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldValue, FormState, Outcome, RowSet};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn subject(name: &str, grade: &str, credits: f64) -> Record {
        let fields = specs()
            .into_iter()
            .next()
            .and_then(|spec| spec.row_fields().map(<[FieldSpec]>::to_vec))
            .unwrap_or_default();
        let mut record = Record::from_specs(&fields);
        record.set("name", FieldValue::Text(name.to_string()));
        record.set("grade", FieldValue::Choice(grade.to_string()));
        record.set("credits", FieldValue::Number(credits));
        record
    }

    fn record_with(subjects: Vec<Record>) -> Record {
        let mut record = Record::from_specs(&specs());
        let mut rows = RowSet::new();
        for subject in subjects {
            rows.push(subject);
        }
        record.set(SUBJECTS, FieldValue::Rows(rows));
        record
    }

    #[test]
    fn test_weighted_mean() {
        let record = record_with(vec![subject("Maths", "A+", 4.0), subject("Physics", "B", 3.0)]);
        let derived = compute(&record).unwrap();
        assert_eq!(derived.get("CGPA"), Some(format!("{:.2}", 61.0 / 7.0).as_str()));
        assert_eq!(derived.get("CGPA"), Some("8.71"));
        assert_eq!(derived.get("Total Credits"), Some("7"));
        assert_eq!(derived.get("Total Grade Points"), Some("61.00"));
        assert_eq!(derived.get("Maths"), Some("A+ (4 credits) = 40.00 points"));
    }

    #[test]
    fn test_grade_table() {
        let points: Vec<f64> = GRADES.iter().filter_map(|g| grade_points(g)).collect();
        assert_eq!(points, vec![10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 0.0]);
        assert_eq!(grade_points("E"), None);
    }

    #[test]
    fn test_no_subjects_is_invalid() {
        let err = compute(&record_with(vec![])).unwrap_err();
        assert_eq!(err.field, SUBJECTS);
    }

    #[test]
    fn test_zero_credits_is_invalid_not_nan() {
        let err = compute(&record_with(vec![subject("Maths", "A", 0.0)])).unwrap_err();
        assert!(err.field.ends_with(".credits"));
    }

    #[test]
    fn test_blank_name_points_at_row() {
        let err = compute(&record_with(vec![
            subject("Maths", "A", 3.0),
            subject("  ", "B", 3.0),
        ]))
        .unwrap_err();
        assert_eq!(err.field, "subjects.2.name");
        assert!(err.reason.starts_with("Subject 2:"));
    }

    #[test]
    fn test_form_starts_with_one_incomplete_row() {
        let form = FormState::new(specs(), compute);
        assert_eq!(form.record().rows(SUBJECTS).map(RowSet::len), Some(1));
        assert_eq!(form.evaluate(), Outcome::NotReady);
    }

    #[test]
    fn test_credits_out_of_range_rejected_at_input() {
        let mut form = FormState::new(specs(), compute);
        let now = Instant::now();
        let id = form.record().rows(SUBJECTS).unwrap().iter().next().unwrap().id;
        assert!(form.update_row_field(SUBJECTS, id, "credits", "11", now).is_err());
        assert!(form.update_row_field(SUBJECTS, id, "credits", "0", now).is_err());
    }

    #[test]
    fn test_removing_all_rows_is_invalid() {
        let mut form = FormState::new(specs(), compute);
        let now = Instant::now();
        let id = form.record().rows(SUBJECTS).unwrap().iter().next().unwrap().id;
        form.remove_row(SUBJECTS, id, now).unwrap();
        assert!(matches!(form.evaluate(), Outcome::Invalid(_)));
    }
}
