//! Resume builder rendering to Markdown

use chrono::NaiveDate;

use crate::state::{ComputationResult, Derived, FieldSpec, Record};

pub const STORAGE_KEY: &str = "resume_builder_data";

pub const EXPERIENCE: &str = "experience";
pub const EDUCATION: &str = "education";

/// File name used when exporting
pub const EXPORT_FILE: &str = "resume.md";

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("full_name", "Full Name"),
        FieldSpec::text("email", "Email"),
        FieldSpec::text("phone", "Phone"),
        FieldSpec::text("location", "Location"),
        FieldSpec::text("linkedin", "LinkedIn"),
        FieldSpec::text("website", "Website"),
        FieldSpec::multiline("summary", "Professional Summary"),
        FieldSpec::text("skills", "Skills (comma separated)"),
        FieldSpec::rows(
            EXPERIENCE,
            "Experience",
            vec![
                FieldSpec::text("title", "Job Title"),
                FieldSpec::text("company", "Company"),
                FieldSpec::text("start", "Start (YYYY-MM)"),
                FieldSpec::text("end", "End (YYYY-MM, blank for Present)"),
                FieldSpec::multiline("description", "Description"),
            ],
            1,
        ),
        FieldSpec::rows(
            EDUCATION,
            "Education",
            vec![
                FieldSpec::text("degree", "Degree"),
                FieldSpec::text("institution", "Institution"),
                FieldSpec::text("start", "Start (YYYY-MM)"),
                FieldSpec::text("end", "End (YYYY-MM)"),
            ],
            1,
        ),
    ]
}

/// `2024-03` as `March 2024`; anything unparseable is shown as typed
pub fn month_year(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map(|date| date.format("%B %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn period(start: &str, end: &str) -> String {
    let start = if start.trim().is_empty() {
        String::new()
    } else {
        month_year(start)
    };
    let end = if end.trim().is_empty() {
        "Present".to_string()
    } else {
        month_year(end)
    };
    format!("{start} - {end}")
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Render the resume as Markdown
pub fn render(record: &Record) -> String {
    let text = |key: &str| record.text(key).trim();
    let mut out = format!("# {}\n", or(text("full_name"), "Your Name"));

    let contact: Vec<String> = [
        ("email", "Email"),
        ("phone", "Phone"),
        ("location", "Location"),
        ("linkedin", "LinkedIn"),
        ("website", "Website"),
    ]
    .iter()
    .filter(|(key, _)| !text(*key).is_empty())
    .map(|(key, label)| format!("{label}: {}", text(*key)))
    .collect();
    if !contact.is_empty() {
        out.push('\n');
        out.push_str(&contact.join(" | "));
        out.push('\n');
    }

    if !text("summary").is_empty() {
        out.push_str("\n## Professional Summary\n\n");
        out.push_str(text("summary"));
        out.push('\n');
    }

    let experience: Vec<String> = record
        .rows(EXPERIENCE)
        .into_iter()
        .flat_map(|rows| rows.iter())
        .filter_map(|row| {
            let r = &row.record;
            let (title, company) = (r.text("title").trim(), r.text("company").trim());
            if title.is_empty() && company.is_empty() {
                return None;
            }
            let mut entry = format!(
                "### {}\n**{}**  \n_{}_\n",
                or(title, "Position"),
                or(company, "Company"),
                period(r.text("start"), r.text("end"))
            );
            let description = r.text("description").trim();
            if !description.is_empty() {
                entry.push('\n');
                entry.push_str(description);
                entry.push('\n');
            }
            Some(entry)
        })
        .collect();
    if !experience.is_empty() {
        out.push_str("\n## Work Experience\n");
        for entry in &experience {
            out.push('\n');
            out.push_str(entry);
        }
    }

    let education: Vec<String> = record
        .rows(EDUCATION)
        .into_iter()
        .flat_map(|rows| rows.iter())
        .filter_map(|row| {
            let r = &row.record;
            let (degree, institution) = (r.text("degree").trim(), r.text("institution").trim());
            if degree.is_empty() && institution.is_empty() {
                return None;
            }
            Some(format!(
                "### {}\n**{}**  \n_{}_\n",
                or(degree, "Degree"),
                or(institution, "Institution"),
                period(r.text("start"), r.text("end"))
            ))
        })
        .collect();
    if !education.is_empty() {
        out.push_str("\n## Education\n");
        for entry in &education {
            out.push('\n');
            out.push_str(entry);
        }
    }

    let skills: Vec<&str> = text("skills")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if !skills.is_empty() {
        out.push_str("\n## Skills\n\n");
        out.push_str(&skills.join(", "));
        out.push('\n');
    }
    out
}

pub fn compute(record: &Record) -> ComputationResult {
    let name = record.text("full_name").trim();
    Ok(Derived::new()
        .headline("Resume", or(name, "Your Name"))
        .entry("Markdown", render(record)))
}
