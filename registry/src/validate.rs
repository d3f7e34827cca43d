//! Field-level input checks, applied before any persistence action.
//!
//! Each rule is an independent predicate producing zero or one violation;
//! callers always get the full ordered list, never just the first error.

use rust_decimal::Decimal;

use crate::dto::{EmployeeInsertDto, EmployeeSearchDto, EmployeeUpdateDto};
use crate::error::Violation;

const MAX_NAME_LEN: usize = 50;

pub fn validate_insert(dto: &EmployeeInsertDto) -> Result<(), Vec<Violation>> {
    validate_employee_fields(
        dto.first_name.as_deref(),
        dto.middle_name.as_deref(),
        dto.last_name.as_deref(),
        dto.second_last_name.as_deref(),
        dto.birth_date.is_some(),
        dto.salary,
    )
}

pub fn validate_update(dto: &EmployeeUpdateDto) -> Result<(), Vec<Violation>> {
    validate_employee_fields(
        dto.first_name.as_deref(),
        dto.middle_name.as_deref(),
        dto.last_name.as_deref(),
        dto.second_last_name.as_deref(),
        dto.birth_date.is_some(),
        dto.salary,
    )
}

pub fn validate_search(dto: &EmployeeSearchDto) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    if dto.page_number <= 0 {
        violations.push(Violation::new(
            "pageNumber",
            "page number must be greater than 0",
        ));
    }
    if dto.page_size <= 0 {
        violations.push(Violation::new(
            "pageSize",
            "page size must be greater than 0",
        ));
    }
    finish(violations)
}

fn validate_employee_fields(
    first_name: Option<&str>,
    middle_name: Option<&str>,
    last_name: Option<&str>,
    second_last_name: Option<&str>,
    has_birth_date: bool,
    salary: Option<Decimal>,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check_required_name("firstName", "first name", first_name, &mut violations);
    check_optional_name("middleName", "middle name", middle_name, &mut violations);
    check_required_name("lastName", "last name", last_name, &mut violations);
    check_optional_name(
        "secondLastName",
        "second last name",
        second_last_name,
        &mut violations,
    );
    if !has_birth_date {
        violations.push(Violation::new("birthDate", "birth date is required"));
    }
    match salary {
        None => violations.push(Violation::new("salary", "salary is required")),
        Some(value) if value <= Decimal::ZERO => violations.push(Violation::new(
            "salary",
            "salary must be greater than 0",
        )),
        Some(_) => {}
    }
    finish(violations)
}

fn check_required_name(
    field: &'static str,
    label: &str,
    value: Option<&str>,
    out: &mut Vec<Violation>,
) {
    match value {
        None | Some("") => out.push(Violation::new(field, format!("{label} is required"))),
        Some(value) => check_name_rules(field, label, value, out),
    }
}

fn check_optional_name(
    field: &'static str,
    label: &str,
    value: Option<&str>,
    out: &mut Vec<Violation>,
) {
    if let Some(value) = value {
        if !value.is_empty() {
            check_name_rules(field, label, value, out);
        }
    }
}

fn check_name_rules(field: &'static str, label: &str, value: &str, out: &mut Vec<Violation>) {
    if value.chars().count() > MAX_NAME_LEN {
        out.push(Violation::new(
            field,
            format!("{label} may not be longer than {MAX_NAME_LEN} characters"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphabetic()) {
        out.push(Violation::new(
            field,
            format!("{label} may only contain letters"),
        ));
    }
}

fn finish(violations: Vec<Violation>) -> Result<(), Vec<Violation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
