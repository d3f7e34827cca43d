//! External data shapes and the entity mapping between them.
//!
//! Mapping is pure and field-preserving: no validation, no clock reads.
//! The service validates first and supplies timestamps, so the fallbacks
//! here never fire on valid input.

use chrono::NaiveDate;
use entity::employee;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

/// Wire representation of a stored employee, system fields included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub birth_date: NaiveDate,
    pub salary: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Insert payload. Every field is optional at the deserialization layer so
/// that missing values reach validation as "required" violations instead
/// of deserialization failures.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeInsertDto {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
}

/// Update payload; same shape and rules as insert.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeUpdateDto {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
}

/// Search criteria. Filters are independently optional; pagination is
/// mandatory and checked by [`crate::validate::validate_search`] (the
/// serde defaults of zero fail that check, so callers must supply both).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeSearchDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub min_salary: Option<Decimal>,
    pub max_salary: Option<Decimal>,
    pub page_number: i64,
    pub page_size: i64,
}

pub fn to_dto(model: employee::Model) -> EmployeeDto {
    EmployeeDto {
        id: model.id,
        first_name: model.first_name,
        middle_name: model.middle_name,
        last_name: model.last_name,
        second_last_name: model.second_last_name,
        birth_date: model.birth_date,
        salary: model.salary,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Insert-DTO to entity. The id is a placeholder the store replaces; both
/// timestamps are set to the stamp the service passes in.
pub fn insert_to_entity(dto: &EmployeeInsertDto, stamp: DateTimeWithTimeZone) -> employee::Model {
    employee::Model {
        id: 0,
        first_name: dto.first_name.clone().unwrap_or_default(),
        middle_name: dto.middle_name.clone(),
        last_name: dto.last_name.clone().unwrap_or_default(),
        second_last_name: dto.second_last_name.clone(),
        birth_date: dto.birth_date.unwrap_or_default(),
        salary: dto.salary.unwrap_or_default(),
        created_at: stamp,
        updated_at: stamp,
    }
}

/// Overwrite the user fields of `current` with the update payload, leaving
/// id and both timestamps untouched (the service refreshes updated_at).
pub fn merge_update(current: &employee::Model, dto: &EmployeeUpdateDto) -> employee::Model {
    employee::Model {
        id: current.id,
        first_name: dto
            .first_name
            .clone()
            .unwrap_or_else(|| current.first_name.clone()),
        middle_name: dto.middle_name.clone(),
        last_name: dto
            .last_name
            .clone()
            .unwrap_or_else(|| current.last_name.clone()),
        second_last_name: dto.second_last_name.clone(),
        birth_date: dto.birth_date.unwrap_or(current.birth_date),
        salary: dto.salary.unwrap_or(current.salary),
        created_at: current.created_at,
        updated_at: current.updated_at,
    }
}
