//! Record service: validate, map, persist, map back.
//!
//! Store failures are caught here, logged, and re-signaled as
//! [`RegistryError::Service`]; validation failures propagate unmodified.
//! Absence of a targeted record is `Ok(None)`, never an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::error;

use crate::dto::{self, EmployeeDto, EmployeeInsertDto, EmployeeSearchDto, EmployeeUpdateDto};
use crate::error::{RegistryError, RegistryResult};
use crate::repository::EmployeeRepository;
use crate::validate;

#[async_trait]
pub trait EmployeeService: Send + Sync {
    async fn get_all(&self) -> RegistryResult<Vec<EmployeeDto>>;
    async fn get_by_id(&self, id: i32) -> RegistryResult<Option<EmployeeDto>>;
    async fn add(&self, input: EmployeeInsertDto) -> RegistryResult<EmployeeDto>;
    async fn update(
        &self,
        id: i32,
        input: EmployeeUpdateDto,
    ) -> RegistryResult<Option<EmployeeDto>>;
    async fn delete(&self, id: i32) -> RegistryResult<Option<EmployeeDto>>;
    async fn search(&self, criteria: EmployeeSearchDto) -> RegistryResult<Vec<EmployeeDto>>;
}

pub struct RegistryService {
    repository: Arc<dyn EmployeeRepository>,
}

impl RegistryService {
    pub fn new(repository: Arc<dyn EmployeeRepository>) -> Self {
        Self { repository }
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn store_error(message: &'static str) -> impl FnOnce(DbErr) -> RegistryError {
    move |err| {
        error!(error = %err, "{message}");
        RegistryError::service(message, err)
    }
}

#[async_trait]
impl EmployeeService for RegistryService {
    async fn get_all(&self) -> RegistryResult<Vec<EmployeeDto>> {
        let rows = self
            .repository
            .find_all()
            .await
            .map_err(store_error("failed to list employees"))?;
        Ok(rows.into_iter().map(dto::to_dto).collect())
    }

    async fn get_by_id(&self, id: i32) -> RegistryResult<Option<EmployeeDto>> {
        let row = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error("failed to load employee"))?;
        Ok(row.map(dto::to_dto))
    }

    async fn add(&self, input: EmployeeInsertDto) -> RegistryResult<EmployeeDto> {
        validate::validate_insert(&input).map_err(RegistryError::Validation)?;
        let entity = dto::insert_to_entity(&input, now());
        let stored = self
            .repository
            .insert(entity)
            .await
            .map_err(store_error("failed to add employee"))?;
        Ok(dto::to_dto(stored))
    }

    async fn update(
        &self,
        id: i32,
        input: EmployeeUpdateDto,
    ) -> RegistryResult<Option<EmployeeDto>> {
        validate::validate_update(&input).map_err(RegistryError::Validation)?;
        let Some(current) = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error("failed to load employee"))?
        else {
            return Ok(None);
        };
        let mut merged = dto::merge_update(&current, &input);
        merged.updated_at = now();
        let stored = self
            .repository
            .update(merged)
            .await
            .map_err(store_error("failed to update employee"))?;
        Ok(Some(dto::to_dto(stored)))
    }

    async fn delete(&self, id: i32) -> RegistryResult<Option<EmployeeDto>> {
        let Some(current) = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error("failed to load employee"))?
        else {
            return Ok(None);
        };
        self.repository
            .delete(current.id)
            .await
            .map_err(store_error("failed to delete employee"))?;
        // Snapshot taken before removal.
        Ok(Some(dto::to_dto(current)))
    }

    async fn search(&self, criteria: EmployeeSearchDto) -> RegistryResult<Vec<EmployeeDto>> {
        validate::validate_search(&criteria).map_err(RegistryError::Validation)?;
        let rows = self
            .repository
            .search(&criteria)
            .await
            .map_err(store_error("failed to search employees"))?;
        Ok(rows.into_iter().map(dto::to_dto).collect())
    }
}
