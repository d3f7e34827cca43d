//! Persistence gateway: thin CRUD + search primitives over the store.
//! No business rules live here; store errors propagate unmodified and the
//! service layer is the single point of translation.

use async_trait::async_trait;
use entity::employee;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::dto::EmployeeSearchDto;

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<employee::Model>, DbErr>;
    async fn find_by_id(&self, id: i32) -> Result<Option<employee::Model>, DbErr>;
    /// Inserts a new row; the id on the argument is ignored and the stored
    /// row with its assigned id is returned.
    async fn insert(&self, employee: employee::Model) -> Result<employee::Model, DbErr>;
    async fn update(&self, employee: employee::Model) -> Result<employee::Model, DbErr>;
    async fn delete(&self, id: i32) -> Result<(), DbErr>;
    async fn search(&self, criteria: &EmployeeSearchDto) -> Result<Vec<employee::Model>, DbErr>;
}

pub struct SqlEmployeeRepository {
    pool: DatabaseConnection,
}

impl SqlEmployeeRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn find_all(&self) -> Result<Vec<employee::Model>, DbErr> {
        employee::Entity::find()
            .order_by_asc(employee::Column::Id)
            .all(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<employee::Model>, DbErr> {
        employee::Entity::find_by_id(id).one(&self.pool).await
    }

    async fn insert(&self, employee: employee::Model) -> Result<employee::Model, DbErr> {
        let model = employee::ActiveModel {
            id: NotSet,
            first_name: Set(employee.first_name),
            middle_name: Set(employee.middle_name),
            last_name: Set(employee.last_name),
            second_last_name: Set(employee.second_last_name),
            birth_date: Set(employee.birth_date),
            salary: Set(employee.salary),
            created_at: Set(employee.created_at),
            updated_at: Set(employee.updated_at),
        };
        model.insert(&self.pool).await
    }

    async fn update(&self, employee: employee::Model) -> Result<employee::Model, DbErr> {
        let model = employee::ActiveModel {
            id: Unchanged(employee.id),
            first_name: Set(employee.first_name),
            middle_name: Set(employee.middle_name),
            last_name: Set(employee.last_name),
            second_last_name: Set(employee.second_last_name),
            birth_date: Set(employee.birth_date),
            salary: Set(employee.salary),
            created_at: Set(employee.created_at),
            updated_at: Set(employee.updated_at),
        };
        model.update(&self.pool).await
    }

    async fn delete(&self, id: i32) -> Result<(), DbErr> {
        employee::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await
            .map(|_| ())
    }

    /// Narrows the base query by each present filter in a fixed order,
    /// then pages the result. Substring matches use the store's `LIKE`
    /// default, which is case sensitive on Postgres. An offset past the
    /// filtered set yields an empty page, not an error.
    async fn search(&self, criteria: &EmployeeSearchDto) -> Result<Vec<employee::Model>, DbErr> {
        let mut query = employee::Entity::find();
        if let Some(first_name) = text_filter(&criteria.first_name) {
            query = query.filter(employee::Column::FirstName.contains(first_name));
        }
        if let Some(last_name) = text_filter(&criteria.last_name) {
            query = query.filter(employee::Column::LastName.contains(last_name));
        }
        if let Some(birth_date) = criteria.birth_date {
            query = query.filter(employee::Column::BirthDate.eq(birth_date));
        }
        if let Some(min_salary) = criteria.min_salary {
            query = query.filter(employee::Column::Salary.gte(min_salary));
        }
        if let Some(max_salary) = criteria.max_salary {
            query = query.filter(employee::Column::Salary.lte(max_salary));
        }

        query
            .order_by_asc(employee::Column::Id)
            .offset(page_offset(criteria.page_number, criteria.page_size))
            .limit(criteria.page_size.max(0) as u64)
            .all(&self.pool)
            .await
    }
}

/// Row offset for one-based pagination. Saturating keeps huge page
/// numbers as an offset past the result set (an empty page) instead of
/// overflowing.
fn page_offset(page_number: i64, page_size: i64) -> u64 {
    page_number
        .saturating_sub(1)
        .max(0)
        .saturating_mul(page_size.max(0)) as u64
}

fn text_filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
