use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employee::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Employee::FirstName)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employee::MiddleName).string_len(50))
                    .col(ColumnDef::new(Employee::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Employee::SecondLastName).string_len(50))
                    .col(ColumnDef::new(Employee::BirthDate).date().not_null())
                    .col(
                        ColumnDef::new(Employee::Salary)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employee::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employee::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_last_name")
                    .table(Employee::Table)
                    .col(Employee::LastName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employee::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    FirstName,
    MiddleName,
    LastName,
    SecondLastName,
    BirthDate,
    Salary,
    CreatedAt,
    UpdatedAt,
}
