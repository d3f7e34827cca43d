//! Core of the employee registry: DTOs, field validation, DTO/entity
//! mapping, the record service, and the persistence gateway.

pub mod dto;
pub mod error;
pub mod repository;
pub mod service;
pub mod validate;

pub use dto::{EmployeeDto, EmployeeInsertDto, EmployeeSearchDto, EmployeeUpdateDto};
pub use error::{RegistryError, RegistryResult, Violation};
pub use repository::{EmployeeRepository, SqlEmployeeRepository};
pub use service::{EmployeeService, RegistryService};
