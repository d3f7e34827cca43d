use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use platform_db::DbPool;
use registry::{
    EmployeeDto, EmployeeInsertDto, EmployeeSearchDto, EmployeeService, EmployeeUpdateDto,
    RegistryError, Violation,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub service: Arc<dyn EmployeeService>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "registry server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(get_all_handler).post(add_handler))
        .route("/employees/search", get(search_handler))
        .route(
            "/employees/{id}",
            get(get_by_id_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn get_all_handler(State(state): State<AppState>) -> HttpResult<Json<Vec<EmployeeDto>>> {
    let employees = state.service.get_all().await?;
    Ok(Json(employees))
}

async fn get_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HttpResult<Response> {
    match state.service.get_by_id(id).await? {
        Some(employee) => Ok(Json(employee).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn search_handler(
    State(state): State<AppState>,
    Query(criteria): Query<EmployeeSearchDto>,
) -> HttpResult<Json<Vec<EmployeeDto>>> {
    let employees = state.service.search(criteria).await?;
    Ok(Json(employees))
}

async fn add_handler(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInsertDto>,
) -> HttpResult<Response> {
    let employee = state.service.add(input).await?;
    let location = format!("/employees/{}", employee.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(employee),
    )
        .into_response())
}

async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<EmployeeUpdateDto>,
) -> HttpResult<Response> {
    match state.service.update(id, input).await? {
        Some(employee) => Ok(Json(employee).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> HttpResult<Response> {
    match state.service.delete(id).await? {
        Some(employee) => Ok(Json(employee).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state
        .pool
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

/// Transport-level error. Validation failures carry the violation list;
/// everything else collapses to a generic payload so internals never leak.
#[derive(Debug)]
enum HttpError {
    Validation(Vec<Violation>),
    Internal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetails {
    status_code: u16,
    message: &'static str,
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(violations) => HttpError::Validation(violations),
            // The service layer already logged the source.
            RegistryError::Service { .. } => HttpError::Internal,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Validation(violations) => {
                (StatusCode::BAD_REQUEST, Json(violations)).into_response()
            }
            HttpError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorDetails {
                    status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    message: "An unexpected error occurred.",
                }),
            )
                .into_response(),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use entity::employee;
    use http_body_util::BodyExt;
    use registry::{EmployeeRepository, RegistryService};
    use sea_orm::DbErr;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<Vec<employee::Model>>,
    }

    #[async_trait]
    impl EmployeeRepository for MemoryRepository {
        async fn find_all(&self) -> Result<Vec<employee::Model>, DbErr> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<employee::Model>, DbErr> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id == id)
                .cloned())
        }

        async fn insert(&self, mut employee: employee::Model) -> Result<employee::Model, DbErr> {
            let mut rows = self.rows.lock().unwrap();
            employee.id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
            rows.push(employee.clone());
            Ok(employee)
        }

        async fn update(&self, employee: employee::Model) -> Result<employee::Model, DbErr> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|row| row.id == employee.id)
                .ok_or_else(|| DbErr::RecordNotFound("employee".into()))?;
            *slot = employee.clone();
            Ok(employee)
        }

        async fn delete(&self, id: i32) -> Result<(), DbErr> {
            self.rows.lock().unwrap().retain(|row| row.id != id);
            Ok(())
        }

        async fn search(
            &self,
            criteria: &EmployeeSearchDto,
        ) -> Result<Vec<employee::Model>, DbErr> {
            let mut matches: Vec<employee::Model> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| {
                    criteria
                        .first_name
                        .as_deref()
                        .filter(|f| !f.is_empty())
                        .is_none_or(|f| row.first_name.contains(f))
                        && criteria
                            .last_name
                            .as_deref()
                            .filter(|f| !f.is_empty())
                            .is_none_or(|f| row.last_name.contains(f))
                        && criteria.birth_date.is_none_or(|d| row.birth_date == d)
                        && criteria.min_salary.is_none_or(|min| row.salary >= min)
                        && criteria.max_salary.is_none_or(|max| row.salary <= max)
                })
                .cloned()
                .collect();
            matches.sort_by_key(|row| row.id);
            let skip = criteria
                .page_number
                .saturating_sub(1)
                .max(0)
                .saturating_mul(criteria.page_size.max(0)) as usize;
            Ok(matches
                .into_iter()
                .skip(skip)
                .take(criteria.page_size.max(0) as usize)
                .collect())
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl EmployeeRepository for FailingRepository {
        async fn find_all(&self) -> Result<Vec<employee::Model>, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
        async fn find_by_id(&self, _id: i32) -> Result<Option<employee::Model>, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
        async fn insert(&self, _employee: employee::Model) -> Result<employee::Model, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
        async fn update(&self, _employee: employee::Model) -> Result<employee::Model, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
        async fn delete(&self, _id: i32) -> Result<(), DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
        async fn search(
            &self,
            _criteria: &EmployeeSearchDto,
        ) -> Result<Vec<employee::Model>, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
    }

    fn test_router(repository: Arc<dyn EmployeeRepository>) -> Router {
        let state = AppState {
            pool: DbPool::default(),
            service: Arc::new(RegistryService::new(repository)),
            config: Arc::new(AppConfig::default()),
        };
        build_router(state)
    }

    fn router() -> Router {
        test_router(Arc::new(MemoryRepository::default()))
    }

    fn john_payload() -> Value {
        json!({
            "firstName": "John",
            "lastName": "Doe",
            "birthDate": "1990-05-01",
            "salary": "8000.00"
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, payload: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn put(uri: &str, payload: &Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn list_is_empty_on_fresh_store() {
        let response = router().oneshot(get_req("/employees")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn post_creates_employee_with_location_header() {
        let app = router();
        let response = app
            .clone()
            .oneshot(post("/employees", &john_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/employees/1"
        );
        let body = body_json(response).await;
        assert_eq!(body["id"], json!(1));
        assert_eq!(body["firstName"], json!("John"));
        assert_eq!(body["salary"], json!("8000.00"));
        assert_eq!(body["createdAt"], body["updatedAt"]);

        let response = app.oneshot(get_req("/employees/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["lastName"], json!("Doe"));
    }

    #[tokio::test]
    async fn post_with_invalid_body_returns_violation_list() {
        let payload = json!({
            "firstName": "John3",
            "lastName": "Doe",
            "birthDate": "1990-05-01",
            "salary": "0"
        });
        let response = router()
            .oneshot(post("/employees", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!([
                { "field": "firstName", "message": "first name may only contain letters" },
                { "field": "salary", "message": "salary must be greater than 0" }
            ])
        );
    }

    #[tokio::test]
    async fn get_missing_employee_is_404_with_empty_body() {
        let response = router().oneshot(get_req("/employees/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn put_updates_existing_and_404s_on_missing() {
        let app = router();
        app.clone()
            .oneshot(post("/employees", &john_payload()))
            .await
            .unwrap();

        let update = json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "birthDate": "1990-05-01",
            "salary": "9500.00"
        });
        let response = app
            .clone()
            .oneshot(put("/employees/1", &update))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["firstName"], json!("Jane"));
        assert_eq!(body["id"], json!(1));

        let response = app.oneshot(put("/employees/42", &update)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_with_invalid_body_is_400_even_for_missing_id() {
        let invalid = json!({ "firstName": "Jane" });
        let response = router()
            .oneshot(put("/employees/42", &invalid))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_returns_the_removed_employee() {
        let app = router();
        app.clone()
            .oneshot(post("/employees", &john_payload()))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/employees/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["firstName"], json!("John"));

        let response = app.oneshot(get_req("/employees/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_filters_and_paginates() {
        let app = router();
        for (first, last, salary) in [
            ("John", "Doe", "8000.00"),
            ("John", "Smith", "6000.00"),
            ("Jane", "Doe", "7000.00"),
        ] {
            let payload = json!({
                "firstName": first,
                "lastName": last,
                "birthDate": "1990-05-01",
                "salary": salary
            });
            app.clone()
                .oneshot(post("/employees", &payload))
                .await
                .unwrap();
        }

        let response = app
            .clone()
            .oneshot(get_req(
                "/employees/search?firstName=John&pageNumber=1&pageSize=10",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let response = app
            .oneshot(get_req(
                "/employees/search?firstName=John&pageNumber=2&pageSize=1",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["lastName"], json!("Smith"));
    }

    #[tokio::test]
    async fn search_with_huge_page_number_is_an_empty_page() {
        let app = router();
        app.clone()
            .oneshot(post("/employees", &john_payload()))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(
                "/employees/search?pageNumber=9223372036854775807&pageSize=2",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn search_without_pagination_is_400() {
        let response = router()
            .oneshot(get_req("/employees/search?firstName=John"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let fields: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["pageNumber", "pageSize"]);
    }

    #[tokio::test]
    async fn store_failure_maps_to_generic_500_body() {
        let app = test_router(Arc::new(FailingRepository));
        let response = app.oneshot(get_req("/employees")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "statusCode": 500, "message": "An unexpected error occurred." })
        );
    }
}
