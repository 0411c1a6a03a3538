use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

/// How the server behaves.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    /// Wrap every success body as `{ "data": ... }`.
    pub envelope: bool,
    /// Start with the sample catalogue instead of an empty one.
    pub seed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            envelope: false,
            seed: true,
        }
    }
}

pub type Db = Arc<RwLock<Vec<Course>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    envelope: bool,
}

impl AppState {
    fn body<T: Serialize>(&self, value: T) -> Json<Value> {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        if self.envelope {
            Json(serde_json::json!({ "data": value }))
        } else {
            Json(value)
        }
    }
}

pub fn seed_courses() -> Vec<Course> {
    let course = |id: &str, title: &str, category: &str| Course {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        description: String::new(),
    };
    vec![
        course("c1", "Intro to Rust", "programming"),
        course("c2", "Async in Practice", "programming"),
        course("c3", "Colour Theory", "design"),
    ]
}

pub fn app() -> Router {
    app_with(ServerOptions::default())
}

pub fn app_with(options: ServerOptions) -> Router {
    let courses = if options.seed { seed_courses() } else { Vec::new() };
    let state = AppState {
        db: Arc::new(RwLock::new(courses)),
        envelope: options.envelope,
    };
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course))
        .with_state(state)
}

pub async fn run(listener: TcpListener, options: ServerOptions) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, envelope = options.envelope, "mock course API listening");
    }
    axum::serve(listener, app_with(options)).await
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let courses = state.db.read().await;
    let matching: Vec<&Course> = courses
        .iter()
        .filter(|c| params.category.as_deref().map_or(true, |cat| c.category == cat))
        .collect();
    debug!(category = ?params.category, count = matching.len(), "list courses");
    state.body(matching)
}

async fn create_course(
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> (StatusCode, Json<Value>) {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        category: input.category,
        description: input.description,
    };
    info!(id = %course.id, "course created");
    state.db.write().await.push(course.clone());
    (StatusCode::CREATED, state.body(course))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let courses = state.db.read().await;
    courses
        .iter()
        .find(|c| c.id == id)
        .map(|c| state.body(c))
        .ok_or(StatusCode::NOT_FOUND)
}
