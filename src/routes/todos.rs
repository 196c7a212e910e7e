use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::{finish_load, page_actions, row_class, run_mutation, PageChrome};
use crate::error::AppResult;
use crate::resources::{models::username_for, Resource, Todo, TodoDraft, UserRef};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::sync::RowStatus;
use crate::views::{PageEvent, TodoFilter};

const RESOURCE: Resource = Resource::Todos;

// --- View structs ---

pub struct TodoRow {
    pub id: u64,
    pub todo: String,
    pub completed: bool,
    pub user_id: u64,
    pub assignee: String,
    /// Whether the assignee is in the users list offered by the picker.
    pub assignee_known: bool,
    pub row_class: &'static str,
    pub failed: bool,
    pub editing: bool,
}

pub struct FilterTab {
    pub label: &'static str,
    pub value: &'static str,
    pub active: bool,
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/todos.html")]
pub struct TodosTemplate {
    pub chrome: PageChrome,
    pub rows: Vec<TodoRow>,
    pub users: Vec<UserRef>,
    pub tabs: Vec<FilterTab>,
    pub filter: &'static str,
    pub total: usize,
    pub done: usize,
}

// --- Forms ---

#[derive(Deserialize, Default)]
pub struct TodosQuery {
    pub filter: Option<String>,
    pub edit: Option<u64>,
}

#[derive(Deserialize)]
pub struct TodoForm {
    pub todo: String,
    #[serde(default = "default_user")]
    pub user_id: u64,
    /// Checkbox; present when ticked.
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct FilterForm {
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_user() -> u64 {
    1
}

impl TodoForm {
    fn draft(&self) -> TodoDraft {
        TodoDraft {
            todo: self.todo.trim().to_string(),
            completed: self.completed.is_some(),
            user_id: self.user_id,
        }
    }
}

fn back(filter: Option<&str>) -> Redirect {
    match TodoFilter::parse(filter) {
        TodoFilter::All => Redirect::to("/todos"),
        other => Redirect::to(&format!("/todos?filter={}", other.as_str())),
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(todos_page).post(create_todo))
        .route("/todos/{id}", post(update_todo))
        .route("/todos/{id}/toggle", post(toggle_todo))
        .route("/todos/{id}/delete", post(delete_todo))
        .merge(page_actions::<Todo>())
}

// --- Handlers ---

async fn todos_page(
    State(state): State<AppState>,
    Query(query): Query<TodosQuery>,
) -> AppResult<Html<TodosTemplate>> {
    let filter = TodoFilter::parse(query.filter.as_deref());
    let loaded = state.sync.with_users::<Todo>().await;
    let (loaded, mut chrome) = finish_load(&state, RESOURCE, "Todos", loaded).await;
    let (todos, users) = match loaded {
        Some((snapshot, users)) => {
            chrome = chrome.with_snapshot_age(&snapshot.saved_at);
            (snapshot.records, users)
        }
        None => (Vec::new(), Vec::new()),
    };

    let flags = state.sync.flags().for_resource(RESOURCE).await;
    let rows = filter
        .apply(&todos)
        .into_iter()
        .map(|todo| TodoRow {
            id: todo.id,
            todo: todo.todo.clone(),
            completed: todo.completed,
            user_id: todo.user_id,
            assignee: username_for(&users, todo.user_id),
            assignee_known: users.iter().any(|u| u.id == todo.user_id),
            row_class: row_class(flags.get(&todo.id)),
            failed: flags.get(&todo.id) == Some(&RowStatus::Failed),
            editing: query.edit == Some(todo.id),
        })
        .collect();

    let tabs = TodoFilter::ALL
        .iter()
        .map(|f| FilterTab {
            label: match f {
                TodoFilter::All => "All",
                TodoFilter::Active => "Active",
                TodoFilter::Completed => "Completed",
            },
            value: f.as_str(),
            active: *f == filter,
        })
        .collect();

    Ok(Html(TodosTemplate {
        chrome,
        rows,
        users,
        tabs,
        filter: filter.as_str(),
        total: todos.len(),
        done: todos.iter().filter(|t| t.completed).count(),
    }))
}

async fn create_todo(State(state): State<AppState>, Form(form): Form<TodoForm>) -> Redirect {
    let draft = form.draft();
    run_mutation(&state, RESOURCE, PageEvent::Submit, "add", state.sync.create(&draft)).await;
    back(form.filter.as_deref())
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<TodoForm>,
) -> Redirect {
    let draft = form.draft();
    run_mutation(&state, RESOURCE, PageEvent::Submit, "update", state.sync.update(id, &draft))
        .await;
    back(form.filter.as_deref())
}

async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    run_mutation(&state, RESOURCE, PageEvent::Submit, "update", state.sync.toggle_todo(id)).await;
    back(form.filter.as_deref())
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    run_mutation(&state, RESOURCE, PageEvent::Delete(id), "delete", state.sync.delete::<Todo>(id))
        .await;
    back(form.filter.as_deref())
}
