use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use url::form_urlencoded;

use super::{finish_load, page_actions, row_class, run_mutation, PageChrome};
use crate::error::AppResult;
use crate::resources::{Comment, CommentDraft, CommentEdit, Resource, UserRef};
use crate::routes::home::Html;
use crate::state::AppState;
use crate::sync::RowStatus;
use crate::views::{filter_comments, PageEvent, Pagination};

const RESOURCE: Resource = Resource::Comments;

// --- View structs ---

pub struct CommentRow {
    pub id: u64,
    pub body: String,
    pub author: String,
    pub post_id: u64,
    pub likes: u64,
    pub row_class: &'static str,
    pub failed: bool,
    pub editing: bool,
}

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/comments.html")]
pub struct CommentsTemplate {
    pub chrome: PageChrome,
    pub comments: Vec<CommentRow>,
    pub users: Vec<UserRef>,
    pub query: String,
    pub matches: usize,
    pub page: usize,
    pub total_pages: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    /// Query string to carry through forms, including the leading `?`.
    pub back_query: String,
}

// --- Forms ---

#[derive(Deserialize, Default)]
pub struct CommentsQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub edit: Option<u64>,
}

#[derive(Deserialize)]
pub struct NewCommentForm {
    pub body: String,
    #[serde(default = "default_id")]
    pub post_id: u64,
    #[serde(default = "default_id")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct EditCommentForm {
    pub body: String,
}

fn default_id() -> u64 {
    1
}

/// `/comments` with the given search and page, omitting defaults.
fn comments_href(q: &str, page: usize) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if !q.trim().is_empty() {
        params.append_pair("q", q.trim());
    }
    if page > 1 {
        params.append_pair("page", &page.to_string());
    }
    let query = params.finish();
    if query.is_empty() {
        "/comments".to_string()
    } else {
        format!("/comments?{query}")
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments", get(comments_page).post(create_comment))
        .route("/comments/{id}", post(update_comment))
        .route("/comments/{id}/delete", post(delete_comment))
        .merge(page_actions::<Comment>())
}

// --- Handlers ---

async fn comments_page(
    State(state): State<AppState>,
    Query(query): Query<CommentsQuery>,
) -> AppResult<Html<CommentsTemplate>> {
    let loaded = state.sync.with_users::<Comment>().await;
    let (loaded, mut chrome) = finish_load(&state, RESOURCE, "Comments", loaded).await;
    let (comments, users) = match loaded {
        Some((snapshot, users)) => {
            chrome = chrome.with_snapshot_age(&snapshot.saved_at);
            (snapshot.records, users)
        }
        None => (Vec::new(), Vec::new()),
    };

    let search = query.q.unwrap_or_default();
    let matching = filter_comments(&comments, &search);
    let pagination = Pagination::new(
        query.page,
        state.config.pages.comments_per_page,
        matching.len(),
    );

    let flags = state.sync.flags().for_resource(RESOURCE).await;
    let rows = pagination
        .slice(&matching)
        .iter()
        .map(|comment| {
            let status = flags.get(&comment.id);
            CommentRow {
                id: comment.id,
                body: comment.body.clone(),
                author: comment.user.display_name(),
                post_id: comment.post_id,
                likes: comment.likes,
                row_class: row_class(status),
                failed: status == Some(&RowStatus::Failed),
                editing: query.edit == Some(comment.id),
            }
        })
        .collect();

    let here = comments_href(&search, pagination.page);
    let back_query = here.strip_prefix("/comments").unwrap_or_default().to_string();

    Ok(Html(CommentsTemplate {
        chrome,
        comments: rows,
        users,
        matches: matching.len(),
        page: pagination.page,
        total_pages: pagination.total_pages,
        prev_href: pagination
            .has_prev()
            .then(|| comments_href(&search, pagination.prev())),
        next_href: pagination
            .has_next()
            .then(|| comments_href(&search, pagination.next())),
        query: search,
        back_query,
    }))
}

async fn create_comment(
    State(state): State<AppState>,
    Form(form): Form<NewCommentForm>,
) -> Redirect {
    run_mutation(&state, RESOURCE, PageEvent::Submit, "add", async {
        let users = state.sync.users().await;
        let draft = CommentDraft {
            body: form.body.trim().to_string(),
            post_id: form.post_id,
            user_id: form.user_id,
            username: users
                .iter()
                .find(|u| u.id == form.user_id)
                .map(UserRef::display_name),
        };
        state.sync.create(&draft).await
    })
    .await;

    // New comments are prepended, so the first page shows them.
    Redirect::to("/comments")
}

async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(back): Query<CommentsQuery>,
    Form(form): Form<EditCommentForm>,
) -> Redirect {
    let edit = CommentEdit {
        body: form.body.trim().to_string(),
    };
    run_mutation(&state, RESOURCE, PageEvent::Submit, "update", state.sync.update(id, &edit))
        .await;
    Redirect::to(&comments_href(
        back.q.as_deref().unwrap_or_default(),
        back.page.unwrap_or(1),
    ))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(back): Query<CommentsQuery>,
) -> Redirect {
    run_mutation(
        &state,
        RESOURCE,
        PageEvent::Delete(id),
        "delete",
        state.sync.delete::<Comment>(id),
    )
    .await;
    Redirect::to(&comments_href(
        back.q.as_deref().unwrap_or_default(),
        back.page.unwrap_or(1),
    ))
}
