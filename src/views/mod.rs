//! In-process list shaping for the pages: filters, pagination and
//! timestamps.

pub mod editor;
pub mod page;

use chrono::{DateTime, Utc};

use crate::resources::{Comment, Todo};

pub use editor::{DraftEditor, EditorTarget};
pub use page::{PageBoard, PageEvent, PageState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Active, TodoFilter::Completed];

    /// Unknown values fall back to `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("active") => TodoFilter::Active,
            Some("completed") => TodoFilter::Completed,
            _ => TodoFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TodoFilter::All => "all",
            TodoFilter::Active => "active",
            TodoFilter::Completed => "completed",
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Active => !todo.completed,
            TodoFilter::Completed => todo.completed,
        }
    }

    pub fn apply<'a>(self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Case-insensitive substring match on body or username. A blank query
/// keeps everything.
pub fn filter_comments<'a>(comments: &'a [Comment], query: &str) -> Vec<&'a Comment> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return comments.iter().collect();
    }
    comments
        .iter()
        .filter(|c| {
            c.body.to_lowercase().contains(&needle)
                || c
                    .user
                    .username
                    .as_deref()
                    .is_some_and(|u| u.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Page-number arithmetic over a fixed page size. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Clamps the requested page into `1..=total_pages`.
    pub fn new(requested: Option<usize>, per_page: usize, total_items: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = requested.unwrap_or(1).clamp(1, total_pages);
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.per_page).min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range()]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn prev(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next(&self) -> usize {
        (self.page + 1).min(self.total_pages)
    }
}

/// "just now", "5m ago", "3h ago", "2d ago", then a calendar date.
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}
