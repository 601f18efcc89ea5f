//! Dashboard
//!
//! - GET /dashboard - Pending drafts of every staged content type

use axum::{response::Html, routing::get, Router};
use serde::Serialize;

use super::middleware::{AdminError, AppState, RequestScope};
use super::resource::{item_href, Row};
use crate::models::DASHBOARD_TYPES;
use crate::services::{DashboardEntry, DashboardSummary};
use crate::views::Section;

/// Drafts of one content type as rendered on the dashboard
#[derive(Debug, Serialize)]
struct PendingSection {
    title: &'static str,
    has_draft: bool,
    rows: Vec<Row>,
}

impl From<&DashboardEntry> for PendingSection {
    fn from(entry: &DashboardEntry) -> Self {
        let rows = entry
            .draft_items
            .iter()
            .map(|item| Row {
                id: item.id,
                label: item.label(),
                href: item_href(entry.kind, item),
                draft: true,
                item: item.clone(),
            })
            .collect();
        Self {
            title: entry.title,
            has_draft: entry.has_draft,
            rows,
        }
    }
}

fn sections(summary: &DashboardSummary) -> Vec<PendingSection> {
    summary.entries.iter().map(PendingSection::from).collect()
}

/// GET /dashboard
pub async fn index(scope: RequestScope) -> Result<Html<String>, AdminError> {
    let summary = scope.dashboard().summarize(&DASHBOARD_TYPES).await?;

    let mut context = scope.page(Section::Dashboard);
    context.insert("has_drafts", &summary.has_drafts_overall);
    context.insert("sections", &sections(&summary));
    scope.render("dashboard.html", &context)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, Item};
    use crate::services::StagedCollection;
    use serde_json::json;

    #[test]
    fn test_sections_link_drafts_to_their_pages() {
        let summary = DashboardSummary::from_collections(vec![
            StagedCollection::new(
                ContentType::Image,
                vec![],
                vec![Item::from_value(4, json!({"carModelID": 2}))],
            ),
            StagedCollection::empty(ContentType::Stage),
        ]);
        let sections = sections(&summary);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].has_draft);
        assert_eq!(sections[0].rows[0].href, "/models/2");
        assert!(!sections[1].has_draft);
        assert!(sections[1].rows.is_empty());
    }
}
