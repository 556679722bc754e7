use chrono::DateTime;
use ratatui::text::Text;
use serde::Deserialize;

use crate::markdown::{html_to_markdown, Renderer};

/// Azure DevOps identity reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItemFields {
    #[serde(rename = "System.Title")]
    pub title: String,
    #[serde(rename = "System.State")]
    pub state: String,
    #[serde(rename = "System.AssignedTo")]
    pub assigned_to: Option<Identity>,
    #[serde(rename = "System.Description")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    #[serde(default)]
    pub fields: WorkItemFields,
    /// REST url of the record, not the web page.
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub pull_request_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<Identity>,
    #[serde(default)]
    pub creation_date: String,
}

/// `{ "count": n, "value": [...] }` envelope used by list endpoints
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[allow(dead_code)]
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResponse {
    #[serde(default)]
    pub work_items: Vec<WorkItemRef>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemRef {
    pub id: u64,
}

/// A row the dashboard can list, preview, open and copy.
#[derive(Debug, Clone)]
pub enum Item {
    WorkItem(WorkItem),
    PullRequest(PullRequest),
}

impl Item {
    pub fn id(&self) -> u64 {
        match self {
            Item::WorkItem(wi) => wi.id,
            Item::PullRequest(pr) => pr.pull_request_id,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Item::WorkItem(wi) => format!("[{}] {}", wi.id, wi.fields.title),
            Item::PullRequest(pr) => format!("[{}] {}", pr.pull_request_id, pr.title),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Item::WorkItem(wi) => format!(
                "({}) {}",
                wi.fields.state,
                display_name(wi.fields.assigned_to.as_ref())
            ),
            Item::PullRequest(pr) => format!(
                "{} - {}",
                display_name(pr.created_by.as_ref()),
                format_date(&pr.creation_date)
            ),
        }
    }

    pub fn filter_key(&self) -> String {
        self.title() + &self.summary()
    }

    /// Web url for the record. Work item REST urls are rewritten to the edit page.
    /// Pull requests have no web url.
    pub fn url(&self) -> String {
        match self {
            Item::WorkItem(wi) => wi.url.replacen("_apis/wit/workItems", "_workitems/edit", 1),
            Item::PullRequest(_) => String::new(),
        }
    }

    pub fn preview_markdown(&self) -> String {
        match self {
            Item::WorkItem(wi) => format!(
                "{}\n# {}\n---\n{}\n- URL: {}\n",
                wi.id,
                wi.fields.title,
                html_to_markdown(wi.fields.description.as_deref().unwrap_or_default()),
                wi.url
            ),
            Item::PullRequest(pr) => format!(
                "{}\n# {}\n---\n{}\n",
                pr.pull_request_id,
                pr.title,
                html_to_markdown(pr.description.as_deref().unwrap_or_default())
            ),
        }
    }

    pub fn preview(&self, renderer: &Renderer) -> Text<'static> {
        renderer.render(&self.preview_markdown())
    }
}

fn display_name(identity: Option<&Identity>) -> &str {
    identity.map(|i| i.display_name.as_str()).unwrap_or("")
}

/// `2024-03-05T10:00:00Z` -> `March 5, 2024`; unparseable input is returned as-is.
fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(e) => {
            tracing::debug!(date = raw, error = %e, "unparseable creation date");
            raw.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn work_item(id: u64, title: &str, description: Option<&str>) -> Item {
        Item::WorkItem(WorkItem {
            id,
            fields: WorkItemFields {
                title: title.to_string(),
                state: "Active".to_string(),
                assigned_to: Some(Identity {
                    display_name: "Ada Lovelace".to_string(),
                }),
                description: description.map(String::from),
            },
            url: format!("https://dev.azure.com/org/_apis/wit/workItems/{}", id),
        })
    }

    pub fn pull_request(id: u64, title: &str) -> Item {
        Item::PullRequest(PullRequest {
            pull_request_id: id,
            title: title.to_string(),
            description: None,
            created_by: Some(Identity {
                display_name: "Grace Hopper".to_string(),
            }),
            creation_date: "2024-03-05T10:00:00Z".to_string(),
        })
    }
}
