//! Wire model for the Height API.
//!
//! This module defines the entities the API returns: tasks, lists, users and
//! field templates. All of them are owned by the remote service; this client
//! only ever holds transient, possibly-stale copies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single task as returned by the API.
///
/// A task always belongs to at least one list. Deletion is a soft flag and
/// never removes the task from its lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub url: String,
    pub list_ids: Vec<String>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub assignees_ids: Vec<String>,
    /// Id of the current status label.
    pub status: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub fields: Vec<TaskField>,
}

impl Task {
    /// The task's short reference ("T-123"), taken from the final path
    /// segment of its url.
    pub fn short_ref(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// Current value of a custom field, if the task carries one for the
    /// given template.
    pub fn field(&self, field_template_id: &str) -> Option<&TaskField> {
        self.fields
            .iter()
            .find(|f| f.field_template_id == field_template_id)
    }
}

/// A custom-field value attached to a task (priority, due date, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskField {
    pub field_template_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub label: Option<TaskFieldLabel>,
}

/// The selected label of a label-typed custom field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFieldLabel {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// A list a task can belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub appearance: Option<ListAppearance>,
}

/// Display hints for a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppearance {
    #[serde(default)]
    pub hue: Option<f64>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// A workspace member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub hue: Option<f64>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl User {
    /// Full display name, "Firstname Lastname".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Remote-defined schema entry describing a customizable task attribute
/// (status, priority, due date) and its allowed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTemplate {
    pub id: String,
    pub name: String,
    /// Well-known template kind: "status", "priority", "dueDate", ...
    #[serde(default)]
    pub standard_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<FieldLabel>,
}

/// An allowed value of a field template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLabel {
    pub id: String,
    /// Display text, e.g. "In progress" or "High".
    pub value: String,
    #[serde(default)]
    pub hue: Option<f64>,
    #[serde(default)]
    pub archived: bool,
    /// For status labels: "backLog", "started", "completed", ...
    #[serde(default)]
    pub status_state: Option<String>,
}

/// Response envelope common to the list and mutation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// What every mutation endpoint resolves to.
pub type TaskCollection = Collection<Task>;
