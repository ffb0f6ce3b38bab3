//! Mutation intents and the update payload shapes they map to.
//!
//! The API distinguishes "structural" task attributes (assignee, parent,
//! list membership, deletion, status) updatable via a direct partial patch,
//! from "custom field" attributes (priority, due date) updatable only via a
//! batch of field effects. Every user-selectable action is described here as
//! a [`MutationIntent`] and routed to the correct shape by
//! [`MutationIntent::into_payload`].

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::feedback::FeedbackLabels;

/// Partial task patch for the direct update endpoint (`PATCH /tasks/{id}`).
///
/// Absent fields are omitted from the body entirely; `parent_task_id` uses a
/// double option so that clearing the parent serializes as an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// Body of the batch update endpoint (`PATCH /tasks`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    pub patches: Vec<TaskPatch>,
}

/// One patch of a batch update: a set of effects applied to a set of tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub task_ids: Vec<String>,
    pub effects: Vec<Effect>,
}

/// A single field-template-scoped change submitted as part of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    #[serde(rename_all = "camelCase")]
    Fields {
        field_template_id: String,
        field: FieldEffect,
    },
}

/// New value of a custom field. Clearing is an explicit null value, never an
/// omitted effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldEffect {
    Label(Option<LabelOption>),
    Date(Option<NaiveDate>),
}

/// Reference to a field label by option id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOption {
    pub option_id: String,
}

/// Field template ids the batch shape needs; resolved from the workspace's
/// field templates before building a payload.
#[derive(Debug, Clone, Default)]
pub struct CustomFieldIds {
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

/// A pure description of one desired change to one task.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    SetAssignee { task_id: String, user_id: String },
    ClearAssignee { task_id: String },
    SetStatus { task_id: String, status_id: String },
    SetPriority { task_id: String, option_id: String },
    ClearPriority { task_id: String },
    SetDueDate { task_id: String, date: NaiveDate },
    ClearDueDate { task_id: String },
    SetParent { task_id: String, parent_id: String },
    ClearParent { task_id: String },
    MoveToList { task_id: String, list_id: String },
    SoftDelete { task_id: String },
}

/// Either of the two request shapes an intent can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    Direct { task_id: String, update: TaskUpdate },
    Batch(BatchUpdate),
}

/// An intent that cannot be expressed because the workspace lacks the field
/// template it targets.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("workspace has no {0} field template")]
    MissingTemplate(&'static str),
}

impl MutationIntent {
    /// Toast titles for the three phases of this intent.
    pub fn labels(&self) -> FeedbackLabels {
        let (pending, success, failure) = match self {
            MutationIntent::SetAssignee { .. } => (
                "Setting assignee",
                "Successfully set assignee 🎉",
                "Failed to set assignee 😥",
            ),
            MutationIntent::ClearAssignee { .. } => (
                "Unsetting assignee",
                "Successfully unset assignee 🎉",
                "Failed to unset assignee 😥",
            ),
            MutationIntent::SetStatus { .. } => (
                "Setting status",
                "Successfully set status 🎉",
                "Failed to set status 😥",
            ),
            MutationIntent::SetPriority { .. } => (
                "Setting priority",
                "Successfully set priority 🎉",
                "Failed to set priority 😥",
            ),
            MutationIntent::ClearPriority { .. } => (
                "Unsetting priority",
                "Successfully unset priority 🎉",
                "Failed to unset priority 😥",
            ),
            MutationIntent::SetDueDate { .. } => (
                "Setting due date",
                "Successfully set due date 🎉",
                "Failed to set due date 😥",
            ),
            MutationIntent::ClearDueDate { .. } => (
                "Unsetting due date",
                "Successfully unset due date 🎉",
                "Failed to unset due date 😥",
            ),
            MutationIntent::SetParent { .. } => (
                "Setting parent task",
                "Successfully set parent task 🎉",
                "Failed to set parent task 😥",
            ),
            MutationIntent::ClearParent { .. } => (
                "Unsetting parent task",
                "Successfully unset parent task 🎉",
                "Failed to unset parent task 😥",
            ),
            MutationIntent::MoveToList { .. } => (
                "Moving task to list",
                "Successfully moved task 🎉",
                "Failed to move task 😥",
            ),
            MutationIntent::SoftDelete { .. } => (
                "Deleting task",
                "Successfully deleted task 🎉",
                "Failed to delete task 😥",
            ),
        };
        FeedbackLabels::new(pending, success, failure)
    }

    /// Resolve this intent into the request shape the API expects.
    pub fn into_payload(self, fields: &CustomFieldIds) -> Result<UpdatePayload, PayloadError> {
        let payload = match self {
            MutationIntent::SetAssignee { task_id, user_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    assignees_ids: Some(vec![user_id]),
                    ..Default::default()
                },
            },
            MutationIntent::ClearAssignee { task_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    assignees_ids: Some(Vec::new()),
                    ..Default::default()
                },
            },
            MutationIntent::SetStatus { task_id, status_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    status: Some(status_id),
                    ..Default::default()
                },
            },
            MutationIntent::SetPriority { task_id, option_id } => batch_effect(
                task_id,
                fields.priority.clone().ok_or(PayloadError::MissingTemplate("priority"))?,
                FieldEffect::Label(Some(LabelOption { option_id })),
            ),
            MutationIntent::ClearPriority { task_id } => batch_effect(
                task_id,
                fields.priority.clone().ok_or(PayloadError::MissingTemplate("priority"))?,
                FieldEffect::Label(None),
            ),
            MutationIntent::SetDueDate { task_id, date } => batch_effect(
                task_id,
                fields.due_date.clone().ok_or(PayloadError::MissingTemplate("due date"))?,
                FieldEffect::Date(Some(date)),
            ),
            MutationIntent::ClearDueDate { task_id } => batch_effect(
                task_id,
                fields.due_date.clone().ok_or(PayloadError::MissingTemplate("due date"))?,
                FieldEffect::Date(None),
            ),
            MutationIntent::SetParent { task_id, parent_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    parent_task_id: Some(Some(parent_id)),
                    ..Default::default()
                },
            },
            MutationIntent::ClearParent { task_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    parent_task_id: Some(None),
                    ..Default::default()
                },
            },
            MutationIntent::MoveToList { task_id, list_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    list_ids: Some(vec![list_id]),
                    ..Default::default()
                },
            },
            MutationIntent::SoftDelete { task_id } => UpdatePayload::Direct {
                task_id,
                update: TaskUpdate {
                    deleted: Some(true),
                    ..Default::default()
                },
            },
        };
        Ok(payload)
    }
}

/// Wrap a single effect into the batch shape, addressed at one task.
fn batch_effect(task_id: String, field_template_id: String, field: FieldEffect) -> UpdatePayload {
    UpdatePayload::Batch(BatchUpdate {
        patches: vec![TaskPatch {
            task_ids: vec![task_id],
            effects: vec![Effect::Fields {
                field_template_id,
                field,
            }],
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field_ids() -> CustomFieldIds {
        CustomFieldIds {
            priority: Some("ft-prio".into()),
            due_date: Some("ft-due".into()),
        }
    }

    fn direct_body(payload: UpdatePayload) -> serde_json::Value {
        match payload {
            UpdatePayload::Direct { update, .. } => serde_json::to_value(update).unwrap(),
            UpdatePayload::Batch(_) => panic!("expected a direct update"),
        }
    }

    fn batch_body(payload: UpdatePayload) -> serde_json::Value {
        match payload {
            UpdatePayload::Batch(batch) => serde_json::to_value(batch).unwrap(),
            UpdatePayload::Direct { .. } => panic!("expected a batch update"),
        }
    }

    #[test]
    fn test_set_assignee_is_a_direct_update() {
        let intent = MutationIntent::SetAssignee {
            task_id: "t1".into(),
            user_id: "u1".into(),
        };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"assigneesIds": ["u1"]}));
    }

    #[test]
    fn test_clear_assignee_sends_empty_list() {
        let intent = MutationIntent::ClearAssignee { task_id: "t1".into() };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"assigneesIds": []}));
    }

    #[test]
    fn test_status_uses_the_direct_shape_with_the_label_id() {
        let intent = MutationIntent::SetStatus {
            task_id: "t1".into(),
            status_id: "st-done".into(),
        };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"status": "st-done"}));
    }

    #[test]
    fn test_set_priority_sends_a_label_option_effect() {
        let intent = MutationIntent::SetPriority {
            task_id: "t1".into(),
            option_id: "p-high".into(),
        };
        let body = batch_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(
            body,
            json!({
                "patches": [{
                    "taskIds": ["t1"],
                    "effects": [{
                        "type": "fields",
                        "fieldTemplateId": "ft-prio",
                        "field": {"label": {"optionId": "p-high"}}
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_clear_priority_sends_an_explicit_null_label() {
        let intent = MutationIntent::ClearPriority { task_id: "t1".into() };
        let body = batch_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(
            body,
            json!({
                "patches": [{
                    "taskIds": ["t1"],
                    "effects": [{
                        "type": "fields",
                        "fieldTemplateId": "ft-prio",
                        "field": {"label": null}
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_due_date_round_trips_through_the_date_effect() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
        let intent = MutationIntent::SetDueDate { task_id: "t1".into(), date };
        let body = batch_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(
            body["patches"][0]["effects"][0]["field"],
            json!({"date": "2026-09-15"})
        );

        let intent = MutationIntent::ClearDueDate { task_id: "t1".into() };
        let body = batch_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(
            body["patches"][0]["effects"][0]["field"],
            json!({"date": null})
        );
    }

    #[test]
    fn test_clear_parent_serializes_null_not_absent() {
        let intent = MutationIntent::ClearParent { task_id: "t1".into() };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"parentTaskId": null}));
    }

    #[test]
    fn test_soft_delete_sets_the_flag_and_leaves_lists_alone() {
        let intent = MutationIntent::SoftDelete { task_id: "t1".into() };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"deleted": true}));
    }

    #[test]
    fn test_move_to_list_replaces_list_membership() {
        let intent = MutationIntent::MoveToList {
            task_id: "t1".into(),
            list_id: "l2".into(),
        };
        let body = direct_body(intent.into_payload(&field_ids()).unwrap());
        assert_eq!(body, json!({"listIds": ["l2"]}));
    }

    #[test]
    fn test_priority_intent_without_template_is_an_error() {
        let intent = MutationIntent::SetPriority {
            task_id: "t1".into(),
            option_id: "p-high".into(),
        };
        let err = intent.into_payload(&CustomFieldIds::default()).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }
}
