//! Read-only snapshots of the workspace and pure candidate helpers.
//!
//! A [`Directory`] is fetched once per command and treated as eventually
//! consistent: the remote service owns all of these entities and may have
//! moved on by the time a mutation lands.

use crate::api::{ApiError, HeightClient};
use crate::fields::CustomFieldIds;
use crate::task::{FieldLabel, FieldTemplate, List, Task, User};

/// Snapshot of everything the menus and the CLI resolve against.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub tasks: Vec<Task>,
    pub lists: Vec<List>,
    pub users: Vec<User>,
    pub field_templates: Vec<FieldTemplate>,
}

impl Directory {
    /// Fetch a fresh snapshot.
    pub async fn fetch(client: &HeightClient) -> Result<Self, ApiError> {
        let (tasks, lists, users, field_templates) = tokio::try_join!(
            client.tasks(),
            client.lists(),
            client.users(),
            client.field_templates(),
        )?;
        Ok(Directory {
            tasks,
            lists,
            users,
            field_templates,
        })
    }

    /// Get a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a list by id.
    pub fn list(&self, id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// Get a user by id.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Resolve a task from an id, a short reference ("T-123") or a name.
    /// Name matches are case-insensitive; an ambiguous name is an error that
    /// suggests using the reference instead.
    pub fn resolve_task(&self, identifier: &str) -> Result<&Task, String> {
        if let Some(task) = self.tasks.iter().find(|t| t.id == identifier) {
            return Ok(task);
        }
        if let Some(task) = self
            .tasks
            .iter()
            .find(|t| t.short_ref().eq_ignore_ascii_case(identifier))
        {
            return Ok(task);
        }

        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.name.eq_ignore_ascii_case(identifier))
            .collect();
        match matches.len() {
            0 => Err(format!("No task found matching '{}'", identifier)),
            1 => Ok(matches[0]),
            _ => {
                let mut msg = format!("Multiple tasks found with name '{}':\n", identifier);
                for task in matches {
                    msg.push_str(&format!("  {}: {}\n", task.short_ref(), task.name));
                }
                msg.push_str("Please use the task reference instead.");
                Err(msg)
            }
        }
    }

    /// Resolve a user from an id or a (case-insensitive) display name.
    pub fn resolve_user(&self, identifier: &str) -> Result<&User, String> {
        self.users
            .iter()
            .find(|u| {
                u.id == identifier || u.display_name().eq_ignore_ascii_case(identifier)
            })
            .ok_or_else(|| format!("No user found matching '{}'", identifier))
    }

    /// Resolve a list from an id or a (case-insensitive) name.
    pub fn resolve_list(&self, identifier: &str) -> Result<&List, String> {
        self.lists
            .iter()
            .find(|l| l.id == identifier || l.name.eq_ignore_ascii_case(identifier))
            .ok_or_else(|| format!("No list found matching '{}'", identifier))
    }

    fn template_by_type(&self, standard_type: &str) -> Option<&FieldTemplate> {
        self.field_templates
            .iter()
            .find(|ft| ft.standard_type.as_deref() == Some(standard_type))
    }

    /// The status field template.
    pub fn statuses(&self) -> Option<&FieldTemplate> {
        self.template_by_type("status")
    }

    /// The priority field template.
    pub fn priorities(&self) -> Option<&FieldTemplate> {
        self.template_by_type("priority")
    }

    /// The due-date field template.
    pub fn due_date(&self) -> Option<&FieldTemplate> {
        self.template_by_type("dueDate")
    }

    /// Template ids the batch payload shape needs.
    pub fn custom_field_ids(&self) -> CustomFieldIds {
        CustomFieldIds {
            priority: self.priorities().map(|ft| ft.id.clone()),
            due_date: self.due_date().map(|ft| ft.id.clone()),
        }
    }

    /// Resolve a status or priority label by id or (case-insensitive) value.
    pub fn resolve_label<'a>(
        &self,
        template: &'a FieldTemplate,
        identifier: &str,
    ) -> Result<&'a FieldLabel, String> {
        active_labels(template)
            .into_iter()
            .find(|l| l.id == identifier || l.value.eq_ignore_ascii_case(identifier))
            .ok_or_else(|| {
                format!(
                    "No {} option matching '{}'; known options: {}",
                    template.name.to_lowercase(),
                    identifier,
                    active_labels(template)
                        .iter()
                        .map(|l| l.value.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }

    /// Parent-task candidates for a target task.
    pub fn parent_candidates(&self, target: &Task) -> Vec<&Task> {
        parent_candidates(&self.tasks, target)
    }

    /// Move-destination candidates for a target task.
    pub fn move_candidates(&self, target: &Task) -> Vec<&List> {
        move_candidates(&self.lists, target)
    }
}

/// Labels of a template that are still selectable.
pub fn active_labels(template: &FieldTemplate) -> Vec<&FieldLabel> {
    template.labels.iter().filter(|l| !l.archived).collect()
}

/// Tasks eligible to become the parent of `target`: they must share at
/// least one list with it and must not be the task itself.
pub fn parent_candidates<'a>(tasks: &'a [Task], target: &Task) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.id != target.id && t.list_ids.iter().any(|id| target.list_ids.contains(id)))
        .collect()
}

/// Lists `target` can be moved to: everything it does not already belong to.
pub fn move_candidates<'a>(lists: &'a [List], target: &Task) -> Vec<&'a List> {
    lists
        .iter()
        .filter(|l| !target.list_ids.contains(&l.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, name: &str, list_ids: &[&str]) -> Task {
        Task {
            id: id.into(),
            name: name.into(),
            url: format!("https://example.height.app/space/T-{id}"),
            list_ids: list_ids.iter().map(|s| s.to_string()).collect(),
            parent_task_id: None,
            assignees_ids: vec![],
            status: "st-open".into(),
            deleted: false,
            fields: vec![],
        }
    }

    fn list(id: &str, name: &str) -> List {
        List {
            id: id.into(),
            name: name.into(),
            appearance: None,
        }
    }

    #[test]
    fn test_parent_candidates_share_a_list_and_exclude_self() {
        let t1 = task("1", "target", &["A"]);
        let t2 = task("2", "other list", &["B"]);
        let t3 = task("3", "shared list", &["A", "C"]);
        let tasks = vec![t1.clone(), t2, t3];

        let candidates = parent_candidates(&tasks, &t1);
        let ids: Vec<&str> = candidates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn test_move_candidates_exclude_current_lists() {
        let lists = vec![list("L1", "Backlog"), list("L2", "Sprint"), list("L3", "Icebox")];
        let target = task("1", "target", &["L1"]);

        let candidates = move_candidates(&lists, &target);
        let ids: Vec<&str> = candidates.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["L2", "L3"]);
    }

    #[test]
    fn test_resolve_task_by_ref_and_ambiguous_name() {
        let directory = Directory {
            tasks: vec![
                task("1", "Fix login", &["A"]),
                task("2", "Fix login", &["A"]),
                task("3", "Ship", &["A"]),
            ],
            ..Default::default()
        };

        assert_eq!(directory.resolve_task("T-3").unwrap().id, "3");
        assert_eq!(directory.resolve_task("ship").unwrap().id, "3");
        let err = directory.resolve_task("Fix login").unwrap_err();
        assert!(err.contains("Multiple tasks"));
        assert!(err.contains("T-1"));
    }

    #[test]
    fn test_archived_labels_are_not_candidates() {
        let template = FieldTemplate {
            id: "ft".into(),
            name: "Priority".into(),
            standard_type: Some("priority".into()),
            labels: vec![
                FieldLabel {
                    id: "p1".into(),
                    value: "High".into(),
                    hue: Some(10.0),
                    archived: false,
                    status_state: None,
                },
                FieldLabel {
                    id: "p2".into(),
                    value: "Retired".into(),
                    hue: None,
                    archived: true,
                    status_state: None,
                },
            ],
        };
        let labels = active_labels(&template);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].id, "p1");
        assert!(
            Directory::default()
                .resolve_label(&template, "Retired")
                .is_err()
        );
    }

    #[test]
    fn test_custom_field_ids_come_from_standard_types() {
        let directory = Directory {
            field_templates: vec![
                FieldTemplate {
                    id: "ft-status".into(),
                    name: "Status".into(),
                    standard_type: Some("status".into()),
                    labels: vec![],
                },
                FieldTemplate {
                    id: "ft-due".into(),
                    name: "Due date".into(),
                    standard_type: Some("dueDate".into()),
                    labels: vec![],
                },
            ],
            ..Default::default()
        };
        let ids = directory.custom_field_ids();
        assert_eq!(ids.priority, None);
        assert_eq!(ids.due_date.as_deref(), Some("ft-due"));
    }
}
