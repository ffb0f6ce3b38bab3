//! Declarative action-menu model.
//!
//! The menu is built as a plain tree of labeled entries from a task and a
//! directory snapshot, decoupled from rendering: the TUI walks the tree, and
//! tests can assert on it directly. Submenus are populated from live
//! candidates (users, field labels, parent-task and move-destination
//! candidates).

use ratatui::style::Color;

use crate::config::Theme;
use crate::directory::{active_labels, Directory};
use crate::fields::MutationIntent;
use crate::task::Task;
use crate::tui::colors::tint_from_hue;

/// One selectable node of the action menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub tint: Color,
    pub kind: MenuEntryKind,
}

/// What selecting an entry does.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntryKind {
    Submenu(Vec<MenuEntry>),
    Action(MenuAction),
}

/// Leaf behaviors of the menu tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    /// Dispatch a mutation immediately.
    Mutate(MutationIntent),
    /// Ask for confirmation first; only the destructive delete uses this.
    ConfirmDelete(MutationIntent),
    /// Open the due-date prompt (empty input clears the date).
    PromptDueDate,
    /// Emit the given content for copying.
    Copy(String),
}

impl MenuEntry {
    fn submenu(label: impl Into<String>, entries: Vec<MenuEntry>, tint: Color) -> Self {
        MenuEntry {
            label: label.into(),
            tint,
            kind: MenuEntryKind::Submenu(entries),
        }
    }

    fn action(label: impl Into<String>, action: MenuAction, tint: Color) -> Self {
        MenuEntry {
            label: label.into(),
            tint,
            kind: MenuEntryKind::Action(action),
        }
    }
}

/// Marker glyph for a status label, by its workflow state.
pub fn status_symbol(status_state: Option<&str>) -> char {
    match status_state {
        Some("started") | Some("inProgress") => '◐',
        Some("completed") | Some("done") => '●',
        Some("canceled") => '✕',
        _ => '○',
    }
}

/// Build the full action-menu tree for one task.
pub fn build_action_menu(task: &Task, directory: &Directory, theme: Theme) -> Vec<MenuEntry> {
    let neutral = tint_from_hue(None, theme);
    let mut menu = Vec::new();

    // Assignee
    let mut assignees = vec![MenuEntry::action(
        "Unassigned",
        MenuAction::Mutate(MutationIntent::ClearAssignee {
            task_id: task.id.clone(),
        }),
        neutral,
    )];
    assignees.extend(directory.users.iter().map(|user| {
        MenuEntry::action(
            user.display_name(),
            MenuAction::Mutate(MutationIntent::SetAssignee {
                task_id: task.id.clone(),
                user_id: user.id.clone(),
            }),
            tint_from_hue(user.hue, theme),
        )
    }));
    menu.push(MenuEntry::submenu("Assign To", assignees, neutral));

    // Status
    if let Some(template) = directory.statuses() {
        let statuses = active_labels(template)
            .into_iter()
            .map(|label| {
                MenuEntry::action(
                    format!("{} {}", status_symbol(label.status_state.as_deref()), label.value),
                    MenuAction::Mutate(MutationIntent::SetStatus {
                        task_id: task.id.clone(),
                        status_id: label.id.clone(),
                    }),
                    tint_from_hue(label.hue, theme),
                )
            })
            .collect();
        menu.push(MenuEntry::submenu("Set Status", statuses, neutral));
    }

    // Priority
    if let Some(template) = directory.priorities() {
        let mut priorities = vec![MenuEntry::action(
            "No priority",
            MenuAction::Mutate(MutationIntent::ClearPriority {
                task_id: task.id.clone(),
            }),
            neutral,
        )];
        priorities.extend(active_labels(template).into_iter().map(|label| {
            MenuEntry::action(
                label.value.clone(),
                MenuAction::Mutate(MutationIntent::SetPriority {
                    task_id: task.id.clone(),
                    option_id: label.id.clone(),
                }),
                tint_from_hue(label.hue, theme),
            )
        }));
        menu.push(MenuEntry::submenu("Set Priority", priorities, neutral));
    }

    // Due date
    if directory.due_date().is_some() {
        menu.push(MenuEntry::action(
            "Set Due Date…",
            MenuAction::PromptDueDate,
            neutral,
        ));
    }

    // Parent task
    let mut parents = vec![MenuEntry::action(
        "No parent task",
        MenuAction::Mutate(MutationIntent::ClearParent {
            task_id: task.id.clone(),
        }),
        neutral,
    )];
    parents.extend(directory.parent_candidates(task).into_iter().map(|parent| {
        let hue = parent
            .list_ids
            .first()
            .and_then(|id| directory.list(id))
            .and_then(|l| l.appearance.as_ref())
            .and_then(|a| a.hue);
        MenuEntry::action(
            parent.name.clone(),
            MenuAction::Mutate(MutationIntent::SetParent {
                task_id: task.id.clone(),
                parent_id: parent.id.clone(),
            }),
            tint_from_hue(hue, theme),
        )
    }));
    menu.push(MenuEntry::submenu("Set Parent Task", parents, neutral));

    // Move
    let destinations = directory
        .move_candidates(task)
        .into_iter()
        .map(|list| {
            let hue = list.appearance.as_ref().and_then(|a| a.hue);
            MenuEntry::action(
                list.name.clone(),
                MenuAction::Mutate(MutationIntent::MoveToList {
                    task_id: task.id.clone(),
                    list_id: list.id.clone(),
                }),
                tint_from_hue(hue, theme),
            )
        })
        .collect();
    menu.push(MenuEntry::submenu("Move To List", destinations, neutral));

    // Delete
    menu.push(MenuEntry::action(
        "Delete Task",
        MenuAction::ConfirmDelete(MutationIntent::SoftDelete {
            task_id: task.id.clone(),
        }),
        Color::Red,
    ));

    // Copies
    let short_ref = task.short_ref().to_string();
    menu.push(MenuEntry::action(
        "Copy Task Ref",
        MenuAction::Copy(short_ref.clone()),
        neutral,
    ));
    menu.push(MenuEntry::action(
        "Copy Task Name",
        MenuAction::Copy(task.name.clone()),
        neutral,
    ));
    menu.push(MenuEntry::action(
        "Copy Ref With Name",
        MenuAction::Copy(format!("{} {}", short_ref, task.name)),
        neutral,
    ));
    menu.push(MenuEntry::action(
        "Copy Task URL",
        MenuAction::Copy(task.url.clone()),
        neutral,
    ));

    menu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{FieldLabel, FieldTemplate, List, ListAppearance, User};

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

    fn directory() -> Directory {
        Directory {
            tasks: vec![
                task("1", "Target", &["L1"]),
                task("2", "Elsewhere", &["L2"]),
                task("3", "Sibling", &["L1", "L3"]),
            ],
            lists: vec![
                List {
                    id: "L1".into(),
                    name: "Backlog".into(),
                    appearance: Some(ListAppearance {
                        hue: Some(200.0),
                        icon_url: None,
                    }),
                },
                List {
                    id: "L2".into(),
                    name: "Sprint".into(),
                    appearance: None,
                },
            ],
            users: vec![User {
                id: "u1".into(),
                firstname: "Ada".into(),
                lastname: "Lovelace".into(),
                hue: Some(120.0),
                picture_url: None,
            }],
            field_templates: vec![
                FieldTemplate {
                    id: "ft-status".into(),
                    name: "Status".into(),
                    standard_type: Some("status".into()),
                    labels: vec![FieldLabel {
                        id: "st-done".into(),
                        value: "Done".into(),
                        hue: Some(140.0),
                        archived: false,
                        status_state: Some("completed".into()),
                    }],
                },
                FieldTemplate {
                    id: "ft-prio".into(),
                    name: "Priority".into(),
                    standard_type: Some("priority".into()),
                    labels: vec![FieldLabel {
                        id: "p-high".into(),
                        value: "High".into(),
                        hue: Some(10.0),
                        archived: false,
                        status_state: None,
                    }],
                },
                FieldTemplate {
                    id: "ft-due".into(),
                    name: "Due date".into(),
                    standard_type: Some("dueDate".into()),
                    labels: vec![],
                },
            ],
        }
    }

    fn entries<'a>(menu: &'a [MenuEntry], label: &str) -> &'a [MenuEntry] {
        match &menu.iter().find(|e| e.label == label).unwrap().kind {
            MenuEntryKind::Submenu(entries) => entries,
            MenuEntryKind::Action(_) => panic!("{label} is not a submenu"),
        }
    }

    #[test]
    fn test_menu_has_the_expected_top_level_entries() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);
        let labels: Vec<&str> = menu.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Assign To",
                "Set Status",
                "Set Priority",
                "Set Due Date…",
                "Set Parent Task",
                "Move To List",
                "Delete Task",
                "Copy Task Ref",
                "Copy Task Name",
                "Copy Ref With Name",
                "Copy Task URL",
            ]
        );
    }

    #[test]
    fn test_assignee_submenu_leads_with_unassigned() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let assignees = entries(&menu, "Assign To");
        assert_eq!(assignees[0].label, "Unassigned");
        assert_eq!(
            assignees[0].kind,
            MenuEntryKind::Action(MenuAction::Mutate(MutationIntent::ClearAssignee {
                task_id: "1".into()
            }))
        );
        assert_eq!(assignees[1].label, "Ada Lovelace");
    }

    #[test]
    fn test_parent_submenu_uses_the_candidate_filter() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let parents = entries(&menu, "Set Parent Task");
        let labels: Vec<&str> = parents.iter().map(|e| e.label.as_str()).collect();
        // "Elsewhere" shares no list with the target; the target itself is
        // excluded.
        assert_eq!(labels, vec!["No parent task", "Sibling"]);
    }

    #[test]
    fn test_move_submenu_excludes_current_lists() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let destinations = entries(&menu, "Move To List");
        let labels: Vec<&str> = destinations.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Sprint"]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let delete = menu.iter().find(|e| e.label == "Delete Task").unwrap();
        assert_eq!(
            delete.kind,
            MenuEntryKind::Action(MenuAction::ConfirmDelete(MutationIntent::SoftDelete {
                task_id: "1".into()
            }))
        );
    }

    #[test]
    fn test_copy_entries_carry_the_task_content() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let copy = |label: &str| match &menu.iter().find(|e| e.label == label).unwrap().kind {
            MenuEntryKind::Action(MenuAction::Copy(content)) => content.clone(),
            _ => panic!("not a copy entry"),
        };
        assert_eq!(copy("Copy Task Ref"), "T-1");
        assert_eq!(copy("Copy Ref With Name"), "T-1 Target");
        assert_eq!(copy("Copy Task URL"), "https://example.height.app/space/T-1");
    }

    #[test]
    fn test_status_entries_carry_state_symbols() {
        let directory = directory();
        let target = directory.task("1").unwrap().clone();
        let menu = build_action_menu(&target, &directory, Theme::Dark);

        let statuses = entries(&menu, "Set Status");
        assert_eq!(statuses[0].label, "● Done");
    }
}
