//! Command implementations for the CLI interface.
//!
//! Every mutation subcommand follows the same path: fetch a directory
//! snapshot, resolve the arguments against it, build a [`MutationIntent`]
//! and run it through the mutation-feedback controller with the console
//! sink. The CLI never operates in a details context, so no revalidation
//! callback is passed.

use std::io::Write;

use chrono::Local;
use clap::{Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use crate::api::HeightClient;
use crate::dates::{format_due_relative, parse_due_input};
use crate::directory::Directory;
use crate::feedback::{
    perform_mutation, MutationOutcome, Toast, ToastId, ToastSink, ToastStyle, ToastUpdate,
};
use crate::fields::MutationIntent;
use crate::task::Task;
use crate::tui::app::ActionMenuApp;
use crate::tui::run::run_action_menu;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive action-menu UI.
    Ui {
        /// Task reference ("T-123"), id or name to open directly.
        task: Option<String>,
    },

    /// List tasks.
    List {
        /// Only tasks belonging to this list (name or id).
        #[arg(long)]
        list: Option<String>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task.
    View {
        /// Task reference, id or name.
        task: String,
    },

    /// Assign a task to a user, or clear the assignee.
    Assign {
        /// Task reference, id or name.
        task: String,
        /// User id or display name.
        user: Option<String>,
        /// Clear the assignee instead.
        #[arg(long)]
        clear: bool,
    },

    /// Set the status of a task.
    Status {
        /// Task reference, id or name.
        task: String,
        /// Status option, by name or id.
        status: String,
    },

    /// Set the priority of a task, or clear it.
    Priority {
        /// Task reference, id or name.
        task: String,
        /// Priority option, by name or id.
        priority: Option<String>,
        /// Clear the priority instead.
        #[arg(long)]
        clear: bool,
    },

    /// Set the due date of a task, or clear it.
    Due {
        /// Task reference, id or name.
        task: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "friday", or "in Nd".
        due: Option<String>,
        /// Clear the due date instead.
        #[arg(long)]
        clear: bool,
    },

    /// Set the parent task, or clear it.
    Parent {
        /// Task reference, id or name.
        task: String,
        /// Parent task reference, id or name.
        parent: Option<String>,
        /// Clear the parent instead.
        #[arg(long)]
        clear: bool,
    },

    /// Move a task to another list.
    Move {
        /// Task reference, id or name.
        task: String,
        /// Destination list, by name or id.
        list: String,
    },

    /// Delete a task (soft delete; the task stays in its lists).
    Delete {
        /// Task reference, id or name.
        task: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Print task content to stdout, for piping to a clipboard tool.
    Copy {
        /// Task reference, id or name.
        task: String,
        /// What to print.
        #[arg(value_enum, default_value = "ref")]
        content: CopyContent,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Copyable views of a task.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CopyContent {
    /// The short reference ("T-123").
    Ref,
    /// The task name.
    Name,
    /// "T-123 name".
    RefWithName,
    /// The task URL.
    Url,
}

/// Toast sink that prints each transition as a console line.
struct ConsoleToasts;

impl ToastSink for ConsoleToasts {
    fn push(&self, toast: Toast) -> ToastId {
        println!("… {}", toast.title);
        0
    }

    fn update(&self, _id: ToastId, update: ToastUpdate) {
        let symbol = match update.style {
            Some(ToastStyle::Success) => "✓",
            Some(ToastStyle::Failure) => "✗",
            _ => "…",
        };
        let title = update.title.unwrap_or_default();
        match update.message {
            Some(message) => println!("{symbol} {title}: {message}"),
            None => println!("{symbol} {title}"),
        }
    }
}

/// Fetch a directory snapshot or exit.
async fn fetch_directory(client: &HeightClient) -> Directory {
    match Directory::fetch(client).await {
        Ok(directory) => directory,
        Err(e) => {
            eprintln!("Failed to fetch workspace data: {e}");
            std::process::exit(1);
        }
    }
}

/// Resolve a task argument or exit.
fn resolve_task<'a>(directory: &'a Directory, identifier: &str) -> &'a Task {
    match directory.resolve_task(identifier) {
        Ok(task) => task,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Run one intent through the feedback controller; exit code 1 on failure.
async fn run_intent(client: &HeightClient, directory: &Directory, intent: MutationIntent) {
    let labels = intent.labels();
    let payload = match intent.into_payload(&directory.custom_field_ids()) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let outcome =
        perform_mutation(&ConsoleToasts, &labels, client.apply(&payload), None::<fn()>).await;
    if outcome == MutationOutcome::Failed {
        std::process::exit(1);
    }
}

/// Launch the action-menu TUI.
pub async fn cmd_ui(client: HeightClient, theme: crate::config::Theme, task: Option<String>) {
    let directory = fetch_directory(&client).await;
    let app = ActionMenuApp::new(client, directory, theme, task.as_deref());
    if let Err(e) = run_action_menu(app) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print a task table.
pub async fn cmd_list(client: &HeightClient, list: Option<String>, limit: Option<usize>) {
    let directory = fetch_directory(client).await;

    let list_id = list.map(|identifier| match directory.resolve_list(&identifier) {
        Ok(list) => list.id.clone(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    });

    let today = Local::now().date_naive();
    let due_template = directory.due_date().map(|t| t.id.clone());
    println!("{:<10} {:<14} {:<20} {:<10} {}", "Ref", "Status", "Assignee", "Due", "Name");
    let rows = directory
        .tasks
        .iter()
        .filter(|t| {
            list_id
                .as_ref()
                .map(|id| t.list_ids.contains(id))
                .unwrap_or(true)
        })
        .take(limit.unwrap_or(usize::MAX));
    for task in rows {
        let status = directory
            .statuses()
            .and_then(|t| t.labels.iter().find(|l| l.id == task.status))
            .map(|l| l.value.as_str())
            .unwrap_or("-");
        let assignee = task
            .assignees_ids
            .first()
            .and_then(|id| directory.user(id))
            .map(|u| u.display_name())
            .unwrap_or_else(|| "-".into());
        let due = due_template
            .as_deref()
            .and_then(|id| task.field(id))
            .and_then(|f| f.date);
        println!(
            "{:<10} {:<14} {:<20} {:<10} {}",
            task.short_ref(),
            status,
            assignee,
            format_due_relative(due, today),
            task.name
        );
    }
}

/// Print the details of one task.
pub async fn cmd_view(client: &HeightClient, task: String) {
    let directory = fetch_directory(client).await;
    let task = resolve_task(&directory, &task);

    let status = directory
        .statuses()
        .and_then(|t| t.labels.iter().find(|l| l.id == task.status))
        .map(|l| l.value.as_str())
        .unwrap_or("-");
    let assignee = task
        .assignees_ids
        .first()
        .and_then(|id| directory.user(id))
        .map(|u| u.display_name())
        .unwrap_or_else(|| "Unassigned".into());
    let lists: Vec<&str> = task
        .list_ids
        .iter()
        .filter_map(|id| directory.list(id).map(|l| l.name.as_str()))
        .collect();
    let priority = directory
        .priorities()
        .and_then(|t| task.field(&t.id))
        .and_then(|f| f.label.as_ref())
        .and_then(|l| l.value.as_deref())
        .unwrap_or("-");
    let due = directory
        .due_date()
        .and_then(|t| task.field(&t.id))
        .and_then(|f| f.date);
    let parent = task
        .parent_task_id
        .as_deref()
        .and_then(|id| directory.task(id))
        .map(|t| format!("{} ({})", t.name, t.short_ref()))
        .unwrap_or_else(|| "-".into());
    let today = Local::now().date_naive();

    println!("{} ({})", task.name, task.short_ref());
    println!("  URL:      {}", task.url);
    println!("  Lists:    {}", lists.join(", "));
    println!("  Status:   {status}");
    println!("  Assignee: {assignee}");
    println!("  Priority: {priority}");
    println!("  Due:      {}", format_due_relative(due, today));
    println!("  Parent:   {parent}");
}

/// Assign a task or clear its assignee.
pub async fn cmd_assign(client: &HeightClient, task: String, user: Option<String>, clear: bool) {
    let directory = fetch_directory(client).await;
    let task_id = resolve_task(&directory, &task).id.clone();

    let intent = match (user, clear) {
        (_, true) => MutationIntent::ClearAssignee { task_id },
        (Some(user), false) => match directory.resolve_user(&user) {
            Ok(user) => MutationIntent::SetAssignee {
                task_id,
                user_id: user.id.clone(),
            },
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        (None, false) => {
            eprintln!("Pass a user or --clear");
            std::process::exit(1);
        }
    };
    run_intent(client, &directory, intent).await;
}

/// Set the status of a task.
pub async fn cmd_status(client: &HeightClient, task: String, status: String) {
    let directory = fetch_directory(client).await;
    let task_id = resolve_task(&directory, &task).id.clone();

    let Some(template) = directory.statuses() else {
        eprintln!("Workspace has no status field template");
        std::process::exit(1);
    };
    match directory.resolve_label(template, &status) {
        Ok(label) => {
            let intent = MutationIntent::SetStatus {
                task_id,
                status_id: label.id.clone(),
            };
            run_intent(client, &directory, intent).await;
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Set or clear the priority of a task.
pub async fn cmd_priority(
    client: &HeightClient,
    task: String,
    priority: Option<String>,
    clear: bool,
) {
    let directory = fetch_directory(client).await;
    let task_id = resolve_task(&directory, &task).id.clone();

    let intent = match (priority, clear) {
        (_, true) => MutationIntent::ClearPriority { task_id },
        (Some(priority), false) => {
            let Some(template) = directory.priorities() else {
                eprintln!("Workspace has no priority field template");
                std::process::exit(1);
            };
            match directory.resolve_label(template, &priority) {
                Ok(label) => MutationIntent::SetPriority {
                    task_id,
                    option_id: label.id.clone(),
                },
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        (None, false) => {
            eprintln!("Pass a priority or --clear");
            std::process::exit(1);
        }
    };
    run_intent(client, &directory, intent).await;
}

/// Set or clear the due date of a task.
pub async fn cmd_due(client: &HeightClient, task: String, due: Option<String>, clear: bool) {
    let directory = fetch_directory(client).await;
    let task_id = resolve_task(&directory, &task).id.clone();

    let intent = match (due, clear) {
        (_, true) => MutationIntent::ClearDueDate { task_id },
        (Some(due), false) => {
            let today = Local::now().date_naive();
            match parse_due_input(&due, today) {
                Some(date) => MutationIntent::SetDueDate { task_id, date },
                None => {
                    eprintln!("Could not parse '{due}' as a date");
                    std::process::exit(1);
                }
            }
        }
        (None, false) => {
            eprintln!("Pass a date or --clear");
            std::process::exit(1);
        }
    };
    run_intent(client, &directory, intent).await;
}

/// Set or clear the parent of a task.
pub async fn cmd_parent(client: &HeightClient, task: String, parent: Option<String>, clear: bool) {
    let directory = fetch_directory(client).await;
    let target = resolve_task(&directory, &task).clone();

    let intent = match (parent, clear) {
        (_, true) => MutationIntent::ClearParent {
            task_id: target.id.clone(),
        },
        (Some(parent), false) => {
            let parent = resolve_task(&directory, &parent);
            // Same eligibility rule as the menu candidates.
            if !directory.parent_candidates(&target).iter().any(|t| t.id == parent.id) {
                eprintln!(
                    "'{}' cannot parent '{}': it must share a list and differ from it",
                    parent.name, target.name
                );
                std::process::exit(1);
            }
            MutationIntent::SetParent {
                task_id: target.id.clone(),
                parent_id: parent.id.clone(),
            }
        }
        (None, false) => {
            eprintln!("Pass a parent task or --clear");
            std::process::exit(1);
        }
    };
    run_intent(client, &directory, intent).await;
}

/// Move a task to another list.
pub async fn cmd_move(client: &HeightClient, task: String, list: String) {
    let directory = fetch_directory(client).await;
    let target = resolve_task(&directory, &task).clone();

    let list = match directory.resolve_list(&list) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if target.list_ids.contains(&list.id) {
        eprintln!("'{}' is already in '{}'", target.name, list.name);
        std::process::exit(1);
    }
    let intent = MutationIntent::MoveToList {
        task_id: target.id.clone(),
        list_id: list.id.clone(),
    };
    run_intent(client, &directory, intent).await;
}

/// Soft-delete a task after confirmation.
pub async fn cmd_delete(client: &HeightClient, task: String, yes: bool) {
    let directory = fetch_directory(client).await;
    let target = resolve_task(&directory, &task).clone();

    if !yes && !confirm(&format!("Delete task \"{}\"?", target.name)) {
        println!("Cancelled");
        return;
    }
    let intent = MutationIntent::SoftDelete { task_id: target.id };
    run_intent(client, &directory, intent).await;
}

/// Print task content to stdout.
pub async fn cmd_copy(client: &HeightClient, task: String, content: CopyContent) {
    let directory = fetch_directory(client).await;
    let task = resolve_task(&directory, &task);
    println!("{}", copy_content(task, content));
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// The copyable rendering of a task.
fn copy_content(task: &Task, content: CopyContent) -> String {
    match content {
        CopyContent::Ref => task.short_ref().to_string(),
        CopyContent::Name => task.name.clone(),
        CopyContent::RefWithName => format!("{} {}", task.short_ref(), task.name),
        CopyContent::Url => task.url.clone(),
    }
}

/// Blocking y/N prompt on stdin.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_content_variants() {
        let task = Task {
            id: "abc".into(),
            name: "Ship it".into(),
            url: "https://example.height.app/space/T-9".into(),
            list_ids: vec!["l1".into()],
            parent_task_id: None,
            assignees_ids: vec![],
            status: "s1".into(),
            deleted: false,
            fields: vec![],
        };
        assert_eq!(copy_content(&task, CopyContent::Ref), "T-9");
        assert_eq!(copy_content(&task, CopyContent::Name), "Ship it");
        assert_eq!(copy_content(&task, CopyContent::RefWithName), "T-9 Ship it");
        assert_eq!(
            copy_content(&task, CopyContent::Url),
            "https://example.height.app/space/T-9"
        );
    }
}
