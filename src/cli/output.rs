//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

#[cfg(feature = "audit-log")]
use crate::audit::AuditEntry;
use crate::vault::{Registry, RegistryEntry};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

fn print_empty_hint() {
    info("No entries in this vault yet.");
    tip("Run `passvault add <path>` to add your first entry.");
}

/// Print a table of entries (Path, Username, Created, Updated).
pub fn print_entries_table(entries: &[RegistryEntry]) {
    if entries.is_empty() {
        print_empty_hint();
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Path", "Username", "Created", "Updated"]);

    for e in entries {
        table.add_row(vec![
            e.path.clone(),
            e.username.clone(),
            e.created_at.format(TIME_FORMAT).to_string(),
            e.updated_at.format(TIME_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print entries as a tree grouped by parent path.
pub fn print_entries_tree(registry: &Registry) {
    if registry.is_empty() {
        print_empty_hint();
        return;
    }
    print!("{}", render_tree(registry));
}

/// Print audit events, newest first, with the operation name colored by
/// what it did to the vault.
#[cfg(feature = "audit-log")]
pub fn print_audit_table(events: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["When", "Action", "Path", "Note"]);
    table.add_rows(events.iter().map(|ev| {
        vec![
            ev.timestamp.format(TIME_FORMAT).to_string(),
            action_style(&ev.operation),
            ev.entry_path.clone().unwrap_or_else(|| "-".into()),
            ev.details.clone().unwrap_or_default(),
        ]
    }));
    println!("{table}");
}

#[cfg(feature = "audit-log")]
fn action_style(op: &str) -> String {
    let styled = match op {
        "delete" => style(op).red(),
        "show" => style(op).yellow(),
        "edit" | "rename" => style(op).cyan(),
        _ => style(op).green(),
    };
    styled.to_string()
}

const BRANCH: &str = "\u{251c}\u{2500}\u{2500} ";
const LAST_BRANCH: &str = "\u{2514}\u{2500}\u{2500} ";
const PIPE: &str = "\u{2502}   ";
const SPACE: &str = "    ";

/// Render the tree view as plain text.
///
/// ```text
/// Vault
/// ├── github (alice)
/// └── money
///     ├── bank (bob)
///     └── dbs (carol)
/// ```
pub fn render_tree(registry: &Registry) -> String {
    // Root children: top-level entries first, then one node per group.
    let mut nodes: Vec<(String, Vec<String>)> = Vec::new();
    for (group, members) in registry.groups() {
        let labels: Vec<String> = members.iter().map(|e| entry_label(e)).collect();
        if group.is_empty() {
            nodes.extend(labels.into_iter().map(|l| (l, Vec::new())));
        } else {
            nodes.push((group.to_string(), labels));
        }
    }

    let mut out = String::from("Vault\n");
    let last_node = nodes.len().saturating_sub(1);
    for (i, (label, children)) in nodes.iter().enumerate() {
        let (branch, indent) = if i == last_node {
            (LAST_BRANCH, SPACE)
        } else {
            (BRANCH, PIPE)
        };
        out.push_str(&format!("{branch}{label}\n"));

        let last_child = children.len().saturating_sub(1);
        for (j, child) in children.iter().enumerate() {
            let branch = if j == last_child { LAST_BRANCH } else { BRANCH };
            out.push_str(&format!("{indent}{branch}{child}\n"));
        }
    }
    out
}

fn entry_label(entry: &RegistryEntry) -> String {
    if entry.username.is_empty() {
        entry.name().to_string()
    } else {
        format!("{} ({})", entry.name(), entry.username)
    }
}
