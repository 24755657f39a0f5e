use std::path::Path;

use kassa_core::SCHEMA_VERSION;
use kassa_storage_json::{load_document_from_path, save_document_to_path};

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{take_flag, CommandError, CommandResult, ShellContext};
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("version", "Show version information", "version", cmd_version),
        CommandDefinition::new(
            "backup",
            "Back up the ledger document",
            "backup [note]",
            cmd_backup,
        ),
        CommandDefinition::new("backups", "List ledger backups", "backups", cmd_backups),
        CommandDefinition::new(
            "restore",
            "Restore the ledger from a backup",
            "restore <backup> [--yes]",
            cmd_restore,
        ),
        CommandDefinition::new(
            "export",
            "Write the ledger document to a JSON file",
            "export <path>",
            cmd_export,
        ),
        CommandDefinition::new(
            "import",
            "Replace the ledger with a JSON file (older formats are upgraded)",
            "import <path> [--yes]",
            cmd_import,
        ),
        CommandDefinition::new(
            "reset",
            "Delete every stored month (debts and goal are kept)",
            "reset [--yes]",
            cmd_reset,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => {
                output::section(format!("Help: {}", command.name));
                output::info(format!("  Description: {}", command.description));
                output::info(format!("  Usage: {}", command.usage));
            }
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    output::section("Available commands");
    for command in context.registry.iter() {
        output::info(format!("  {:<12} {}", command.name, command.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section(format!("Kassa {}", env!("CARGO_PKG_VERSION")));
    output::info(format!("  Document schema: v{SCHEMA_VERSION}"));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = args.join(" ");
    let note = (!note.trim().is_empty()).then_some(note);
    let info = context.store.backup(note.as_deref())?;
    output::success(format!("Backup created: {}", info.id));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.store.list_backups()?;
    output::section("Backups");
    if backups.is_empty() {
        output::info("  No backups yet.");
    }
    for (index, backup) in backups.iter().enumerate() {
        output::info(format!("  {:>2}. {}  ({})", index + 1, backup.id, backup.created_at));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, rest) = take_flag(args, "--yes");
    let id = match rest.as_slice() {
        [id] => *id,
        _ => return Err(CommandError::InvalidArguments("usage: restore <backup> [--yes]".into())),
    };
    if !context.confirm(&format!("Replace the current ledger with `{id}`?"), yes)? {
        return Ok(());
    }
    context.store.restore_backup(id)?;
    output::success(format!("Restored backup `{id}`."));
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args {
        [path] => Path::new(path),
        _ => return Err(CommandError::InvalidArguments("usage: export <path>".into())),
    };
    save_document_to_path(context.store.document(), path)?;
    output::success(format!("Ledger exported to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, rest) = take_flag(args, "--yes");
    let path = match rest.as_slice() {
        [path] => Path::new(*path),
        _ => return Err(CommandError::InvalidArguments("usage: import <path> [--yes]".into())),
    };
    let document = load_document_from_path(path)?;
    let prompt = format!(
        "Replace the current ledger with {} months from {}?",
        document.history.len(),
        path.display()
    );
    if !context.confirm(&prompt, yes)? {
        return Ok(());
    }
    let backup = context.store.import_document(document)?;
    output::success(format!(
        "Imported {}. Previous ledger saved as `{}`.",
        path.display(),
        backup.id
    ));
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, _) = take_flag(args, "--yes");
    if !context.confirm("Delete every stored month?", yes)? {
        return Ok(());
    }
    context.store.clear_all()?;
    output::success("All months deleted.");
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
