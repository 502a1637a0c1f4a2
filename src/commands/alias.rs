//! `model-finder alias` commands.

use crate::alias::AliasMap;
use crate::cli::AliasCommand;
use crate::config::FinderConfig;
use crate::context::ServiceContext;

/// Execute an `alias` subcommand.
///
/// # Errors
///
/// Returns an error if the alias file is unreadable or malformed, an edit
/// is rejected, or the file cannot be written.
pub fn run(ctx: &ServiceContext, config: &FinderConfig, command: &AliasCommand) -> Result<(), String> {
    let path = &config.paths.alias_file;
    let mut aliases = AliasMap::try_load(&*ctx.fs, path)?;
    match command {
        AliasCommand::List => {
            if aliases.is_empty() {
                println!("No aliases in {}", path.display());
                return Ok(());
            }
            for entry in aliases.entries() {
                let notes =
                    if entry.notes.is_empty() { String::new() } else { format!("  # {}", entry.notes) };
                println!("{}  {} -> {}{notes}", entry.id, entry.original_name, entry.corrected_name);
            }
        }
        AliasCommand::Add { original, corrected, notes } => {
            let id = aliases.add(original, corrected, notes, &*ctx.id_gen)?;
            aliases.save(&*ctx.fs, path)?;
            println!("Added alias {id}");
        }
        AliasCommand::Update { id, original, corrected, notes } => {
            aliases.update(id, original, corrected, notes)?;
            aliases.save(&*ctx.fs, path)?;
            println!("Updated alias {id}");
        }
        AliasCommand::Remove { id } => {
            let removed = aliases.remove(id)?;
            aliases.save(&*ctx.fs, path)?;
            println!("Removed alias {id} ({})", removed.original_name);
        }
    }
    Ok(())
}
