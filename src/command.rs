// Command layer - typed user actions dispatched to the collection store.
//
// The presentation layer never touches the store directly: it builds a
// Command, dispatches it, and renders the outcome (or the error). Every
// successful mutation ends with a persistence save, so the durable slot
// always holds the last valid state.

use crate::error::Result;
use crate::import::import_file;
use crate::persistence::{self, StateStore};
use crate::store::{CatalogStore, Record, RecordFields, SourceBatch};

/// One user action against the catalog.
#[derive(Debug, Clone)]
pub enum Command {
    AddRecord(RecordFields),
    EditRecord { id: String, fields: RecordFields },
    RemoveRecord { id: String },
    RemoveBatch { source_id: String },
    RemoveManual,
    ImportFile { file_name: String, text: String },
}

/// What a successfully dispatched command produced.
#[derive(Debug)]
pub enum CommandOutcome {
    Added(Record),
    Edited(Record),
    Removed(Record),
    BatchRemoved { source_id: String, records_removed: usize },
    ManualRemoved { records_removed: usize },
    Imported(SourceBatch),
}

/// Apply one command. On error the store is untouched and nothing is
/// saved; the caller surfaces the message and the view stays as it was.
pub fn dispatch(
    store: &mut CatalogStore,
    state: &mut dyn StateStore,
    command: Command,
) -> Result<CommandOutcome> {
    let outcome = match command {
        Command::AddRecord(fields) => CommandOutcome::Added(store.add_manual(fields)?),
        Command::EditRecord { id, fields } => CommandOutcome::Edited(store.edit(&id, fields)?),
        Command::RemoveRecord { id } => CommandOutcome::Removed(store.remove(&id)?),
        Command::RemoveBatch { source_id } => {
            let records_removed = store.remove_batch(&source_id)?;
            CommandOutcome::BatchRemoved {
                source_id,
                records_removed,
            }
        }
        Command::RemoveManual => CommandOutcome::ManualRemoved {
            records_removed: store.remove_manual(),
        },
        Command::ImportFile { file_name, text } => {
            // the import pipeline saves on its own
            return Ok(CommandOutcome::Imported(import_file(
                store, state, &file_name, &text,
            )?));
        }
    };

    persistence::save(store, state)?;
    Ok(outcome)
}
