//! Subcommand handlers.

use std::error::Error;

use postgen_application::ports::{CollectionStore, GenerationService};
use postgen_application::{ApplicationError, EditorSession, LoadState};
use postgen_domain::collection::{RequestEdit, method_histogram};
use postgen_domain::generation::{BodyFieldMapping, ConditionKey, ConditionMode, GenerationPlan};
use postgen_domain::request::RequestBody;
use serde_json::Value;

use crate::cli::{AddressArgs, Command, EditArgs, GenerationArgs};

/// Result type of the handlers.
pub type CommandResult = Result<(), Box<dyn Error>>;

/// Runs one subcommand against a fresh session.
///
/// # Errors
///
/// Returns the first error of the command.
pub async fn run<S, G>(command: Command, mut session: EditorSession<S, G>) -> CommandResult
where
    S: CollectionStore,
    G: GenerationService,
{
    match command {
        Command::List { collection } => list(&mut session, &collection).await,
        Command::Edit {
            collection,
            address,
            changes,
            dry_run,
        } => {
            load(&mut session, &collection).await?;
            let address = address.address();
            let edit = apply_changes(RequestEdit::from_request(session.request(&address)?)?, changes);
            let edited = session.edit_request(&address, edit)?;
            println!("edited {edited}");
            save(&mut session, dry_run).await
        }
        Command::Clone {
            collection,
            address,
            dry_run,
        } => {
            load(&mut session, &collection).await?;
            let copy = session.clone_request(&address.address())?;
            println!("created {copy}");
            save(&mut session, dry_run).await
        }
        Command::Delete {
            collection,
            address,
            yes,
            dry_run,
        } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            load(&mut session, &collection).await?;
            let removed = session.delete_request(&address.address())?;
            println!("deleted {} {}", removed.method, removed.name);
            save(&mut session, dry_run).await
        }
        Command::Plan {
            collection,
            address,
            generation,
            payload,
        } => {
            load(&mut session, &collection).await?;
            prepare(&mut session, &address, generation).await?;
            let plan = session.compute_plan()?;
            print_plan(&plan);
            if payload {
                println!("{}", serde_json::to_string_pretty(&plan.payload)?);
            }
            Ok(())
        }
        Command::Generate {
            collection,
            address,
            generation,
        } => {
            load(&mut session, &collection).await?;
            prepare(&mut session, &address, generation).await?;
            let outcome = session.generate().await?;
            println!(
                "generated {} requests in folder `{}`",
                outcome.requests_generated, outcome.folder_name
            );
            Ok(())
        }
    }
}

async fn load<S, G>(session: &mut EditorSession<S, G>, collection: &str) -> CommandResult
where
    S: CollectionStore,
    G: GenerationService,
{
    if session.load_collection(collection).await? == LoadState::NoData {
        return Err(format!("collection {collection} has no editable requests").into());
    }
    Ok(())
}

async fn save<S, G>(session: &mut EditorSession<S, G>, dry_run: bool) -> CommandResult
where
    S: CollectionStore,
    G: GenerationService,
{
    if dry_run {
        println!("dry run, nothing saved");
        return Ok(());
    }
    session.save().await?;
    println!("saved");
    Ok(())
}

async fn list<S, G>(session: &mut EditorSession<S, G>, collection: &str) -> CommandResult
where
    S: CollectionStore,
    G: GenerationService,
{
    if session.load_collection(collection).await? == LoadState::NoData {
        println!("no requests");
        return Ok(());
    }

    let display = session.display();
    for entry in display.entries() {
        println!(
            "{:indent$}{:<7} {}  {}",
            "",
            entry.address.method.as_str(),
            entry.address.name,
            entry.url,
            indent = entry.depth * 2
        );
    }
    let histogram: Vec<String> = method_histogram(display)
        .into_iter()
        .map(|(method, count)| format!("{method} {count}"))
        .collect();
    println!("{} requests ({})", display.len(), histogram.join(", "));
    Ok(())
}

fn apply_changes(mut edit: RequestEdit, changes: EditArgs) -> RequestEdit {
    if let Some(method) = changes.set_method {
        edit.method = method;
    }
    if let Some(url) = changes.url {
        edit.url = url;
    }
    if let Some(headers) = changes.headers {
        edit.headers = headers;
    }
    if changes.no_body {
        edit.body = None;
    } else if let Some(text) = changes.body {
        edit.body = Some(if serde_json::from_str::<Value>(&text).is_ok() {
            RequestBody::raw_json(text)
        } else {
            RequestBody::raw_text(text)
        });
    }
    if let Some(description) = changes.description {
        edit.description = Some(description).filter(|d| !d.is_empty());
    }
    edit
}

/// Selects the template and applies every generation option to the session.
async fn prepare<S, G>(
    session: &mut EditorSession<S, G>,
    address: &AddressArgs,
    options: GenerationArgs,
) -> Result<(), ApplicationError>
where
    S: CollectionStore,
    G: GenerationService,
{
    session.select_template(&address.address())?;

    let sample = match options.sample {
        Some(path) => {
            let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                ApplicationError::Validation(format!("cannot read {}: {e}", path.display()))
            })?;
            Some(serde_json::from_str(&text).map_err(|e| {
                ApplicationError::Validation(format!("{} is not JSON: {e}", path.display()))
            })?)
        }
        None => None,
    };
    session.extract_attributes(sample).await?;

    for custom in options.custom_attributes {
        session.add_custom_attribute(&custom.path, custom.attr_type, custom.nullable)?;
    }
    session.resolve_conditions().await;

    for (attribute, token) in options.custom_conditions {
        session.add_custom_condition(&attribute, &token)?;
    }
    if !options.selections.is_empty() {
        session.set_condition_mode(ConditionMode::Selected);
        for (attribute, keys) in options.selections {
            let keys = keys
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(ConditionKey::from)
                .collect();
            session.select_conditions(&attribute, keys)?;
        }
    }
    for (field, source) in options.mappings {
        session.set_body_mapping(&field, BodyFieldMapping::enabled(source))?;
    }
    session.set_object_type(options.object_type);
    Ok(())
}

fn print_plan(plan: &GenerationPlan) {
    for (path, count) in &plan.per_attribute {
        println!("{path:<32} {count}");
    }
    println!("{} requests would be generated", plan.total_request_count);
}
