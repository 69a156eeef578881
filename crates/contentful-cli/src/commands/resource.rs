use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use contentful_core::ContentfulError;
use contentful_provider::ContentfulProvider;

use crate::cli::{ApplyArgs, ImportArgs, StateArgs};
use crate::output::{print_success, print_warning, read_json, write_state};

/// Adds an operator hint to errors that need a fresh read before retrying.
fn explain(err: ContentfulError) -> anyhow::Error {
    if err.is_conflict() {
        anyhow::Error::new(err)
            .context("The remote object changed since it was last read; run `contentful read` and retry")
    } else {
        err.into()
    }
}

pub fn types(provider: &ContentfulProvider) -> Result<()> {
    for type_name in provider.types() {
        let format = provider.resource(type_name)?.import_format();
        println!("{:<36} {}", type_name.cyan(), format.pattern());
    }
    Ok(())
}

pub async fn import(provider: &ContentfulProvider, args: &ImportArgs) -> Result<()> {
    let resource = provider.resource(&args.resource_type)?;
    match resource.import(&args.id).await.map_err(explain)? {
        Some(state) => {
            print_success(&format!("Imported {} {}", args.resource_type.cyan(), args.id.cyan()));
            write_state(&state, args.out.as_deref())
        }
        None => anyhow::bail!(
            "{} {} does not exist",
            args.resource_type,
            args.id
        ),
    }
}

pub async fn read(provider: &ContentfulProvider, args: &StateArgs) -> Result<()> {
    let resource = provider.resource(&args.resource_type)?;
    let current = read_json(args.state.as_deref())?;
    match resource.read(current).await.map_err(explain)? {
        Some(state) => write_state(&state, args.out.as_deref()),
        None => {
            print_warning(&format!(
                "{} no longer exists remotely; drop it from state",
                args.resource_type
            ));
            Ok(())
        }
    }
}

pub async fn apply(provider: &ContentfulProvider, args: &ApplyArgs) -> Result<()> {
    let resource = provider.resource(&args.resource_type)?;
    let desired = read_json(args.plan.as_deref())?;

    let state = match args.state.as_deref() {
        Some(path) => {
            let current = read_json(Some(path))?;
            let updated = resource.update(desired, current).await.map_err(explain)?;
            print_success(&format!("Updated {}", args.resource_type.cyan()));
            updated
        }
        None => {
            let created = resource.create(desired).await.map_err(explain)?;
            print_success(&format!("Created {}", args.resource_type.cyan()));
            created
        }
    };
    write_state(&state, args.out.as_deref())
}

pub async fn destroy(provider: &ContentfulProvider, args: &StateArgs) -> Result<()> {
    let resource = provider.resource(&args.resource_type)?;
    let current = read_json(args.state.as_deref())?;
    resource.delete(current).await.map_err(explain)?;
    print_success(&format!("Deleted {}", args.resource_type.cyan()));
    if let Some(out) = args.out.as_deref() {
        remove_state(out)?;
    }
    Ok(())
}

fn remove_state(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
