//! The `entities` subcommand: list and edit the roster that `extract` walks.

use std::path::Path;

use anyhow::{bail, Result};
use clap::{ArgAction, Args, Subcommand};
use tceprest_lib::validation;

use crate::commands::open_db;
use crate::output::{print_entities, OutputFormat};

#[derive(Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Subcommand)]
pub enum EntitiesCommand {
    /// List registered entities ordered by report code
    List {
        /// Only show entities included in extractions
        #[arg(long)]
        only_active: bool,
    },
    /// Register an entity, or rename it if the code is already known
    Add {
        /// Portal report code (e.g. 17 or 017)
        #[arg(long)]
        code: String,

        /// Display name used in progress lines and stored rows
        #[arg(long)]
        name: String,

        /// Register without including it in extractions
        #[arg(long)]
        inactive: bool,
    },
    /// Include or exclude an entity from extractions
    SetActive {
        /// Portal report code
        #[arg(long)]
        code: String,

        /// true or false
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
}

pub fn run(args: &EntitiesArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let db = open_db(db_path)?;

    match &args.command {
        EntitiesCommand::List { only_active } => {
            let entities = db.list_entities(*only_active)?;
            print_entities(&entities, format)?;
        }
        EntitiesCommand::Add {
            code,
            name,
            inactive,
        } => {
            let code = validation::validate_report_code(code)?;
            let name = validation::validate_entity_name(name)?;
            let id = db.upsert_entity(code, &name, !inactive)?;
            eprintln!("Registered {} ({}) as entity {}", name, code, id);
        }
        EntitiesCommand::SetActive { code, active } => {
            let code = validation::validate_report_code(code)?;
            if !db.set_entity_active(code, *active)? {
                bail!("no entity with report code {}", code);
            }
            eprintln!(
                "Entity {} is now {}",
                code,
                if *active { "active" } else { "inactive" }
            );
        }
    }

    Ok(())
}
