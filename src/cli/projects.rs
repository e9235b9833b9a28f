use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::warn;

use crate::storage::{entities::TodoId, error::StorageError, record_storage::RecordStorage};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "Register a project under a TODO id")]
    Add {
        #[arg(help = "TODO id, for example TODO-123")]
        todo_id: String,
        #[arg(help = "Project title")]
        title: String,
    },
    #[command(about = "Show all projects")]
    List,
}

pub async fn process_project_command(
    command: ProjectCommand,
    storage: &impl RecordStorage,
    writer: &mut impl Write,
) -> Result<()> {
    match command {
        ProjectCommand::Add { todo_id, title } => {
            let Some(todo_id) = TodoId::new_opt(&todo_id) else {
                bail!("Please provide a TODO id.");
            };
            let title = title.trim();
            if title.is_empty() {
                bail!("Please provide a project title.");
            }

            match storage.add_project(&todo_id, title).await {
                Ok(_) => writeln!(writer, "Project added")?,
                Err(StorageError::DuplicateKey(key)) => {
                    warn!("Rejected duplicate project {key}");
                    bail!("A project with that TODO id already exists.");
                }
                Err(e) => return Err(e).context("Error adding project"),
            }
        }
        ProjectCommand::List => {
            let projects = storage.get_projects().await?;
            if projects.is_empty() {
                writeln!(writer, "No projects added yet.")?;
            }
            for (todo_id, project) in &projects {
                writeln!(writer, "{todo_id}\t{}", project.title)?;
            }
        }
    }
    Ok(())
}
