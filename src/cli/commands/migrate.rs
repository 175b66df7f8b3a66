use clap::Subcommand;

use crate::config;
use crate::db;
use crate::migrate::MigrationRunner;

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Apply all pending migration steps")]
    Run,

    #[command(about = "Show applied and pending steps without executing anything")]
    Status,
}

pub async fn handle(cmd: MigrateCommands) -> anyhow::Result<()> {
    let pool = db::connect(&config::config().database).await?;
    let runner = MigrationRunner::new(pool);

    match cmd {
        MigrateCommands::Run => {
            let report = runner.run().await?;

            for name in &report.applied {
                println!("applied   {}", name);
            }
            for name in &report.swallowed {
                println!("swallowed {}", name);
            }
            for name in &report.skipped {
                println!("skipped   {}", name);
            }
            println!(
                "Migration complete: {} applied, {} swallowed, {} already done",
                report.applied.len(),
                report.swallowed.len(),
                report.skipped.len()
            );
        }

        MigrateCommands::Status => {
            for step in runner.status().await? {
                let state = if step.applied { "applied" } else { "pending" };
                println!("{:<8} {:<28} {:?}", state, step.name, step.kind);
            }
        }
    }

    Ok(())
}
