//! Migrate command - applies, reverts or reports schema migrations.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::db::MigrationState;
use crate::infra::Database;

fn db_error(e: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}

fn print_states(states: &[MigrationState]) {
    let pending = states.iter().filter(|m| !m.applied).count();
    for state in states {
        let mark = if state.applied { "applied" } else { "pending" };
        println!("{:<8} {}", mark, state.name);
    }
    println!("{} migrations, {} pending", states.len(), pending);
}

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::open(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            let applied = db.migrate_up().await.map_err(db_error)?;
            tracing::info!(applied, "Migrations applied");
        }
        MigrateAction::Down => {
            db.migrate_down().await.map_err(db_error)?;
            tracing::info!("Last migration reverted");
        }
        MigrateAction::Status => {
            let states = db.migration_states().await.map_err(db_error)?;
            print_states(&states);
        }
        MigrateAction::Fresh => {
            if config.is_production() {
                return Err(AppError::invalid_state(
                    "Refusing to drop the schema in production",
                ));
            }
            tracing::warn!("Dropping all tables and rebuilding the schema");
            db.rebuild().await.map_err(db_error)?;
            tracing::info!("Schema rebuilt");
        }
    }

    Ok(())
}
