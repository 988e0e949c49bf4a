//! List backend tables command

use colored::Colorize;
use std::sync::Arc;

use crate::interfaces::cli::CliError;
use crate::storage::{BackendStore, TOP_CLICKED_FUNCTION};

pub async fn list_tables(store: Arc<dyn BackendStore>) -> Result<(), CliError> {
    let tables = store
        .list_tables()
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to list tables: {}", e)))?;

    println!(
        "{} {}",
        "Tables in".bold().green(),
        store.backend_name().to_uppercase().cyan()
    );
    if tables.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for table in &tables {
        println!("  {}", table);
    }
    println!();

    // 确认热门元素聚合可用
    match store.top_clicked_elements(1).await {
        Ok(_) => println!("{} {}", TOP_CLICKED_FUNCTION.cyan(), "available".green()),
        Err(e) => println!(
            "{} {} {}",
            TOP_CLICKED_FUNCTION.cyan(),
            "unavailable:".red(),
            e.message()
        ),
    }
    Ok(())
}
