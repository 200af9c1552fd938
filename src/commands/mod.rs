pub mod compat;
pub mod server;
pub mod source;

use std::path::Path;

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use miette::Result;
use owo_colors::OwoColorize;
use trpux_core::config::{self, TrpuxConfig};
use trpux_core::{CatalogDb, seed_default_card_types};

/// Table with the shared CLI look.
pub(crate) fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Create the catalog and seed the built-in card types.
pub async fn init(db: &CatalogDb, config: &TrpuxConfig, write_config: Option<&Path>) -> Result<()> {
    let card_types = seed_default_card_types(db).await?;

    if let Some(path) = write_config {
        config::save_config(config, path).await?;
        println!("{} Wrote configuration to {}", "✓".green(), path.display());
    }

    let stats = db.stats().await?;
    println!(
        "{} Catalog ready at {}",
        "✓".green(),
        config.database.path.display().bright_cyan()
    );
    println!(
        "  {} card types, {} source types, {} servers, {} sources",
        stats.card_type_count, stats.source_type_count, stats.server_count, stats.source_count
    );
    for card_type in card_types {
        println!(
            "  {} {}",
            "•".dimmed(),
            if card_type.can_be_aggregated {
                format!("{} (aggregatable)", card_type.name)
            } else {
                card_type.name
            }
        );
    }
    Ok(())
}
