use miette::Result;
use owo_colors::OwoColorize;
use trpux_core::{CatalogDb, CatalogStore};

use super::{table, yes_no};

pub async fn list(db: &CatalogDb) -> Result<()> {
    let card_types = db.list_card_types().await?;
    if card_types.is_empty() {
        println!("{}", "Catalog not initialized, run `trpux init`".dimmed());
        return Ok(());
    }
    let compatibilities = db.list_compatibilities().await?;

    let mut output = table(["Card Type", "Aggregatable", "Source Types"]);
    for card_type in card_types {
        let sources = compatibilities
            .iter()
            .find(|c| c.card_type.id == card_type.id)
            .map(|c| {
                c.source_types
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        output.add_row(vec![
            card_type.name,
            yes_no(card_type.can_be_aggregated).to_string(),
            sources,
        ]);
    }
    println!("{output}");
    Ok(())
}
