use miette::Result;
use owo_colors::OwoColorize;
use trpux_core::{CatalogDb, CatalogStore};

use super::{table, yes_no};

pub async fn list(db: &CatalogDb, server: Option<i64>) -> Result<()> {
    let sources: Vec<_> = db
        .list_sources()
        .await?
        .into_iter()
        .filter(|s| server.is_none_or(|id| s.server.id == id))
        .collect();

    if sources.is_empty() {
        println!("{}", "No sources discovered".dimmed());
        return Ok(());
    }

    let mut output = table(["ID", "Name", "Address", "Type", "Server", "Reachable"]);
    for source in sources {
        output.add_row(vec![
            source.id.to_string(),
            source.name.clone(),
            source.address.clone(),
            source.type_name().unwrap_or("-").to_string(),
            source.server.name.clone(),
            yes_no(source.is_reachable).to_string(),
        ]);
    }
    println!("{output}");
    Ok(())
}
