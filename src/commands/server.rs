use miette::Result;
use owo_colors::OwoColorize;
use trpux_core::catalog::{self, ServerDraft};
use trpux_core::{CatalogDb, CatalogStore, NewServerArgument};

use super::{table, yes_no};

pub async fn add(
    db: &CatalogDb,
    name: String,
    url: String,
    server_type: String,
    disabled: bool,
    arguments: Vec<NewServerArgument>,
) -> Result<()> {
    let draft = ServerDraft {
        name,
        url,
        server_type,
        disabled,
        arguments: (!arguments.is_empty()).then_some(arguments),
    };
    let server = catalog::create_server(db, &draft).await?;

    println!(
        "{} Created server {} (id {}) at {}",
        "✓".green(),
        server.name.bright_cyan(),
        server.id,
        server.url
    );
    Ok(())
}

pub async fn list(db: &CatalogDb) -> Result<()> {
    let servers = db.list_servers().await?;
    if servers.is_empty() {
        println!("{}", "No servers registered".dimmed());
        return Ok(());
    }

    let mut output = table(["ID", "Name", "URL", "Type", "Arguments", "Reachable", "Disabled"]);
    for server in servers {
        let arguments = db.server_arguments(server.id).await?;
        let keys: Vec<&str> = arguments.iter().map(|a| a.key.as_str()).collect();
        output.add_row(vec![
            server.id.to_string(),
            server.name,
            server.url,
            server.server_type,
            keys.join(", "),
            yes_no(server.is_reachable).to_string(),
            yes_no(server.disabled).to_string(),
        ]);
    }
    println!("{output}");
    Ok(())
}

pub async fn remove(db: &CatalogDb, id: i64) -> Result<()> {
    catalog::delete_server(db, id).await?;
    println!("{} Removed server {}", "✓".green(), id);
    Ok(())
}
