//! Seeds the configured backends: the super admin from `[seed]` by default, or
//! hints from a JSON fixture with `--hints <path>`.

use clap::Parser;
use hintdesk::application_impl::parse_hint_fixture;
use hintdesk::application_port::*;
use hintdesk::domain_model::*;
use hintdesk::logger::*;
use hintdesk::server::Server;
use hintdesk::settings::{Seed, parse_settings};

#[derive(Parser, Debug)]
#[command(name = "seed")]
struct SeedCli {
    #[arg(long)]
    settings: Option<String>,

    /// Load hints from this fixture instead of creating the super admin.
    #[arg(long)]
    hints: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = SeedCli::parse();

    let logger = Logger::new_bootstrap();
    let settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_settings(&settings.log)?;

    let server = Server::try_new(&settings).await?;
    let result = match cli.hints {
        Some(path) => seed_hints(&server, &path).await,
        None => seed_super_admin(&server, &settings.seed).await,
    };
    server.shutdown().await;
    result
}

async fn seed_super_admin(server: &Server, seed: &Seed) -> anyhow::Result<()> {
    let seeder = SystemActor::seeder();
    let input = AddUserInput::super_admin(
        seed.username.clone(),
        seed.password.clone(),
        seed.email.clone(),
    );
    match server.user_service.add(Actor::System(&seeder), input).await {
        Ok(admin) => {
            info!(id = %admin.id, username = %admin.username, "super admin seeded");
            Ok(())
        }
        Err(UserError::UsernameTaken) => {
            info!(username = %seed.username, "super admin already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn seed_hints(server: &Server, path: &str) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(path).await?;
    let hints = parse_hint_fixture(&json)?;
    let count = server.hint_service.import(hints).await?;
    info!(count, path, "hints seeded");
    Ok(())
}
