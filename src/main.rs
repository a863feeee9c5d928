use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wardrobe::api::{HttpOutfitApi, MemoryOutfitApi, OutfitApi};
use wardrobe::catalog::{FilterCriteria, StatusFilter};
use wardrobe::config::{Cli, Command, Config};
use wardrobe::dashboard::Dashboard;
use wardrobe::engagement::{EngagementService, MutationOutcome, ReactionKind, ReactionTarget};
use wardrobe::error::CatalogError;
use wardrobe::models::{CommentId, OutfitId, ReplyId, UserId};
use wardrobe::render;
use wardrobe::session::{ActingUser, Session};
use wardrobe::store::{EntityStore, SharedStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let mut session = config.session();

    let api: Arc<dyn OutfitApi> = if cli.demo {
        tracing::info!("Using seeded in-process catalog");
        demo_api(&mut session).await
    } else {
        tracing::info!("Catalog API: {}", config.api.base_url);
        Arc::new(HttpOutfitApi::new(&config.api.base_url)?)
    };
    let store = EntityStore::shared();

    if let Err(e) = run(cli.command, api, store, session, config.catalog.page_size).await {
        eprintln!("{}", e.notice());
        std::process::exit(1);
    }
    Ok(())
}

/// Demo mode trusts whatever identity the config names, or signs in as a demo admin.
async fn demo_api(session: &mut Session) -> Arc<dyn OutfitApi> {
    let user = session.user.get_or_insert_with(|| ActingUser {
        id: UserId::new("demo"),
        display_name: "Demo".to_string(),
        is_admin: true,
    });
    let user = user.clone();
    let token = session.token.get_or_insert_with(|| "demo".to_string()).clone();

    let api = MemoryOutfitApi::seeded();
    api.register_user(token, user).await;
    Arc::new(api)
}

async fn run(
    command: Command,
    api: Arc<dyn OutfitApi>,
    store: SharedStore,
    session: Session,
    page_size: usize,
) -> Result<(), CatalogError> {
    match command {
        Command::List {
            search,
            category,
            section,
            status,
            page,
        } => {
            let mut dashboard = Dashboard::new(api, store, session, page_size)?;
            dashboard.refresh().await?;
            dashboard.set_criteria(FilterCriteria {
                search: search.unwrap_or_default(),
                category,
                section,
                status: status.as_deref().map(str::parse::<StatusFilter>).transpose()?,
            });
            dashboard.go_to_page(page).await?;
            print!("{}", render::outfit_table(&dashboard.page().await?));
        }
        Command::Show { outfit } => {
            let service = EngagementService::new(api, store.clone(), session);
            let id = OutfitId::new(outfit);
            let tree = service.open(&id).await?;
            let store = store.lock().await;
            let outfit = store
                .get(&id)
                .ok_or_else(|| CatalogError::NotFound(format!("outfit {id}")))?;
            print!("{}", render::outfit_detail(outfit, &tree, service.session()));
        }
        Command::Comment { outfit, text } => {
            let (service, id) = open(api, store, session, outfit).await?;
            report(service.add_comment(&id, &text).await?);
        }
        Command::Reply {
            outfit,
            comment,
            text,
        } => {
            let (service, id) = open(api, store, session, outfit).await?;
            report(
                service
                    .add_reply(&id, &CommentId::new(comment), &text)
                    .await?,
            );
        }
        Command::RemoveComment { outfit, comment } => {
            let (service, id) = open(api, store, session, outfit).await?;
            report(service.remove_comment(&id, &CommentId::new(comment)).await?);
        }
        Command::RemoveReply {
            outfit,
            comment,
            reply,
        } => {
            let (service, id) = open(api, store, session, outfit).await?;
            report(
                service
                    .remove_reply(&id, &CommentId::new(comment), &ReplyId::new(reply))
                    .await?,
            );
        }
        Command::React {
            outfit,
            comment,
            reply,
            kind,
        } => {
            let kind: ReactionKind = kind.parse()?;
            let target = match (comment, reply) {
                (Some(c), Some(r)) => ReactionTarget::Reply(CommentId::new(c), ReplyId::new(r)),
                (Some(c), None) => ReactionTarget::Comment(CommentId::new(c)),
                (None, _) => ReactionTarget::Outfit,
            };
            let (service, id) = open(api, store, session, outfit).await?;
            report(service.toggle_reaction(&id, target, kind).await?);
        }
        Command::Delete { outfit } => {
            let mut dashboard = Dashboard::new(api, store, session, page_size)?;
            dashboard.delete_outfit(&OutfitId::new(outfit)).await?;
            println!("Deleted.");
        }
        Command::Activate { outfit } => {
            let mut dashboard = Dashboard::new(api, store, session, page_size)?;
            dashboard.set_active(&OutfitId::new(outfit), true).await?;
            println!("Activated.");
        }
        Command::Deactivate { outfit } => {
            let mut dashboard = Dashboard::new(api, store, session, page_size)?;
            dashboard.set_active(&OutfitId::new(outfit), false).await?;
            println!("Deactivated.");
        }
    }
    Ok(())
}

async fn open(
    api: Arc<dyn OutfitApi>,
    store: SharedStore,
    session: Session,
    outfit: String,
) -> Result<(EngagementService, OutfitId), CatalogError> {
    let service = EngagementService::new(api, store, session);
    let id = OutfitId::new(outfit);
    service.open(&id).await?;
    Ok((service, id))
}

fn report(outcome: MutationOutcome) {
    match outcome {
        MutationOutcome::Applied(outfit) => println!(
            "Done. {} comments, {} likes.",
            outfit.number_of_comments, outfit.number_of_likes
        ),
        MutationOutcome::Discarded => println!("View closed before the server answered."),
    }
}
