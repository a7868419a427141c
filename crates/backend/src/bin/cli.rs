use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use diesel_async::AsyncPgConnection;
use fyyur_backend::{
    db::{self, shows, venues},
    seed,
    services::CatalogService,
    templates::filters,
};

#[derive(Parser)]
#[command(name = "fyyur-cli")]
#[command(about = "Admin tool for the Fyyur database")]
#[command(
    long_about = "A command-line interface for maintaining the Fyyur database.\n\n\
    Applies migrations, loads sample data, and prints the venue, artist\n\
    and show listings without going through the web server."
)]
struct Cli {
    /// PostgreSQL connection URL.
    ///
    /// Falls back to DATABASE_URL from the environment or a .env file.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply any pending schema migrations
    Migrate,

    /// Load sample venues, artists and shows into an empty database
    ///
    /// Refuses to run when venues already exist unless --force is given.
    Seed {
        /// Insert the sample rows even if the tables already have data.
        #[arg(long)]
        force: bool,
    },

    /// List venues grouped by city and state
    Venues {
        /// Only show venues whose name contains this text (case-insensitive).
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },

    /// List artists with their upcoming show counts
    Artists {
        /// Only show artists whose name contains this text (case-insensitive).
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },

    /// List every show, earliest first
    Shows,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fyyur_backend=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Migrate = cli.command {
        let applied = db::run_migrations(&cli.database_url).await?;
        println!("Applied {} migration(s).", applied);
        return Ok(());
    }

    let pool = db::establish_connection_pool(&cli.database_url, 1)?;
    let mut conn = pool
        .get()
        .await
        .context("Failed to connect to the database")?;

    match cli.command {
        Commands::Migrate => {}
        Commands::Seed { force } => run_seed(&mut conn, force).await?,
        Commands::Venues { search } => print_venues(&mut conn, search.as_deref()).await?,
        Commands::Artists { search } => print_artists(&mut conn, search.as_deref()).await?,
        Commands::Shows => print_shows(&mut conn).await?,
    }

    Ok(())
}

async fn print_venues(conn: &mut AsyncPgConnection, search: Option<&str>) -> anyhow::Result<()> {
    let now = Utc::now();

    if let Some(term) = search {
        let results = CatalogService::search_venues(conn, term, now).await?;
        println!("{} venue(s) matching {:?}", results.count, term);
        for venue in results.data {
            println!("  [{}] {} ({} upcoming)", venue.id, venue.name, venue.num_upcoming_shows);
        }
        return Ok(());
    }

    let areas = CatalogService::venue_areas(conn, now).await?;
    if areas.is_empty() {
        println!("No venues found.");
    }
    for area in areas {
        println!("{}, {}", area.city, area.state);
        for venue in area.venues {
            println!("  [{}] {} ({} upcoming)", venue.id, venue.name, venue.num_upcoming_shows);
        }
    }

    Ok(())
}

async fn print_artists(conn: &mut AsyncPgConnection, search: Option<&str>) -> anyhow::Result<()> {
    let now = Utc::now();

    let artists = match search {
        Some(term) => CatalogService::search_artists(conn, term, now).await?.data,
        None => CatalogService::artist_summaries(conn, now).await?,
    };

    if artists.is_empty() {
        println!("No artists found.");
    }
    for artist in artists {
        println!("[{}] {} ({} upcoming)", artist.id, artist.name, artist.num_upcoming_shows);
    }

    Ok(())
}

async fn print_shows(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    let listings = shows::list_all(conn).await?;

    if listings.is_empty() {
        println!("No shows found.");
    }
    for show in listings {
        println!(
            "{}  {} [{}] at {} [{}]",
            filters::datetime(&show.start_time, "medium")?,
            show.artist_name,
            show.artist_id,
            show.venue_name,
            show.venue_id
        );
    }

    Ok(())
}

async fn run_seed(conn: &mut AsyncPgConnection, force: bool) -> anyhow::Result<()> {
    if !force && !venues::list_all(conn).await?.is_empty() {
        anyhow::bail!("Database already has venues; pass --force to seed anyway");
    }

    let summary = seed::sample_data(conn).await?;
    println!(
        "Seeded {} venues, {} artists and {} shows.",
        summary.venue_ids.len(),
        summary.artist_ids.len(),
        summary.show_ids.len()
    );

    Ok(())
}
