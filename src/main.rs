//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacetraveling::commands::post::PostOutcome;

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "A static blog generator backed by the Prismic headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Keep regenerating every N seconds
        #[arg(short, long, value_name = "SECS")]
        revalidate: Option<u64>,
    },

    /// Generate the page of a single post on demand
    Post {
        /// Slug (uid) of the post
        slug: String,

        /// Regenerate even if the page already exists
        #[arg(short, long)]
        force: bool,
    },

    /// List posts from the CMS
    List {
        /// Follow the cursor through every page
        #[arg(short, long)]
        all: bool,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            spacetraveling::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Generate { revalidate } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;

            match revalidate {
                Some(secs) if secs > 0 => {
                    spacetraveling::commands::generate::revalidate(
                        &blog,
                        Duration::from_secs(secs),
                    )
                    .await?;
                }
                Some(_) => anyhow::bail!("--revalidate needs a positive number of seconds"),
                None => {
                    tracing::info!("Generating static files...");
                    let report = blog.generate().await?;
                    println!(
                        "Generated {} listing pages and {} posts",
                        report.listing_pages, report.post_pages
                    );
                }
            }
        }

        Commands::Post { slug, force } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            match spacetraveling::commands::post::run(&blog, &slug, force).await? {
                PostOutcome::Cached(path) => println!("Already generated: {:?}", path),
                PostOutcome::Written(path) => println!("Generated: {:?}", path),
                PostOutcome::NotFound(_) => anyhow::bail!("No post with slug {:?}", slug),
            }
        }

        Commands::List { all } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            spacetraveling::commands::list::run(&blog, all).await?;
        }

        Commands::Clean => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
