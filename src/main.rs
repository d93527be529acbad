use anyhow::{Context, Result};
use arbgraph::http::HttpGraphServer;
use arbgraph::{watch, Config, GraphContext, Subgraph};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "arbgraph")]
#[command(about = "Relationship graph queries over arbitration case snapshots")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the graph API over HTTP
    Serve,
    /// Print the full graph as JSON
    Graph {
        /// Also write the name corpus (JSON array) to this path
        #[arg(long)]
        names_out: Option<PathBuf>,
    },
    /// Everyone within k hops of a name
    Subgraph {
        name: String,
        #[arg(short)]
        k: Option<usize>,
    },
    /// Union of the k-hop neighbourhoods of several names
    Union {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short)]
        k: Option<usize>,
    },
    /// Shortest connecting paths between several names
    Connect {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short)]
        k: Option<usize>,
    },
    /// Title of the case a person appears in
    Case { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.arbgraph.log_level.as_str()),
    )
    .init();

    log::info!("Starting Arbgraph v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Snapshot directory: {}", config.data_dir().display());

    let ctx = Arc::new(GraphContext::load(config.data_dir(), config.query.clone())?);

    match args.command {
        Command::Serve => run_server(ctx, &config).await?,
        Command::Graph { names_out } => {
            let current = ctx.current();
            if let Some(path) = names_out {
                let names = serde_json::to_string_pretty(current.resolver.corpus())?;
                std::fs::write(&path, names)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {} names to {}", current.resolver.corpus().len(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&current.graph.to_payload())?);
        }
        Command::Subgraph { name, k } => print_subgraph(&ctx.subgraph(&name, k)?)?,
        Command::Union { names, k } => print_subgraph(&ctx.union(&names, k)?)?,
        Command::Connect { names, k } => print_subgraph(&ctx.connecting(&names, k)?)?,
        Command::Case { name } => println!("{}", ctx.case_title(&name)?),
    }

    Ok(())
}

fn print_subgraph(subgraph: &Subgraph) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&subgraph.to_payload())?);
    Ok(())
}

/// Run the HTTP API, with the snapshot watcher when enabled
async fn run_server(ctx: Arc<GraphContext>, config: &Config) -> Result<()> {
    if config.watch.enabled {
        watch::spawn(Arc::clone(&ctx), config.watch.debounce_ms)?;
    }

    let server = HttpGraphServer::new(ctx, config.http_server.clone());
    server.run().await?;
    Ok(())
}
