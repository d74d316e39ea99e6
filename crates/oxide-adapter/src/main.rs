//! oxide-adapter CLI
//!
//! Command-line front end for the RisingWave engine adapter.

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_adapter_core::prelude::*;
use oxide_adapter_pg::PgSession;

/// Engine capability adapter for RisingWave.
#[derive(Parser)]
#[command(name = "oxide-adapter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "postgres://root@localhost:4566/dev")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a column type change can be applied in place.
    CanAlter {
        /// Current column type, e.g. `VARCHAR(20)`.
        from: String,

        /// New column type, e.g. `TEXT`.
        to: String,

        /// Dialect the type names are written in.
        #[arg(long, default_value = "risingwave")]
        dialect: Dialect,
    },

    /// Show how the catalog classifies a relation.
    RelationKind {
        /// Relation name, optionally schema- and catalog-qualified.
        name: TableName,
    },

    /// Create or replace a view.
    CreateView {
        /// View name.
        name: TableName,

        /// Defining query.
        query: String,

        /// Create a materialized view.
        #[arg(short, long)]
        materialized: bool,

        /// Fail if the view exists instead of replacing it.
        #[arg(long)]
        no_replace: bool,

        /// Output column as `name:type`; repeat for each column.
        #[arg(short, long = "column", value_parser = parse_column)]
        columns: Vec<(String, TypeDescriptor)>,

        /// View comment.
        #[arg(long)]
        description: Option<String>,
    },

    /// Drop a view.
    DropView {
        /// View name.
        name: TableName,

        /// Hint that the view is materialized.
        #[arg(short, long)]
        materialized: bool,

        /// Fail if the view does not exist.
        #[arg(long)]
        must_exist: bool,

        /// Do not drop dependent objects.
        #[arg(long)]
        no_cascade: bool,
    },

    /// Print the engine capability descriptor as JSON.
    Capabilities,
}

fn parse_column(text: &str) -> std::result::Result<(String, TypeDescriptor), String> {
    let (name, ty) = text
        .split_once(':')
        .ok_or_else(|| format!("expected name:type, got '{text}'"))?;
    let ty = TypeDescriptor::parse(ty, Dialect::RisingWave).map_err(|e| e.to_string())?;
    Ok((name.trim().to_string(), ty))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::CanAlter { from, to, dialect } => {
            let from = TypeDescriptor::parse(&from, dialect)?;
            let to = TypeDescriptor::parse(&to, dialect)?;
            let change = RisingWaveAdapter::<PgSession>::schema_differ().type_change(&from, &to);
            match change {
                TypeChange::InPlace => println!("{from} -> {to}: alter in place"),
                TypeChange::Rebuild => println!("{from} -> {to}: rebuild required"),
            }
        }

        Commands::Capabilities => {
            let caps = CapabilityDescriptor::risingwave();
            println!("{}", serde_json::to_string_pretty(&caps)?);
        }

        Commands::RelationKind { name } => {
            let mut adapter = connect(&cli.database).await?;
            let kind = adapter.relation_kind(&name).await?;
            println!("{name}: {kind:?}");
            adapter.into_session().close().await?;
        }

        Commands::CreateView {
            name,
            query,
            materialized,
            no_replace,
            columns,
            description,
        } => {
            let mut view = ViewDefinition::new(name, query);
            view.columns = columns;
            view.description = description;
            if materialized {
                view = view.materialized();
            }

            let mut adapter = connect(&cli.database).await?;
            adapter.create_view(&view, !no_replace).await?;
            info!("View {} created.", view.name);
            adapter.into_session().close().await?;
        }

        Commands::DropView {
            name,
            materialized,
            must_exist,
            no_cascade,
        } => {
            let mut opts = DropViewOptions::default().materialized(materialized);
            if must_exist {
                opts = opts.must_exist();
            }
            if no_cascade {
                opts = opts.cascade(false);
            }

            let mut adapter = connect(&cli.database).await?;
            adapter.drop_view(&name, opts).await?;
            info!("View {name} dropped.");
            adapter.into_session().close().await?;
        }
    }

    Ok(())
}

async fn connect(url: &str) -> anyhow::Result<RisingWaveAdapter<PgSession>> {
    let session = PgSession::connect(url).await?;
    Ok(RisingWaveAdapter::new(session))
}
