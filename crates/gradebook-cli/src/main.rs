//! gradebook CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use gradebook_core::SortOrder;
use gradebook_store::Role;

mod commands;

use commands::AppContext;

#[derive(Parser)]
#[command(
    name = "gradebook",
    version,
    about = "Validate, normalize and query student records"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Username for commands that need a permission
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password for --user
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortKey {
    Average,
    Name,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and sample data file
    Init,

    /// Split a data file into accepted and rejected rows
    Validate {
        /// Data file (defaults to data_path from the config)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Also list accepted rows
        #[arg(long)]
        show_valid: bool,

        /// Max rows listed per side
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one row by numero
    Show {
        #[arg(long)]
        numero: String,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Validate a new row and report where it would land
    Add {
        #[arg(long)]
        numero: String,
        #[arg(long)]
        nom: String,
        #[arg(long)]
        prenom: String,
        /// Birth date in any accepted layout
        #[arg(long)]
        date: String,
        #[arg(long)]
        classe: String,
        /// Grade cell, e.g. "Math[10|14:16] #Francais[12:9.5]"
        #[arg(long)]
        note: String,
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Find accepted students by family name or class
    #[command(group(ArgGroup::new("query").required(true).args(["name", "class"])))]
    Search {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        class: Option<String>,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List accepted students in order
    Sort {
        #[arg(long, value_enum)]
        by: SortKey,

        /// asc or desc (default: desc for average, asc for name)
        #[arg(long)]
        order: Option<SortOrder>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Totals, per-class and per-subject figures
    Stats {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Fix a rejected row and re-validate it (needs write)
    Correct {
        #[arg(long)]
        numero: String,
        /// New numero
        #[arg(long)]
        set_numero: Option<String>,
        #[arg(long)]
        nom: Option<String>,
        #[arg(long)]
        prenom: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        classe: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Write accepted rows here after the correction
        #[arg(long)]
        accepted_out: Option<PathBuf>,
        /// Write rejected rows here after the correction
        #[arg(long)]
        rejected_out: Option<PathBuf>,
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Export students (needs export)
    Export {
        #[arg(long, value_enum, default_value = "all")]
        format: ExportFormat,

        /// Output directory (defaults to output_dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Load students from a JSON export (needs import)
    Import {
        #[arg(long)]
        json: PathBuf,
    },

    /// Write an HTML report for a student or a class
    #[command(group(ArgGroup::new("target").required(true).args(["numero", "class"])))]
    Report {
        #[arg(long)]
        numero: Option<String>,

        #[arg(long)]
        class: Option<String>,

        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manage the student cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create an account (the first one needs no login; later ones need an admin)
    Add {
        #[arg(long)]
        username: String,

        #[arg(long)]
        new_password: String,

        /// admin, teacher or user
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// List accounts and roles
    List,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached entry (needs delete)
    Clear,
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        return commands::init::execute();
    }

    let ctx = AppContext::load(cli.config.as_deref(), cli.user, cli.password)?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Validate {
            input,
            show_valid,
            limit,
        } => commands::validate::execute(&ctx, input, show_valid, limit),
        Commands::Show { numero, input } => commands::show::execute(&ctx, &numero, input),
        Commands::Add {
            numero,
            nom,
            prenom,
            date,
            classe,
            note,
            input,
        } => commands::add::execute(&ctx, [numero, nom, prenom, date, classe, note], input),
        Commands::Search { name, class, input } => {
            commands::search::execute(&ctx, name, class, input).await
        }
        Commands::Sort {
            by,
            order,
            limit,
            input,
        } => commands::sort::execute(&ctx, by, order, limit, input).await,
        Commands::Stats { input } => commands::stats::execute(&ctx, input).await,
        Commands::Correct {
            numero,
            set_numero,
            nom,
            prenom,
            date,
            classe,
            note,
            accepted_out,
            rejected_out,
            input,
        } => commands::correct::execute(
            &ctx,
            &numero,
            [set_numero, nom, prenom, date, classe, note],
            accepted_out,
            rejected_out,
            input,
        ),
        Commands::Export {
            format,
            output,
            input,
        } => commands::export::execute(&ctx, format, output, input).await,
        Commands::Import { json } => commands::import::execute(&ctx, json),
        Commands::Report {
            numero,
            class,
            out,
            input,
        } => commands::report::execute(&ctx, numero, class, out, input).await,
        Commands::Users { action } => match action {
            UsersAction::Add {
                username,
                new_password,
                role,
            } => commands::users::add(&ctx, &username, &new_password, role),
            UsersAction::List => commands::users::list(&ctx),
        },
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(&ctx).await,
        },
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradebook=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
