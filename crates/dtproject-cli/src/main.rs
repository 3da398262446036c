mod commands;

use clap::{Parser, Subcommand};
use commands::{exit_code_for, Context, ImageArgs, PathKind};
use dtproject_core::{ProjectLoader, Settings};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dtproject",
    version,
    about = "Resolve project descriptors, mount paths, and image names"
)]
struct Cli {
    /// Project directory.
    #[arg(short = 'C', long, default_value = ".", global = true)]
    project: PathBuf,

    /// Use this directory as the recipe instead of the cached clone.
    #[arg(long, global = true)]
    recipe_dir: Option<PathBuf>,

    /// Use this recipe branch instead of the declared one.
    #[arg(long, global = true)]
    recipe_version: Option<String>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show project identity and repository state.
    Info,
    /// Show host paths and their mount destinations.
    Paths {
        #[arg(value_enum, default_value_t = PathKind::Code)]
        kind: PathKind,
        /// Root to report local paths under (e.g. a remote mount point).
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print the image tag of the project.
    Image {
        #[command(flatten)]
        image: ImageArgs,
        /// Tag of the multi-arch manifest instead of a single image.
        #[arg(long, default_value_t = false, conflicts_with_all = ["release", "vscode", "vnc"])]
        manifest: bool,
        /// Release tag from the repository head tag.
        #[arg(long, default_value_t = false, conflicts_with_all = ["vscode", "vnc"])]
        release: bool,
        #[arg(long, default_value_t = false, conflicts_with = "vnc")]
        vscode: bool,
        #[arg(long, default_value_t = false)]
        vnc: bool,
    },
    /// List the launchers of the project and its recipe.
    Launchers,
    /// Make sure the recipe is available locally.
    Recipe {
        /// Pull the latest recipe commits as well.
        #[arg(long, default_value_t = false)]
        update: bool,
    },
    /// Print the CI metadata document of a locally built image.
    CiMetadata {
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Fetch metadata of the published image.
    RemoteMetadata {
        #[command(flatten)]
        image: ImageArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::load_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(exit_code_for(&e));
        }
    };
    let ctx = Context {
        loader: ProjectLoader::from_settings(&settings),
        settings,
        project: cli.project,
        recipe_dir: cli.recipe_dir,
        recipe_version: cli.recipe_version,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Info => commands::info::run(&ctx),
        Commands::Paths { kind, root } => commands::paths::run(&ctx, kind, root.as_deref()),
        Commands::Image {
            image,
            manifest,
            release,
            vscode,
            vnc,
        } => commands::image::run(
            &ctx,
            &image,
            commands::image::Variant::from_flags(manifest, release, vscode, vnc),
        ),
        Commands::Launchers => commands::launchers::run(&ctx),
        Commands::Recipe { update } => commands::recipe::run(&ctx, update),
        Commands::CiMetadata { image } => commands::ci_metadata::run(&ctx, &image),
        Commands::RemoteMetadata { image } => commands::remote::run(&ctx, &image),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
