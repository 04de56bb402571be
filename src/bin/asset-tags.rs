//! Command-line front end over a project's asset manifest.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use asset_tags::{
    AssetContext, AssetKind, AssetResolver, AssetsConfig, RecordedHeaders, RenderContext,
    ResolverMode, compile_glob,
};

#[derive(Parser, Debug)]
#[command(name = "asset-tags")]
#[command(about = "Resolve logical asset paths and render script/link tags", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root containing assets.config.json
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Configuration file to use instead of discovering one under the root
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest file overriding the configured one
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the URL and integrity digest for one logical path
    Resolve {
        /// Logical path, including its extension
        logical_path: String,
    },

    /// Render script and stylesheet tags
    Tags {
        /// Script sources, in order
        #[arg(long = "script")]
        scripts: Vec<String>,

        /// Stylesheet sources, in order
        #[arg(long = "style")]
        styles: Vec<String>,

        /// Emit integrity attributes
        #[arg(long)]
        integrity: bool,

        /// Do not collect preload hints
        #[arg(long)]
        no_preload: bool,
    },

    /// Test paths against a glob
    Glob {
        /// Glob pattern
        pattern: String,

        /// Paths to test
        paths: Vec<String>,
    },

    /// Validate manifest integrity values and precompile coverage
    Check,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Resolve { logical_path } => {
            let assets = manifest_context(&cli)?;
            let render = RenderContext::default();
            let builder = assets.tag_builder(&render);
            let url = builder.asset_path(logical_path, AssetKind::Other, &assets.tag_options())?;
            println!("{url}");
            if let Some(integrity) = assets.resolver().integrity_for(logical_path)? {
                println!("integrity: {integrity}");
            }
        }
        Commands::Tags {
            scripts,
            styles,
            integrity,
            no_preload,
        } => {
            let assets = manifest_context(&cli)?;
            let mut options = assets.tag_options();
            if *integrity {
                options = options.with_integrity();
            }
            options.preload_header = !no_preload;

            let render = RenderContext::default();
            let mut headers = RecordedHeaders::default();
            let mut builder = assets.tag_builder(&render).with_header_sink(&mut headers);
            let mut markup = Vec::new();
            if !styles.is_empty() {
                markup.push(builder.stylesheet_tags(styles.as_slice(), &options)?.markup);
            }
            if !scripts.is_empty() {
                markup.push(builder.script_tags(scripts.as_slice(), &options)?.markup);
            }
            drop(builder);

            println!("{}", markup.join("\n"));
            for (name, value) in &headers.headers {
                println!("{name}: {value}");
            }
        }
        Commands::Glob { pattern, paths } => {
            let glob = compile_glob(pattern)?;
            for path in paths {
                let verdict = if glob.test(path) { "match" } else { "no match" };
                println!("{verdict}\t{path}");
            }
        }
        Commands::Check => {
            let assets = manifest_context(&cli)?;
            let entries = assets.manifest().map_or(0, |manifest| manifest.len());

            let problems = assets.check_manifest();
            for (logical_path, problem) in &problems {
                println!("{logical_path}: {problem}");
            }
            if !problems.is_empty() {
                bail!("{} problem(s) found in {entries} manifest entries", problems.len());
            }
            println!("{entries} manifest entries ok");
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AssetsConfig> {
    let mut config = match &cli.config {
        Some(path) => AssetsConfig::from_path(path)?,
        None => AssetsConfig::discover(&cli.root),
    };
    if let Some(manifest) = &cli.manifest {
        config.manifest = manifest.to_string_lossy().into_owned();
    }
    Ok(config)
}

/// The CLI has no live build environment, so it always resolves through the manifest.
fn manifest_context(cli: &Cli) -> Result<AssetContext> {
    let mut config = load_config(cli)?;
    config.resolve_with = Some(ResolverMode::Manifest.as_str().to_string());
    AssetContext::new(&config, &cli.root, None)
}
