use clap::{Parser, Subcommand};
use simple_resizer::config::{self, ResizerConfig};
use simple_resizer::imaging::ResizeRequest;
use simple_resizer::imaging::rust_backend::is_supported_name;
use simple_resizer::naming::is_rendition;
use simple_resizer::output::{self, WarmStats};
use simple_resizer::resizer::{LazyOptions, Resizer};
use simple_resizer::source::FileImage;
use simple_resizer::storage::FileSystemStorage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Target size flags shared by every resizing command.
#[derive(clap::Args, Clone, Copy)]
struct SizeArgs {
    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Fill the box and center-crop the overflow (needs both dimensions)
    #[arg(long)]
    crop: bool,
}

impl SizeArgs {
    fn request(self) -> ResizeRequest {
        ResizeRequest {
            width: self.width,
            height: self.height,
            crop: self.crop,
        }
    }
}

/// Flags for commands that write renditions into the storage.
#[derive(clap::Args, Clone)]
struct LazyArgs {
    /// Render and overwrite even if the rendition is already stored
    #[arg(long)]
    force: bool,

    /// Namespace directory for renditions (defaults to the configured one)
    #[arg(long)]
    namespace: Option<String>,
}

#[derive(Parser)]
#[command(name = "simple-resizer")]
#[command(about = "Resize images on demand and cache the renditions")]
#[command(long_about = "\
Resize images on demand and cache the renditions

Renditions keep the source's aspect ratio. With --crop the image fills the
requested box and the overflow is cut evenly from both sides. EXIF
orientation is applied before any geometry.

Renditions are stored next to their source, named by the request:

  media/
  ├── photos/
  │   ├── beach.jpg
  │   └── resized/                 # namespace
  │       ├── 500x250/beach.jpg    # --width 500
  │       └── 300x300_cropped/beach.jpg

Run 'simple-resizer gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Storage root directory (overrides storage.location)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// URL prefix of the storage (overrides storage.base_url)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize a file and write the result
    Resize {
        /// Source image
        source: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
        /// Where to write the resized image
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Return the stored rendition of a storage entry, rendering it if missing
    Lazy {
        /// Storage name of the source, e.g. photos/beach.jpg
        name: String,
        #[command(flatten)]
        size: SizeArgs,
        #[command(flatten)]
        lazy: LazyArgs,
        /// Print the URL instead of the storage name
        #[arg(long)]
        url: bool,
    },
    /// Print the resize geometry for a file as JSON without rendering
    Plan {
        /// Source image
        source: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Render one size for every image in the storage
    Warm {
        #[command(flatten)]
        size: SizeArgs,
        #[command(flatten)]
        lazy: LazyArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Printing the stock file must work even when the current one is broken.
    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config.logging.level);
    run(cli.command, &config)
}

fn run(command: Command, config: &ResizerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let resizer = Resizer::from_config(config);

    match command {
        Command::Resize {
            source,
            size,
            output: out,
        } => {
            let image = FileImage::new(&source);
            let resized = resizer.resize(&image, size.request())?;
            std::fs::write(&out, resized.as_bytes())?;
            output::print_resize_output(&source.display().to_string(), &out, &resized);
        }
        Command::Lazy {
            name,
            size,
            lazy,
            url,
        } => {
            let options = LazyOptions {
                force: lazy.force,
                namespace: lazy.namespace.as_deref(),
                as_url: url,
                ..LazyOptions::default()
            };
            let source = resizer.stored(name.as_str());
            let resolved = resizer.resolve(&source, size.request(), &options)?;
            output::print_resolved(&name, &resolved, url);
        }
        Command::Plan { source, size } => {
            let plan = resizer.plan(&FileImage::new(&source), size.request())?;
            output::print_plan(&plan)?;
        }
        Command::Warm { size, lazy } => {
            let storage =
                FileSystemStorage::new(&config.storage.location, &config.storage.base_url);
            let namespace = lazy.namespace.as_deref().unwrap_or(resizer.namespace());
            let options = LazyOptions {
                force: lazy.force,
                namespace: Some(namespace),
                ..LazyOptions::default()
            };
            let stats = warm(&resizer, &storage, namespace, size.request(), &options);
            output::print_warm_summary(&stats);
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<ResizerConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(location) = &cli.storage {
        config.storage.location = location.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.storage.base_url = base_url.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Log to stderr; `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Walk the storage root and lazily resize every supported source.
///
/// Files inside rendition directories are skipped. A failing image is
/// reported and counted; the walk goes on.
fn warm(
    resizer: &Resizer,
    storage: &FileSystemStorage,
    namespace: &str,
    request: ResizeRequest,
    options: &LazyOptions<'_>,
) -> WarmStats {
    let mut stats = WarmStats::default();

    for entry in WalkDir::new(storage.location()).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = storage.name_for(entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 path");
            continue;
        };
        if !is_supported_name(&name) || is_rendition(&name, namespace) {
            continue;
        }

        match resizer.resolve(&resizer.stored(name.as_str()), request, options) {
            Ok(resolved) => {
                stats.record(&resolved);
                output::print_resolved(&name, &resolved, false);
            }
            Err(e) => {
                stats.failed += 1;
                output::print_failure(&name, &e);
            }
        }
    }

    stats
}
