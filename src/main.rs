use clap::Parser;
use mfgallery::config::{self, GalleryConfig};
use mfgallery::imaging::RustBackend;
use mfgallery::metadata::FolderTimePolicy;
use mfgallery::output;
use mfgallery::pipeline::{self, BuildOptions};
use mfgallery::sorting::ImageOrder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mfgallery")]
#[command(about = "Builds JSON metadata and thumbnails for a photo gallery")]
#[command(long_about = "\
Builds JSON metadata and thumbnails for a photo gallery

Every folder under --path gets a gallery_meta.json describing its images and
sub-folders, and a .thumbs/ directory with one JPEG per image and size.

Gallery structure:

  photos/
  ├── gallery.toml                 # Run config (optional, flags win)
  ├── 2020-03-15_Summer_Trip/      # Dated 2020-03-15, titled \"Summer Trip\"
  │   ├── content.ini              # title / description / cover (optional)
  │   ├── IMG_0001.jpg
  │   └── .thumbs/                 # Generated: 200-IMG_0001.jpg, ...
  └── Misc/                        # Undated: time from the images' EXIF

Runs are incremental: records in an existing gallery_meta.json are reused
and existing thumbnails are kept. Use --force-update to re-read every image.")]
#[command(version)]
struct Cli {
    /// Gallery root directory
    #[arg(long)]
    path: PathBuf,

    /// Thumbnail bounding box in pixels (repeatable)
    #[arg(long = "size", value_parser = clap::value_parser!(u32).range(1..))]
    sizes: Vec<u32>,

    /// Image order inside each folder
    #[arg(long)]
    order: Option<ImageOrder>,

    /// Thumbnail size referenced by the casting feed; enables the feed
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    cc_size: Option<u32>,

    /// Ignore recorded metadata and read every image again
    #[arg(long)]
    force_update: bool,

    /// Number of thumbnail workers (default: one per CPU)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_threads: Option<usize>,

    /// Which image time dates a folder whose name carries no date
    #[arg(long)]
    folder_time: Option<FolderTimePolicy>,

    /// JPEG quality of generated thumbnails
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Run config file (default: gallery.toml in the gallery root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging and a dump of the data model
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Flags override values from the config file.
    fn merge_into(&self, mut config: GalleryConfig) -> GalleryConfig {
        if !self.sizes.is_empty() {
            config.sizes = self.sizes.clone();
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if self.cc_size.is_some() {
            config.cc_size = self.cc_size;
        }
        if self.max_threads.is_some() {
            config.max_threads = self.max_threads;
        }
        if let Some(folder_time) = self.folder_time {
            config.folder_time = folder_time;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let file_config = config::load_config(&cli.path, cli.config.as_deref())?;
    let run_config = cli.merge_into(file_config);
    run_config.validate()?;
    if run_config.thumbnail_sizes().is_empty() {
        return Err("at least one --size is required".into());
    }

    let options = BuildOptions::from_config(cli.path.clone(), &run_config, cli.force_update);
    tracing::debug!(?options, "resolved options");

    println!("==> Building {}", options.root.display());
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = pipeline::build(&options, &RustBackend::new(), Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;

    for line in output::format_summary(&summary) {
        println!("{}", line);
    }
    println!("==> Build complete: {}", options.root.display());
    Ok(())
}

/// Diagnostics go to stderr so progress output on stdout stays readable.
///
/// `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
