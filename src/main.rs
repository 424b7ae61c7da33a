use bg_timeline::config::{self, Config};
use bg_timeline::index::Collection;
use bg_timeline::repo::GitRepo;
use bg_timeline::{imaging, output, render, walk};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Shared flags for commands that walk the repository.
#[derive(clap::Args, Clone)]
struct ThumbnailArgs {
    /// Regenerate thumbnails even if they already exist
    #[arg(long)]
    force_thumbnails: bool,
}

#[derive(Parser)]
#[command(name = "bg-timeline")]
#[command(about = "Gallery of background images across the tags of a git repository")]
#[command(long_about = "\
Gallery of background images across the tags of a git repository

Every tag of the source repository is a release. The tags are sorted by
version, checked out one after the other, and diffed against their
predecessor. Each background becomes a row of the report; each release that
added or changed a background becomes a column.

Output layout:

  dist/
  ├── index.html                      # The timeline grid
  ├── index.json                      # Collected index (input of `render`)
  └── backgrounds/
      └── 3.10.0/
          └── blobs.svg.png           # One thumbnail per new or changed file

The source checkout is modified in place: `collect` leaves it at the newest tag.

Run 'bg-timeline gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Git checkout to walk (overrides source.repo)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Config file; stock defaults apply when it does not exist
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the tags, write thumbnails and index.json
    Collect(ThumbnailArgs),
    /// Produce index.html from index.json
    Render,
    /// Run the full pipeline: collect → render
    Build(ThumbnailArgs),
    /// Validate the config and the tag list without checking anything out
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Collect(args) => {
            let (mut config, repo_path) = load(&cli)?;
            config.thumbnails.force |= args.force_thumbnails;
            println!("==> Collecting {}", repo_path.display());
            run_collect(&repo_path, &config, &cli.output)?;
        }
        Command::Render => {
            let (config, _) = load(&cli)?;
            let index_path = cli.output.join(render::COLLECTION_FILE);
            println!("==> Rendering {}", index_path.display());
            let collection = render::read_collection(&index_path)?;
            run_render(&collection, &config, &cli.output)?;
        }
        Command::Build(args) => {
            let (mut config, repo_path) = load(&cli)?;
            config.thumbnails.force |= args.force_thumbnails;

            println!("==> Stage 1: Collecting {}", repo_path.display());
            let collection = run_collect(&repo_path, &config, &cli.output)?;

            println!("==> Stage 2: Rendering → {}", cli.output.display());
            run_render(&collection, &config, &cli.output)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let (config, repo_path) = load(&cli)?;
            println!("==> Checking {}", repo_path.display());
            let repo = GitRepo::open(&repo_path)?;
            let revisions = walk::list_revisions(&repo, &config.source.tag_prefixes)?;
            for revision in &revisions {
                println!("{} → {}", revision.tag, revision.key());
            }
            println!("==> {} tags parsed", revisions.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config and resolve the repository path, `--repo` winning.
fn load(cli: &Cli) -> Result<(Config, PathBuf), config::ConfigError> {
    let config = config::load_config(&cli.config)?;
    let repo_path = cli
        .repo
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.source.repo));
    Ok((config, repo_path))
}

fn run_collect(
    repo_path: &Path,
    config: &Config,
    output_root: &Path,
) -> Result<Collection, Box<dyn std::error::Error>> {
    let repo = GitRepo::open(repo_path)?;
    let backend = imaging::backend_for(&config.thumbnails);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_walk_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = walk::collect(&repo, backend.as_ref(), config, output_root, Some(tx));
    printer.join().unwrap();
    let result = result?;

    let index_path = render::write_collection(&result.collection, output_root)?;
    output::print_collect_summary(&result.stats, &result.collection, &index_path);
    Ok(result.collection)
}

fn run_render(
    collection: &Collection,
    config: &Config,
    output_root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = render::write_report(collection, config, output_root)?;
    output::print_render_output(
        &rendered,
        collection,
        &output_root.join(render::REPORT_FILE),
    );
    Ok(())
}
