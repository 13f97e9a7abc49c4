use clap::{Parser, Subcommand};
use darkroom::{config, imaging, output, process};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "darkroom")]
#[command(about = "Post-build image post-processor for static blog assets")]
#[command(long_about = "\
Post-build image post-processor for static blog assets

Run it after your static site generator has written its output tree, so the
resized files overwrite the generator's raw asset copies and are not
themselves overwritten later.

Image tree layout:

  <source>/assets/images/
  ├── films/                       # One job per top-level subdirectory
  │   ├── 01-postcard.jpg          # jpg/jpeg/png/webp, case-insensitive
  │   ├── notes.txt                # Anything else is ignored
  │   └── resize/                  # Derived-file cache (exclude_originals dirs)
  └── musics/
      └── cover.png

Images wider than max_width are resized into the mirrored path under
<dest>/assets/images/; narrower ones are copied when the destination is
missing or older. Directories listed in exclude_originals never have their
raw files published — only derived files from their resize/ cache.

Run 'darkroom gen-config' to generate a documented darkroom.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site source directory (contains the images root)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Build output directory written by the site generator
    #[arg(long, default_value = "_site", global = true)]
    dest: PathBuf,

    /// Config file path
    #[arg(long, default_value = "darkroom.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the post-processing pass over the images root
    Run {
        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Validate config and report what would be processed, writing nothing
    Check,
    /// Print a stock darkroom.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Run { json } => {
            let config = config::load_config(&cli.config)?;
            if !config.enabled {
                eprintln!("image post-processing disabled in config");
                return Ok(());
            }
            if !cli.source.is_dir() {
                return Err(format!("source directory {} not found", cli.source.display()).into());
            }

            let selection = imaging::select_backend(config.backend, &mut |warning| {
                eprintln!("warning: {warning}");
            });
            match selection.kind() {
                Some(kind) => eprintln!("using {kind} for image resizing"),
                None => eprintln!(
                    "warning: no image backend available, copying originals without resizing"
                ),
            }

            let report = process::run_pass(
                &cli.source,
                &cli.dest,
                &config,
                &selection,
                &mut |diag| output::print_diagnostic(&diag),
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_run_report(&report);
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", cli.source.display());

            let selection = imaging::select_backend(config.backend, &mut |warning| {
                eprintln!("warning: {warning}");
            });
            match selection.kind() {
                Some(kind) => println!("backend: {kind}"),
                None => println!("backend: none (copy-only mode)"),
            }

            let surveys = process::survey(&cli.source, &config)?;
            output::print_survey(&surveys);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
