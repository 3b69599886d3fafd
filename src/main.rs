use clap::{Parser, Subcommand};
use site_behavior::{config, controller, markup, output, script, site};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "site-behavior")]
#[command(about = "Interactive behavior for an admissions website")]
#[command(long_about = "\
Interactive behavior for an admissions website

Wires the page's interactive components from its markup: mobile navigation,
submenus, lazy gallery images, a lightbox, an FAQ accordion, admission form
validation, the footer year, smooth in-page anchors and Escape dismissal.

Markup contract (stock names, all configurable under [markup]):

  #hamburger + .nav-list             navigation toggle
  .has-sub > .sub-btn + .sub-list    submenus
  .gallery-item[data-src]            lazy images
  #galleryGrid, #lightbox, #lightboxImg, #lightboxCaption, #lightboxClose
  .accordion-btn + .accordion-panel  FAQ accordion
  #admissionForm, #formStatus, #clearForm
  #year, a[href^=\"#\"]

Run 'site-behavior gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Print JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the reference admissions page
    Render {
        /// TOML file with page content (demo content when omitted)
        #[arg(long)]
        content: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Wire a page and report which components were found
    Check {
        /// HTML page to check
        #[arg(long)]
        page: PathBuf,
    },
    /// Replay an interaction script against a page
    Simulate {
        /// HTML page to load
        #[arg(long)]
        page: PathBuf,
        /// TOML interaction script
        #[arg(long)]
        script: PathBuf,
        /// Write the resulting HTML here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { content, output } => {
            let behavior = config::load_config(&cli.config)?;
            let content = match content {
                Some(path) => site::load_content(&path)?,
                None => site::SiteContent::default(),
            };
            let html = site::render_page(&content, &behavior).into_string();
            write_or_print(output.as_deref(), &html)?;
        }
        Command::Check { page } => {
            let behavior = config::load_config(&cli.config)?;
            let html = std::fs::read_to_string(&page)?;
            let mut doc = markup::parse_document(&html)?;
            let ctl = controller::PageController::init(
                &mut doc,
                behavior,
                &controller::Environment::detect(),
            );
            if cli.json {
                println!("{}", serde_json::to_string_pretty(ctl.report())?);
            } else {
                println!("==> Checking {}", page.display());
                output::print_setup_report(ctl.report());
            }
        }
        Command::Simulate {
            page,
            script: script_path,
            output,
        } => {
            let behavior = config::load_config(&cli.config)?;
            let html = std::fs::read_to_string(&page)?;
            let script = script::Script::load(&script_path)?;
            let run = script::run_script(&html, &script, behavior)?;

            if cli.json {
                let json = serde_json::json!({
                    "setup": run.report,
                    "steps": run.steps,
                    "state": run.snapshot,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("==> Setup");
                output::print_setup_report(&run.report);
                println!("==> Steps");
                output::print_step_log(&run.steps);
                println!("==> State");
                output::print_snapshot(&run.snapshot);
            }
            if let Some(path) = output {
                std::fs::write(&path, markup::serialize(&run.document))?;
                if !cli.json {
                    println!("==> Wrote {}", path.display());
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn write_or_print(path: Option<&Path>, text: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, text),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
