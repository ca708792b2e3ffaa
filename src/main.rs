// cordova-hooks — register as a Cordova script hook, e.g. in config.xml:
//   <hook type="after_prepare" src="hooks/cordova-hooks.sh" />
// where the script runs `cordova-hooks run after_prepare`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cordova_hooks::config::settings::{Settings, FILE_NAME};
use cordova_hooks::context::{HookContext, Stage};
use cordova_hooks::model::color::{Color, ColorVariations};
use cordova_hooks::platform::Platform;
use cordova_hooks::{hooks, logging, ops};

/// Theme colors, app metadata, icons and build notifications for Cordova builds
#[derive(Debug, Parser)]
#[command(name = "cordova-hooks")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every hook registered for a lifecycle stage
    Run {
        stage: Stage,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Run a single hook by name
    Hook {
        name: String,
        /// Stage reported to the hook
        #[arg(long, default_value = "after_prepare")]
        stage: Stage,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List hooks with their stages and platforms
    List,
    /// Print every encoding of a color
    Convert {
        color: String,
    },
    /// Write a default cordova-hooks.toml into the project
    Init {
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Cordova project root (the directory holding config.xml)
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Platforms to patch; defaults to those added under platforms/
    #[arg(long, env = "CORDOVA_PLATFORMS", value_delimiter = ',')]
    platforms: Vec<String>,

    #[arg(long, env = "CORDOVA_VERSION")]
    cordova_version: Option<String>,
}

impl TargetArgs {
    fn context(self, stage: Stage) -> Result<HookContext> {
        let platforms = Platform::parse_list(&self.platforms);
        HookContext::new(&self.project_root, platforms, self.cordova_version, stage)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        // hook failures are logged, never turned into a failing exit code
        Commands::Run { stage, target } => {
            let ctx = target.context(stage)?;
            ops::run_stage(&ctx, &hooks::registry());
        }
        Commands::Hook { name, stage, target } => {
            let ctx = target.context(stage)?;
            ops::run_hook(&ctx, &hooks::registry(), &name)?;
        }
        Commands::List => {
            for line in ops::list_hooks(&hooks::registry()) {
                println!("{}", line);
            }
        }
        Commands::Convert { color } => {
            let color = Color::parse(&color)?;
            for (label, value) in ColorVariations::of(&color).entries() {
                println!("{:<12} {}", label, value);
            }
        }
        Commands::Init { project_root, force } => {
            let path = project_root.join(FILE_NAME);
            if path.exists() && !force {
                println!("{} already exists (use --force to overwrite)", path.display());
                return Ok(());
            }
            Settings::default().save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
