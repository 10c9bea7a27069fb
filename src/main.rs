use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use modfetch::config::Config;
use modfetch::fetch::fetch_module;
use modfetch::getter::directory::LOCAL_VERSION;
use modfetch::getter::{DirectoryModuleGetter, FsProxyModuleGetter, ModuleGetter};
use modfetch::logging::init_logging;
use modfetch::modfile::GoModParser;
use modfetch::version::{LATEST, Version};

#[derive(Parser)]
#[command(name = "modfetch")]
#[command(
    version,
    about = "Retrieve module metadata, go.mod and files from a local directory or module mirror"
)]
struct Cli {
    /// JSON config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve a single module from this working directory
    #[arg(long, global = true, conflicts_with = "mirror")]
    dir: Option<PathBuf>,

    /// Module path for --dir when the directory has no go.mod
    #[arg(long, global = true, requires = "dir")]
    module_path: Option<String>,

    /// Module proxy mirror root (defaults to $GOMODCACHE)
    #[arg(long, global = true)]
    mirror: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print version metadata as JSON
    Info {
        /// module[@version], version defaults to latest
        module: String,
    },
    /// Print go.mod
    Mod { module: String },
    /// List files of the module
    Ls { module: String },
    /// Print a file of the module
    Cat { module: String, path: String },
    /// List requirements declared in go.mod
    Requires { module: String },
    /// List versions available in the store
    Versions {
        /// Module path
        module: String,
    },
    /// Fetch the module and print a summary
    Fetch { module: String },
}

/// Splits `module@version`; a missing version means latest.
fn parse_module_arg(arg: &str) -> anyhow::Result<(String, Version)> {
    let (module, version) = arg.rsplit_once('@').unwrap_or((arg, LATEST));
    if module.is_empty() || version.is_empty() {
        bail!("invalid module argument {:?}, expected module[@version]", arg);
    }
    Ok((module.to_string(), Version::from(version)))
}

enum Store {
    Directory(DirectoryModuleGetter),
    Mirror(FsProxyModuleGetter),
}

impl Store {
    fn open(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        if let Some(dir) = &cli.dir {
            let getter = DirectoryModuleGetter::new(cli.module_path.as_deref(), dir)
                .with_context(|| format!("cannot use directory {}", dir.display()))?;
            return Ok(Store::Directory(getter));
        }

        let mirror = cli.mirror.clone().unwrap_or_else(|| config.mirror_dir());
        let getter = FsProxyModuleGetter::new(&mirror)
            .with_context(|| format!("cannot use module mirror {}", mirror.display()))?;
        Ok(Store::Mirror(getter))
    }

    fn getter(&self) -> &dyn ModuleGetter {
        match self {
            Store::Directory(g) => g,
            Store::Mirror(g) => g,
        }
    }
}

async fn run(cli: Cli, store: Store, cancel: CancellationToken) -> anyhow::Result<()> {
    let getter = store.getter();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Command::Info { module } => {
            let (module, version) = parse_module_arg(module)?;
            let info = getter.info(&module, &version, &cancel).await?;
            writeln!(stdout, "{}", serde_json::to_string_pretty(&info)?)?;
        }
        Command::Mod { module } => {
            let (module, version) = parse_module_arg(module)?;
            let go_mod = getter.module_file(&module, &version, &cancel).await?;
            stdout.write_all(&go_mod)?;
        }
        Command::Ls { module } => {
            let (module, version) = parse_module_arg(module)?;
            let content = getter.content_dir(&module, &version, &cancel).await?;
            for file in content.files()? {
                writeln!(stdout, "{}", file)?;
            }
        }
        Command::Cat { module, path } => {
            let (module, version) = parse_module_arg(module)?;
            let content = getter.content_dir(&module, &version, &cancel).await?;
            let mut file = content
                .open(path)
                .with_context(|| format!("cannot open {} in {}", path, module))?;
            std::io::copy(&mut file, &mut stdout)?;
        }
        Command::Requires { module } => {
            let (module, version) = parse_module_arg(module)?;
            let go_mod = getter.module_file(&module, &version, &cancel).await?;
            let parsed = GoModParser::new()
                .parse(&String::from_utf8_lossy(&go_mod))
                .with_context(|| format!("cannot parse go.mod of {}", module))?;
            for req in parsed.requires {
                let marker = if req.indirect { " // indirect" } else { "" };
                writeln!(stdout, "{} {}{}", req.path, req.version, marker)?;
            }
        }
        Command::Versions { module } => match &store {
            Store::Mirror(mirror) => {
                for version in mirror.list_versions(module).await? {
                    writeln!(stdout, "{}", version)?;
                }
            }
            Store::Directory(_) => writeln!(stdout, "{}", LOCAL_VERSION)?,
        },
        Command::Fetch { module } => {
            let (module, version) = parse_module_arg(module)?;
            let fetched = fetch_module(getter, &module, &version, &cancel).await?;
            writeln!(
                stdout,
                "{}@{} {} ({} files)",
                fetched.module_path,
                fetched.info.version,
                fetched.info.time.to_rfc3339(),
                fetched.content.files()?.len()
            )?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;
    let mut log_config = config.log.clone();
    log_config.json |= cli.log_json;
    let _guard = init_logging(&log_config)?;

    let store = Store::open(&cli, &config)?;
    debug!("Using {} store", store.getter().kind().as_str());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling");
                    on_signal.cancel();
                }
            });
            run(cli, store, cancel).await
        })
}
