//! hoard: encrypted secret store CLI
//!
//! Store commands (password from --password, HOARD_PASSWORD, or a prompt):
//!   folders                        - list folders
//!   entries <folder>               - list entry keys with their kinds
//!   read <folder> <key>            - print an entry's value
//!   find <folder> <pattern>        - print entries whose key matches a wildcard
//!   write <folder> <key> [value..] - create or overwrite an entry
//!   rm / mv / mkdir / rmdir        - remove, rename, create and remove
//!   passwd                         - re-encrypt under a new password
//!
//! Password-free commands:
//!   probe <folder> [<key>]         - answer existence from the plaintext index
//!   exists                         - is there a store file at all
//!   config show                    - display the effective configuration

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use clap::{Parser, Subcommand, ValueEnum};
use hoard_core::{HoardConfig, LogFormat};
use hoard_store::{Entry, EntryKind, OpenStatus, SecretStore};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use zeroize::Zeroizing;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hoard",
    version,
    about = "Encrypted local secret store",
    long_about = "hoard: folders of passwords, blobs and maps in a single password-protected file"
)]
struct Cli {
    /// Path to hoard.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "HOARD_CONFIG",
        default_value = "~/.config/hoard/config.toml"
    )]
    config: PathBuf,

    /// Store name under the configured directory (default: store.default_name)
    #[arg(long, short = 'w', conflicts_with = "file")]
    wallet: Option<String>,

    /// Explicit store file path (overrides --wallet and the config directory)
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Store password (prompted for when absent)
    #[arg(long, env = "HOARD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log level or filter directive (overrides config log.level)
    #[arg(long, env = "HOARD_LOG")]
    log: Option<String>,

    /// Log format (overrides config log.format)
    #[arg(long, env = "HOARD_LOG_FORMAT")]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// A single string
    Password,
    /// Raw bytes, given as base64 or piped on stdin
    Stream,
    /// KEY=VALUE pairs
    Map,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List folders
    Folders,

    /// List entry keys in a folder
    Entries { folder: String },

    /// Print one entry's value
    Read {
        folder: String,
        key: String,
        /// Write stream values to stdout as raw bytes instead of base64
        #[arg(long)]
        raw: bool,
    },

    /// Print every entry whose key matches a wildcard pattern (*, ?, [..])
    Find { folder: String, pattern: String },

    /// Create or overwrite an entry, creating the folder when missing
    ///
    /// password: VALUE, or prompted when omitted.
    /// stream:   base64 VALUE, or raw bytes from stdin when omitted.
    /// map:      one or more KEY=VALUE arguments.
    Write {
        folder: String,
        key: String,
        values: Vec<String>,
        #[arg(long, short = 'k', value_enum, default_value = "password")]
        kind: KindArg,
    },

    /// Remove an entry
    #[command(name = "rm")]
    Remove { folder: String, key: String },

    /// Rename an entry within its folder
    #[command(name = "mv")]
    Rename {
        folder: String,
        old: String,
        new: String,
    },

    /// Create an empty folder
    Mkdir { folder: String },

    /// Remove a folder and everything in it
    Rmdir { folder: String },

    /// Re-encrypt the store under a new password
    Passwd,

    /// Answer existence questions from the plaintext index (no password)
    Probe { folder: String, key: Option<String> },

    /// Report whether a store file exists
    Exists,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = hoard_core::config::expand_tilde(&cli.config);
    let config = HoardConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let format = cli.log_format.map(LogFormat::from).unwrap_or(config.log.format);
    init_logging(cli.log.as_deref().unwrap_or(&config.log.level), format, cli.log.is_some());

    let (path, name) = resolve_store(&config, cli.wallet.as_deref(), cli.file.as_deref());
    debug!(path = %path.display(), "resolved store path");
    let password = cli.password.map(SecretString::from);

    let ctx = Ctx {
        config: &config,
        path,
        name,
        explicit_file: cli.file.is_some(),
        password,
    };

    match cli.command {
        Commands::Folders => cmd_folders(&ctx),
        Commands::Entries { folder } => cmd_entries(&ctx, &folder),
        Commands::Read { folder, key, raw } => cmd_read(&ctx, &folder, &key, raw),
        Commands::Find { folder, pattern } => cmd_find(&ctx, &folder, &pattern),
        Commands::Write {
            folder,
            key,
            values,
            kind,
        } => cmd_write(&ctx, &folder, &key, kind, &values),
        Commands::Remove { folder, key } => cmd_remove(&ctx, &folder, &key),
        Commands::Rename { folder, old, new } => cmd_rename(&ctx, &folder, &old, &new),
        Commands::Mkdir { folder } => cmd_mkdir(&ctx, &folder),
        Commands::Rmdir { folder } => cmd_rmdir(&ctx, &folder),
        Commands::Passwd => cmd_passwd(&ctx),
        Commands::Probe { folder, key } => cmd_probe(&ctx, &folder, key.as_deref()),
        Commands::Exists => cmd_exists(&ctx),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &config_path),
    }
}

/// Explicit log settings win over `RUST_LOG`; `RUST_LOG` wins over config.
fn init_logging(level: &str, format: LogFormat, explicit: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if explicit {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Store plumbing ────────────────────────────────────────────────────────────

struct Ctx<'a> {
    config: &'a HoardConfig,
    path: PathBuf,
    name: String,
    /// `--file` given, so `path` is not under `store.dir`.
    explicit_file: bool,
    password: Option<SecretString>,
}

/// Resolve the store file: --file > --wallet under store.dir > store.default_name
fn resolve_store(
    config: &HoardConfig,
    wallet: Option<&str>,
    file: Option<&Path>,
) -> (PathBuf, String) {
    if let Some(file) = file {
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.store.default_name.clone());
        return (hoard_core::config::expand_tilde(file), name);
    }
    let name = wallet.unwrap_or(&config.store.default_name).to_string();
    (config.store.path_for(&name), name)
}

impl Ctx<'_> {
    fn store(&self) -> SecretStore {
        if self.explicit_file {
            let options = hoard_store::StoreOptions::from(&self.config.store);
            SecretStore::new(&self.path, self.name.clone()).with_options(options)
        } else {
            SecretStore::from_config(&self.config.store, &self.name)
        }
    }

    fn password(&self) -> Result<SecretString> {
        match &self.password {
            Some(pw) => Ok(SecretString::from(pw.expose_secret())),
            None => prompt_secret(&format!("Password for '{}': ", self.name)),
        }
    }

    fn open(&self) -> Result<(SecretStore, SecretString)> {
        let password = self.password()?;
        let mut store = self.store();
        let status = store
            .open(&password)
            .with_context(|| format!("opening store: {}", self.path.display()))?;
        if status == OpenStatus::Created {
            eprintln!("Created new store {}", self.path.display());
        }
        Ok((store, password))
    }

    /// Open, apply `f`, then sync and close.
    fn mutate<T>(&self, f: impl FnOnce(&mut SecretStore) -> Result<T>) -> Result<T> {
        let (mut store, password) = self.open()?;
        let out = f(&mut store)?;
        store
            .close(Some(&password))
            .with_context(|| format!("saving store: {}", self.path.display()))?;
        Ok(out)
    }
}

fn prompt_secret(prompt: &str) -> Result<SecretString> {
    let value = rpassword::prompt_password(prompt).context("reading password from terminal")?;
    Ok(SecretString::from(value))
}

fn kind_for(arg: KindArg) -> EntryKind {
    match arg {
        KindArg::Password => EntryKind::Password,
        KindArg::Stream => EntryKind::Stream,
        KindArg::Map => EntryKind::Map,
    }
}

/// Parse `KEY=VALUE` arguments. The first `=` splits; values may contain `=`.
fn parse_map_fields(values: &[String]) -> Result<BTreeMap<String, String>> {
    if values.is_empty() {
        bail!("map entries need at least one KEY=VALUE argument");
    }
    values
        .iter()
        .map(|field| match field.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => bail!("expected KEY=VALUE, got '{field}'"),
        })
        .collect()
}

fn build_entry(key: &str, kind: KindArg, values: &[String]) -> Result<Entry> {
    let entry = match kind {
        KindArg::Password => {
            let secret = match values {
                [] => prompt_secret("Secret value: ")?,
                [one] => SecretString::from(one.as_str()),
                _ => bail!("password entries take a single value"),
            };
            Entry::new_password(key, secret.expose_secret())
        }
        KindArg::Stream => {
            let bytes = match values {
                [] => {
                    let mut buf = Vec::new();
                    std::io::stdin()
                        .read_to_end(&mut buf)
                        .context("reading stream value from stdin")?;
                    buf
                }
                [one] => B64.decode(one).context("stream value is not valid base64")?,
                _ => bail!("stream entries take a single base64 value"),
            };
            Entry::new_stream(key, bytes)
        }
        KindArg::Map => Entry::new_map(key, &parse_map_fields(values)?),
    };
    debug_assert_eq!(entry.kind(), kind_for(kind));
    Ok(entry)
}

fn print_entry(entry: &Entry, raw: bool) -> Result<()> {
    match entry.kind() {
        EntryKind::Password => {
            let secret = entry.password().context("decoding password value")?;
            println!("{}", secret.expose_secret());
        }
        EntryKind::Map => {
            for (k, v) in entry.map().context("decoding map value")? {
                println!("{k}={v}");
            }
        }
        EntryKind::Stream | EntryKind::Unknown if raw => {
            std::io::stdout()
                .write_all(entry.value())
                .context("writing value to stdout")?;
        }
        EntryKind::Stream | EntryKind::Unknown => {
            let encoded = Zeroizing::new(B64.encode(entry.value()));
            println!("{}", encoded.as_str());
        }
    }
    Ok(())
}

// ── Read commands ─────────────────────────────────────────────────────────────

fn cmd_folders(ctx: &Ctx<'_>) -> Result<()> {
    let (store, _) = ctx.open()?;
    for folder in store.folder_list() {
        println!("{folder}");
    }
    Ok(())
}

fn cmd_entries(ctx: &Ctx<'_>, folder: &str) -> Result<()> {
    let (store, _) = ctx.open()?;
    if !store.has_folder(folder) {
        bail!("no folder '{folder}'");
    }
    for key in store.entry_list(folder) {
        let kind = store.entry_kind(folder, &key).unwrap_or(EntryKind::Unknown);
        println!("{key}\t{kind}");
    }
    Ok(())
}

fn cmd_read(ctx: &Ctx<'_>, folder: &str, key: &str, raw: bool) -> Result<()> {
    let (store, _) = ctx.open()?;
    let entry = store
        .read_entry(folder, key)
        .with_context(|| format!("no entry '{key}' in folder '{folder}'"))?;
    print_entry(entry, raw)
}

fn cmd_find(ctx: &Ctx<'_>, folder: &str, pattern: &str) -> Result<()> {
    let (store, _) = ctx.open()?;
    for entry in store.read_entry_list(folder, pattern)? {
        print!("{}\t", entry.key());
        print_entry(entry, false)?;
    }
    Ok(())
}

// ── Write commands ────────────────────────────────────────────────────────────

fn cmd_write(ctx: &Ctx<'_>, folder: &str, key: &str, kind: KindArg, values: &[String]) -> Result<()> {
    let entry = build_entry(key, kind, values)?;
    ctx.mutate(|store| {
        let replaced = store.has_entry(folder, key);
        store.write_entry(folder, entry)?;
        info!(kind = %kind_for(kind), replaced, "entry written");
        Ok(())
    })
}

fn cmd_remove(ctx: &Ctx<'_>, folder: &str, key: &str) -> Result<()> {
    ctx.mutate(|store| {
        if !store.remove_entry(folder, key)? {
            bail!("no entry '{key}' in folder '{folder}'");
        }
        Ok(())
    })
}

fn cmd_rename(ctx: &Ctx<'_>, folder: &str, old: &str, new: &str) -> Result<()> {
    ctx.mutate(|store| {
        if !store.rename_entry(folder, old, new)? {
            bail!("cannot rename '{old}' to '{new}' in '{folder}': source missing or target taken");
        }
        Ok(())
    })
}

fn cmd_mkdir(ctx: &Ctx<'_>, folder: &str) -> Result<()> {
    ctx.mutate(|store| {
        if !store.create_folder(folder)? {
            eprintln!("folder '{folder}' already exists");
        }
        Ok(())
    })
}

fn cmd_rmdir(ctx: &Ctx<'_>, folder: &str) -> Result<()> {
    ctx.mutate(|store| {
        if !store.remove_folder(folder)? {
            bail!("no folder '{folder}'");
        }
        Ok(())
    })
}

fn cmd_passwd(ctx: &Ctx<'_>) -> Result<()> {
    let (mut store, _) = ctx.open()?;
    let new = prompt_secret("New password: ")?;
    let confirm = prompt_secret("Repeat new password: ")?;
    if new.expose_secret() != confirm.expose_secret() {
        bail!("passwords do not match");
    }
    store
        .change_password(&new)
        .with_context(|| format!("re-encrypting store: {}", ctx.path.display()))?;
    store.close(None)?;
    println!("Password changed for {}", ctx.path.display());
    Ok(())
}

// ── Password-free commands ────────────────────────────────────────────────────

fn cmd_probe(ctx: &Ctx<'_>, folder: &str, key: Option<&str>) -> Result<()> {
    let mut store = ctx.store();
    store
        .load_index()
        .with_context(|| format!("reading index: {}", ctx.path.display()))?;

    let present = match key {
        Some(key) => !store.entry_does_not_exist(folder, key),
        None => !store.folder_does_not_exist(folder),
    };
    println!("{}", if present { "present" } else { "absent" });
    Ok(())
}

fn cmd_exists(ctx: &Ctx<'_>) -> Result<()> {
    if SecretStore::exists(&ctx.path) {
        println!("{}", ctx.path.display());
        Ok(())
    } else {
        bail!("no store at {}", ctx.path.display())
    }
}

fn cmd_config_show(config: &HoardConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write_map() {
        let cli = Cli::try_parse_from([
            "hoard", "write", "Form Data", "login", "--kind", "map", "user=alice", "pass=a=b",
        ])
        .unwrap();
        match cli.command {
            Commands::Write { kind, values, .. } => {
                assert_eq!(kind, KindArg::Map);
                let map = parse_map_fields(&values).unwrap();
                assert_eq!(map["user"], "alice");
                assert_eq!(map["pass"], "a=b");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_map_fields_rejected() {
        assert!(parse_map_fields(&[]).is_err());
        assert!(parse_map_fields(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_build_stream_entry_from_base64() {
        let entry = build_entry("blob", KindArg::Stream, &["AAEC".to_string()]).unwrap();
        assert_eq!(entry.kind(), EntryKind::Stream);
        assert_eq!(entry.value(), &[0, 1, 2]);
        assert!(build_entry("blob", KindArg::Stream, &["!!".to_string()]).is_err());
    }

    #[test]
    fn test_build_password_entry() {
        let entry = build_entry("site", KindArg::Password, &["secret1".to_string()]).unwrap();
        assert_eq!(entry.password().unwrap().expose_secret(), "secret1");
        assert!(build_entry("site", KindArg::Password, &["a".into(), "b".into()]).is_err());
    }

    #[test]
    fn test_resolve_store_paths() {
        let mut config = HoardConfig::default();
        config.store.dir = PathBuf::from("/var/lib/hoard");

        let (path, name) = resolve_store(&config, None, None);
        assert_eq!(path, PathBuf::from("/var/lib/hoard/kdewallet.kwl"));
        assert_eq!(name, "kdewallet");

        let (path, name) = resolve_store(&config, Some("work"), None);
        assert_eq!(path, PathBuf::from("/var/lib/hoard/work.kwl"));
        assert_eq!(name, "work");

        let (path, name) = resolve_store(&config, None, Some(Path::new("/tmp/x/mine.kwl")));
        assert_eq!(path, PathBuf::from("/tmp/x/mine.kwl"));
        assert_eq!(name, "mine");
    }

    #[test]
    fn test_wallet_and_file_conflict() {
        assert!(Cli::try_parse_from(["hoard", "-w", "a", "-f", "/tmp/b.kwl", "folders"]).is_err());
    }

    #[test]
    fn test_mutate_persists() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = HoardConfig::default();
        let ctx = Ctx {
            config: &config,
            path: tmp.path().join("cli.kwl"),
            name: "cli".into(),
            explicit_file: true,
            password: Some(SecretString::from("pw")),
        };

        ctx.mutate(|store| {
            store.write_entry("f", Entry::new_password("k", "v"))?;
            Ok(())
        })
        .unwrap();

        let (store, _) = ctx.open().unwrap();
        assert!(store.has_entry("f", "k"));
    }

    #[test]
    fn test_named_store_lives_in_config_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = HoardConfig::default();
        config.store.dir = tmp.path().to_path_buf();

        let (path, name) = resolve_store(&config, Some("work"), None);
        let ctx = Ctx {
            config: &config,
            path,
            name,
            explicit_file: false,
            password: Some(SecretString::from("pw")),
        };
        assert_eq!(ctx.store().path(), tmp.path().join("work.kwl"));

        ctx.mutate(|store| {
            store.create_folder("f")?;
            Ok(())
        })
        .unwrap();
        assert!(SecretStore::exists(&tmp.path().join("work.kwl")));
    }
}
