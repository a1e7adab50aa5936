//! PeerPlay CLI — `ppid` command.
//!
//! Manage a local `did:key` identity, define claim forms, request and
//! attest claims, and verify credentials received from peers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use peerplay::exchange::{self, export_to_file};
use peerplay::{
    did, import_from, ClaimDefinition, FormBuilder, ImportSource, PeerConfig, Wallet,
};

// ── CLI structure ─────────────────────────────────────────────────────────────

/// PeerPlay CLI — decentralized identities and verifiable credentials kept
/// on your own machine.
#[derive(Parser, Debug)]
#[command(
    name = "ppid",
    about = "PeerPlay identity wallet",
    version,
    long_about = "ppid — PeerPlay identity wallet\n\nGenerate a did:key identity, define claim forms, request and attest\nclaims, and verify credentials received from peers."
)]
struct Cli {
    /// Data directory (default: $PEERPLAY_HOME or ~/.peerplay)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Base URL of generated deep links (default: $PEERPLAY_BASE_URL or http://localhost:5173/)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Overwrite existing output files
    #[arg(long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the local identity
    Identity {
        #[command(subcommand)]
        subcommand: IdentityCommands,
    },

    /// Manage claim forms
    Form {
        #[command(subcommand)]
        subcommand: FormCommands,
    },

    /// Request claims from peers
    Claim {
        #[command(subcommand)]
        subcommand: ClaimCommands,
    },

    /// Sign claims requested by peers
    Attest {
        #[command(subcommand)]
        subcommand: AttestCommands,
    },

    /// Verify credentials received from peers
    #[command(args_conflicts_with_subcommands = true)]
    Verify {
        #[command(subcommand)]
        subcommand: Option<VerifyCommands>,

        /// Credential file to verify
        #[arg(long, conflicts_with = "link")]
        file: Option<PathBuf>,

        /// Deep link carrying the credential
        #[arg(long)]
        link: Option<String>,

        /// Keep the credential, tagged with the outcome
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
enum IdentityCommands {
    /// Generate a new identity and write it to a file
    Generate {
        /// Output file (default: ./peerplay-identity.json)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also store it as the local identity
        #[arg(long)]
        save: bool,
    },

    /// Load an identity file and store it as the local identity
    Import {
        /// Identity JSON file
        file: PathBuf,
    },

    /// Show the local identity
    Show,

    /// Export the local identity, private key included
    Export {
        /// Output file (default: print to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove the local identity
    Clear,
}

#[derive(Subcommand, Debug)]
enum FormCommands {
    /// Define a new form
    Create {
        /// Form title; the id is derived from it
        #[arg(long)]
        title: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,

        /// Field name (repeatable)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,

        /// Also write the form to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load a form file and store it
    Import {
        /// Form JSON file
        file: PathBuf,
    },

    /// List stored forms
    List,

    /// Export a stored form
    Export {
        /// Index from `ppid form list`
        index: usize,

        /// Output file (default: ./{form id}.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove a stored form
    Remove {
        /// Index from `ppid form list`
        index: usize,
    },

    /// Remove all stored forms
    Clear,
}

#[derive(Subcommand, Debug)]
enum ClaimCommands {
    /// Fill a stored form for the local identity
    Request {
        /// Form id
        #[arg(long)]
        form: String,

        /// Field value as NAME=VALUE (repeatable)
        #[arg(long = "value", value_parser = parse_field_value)]
        values: Vec<(String, String)>,

        /// Also write the claim to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load a claim file and store it
    Import {
        /// Claim JSON file
        file: PathBuf,
    },

    /// List requested claims
    List,

    /// Print the deep link asking a peer to attest a claim
    Link {
        /// Index from `ppid claim list`
        index: usize,
    },

    /// Remove a requested claim
    Remove {
        /// Index from `ppid claim list`
        index: usize,
    },

    /// Remove all requested claims
    Clear,
}

#[derive(Subcommand, Debug)]
enum AttestCommands {
    /// Sign a claim with the local identity
    Sign {
        /// Claim file to sign
        #[arg(long, conflicts_with = "link", required_unless_present = "link")]
        file: Option<PathBuf>,

        /// Deep link carrying the claim
        #[arg(long)]
        link: Option<String>,

        /// Also write the credential to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load a credential file and store it as issued
    Import {
        /// Credential JSON file
        file: PathBuf,
    },

    /// List credentials issued by this wallet
    List,

    /// Print the deep link handing an issued credential to its subject
    Link {
        /// Index from `ppid attest list`
        index: usize,
    },

    /// Export an issued credential
    Export {
        /// Index from `ppid attest list`
        index: usize,

        /// Output file (default: ./verifiable_cred.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove an issued credential
    Remove {
        /// Index from `ppid attest list`
        index: usize,
    },

    /// Remove all issued credentials
    Clear,
}

#[derive(Subcommand, Debug)]
enum VerifyCommands {
    /// List received credentials
    List,

    /// Re-verify a received credential and store the outcome
    Check {
        /// Index from `ppid verify list`
        index: usize,
    },

    /// Remove all received credentials
    Clear,
}

// ── Argument helpers ──────────────────────────────────────────────────────────

/// Parse `NAME=VALUE`.
fn parse_field_value(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in `{s}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn resolve_config(home: Option<PathBuf>, base_url: Option<&str>) -> Result<PeerConfig> {
    PeerConfig::resolve(home, base_url).context("failed to resolve configuration")
}

fn open_wallet(config: &PeerConfig) -> Result<Wallet> {
    Wallet::open(config)
        .with_context(|| format!("failed to open wallet at {}", config.home.display()))
}

/// Write `value` to `output` or, if absent, print it.
fn write_or_print<T: serde::Serialize>(
    config: &PeerConfig,
    value: &T,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    match output {
        Some(path) => {
            write_file(config, path, value, force)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", exchange::export_json(value)?),
    }
    Ok(())
}

/// Export `value` to `path`, refusing to touch wallet storage files and,
/// unless `force` is set, existing files.
fn write_file<T: serde::Serialize>(
    config: &PeerConfig,
    path: &Path,
    value: &T,
    force: bool,
) -> Result<()> {
    if is_storage_file(config, path) {
        bail!(
            "{} is a wallet storage file; choose another output path",
            path.display()
        );
    }
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    export_to_file(path, value)
        .with_context(|| format!("failed to write to {}", path.display()))?;
    Ok(())
}

/// Whether `path` names the backing file of one of the wallet's storage keys.
fn is_storage_file(config: &PeerConfig, path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let keys = &config.keys;
    let is_key_file = [
        &keys.identity,
        &keys.forms,
        &keys.claims,
        &keys.issued,
        &keys.received,
    ]
    .iter()
    .any(|key| name == format!("{key}.json"));
    if !is_key_file {
        return false;
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (dir.canonicalize(), config.home.canonicalize()) {
        (Ok(dir), Ok(home)) => dir == home,
        _ => false,
    }
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let Cli {
        home,
        base_url,
        verbose,
        force,
        command,
    } = Cli::parse();

    let result = resolve_config(home, base_url.as_deref()).and_then(|config| match command {
        Commands::Identity { subcommand } => match subcommand {
            IdentityCommands::Generate { output, save } => {
                cmd_identity_generate(&config, output.as_deref(), save, force, verbose)
            }
            IdentityCommands::Import { file } => cmd_identity_import(&config, &file, verbose),
            IdentityCommands::Show => cmd_identity_show(&config, verbose),
            IdentityCommands::Export { output } => {
                cmd_identity_export(&config, output.as_deref(), force)
            }
            IdentityCommands::Clear => cmd_identity_clear(&config),
        },
        Commands::Form { subcommand } => match subcommand {
            FormCommands::Create {
                title,
                description,
                fields,
                output,
            } => cmd_form_create(
                &config,
                &title,
                description.as_deref(),
                &fields,
                output.as_deref(),
                force,
                verbose,
            ),
            FormCommands::Import { file } => cmd_form_import(&config, &file),
            FormCommands::List => cmd_form_list(&config, verbose),
            FormCommands::Export { index, output } => {
                cmd_form_export(&config, index, output.as_deref(), force)
            }
            FormCommands::Remove { index } => cmd_form_remove(&config, index),
            FormCommands::Clear => cmd_form_clear(&config),
        },
        Commands::Claim { subcommand } => match subcommand {
            ClaimCommands::Request {
                form,
                values,
                output,
            } => cmd_claim_request(&config, &form, values, output.as_deref(), force, verbose),
            ClaimCommands::Import { file } => cmd_claim_import(&config, &file),
            ClaimCommands::List => cmd_claim_list(&config, verbose),
            ClaimCommands::Link { index } => cmd_claim_link(&config, index),
            ClaimCommands::Remove { index } => cmd_claim_remove(&config, index),
            ClaimCommands::Clear => cmd_claim_clear(&config),
        },
        Commands::Attest { subcommand } => match subcommand {
            AttestCommands::Sign { file, link, output } => cmd_attest_sign(
                &config,
                file.as_deref(),
                link.as_deref(),
                output.as_deref(),
                force,
                verbose,
            ),
            AttestCommands::Import { file } => cmd_attest_import(&config, &file),
            AttestCommands::List => cmd_attest_list(&config, verbose),
            AttestCommands::Link { index } => cmd_attest_link(&config, index),
            AttestCommands::Export { index, output } => {
                cmd_attest_export(&config, index, output.as_deref(), force)
            }
            AttestCommands::Remove { index } => cmd_attest_remove(&config, index),
            AttestCommands::Clear => cmd_attest_clear(&config),
        },
        Commands::Verify {
            subcommand,
            file,
            link,
            save,
        } => match subcommand {
            Some(VerifyCommands::List) => cmd_verify_list(&config, verbose),
            Some(VerifyCommands::Check { index }) => cmd_verify_check(&config, index),
            Some(VerifyCommands::Clear) => cmd_verify_clear(&config),
            None => cmd_verify(&config, file.as_deref(), link.as_deref(), save, verbose),
        },
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Identity commands ─────────────────────────────────────────────────────────

/// `ppid identity generate [--output FILE] [--save]`
fn cmd_identity_generate(
    config: &PeerConfig,
    output: Option<&Path>,
    save: bool,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let identity = wallet
        .generate_identity()
        .context("failed to generate identity")?
        .clone();

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(identity.file_name()));
    write_file(config, &path, &identity, force)?;

    println!("Created identity");
    println!("  DID:  {}", identity.did);
    println!("  File: {}", path.display());
    if verbose {
        println!("  Key:  {} ({})", identity.public_key_hex, identity.key_type);
    }

    if save {
        wallet.identity_mut().commit().context("failed to store identity")?;
        println!("Stored as the local identity");
    } else {
        println!("Run `ppid identity import {}` to use it", path.display());
    }

    Ok(())
}

/// `ppid identity import FILE`
fn cmd_identity_import(config: &PeerConfig, file: &Path, verbose: bool) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let replaced = wallet.identity().stored_single().map(|i| i.did.clone());

    let did = wallet
        .identity_mut()
        .import(ImportSource::file(file))?
        .did
        .clone();
    wallet.identity_mut().commit().context("failed to store identity")?;

    println!("Stored identity {did}");
    if verbose {
        if let Some(old) = replaced.filter(|old| *old != did) {
            println!("  Replaced: {old}");
        }
    }

    Ok(())
}

/// `ppid identity show`
fn cmd_identity_show(config: &PeerConfig, verbose: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    let identity = wallet.stored_identity()?;

    println!("Identity");
    println!("  DID:        {}", identity.did);
    println!("  Key ID:     {}", identity.kid);
    println!("  Type:       {}", identity.key_type);
    println!("  Public Key: {}", identity.public_key_hex);

    if verbose {
        let doc = did::resolve(&identity.did).context("failed to resolve DID")?;
        println!("{}", exchange::export_json(&doc)?);
    }

    Ok(())
}

/// `ppid identity export [--output FILE]`
fn cmd_identity_export(config: &PeerConfig, output: Option<&Path>, force: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    let identity = wallet.stored_identity()?;
    write_or_print(config, identity, output, force)
}

/// `ppid identity clear`
fn cmd_identity_clear(config: &PeerConfig) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    wallet.identity_mut().clear_all()?;
    println!("Cleared local identity");
    Ok(())
}

// ── Form commands ─────────────────────────────────────────────────────────────

/// `ppid form create --title T [--description D] --field NAME... [--output FILE]`
fn cmd_form_create(
    config: &PeerConfig,
    title: &str,
    description: Option<&str>,
    fields: &[String],
    output: Option<&Path>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let mut wallet = open_wallet(config)?;

    let mut builder = FormBuilder::new(title);
    if let Some(d) = description {
        builder = builder.description(d);
    }
    let form = fields
        .iter()
        .fold(builder, |b, name| b.field(name))
        .build()?;

    if wallet.forms().stored_list().iter().any(|f| f.id == form.id) {
        log::warn!("a form with id `{}` already exists", form.id);
    }

    if let Some(path) = output {
        write_file(config, path, &form, force)?;
    }

    wallet.forms_mut().import_direct(form.clone());
    wallet.forms_mut().commit().context("failed to store form")?;

    println!("Created form '{}'", form.title);
    println!("  ID:     {}", form.id);
    println!("  Fields: {}", form.fields.len());
    if verbose {
        for field in &form.fields {
            println!("    - {} ({})", field.name, field.field_type);
        }
    }

    Ok(())
}

/// `ppid form import FILE`
fn cmd_form_import(config: &PeerConfig, file: &Path) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let id = wallet
        .forms_mut()
        .import(ImportSource::file(file))?
        .id
        .clone();
    wallet.forms_mut().commit().context("failed to store form")?;
    println!("Stored form '{id}'");
    Ok(())
}

/// `ppid form list`
fn cmd_form_list(config: &PeerConfig, verbose: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    let forms = wallet.forms().stored_list();

    if forms.is_empty() {
        println!("No stored forms");
        return Ok(());
    }

    println!("{:<5} {:<24} {:<30} FIELDS", "#", "ID", "TITLE");
    println!("{}", "-".repeat(72));
    for (i, form) in forms.iter().enumerate() {
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        println!(
            "{:<5} {:<24} {:<30} {}",
            i,
            form.id,
            form.title,
            names.join(", ")
        );
        if verbose {
            if let Some(d) = &form.description {
                println!("      {d}");
            }
        }
    }

    Ok(())
}

/// `ppid form export INDEX [--output FILE]`
fn cmd_form_export(
    config: &PeerConfig,
    index: usize,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let wallet = open_wallet(config)?;
    let form = wallet
        .forms()
        .get(index)
        .ok_or_else(|| anyhow!("no form at index {index}"))?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(form.file_name()));
    write_or_print(config, form, Some(path.as_path()), force)
}

/// `ppid form remove INDEX`
fn cmd_form_remove(config: &PeerConfig, index: usize) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    if !wallet.forms_mut().remove_stored(index)? {
        bail!("no form at index {index}");
    }
    println!("Removed form #{index}");
    Ok(())
}

/// `ppid form clear`
fn cmd_form_clear(config: &PeerConfig) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    wallet.forms_mut().clear_all()?;
    println!("Cleared all forms");
    Ok(())
}

// ── Claim commands ────────────────────────────────────────────────────────────

/// `ppid claim request --form ID --value NAME=VALUE... [--output FILE]`
fn cmd_claim_request(
    config: &PeerConfig,
    form_id: &str,
    values: Vec<(String, String)>,
    output: Option<&Path>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let values: BTreeMap<String, String> = values.into_iter().collect();

    let claim = wallet.create_claim(form_id, &values)?.clone();
    if let Some(path) = output {
        write_file(config, path, &claim, force)?;
    }
    wallet.claims_mut().commit().context("failed to store claim")?;

    let index = wallet.claims().len() - 1;
    println!("Requested claim #{index} for form '{}'", claim.form_id);
    if verbose {
        println!("  Subject: {}", claim.credential_subject.id);
        for (name, value) in &claim.credential_subject.values {
            println!("    {name}: {value}");
        }
    }
    println!("Share with `ppid claim link {index}`");

    Ok(())
}

/// `ppid claim import FILE`
fn cmd_claim_import(config: &PeerConfig, file: &Path) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let form_id = wallet
        .claims_mut()
        .import(ImportSource::file(file))?
        .form_id
        .clone();
    wallet.claims_mut().commit().context("failed to store claim")?;
    println!("Stored claim for form '{form_id}'");
    Ok(())
}

/// `ppid claim list`
fn cmd_claim_list(config: &PeerConfig, verbose: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    let claims = wallet.claims().stored_list();

    if claims.is_empty() {
        println!("No requested claims");
        return Ok(());
    }

    println!("{:<5} {:<24} VALUES", "#", "FORM");
    println!("{}", "-".repeat(72));
    for (i, claim) in claims.iter().enumerate() {
        let values: Vec<String> = claim
            .credential_subject
            .values
            .values()
            .map(display_value)
            .collect();
        println!("{:<5} {:<24} {}", i, claim.form_id, values.join(", "));
        if verbose {
            println!("      subject: {}", claim.credential_subject.id);
        }
    }

    Ok(())
}

/// `ppid claim link INDEX`
fn cmd_claim_link(config: &PeerConfig, index: usize) -> Result<()> {
    let wallet = open_wallet(config)?;
    println!("{}", wallet.claim_link(index)?);
    Ok(())
}

/// `ppid claim remove INDEX`
fn cmd_claim_remove(config: &PeerConfig, index: usize) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    if !wallet.claims_mut().remove_stored(index)? {
        bail!("no claim at index {index}");
    }
    println!("Removed claim #{index}");
    Ok(())
}

/// `ppid claim clear`
fn cmd_claim_clear(config: &PeerConfig) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    wallet.claims_mut().clear_all()?;
    println!("Cleared all requested claims");
    Ok(())
}

fn display_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Attest commands ───────────────────────────────────────────────────────────

/// `ppid attest sign (--file FILE | --link URL) [--output FILE]`
fn cmd_attest_sign(
    config: &PeerConfig,
    file: Option<&Path>,
    link: Option<&str>,
    output: Option<&Path>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let mut wallet = open_wallet(config)?;

    let claim: ClaimDefinition = match (file, link) {
        (Some(path), _) => import_from(ImportSource::file(path))?,
        (None, Some(link)) => Wallet::claim_from_link(link)?,
        (None, None) => bail!("pass --file or --link"),
    };

    let vc = wallet.sign_claim(&claim)?.clone();
    if let Some(path) = output {
        write_file(config, path, &vc, force)?;
    }
    wallet.issued_mut().commit().context("failed to store credential")?;
    let index = wallet.issued().len() - 1;

    println!("Attested claim for form '{}'", claim.form_id);
    println!("  Subject: {}", claim.credential_subject.id);
    if verbose {
        println!("  Types:   {}", vc.credential_type.join(", "));
        if let Some(date) = &vc.issuance_date {
            println!("  Issued:  {date}");
        }
    }
    println!("{}", wallet.issued_link(index)?);

    Ok(())
}

/// `ppid attest list`
fn cmd_attest_list(config: &PeerConfig, verbose: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    print_credentials(wallet.issued().stored_list(), "No issued credentials", verbose);
    Ok(())
}

/// `ppid attest link INDEX`
fn cmd_attest_link(config: &PeerConfig, index: usize) -> Result<()> {
    let wallet = open_wallet(config)?;
    println!("{}", wallet.issued_link(index)?);
    Ok(())
}

/// `ppid attest export INDEX [--output FILE]`
fn cmd_attest_export(
    config: &PeerConfig,
    index: usize,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let wallet = open_wallet(config)?;
    let vc = wallet
        .issued()
        .get(index)
        .ok_or_else(|| anyhow!("no issued credential at index {index}"))?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(vc.file_name()));
    write_or_print(config, &vc.untagged(), Some(path.as_path()), force)
}

/// `ppid attest import FILE`
fn cmd_attest_import(config: &PeerConfig, file: &Path) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let subject = wallet
        .issued_mut()
        .import(ImportSource::file(file))?
        .subject_id()
        .unwrap_or("-")
        .to_string();
    wallet
        .issued_mut()
        .commit()
        .context("failed to store credential")?;
    println!(
        "Stored issued credential #{} for {subject}",
        wallet.issued().len() - 1
    );
    Ok(())
}

/// `ppid attest remove INDEX`
fn cmd_attest_remove(config: &PeerConfig, index: usize) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    if !wallet.issued_mut().remove_stored(index)? {
        bail!("no issued credential at index {index}");
    }
    println!("Removed issued credential #{index}");
    Ok(())
}

/// `ppid attest clear`
fn cmd_attest_clear(config: &PeerConfig) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    wallet.issued_mut().clear_all()?;
    println!("Cleared all issued credentials");
    Ok(())
}

fn print_credentials(list: &[peerplay::VerifiableCredential], empty: &str, verbose: bool) {
    if list.is_empty() {
        println!("{empty}");
        return;
    }

    println!("{:<5} {:<10} {:<30} SUBJECT", "#", "STATUS", "TYPE");
    println!("{}", "-".repeat(72));
    for (i, vc) in list.iter().enumerate() {
        let status = match vc.verified {
            Some(true) => "valid",
            Some(false) => "invalid",
            None => "-",
        };
        let kind = vc
            .credential_type
            .last()
            .map(String::as_str)
            .unwrap_or("-");
        println!(
            "{:<5} {:<10} {:<30} {}",
            i,
            status,
            kind,
            vc.subject_id().unwrap_or("-")
        );
        if verbose {
            println!("      issuer: {}", vc.issuer_id().unwrap_or("-"));
            for (name, value) in vc.credential_subject.iter().filter(|(k, _)| *k != "id") {
                println!("      {name}: {}", display_value(value));
            }
        }
    }
}

// ── Verify commands ───────────────────────────────────────────────────────────

/// `ppid verify (--file FILE | --link URL) [--save]`
fn cmd_verify(
    config: &PeerConfig,
    file: Option<&Path>,
    link: Option<&str>,
    save: bool,
    verbose: bool,
) -> Result<()> {
    let mut wallet = open_wallet(config)?;

    match (file, link) {
        (Some(path), _) => {
            wallet.received_mut().import(ImportSource::file(path))?;
        }
        (None, Some(link)) => {
            wallet.receive_link(link)?;
        }
        (None, None) => bail!("pass --file or --link, or use a subcommand"),
    }

    let status = wallet
        .verify_imported()
        .ok_or_else(|| anyhow!("no credential loaded"))?;

    if let Some(vc) = wallet.received().imported() {
        println!("Credential from {}", vc.issuer_id().unwrap_or("<unknown issuer>"));
        if verbose {
            println!("  Subject: {}", vc.subject_id().unwrap_or("-"));
            println!("  Types:   {}", vc.credential_type.join(", "));
        }
    }
    println!("  Status:  {status}");

    if save {
        wallet
            .received_mut()
            .commit()
            .context("failed to store credential")?;
        println!("Stored as #{}", wallet.received().len() - 1);
    }

    Ok(())
}

/// `ppid verify list`
fn cmd_verify_list(config: &PeerConfig, verbose: bool) -> Result<()> {
    let wallet = open_wallet(config)?;
    print_credentials(
        wallet.received().stored_list(),
        "No received credentials",
        verbose,
    );
    Ok(())
}

/// `ppid verify check INDEX`
fn cmd_verify_check(config: &PeerConfig, index: usize) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    let status = wallet
        .verify_received(index)?
        .ok_or_else(|| anyhow!("no received credential at index {index}"))?;
    println!("Credential #{index}: {status}");
    Ok(())
}

/// `ppid verify clear`
fn cmd_verify_clear(config: &PeerConfig) -> Result<()> {
    let mut wallet = open_wallet(config)?;
    wallet.received_mut().clear_all()?;
    println!("Cleared all received credentials");
    Ok(())
}
