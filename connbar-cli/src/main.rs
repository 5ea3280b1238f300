//! `ConnBar` CLI - Command-line front end for the ConnBar connection sidebar
//!
//! Drives the connection directory and the external RDP launcher against
//! the on-disk profile store: grouped listing, pinning, duplication,
//! deletion, editing, launching, clipboard payloads and sidebar settings.

use std::fmt::Write as _;
use std::io::{self, BufRead as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use connbar_core::config::{
    ConfigManager, GroupBy, ProtocolFilter, SettingsService, SortMode,
};
use connbar_core::connection::{ProfileDraft, ProfileStore};
use connbar_core::directory::{
    Clipboard, CollapseState, CollectingNotifier, ConfirmRequest, Confirmation,
    ConnectionDirectory, DeleteOutcome, FixedConfirmation, LaunchStatus, RecencyTracker,
    SessionOpener,
};
use connbar_core::models::{Numeric, Profile, ProfileGroup, ProtocolType};
use connbar_core::protocol::{quick_connect, ProtocolRegistry};
use connbar_core::session::CLEANUP_DELAY;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// `ConnBar` command-line interface for the connection sidebar
#[derive(Parser)]
#[command(name = "connbar")]
#[command(author, version, about = "ConnBar command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding profiles.toml and config.toml
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List profiles grouped the way the sidebar shows them
    #[command(about = "List profiles in sidebar order")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,

        /// Only show profiles whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order for this listing (name, host, recent, type)
        #[arg(long)]
        sort: Option<SortMode>,

        /// Protocol filter for this listing (all, ssh, telnet, rdp)
        #[arg(short, long)]
        protocol: Option<ProtocolFilter>,

        /// Grouping for this listing (group, protocol)
        #[arg(short, long)]
        group_by: Option<GroupBy>,
    },

    /// Show one profile
    #[command(about = "Show profile details")]
    Show {
        /// Profile name or identifier
        name: String,
    },

    /// Add a new profile
    #[command(about = "Add a new profile")]
    Add {
        /// Protocol (ssh, telnet, rdp)
        #[arg(short = 'P', long, default_value = "ssh")]
        protocol: String,

        /// Host name or address
        #[arg(short = 'H', long)]
        host: String,

        /// Display name; generated from the target when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Port
        #[arg(short, long)]
        port: Option<u16>,

        /// Login user
        #[arg(short, long)]
        user: Option<String>,

        /// Group label
        #[arg(short, long)]
        group: Option<String>,

        #[command(flatten)]
        rdp: RdpArgs,
    },

    /// Edit an existing profile
    #[command(about = "Update an existing profile")]
    Edit {
        /// Profile name or identifier
        name: String,

        /// New display name
        #[arg(short, long)]
        new_name: Option<String>,

        /// New host
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// New port
        #[arg(short, long)]
        port: Option<u16>,

        /// New login user
        #[arg(short, long)]
        user: Option<String>,

        /// New group label; an empty value removes the group
        #[arg(short, long)]
        group: Option<String>,

        #[command(flatten)]
        rdp: RdpArgs,
    },

    /// Duplicate a profile
    #[command(about = "Append a copy of a profile")]
    Duplicate {
        /// Profile name or identifier
        name: String,
    },

    /// Delete a profile
    #[command(about = "Delete a profile")]
    Delete {
        /// Profile name or identifier
        name: String,

        /// Delete without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Pin a profile to the favorites group
    #[command(about = "Pin a profile to favorites")]
    Pin {
        /// Profile name or identifier
        name: String,
    },

    /// Remove a profile from the favorites group
    #[command(about = "Unpin a profile from favorites")]
    Unpin {
        /// Profile name or identifier
        name: String,
    },

    /// Open a profile
    #[command(about = "Open a profile (RDP through the external client)")]
    Launch {
        /// Profile name or identifier
        name: String,

        /// Stay running until the RDP descriptor has been cleaned up
        #[arg(short, long)]
        wait: bool,
    },

    /// Launch an unsaved RDP target
    #[command(about = "Launch RDP quick connect: [rdp://][user@]host[:port]")]
    Quick {
        /// Target in `[rdp://][user@]host[:port]` form
        target: String,

        /// Stay running until the RDP descriptor has been cleaned up
        #[arg(short, long)]
        wait: bool,
    },

    /// Copy a clipboard payload for a profile
    #[command(about = "Copy the connect command or RDP descriptor to the clipboard")]
    Copy {
        /// Profile name or identifier
        name: String,

        /// Copy the RDP descriptor instead of the shell command
        #[arg(short, long)]
        descriptor: bool,

        /// Print the payload to stdout instead of the clipboard
        #[arg(short, long)]
        print: bool,
    },

    /// Collapse or expand a group
    #[command(about = "Toggle a group's collapsed state")]
    Collapse {
        /// Group id or display name
        group: String,
    },

    /// Sidebar settings
    #[command(subcommand, about = "Show or change sidebar settings")]
    Settings(SettingsCommands),

    /// Show or hide the sidebar
    #[command(about = "Toggle sidebar visibility")]
    Toggle,
}

/// RDP display options shared by `add` and `edit`
#[derive(clap::Args, Default)]
pub struct RdpArgs {
    /// RDP Windows domain
    #[arg(long)]
    pub domain: Option<String>,

    /// RDP full-screen session
    #[arg(long)]
    pub fullscreen: bool,

    /// RDP desktop width
    #[arg(long)]
    pub width: Option<u32>,

    /// RDP desktop height
    #[arg(long)]
    pub height: Option<u32>,

    /// RDP administrative session
    #[arg(long)]
    pub admin: bool,
}

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the sidebar configuration
    #[command(about = "Print sidebar settings as JSON")]
    Show,

    /// Change one sidebar setting
    #[command(about = "Set a sidebar setting (camelCase key)")]
    Set {
        /// Setting key, for example `sortBy` or `rdpClientPath`
        key: String,

        /// New value
        value: String,
    },
}

/// Output format for `list`
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as grouped table
    Table,
    /// Output as JSON
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();

    let result = match cli.command {
        Commands::List {
            format,
            search,
            sort,
            protocol,
            group_by,
        } => cmd_list(
            config_dir,
            format,
            search.as_deref(),
            ListOverrides {
                sort,
                protocol,
                group_by,
            },
        ),
        Commands::Show { name } => cmd_show(config_dir, &name),
        Commands::Add {
            protocol,
            host,
            name,
            port,
            user,
            group,
            rdp,
        } => cmd_add(
            config_dir,
            &protocol,
            &host,
            ProfileEdits {
                name,
                host: None,
                port,
                user,
                group,
                rdp,
            },
        ),
        Commands::Edit {
            name,
            new_name,
            host,
            port,
            user,
            group,
            rdp,
        } => cmd_edit(
            config_dir,
            &name,
            ProfileEdits {
                name: new_name,
                host,
                port,
                user,
                group,
                rdp,
            },
        ),
        Commands::Duplicate { name } => cmd_duplicate(config_dir, &name),
        Commands::Delete { name, yes } => cmd_delete(config_dir, &name, yes),
        Commands::Pin { name } => cmd_pin(config_dir, &name, true),
        Commands::Unpin { name } => cmd_pin(config_dir, &name, false),
        Commands::Launch { name, wait } => cmd_launch(config_dir, LaunchTarget::Saved(&name), wait),
        Commands::Quick { target, wait } => {
            cmd_launch(config_dir, LaunchTarget::Quick(&target), wait)
        }
        Commands::Copy {
            name,
            descriptor,
            print,
        } => cmd_copy(config_dir, &name, descriptor, print),
        Commands::Collapse { group } => cmd_collapse(config_dir, &group),
        Commands::Settings(subcmd) => cmd_settings(config_dir, subcmd),
        Commands::Toggle => cmd_toggle(config_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

// ========== Setup ==========

fn config_manager(config_dir: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_dir {
        Some(dir) => Ok(ConfigManager::with_config_dir(dir.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Opens the directory with terminal-backed collaborators
fn open_directory(
    config_dir: Option<&Path>,
    notifier: &CollectingNotifier,
) -> Result<ConnectionDirectory, CliError> {
    let manager = config_manager(config_dir)?;
    let directory = ConnectionDirectory::open(manager)
        .map_err(|e| CliError::Config(format!("Failed to load configuration: {e}")))?;
    Ok(directory
        .with_notifier(Box::new(notifier.clone()))
        .with_opener(Box::new(TerminalOpener::default())))
}

/// Joins every collected error into one message
fn collected_errors(notifier: &CollectingNotifier, fallback: &str) -> String {
    let errors = notifier.errors();
    if errors.is_empty() {
        fallback.to_string()
    } else {
        errors.join("; ")
    }
}

// ========== List ==========

/// One-off settings used by `list` without touching config.toml
#[derive(Default)]
struct ListOverrides {
    sort: Option<SortMode>,
    protocol: Option<ProtocolFilter>,
    group_by: Option<GroupBy>,
}

fn cmd_list(
    config_dir: Option<&Path>,
    format: OutputFormat,
    search: Option<&str>,
    overrides: ListOverrides,
) -> Result<(), CliError> {
    let manager = config_manager(config_dir)?;
    let store = ProfileStore::load(manager.clone())
        .map_err(|e| CliError::Config(format!("Failed to load profiles: {e}")))?;
    let mut settings = manager
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
    if let Some(sort) = overrides.sort {
        settings.sidebar.sort_by = sort;
    }
    if let Some(protocol) = overrides.protocol {
        settings.sidebar.protocol_filter = protocol;
    }
    if let Some(group_by) = overrides.group_by {
        settings.sidebar.group_by = group_by;
    }

    let mut directory = ConnectionDirectory::new(store, SettingsService::in_memory(settings))
        .with_collapse_state(CollapseState::load(manager.clone()))
        .with_recent(Box::new(RecencyTracker::load(manager)));
    directory.refresh();
    if let Some(term) = search {
        directory.set_search_term(term);
    }

    match format {
        OutputFormat::Table => println!("{}", format_groups(&directory)),
        OutputFormat::Json => {
            let listing = listing(&directory);
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| CliError::Config(format!("Failed to serialize listing: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Formats the visible groups as an indented table
#[must_use]
pub fn format_groups(directory: &ConnectionDirectory) -> String {
    if !directory.has_visible_profiles() {
        return "No connections found.".to_string();
    }

    let mut output = String::new();
    for group in directory.groups() {
        if !directory.is_group_visible(group) {
            continue;
        }
        let marker = if group.collapsed { '+' } else { '-' };
        let _ = writeln!(
            output,
            "{marker} {} ({})",
            group.name,
            directory.visible_count(group)
        );
        if group.collapsed {
            continue;
        }
        for row in group_rows(directory, group) {
            let _ = writeln!(output, "{row}");
        }
    }
    let _ = write!(output, "{}", directory.summary());
    output
}

fn group_rows(directory: &ConnectionDirectory, group: &ProfileGroup) -> Vec<String> {
    let visible: Vec<&Profile> = group
        .profiles
        .iter()
        .filter(|p| directory.is_profile_visible(p))
        .collect();
    let name_width = visible.iter().map(|p| p.name.len()).max().unwrap_or(4).max(4);
    let show_badge = directory.settings().read(|cfg| cfg.show_protocol_badge);

    visible
        .iter()
        .map(|p| {
            let active = if directory.is_active_connection(p) { '*' } else { ' ' };
            let badge = if show_badge {
                format!("{:<6} ", p.protocol.label())
            } else {
                String::new()
            };
            format!(
                "  {active} {badge}{:<name_width$}  {}",
                p.name,
                directory.description(p)
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

#[derive(Serialize)]
struct Listing {
    summary: String,
    groups: Vec<GroupEntry>,
}

#[derive(Serialize)]
struct GroupEntry {
    id: String,
    name: String,
    collapsed: bool,
    profiles: Vec<ProfileEntry>,
}

#[derive(Serialize)]
struct ProfileEntry {
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    protocol: String,
    description: String,
    pinned: bool,
    active: bool,
}

fn listing(directory: &ConnectionDirectory) -> Listing {
    let groups = directory
        .groups()
        .iter()
        .filter(|g| directory.is_group_visible(g))
        .map(|g| GroupEntry {
            id: g.id.clone(),
            name: g.name.clone(),
            collapsed: g.collapsed,
            profiles: g
                .profiles
                .iter()
                .filter(|p| directory.is_profile_visible(p))
                .map(|p| ProfileEntry {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    protocol: p.protocol.as_str().to_string(),
                    description: directory.description(p),
                    pinned: directory.is_pinned(p),
                    active: directory.is_active_connection(p),
                })
                .collect(),
        })
        .collect();
    Listing {
        summary: directory.summary(),
        groups,
    }
}

// ========== Show ==========

fn cmd_show(config_dir: Option<&Path>, name: &str) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let directory = open_directory(config_dir, &notifier)?;
    let profile = find_profile(directory.store().profiles(), name)?;
    println!("{}", format_profile(&directory, profile));
    Ok(())
}

fn format_profile(directory: &ConnectionDirectory, profile: &Profile) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Name:        {}", profile.name);
    let _ = writeln!(output, "ID:          {}", profile.id.as_deref().unwrap_or("-"));
    let _ = writeln!(output, "Type:        {}", profile.protocol.label());
    let group = profile
        .group
        .as_deref()
        .map(|g| directory.store().group_name(g).unwrap_or(g))
        .unwrap_or("-");
    let _ = writeln!(output, "Group:       {group}");
    let _ = writeln!(output, "Target:      {}", directory.description(profile));
    if let Ok(command) = ProtocolRegistry::new().connect_command(profile) {
        let _ = writeln!(output, "Command:     {command}");
    }
    let _ = writeln!(output, "Pinned:      {}", yes_no(directory.is_pinned(profile)));
    let _ = writeln!(
        output,
        "Active:      {}",
        yes_no(directory.is_active_connection(profile))
    );
    if profile.is_builtin {
        let _ = writeln!(output, "Builtin:     yes");
    }
    if !profile.is_eligible() {
        let _ = writeln!(output, "Hidden:      yes (template, unsupported type or no host)");
    }
    output.trim_end().to_string()
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ========== Add / Edit ==========

/// Field changes applied to a draft
#[derive(Default)]
struct ProfileEdits {
    name: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    group: Option<String>,
    rdp: RdpArgs,
}

impl ProfileEdits {
    fn apply(self, draft: &mut ProfileDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(host) = self.host {
            draft.options.host = host;
        }
        if let Some(port) = self.port {
            draft.options.port = Some(Numeric::from(port));
        }
        if let Some(user) = self.user {
            if draft.protocol == ProtocolType::Rdp {
                draft.options.username = Some(user);
            } else {
                draft.options.user = Some(user);
            }
        }
        if let Some(group) = self.group {
            draft.group = group;
        }
        if draft.protocol == ProtocolType::Rdp {
            if let Some(domain) = self.rdp.domain {
                draft.options.domain = Some(domain);
            }
            draft.options.fullscreen |= self.rdp.fullscreen;
            draft.options.admin |= self.rdp.admin;
            if let Some(width) = self.rdp.width {
                draft.options.width = Some(Numeric::from(width));
            }
            if let Some(height) = self.rdp.height {
                draft.options.height = Some(Numeric::from(height));
            }
        }
    }
}

/// Parses a protocol argument, accepting only the supported protocols
pub fn parse_protocol(value: &str) -> Result<ProtocolType, CliError> {
    let protocol = ProtocolType::from(value.trim().to_lowercase());
    if protocol.is_supported() {
        Ok(protocol)
    } else {
        Err(CliError::Invalid(format!(
            "Unsupported protocol '{value}'. Use ssh, telnet or rdp."
        )))
    }
}

fn cmd_add(
    config_dir: Option<&Path>,
    protocol: &str,
    host: &str,
    edits: ProfileEdits,
) -> Result<(), CliError> {
    let protocol = parse_protocol(protocol)?;
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;

    let mut draft = ProfileDraft::new(protocol);
    draft.options.host = host.to_string();
    edits.apply(&mut draft);

    let saved = directory
        .store_mut()
        .save_draft(&draft)
        .map_err(|e| CliError::Invalid(e.to_string()))?;
    directory.refresh();
    println!(
        "Added '{}' ({})",
        saved.name,
        saved.id.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn cmd_edit(config_dir: Option<&Path>, name: &str, edits: ProfileEdits) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;
    let profile = find_profile(directory.store().profiles(), name)?.clone();

    let mut draft = ProfileDraft::edit(&profile);
    edits.apply(&mut draft);

    let saved = directory
        .store_mut()
        .save_draft(&draft)
        .map_err(|e| CliError::Invalid(e.to_string()))?;
    directory.refresh();
    println!("Updated '{}'", saved.name);
    Ok(())
}

// ========== Duplicate / Delete ==========

fn cmd_duplicate(config_dir: Option<&Path>, name: &str) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;
    let profile = find_profile(directory.store().profiles(), name)?.clone();

    match directory.duplicate(&profile) {
        Some(copy) => {
            println!("Duplicated '{}' as '{}'", profile.name, copy.name);
            Ok(())
        }
        None => Err(CliError::Config(collected_errors(
            &notifier,
            "Failed to duplicate profile",
        ))),
    }
}

fn cmd_delete(config_dir: Option<&Path>, name: &str, yes: bool) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let confirmation: Box<dyn Confirmation> = if yes {
        Box::new(FixedConfirmation::Accept)
    } else {
        Box::new(PromptConfirmation)
    };
    let mut directory = open_directory(config_dir, &notifier)?.with_confirmation(confirmation);
    let profile = find_profile(directory.store().profiles(), name)?.clone();

    match directory.delete(&profile) {
        DeleteOutcome::Deleted(removed) => {
            println!("Deleted '{}'", removed.name);
            Ok(())
        }
        DeleteOutcome::Declined => {
            println!("Cancelled");
            Ok(())
        }
        DeleteOutcome::Refused => Err(CliError::Invalid(format!(
            "Profile '{}' is builtin and cannot be deleted",
            profile.name
        ))),
        DeleteOutcome::Failed => Err(CliError::Config(collected_errors(
            &notifier,
            "Failed to delete profile",
        ))),
    }
}

/// Asks on the terminal; an answer matching a button label picks it
struct PromptConfirmation;

impl Confirmation for PromptConfirmation {
    fn confirm(&mut self, request: &ConfirmRequest) -> usize {
        eprint!("{} [{}] ", request.message, request.buttons.join("/"));
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return request.cancel_index;
        }
        match_answer(&line, request)
    }
}

/// Maps a typed answer to a button index
///
/// Matches a button label or its prefix case-insensitively; `y`/`yes` pick
/// the first button. Anything else cancels.
#[must_use]
pub fn match_answer(answer: &str, request: &ConfirmRequest) -> usize {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return request.cancel_index;
    }
    if answer == "y" || answer == "yes" {
        return 0;
    }
    request
        .buttons
        .iter()
        .position(|b| b.to_lowercase().starts_with(&answer))
        .unwrap_or(request.cancel_index)
}

// ========== Pin ==========

fn cmd_pin(config_dir: Option<&Path>, name: &str, pin: bool) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;
    let profile = find_profile(directory.store().profiles(), name)?.clone();
    if profile.id.is_none() {
        return Err(CliError::Invalid(format!(
            "Profile '{}' has no identifier and cannot be pinned",
            profile.name
        )));
    }

    if pin {
        if directory.pin(&profile) {
            println!("Pinned '{}'", profile.name);
        } else {
            println!("'{}' is already pinned", profile.name);
        }
    } else {
        directory.unpin(&profile);
        println!("Unpinned '{}'", profile.name);
    }
    directory.shutdown();
    Ok(())
}

// ========== Launch ==========

enum LaunchTarget<'a> {
    Saved(&'a str),
    Quick(&'a str),
}

fn cmd_launch(config_dir: Option<&Path>, target: LaunchTarget<'_>, wait: bool) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;
    let profile = match target {
        LaunchTarget::Saved(name) => find_profile(directory.store().profiles(), name)?.clone(),
        LaunchTarget::Quick(query) => quick_connect(query),
    };

    let swept = directory.launcher().sweep_stale_descriptors();
    if swept > 0 {
        tracing::debug!(swept, "Removed leftover RDP descriptors");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let status = runtime.block_on(async {
        let status = directory.launch_profile(&profile);
        if wait && directory.launcher().pending_cleanups() > 0 {
            eprintln!("Waiting for the RDP descriptor to be removed...");
            tokio::time::sleep(CLEANUP_DELAY + Duration::from_secs(1)).await;
        }
        status
    });

    match status {
        LaunchStatus::Launched => {
            println!("Launched '{}'", profile.name);
            Ok(())
        }
        LaunchStatus::Suppressed => {
            println!("'{}' was launched moments ago; skipped", profile.name);
            Ok(())
        }
        LaunchStatus::Failed => Err(CliError::LaunchFailed(collected_errors(
            &notifier,
            "Launch failed",
        ))),
    }
}

/// Runs the profile's connect command in the current terminal
#[derive(Default)]
struct TerminalOpener {
    registry: ProtocolRegistry,
}

impl SessionOpener for TerminalOpener {
    fn open(&mut self, profile: &Profile) -> Result<(), String> {
        let command = self
            .registry
            .connect_command(profile)
            .map_err(|e| e.to_string())?;
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| format!("No connect command for '{}'", profile.name))?;

        eprintln!("Executing: {command}");
        let status = Command::new(program)
            .args(parts)
            .status()
            .map_err(|e| format!("Failed to execute {program}: {e}"))?;
        if !status.success() {
            tracing::debug!(%status, program, "Session command exited with failure");
        }
        Ok(())
    }
}

// ========== Copy ==========

/// Where a copied payload ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Clipboard,
    Stdout,
}

/// Copies payloads to the system clipboard
///
/// Falls back to stdout when printing was requested or no clipboard is
/// available (headless sessions, missing display server).
#[derive(Clone, Default)]
struct TerminalClipboard {
    print: bool,
    delivered: Arc<Mutex<Option<Delivery>>>,
}

impl TerminalClipboard {
    fn new(print: bool) -> Self {
        Self {
            print,
            ..Self::default()
        }
    }

    fn delivered(&self) -> Option<Delivery> {
        *self
            .delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, delivery: Delivery) {
        *self
            .delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delivery);
    }
}

impl Clipboard for TerminalClipboard {
    fn write_text(&mut self, text: &str) {
        if !self.print {
            match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
                Ok(()) => {
                    self.record(Delivery::Clipboard);
                    return;
                }
                Err(e) => tracing::warn!(error = %e, "Clipboard unavailable, printing instead"),
            }
        }

        let mut stdout = io::stdout().lock();
        let written = stdout
            .write_all(text.as_bytes())
            .and_then(|()| {
                if text.ends_with('\n') {
                    Ok(())
                } else {
                    stdout.write_all(b"\n")
                }
            })
            .and_then(|()| stdout.flush());
        match written {
            Ok(()) => self.record(Delivery::Stdout),
            Err(e) => tracing::warn!(error = %e, "Failed to print clipboard payload"),
        }
    }
}

fn cmd_copy(
    config_dir: Option<&Path>,
    name: &str,
    descriptor: bool,
    print: bool,
) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let clipboard = TerminalClipboard::new(print);
    let mut directory =
        open_directory(config_dir, &notifier)?.with_clipboard(Box::new(clipboard.clone()));
    let profile = find_profile(directory.store().profiles(), name)?.clone();

    let copied = if descriptor {
        directory.copy_rdp_descriptor(&profile)
    } else {
        directory.copy_connect_command(&profile)
    };
    if !copied {
        return Err(CliError::Invalid(collected_errors(
            &notifier,
            "Nothing to copy",
        )));
    }

    match clipboard.delivered() {
        Some(Delivery::Clipboard) => {
            eprintln!("Copied to clipboard");
            Ok(())
        }
        Some(Delivery::Stdout) => Ok(()),
        None => Err(CliError::Io(io::Error::other(
            "Failed to write the clipboard payload",
        ))),
    }
}

// ========== Collapse ==========

fn cmd_collapse(config_dir: Option<&Path>, group: &str) -> Result<(), CliError> {
    let notifier = CollectingNotifier::new();
    let mut directory = open_directory(config_dir, &notifier)?;
    let id = find_group(directory.groups(), group)?.id.clone();

    match directory.toggle_group_collapse(&id) {
        Some(true) => println!("Collapsed '{group}'"),
        Some(false) => println!("Expanded '{group}'"),
        None => return Err(CliError::GroupNotFound(group.to_string())),
    }
    Ok(())
}

/// Finds a projected group by id, then by display name
fn find_group<'a>(groups: &'a [ProfileGroup], id_or_name: &str) -> Result<&'a ProfileGroup, CliError> {
    groups
        .iter()
        .find(|g| g.id == id_or_name)
        .or_else(|| {
            groups
                .iter()
                .find(|g| g.name.eq_ignore_ascii_case(id_or_name))
        })
        .ok_or_else(|| CliError::GroupNotFound(id_or_name.to_string()))
}

// ========== Settings ==========

fn cmd_settings(config_dir: Option<&Path>, subcmd: SettingsCommands) -> Result<(), CliError> {
    let manager = config_manager(config_dir)?;
    let settings = SettingsService::load(manager)
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;

    match subcmd {
        SettingsCommands::Show => {
            let json = serde_json::to_string_pretty(&settings.sidebar())
                .map_err(|e| CliError::Config(format!("Failed to serialize settings: {e}")))?;
            println!("{json}");
        }
        SettingsCommands::Set { key, value } => {
            settings
                .update(|cfg| cfg.set_field(&key, &value))
                .map_err(|e| CliError::Invalid(e.to_string()))?;
            settings
                .save_now()
                .map_err(|e| CliError::Config(format!("Failed to save settings: {e}")))?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn cmd_toggle(config_dir: Option<&Path>) -> Result<(), CliError> {
    let manager = config_manager(config_dir)?;
    let settings = SettingsService::load(manager)
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
    let visible = settings.toggle_sidebar();
    settings
        .save_now()
        .map_err(|e| CliError::Config(format!("Failed to save settings: {e}")))?;
    println!("Sidebar {}", if visible { "shown" } else { "hidden" });
    Ok(())
}

// ========== Lookup ==========

/// Finds a profile by exact name, identifier, case-insensitive name or
/// unique name prefix
pub fn find_profile<'a>(profiles: &'a [Profile], name_or_id: &str) -> Result<&'a Profile, CliError> {
    if let Some(profile) = profiles.iter().find(|p| p.name == name_or_id) {
        return Ok(profile);
    }
    if let Some(profile) = profiles
        .iter()
        .find(|p| p.id.as_deref() == Some(name_or_id))
    {
        return Ok(profile);
    }
    if let Some(profile) = profiles
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name_or_id))
    {
        return Ok(profile);
    }

    let prefix = name_or_id.to_lowercase();
    let matches: Vec<&Profile> = profiles
        .iter()
        .filter(|p| p.name.to_lowercase().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(CliError::ProfileNotFound(name_or_id.to_string())),
        1 => Ok(matches[0]),
        _ => {
            let names: Vec<_> = matches.iter().map(|p| p.name.as_str()).collect();
            Err(CliError::Invalid(format!(
                "Ambiguous profile name '{}'. Matches: {}",
                name_or_id,
                names.join(", ")
            )))
        }
    }
}

// ========== Errors ==========

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - profile not found or the session could not be started
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or a refused operation
    #[error("{0}")]
    Invalid(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Group not found in the current listing
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Launch failed
    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Returns the process exit code for this error
    ///
    /// Exit codes:
    /// - 1: General error (configuration, validation, IO)
    /// - 2: Connection failure (profile not found, launch failed)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::LaunchFailed(_) | Self::ProfileNotFound(_) => exit_codes::CONNECTION_FAILURE,
            Self::Config(_) | Self::Invalid(_) | Self::GroupNotFound(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
