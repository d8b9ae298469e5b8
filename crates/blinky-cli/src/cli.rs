//! Clap derive structures for the `blinky` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// blinky -- fleet controller for Blinky LED strips
#[derive(Debug, Parser)]
#[command(
    name = "blinky",
    version,
    about = "Manage a fleet of Blinky LED strips from the command line",
    long_about = "A CLI for administering Blinky LED strip fleets.\n\n\
        Strips poll a shared sync store for their desired configuration;\n\
        this tool edits that store, tracks device checkins, and manages\n\
        firmware images and the audit log.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Fleet profile to use
    #[arg(long, short = 'p', env = "BLINKY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Sync store root URL (overrides profile)
    #[arg(long, short = 'd', env = "BLINKY_DATABASE", global = true)]
    pub database: Option<String>,

    /// Blob store root URL for firmware binaries (overrides profile)
    #[arg(long, env = "BLINKY_BLOB", global = true)]
    pub blob: Option<String>,

    /// Store auth token
    #[arg(long, env = "BLINKY_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Actor name recorded in audit log entries
    #[arg(long, env = "BLINKY_ACTOR", global = true)]
    pub actor: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BLINKY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BLINKY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BLINKY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage LED strips and their desired configuration
    #[command(alias = "s")]
    Strips(StripsArgs),

    /// Fleet-wide operations
    Fleet(FleetArgs),

    /// Manage firmware images
    #[command(alias = "fw")]
    Firmware(FirmwareArgs),

    /// View and append to the audit log
    Log(LogArgs),

    /// Speak a strip description (shorthand for the Describe intent)
    Describe {
        /// Strip name or id
        device: String,
    },

    /// Execute a voice intent and print the spoken response
    Intent(IntentArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STRIPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StripsArgs {
    #[command(subcommand)]
    pub command: StripsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StripsCommand {
    /// List strips with their sync status
    #[command(alias = "ls")]
    List {
        /// Only show strips in this group
        #[arg(long, short = 'g')]
        group: Option<String>,
    },

    /// Show one strip in detail
    Show {
        /// Strip id or name
        strip: String,
    },

    /// Edit one field of the desired configuration
    ///
    /// The selector may be a strip id, a strip name, or a group name;
    /// group selectors fan the edit out to every member.
    Set(SetArgs),

    /// Turn a strip or group on
    Enable {
        /// Strip id, name, or group name
        selector: String,
    },

    /// Turn a strip or group off
    Disable {
        /// Strip id, name, or group name
        selector: String,
    },

    /// Delete a strip's config and checkin records
    #[command(alias = "rm")]
    Delete {
        /// Strip id or name
        strip: String,
    },
}

/// Exactly one field flag per invocation. Edits are read-modify-write
/// against the whole record, so untouched fields survive.
#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("field").required(true).multiple(false)))]
pub struct SetArgs {
    /// Strip id, name, or group name
    pub selector: String,

    /// Animation mode
    #[arg(long, group = "field")]
    pub mode: Option<String>,

    /// Enable or disable the strip
    #[arg(long, group = "field", action = clap::ArgAction::Set)]
    pub enabled: Option<bool>,

    /// Animation speed (0-200)
    #[arg(long, group = "field", value_parser = clap::value_parser!(u16).range(0..=200))]
    pub speed: Option<u16>,

    /// Brightness (0-255)
    #[arg(long, group = "field")]
    pub brightness: Option<u8>,

    /// Color-change rate (0-100)
    #[arg(long, group = "field", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub color_change: Option<u8>,

    /// Number of pixels on the strip
    #[arg(long, group = "field")]
    pub num_pixels: Option<u16>,

    /// Red channel (0-255)
    #[arg(long, group = "field")]
    pub red: Option<u8>,

    /// Green channel (0-255)
    #[arg(long, group = "field")]
    pub green: Option<u8>,

    /// Blue channel (0-255)
    #[arg(long, group = "field")]
    pub blue: Option<u8>,

    /// Color, as a name ("red") or an "R,G,B" triple
    #[arg(long, group = "field")]
    pub rgb: Option<String>,

    /// Display name
    #[arg(long, group = "field")]
    pub name: Option<String>,

    /// Group label (empty string ungroups)
    #[arg(long, group = "field")]
    pub group: Option<String>,

    /// Firmware version tag ("current" means stay put)
    #[arg(long, group = "field")]
    pub firmware: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FLEET
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FleetArgs {
    #[command(subcommand)]
    pub command: FleetCommand,
}

#[derive(Debug, Subcommand)]
pub enum FleetCommand {
    /// Flip the global switch on, then enable every strip
    EnableAll,

    /// Flip the global switch off, then disable every strip
    DisableAll,

    /// Fleet summary: global switch, strip counts, sync status
    Status,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FIRMWARE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    #[command(subcommand)]
    pub command: FirmwareCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirmwareCommand {
    /// List uploaded firmware versions
    #[command(alias = "ls")]
    List,

    /// Validate and upload a firmware binary
    Upload {
        /// Path to the firmware binary
        file: PathBuf,

        /// Filename to record (defaults to the file's basename)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a firmware version's metadata (the blob stays behind)
    Delete {
        /// Firmware version string
        #[arg(id = "fw_version", value_name = "VERSION")]
        version: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Show the most recent audit log entries
    Tail {
        /// Number of entries to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Append a free-form entry to the audit log
    Add {
        /// Entry text
        text: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTENT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IntentArgs {
    /// Intent name (e.g. "Set mode", "List devices")
    #[arg(required_unless_present = "from_file")]
    pub name: Option<String>,

    /// Slot values, as key=value pairs
    #[arg(long, short = 's', value_name = "KEY=VALUE")]
    pub slot: Vec<String>,

    /// Read a full intent request from a JSON file
    #[arg(long, short = 'F', conflicts_with_all = &["name", "slot"])]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (database, blob, actor, auth_token_env, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an auth token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
