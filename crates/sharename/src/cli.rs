//! Clap derive structures for the `sharename` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sharename_api::Role;
use sharename_api::models::{ConsentStatus, Visibility};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sharename -- share contact details with expiring codes
#[derive(Debug, Parser)]
#[command(
    name = "sharename",
    version,
    about = "Share contact details from the command line",
    long_about = "Command-line client for the sharename contact-sharing platform.\n\n\
        Manage contexts, issue and redeem share codes, and answer consent\n\
        requests against a sharename backend.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SHARENAME_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "SHARENAME_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SHARENAME_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SHARENAME_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SHARENAME_TIMEOUT", global = true)]
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
    /// YAML
    Yaml,
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

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Individual,
    Company,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Individual => Self::Individual,
            RoleArg::Company => Self::Company,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VisibilityArg {
    /// Anyone can view it from your public profile
    Public,
    /// Readable with a share code
    Code,
    /// Share code plus your approval
    Consent,
}

impl From<VisibilityArg> for Visibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::Public => Self::Public,
            VisibilityArg::Code => Self::Code,
            VisibilityArg::Consent => Self::Consent,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Denied,
}

impl From<StatusArg> for ConsentStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Approved => Self::Approved,
            StatusArg::Denied => Self::Denied,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login(LoginArgs),

    /// Create an account
    Signup(SignupArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Manage your contexts (named sets of contact details)
    #[command(alias = "ctx")]
    Contexts(ContextsArgs),

    /// Issue and redeem share codes
    Codes(CodesArgs),

    /// View who redeemed what
    #[command(alias = "red")]
    Redemptions(RedemptionsArgs),

    /// Answer and send consent requests
    Consent(ConsentArgs),

    /// View and acknowledge notifications
    #[command(alias = "notif")]
    Notifications(NotificationsArgs),

    /// View and edit profile details
    Profile(ProfileArgs),

    /// Search for people and companies
    Search {
        /// Name or email fragment
        query: String,
    },

    /// Overview of everything relevant to your role
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// Screen-like location used by the session guard.
    pub fn location(&self) -> &'static str {
        match self {
            Self::Login(_) => "/login",
            Self::Signup(_) => "/signup",
            Self::Logout | Self::Whoami | Self::Refresh => "/account",
            Self::Contexts(_) => "/contexts",
            Self::Codes(_) => "/codes",
            Self::Redemptions(_) => "/redemptions",
            Self::Consent(_) => "/consent",
            Self::Notifications(_) => "/notifications",
            Self::Profile(_) => "/profile",
            Self::Search { .. } => "/search",
            Self::Dashboard(_) => "/dashboard",
            Self::Config(_) => "/config",
            Self::Completions(_) => "/completions",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "SHARENAME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "SHARENAME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Account type
    #[arg(long, short = 'r', default_value = "individual")]
    pub role: RoleArg,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTEXTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ContextsArgs {
    #[command(subcommand)]
    pub command: ContextsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ContextsCommand {
    /// List contexts
    #[command(alias = "ls")]
    List {
        /// Show archived contexts instead of active ones
        #[arg(long)]
        archived: bool,
    },

    /// Show one context
    Get { id: i64 },

    /// Create a context
    Create {
        /// Label, e.g. "Work" or "Dating"
        label: String,

        #[command(flatten)]
        fields: ContextFields,
    },

    /// Change a context; only the given fields are sent
    Update {
        id: i64,

        #[arg(long)]
        label: Option<String>,

        #[command(flatten)]
        fields: ContextFields,
    },

    /// Delete a context
    #[command(alias = "rm")]
    Delete {
        id: i64,

        /// Delete from the archive
        #[arg(long)]
        archived: bool,
    },

    /// Archive contexts whose codes have all expired
    CheckExpired,
}

#[derive(Debug, Args)]
pub struct ContextFields {
    #[arg(long)]
    pub visibility: Option<VisibilityArg>,

    /// Given name shown to redeemers
    #[arg(long)]
    pub given: Option<String>,

    /// Family name shown to redeemers
    #[arg(long)]
    pub family: Option<String>,

    /// Notify when someone redeems this context
    #[arg(long)]
    pub notify_on_redeem: Option<bool>,

    /// Archive automatically once all codes expire
    #[arg(long)]
    pub auto_archive: Option<bool>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CODES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CodesArgs {
    #[command(subcommand)]
    pub command: CodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CodesCommand {
    /// Issue a share code for a context
    Create {
        context_id: i64,

        /// Also print the code as a QR code (table output only)
        #[arg(long)]
        qr: bool,

        /// Write the QR code to a file; `.svg` saves SVG, anything else PNG
        #[arg(long, value_name = "PATH")]
        save_qr: Option<PathBuf>,
    },

    /// Redeem a share code
    Redeem { code: String },

    /// Redeem a public context by id
    RedeemId { context_id: i64 },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REDEMPTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RedemptionsArgs {
    #[command(subcommand)]
    pub command: RedemptionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RedemptionsCommand {
    /// Redemptions of your contexts
    #[command(alias = "ls")]
    List,

    /// Contexts your company has redeemed
    Company,

    /// Remove a redeemed context from your company's list
    Delete { id: i64 },

    /// Revoke a redeemer's access to your context
    Revoke { audit_id: i64 },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONSENT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConsentArgs {
    #[command(subcommand)]
    pub command: ConsentCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConsentCommand {
    /// Requests for your contexts
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<StatusArg>,
    },

    /// Show one request
    Get { id: i64 },

    /// Approve a request
    Approve { id: i64 },

    /// Deny a request
    Deny { id: i64 },

    /// Ask a context owner for access
    Request {
        context_id: i64,

        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Ask for access to a consent-gated share code
    RequestCode {
        code: String,

        #[arg(long, short = 'm')]
        message: Option<String>,
    },

    /// Your company's requests still waiting on an answer
    Pending,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTIFICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    #[command(alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read { id: i64 },

    /// Mark every unread notification as read
    ReadAll,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Your account summary
    Show,

    /// Someone's public profile
    Public { user_id: i64 },

    /// Your personal details
    Personal,

    /// Update personal details
    SetPersonal(PersonalFields),

    /// Your company details
    Company,

    /// Update company details
    SetCompany(CompanyFields),
}

#[derive(Debug, Args)]
pub struct PersonalFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    /// List your public contexts on a public profile page
    #[arg(long)]
    pub public: Option<bool>,
    /// Upload a profile picture (PNG, JPEG, GIF, or WebP)
    #[arg(long, value_name = "PATH")]
    pub picture: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompanyFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub founded: Option<i32>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Archive expired contexts before loading
    #[arg(long)]
    pub check_expired: bool,
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

    /// Set a value on the active profile
    Set {
        /// Profile key: api_url, timeout, insecure, ca_cert, session_file
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
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
