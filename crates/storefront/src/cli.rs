//! Clap derive structures for the `storefront` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// storefront -- customer account and catalog client
#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    version,
    about = "Manage a storefront customer account from the command line",
    long_about = "Profile, address book, and catalog browsing against the storefront REST API.\n\n\
        Reads are cached per invocation; edits go through the same form\n\
        lifecycle the storefront UI uses.",
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
    /// API root including version prefix (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, env = "STOREFRONT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// View or edit the signed-in profile
    Profile(ProfileArgs),

    /// Manage saved delivery addresses
    #[command(alias = "addr")]
    Addresses(AddressesArgs),

    /// Browse the product catalog
    Products(ProductsArgs),

    /// Sign in with mobile number and one-time password
    Login(LoginArgs),

    /// Sign out and clear locally held account data
    Logout,

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the signed-in profile
    Show,

    /// Edit profile fields; unspecified fields keep their current value
    Edit {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
    },
}

// ── Addresses ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddressesArgs {
    #[command(subcommand)]
    pub command: AddressesCommand,
}

#[derive(Debug, Subcommand)]
pub enum AddressesCommand {
    /// List saved addresses
    #[command(alias = "ls")]
    List,

    /// Add a new address
    Add(AddressFields),

    /// Edit an existing address; unspecified fields keep their current value
    Edit {
        /// Address ID
        id: String,
        #[command(flatten)]
        fields: AddressFields,
    },

    /// Delete an address
    #[command(alias = "rm")]
    Delete {
        /// Address ID
        id: String,
    },

    /// Mark an address as the default
    SetDefault {
        /// Address ID
        id: String,
    },
}

#[derive(Debug, Default, Args)]
pub struct AddressFields {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub line1: Option<String>,
    #[arg(long)]
    pub line2: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub pincode: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products, optionally within a category and price range
    #[command(alias = "ls")]
    List {
        /// Category slug (`jewelry-set` spans several categories)
        #[arg(long, short = 'c')]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<u32>,

        #[arg(long)]
        max_price: Option<u32>,

        /// Free-text search
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Page number (ignored with --all)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Follow pagination until the last page
        #[arg(long)]
        all: bool,
    },
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Registered mobile number
    #[arg(long, short = 'm')]
    pub mobile: String,

    /// One-time password
    #[arg(long, env = "STOREFRONT_OTP", hide_env_values = true)]
    pub otp: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file + environment)
    Show,

    /// Print the config file path
    Path,
}
