use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hub-defaults",
    about = "Inspect and edit namespaced preference stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the persistent domains
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Application domain of the standard store
    #[arg(long, global = true)]
    pub app: Option<String>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a key's value, or every visible value of a namespace
    Read(ReadArgs),
    /// Store a value under a key
    Write(WriteArgs),
    /// Remove a key, or a namespace's whole domain
    Delete(DeleteArgs),
    /// List persistent domains
    Domains,
    /// Print the hex digest of a string
    Digest(DigestArgs),
}

#[derive(Args)]
pub struct ReadArgs {
    pub namespace: String,
    pub key: Option<String>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[arg(long = "type", value_enum, default_value = "string")]
    pub kind: ValueKind,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Double,
    Bool,
    /// RFC 3339 timestamp
    Date,
    /// Hex-encoded bytes
    Data,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub namespace: String,
    pub key: Option<String>,
}

#[derive(Args)]
pub struct DigestArgs {
    pub text: String,
    #[arg(long)]
    pub sha1: bool,
    #[arg(long)]
    pub lowercase: bool,
}
