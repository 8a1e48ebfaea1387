//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Synchronize PostgreSQL roles and privileges from a directory
///
/// Without --real, changes are only logged. With --real, every change is
/// written to stdout as an SQL script ready for psql.
///
/// Examples:
///   rolesync --state instance.yml                 # Plan from ./rolesync.yml
///   rolesync -c sync.yml --state instance.yml --directory ldap.yml
///   rolesync --state instance.yml --real | psql   # Apply
///   rolesync --state instance.yml --check         # Exit 1 on pending changes
#[derive(Parser, Debug)]
#[command(name = "rolesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: search ./, ~/.config/ and /etc/)
    #[arg(short, long, env = "ROLESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// YAML snapshot of the instance roles, schemas and grants
    #[arg(short, long, env = "ROLESYNC_STATE")]
    pub state: PathBuf,

    /// YAML list of directory entries to query
    #[arg(short, long, env = "ROLESYNC_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Write changes as SQL instead of only logging them
    #[arg(short = 'R', long)]
    pub real: bool,

    /// Exit with status 1 when changes are pending
    #[arg(short = 'C', long)]
    pub check: bool,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
