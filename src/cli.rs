//! CLI argument definitions using clap
//!
//! Commands:
//! - locale-vault create <key> [--file <path>]
//! - locale-vault read <key>
//! - locale-vault update <key> [--file <path>]
//! - locale-vault delete <key>
//! - locale-vault revisions <key> [--tree latest|archive|trash]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::storage::Tree;

/// locale-vault - versioned App/Module/Language document storage
#[derive(Parser, Debug)]
#[command(name = "locale-vault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (extension optional; missing file means defaults)
    #[arg(long, global = true, default_value = "config")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a payload as the next revision of a unit
    Create {
        /// Unit key: app, app/module or app/module/language
        key: String,
        /// Payload file; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the latest revision of a unit
    Read { key: String },

    /// Archive the latest revision and store a new payload
    Update {
        key: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Move the latest revision to the trash
    Delete { key: String },

    /// List the revisions of a unit in one tree.
    ///
    /// Archive and Trash can keep several relocations of one revision; those
    /// print as `<revision>_<generation>` after the plain `<revision>`.
    Revisions {
        key: String,
        #[arg(long, value_enum, default_value_t = TreeArg::Latest)]
        tree: TreeArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeArg {
    Latest,
    Archive,
    Trash,
}

impl From<TreeArg> for Tree {
    fn from(arg: TreeArg) -> Self {
        match arg {
            TreeArg::Latest => Tree::Latest,
            TreeArg::Archive => Tree::Archive,
            TreeArg::Trash => Tree::Trash,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_with_file() {
        let cli = Cli::try_parse_from(["locale-vault", "create", "demo/home", "--file", "en.json"])
            .unwrap();
        assert_eq!(cli.config, "config");
        match cli.command {
            Command::Create { key, file } => {
                assert_eq!(key, "demo/home");
                assert_eq!(file, Some(PathBuf::from("en.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn revisions_tree_defaults_to_latest() {
        let cli = Cli::try_parse_from(["locale-vault", "revisions", "demo", "--config", "alt"]).unwrap();
        assert_eq!(cli.config, "alt");
        match cli.command {
            Command::Revisions { tree, .. } => assert_eq!(Tree::from(tree), Tree::Latest),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
