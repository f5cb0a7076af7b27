//! CLI argument definitions for Strata.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "strata",
    version,
    about = "Resolve scoped module dependencies",
    long_about = "Strata resolves the dependencies declared in Strata.toml against a local \
                  module repository, per scope, and explains the result."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fail on the first unreachable module or artifact
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the dependency tree
    Tree {
        /// Target scopes (repeatable); all declared scopes when omitted
        #[arg(short, long = "scope")]
        scopes: Vec<String>,
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List the resolved files
    Files {
        /// Target scopes (repeatable); all declared scopes when omitted
        #[arg(short, long = "scope")]
        scopes: Vec<String>,
        /// Print a single path list joined with the platform separator
        #[arg(long)]
        classpath: bool,
    },

    /// Explain why a module is included
    Why {
        /// Module as `group:name`
        module: String,
        /// Target scopes (repeatable); all declared scopes when omitted
        #[arg(short, long = "scope")]
        scopes: Vec<String>,
    },

    /// Print the resolved version of every module
    Versions {
        /// Target scopes (repeatable); all declared scopes when omitted
        #[arg(short, long = "scope")]
        scopes: Vec<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version conflicts
    Conflicts {
        /// Target scopes (repeatable); all declared scopes when omitted
        #[arg(short, long = "scope")]
        scopes: Vec<String>,
    },
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_scopes_and_globals() {
        let cli = Cli::try_parse_from(["strata", "tree", "-s", "compile", "--scope", "test", "--depth", "2", "--strict"]).unwrap();
        assert!(cli.strict);
        match cli.command {
            Command::Tree { scopes, depth } => {
                assert_eq!(scopes, ["compile", "test"]);
                assert_eq!(depth, Some(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn why_requires_module() {
        assert!(Cli::try_parse_from(["strata", "why"]).is_err());
    }
}
