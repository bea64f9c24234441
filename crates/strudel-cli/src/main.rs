//! strudel-json CLI
//!
//! Scans a folder of sample folders and writes `strudel.json`, either
//! once or continuously in watch mode.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use strudel_core::UrlOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "strudel-json")]
#[command(author = "strudel-json Contributors")]
#[command(version)]
#[command(about = "Generate strudel.json files for audio sample libraries", long_about = None)]
struct Cli {
    /// Path to the local root directory to scan
    #[arg(short, long)]
    path: PathBuf,

    /// Full base URL for samples (alternative to username/repo)
    #[arg(long)]
    base_url: Option<String>,

    /// Your GitHub username
    #[arg(short, long)]
    username: Option<String>,

    /// Your GitHub repository name
    #[arg(short, long)]
    repo: Option<String>,

    /// Your GitHub repository branch name
    #[arg(short, long, default_value = strudel_core::DEFAULT_BRANCH)]
    branch: String,

    /// Watch mode: automatically regenerate on file changes
    #[arg(short, long)]
    watch: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn url_options(&self) -> UrlOptions {
        UrlOptions {
            base_url: self.base_url.clone(),
            github_user: self.username.clone(),
            github_repo: self.repo.clone(),
            github_branch: Some(self.branch.clone()),
        }
    }

    /// The scan root as an absolute path, without resolving symlinks.
    fn root(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let url = cli.url_options();

    // Usage error: report before doing any work
    if let Err(e) = url.resolve() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }

    let root = cli.root();
    let result = if cli.watch {
        commands::watch(&root, &url).await
    } else {
        commands::generate(&root, &url).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_github_options() {
        let cli = Cli::parse_from(["strudel-json", "-p", "samples", "-u", "alice", "-r", "kit"]);
        assert!(!cli.watch);
        assert_eq!(
            cli.url_options().resolve().unwrap().base_url(),
            "https://raw.githubusercontent.com/alice/kit/main/"
        );
    }

    #[test]
    fn test_base_url_and_watch() {
        let cli = Cli::parse_from([
            "strudel-json",
            "--path",
            "samples",
            "--base-url",
            "https://example.com/samples",
            "--watch",
        ]);
        assert!(cli.watch);
        assert_eq!(
            cli.url_options().resolve().unwrap().base_url(),
            "https://example.com/samples/"
        );
    }

    #[test]
    fn test_missing_url_source_is_rejected() {
        let cli = Cli::parse_from(["strudel-json", "-p", "samples", "-u", "alice"]);
        assert!(cli.url_options().resolve().is_err());
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["strudel-json", "--base-url", "x"]).is_err());
    }

    #[test]
    fn test_root_is_absolute() {
        let cli = Cli::parse_from(["strudel-json", "-p", "samples", "--base-url", "x"]);
        assert!(cli.root().is_absolute());
        assert!(cli.root().ends_with("samples"));
    }
}
