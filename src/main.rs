use gud::branch;
use gud::cat_file;
use gud::checkout::{self, Outcome, Target};
use gud::commit;
use gud::hash::hash_to_hex;
use gud::index::Index;
use gud::log;
use gud::repository::Repository;
use gud::restore;
use gud::stage;
use gud::status;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gud")]
#[command(about = "A local, single-user version control tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise a repository
    Init {
        path: Option<PathBuf>,
    },
    /// Add or remove files to or from the staging area
    Stage {
        #[command(subcommand)]
        action: StageAction,
    },
    /// Show staged and unstaged changes
    Status,
    /// Commit staged files to the repository's history
    Commit {
        #[arg(short = 'm')]
        message: String,
    },
    /// Show history from the effective HEAD, newest first
    Log,
    /// Check out a branch's head or an arbitrary commit
    Checkout {
        /// Branch whose head to check out
        #[arg(long, conflicts_with = "hash")]
        branch: Option<String>,

        /// Commit hash (or unique prefix) to check out
        #[arg(long)]
        hash: Option<String>,
    },
    /// Create, rename, delete or list branches
    Branch {
        /// Name of branch to create (omit to list branches)
        name: Option<String>,

        /// Delete branch
        #[arg(short = 'd', long, conflicts_with_all = ["name", "rename"])]
        delete: Option<String>,

        /// Rename: gud branch -m old new
        #[arg(short = 'm', long = "rename", num_args = 2, conflicts_with = "delete")]
        rename: Vec<String>,
    },
    /// Overwrite files from their committed versions
    Restore {
        paths: Vec<PathBuf>,
    },
    /// Print an object's payload by hash or unique prefix
    CatFile {
        object: String,
    },
}

#[derive(Subcommand)]
enum StageAction {
    /// Add files to the staging area
    Add { paths: Vec<PathBuf> },
    /// Remove files from the staging area
    Remove { paths: Vec<PathBuf> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&path)?;
            let repo = Repository::init(&path)?;
            println!("Initialised empty gud repository in {}", repo.admin.display());
        }

        Commands::Stage { action } => {
            let repo = Repository::discover()?;
            match action {
                StageAction::Add { paths } => {
                    let changed = stage::add(&repo, &paths)?;
                    println!("Staged {changed} path(s)");
                }
                StageAction::Remove { paths } => {
                    let changed = stage::remove(&repo, &paths)?;
                    println!("Unstaged {changed} path(s)");
                }
            }
        }

        Commands::Status => {
            let repo = Repository::discover()?;
            let index = Index::load(&repo.index_path())?;
            let current = status::collect(&repo, &index)?;
            if current.is_clean() {
                println!("nothing to commit, working tree clean");
            } else {
                print!("{}", status::render(&current));
            }
        }

        Commands::Commit { message } => {
            let repo = Repository::discover()?;
            let hash = commit::commit(&repo, &message)?;
            println!("Created commit {}", hash_to_hex(&hash));
        }

        Commands::Log => {
            let repo = Repository::discover()?;
            let commits = log::history(&repo)?;
            print!("{}", log::render(&commits));
        }

        Commands::Checkout { branch, hash } => {
            let repo = Repository::discover()?;
            let target = match (branch, hash) {
                (Some(branch), None) => Target::Branch(branch),
                (None, Some(hash)) => Target::Revision(hash),
                _ => anyhow::bail!("checkout needs exactly one of --branch or --hash"),
            };
            match checkout::checkout(&repo, &target)? {
                Outcome::Attached { branch, .. } => println!("switched to branch {branch}"),
                Outcome::Detached { hash } => {
                    println!("checked out at {} (detached)", hash_to_hex(&hash));
                }
            }
        }

        Commands::Branch { name, delete, rename } => {
            let repo = Repository::discover()?;
            if let Some(name) = delete {
                branch::delete(&repo, &name)?;
                println!("deleted branch '{name}'");
            } else if rename.len() == 2 {
                branch::rename(&repo, &rename[0], &rename[1])?;
                println!("renamed branch '{}' to '{}'", rename[0], rename[1]);
            } else if let Some(name) = name {
                branch::create(&repo, &name)?;
                println!("created branch '{name}'");
            } else {
                let branches = branch::list(&repo)?;
                print!("{}", branch::render(&branches));
            }
        }

        Commands::Restore { paths } => {
            let repo = Repository::discover()?;
            let restored = restore::restore(&repo, &paths)?;
            println!("Restored {restored} file(s)");
        }

        Commands::CatFile { object } => {
            let repo = Repository::discover()?;
            let (_kind, payload) = cat_file::cat_file(&repo, &object)?;
            std::io::stdout().lock().write_all(&payload)?;
        }
    }

    Ok(())
}
