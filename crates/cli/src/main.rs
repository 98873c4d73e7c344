use agent_core::agent::{self, Agent};
use agent_core::config;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let registry = agent::build_registry(&cfg);
    let agent = Agent::new(&cfg, &registry).await?;

    match cli.command {
        Commands::Index => {
            let indexed = agent.reindex().await?;
            println!("indexed {indexed} new files");
        }
        Commands::Ask { query, json } => match agent.ask(&query).await {
            Ok(outcome) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    println!("{}", outcome.summary);
                    for path in &outcome.touched_paths {
                        println!("  {path}");
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "request failed");
                println!("Error processing request");
            }
        },
        Commands::Recommend { text, json } => match agent.recommend(&text).await {
            Ok(recommendation) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&recommendation)?);
                } else {
                    println!("{}", recommendation.output);
                    for path in &recommendation.file_paths {
                        println!("  {path}");
                    }
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "request failed");
                println!("Error processing request");
            }
        },
        Commands::Search { query, json } => {
            let hits = agent.ops.search(&query).await?;
            if json {
                let paths: Vec<String> =
                    hits.iter().map(|p| p.to_string_lossy().into_owned()).collect();
                println!("{}", serde_json::to_string_pretty(&paths)?);
            } else {
                for hit in &hits {
                    println!("{}", hit.display());
                }
            }
        }
        Commands::Tree { dir, json } => {
            let tree = agent.ops.one_level_tree(&dir).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                println!("{}/", tree.name);
                for file in &tree.root_files {
                    println!("  {file}");
                }
                for folder in &tree.folders {
                    println!("  {}/", folder.name);
                    for file in &folder.files {
                        println!("    {file}");
                    }
                    for sub in &folder.folders {
                        println!("    {sub}/");
                    }
                }
            }
        }
        Commands::History { limit, json } => {
            let records = agent.history.recent(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("[{}] {}", record.created_at, record.description);
                    for path in &record.file_paths {
                        println!("  {path}");
                    }
                }
            }
        }
        Commands::Log { limit } => {
            let entries = agent.audit.entries()?;
            let skip = entries.len().saturating_sub(limit);
            for entry in entries.iter().skip(skip) {
                match &entry.target {
                    Some(target) => {
                        println!("{} {} -> {}", entry.timestamp, entry.operation, target)
                    }
                    None => println!("{} {}", entry.timestamp, entry.operation),
                }
            }
        }
        Commands::Fs { command } => run_fs(&agent, command).await?,
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "sandbox-agent")]
#[command(about = "AI-assisted sandbox file agent", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index new files under the sandbox root
    Index,
    /// Retrieve matching files and run the requested action on them
    Ask {
        /// Natural-language request
        query: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Recommend files for text extracted from the current screen
    Recommend {
        /// Extracted screen text
        text: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive filename search across the sandbox
    Search {
        query: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// One-level directory tree
    Tree {
        /// Directory relative to the sandbox root
        #[arg(default_value = "")]
        dir: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Recent agent history, newest first
    History {
        /// Number of records
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: i64,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Tail of the operations audit log
    Log {
        /// Number of entries
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
    /// Direct guarded file operations
    Fs {
        #[command(subcommand)]
        command: FsCommands,
    },
}

#[derive(Subcommand)]
enum FsCommands {
    /// Write content to a file (parents created as needed)
    Write { path: String, content: String },
    /// Print a file's content
    Read { path: String },
    /// List a directory's entries
    Ls { path: String },
    /// Delete a file and its index record
    Rm { path: String },
    /// Rename or move a file
    Mv { old: String, new: String },
    /// Create a directory tree
    Mkdir { path: String },
    /// Copy a file or directory tree
    Cp { src: String, dest: String },
    /// Show size and timestamps
    Stat { path: String },
    /// Open with the host's default application
    Open { path: String },
}

async fn run_fs(agent: &Agent, command: FsCommands) -> Result<()> {
    match command {
        FsCommands::Write { path, content } => {
            let file = agent.ops.write(&path, &content).await?;
            println!("wrote {}", file.display());
        }
        FsCommands::Read { path } => {
            print!("{}", agent.ops.read(&path).await?);
        }
        FsCommands::Ls { path } => {
            for entry in agent.ops.list(&path).await? {
                println!("{entry}");
            }
        }
        FsCommands::Rm { path } => {
            agent.ops.delete(&path).await?;
            println!("deleted {path}");
        }
        FsCommands::Mv { old, new } => {
            let to = agent.ops.rename(&old, &new).await?;
            println!("moved to {}", to.display());
        }
        FsCommands::Mkdir { path } => {
            let dir = agent.ops.mkdir(&path).await?;
            println!("created {}", dir.display());
        }
        FsCommands::Cp { src, dest } => {
            let to = agent.ops.copy(&src, &dest).await?;
            println!("copied to {}", to.display());
        }
        FsCommands::Stat { path } => {
            let props = agent.ops.properties(&path).await?;
            println!("{}", serde_json::to_string_pretty(&props)?);
        }
        FsCommands::Open { path } => {
            let target = agent.ops.open_with_default_app(&path).await?;
            println!("opened {}", target.display());
        }
    }
    Ok(())
}
