mod config;
mod demo;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::Client;
use protocol::Value;
use registry::Registry;
use tracing::debug;

use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "capstan")]
#[command(about = "Expose versioned capabilities and call them by name", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a capstan.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every capability the registry describes
    Describe,
    /// Show every stored version of a capability
    Versions {
        /// Capability name
        name: String,
    },
    /// Call a capability through the client
    Call {
        /// Capability name
        api: String,
        /// Module member to call
        #[arg(short, long)]
        member: Option<String>,
        /// Version range (defaults to the client's configured range)
        #[arg(short, long)]
        range: Option<String>,
        /// Arguments, parsed as JSON and falling back to plain strings
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let registry = Arc::new(Registry::with_config(config.registry()?)?);
    demo::install(&registry)?;
    debug!("registry ready: {:?}", registry);
    let client = Client::connect(registry.clone(), config.client.clone()).await?;

    match cli.command {
        Some(Commands::Describe) | None => cmd_describe(&client),
        Some(Commands::Versions { name }) => cmd_versions(&registry, &name),
        Some(Commands::Call {
            api,
            member,
            range,
            args,
        }) => cmd_call(&client, &api, member.as_deref(), range.as_deref(), &args).await,
    }
}

fn cmd_describe(client: &Client) -> Result<()> {
    let apis = client.apis();

    if apis.is_empty() {
        println!("No capabilities registered.");
        return Ok(());
    }

    println!("{:<20}  {:<10}  {:<10}  MEMBERS", "NAME", "KIND", "VERSION");
    println!("{}", "-".repeat(64));

    for descriptor in apis.descriptors() {
        let members = descriptor
            .member_names
            .as_deref()
            .map(|names| names.join(", "))
            .unwrap_or_default();
        println!(
            "{:<20}  {:<10}  {:<10}  {members}",
            descriptor.name,
            descriptor.kind.to_string(),
            descriptor.version
        );
    }

    Ok(())
}

fn cmd_versions(registry: &Registry, name: &str) -> Result<()> {
    let versions = registry.versions(name);
    if versions.is_empty() {
        return Err(registry::Error::UnknownCapability(name.to_string()).into());
    }

    for version in versions {
        println!("{version}");
    }
    Ok(())
}

async fn cmd_call(
    client: &Client,
    api: &str,
    member: Option<&str>,
    range: Option<&str>,
    args: &[String],
) -> Result<()> {
    let args = args.iter().map(|arg| parse_arg(arg)).collect();

    let values = match (range, member) {
        (Some(range), Some(member)) => client.call_method(api, range, member, args).await?,
        (Some(range), None) => client.call(api, range, args).await?,
        (None, member) => {
            let apis = client.apis();
            let method = match member {
                Some(member) => apis.method(api, member)?,
                None => apis.callable(api)?,
            };
            method.call(args).await?
        }
    };

    for value in values {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}
