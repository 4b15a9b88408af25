use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::warn;

use flowtrace::config::{Config, FileConfig};
use flowtrace::render::{self, App, ColorCache, Schema, ViewKind};

/// Reconstruct TCP/UDP flows from a capture and draw their timing.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Capture file (pcap or pcapng)
    pcap: Option<PathBuf>,

    /// TOML file providing pcap_path, client_ip, display_filter and view
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address of the local host; its side of every flow is the client
    #[arg(long)]
    client_ip: Option<String>,

    /// Extra BPF expression combined with the client ip filter
    #[arg(short, long)]
    filter: Option<String>,

    #[arg(long, value_enum)]
    view: Option<ViewKind>,

    /// Write the flow table as JSON
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print a plain listing instead of opening the interactive view
    #[arg(long)]
    no_tui: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let from_cli = FileConfig {
        pcap_path: cli.pcap,
        client_ip: cli.client_ip,
        display_filter: cli.filter,
        view: cli.view,
    };
    let from_file = match &cli.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FileConfig::default(),
    };
    let config = Config::resolve(from_cli.or(from_file))?;

    let (table, stats) = flowtrace::load_flows(&config)
        .with_context(|| format!("reading {}", config.pcap_path.display()))?;

    if let Some(path) = &cli.export {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        flowtrace::export::write_json(&table, &stats, BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if table.is_empty() {
        warn!("no flows matched `{}`", config.capture_filter());
        return Ok(());
    }

    if cli.no_tui {
        flowtrace::export::write_text(&table, io::stdout().lock())?;
        return Ok(());
    }

    let mut colors = ColorCache::new();
    let schema = Schema::build(&table, &mut colors, config.title())?;
    render::run(App::new(schema, colors, config.view, stats))?;

    Ok(())
}
