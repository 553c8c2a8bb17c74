use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser};
use commands::{index_mods, IndexModsArgs};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

/// Fetch the ONB mod list, hash new or changed archives and write per-type
/// catalogs and hash listings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path to the configuration file (defaults to onb-mod-index.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// The directory to write per-type catalogs and hash listings to
    #[arg(short, long)]
    output_dir: Option<String>,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging();

    index_mods(IndexModsArgs {
        config_path: args.config,
        output_dir: args.output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["onb-mod-index"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "onb-mod-index",
            "--config",
            "ci.toml",
            "-o",
            "public",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("ci.toml"));
        assert_eq!(args.output_dir.as_deref(), Some("public"));
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }
}
