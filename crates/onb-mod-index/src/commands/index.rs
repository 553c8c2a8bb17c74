use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{self, AppConfig};
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use onb_mod_index::{Error, HttpModSource, IndexReport, ModIndexer};

pub struct IndexModsArgs {
    pub config_path: Option<String>,
    pub output_dir: Option<String>,
}

pub fn index_mods(args: IndexModsArgs) -> Result<()> {
    let explicit_config = args.config_path.as_deref().map(Utf8Path::new);
    let (mut cfg, loaded_from) = config::load_config(explicit_config)?;
    if let Some(output_dir) = args.output_dir {
        cfg.output_dir = Utf8PathBuf::from(output_dir);
    }
    cfg.validate()?;
    tracing::debug!("Using configuration: {:?}", cfg);

    match &loaded_from {
        Some(path) => println_pad!(
            "{} {}",
            "⚙️  Config:".bright_blue().bold(),
            path.as_str().bright_white()
        ),
        None => println_pad!(
            "{} {}",
            "⚙️  Config:".bright_blue().bold(),
            "(defaults)".dimmed()
        ),
    }
    println_pad!(
        "{} {}",
        "🌐 Fetching mod list:".bright_blue().bold(),
        cfg.catalog_url.bright_cyan()
    );

    let source = HttpModSource::new(&cfg.catalog_url, &cfg.download_template, cfg.timeout())
        .map_err(CliError::http_client_setup)?;
    let report = ModIndexer::new(source, cfg.index_options())
        .run()
        .map_err(|e| map_index_error(e, &cfg))?;

    print_report(&report, &cfg);
    Ok(())
}

fn print_report(report: &IndexReport, cfg: &AppConfig) {
    println_pad!("\n{}", "📊 Summary:".bright_magenta().bold());
    println_pad!(
        "   {} {}",
        "Catalog entries:".bright_white(),
        report.total_entries.to_string().bold()
    );
    println_pad!(
        "   {} {}",
        "Cache hits:".bright_white(),
        report.cache_hits.to_string().bright_green()
    );
    println_pad!(
        "   {} {}",
        "Downloaded:".bright_white(),
        report.downloaded.to_string().bright_cyan()
    );
    if report.failed_downloads > 0 {
        println_pad!(
            "   {} {}",
            "Failed downloads:".bright_white(),
            report.failed_downloads.to_string().bright_red()
        );
    }
    if report.skipped_entries > 0 {
        println_pad!(
            "   {} {}",
            "Skipped entries:".bright_white(),
            report.skipped_entries.to_string().bright_yellow()
        );
    }

    if report.cache_written {
        println_pad!(
            "\n{} {}",
            "💾 Updated status cache:".bright_green(),
            cfg.cache_file.as_str().bright_white()
        );
    } else {
        println_pad!("\n{}", "✓ No new downloads required".bright_green());
    }

    println_pad!("\n{}", "📁 Files written:".bright_magenta().bold());
    for path in &report.files_written {
        println_pad!("   {} {}", "•".bright_cyan(), path.as_str().bright_white());
    }

    println_pad!("\n{}", "✅ Index complete!".bright_green().bold());
}

/// Map indexer errors to CliError for user-friendly error messages.
fn map_index_error(err: Error, cfg: &AppConfig) -> CliError {
    match err {
        Error::Http(_) | Error::CatalogStatus { .. } | Error::InvalidCatalog(_) => {
            CliError::CatalogUnavailable {
                url: cfg.catalog_url.clone(),
                source: err,
            }
        }
        Error::InvalidCacheFile { path, source } => CliError::CacheUnreadable {
            path: path.clone(),
            source: Error::InvalidCacheFile { path, source },
        },
        Error::CacheRead { path, source } => CliError::CacheUnreadable {
            path: path.clone(),
            source: Error::CacheRead { path, source },
        },
        other => CliError::OutputFailed { source: other },
    }
}
