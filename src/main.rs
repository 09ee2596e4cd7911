use std::process;
use std::time::Instant;

use anyhow::Context;
use serde_json::Value;

use hmst_convert::cli::{Cli, OutputFormat};
use hmst_convert::config::{Config, ConfigManager};
use hmst_convert::converter::Converter;
use hmst_convert::http_client::{AsyncHttpClient, HttpClientConfig};
use hmst_convert::output::{ConversionSummary, Output};
use hmst_convert::output_validator::{DisabledValidator, MarkupValidator, ReducedMarkupValidator};
use hmst_convert::schema_loader::SchemaLoader;
use hmst_convert::{DiskCache, ModelIr};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let out = Output::new(cli.verbosity());

    if let Err(message) = cli.validate() {
        eprint!("{}", out.format_failure(&message));
        process::exit(2);
    }

    if let Err(e) = run(&cli, &out).await {
        eprint!("{}", out.format_failure(&format!("{e:#}")));
        process::exit(1);
    }
}

async fn run(cli: &Cli, out: &Output) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = ConfigManager::load_config(cli)
        .await
        .context("failed to load configuration")?;

    let raw = tokio::fs::read_to_string(&cli.input)
        .await
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", cli.input.display()))?;

    let converter = Converter::new();
    let output_path = cli.resolve_output_path();

    let (bytes, model) = match cli.format {
        OutputFormat::Ir => {
            let model = converter.convert(&doc)?;
            let bytes = model.to_ir_json()?;
            (bytes, model)
        }
        OutputFormat::Xml => {
            let validator = build_validator(cli, &config, out).await?;
            let model = converter.convert(&doc)?;
            let bytes = hmst_convert::emit_markup(&model)?;
            let report =
                hmst_convert::check_markup(validator.as_ref(), &bytes, model.datas.is_empty())?;
            print!("{}", out.format_ignored_violations(&report.suppressed));
            (bytes, model)
        }
    };

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&output_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    let summary = summarize(&model, started);
    print!("{}", out.format_success(&output_path, &summary));
    Ok(())
}

/// Pick the markup validator: disabled, full XSD when a schema could be loaded
/// (and the libxml2 feature is built in), reduced structural check otherwise.
async fn build_validator(
    cli: &Cli,
    config: &Config,
    out: &Output,
) -> anyhow::Result<Box<dyn MarkupValidator>> {
    if config.output.no_validate {
        return Ok(Box::new(DisabledValidator));
    }

    let http_client = AsyncHttpClient::new(HttpClientConfig {
        timeout_seconds: config.network.timeout_seconds,
        retry_attempts: config.network.retry_attempts,
        retry_delay_ms: config.network.retry_delay_ms,
        ..Default::default()
    })?;
    let cache = DiskCache::new(
        config.cache.directory.clone(),
        ConfigManager::get_cache_ttl_duration(config),
    );
    let loader = SchemaLoader::new(cache, http_client, config.network.offline);

    let schema_bytes = match &cli.schema {
        Some(path) => Some(loader.load_local(path).await?),
        None => {
            let (bytes, diagnostic) = loader.load().await;
            if let Some(diagnostic) = diagnostic {
                eprint!("{}", out.format_diagnostic(&diagnostic));
            }
            bytes
        }
    };

    #[cfg(feature = "libxml2")]
    if let Some(bytes) = &schema_bytes {
        match hmst_convert::output_validator::XsdMarkupValidator::new(bytes) {
            Ok(validator) => return Ok(Box::new(validator)),
            Err(e) => {
                eprint!(
                    "{}",
                    out.format_diagnostic(&format!("XSD validator unavailable: {e}"))
                );
            }
        }
    }
    #[cfg(not(feature = "libxml2"))]
    let _ = &schema_bytes;

    Ok(Box::new(ReducedMarkupValidator::new()))
}

fn summarize(model: &ModelIr, started: Instant) -> ConversionSummary {
    ConversionSummary {
        tasks: model.task.iter_preorder().count(),
        data_objects: model.datas.len(),
        error_entities: model.errors.connectors.len()
            + model.errors.phenotypes.len()
            + model.errors.genotypes.len(),
        duration: started.elapsed(),
    }
}
