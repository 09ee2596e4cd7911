use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
}

/// Output representation to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Task-model markup (`.hmst`)
    #[default]
    Xml,
    /// Normalized intermediate JSON representation
    Ir,
}

/// Convert JSON task definitions to HAMSTERS task-model files
#[derive(Parser, Debug, Clone)]
#[command(name = "hmst-convert")]
#[command(about = "Convert JSON task definitions to HAMSTERS v7 task-model markup")]
#[command(version)]
pub struct Cli {
    /// JSON task definition to convert
    #[arg(help = "Input JSON file")]
    pub input: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,

    /// Output file path (defaults to generated/<input-stem>.hmst)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Never touch the network; use only the cached schema
    #[arg(long = "offline")]
    pub offline: bool,

    /// Skip output validation entirely
    #[arg(long = "no-validate")]
    pub no_validate: bool,

    /// Validate against a local XSD file instead of the published one
    #[arg(long = "schema")]
    pub schema: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Cache directory for schemas
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// Cache TTL in hours
    #[arg(long = "cache-ttl", default_value = "24")]
    pub cache_ttl: u64,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", default_value = "30")]
    pub timeout: u64,

    /// Number of retry attempts for failed downloads
    #[arg(long = "retry-attempts", default_value = "3")]
    pub retry_attempts: u32,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {}", self.input.display()));
        }
        if let Some(schema) = &self.schema
            && !schema.exists()
        {
            return Err(format!("Schema file does not exist: {}", schema.display()));
        }
        Ok(())
    }

    pub fn get_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("hmst-convert")
        })
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default output path: `generated/<input-stem>.hmst` next to the working
    /// directory, with `_ir.json` for the IR format.
    pub fn resolve_output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        match self.format {
            OutputFormat::Xml => PathBuf::from("generated").join(format!("{stem}.hmst")),
            OutputFormat::Ir => PathBuf::from("generated").join(format!("{stem}_ir.json")),
        }
    }
}
