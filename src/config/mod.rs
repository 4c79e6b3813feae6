pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "wrapfield")]
#[command(about = "Normalize JSON records against wrapper-aware model schemas")]
pub struct CliConfig {
    #[arg(long, help = "TOML file declaring the models")]
    pub schema: String,

    #[arg(long, help = "Model to construct")]
    pub model: String,

    #[arg(long, help = "JSON input file; stdin when omitted")]
    pub input: Option<String>,

    #[arg(long, help = "Print the normalized fields without checking required ones")]
    pub normalize_only: bool,

    #[arg(long, help = "Pretty-print the output")]
    pub pretty: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("schema", &self.schema)?;
        validate_non_empty_string("model", &self.model)?;
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        Ok(())
    }
}
