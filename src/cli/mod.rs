// CLI module for bouquetly

use clap::Parser;

/// bouquetly - AI bouquet generation relay for OpenAI and Yandex Foundation Models
#[derive(Parser, Debug)]
#[command(name = "bouquetly", version, about, long_about = None)]
pub struct Args {
    /// Path to an alternate config file (defaults to ~/.bouquetly/config.toml)
    #[arg(long, env = "BOUQUETLY_CONFIG")]
    pub config: Option<String>,
}
