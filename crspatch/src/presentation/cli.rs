use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Patch CRS course archives for Memorex VIS compatibility",
    long_about = None
)]
pub struct Cli {
    /// CRS files and/or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Extra file signature to strip, in addition to PATCH.OFS and
    /// OBJECT.OFS (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Internal path written into every surviving sub-header
    #[arg(long = "target-path", value_name = "PATH")]
    pub target_path: Option<String>,

    /// Route outputs here instead of a `patched/` directory next to the
    /// first input
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}
