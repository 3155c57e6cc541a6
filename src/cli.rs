use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::record::CoordinateFilters;

#[derive(Debug, Clone, Parser)]
#[command(name = "doc-finder")]
#[command(about = "Index Maven javadoc/sources archives and the JDK, then find and read class docs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Local Maven repository (default: ~/.m2/repository)
    #[arg(long, global = true, value_name = "PATH")]
    pub m2: Option<PathBuf>,

    /// Output root for extracted archives and the index
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(short = 'g', long, value_name = "GROUP")]
    pub group: Option<String>,

    #[arg(short = 'a', long, value_name = "ARTIFACT")]
    pub artifact: Option<String>,

    #[arg(short = 'v', long, value_name = "VER")]
    pub version: Option<String>,

    /// Match the whole class name instead of a fuzzy substring
    #[arg(short = 'e', long)]
    pub exact: bool,
}

impl FilterArgs {
    pub fn coordinate_filters(&self) -> CoordinateFilters {
        CoordinateFilters {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: self.version.clone(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Extract archives and (re)build the class index
    Index {
        /// Skip detecting the JDK and fetching its class list
        #[arg(long)]
        no_jdk: bool,
    },
    Find {
        pattern: String,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short = 'f', long, value_enum, default_value_t = FindFormat::Default)]
        format: FindFormat,
    },
    /// Render a class by canonical key
    View {
        key: String,

        #[arg(short = 's', long)]
        source: bool,
    },
    /// Pick classes with fzf and page through them until cancelled
    Select {
        pattern: Option<String>,

        #[arg(short = 's', long)]
        source: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Convert a javadoc HTML file to Markdown
    Render { file: PathBuf },
    Stats,
    /// Remove the index
    Clear {
        /// Also remove extracted javadoc and sources trees
        #[arg(long)]
        extracted: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FindFormat {
    Default,
    Class,
    Json,
    Javadoc,
    Source,
}
