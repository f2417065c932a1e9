//! Command-line surface for `renderdesk`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use renderdesk::JobStatus;

#[derive(Parser, Debug)]
#[command(name = "renderdesk", version, about = "Render job database and farm submitter")]
pub struct Cli {
    /// Config file. Defaults to `<config dir>/renderdesk/config.json` when present.
    #[arg(long, global = true, env = "RENDERDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand a frame range into render order
    Frames {
        /// Expression such as "101-120, 130"
        expr: String,
        /// Print only the first-last span
        #[arg(long)]
        span: bool,
    },
    /// Maya lighting jobs
    Maya(MayaArgs),
    /// Nuke comp jobs
    Nuke(NukeArgs),
    /// Light presets
    Presets(PresetsArgs),
}

#[derive(Args, Debug)]
pub struct MayaArgs {
    #[command(subcommand)]
    pub action: MayaCmd,
}

#[derive(Subcommand, Debug)]
pub enum MayaCmd {
    /// Register a scene
    Add {
        scene_file: PathBuf,
        #[arg(long)]
        batch: String,
        #[arg(long)]
        camera: Option<String>,
        #[arg(long)]
        episode: Option<String>,
        /// Render layer as NAME=FRAMES, e.g. BEAUTY=101-120 (repeatable)
        #[arg(long = "layer", value_name = "NAME=FRAMES")]
        layers: Vec<String>,
        /// Layers render to `<output-root>/<layer>`
        #[arg(long)]
        output_root: Option<String>,
    },
    /// List jobs ordered by batch name
    List {
        #[arg(long)]
        status: Option<StatusArg>,
        /// Substring of batch name or scene path
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Print a job as JSON
    Show { id: String },
    /// Jobs for a shot number
    Shot { number: u32 },
    /// Edit one render layer
    Layer {
        id: String,
        layer: String,
        #[arg(long)]
        frames: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        output_directory: Option<String>,
        #[arg(long)]
        renderable: Option<bool>,
    },
    /// Set the job status
    Status {
        id: String,
        status: StatusArg,
        /// Skip the lifecycle check
        #[arg(long)]
        force: bool,
    },
    /// Submit all renderable layers and the daily
    Submit {
        id: String,
        /// Print the payloads without contacting the farm or changing the job
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete a job and its layers
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct NukeArgs {
    #[command(subcommand)]
    pub action: NukeCmd,
}

#[derive(Subcommand, Debug)]
pub enum NukeCmd {
    /// Create or update the job for a comp script
    Register {
        comp_file: PathBuf,
        #[arg(long)]
        first: i64,
        #[arg(long)]
        last: i64,
        #[arg(long)]
        nuke_version: Option<String>,
        #[arg(long, env = "REZ_USED_RESOLVE", hide_env_values = true)]
        rez_env: Option<String>,
    },
    /// List comp jobs
    List,
    /// Comp jobs for a shot number
    Shot { number: u32 },
}

#[derive(Args, Debug)]
pub struct PresetsArgs {
    #[command(subcommand)]
    pub action: PresetsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PresetsCmd {
    List {
        #[arg(long)]
        episode: Option<String>,
    },
    Show { name: String },
    /// Import a preset from a JSON export
    Import {
        file: PathBuf,
        /// Replace the lights of an existing preset with the same name
        #[arg(long)]
        replace: bool,
    },
    Delete { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    New,
    Rendering,
    Error,
    Done,
}

impl From<StatusArg> for JobStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::New => JobStatus::New,
            StatusArg::Rendering => JobStatus::Rendering,
            StatusArg::Error => JobStatus::Error,
            StatusArg::Done => JobStatus::Done,
        }
    }
}
