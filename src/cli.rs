use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use pagesim::{
    config::{DEFAULT_FRAME_COUNT, DEFAULT_PAGE_COUNT},
    PageReplacementAlgorithm,
};

#[derive(Parser, Debug)]
#[command(name = "pagesim", about = "Step through page replacement on a reference string")]
#[command(group(ArgGroup::new("workload").required(true).args(["refs", "file", "config"])))]
pub struct Cli {
    #[arg(default_value_t=DEFAULT_FRAME_COUNT)]
    pub frames: usize,

    #[arg(default_value_t=PageReplacementAlgorithm::Fifo)]
    pub pra: PageReplacementAlgorithm,

    /// Number of virtual pages
    #[arg(short, long, default_value_t=DEFAULT_PAGE_COUNT)]
    pub pages: usize,

    /// Reference string, e.g. "7,0,1,2w,0"
    #[arg(short, long)]
    pub refs: Option<String>,

    /// File holding the reference string
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// JSON simulation config; replaces frames, pra, pages and tlb-entries
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value_t=0)]
    pub tlb_entries: usize,

    /// Drop malformed or out-of-range references instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Run every algorithm on the workload and print a comparison
    #[arg(long)]
    pub compare: bool,

    /// Search for Belady's anomaly from 1 up to this many frames
    #[arg(long, value_name = "MAX_FRAMES")]
    pub belady: Option<usize>,

    /// Play back at this many steps per second
    #[arg(short, long)]
    pub speed: Option<u32>,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,

    #[arg(short, long)]
    pub debug: bool,
}
