//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Poll a kernel counting table and print the top entries",
    after_help = "\
EXAMPLES:
    sudo tally --image bpf/hello.bpf.o                         Auto-select program and map
    sudo tally --image exec.bpf.o --map exec_count --top 5     Pin the map
    sudo tally --image exec.bpf.o --format json --reset        Per-interval deltas as JSON"
)]
pub struct Args {
    /// Compiled BPF object to load
    #[arg(short, long, visible_alias = "obj", value_name = "OBJECT", default_value = "bpf/hello.bpf.o")]
    pub image: PathBuf,

    /// Program to attach (default: smallest-named tracepoint program)
    #[arg(long)]
    pub program: Option<String>,

    /// Map to poll (default: smallest-named hash map)
    #[arg(long, visible_alias = "table")]
    pub map: Option<String>,

    /// Tracepoint category, e.g. "syscalls" (requires --tp-name)
    #[arg(long, value_name = "CATEGORY")]
    pub tp_category: Option<String>,

    /// Tracepoint name, e.g. "sys_enter_execve" (requires --tp-category)
    #[arg(long, value_name = "NAME")]
    pub tp_name: Option<String>,

    /// Poll interval in seconds (non-positive = 2, capped at one day)
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true, value_name = "SECS")]
    pub interval: f64,

    /// Number of entries to show (non-positive = 10)
    #[arg(long, default_value_t = 10, allow_negative_numbers = true, value_name = "N")]
    pub top: i64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Delete observed keys after each read, so counts are per interval
    #[arg(long)]
    pub reset: bool,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
