//! # tally - Top-N Sampler for Kernel Counting Tables
//!
//! tally loads a compiled BPF object, attaches one of its tracepoint programs,
//! and polls one of its `pid -> count` hash maps at a fixed interval, printing
//! the busiest processes each time. It is a sampler, not an event stream:
//! whatever the kernel counted between two ticks shows up as one number.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  BPF program (kernel, external)                 │
//! │     tracepoint/syscalls/sys_enter_execve → map[pid] += 1        │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ hash map, read by syscall
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       tally (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │   Resolve    │──▶│    Attach    │──▶│  Poll Loop   │        │
//! │  │ (once, start)│   │   (handle)   │   │ (every tick) │        │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘        │
//! │                                               │                 │
//! │                     read ──▶ rank ──▶ render ◀┘                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`image`]: loaded images and kernel tables (`Image`, `CountTable` seams,
//!   aya-backed `LoadedImage`, ELF attach-section scan)
//! - [`resolve`]: deterministic choice of program, attach point and table
//! - [`attach`]: `AttachmentHandle` and `establish`, with guaranteed teardown
//! - [`snapshot`]: table reader and ranker
//! - [`poll`]: the cancellable fixed-interval loop
//! - [`render`]: text and JSON reports
//! - [`cli`]: argument parsing and normalization
//! - [`domain`]: core types and errors
//! - [`preflight`]: privilege, kernel and image checks
//! - [`process_lookup`]: PID → command name
//!
//! ## Typical Usage
//!
//! ```bash
//! # Let tally pick the tracepoint program and the hash map
//! sudo ./tally --image bpf/hello.bpf.o
//!
//! # Per-interval deltas, machine-readable
//! sudo ./tally --image bpf/hello.bpf.o --format json --reset --interval 5
//! ```

pub mod attach;
pub mod cli;
pub mod domain;
pub mod image;
pub mod poll;
pub mod preflight;
pub mod process_lookup;
pub mod render;
pub mod resolve;
pub mod snapshot;
