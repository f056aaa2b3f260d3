//! # aya-backed Instrumentation Image
//!
//! [`LoadedImage`] owns an [`aya::Ebpf`] loaded from a compiled object on
//! disk together with the attach sections scanned out of the same bytes.
//! [`KernelTable`] is a hash-family map taken out of the image for polling.
//!
//! Programs are attached as tracepoints. Dropping the image unloads every
//! program and closes every map fd that was not taken out of it.

use aya::maps::{HashMap, Map, MapData, PerCpuHashMap};
use aya::programs::{ProgramError, TracePoint};
use aya::programs::trace_point::TracePointLinkId;
use aya::Ebpf;
use aya_log::EbpfLogger;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{program_sections, Catalog, CountTable, Entries, Image, ProgramInfo, TableInfo, TableKind};
use crate::domain::{AttachPoint, SetupError, TableError};

/// A compiled instrumentation unit loaded into the kernel's reach.
pub struct LoadedImage {
    bpf: Ebpf,
    sections: BTreeMap<String, String>,
    path: PathBuf,
}

impl LoadedImage {
    /// Read and load the object at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not an object file, or
    /// the loader rejects it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let sections = program_sections(&data).map_err(|e| SetupError::InvalidImage {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let bpf = Ebpf::load(&data)?;
        info!("Loaded {} ({} programs)", path.display(), sections.len());

        let mut image = Self { bpf, sections, path: path.to_path_buf() };
        image.init_logger();
        Ok(image)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward kernel-side log records when the image was built with aya-log.
    fn init_logger(&mut self) {
        if let Err(e) = EbpfLogger::init(&mut self.bpf) {
            debug!("No kernel-side logger in image: {e}");
        }
    }

    fn tracepoint(&mut self, program: &str) -> Result<&mut TracePoint, SetupError> {
        self.bpf
            .program_mut(program)
            .ok_or_else(|| SetupError::NotFound(format!("program '{program}'")))?
            .try_into()
            .map_err(|e: ProgramError| SetupError::AttachFailed {
                program: program.to_string(),
                point: "tracepoint".to_string(),
                error: e.to_string(),
            })
    }
}

impl Image for LoadedImage {
    type Link = TracePointLinkId;
    type Table = KernelTable;

    fn catalog(&self) -> Catalog {
        let programs = self
            .bpf
            .programs()
            .map(|(name, _)| {
                let section = self.sections.get(name).cloned().unwrap_or_default();
                ProgramInfo::new(name, section)
            })
            .collect();
        let tables = self.bpf.maps().map(|(name, map)| TableInfo::new(name, kind_of(map))).collect();
        Catalog { programs, tables }
    }

    fn attach(&mut self, program: &str, point: &AttachPoint) -> Result<Self::Link, SetupError> {
        let attach_failed = |e: ProgramError| SetupError::AttachFailed {
            program: program.to_string(),
            point: point.to_string(),
            error: e.to_string(),
        };

        let tracepoint = self.tracepoint(program)?;
        tracepoint.load().map_err(attach_failed)?;
        let link = tracepoint.attach(&point.category, &point.name).map_err(attach_failed)?;
        info!("✓ Attached tracepoint: {}/{} ({program})", point.category, point.name);
        Ok(link)
    }

    fn detach(&mut self, program: &str, link: Self::Link) -> Result<(), SetupError> {
        self.tracepoint(program)?.detach(link).map_err(|e| SetupError::AttachFailed {
            program: program.to_string(),
            point: "detach".to_string(),
            error: e.to_string(),
        })
    }

    fn open_table(&mut self, name: &str) -> Result<Self::Table, SetupError> {
        let map = self
            .bpf
            .take_map(name)
            .ok_or_else(|| SetupError::NotFound(format!("table '{name}'")))?;
        KernelTable::try_from(map).map_err(|e| SetupError::TableUnusable {
            table: name.to_string(),
            error: e.to_string(),
        })
    }
}

fn kind_of(map: &Map) -> TableKind {
    match map {
        Map::HashMap(_) => TableKind::Hash,
        Map::LruHashMap(_) => TableKind::LruHash,
        Map::PerCpuHashMap(_) => TableKind::PerCpuHash,
        Map::PerCpuLruHashMap(_) => TableKind::PerCpuLruHash,
        Map::Array(_) => TableKind::Other("array"),
        Map::PerCpuArray(_) => TableKind::Other("percpu_array"),
        Map::RingBuf(_) => TableKind::Other("ringbuf"),
        Map::PerfEventArray(_) => TableKind::Other("perf_event_array"),
        Map::StackTraceMap(_) => TableKind::Other("stack_trace"),
        _ => TableKind::Other("other"),
    }
}

/// A `u32 -> u64` hash-family map owned outside of the image.
pub enum KernelTable {
    Hash(HashMap<MapData, u32, u64>),
    /// One counter per CPU; summed per key when read.
    PerCpuHash(PerCpuHashMap<MapData, u32, u64>),
}

impl TryFrom<Map> for KernelTable {
    type Error = aya::maps::MapError;

    fn try_from(map: Map) -> Result<Self, Self::Error> {
        match map {
            Map::PerCpuHashMap(_) | Map::PerCpuLruHashMap(_) => {
                Ok(KernelTable::PerCpuHash(PerCpuHashMap::try_from(map)?))
            }
            map => Ok(KernelTable::Hash(HashMap::try_from(map)?)),
        }
    }
}

impl CountTable for KernelTable {
    fn entries(&self) -> Entries<'_> {
        match self {
            KernelTable::Hash(map) => Box::new(map.iter().map(|item| item.map_err(TableError::from))),
            KernelTable::PerCpuHash(map) => Box::new(map.iter().map(|item| {
                item.map(|(pid, per_cpu)| {
                    (pid, per_cpu.iter().fold(0u64, |total, count| total.saturating_add(*count)))
                })
                .map_err(TableError::from)
            })),
        }
    }

    fn remove(&mut self, pid: u32) -> Result<(), TableError> {
        match self {
            KernelTable::Hash(map) => map.remove(&pid)?,
            KernelTable::PerCpuHash(map) => map.remove(&pid)?,
        }
        Ok(())
    }
}
