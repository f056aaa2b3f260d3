//! Shared fakes for integration tests
//!
//! `FakeImage` and `ScriptedTable` stand in for a loaded BPF object and its
//! kernel map. Both write what happens to them into a shared event log so
//! tests can assert on teardown order.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use tally::domain::{AttachPoint, Entry, RenderError, SetupError, TableError};
use tally::image::{Catalog, CountTable, Entries, Image, ProgramInfo, TableInfo, TableKind};
use tally::render::{Render, Report};

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// The classic one-program, one-map image.
pub fn exec_counter_catalog() -> Catalog {
    Catalog {
        programs: vec![ProgramInfo::new("count_exec", "tracepoint/syscalls/sys_enter_execve")],
        tables: vec![TableInfo::new("exec_counter", TableKind::Hash)],
    }
}

pub struct FakeImage {
    pub catalog: Catalog,
    pub log: EventLog,
    pub rows: Rc<RefCell<BTreeMap<u32, u64>>>,
    pub fail_attach: bool,
    pub fail_detach: bool,
    pub fail_open: bool,
    next_link: u32,
}

impl FakeImage {
    pub fn new(catalog: Catalog, log: &EventLog) -> Self {
        Self {
            catalog,
            log: Rc::clone(log),
            rows: Rc::new(RefCell::new(BTreeMap::new())),
            fail_attach: false,
            fail_detach: false,
            fail_open: false,
            next_link: 1,
        }
    }
}

impl Image for FakeImage {
    type Link = u32;
    type Table = ScriptedTable;

    fn catalog(&self) -> Catalog {
        self.catalog.clone()
    }

    fn attach(&mut self, program: &str, point: &AttachPoint) -> Result<u32, SetupError> {
        if self.fail_attach {
            self.log.borrow_mut().push(format!("attach failed {program}"));
            return Err(SetupError::AttachFailed {
                program: program.to_string(),
                point: point.to_string(),
                error: "tracepoint does not exist".to_string(),
            });
        }
        let link = self.next_link;
        self.next_link += 1;
        self.log.borrow_mut().push(format!("attach {program} {point}"));
        Ok(link)
    }

    fn detach(&mut self, program: &str, link: u32) -> Result<(), SetupError> {
        if self.fail_detach {
            self.log.borrow_mut().push(format!("detach failed {program} #{link}"));
            return Err(SetupError::AttachFailed {
                program: program.to_string(),
                point: "detach".to_string(),
                error: "link already gone".to_string(),
            });
        }
        self.log.borrow_mut().push(format!("detach {program} #{link}"));
        Ok(())
    }

    fn open_table(&mut self, name: &str) -> Result<ScriptedTable, SetupError> {
        if self.fail_open {
            self.log.borrow_mut().push(format!("open failed {name}"));
            return Err(SetupError::TableUnusable {
                table: name.to_string(),
                error: "value size 4, expected 8".to_string(),
            });
        }
        self.log.borrow_mut().push(format!("open {name}"));
        let mut table = ScriptedTable::new(&[]);
        table.rows = Rc::clone(&self.rows);
        table.log = Some(Rc::clone(&self.log));
        Ok(table)
    }
}

impl Drop for FakeImage {
    fn drop(&mut self) {
        self.log.borrow_mut().push("image released".to_string());
    }
}

/// In-memory counting table with failure injection.
///
/// `fail_reads` makes that many upcoming walks fail after yielding
/// `fail_after` rows.
pub struct ScriptedTable {
    pub rows: Rc<RefCell<BTreeMap<u32, u64>>>,
    pub fail_reads: Rc<Cell<u32>>,
    pub fail_after: usize,
    log: Option<EventLog>,
}

impl ScriptedTable {
    pub fn new(rows: &[(u32, u64)]) -> Self {
        Self {
            rows: Rc::new(RefCell::new(rows.iter().copied().collect())),
            fail_reads: Rc::new(Cell::new(0)),
            fail_after: 0,
            log: None,
        }
    }
}

impl CountTable for ScriptedTable {
    fn entries(&self) -> Entries<'_> {
        let rows: Vec<(u32, u64)> = self.rows.borrow().iter().map(|(k, v)| (*k, *v)).collect();
        let pending = self.fail_reads.get();
        if pending > 0 {
            self.fail_reads.set(pending - 1);
            let head: Vec<_> = rows.into_iter().take(self.fail_after).map(Ok).collect();
            let failure = TableError::Io(std::io::Error::other("lookup failed: ENOENT"));
            return Box::new(head.into_iter().chain(std::iter::once(Err(failure))));
        }
        Box::new(rows.into_iter().map(Ok))
    }

    fn remove(&mut self, pid: u32) -> Result<(), TableError> {
        self.rows.borrow_mut().remove(&pid);
        Ok(())
    }
}

impl Drop for ScriptedTable {
    fn drop(&mut self) {
        if let Some(log) = &self.log {
            log.borrow_mut().push("table closed".to_string());
        }
    }
}

/// Renderer that keeps every report's entries and the (tokio) time it saw
/// them.
///
/// `stall` blocks the next render for that long after recording it, like a
/// terminal that stopped draining stdout.
#[derive(Clone, Default)]
pub struct Recorder {
    pub frames: Rc<RefCell<Vec<(tokio::time::Instant, Vec<Entry>)>>>,
    pub fail: Rc<Cell<bool>>,
    pub stall: Rc<Cell<Option<Duration>>>,
}

impl Recorder {
    pub fn frames(&self) -> Vec<(tokio::time::Instant, Vec<Entry>)> {
        self.frames.borrow().clone()
    }
}

impl Render for Recorder {
    fn render(&mut self, report: &Report<'_>) -> Result<(), RenderError> {
        if self.fail.get() {
            return Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout closed",
            )));
        }
        self.frames.borrow_mut().push((tokio::time::Instant::now(), report.top.to_vec()));
        if let Some(stall) = self.stall.take() {
            std::thread::sleep(stall);
        }
        Ok(())
    }
}
