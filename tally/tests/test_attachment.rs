mod common;

use common::{event_log, events, exec_counter_catalog, FakeImage};
use tally::attach::{establish, AttachmentHandle};
use tally::domain::{AttachPoint, SetupError};
use tally::resolve::Overrides;

#[test]
fn test_establish_attaches_and_opens() {
    let log = event_log();
    let session = establish(FakeImage::new(exec_counter_catalog(), &log), &Overrides::default())
        .unwrap();

    assert!(session.handle.is_attached());
    assert_eq!(session.handle.program(), "count_exec");
    let target = session.target();
    assert_eq!(target.category, "syscalls");
    assert_eq!(target.name, "sys_enter_execve");
    assert_eq!(target.table, "exec_counter");
    assert_eq!(
        events(&log),
        ["attach count_exec syscalls:sys_enter_execve", "open exec_counter"]
    );
}

#[test]
fn test_release_unwinds_in_reverse_and_is_idempotent() {
    let log = event_log();
    let mut session =
        establish(FakeImage::new(exec_counter_catalog(), &log), &Overrides::default()).unwrap();

    session.handle.release();
    session.handle.release();
    assert!(!session.handle.is_attached());
    assert!(session.handle.table_mut().is_none());
    drop(session);

    assert_eq!(
        events(&log),
        [
            "attach count_exec syscalls:sys_enter_execve",
            "open exec_counter",
            "detach count_exec #1",
            "table closed",
            "image released",
        ]
    );
}

#[test]
fn test_drop_releases_without_explicit_call() {
    let log = event_log();
    {
        let _session =
            establish(FakeImage::new(exec_counter_catalog(), &log), &Overrides::default())
                .unwrap();
    }

    let seen = events(&log);
    assert_eq!(&seen[2..], ["detach count_exec #1", "table closed", "image released"]);
}

#[test]
fn test_table_failure_after_attach_detaches_first() {
    let log = event_log();
    let mut image = FakeImage::new(exec_counter_catalog(), &log);
    image.fail_open = true;

    let err = establish(image, &Overrides::default()).err().unwrap();

    assert!(matches!(err, SetupError::TableUnusable { .. }));
    assert_eq!(
        events(&log),
        [
            "attach count_exec syscalls:sys_enter_execve",
            "open failed exec_counter",
            "detach count_exec #1",
            "image released",
        ]
    );
}

#[test]
fn test_attach_failure_leaves_nothing_behind() {
    let log = event_log();
    let mut image = FakeImage::new(exec_counter_catalog(), &log);
    image.fail_attach = true;

    let err = AttachmentHandle::acquire(image, "count_exec", &AttachPoint::new("syscalls", "nope"))
        .err()
        .unwrap();

    assert!(matches!(err, SetupError::AttachFailed { .. }));
    assert!(!err.is_usage());
    assert_eq!(events(&log), ["attach failed count_exec", "image released"]);
}

#[test]
fn test_resolver_failure_never_attaches() {
    let log = event_log();
    let overrides = Overrides { table: Some("missing".to_string()), ..Overrides::default() };

    let err = establish(FakeImage::new(exec_counter_catalog(), &log), &overrides).err().unwrap();

    assert!(matches!(err, SetupError::NotFound(_)));
    assert_eq!(events(&log), ["image released"]);
}

#[test]
fn test_failed_detach_does_not_stop_release() {
    let log = event_log();
    let mut image = FakeImage::new(exec_counter_catalog(), &log);
    image.fail_detach = true;
    let mut session = establish(image, &Overrides::default()).unwrap();

    session.handle.release();
    assert!(!session.handle.is_attached());
    let after_first = events(&log);
    assert_eq!(
        &after_first[2..],
        ["detach failed count_exec #1", "table closed", "image released"]
    );

    session.handle.release();
    drop(session);
    assert_eq!(events(&log), after_first);
}
