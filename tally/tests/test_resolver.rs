use tally::domain::{AttachPoint, SetupError};
use tally::image::{Catalog, ProgramInfo, TableInfo, TableKind};
use tally::resolve::{resolve, Overrides};

fn two_tracepoints() -> Catalog {
    Catalog {
        programs: vec![
            ProgramInfo::new("b_tp", "tracepoint/sys/enter_y"),
            ProgramInfo::new("a_tp", "tracepoint/sys/enter_x"),
        ],
        tables: vec![
            TableInfo::new("zz_counts", TableKind::Hash),
            TableInfo::new("aa_ring", TableKind::Other("RingBuf")),
        ],
    }
}

#[test]
fn test_smallest_tracepoint_program_wins() {
    let selection = resolve(&two_tracepoints(), &Overrides::default()).unwrap();

    assert_eq!(selection.program.name, "a_tp");
    assert_eq!(selection.attach_point, AttachPoint::new("sys", "enter_x"));
    // Hash-family beats a smaller non-hash table
    assert_eq!(selection.table.name, "zz_counts");
}

#[test]
fn test_selection_ignores_catalog_order() {
    let base = two_tracepoints();
    let expected = resolve(&base, &Overrides::default()).unwrap();

    for rotation in 0..base.programs.len() {
        for table_rotation in 0..base.tables.len() {
            let mut shuffled = base.clone();
            shuffled.programs.rotate_left(rotation);
            shuffled.tables.rotate_left(table_rotation);
            assert_eq!(resolve(&shuffled, &Overrides::default()).unwrap(), expected);
        }
    }
}

#[test]
fn test_tp_prefix_counts_as_tracepoint() {
    let catalog = Catalog {
        programs: vec![
            ProgramInfo::new("a_kprobe", "kprobe/do_sys_open"),
            ProgramInfo::new("z_short", "tp/sched/sched_switch"),
        ],
        tables: vec![TableInfo::new("counts", TableKind::PerCpuHash)],
    };

    let selection = resolve(&catalog, &Overrides::default()).unwrap();
    assert_eq!(selection.program.name, "z_short");
    assert_eq!(selection.attach_point, AttachPoint::new("sched", "sched_switch"));
}

#[test]
fn test_explicit_overrides_win() {
    let overrides = Overrides {
        program: Some("b_tp".to_string()),
        table: Some("aa_ring".to_string()),
        category: Some("syscalls".to_string()),
        entry: Some("sys_enter_openat".to_string()),
    };

    let selection = resolve(&two_tracepoints(), &overrides).unwrap();
    assert_eq!(selection.program.name, "b_tp");
    assert_eq!(selection.table.name, "aa_ring");
    assert_eq!(selection.attach_point, AttachPoint::new("syscalls", "sys_enter_openat"));
}

#[test]
fn test_missing_program_override_is_not_found() {
    let overrides = Overrides { program: Some("nope".to_string()), ..Overrides::default() };

    let err = resolve(&two_tracepoints(), &overrides).unwrap_err();
    assert!(matches!(err, SetupError::NotFound(_)));
    assert!(err.is_usage());
}

#[test]
fn test_half_attach_point_is_conflict() {
    let overrides = Overrides { entry: Some("enter_x".to_string()), ..Overrides::default() };

    let err = resolve(&two_tracepoints(), &overrides).unwrap_err();
    assert!(matches!(err, SetupError::ConfigConflict(_)));
}

#[test]
fn test_empty_image_is_not_found() {
    let err = resolve(&Catalog::default(), &Overrides::default()).unwrap_err();
    assert!(matches!(err, SetupError::NotFound(_)));
}
