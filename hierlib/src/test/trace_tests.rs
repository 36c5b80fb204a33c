use crate::cache::AccessKind;
use crate::error::TraceError;
use crate::trace::{parse_line, parse_trace, write_trace, TraceEntry};
use crate::error::WorkloadError;
use crate::workload::Workload;

#[test]
fn parses_typed_and_untyped_lines() {
    let trace = parse_trace(b"# header\nR 0x1000\nw 4096\n\n8192\nW 0XFF\n").unwrap();
    assert_eq!(trace, vec![
        TraceEntry::load(0x1000),
        TraceEntry::store(4096),
        TraceEntry::untyped(8192),
        TraceEntry::store(0xff),
    ]);
}

#[test]
fn reports_line_numbers() {
    match parse_trace(b"R 0x10\nX 0x20\n") {
        Err(TraceError::Malformed { line, content }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "X 0x20");
        }
        other => panic!("expected a malformed line, got {other:?}"),
    }
    assert!(matches!(parse_line("R 0x1ffffffffffffffff", 9), Err(TraceError::InvalidAddress { line: 9, .. })));
    assert!(matches!(parse_trace(b"R 0x10\n\xff\n"), Err(TraceError::Encoding { line: 2 })));
}

#[test]
fn written_trace_parses_back() {
    let entries = vec![TraceEntry::load(1), TraceEntry::store(0xabc), TraceEntry::untyped(u64::MAX)];
    let mut out = Vec::new();
    write_trace(&mut out, &entries).unwrap();
    assert_eq!(String::from_utf8(out.clone()).unwrap(), "R 0x1\nW 0xabc\n0xffffffffffffffff\n");
    assert_eq!(parse_trace(&out).unwrap(), entries);
}

#[test]
fn random_workloads_are_seeded() {
    let uniform = Workload::uniform(1000);
    let a = uniform.generate(42).unwrap();
    assert_eq!(a, uniform.generate(42).unwrap());
    assert_ne!(a, uniform.generate(43).unwrap());
    assert!(a.iter().all(|e| e.address <= 0xFFFF));
    assert_eq!(a[0].kind, Some(AccessKind::Load));
    assert_eq!(a[1].kind, Some(AccessKind::Store));

    let localized = Workload::localized(1000).generate(42).unwrap();
    assert_eq!(localized.len(), 1000);
    assert!(localized.iter().all(|e| e.address <= 0xFFFF));
    let mean = localized.iter().map(|e| e.address as f64).sum::<f64>() / localized.len() as f64;
    assert!((mean - 32768.0).abs() < 1500.0, "mean {mean}");
}

#[test]
fn sequential_workload_sweeps_twice() {
    let trace = Workload::sequential(64).generate(0).unwrap();
    assert_eq!(trace.len(), 2000);
    assert_eq!(trace[0], TraceEntry::untyped(0x1000));
    assert_eq!(trace[999], TraceEntry::untyped(0x1000 + 999 * 64));
    assert_eq!(trace[1000], trace[0]);

    let zero = Workload::Sequential { base: 0, blocks: 4, stride: 0, passes: 1 };
    assert!(matches!(zero.generate(0), Err(WorkloadError::ZeroStride)));
}

#[test]
fn localized_workload_rejects_bad_deviation() {
    let localized = |std_dev| Workload::Localized { count: 1, mean: 0.0, std_dev, max_address: 10 };
    assert!(matches!(localized(-1.0).generate(0), Err(WorkloadError::InvalidStdDev(d)) if d == -1.0));
    assert!(matches!(localized(f64::NAN).generate(0), Err(WorkloadError::InvalidStdDev(d)) if d.is_nan()));
    assert!(matches!(localized(f64::INFINITY).generate(0), Err(WorkloadError::Distribution(_))));
    // A zero deviation is degenerate but valid, every address is the mean
    assert_eq!(localized(0.0).generate(0).unwrap(), vec![TraceEntry::load(0)]);
}
