use tunsplit_core::*;

#[test]
fn test_device_name_validation() {
    // Valid names
    assert!(DeviceName::new("tunA1").is_ok());
    assert!(DeviceName::new("tap0").is_ok());
    assert!(DeviceName::new("veth-ns_1.2").is_ok());

    // Invalid names - empty
    assert!(DeviceName::new("").is_err());

    // Invalid names - longer than IFNAMSIZ - 1
    assert!(DeviceName::new("abcdefghijklmnop").is_err());

    // Invalid names - characters the kernel rejects
    assert!(DeviceName::new("tun 1").is_err());
    assert!(DeviceName::new("tun\t1").is_err());
    assert!(DeviceName::new("tun/1").is_err());
    assert!(DeviceName::new("tun:1").is_err());
    assert!(DeviceName::new(".").is_err());
}

#[test]
fn test_device_name_display() {
    let name: DeviceName = "tunA1".parse().unwrap();
    assert_eq!(format!("{}", name), "tunA1");
    assert_eq!(name.as_str(), "tunA1");
}

#[test]
fn test_process_id() {
    let pid = ProcessId::from_raw(1234);
    assert_eq!(pid.as_raw(), 1234);

    let current = ProcessId::current();
    assert!(current.as_raw() > 0);
    assert_eq!(current.as_raw() as u32, std::process::id());
}

#[test]
fn test_namespace_id_serialization() {
    let id = NamespaceId::from_raw(4_026_531_840);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "4026531840");

    let back: NamespaceId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_unresolved_is_default() {
    assert_eq!(NamespaceId::default(), NamespaceId::UNRESOLVED);
    assert!(!NamespaceId::default().is_resolved());
}

#[test]
fn test_consistency_error_roundtrip_through_error() {
    let snapshot = SplitSnapshot {
        socket: NamespaceId::from_raw(1001),
        device: NamespaceId::from_raw(3003),
        parent: NamespaceId::from_raw(1001),
        child: NamespaceId::from_raw(2002),
    };
    let violation = ConsistencyViolation::new(snapshot, vec![Violation::OrphanedDevice]);
    let err: Error = violation.clone().into();

    assert!(!err.is_fatal());
    match err {
        Error::Consistency(inner) => {
            assert_eq!(inner, violation);
            assert!(inner.contains(Violation::OrphanedDevice));
            assert!(!inner.contains(Violation::NotSplit));
        }
        other => panic!("Wrong error type: {other}"),
    }
}

#[test]
fn test_outcome_reports_attachment_findings() {
    let mut outcome = RunOutcome::new();
    outcome.record(
        Checkpoint::AfterResume,
        vec![Finding::Attachment(AttachmentViolation::WrongName {
            expected: "tunA1".to_string(),
            actual: "tunB1".to_string(),
        })],
    );

    assert!(!outcome.passed());
    let (checkpoint, finding) = &outcome.findings()[0];
    assert_eq!(*checkpoint, Checkpoint::AfterResume);
    assert!(finding.to_string().contains("wrong device tunB1"));
}
