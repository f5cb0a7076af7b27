use strata_util::errors::StrataError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = StrataError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_error_display() {
    let err = StrataError::Manifest {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Manifest error: bad syntax");
}

#[test]
fn test_malformed_version_display() {
    let err = StrataError::MalformedVersion {
        input: "1.+.2".to_string(),
        reason: "'+' is only allowed at the end".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Malformed version '1.+.2': '+' is only allowed at the end"
    );
}

#[test]
fn test_scope_cycle_display() {
    let err = StrataError::ScopeCycle {
        scope: "compile".to_string(),
        parent: "test".to_string(),
    };
    assert_eq!(err.to_string(), "Scope cycle: 'compile' cannot extend 'test'");
}

#[test]
fn test_unmapped_scope_display() {
    let err = StrataError::UnmappedScope {
        scope: "test".to_string(),
        declared: "compile, runtime".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "No mapped scope declared for 'test'. Declared scopes are [compile, runtime]"
    );
}

#[test]
fn test_unresolved_version_display() {
    let err = StrataError::UnresolvedVersion {
        module: "com.google.guava:guava".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "No version specified for 'com.google.guava:guava' and none provided"
    );
}

#[test]
fn test_resolution_error_display() {
    let err = StrataError::Resolution {
        message: "org.a:a:1.0 not found".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Dependency resolution failed: org.a:a:1.0 not found"
    );
}

#[test]
fn test_generic_error_display() {
    let err = StrataError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let strata_err: StrataError = io_err.into();
    assert!(matches!(strata_err, StrataError::Io(_)));
}
