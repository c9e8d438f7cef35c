// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use financial_overview_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("map key must be a string".into());
        assert_eq!(err.to_string(), "Serialization error: map key must be a string");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("missing field `id`".into());
        assert_eq!(err.to_string(), "Deserialization error: missing field `id`");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn persistence() {
        let err = CoreError::Persistence("disk full".into());
        assert_eq!(err.to_string(), "Persistence error: disk full");
    }

    #[test]
    fn api_error() {
        let err = CoreError::Api {
            provider: "CoinCap".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (CoinCap): rate limited");
    }

    #[test]
    fn no_provider() {
        let err = CoreError::NoProvider("Raw Materials".into());
        assert_eq!(
            err.to_string(),
            "No provider available for asset class: Raw Materials"
        );
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("Plan name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Plan name must not be empty"
        );
    }

    #[test]
    fn plan_not_found() {
        let err = CoreError::PlanNotFound("123".into());
        assert_eq!(err.to_string(), "Plan not found: 123");
    }

    #[test]
    fn holding_not_found() {
        let err = CoreError::HoldingNotFound("abc".into());
        assert_eq!(err.to_string(), "Holding not found: abc");
    }

    #[test]
    fn unknown_category() {
        let err = CoreError::UnknownCategory("Bonds".into());
        assert_eq!(err.to_string(), "Unknown category key: Bonds");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "plans.json missing");
        let err: CoreError = io.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("plans.json missing")),
            other => panic!("Expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn from_serde_json_syntax_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_serde_json_io_error() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
            }
        }

        let json_err = serde_json::from_reader::<_, serde_json::Value>(Broken).unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::FileIO(_)));
    }

    #[test]
    fn question_mark_propagates_io() {
        fn read_missing() -> Result<Vec<u8>, CoreError> {
            Ok(std::fs::read("/definitely/not/here/plans.json")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::FileIO(_))));
    }
}

// ── std::error::Error ───────────────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err = CoreError::PlanNotFound("x".into());
        let dyn_err: &dyn std::error::Error = &err;
        assert_eq!(dyn_err.to_string(), "Plan not found: x");
    }

    #[test]
    fn core_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
