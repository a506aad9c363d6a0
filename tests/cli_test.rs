//! CLI interface tests

#[cfg(all(feature = "cli", feature = "async"))]
mod cli_tests {
    use std::process::Command;
    use tempfile::tempdir;

    fn binary() -> Command {
        Command::new(env!("CARGO_BIN_EXE_fx-forecast"))
    }

    #[test]
    fn test_cli_help() {
        let output = binary().arg("--help").output().unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        for command in ["fetch", "train", "present", "run", "info"] {
            assert!(stdout.contains(command), "missing {} in help", command);
        }
    }

    #[test]
    fn test_cli_version() {
        let output = binary().arg("--version").output().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_present_without_artifacts_fails() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!("data_dir = {:?}\n", dir.path().join("data").display().to_string()),
        )
        .unwrap();

        let output = binary()
            .args(["--config", config.to_str().unwrap(), "present"])
            .env("NO_COLOR", "1")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Error loading data:"));
        assert!(stderr.contains("exchange_rates.csv"));
        assert!(!dir.path().join("data").join("dashboard.html").exists());
    }

    #[test]
    fn test_info_reports_missing_artifacts() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!("data_dir = {:?}\n", dir.path().display().to_string()),
        )
        .unwrap();

        let output = binary()
            .args(["--config", config.to_str().unwrap(), "info"])
            .env("NO_COLOR", "1")
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("missing"));
    }
}
