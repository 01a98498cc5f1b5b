mod cli {
    #![allow(non_snake_case)]

    use assert_cmd::prelude::*;
    use mockito::Server;
    use predicates::str::contains;

    use std::io::Write;
    use std::process::Command;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const NAME: &str = "linkscrub";

    #[test]
    fn test_output__when_no_arguments_provided() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.assert()
            .failure()
            .stderr(contains("required arguments"));
        Ok(())
    }

    #[test]
    fn test_output__when_no_fields_provided() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.arg("data.jsonl");

        cmd.assert()
            .failure()
            .stderr(contains("required arguments"));
        Ok(())
    }

    #[test]
    fn test_output__when_input_file_missing() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args(["/definitely/not/here.jsonl", "a", "--no-config"]);

        cmd.assert()
            .failure()
            .stderr(contains("File not found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cleaning__keeps_reachable_and_removes_dead_urls() -> TestResult {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("HEAD", "/ok")
            .with_status(200)
            .create_async()
            .await;
        let _gone = server
            .mock("HEAD", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.jsonl");
        let output = dir.path().join("output.jsonl");
        let mut file = std::fs::File::create(&input)?;
        writeln!(file, r#"{{"id":1,"a":"{}/ok"}}"#, server.url())?;
        writeln!(file, r#"{{"id":2,"a":"{}/gone"}}"#, server.url())?;

        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args([
            input.to_str().unwrap(),
            "a",
            "--no-config",
            "--output",
            output.to_str().unwrap(),
            "--threads",
            "2",
            "--retry",
            "1",
            "--timeout",
            "5",
        ]);

        cmd.assert()
            .success()
            .stdout(contains("Cleaned dataset written to"));

        let cleaned = std::fs::read_to_string(&output)?;
        let lines: Vec<&str> = cleaned.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("/ok"));
        assert!(!lines[1].contains("/gone"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cleaning__follows_redirects_and_writes_report() -> TestResult {
        let mut server = Server::new_async().await;
        let _old = server
            .mock("HEAD", "/old")
            .with_status(301)
            .with_header("Location", "/new")
            .create_async()
            .await;
        let _new = server
            .mock("HEAD", "/new")
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.jsonl");
        let output = dir.path().join("output.jsonl");
        let report = dir.path().join("redirects.txt");
        let mut file = std::fs::File::create(&input)?;
        writeln!(file, r#"{{"a":"{}/old"}}"#, server.url())?;

        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args([
            input.to_str().unwrap(),
            "a",
            "--no-config",
            "--output",
            output.to_str().unwrap(),
            "--follow-redirects",
            "--redirects-file",
            report.to_str().unwrap(),
            "--retry",
            "1",
            "--timeout",
            "5",
        ]);

        cmd.assert().success();

        let cleaned = std::fs::read_to_string(&output)?;
        assert!(cleaned.contains("/new"));
        assert!(!cleaned.contains("/old"));

        let report_content = std::fs::read_to_string(&report)?;
        assert_eq!(
            report_content,
            format!("{url}/old;{url}/new\n", url = server.url())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cleaning__quiet_mode_suppresses_summary() -> TestResult {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("HEAD", "/ok")
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.jsonl");
        let output = dir.path().join("output.jsonl");
        let mut file = std::fs::File::create(&input)?;
        writeln!(file, r#"{{"a":"{}/ok"}}"#, server.url())?;

        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args([
            input.to_str().unwrap(),
            "a",
            "--no-config",
            "--quiet",
            "--output",
            output.to_str().unwrap(),
            "--retry",
            "1",
            "--timeout",
            "5",
        ]);

        let assert = cmd.assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert!(!stdout.contains("Cleaned dataset written to"));
        Ok(())
    }

    #[tokio::test]
    async fn test_cleaning__malformed_line_does_not_fail_the_run() -> TestResult {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("HEAD", "/ok")
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.jsonl");
        let output = dir.path().join("output.jsonl");
        let mut file = std::fs::File::create(&input)?;
        writeln!(file, r#"{{"a":"{}/ok"}}"#, server.url())?;
        writeln!(file, "definitely not json")?;

        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args([
            input.to_str().unwrap(),
            "a",
            "--no-config",
            "--output",
            output.to_str().unwrap(),
            "--retry",
            "1",
            "--timeout",
            "5",
        ]);

        cmd.assert().success();

        let cleaned = std::fs::read_to_string(&output)?;
        assert_eq!(cleaned.lines().count(), 1);
        Ok(())
    }

    #[test]
    fn test_cli__rejects_zero_chunk_size() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.jsonl");
        std::fs::write(&input, "{}\n")?;

        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args([
            input.to_str().unwrap(),
            "a",
            "--no-config",
            "--chunk-size",
            "0",
        ]);

        cmd.assert()
            .failure()
            .stderr(contains("Chunk size cannot be 0"));
        Ok(())
    }

    #[test]
    fn test_cli__rejects_verbose_with_visual() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.args(["data.jsonl", "a", "--verbose", "--visual"]);

        cmd.assert().failure();
        Ok(())
    }
}
