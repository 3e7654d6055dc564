//! 命令行集成测试

use std::fs;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::HtmlTestHelper;

fn textswap(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.current_dir(dir.path());
    cmd.env_remove("TEXTSWAP_STORAGE_PATH");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn page(dir: &TempDir) -> String {
    let path = dir.path().join("index.html");
    fs::write(&path, HtmlTestHelper::landing_page()).unwrap();
    path.to_string_lossy().into_owned()
}

//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use super::*;

    #[test]
    fn translate_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let input = page(&dir);

        let output = textswap(&dir)
            .args(["--no-storage", "translate", input.as_str(), "--lang", "hi"])
            .output()
            .unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        let html = stdout(&output);
        assert!(html.contains(">मुख्य</a>"));
        assert!(html.contains(r#"<html lang="hi">"#));
        assert!(html.contains("<p>Shri Example</p>"));
        assert!(stderr(&output).contains("Translating... / अनुवाद हो रहा है..."));
        assert!(stderr(&output).contains("hi: 10/10 nodes written, 0 failed"));
    }

    #[test]
    fn translate_from_stdin_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.html");

        let output = textswap(&dir)
            .args(["--no-storage", "translate", "-", "-o"])
            .arg(&out)
            .write_stdin("<html><body><button>Send</button></body></html>")
            .output()
            .unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).is_empty());

        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains(r#"<button data-translate-id="element_0">भेजें</button>"#));
    }

    #[test]
    fn translate_with_extra_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("phrases.toml");
        fs::write(
            &table,
            "lang = \"hi\"\n\n[phrases]\n\"Press Releases\" = \"प्रेस विज्ञप्तियाँ\"\n",
        )
        .unwrap();

        let output = textswap(&dir)
            .args(["--no-storage", "--table"])
            .arg(&table)
            .args(["translate", "-"])
            .write_stdin("<html><body><h2>Press Releases</h2><h3>Home</h3></body></html>")
            .output()
            .unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        let html = stdout(&output);
        assert!(html.contains(">प्रेस विज्ञप्तियाँ</h2>"));
        assert!(html.contains(">मुख्य</h3>"));
    }

    #[test]
    fn scan_lists_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let input = page(&dir);

        let output = textswap(&dir).args(["scan", input.as_str()]).output().unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        let listing = stdout(&output);
        assert_eq!(listing.lines().count(), 10);
        assert!(listing.starts_with("element_0\ta\ttext=\"Home\""));
        assert!(listing.contains("title=\"About the Minister\""));
        assert!(listing.contains("placeholder=\"Ask something...\""));
        assert!(!listing.contains("Shri Example"));
        assert!(stderr(&output).contains("10 eligible nodes, 3 excluded subtrees"));
    }

    #[test]
    fn storage_keeps_preference_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let input = page(&dir);
        let storage = dir.path().join("state").join("storage.redb");

        let output = textswap(&dir)
            .arg("--storage")
            .arg(&storage)
            .args(["translate", input.as_str(), "-l", "hi"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", stderr(&output));

        let output = textswap(&dir)
            .arg("--storage")
            .arg(&storage)
            .args(["cache", "stats"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", stderr(&output));
        let stats = stdout(&output);
        // Send 同时出现在正文和 aria-label 中，只缓存一次
        assert!(stats.contains("entries: 8"));
        assert!(stats.contains("  hi: 8"));
        assert!(stats.contains("preferred language: hi"));

        let output = textswap(&dir)
            .arg("--storage")
            .arg(&storage)
            .args(["cache", "export"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("\"translation\": \"परिचय\""));

        let output = textswap(&dir)
            .arg("--storage")
            .arg(&storage)
            .args(["cache", "clear"])
            .output()
            .unwrap();
        assert!(stdout(&output).contains("translation cache cleared"));

        let output = textswap(&dir)
            .arg("--storage")
            .arg(&storage)
            .args(["cache", "clear"])
            .output()
            .unwrap();
        assert!(stdout(&output).contains("translation cache already empty"));
    }

    #[test]
    fn unusable_storage_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let input = page(&dir);
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "plain file").unwrap();

        let output = textswap(&dir)
            .arg("--storage")
            .arg(blocker.join("storage.redb"))
            .args(["translate", input.as_str(), "--lang", "hi"])
            .output()
            .unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        let html = stdout(&output);
        assert!(html.contains(">मुख्य</a>"));
        assert!(html.contains(r#"placeholder="कुछ पूछें...""#));
        assert!(stderr(&output).contains("hi: 10/10 nodes written, 0 failed"));
        assert!(blocker.is_file());
    }

    #[test]
    fn config_init_and_show() {
        let dir = tempfile::tempdir().unwrap();

        let output = textswap(&dir)
            .args(["config", "init", "custom.toml"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("wrote custom.toml"));
        assert!(dir.path().join("custom.toml").exists());

        let output = textswap(&dir)
            .args(["--config", "custom.toml", "config", "show"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", stderr(&output));
        let shown = stdout(&output);
        assert!(shown.contains("source_lang = \"en\""));
        assert!(shown.contains("target_lang = \"hi\""));
    }

    #[test]
    fn config_env_lists_variables() {
        let dir = tempfile::tempdir().unwrap();

        let output = textswap(&dir).args(["config", "env"]).output().unwrap();

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("- `TEXTSWAP_STORAGE_PATH`"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use super::*;

    #[test]
    fn missing_input_file() {
        let dir = tempfile::tempdir().unwrap();

        let output = textswap(&dir)
            .args(["--no-storage", "translate", "does-not-exist.html"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Error"));
        assert!(stdout(&output).is_empty());
    }

    #[test]
    fn invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bad.toml"),
            "source_lang = \"en\"\ntarget_lang = \"en\"\n",
        )
        .unwrap();

        let output = textswap(&dir)
            .args(["--config", "bad.toml", "config", "show"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Error"));
    }

    #[test]
    fn cache_stats_needs_readable_storage() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "plain file").unwrap();

        let output = textswap(&dir)
            .arg("--storage")
            .arg(blocker.join("storage.redb"))
            .args(["cache", "stats"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Error"));
    }

    #[test]
    fn storage_flags_conflict() {
        let dir = tempfile::tempdir().unwrap();

        let output = textswap(&dir)
            .args(["--no-storage", "--storage", "x.redb", "cache", "stats"])
            .output()
            .unwrap();

        assert!(!output.status.success());
    }
}
