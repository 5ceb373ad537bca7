//! End-to-end runs of the command against files in a temporary working
//! directory.

use clap::Parser;
use rollup_confgen_cli::cli::Args;
use rollup_confgen_cli::error::CliError;
use rollup_confgen_cli::run;
use rstest::rstest;
use serde_json::{Value, json};

const PACKAGE: &str = r#"{"name": "@acme/tool", "bin": "bin/tool.js", "dependencies": {"chalk": "^5"}}"#;

fn run_in_jail(flags: &[&str], node_env: Option<&str>) -> Result<Value, CliError> {
    let args = Args::try_parse_from(std::iter::once("rollup-confgen").chain(flags.iter().copied()))
        .expect("valid flags");
    let mut out = Vec::new();
    run(&args, node_env, &mut out)?;
    Ok(serde_json::from_slice(&out).expect("command prints JSON"))
}

#[rstest]
fn cli_documents_print_one_config() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("package.json", PACKAGE)?;
        jail.create_file(
            "build.json",
            r#"{"type": "cli", "input": "src/cli.js", "output": {"file": "bin/tool.js"}}"#,
        )?;
        let printed = run_in_jail(&["--config", "build.json"], Some("production"))
            .map_err(|err| err.to_string())?;

        assert_eq!(printed["input"], json!("src/cli.js"));
        assert_eq!(printed["external"], json!(["chalk"]));
        assert_eq!(printed["output"]["format"], json!("cjs"));
        assert_eq!(printed["output"]["file"], json!("bin/tool.js"));
        assert_eq!(printed["output"]["compact"], json!(true));
        let stages: Vec<_> = printed["plugins"]
            .as_array()
            .expect("plugins array")
            .iter()
            .map(|stage| stage["name"].clone())
            .collect();
        assert_eq!(stages, [json!("node-resolve"), json!("commonjs"), json!("babel"), json!("terser")]);
        assert!(printed.get("type").is_none());
        Ok(())
    });
}

#[rstest]
fn project_documents_and_settings_combine() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file(
            "project.json",
            r#"{
                "configs": [{"type": "iife", "input": "src/widget.js"}],
                "options": {"output_dir": "public"},
                "globals": {"iife": {"name": "Widget"}}
            }"#,
        )?;
        jail.create_file("rollup-confgen.toml", "config = \"project.json\"\nno_package = true")?;
        jail.set_env("ROLLUP_CONFGEN_OUTPUT_DIR", "static");
        let printed = run_in_jail(&["--compact"], None).map_err(|err| err.to_string())?;

        let configs = printed.as_array().expect("two variants");
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0]["output"]["file"], json!("static/iife/widget.js"));
        assert_eq!(configs[1]["output"]["file"], json!("static/iife/widget.legacy.js"));
        assert_eq!(configs[0]["output"]["name"], json!("Widget"));
        assert!(configs[0]["output"].get("banner").is_none());
        Ok(())
    });
}

#[rstest]
fn globals_files_replace_document_globals() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file(
            "project.json",
            r#"{"configs": {"input": "src/a.js"}, "globals": {"esm": {"name": "FromDocument"}}}"#,
        )?;
        jail.create_file("globals.json", r#"{"esm": {"name": "FromFile"}}"#)?;
        let printed = run_in_jail(
            &["--config", "project.json", "--globals", "globals.json", "--no-package"],
            None,
        )
        .map_err(|err| err.to_string())?;
        assert_eq!(printed["output"]["name"], json!("FromFile"));
        assert_eq!(printed["output"]["sourcemap"], json!(true));
        Ok(())
    });
}

#[rstest]
fn missing_config_is_reported() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        let err = run_in_jail(&[], None).expect_err("no config given");
        assert!(matches!(err, CliError::MissingConfig));
        Ok(())
    });
}

#[rstest]
fn missing_package_fails_generation() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("build.json", r#"{"input": "src/a.js"}"#)?;
        let err = run_in_jail(&["--config", "build.json"], None).expect_err("no package.json");
        assert!(err.to_string().starts_with("package descriptor error"), "{err}");
        Ok(())
    });
}

#[rstest]
fn invalid_json_names_the_file() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("build.json", "{ not json")?;
        let err = run_in_jail(&["--config", "build.json", "--no-package"], None)
            .expect_err("invalid JSON");
        assert!(matches!(&err, CliError::Json { path, .. } if path == "build.json"), "{err}");
        Ok(())
    });
}
