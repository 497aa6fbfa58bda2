use assert_cmd::Command;
use std::fs;

const OUTLINE: &str = "# Trip\n  - Packing\n    - Passport\n  - Route\n";

fn cli() -> Command {
    Command::cargo_bin("onelook-cli").expect("onelook-cli binary")
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("run onelook-cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn layout_prints_nodes_connectors_and_bounds() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("trip.md");
    fs::write(&input, OUTLINE).expect("write input");

    let value = stdout_json(cli().args([
        "layout",
        "--algorithm",
        "tree",
        "--connector",
        "straight",
        "--center-x",
        "500",
        input.to_string_lossy().as_ref(),
    ]));
    let nodes = value["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0]["x"], 500.0);
    assert_eq!(value["connectors"].as_array().expect("connectors").len(), 3);
    assert!(value["bounds"]["min_x"].is_number());
}

#[test]
fn layout_reads_json_from_stdin_with_inline_config() {
    let doc = serde_json::json!({
        "id": "d", "name": "n",
        "root": { "id": "r", "text": "Root", "children": [
            { "id": "a", "text": "A", "children": [] }
        ]}
    });
    let value = stdout_json(
        cli()
            .args(["layout", "--config", r#"{"horizontalGap": 100}"#, "-"])
            .write_stdin(serde_json::to_vec(&doc).expect("json")),
    );
    let nodes = value["nodes"].as_array().expect("nodes");
    let (root, a) = (&nodes[0], &nodes[1]);
    let root_right = root["x"].as_f64().unwrap() + root["width"].as_f64().unwrap() / 2.0;
    let a_left = a["x"].as_f64().unwrap() - a["width"].as_f64().unwrap() / 2.0;
    assert_eq!(a_left - root_right, 100.0);
}

#[test]
fn convert_markdown_to_opml_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("trip.md");
    let out = tmp.path().join("trip.opml");
    fs::write(&input, OUTLINE).expect("write input");

    cli()
        .args([
            "convert",
            "--to",
            "opml",
            "--out",
            out.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let opml = fs::read_to_string(&out).expect("read output");
    assert!(opml.contains("<title>Trip</title>"));
    assert!(opml.contains("<outline text=\"Passport\"/>"));
}

#[test]
fn convert_to_xmind_and_back() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("trip.md");
    let xmind = tmp.path().join("trip.xmind");
    fs::write(&input, OUTLINE).expect("write input");

    cli()
        .args([
            "convert",
            "--to",
            "xmind",
            "--out",
            xmind.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let info = stdout_json(cli().args(["info", xmind.to_string_lossy().as_ref()]));
    assert_eq!(info["name"], "Trip");
    assert_eq!(info["format"], "XMind");
    assert_eq!(info["nodes"], 4);
    assert_eq!(info["depth"], 2);
    assert_eq!(info["layout"], "mind");
}

#[test]
fn validate_reports_errors_with_exit_code() {
    cli()
        .args(["validate", "--from", "json", "-"])
        .write_stdin(r#"{"id":"d","name":"n","root":{"id":"r","children":[]}}"#)
        .assert()
        .failure()
        .code(1);

    let output = cli()
        .args(["validate", "--from", "markdown"])
        .write_stdin(OUTLINE)
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("ok: 4 nodes"));
}

#[test]
fn bad_arguments_print_usage() {
    cli().args(["convert", "x.md"]).assert().failure().code(2);
    cli().args(["layout", "--algorithm"]).assert().failure().code(2);
    cli().args(["layout", "--pretty", "--bogus"]).assert().failure().code(2);
}

#[test]
fn invalid_option_values_are_runtime_errors() {
    for args in [
        ["layout", "--algorithm", "radial"],
        ["layout", "--connector", "wavy"],
        ["layout", "--direction", "up"],
        ["layout", "--center-x", "NaN"],
    ] {
        let output = cli().args(args).output().expect("run");
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(args[2]), "{args:?}: {stderr}");
    }
}

#[test]
fn unknown_formats_are_runtime_errors() {
    let output = cli()
        .args(["convert", "--to", "docx", "-"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("docx"), "stderr: {stderr}");
    assert!(!stderr.contains("USAGE"), "stderr: {stderr}");

    cli()
        .args(["validate", "--from", "yaml", "-"])
        .write_stdin("{}")
        .assert()
        .failure()
        .code(1);
}
