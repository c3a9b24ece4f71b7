use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn command_with_inputs(dir: &TempDir) -> Command {
    let drugs = write(
        dir,
        "drugs.csv",
        "atccode,drug\nA01,Aspirin\nA02,Ibuprofen\nA03,Paracetamol\n",
    );
    let pubmed_csv = write(
        dir,
        "pubmed.csv",
        "id,title,date,journal\n1,aspirin for headache,2020-01-01,Journal A\n",
    );
    let pubmed_json = write(
        dir,
        "pubmed.json",
        r#"[
  {"id": 2, "title": "ibuprofen benefits", "date": "2020-01-02", "journal": "Journal B"}
]"#,
    );
    let clinical_trials = write(
        dir,
        "clinical_trials.csv",
        "id,scientific_title,date,journal\n1,paracetamol in flu treatment,2020-01-03,Journal C\n",
    );

    let mut cmd = Command::cargo_bin("drug-mentions").unwrap();
    cmd.current_dir(dir.path())
        .env("DRUG_MENTIONS_LOG", "off")
        .args(["--drugs", &drugs])
        .args(["--pubmed_csv", &pubmed_csv])
        .args(["--pubmed_json", &pubmed_json])
        .args(["--clinical_trials", &clinical_trials]);
    cmd
}

#[test]
fn test_writes_default_output_file() {
    let dir = TempDir::new().unwrap();
    command_with_inputs(&dir).assert().success();

    let document = fs::read_to_string(dir.path().join("drug_mentions_graph.json")).unwrap();
    let graph: Value = serde_json::from_str(&document).unwrap();
    assert_eq!(graph.as_object().unwrap().len(), 3);
    assert_eq!(
        graph["paracetamol"]["journals"]["Journal C"][0]["source"],
        "Clinical Trial"
    );
    assert_eq!(graph["ibuprofen"]["journals"]["Journal B"][0]["date"], "2020-01-02");
}

#[test]
fn test_output_flag_and_parallel() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("graph.json");
    command_with_inputs(&dir)
        .arg("--parallel")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
    assert!(!dir.path().join("drug_mentions_graph.json").exists());
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let mut cmd = command_with_inputs(&dir);
    fs::remove_file(dir.path().join("drugs.csv")).unwrap();

    cmd.assert().failure();
    assert!(!dir.path().join("drug_mentions_graph.json").exists());
}

#[test]
fn test_required_flags() {
    Command::cargo_bin("drug-mentions")
        .unwrap()
        .args(["--drugs", "drugs.csv"])
        .assert()
        .failure();
}
