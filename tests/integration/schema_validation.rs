use jsonschema::validator_for;
use test_support::{read_schema, report_cmd};

fn compile_schema(name: &str) -> jsonschema::Validator {
  let schema = read_schema(name);
  validator_for(&schema).expect("compile schema")
}

fn report(args: &[&str]) -> serde_json::Value {
  let out = report_cmd("tickets.json").args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn forest_report_conforms_to_schema() {
  let v = report(&["--week", "last", "--mode", "full"]);
  let compiled = compile_schema("ticket-activity-report.report.schema.json");
  compiled.validate(&v).expect("schema validation failed for forest report");
}

#[test]
fn arranged_tags_report_with_stats_conforms_to_schema() {
  let v = report(&[
    "--week",
    "last",
    "--mode",
    "tags",
    "--tags",
    "Progress:2,Summary",
    "--include-comments",
    "--comments",
    "n:2",
    "--group-by",
    "tracker",
    "--sort",
    "priority",
    "--stats",
  ]);
  let compiled = compile_schema("ticket-activity-report.report.schema.json");
  compiled.validate(&v).expect("schema validation failed for arranged report");
}

#[test]
fn empty_report_conforms_to_schema() {
  let v = report(&["--week", "2024-1"]);
  assert_eq!(v["summary"]["ticket_count"], 0);
  let compiled = compile_schema("ticket-activity-report.report.schema.json");
  compiled.validate(&v).expect("schema validation failed for empty report");
}
