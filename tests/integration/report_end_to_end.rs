use serde_json::Value;
use test_support::{cmd_bin, fixture_path, read_fixture_json, read_fixture_text, report_cmd, tempdir, BIN, NOW};

fn run(args: &[&str]) -> Value {
  let out = report_cmd("tickets.json").args(args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

fn ids(v: &Value) -> Vec<u64> {
  v.as_array().unwrap().iter().map(|t| t["id"].as_u64().unwrap()).collect()
}

#[test]
fn last_week_builds_forest_with_pseudo_roots() {
  let v = run(&["--week", "last"]);
  assert_eq!(ids(&v["tickets"]), vec![100, 102, 103, 105]);
  assert_eq!(ids(&v["tickets"][0]["children"]), vec![101]);
  assert_eq!(v["summary"]["ticket_count"], 5);
  assert_eq!(v["summary"]["root_count"], 4);
  assert_eq!(v["summary"]["range"]["start"], "2025-01-06T00:00:00+09:00");
  assert_eq!(v["summary"]["range"]["end"], "2025-01-12T23:59:59+09:00");
}

#[test]
fn numbered_week_uses_majority_rule() {
  // week 2 of 2025 is the same Monday-start window as "last" from the pinned clock
  let v = run(&["--week", "2025-2"]);
  assert_eq!(v["summary"]["range"]["start"], "2025-01-06T00:00:00+09:00");
  assert_eq!(ids(&v["tickets"]), vec![100, 102, 103, 105]);
}

#[test]
fn since_until_select_by_due_date() {
  let v = run(&["--date-field", "due_date", "--since", "2025-01-14", "--until", "2025-01-16"]);
  // 101 is due inside the range but its parent is not; it becomes a pseudo-root
  assert_eq!(ids(&v["tickets"]), vec![101, 105]);
}

#[test]
fn summary_mode_omits_long_fields() {
  let v = run(&["--week", "last", "--summary-tag", "Summary", "--clean-pattern", r"^\[WIP\]\s*"]);
  let gateway = &v["tickets"][0];
  assert_eq!(gateway["cleaned_subject"], "Payment gateway");
  assert_eq!(gateway["summary"], "Integrate gateway");
  assert!(gateway.get("description").is_none());
  assert!(gateway.get("comments").is_none());
}

#[test]
fn full_mode_keeps_selected_comments() {
  let v = run(&["--week", "last", "--mode", "full", "--comments", "n:2"]);
  let notes: Vec<u64> = ids(&v["tickets"][0]["comments"]);
  assert_eq!(notes, vec![1, 3]);
  assert!(v["tickets"][0]["description"].as_str().unwrap().contains("[Progress]"));
}

#[test]
fn tags_mode_extracts_newest_first_and_caps_by_comment_count() {
  let v = run(&["--week", "last", "--mode", "tags", "--tags", "Progress,Summary", "--include-comments", "--comments", "n:2"]);
  let tags = &v["tickets"][0]["extracted_tags"];
  assert_eq!(tags["Progress"], serde_json::json!(["refund flow", "sandbox tests"]));
  assert_eq!(tags["Summary"], serde_json::json!(["Integrate gateway"]));
  let rules = &v["summary"]["options"]["tags"];
  assert_eq!(rules[0]["limit"], 2);
}

#[test]
fn prefer_comments_reads_latest_comment() {
  let v = run(&["--week", "last", "--mode", "tags", "--tags", "Progress", "--prefer-comments"]);
  // without --include-comments only the latest comment stands in for the description
  assert_eq!(
    v["tickets"][0]["extracted_tags"]["Progress"],
    serde_json::json!(["refund flow", "sandbox tests"])
  );
  assert_eq!(v["tickets"][0]["children"][0]["extracted_tags"]["Progress"], serde_json::json!(["schema drafted"]));
}

#[test]
fn sort_by_due_date_flattens_and_puts_missing_last() {
  let v = run(&["--week", "last", "--sort", "due_date"]);
  assert_eq!(ids(&v["tickets"]), vec![103, 101, 105, 100, 102]);
  assert!(v["tickets"].as_array().unwrap().iter().all(|t| t.get("children").is_none()));
  assert!(v.get("groups").is_none());
}

#[test]
fn group_by_assignee_keeps_first_seen_buckets() {
  let v = run(&["--week", "last", "--group-by", "assignee"]);
  let keys: Vec<&str> = v["groups"].as_array().unwrap().iter().map(|g| g["key"].as_str().unwrap()).collect();
  assert_eq!(keys, vec!["Sato", "Suzuki", "unassigned"]);
  assert_eq!(v["groups"][0]["ticket_ids"], serde_json::json!([100, 103]));
  assert_eq!(ids(&v["tickets"]), vec![100, 103, 101, 102, 105]);
}

#[test]
fn comments_since_start_keeps_in_range_comments() {
  let v = run(&["--week", "this", "--date-field", "created_on", "--mode", "full", "--comments-since", "start"]);
  // nothing was created this week
  assert_eq!(v["summary"]["ticket_count"], 0);
  let v = run(&["--week", "last", "--mode", "full", "--comments-since", "2025-01-09", "--comments-by", "Sato"]);
  assert_eq!(ids(&v["tickets"][0]["comments"]), vec![3]);
  assert_eq!(v["summary"]["options"]["comments_since"], "2025-01-09T00:00:00+09:00");
}

#[test]
fn stats_block_is_optional() {
  let v = run(&["--week", "last"]);
  assert!(v.get("stats").is_none());
  let v = run(&["--week", "last", "--stats"]);
  let stats = &v["stats"];
  assert_eq!(stats["total"], 5);
  assert_eq!(stats["closed"], 1);
  assert_eq!(stats["overdue_ids"], serde_json::json!([101]));
  assert_eq!(stats["by_status"]["In Progress"], 2);
  assert_eq!(stats["comments"]["by_author"]["Sato"], 2);
}

#[test]
fn without_a_range_every_ticket_is_reported() {
  let dump: Value = read_fixture_json("tickets.json");
  let v = run(&[]);
  assert_eq!(v["summary"]["ticket_count"], dump["issues"].as_array().unwrap().len());
  // 105 hangs under 104 once the old parent is part of the batch
  assert_eq!(ids(&v["tickets"]), vec![100, 102, 103, 104]);
  assert_eq!(ids(&v["tickets"][3]["children"]), vec![105]);
  assert!(v["summary"].get("range").is_none());
}

#[test]
fn reads_bare_array_from_stdin() {
  let dump: Value = serde_json::from_str(&read_fixture_text("tickets.json")).unwrap();
  let bare = serde_json::to_string(&dump["issues"]).unwrap();
  let out = cmd_bin(BIN)
    .args(["--input", "-", "--now-override", NOW, "--week", "last"])
    .write_stdin(bare)
    .output()
    .unwrap();
  assert!(out.status.success());
  let v: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["summary"]["ticket_count"], 5);
}

#[test]
fn writes_out_file_when_not_empty() {
  let td = tempdir();
  let target = td.path().join("reports/week.json");
  let out = report_cmd("tickets.json")
    .args(["--week", "last", "--out", target.to_str().unwrap()])
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(out.stdout.is_empty());
  let v: Value = serde_json::from_slice(&std::fs::read(&target).unwrap()).unwrap();
  assert_eq!(v["summary"]["ticket_count"], 5);
}

#[test]
fn empty_report_prints_instead_of_writing() {
  let td = tempdir();
  let target = td.path().join("week.json");
  let out = cmd_bin(BIN)
    .args(["--input", &fixture_path("tickets.json"), "--now-override", "2030-01-01T00:00:00Z", "--week", "last"])
    .args(["--out", target.to_str().unwrap()])
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(!target.exists());
  let v: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["summary"]["ticket_count"], 0);
  assert_eq!(v["tickets"], serde_json::json!([]));
}
