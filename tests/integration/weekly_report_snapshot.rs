use test_support::{init_tracing, insta_settings, report_cmd};

#[test]
fn weekly_report_grouped_by_status_snapshot() {
  init_tracing();

  let out = report_cmd("tickets.json")
    .args([
      "--week",
      "last",
      "--summary-tag",
      "Summary",
      "--clean-pattern",
      r"^\[WIP\]\s*",
      "--clean-pattern",
      r"\s*\(draft\)$",
      "--group-by",
      "status",
      "--sort",
      "id:desc",
      "--stats",
    ])
    .output()
    .unwrap();

  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  insta_settings().bind(|| {
    insta::assert_json_snapshot!("weekly_report", v);
  });
}
