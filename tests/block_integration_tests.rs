use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vnstat_status::block::VnstatBlock;
use vnstat_status::collectors::vnstat::{
    CommandLocator, CommandOutput, CommandRunner, VnstatCollector, VnstatError,
};
use vnstat_status::config::{ModuleConfig, Settings};
use vnstat_status::formatting::Segment;
use vnstat_status::output::to_blocks;

/// Integration tests for the vnstat block
/// A scripted command runner stands in for the vnstat binary

const DAY: &str = "1;eno1;2019-02-04;1000965325;61027123;1061992448;28060;\
                   2019-02;16106127360;1717986918;17824114278;59801;\
                   291411908608;17931402035;309343310643\n";

/// Replays a fixed sequence of outputs, repeating the last one
struct ScriptedRunner {
    outputs: Vec<CommandOutput>,
    calls: Arc<AtomicUsize>,
    args: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    fn new(outputs: Vec<CommandOutput>) -> Self {
        Self {
            outputs,
            calls: Arc::new(AtomicUsize::new(0)),
            args: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, _program: &str, args: &[String]) -> Result<CommandOutput, VnstatError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.args.lock().expect("lock poisoned") = args.to_vec();
        let index = call.min(self.outputs.len() - 1);
        Ok(self.outputs[index].clone())
    }
}

struct AlwaysInstalled;

impl CommandLocator for AlwaysInstalled {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(program))
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        status: "exit status: 0".to_string(),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        status: "exit status: 1".to_string(),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

fn block_with(toml: &str, runner: ScriptedRunner) -> VnstatBlock {
    let settings = Settings::from_toml(toml).expect("config should parse");
    let config = ModuleConfig::normalize(settings, &AlwaysInstalled).expect("config should normalize");
    let collector = VnstatCollector::with_runner(
        config.command.clone(),
        config.interface.clone(),
        Box::new(runner),
    );
    VnstatBlock::new(config, collector)
}

#[tokio::test]
async fn test_default_block_matches_sample_output() {
    let mut block = block_with("", ScriptedRunner::new(vec![ok(DAY)]));

    let before = Utc::now();
    let response = block.refresh().await.expect("refresh should succeed");

    assert_eq!(
        response.full_text,
        vec![
            Segment::new("vnStat ", None),
            Segment::new("954.6 MiB", Some("#00FF00".to_string())),
            Segment::new(" ", None),
            Segment::new("58.2 MiB", Some("#FF0000".to_string())),
            Segment::new(" ", None),
            Segment::new("1.0 GiB", Some("#A9A9A9".to_string())),
        ]
    );
    assert!(response.cached_until >= before + Duration::seconds(180));
    assert!(response.cached_until <= Utc::now() + Duration::seconds(180));
}

#[tokio::test]
async fn test_monthly_and_all_time_templates() {
    let toml = r#"
        format = "[\\?color=darkgray&show monthly] [{monthly_timestamp}] [\\?color=good {monthly_rx} {monthly_rx_unit}] [\\?show all time] {all_time_total} {all_time_total_unit}"
    "#;
    let mut block = block_with(toml, ScriptedRunner::new(vec![ok(DAY)]));
    let response = block.refresh().await.expect("refresh should succeed");

    assert_eq!(
        response.plain_text(),
        "monthly 2019-02 15.0 GiB all time 288.1 GiB"
    );
}

#[tokio::test]
async fn test_threshold_colors_follow_traffic() {
    let toml = r#"
        format = '[\?color=daily_total {daily_total} {daily_total_unit}]'
        thresholds = [[838860800, "degraded"], [943718400, "bad"]]
    "#;
    let quiet = "1;eno1;2019-02-04;100;100;104857600;1\n";
    let busy = "1;eno1;2019-02-04;100;100;880803840;1\n";
    let runner = ScriptedRunner::new(vec![ok(quiet), ok(busy), ok(DAY)]);
    let mut block = block_with(toml, runner);

    let first = block.refresh().await.expect("refresh");
    assert_eq!(first.full_text, vec![Segment::new("100.0 MiB", None)]);

    let second = block.refresh().await.expect("refresh");
    assert_eq!(
        second.full_text,
        vec![Segment::new("840.0 MiB", Some("#FFFF00".to_string()))]
    );

    let third = block.refresh().await.expect("refresh");
    assert_eq!(
        third.full_text,
        vec![Segment::new("1.0 GiB", Some("#FF0000".to_string()))]
    );
}

#[tokio::test]
async fn test_failed_refresh_recovers_on_next_cycle() {
    let runner = ScriptedRunner::new(vec![failed("Error: Unable to open database"), ok(DAY)]);
    let calls = Arc::clone(&runner.calls);
    let mut block = block_with("format = '{daily_rx} {daily_rx_unit}'", runner);

    let err = block.refresh().await.expect_err("first refresh fails");
    let response = block.error_response(&err, Utc::now());
    assert!(response.plain_text().starts_with("vnstat: "));
    assert!(response.plain_text().contains("Unable to open database"));

    let response = block.refresh().await.expect("second refresh succeeds");
    assert_eq!(response.plain_text(), "954.6 MiB");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_error_line_with_success_status_is_an_error() {
    // vnstat reports database problems on stdout and can still exit with 0
    let runner = ScriptedRunner::new(vec![ok("Error: Unable to open database \"/var/lib/vnstat/eno1\".\n"), ok(DAY)]);
    let mut block = block_with("format = '{daily_rx} {daily_rx_unit}'", runner);

    let err = block.refresh().await.expect_err("error line must not render");
    let response = block.error_response(&err, Utc::now());
    assert!(response.plain_text().starts_with("vnstat: incomplete report"));
    assert!(response.plain_text().contains("Unable to open database"));
    assert_eq!(response.full_text[0].color.as_deref(), Some("#FF0000"));

    let response = block.refresh().await.expect("second refresh succeeds");
    assert_eq!(response.plain_text(), "954.6 MiB");
}

#[tokio::test]
async fn test_interface_is_passed_to_vnstat() {
    let runner = ScriptedRunner::new(vec![ok(DAY)]);
    let args = Arc::clone(&runner.args);
    let mut block = block_with("interface = \"wlan0\"", runner);

    block.refresh().await.expect("refresh");
    assert_eq!(
        *args.lock().expect("lock poisoned"),
        vec!["--oneline", "b", "-i", "wlan0"]
    );
}

#[tokio::test]
async fn test_legacy_configuration_end_to_end() {
    let toml = r#"
        format = "{down}/{up} {total} {total_unit}"
        statistics_type = "d"
        [coloring]
        800 = "degraded"
        1000 = "bad"
    "#;
    let mut block = block_with(toml, ScriptedRunner::new(vec![ok(DAY)]));
    let response = block.refresh().await.expect("refresh");

    assert_eq!(response.plain_text(), "954.6/58.2 1.0 GiB");
    // 1061992448 bytes is about 1012.8 MiB
    assert_eq!(response.color.as_deref(), Some("#FF0000"));

    let blocks = to_blocks("vnstat", &response);
    assert!(blocks.iter().all(|b| b.color.as_deref() == Some("#FF0000")));
}

#[test]
fn test_missing_vnstat_fails_at_startup() {
    struct NotFound;
    impl CommandLocator for NotFound {
        fn locate(&self, _program: &str) -> Option<PathBuf> {
            None
        }
    }

    let err = ModuleConfig::normalize(Settings::default(), &NotFound)
        .expect_err("normalize should fail");
    assert_eq!(err.to_string(), "not installed");
}
