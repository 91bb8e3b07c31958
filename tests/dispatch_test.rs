use std::fs;
use std::path::Path;
use std::sync::Mutex;

use model_batch::orchestrator::dispatch;
use model_batch::sources::BatchFileSource;
use model_batch::{
    App, Candidate, Config, ItemFlow, KeyPattern, Ledger, Result, RunLog, SuccessPolicy, Worker,
    WorkerOutput,
};

/// 记录调用过的链接；链接包含 `fail_marker` 时往 stderr 写内容
struct FakeWorker {
    fail_marker: Option<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeWorker {
    fn succeeding() -> Self {
        Self {
            fail_marker: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_marker: Some(marker),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Worker for FakeWorker {
    async fn run(&self, reference: &str) -> Result<WorkerOutput> {
        self.calls.lock().unwrap().push(reference.to_string());
        let failed = self.fail_marker.is_some_and(|m| reference.contains(m));
        Ok(WorkerOutput {
            stdout: format!("saved {}", reference).into_bytes(),
            stderr: if failed {
                b"Error: HTTP 403".to_vec()
            } else {
                Vec::new()
            },
            exit_code: Some(0),
        })
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        ledger_file: dir.join("extracted_ids.txt"),
        batch_file: dir.join("Needdownload.txt"),
        run_log_file: dir.join("Needdownload.log"),
        ..Config::default()
    }
}

#[tokio::test]
async fn only_unprocessed_keys_reach_the_worker() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(
        &config.ledger_file,
        "42\t[PROCESSED_FROM_LINK]:http://x/models/42\n",
    )
    .unwrap();
    fs::write(&config.batch_file, "http://x/models/42\nhttp://x/models/99\n").unwrap();

    let app = App::new(config.clone());
    let flow = ItemFlow::new(FakeWorker::succeeding(), SuccessPolicy::StderrEmpty);
    let stats = app
        .run_with(&BatchFileSource::new(&config.batch_file), &flow)
        .await
        .unwrap();

    assert_eq!(stats.total, 1);
    assert_eq!(stats.fault, 0);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.skipped_processed, 1);
    assert_eq!(
        fs::read_to_string(&config.ledger_file).unwrap(),
        "42\t[PROCESSED_FROM_LINK]:http://x/models/42\n\
         99\t[PROCESSED_FROM_LINK]:http://x/models/99\n"
    );
}

#[tokio::test]
async fn failed_download_is_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(
        &config.batch_file,
        "# comment\nhttp://x/models/1\nhttp://x/models/2\nhttp://x/gallery\n",
    )
    .unwrap();

    let app = App::new(config.clone());
    let worker = FakeWorker::failing_on("/models/2");
    let flow = ItemFlow::new(worker, SuccessPolicy::StderrEmpty);
    let stats = app
        .run_with(&BatchFileSource::new(&config.batch_file), &flow)
        .await
        .unwrap();

    assert_eq!(stats.total, 2);
    assert_eq!(stats.fault, 1);
    assert_eq!(stats.skipped_no_key, 1);

    let ledger = fs::read_to_string(&config.ledger_file).unwrap();
    assert!(ledger.contains("1\t"));
    assert!(!ledger.contains("2\t"));

    let log = fs::read_to_string(&config.run_log_file).unwrap();
    assert_eq!(log.matches("---------------------NEW LINK").count(), 2);
    assert!(log.contains("Error: HTTP 403"));
}

#[tokio::test]
async fn second_run_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(
        &config.batch_file,
        "http://x/models/1\nhttp://x/models/2\nhttp://x/models/1\n",
    )
    .unwrap();

    let app = App::new(config.clone());
    let source = BatchFileSource::new(&config.batch_file);

    let first = ItemFlow::new(FakeWorker::succeeding(), SuccessPolicy::StderrEmpty);
    let stats = app.run_with(&source, &first).await.unwrap();
    assert_eq!(stats.total, 2);
    // 同一次运行内重复的 ID 也会跳过
    assert_eq!(stats.skipped_processed, 1);

    let second = ItemFlow::new(FakeWorker::succeeding(), SuccessPolicy::StderrEmpty);
    let stats = app.run_with(&source, &second).await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.skipped_processed, 3);
}

#[tokio::test]
async fn unwritable_ledger_still_counts_success_for_this_run() {
    let dir = tempfile::tempdir().unwrap();
    // 账本路径是目录，追加写入必然失败
    let ledger_dir = dir.path().join("ledger_is_a_dir");
    fs::create_dir_all(&ledger_dir).unwrap();
    let mut ledger = Ledger::empty(&ledger_dir);
    let mut run_log = RunLog::create(dir.path().join("Needdownload.log")).unwrap();

    let candidates = ["http://x/models/7", "http://x/models/7"]
        .into_iter()
        .map(|link| Candidate::from_reference(link, KeyPattern::model_url()));
    let flow = ItemFlow::new(FakeWorker::succeeding(), SuccessPolicy::StderrEmpty);

    let stats = dispatch(candidates, &flow, &mut ledger, &mut run_log).await;

    assert_eq!(stats.total, 1);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.fault, 0);
    assert_eq!(stats.skipped_processed, 1);
    assert!(ledger.contains("7"));
    assert!(ledger_dir.is_dir());
}

#[tokio::test]
async fn exit_status_policy_accepts_noisy_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(&config.batch_file, "http://x/models/5\n").unwrap();

    let app = App::new(config.clone());
    let flow = ItemFlow::new(FakeWorker::failing_on("/models/5"), SuccessPolicy::ExitStatus);
    let stats = app
        .run_with(&BatchFileSource::new(&config.batch_file), &flow)
        .await
        .unwrap();

    assert_eq!(stats.success, 1);
    assert!(fs::read_to_string(&config.ledger_file)
        .unwrap()
        .starts_with("5\t"));
}

#[tokio::test]
async fn missing_batch_file_aborts_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let worker = FakeWorker::succeeding();
    let flow = ItemFlow::new(worker, SuccessPolicy::StderrEmpty);

    let result = App::new(config.clone())
        .run_with(&BatchFileSource::new(&config.batch_file), &flow)
        .await;

    assert!(result.is_err());
    assert!(!config.run_log_file.exists());
    assert!(!config.ledger_file.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn shell_worker_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.worker_program = "sh".to_string();
    config.worker_args = vec![
        "-c".to_string(),
        r#"case "$1" in *99) echo "cannot fetch $1" >&2 ;; *) echo "ok $1" ;; esac"#.to_string(),
        "worker".to_string(),
    ];
    fs::write(&config.batch_file, "http://x/models/10\nhttp://x/models/99\n").unwrap();

    let stats = App::new(config.clone()).run_batch().await.unwrap();

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.fault, 1);
    assert_eq!(
        fs::read_to_string(&config.ledger_file).unwrap(),
        "10\t[PROCESSED_FROM_LINK]:http://x/models/10\n"
    );
    let log = fs::read_to_string(&config.run_log_file).unwrap();
    assert!(log.contains("ok http://x/models/10"));
    assert!(log.contains("cannot fetch http://x/models/99"));
}
