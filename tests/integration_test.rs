mod common;

use std::sync::Arc;

use common::{scratch_dir, EchoBackend, Reply, ScriptedBackend};
use homework_grader::orchestrator::grade_image;
use homework_grader::services::EXTRACTION_PROMPT;
use homework_grader::{
    App, Config, GradeError, GradingFlow, GradingPolicy, GradingStats, HomeworkImage, ModelError,
    PendingRequest, Stage,
};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_extraction_failure_skips_assessment() {
    let extraction = ScriptedBackend::new(vec![Reply::Fail("vision model crashed")]);
    let assessment = ScriptedBackend::new(vec![Reply::Text("The answer is correct. score: 9")]);
    let flow = GradingFlow::with_backends(extraction.clone(), assessment.clone(), GradingPolicy::default());

    let mut request = PendingRequest::new("hw1.png", b"image-bytes");
    let err = assert_err!(flow.grade_request(&mut request).await);

    assert!(matches!(err, GradeError::ExtractionFailed(ModelError::Backend { .. })));
    assert_eq!(err.stage(), Stage::Extracting);
    assert_eq!(request.stage(), Stage::Failed);
    assert_eq!(extraction.calls().len(), 1);
    assert!(assessment.calls().is_empty(), "assessor must not be invoked");
}

#[tokio::test]
async fn test_assessment_failure_is_attributed_to_assessing() {
    let backend = ScriptedBackend::new(vec![
        Reply::Text("x = 4"),
        Reply::Fail("context length exceeded"),
    ]);
    let flow = GradingFlow::new(backend.clone(), GradingPolicy::default());

    let mut request = PendingRequest::new("hw2.png", b"image-bytes");
    let err = assert_err!(flow.grade_request(&mut request).await);

    assert!(matches!(err, GradeError::AssessmentFailed(_)));
    assert_eq!(err.stage(), Stage::Assessing);
    assert_eq!(request.stage(), Stage::Failed);
    assert!(err.to_string().contains("context length exceeded"));
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_full_flow_builds_grade_record() {
    let backend = ScriptedBackend::new(vec![
        Reply::Text("  Solve: 2x + 5 = 13\nSolution: x = 4 \n\n"),
        Reply::Text("The answer is correct. score: 9"),
    ]);
    let flow = GradingFlow::new(backend.clone(), GradingPolicy::default());

    let mut request = PendingRequest::new("hw3.png", b"\x89PNG");
    let record = assert_ok!(flow.grade_request(&mut request).await);

    assert_eq!(request.stage(), Stage::Done);
    assert_eq!(record.extracted_text(), "Solve: 2x + 5 = 13\nSolution: x = 4");
    assert!(record.is_correct());
    assert_eq!(record.score(), 9);
    assert_eq!(record.max_score(), 10);
    assert_eq!(record.confidence(), 0.5);
    assert_eq!(record.feedback(), "The answer is correct. score: 9");

    let calls = backend.calls();
    assert_eq!(calls[0].prompt, EXTRACTION_PROMPT);
    assert_eq!(calls[0].image.as_deref(), Some(&b"\x89PNG"[..]));
    assert!(calls[1].image.is_none());
    assert!(calls[1].prompt.contains("Solve: 2x + 5 = 13\nSolution: x = 4"));
    assert!(calls[1].prompt.contains("out of 10"));
}

#[tokio::test]
async fn test_blank_extraction_is_still_assessed() {
    let backend = ScriptedBackend::new(vec![
        Reply::Text("   \n  "),
        Reply::Text("There is no work to evaluate. Score: 0/10"),
    ]);
    let flow = GradingFlow::new(backend.clone(), GradingPolicy::default());

    let record = assert_ok!(flow.grade_homework(b"blank page").await);

    assert_eq!(record.extracted_text(), "");
    assert!(!record.is_correct());
    assert_eq!(record.score(), 0);
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_unparseable_assessment_degrades_to_defaults() {
    let backend = ScriptedBackend::new(vec![
        Reply::Text("y = mx + b"),
        Reply::Text("I cannot tell what this is supposed to show."),
    ]);
    let flow = GradingFlow::new(backend, GradingPolicy::default());

    let record = assert_ok!(flow.grade_homework(b"img").await);

    assert!(!record.is_correct());
    assert_eq!(record.score(), 0);
    assert_eq!(record.confidence(), 0.5);
    assert_eq!(record.feedback(), "I cannot tell what this is supposed to show.");
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let flow = Arc::new(GradingFlow::new(Arc::new(EchoBackend), GradingPolicy::default()));

    let images: Vec<Vec<u8>> = (0..=10).map(|n| n.to_string().into_bytes()).collect();
    let results = futures::future::join_all(images.iter().map(|image| {
        let flow = flow.clone();
        async move { flow.grade_homework(image).await }
    }))
    .await;

    for (n, result) in results.into_iter().enumerate() {
        let record = assert_ok!(result);
        assert_eq!(record.extracted_text(), n.to_string());
        assert_eq!(record.score() as usize, n);
        assert_eq!(record.is_correct(), n >= 7);
        assert_eq!(record.feedback(), "echoed");
    }
}

#[tokio::test]
async fn test_unwritable_result_file_keeps_grade() {
    let dir = scratch_dir("unwritable");
    // 父目录不存在，追加结果时打开文件必然失败
    let log_path = dir.join("missing").join("results.txt");

    let backend = ScriptedBackend::new(vec![
        Reply::Text("x = 4"),
        Reply::Text("The answer is correct. score: 8"),
    ]);
    let flow = GradingFlow::new(backend, GradingPolicy::default());
    let image = HomeworkImage::new("hw.png", b"img".to_vec());

    let record = assert_ok!(grade_image(&flow, &image, 1, log_path.to_str().unwrap()).await);

    assert!(record.is_correct());
    assert_eq!(record.score(), 8);
    assert!(!log_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_batch_run_writes_results_and_stats() {
    let dir = scratch_dir("batch");
    let images = dir.join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("a.png"), "8").unwrap();
    std::fs::write(images.join("b.jpg"), "3").unwrap();
    std::fs::write(images.join("c.png"), "fail").unwrap();
    std::fs::write(images.join("notes.txt"), "9").unwrap();

    let output = dir.join("results.txt");
    let config = Config {
        image_folder: images.to_string_lossy().to_string(),
        output_log_file: output.to_string_lossy().to_string(),
        max_concurrent: 2,
        ..Config::default()
    };

    let flow = GradingFlow::new(Arc::new(EchoBackend), config.grading_policy());
    let app = assert_ok!(App::with_flow(config, flow));
    let stats = assert_ok!(app.run().await);

    assert_eq!(
        stats,
        GradingStats {
            total: 3,
            success: 2,
            failed: 1,
            passed: 1,
            cancelled: 0,
        }
    );

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    let graded = lines.iter().find(|v| v["image"] == "a.png").unwrap();
    assert_eq!(graded["result"]["ocr_text"], "8");
    assert_eq!(graded["result"]["evaluation"]["partial_points"], 8);
    assert_eq!(graded["result"]["evaluation"]["correct"], true);

    let failed = lines.iter().find(|v| v["image"] == "c.png").unwrap();
    assert_eq!(failed["stage"], "extracting");
    assert!(failed["error"].as_str().unwrap().contains("model is loading"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_batch_run_with_no_images() {
    let dir = scratch_dir("empty_batch");
    let config = Config {
        image_folder: dir.to_string_lossy().to_string(),
        output_log_file: dir.join("results.txt").to_string_lossy().to_string(),
        ..Config::default()
    };

    let flow = GradingFlow::new(Arc::new(EchoBackend), config.grading_policy());
    let app = assert_ok!(App::with_flow(config, flow));
    let stats = assert_ok!(app.run().await);

    assert_eq!(stats, GradingStats::default());

    let _ = std::fs::remove_dir_all(&dir);
}

/// 需要本地推理后端和一张作业图片：
/// HOMEWORK_IMAGE=path/to/hw.png cargo test test_live_grading -- --ignored --nocapture
#[tokio::test]
#[ignore]
async fn test_live_grading() {
    homework_grader::utils::logging::init(true);

    let config = Config::from_env();
    let path = std::env::var("HOMEWORK_IMAGE").expect("需要设置 HOMEWORK_IMAGE");
    let image = homework_grader::models::load_image(std::path::Path::new(&path))
        .await
        .expect("加载图片失败");

    let flow = GradingFlow::from_config(&config).expect("创建批改流程失败");
    let record = flow.grade_homework(image.bytes()).await.expect("批改失败");

    println!("{}", serde_json::to_string_pretty(&record).unwrap());
    assert!(record.score() <= record.max_score());
}
