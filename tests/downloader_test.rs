// tests/downloader_test.rs

mod common;

use common::mock_client;
use smartedu_dl::{
    downloader,
    error::AppResult,
    models::{DownloadStatus, ResourceEntry},
};
use std::{
    collections::BTreeSet,
    fs,
    sync::{Arc, atomic::AtomicBool},
};

fn entry(name: &str, url: &str) -> ResourceEntry {
    ResourceEntry {
        name: name.to_string(),
        download_url: url.to_string(),
        original_url: url.to_string(),
        config_url: "https://s-file-1.ykt.cbern.com.cn/details/X.json".to_string(),
        source_url: "https://basic.smartedu.cn/tchMaterial/detail?contentId=X".to_string(),
    }
}

fn not_cancelled() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[tokio::test]
async fn test_http_error_is_recorded_without_leaving_file() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let missing = server
        .mock("GET", "/files/missing.pdf")
        .with_status(404)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/files/ok.pdf")
        .with_status(200)
        .with_body("content")
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let entries = vec![
        entry("missing.pdf", &format!("{base}/files/missing.pdf")),
        entry("ok.pdf", &format!("{base}/files/ok.pdf")),
    ];
    let results =
        downloader::download_all(mock_client(&base), &entries, dir.path(), not_cancelled()).await?;

    missing.assert_async().await;
    ok.assert_async().await;
    assert_eq!(results.len(), 2);

    let failed = results.iter().find(|r| !r.is_success()).expect("one failure");
    assert_eq!(failed.status, DownloadStatus::HttpError);
    assert_eq!(failed.status_code(), 404);
    assert!(!dir.path().join("missing.pdf").exists());

    let succeeded = results.iter().find(|r| r.is_success()).expect("one success");
    assert_eq!(succeeded.byte_size, 7);
    assert_eq!(fs::read_to_string(dir.path().join("ok.pdf"))?, "content");

    let summary = downloader::summarize(&results);
    assert_eq!((summary.total, summary.success, summary.failed), (2, 1, 1));
    Ok(())
}

#[tokio::test]
async fn test_name_collisions_get_numbered_suffix() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let _a = server
        .mock("GET", "/a/report.pdf")
        .with_status(200)
        .with_body("aaaa")
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/b/report.pdf")
        .with_status(200)
        .with_body("bbbbbb")
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("report.pdf"), "existing")?;

    let entries = vec![
        entry("report.pdf", &format!("{base}/a/report.pdf")),
        entry("report.pdf", &format!("{base}/b/report.pdf")),
    ];
    let results =
        downloader::download_all(mock_client(&base), &entries, dir.path(), not_cancelled()).await?;
    assert!(results.iter().all(|r| r.is_success()));

    let names: BTreeSet<String> = fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        BTreeSet::from([
            "report.pdf".to_string(),
            "report(1).pdf".to_string(),
            "report(2).pdf".to_string(),
        ])
    );
    assert_eq!(fs::read_to_string(dir.path().join("report.pdf"))?, "existing");
    for result in &results {
        assert_eq!(fs::metadata(&result.file_path)?.len(), result.byte_size);
    }
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_has_no_status_code() -> AppResult<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("nested").join("out");
    let entries = vec![entry("unreachable.pdf", "http://127.0.0.1:1/unreachable.pdf")];

    let results = downloader::download_all(
        mock_client("http://127.0.0.1:1"),
        &entries,
        &output,
        not_cancelled(),
    )
    .await?;

    assert!(output.is_dir(), "output directory should be created");
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_success());
    assert_eq!(results[0].http_status, None);
    assert_eq!(results[0].status_code(), -1);
    assert!(!output.join("unreachable.pdf").exists());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_run_starts_no_downloads() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let entries = vec![entry("a.pdf", &format!("{base}/a.pdf"))];
    let results = downloader::download_all(
        mock_client(&base),
        &entries,
        dir.path(),
        Arc::new(AtomicBool::new(true)),
    )
    .await?;

    assert!(results.is_empty());
    mock.assert_async().await;
    Ok(())
}

/// 声明 100 字节但只发送 10 字节后断开连接
async fn spawn_truncating_server() -> std::io::Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n0123456789")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn test_truncated_body_fails_and_removes_partial_file() -> AppResult<()> {
    let base = spawn_truncating_server().await?;
    let dir = tempfile::tempdir()?;
    let entries = vec![entry("short.pdf", &format!("{base}/short.pdf"))];

    let results =
        downloader::download_all(mock_client(&base), &entries, dir.path(), not_cancelled()).await?;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(!result.is_success());
    assert_eq!(result.http_status, Some(200));
    assert!(result.message.is_some());
    assert!(!dir.path().join("short.pdf").exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}
