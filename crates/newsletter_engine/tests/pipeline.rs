use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use newsletter_engine::{
    ConversionJob, ConvertSettings, Converter, FailureKind, FetchError, FetchSettings, Fetcher,
    FixedClock, Pipeline, ReqwestFetcher, RunReport, SetupError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

fn page(title: &str, byline: &str, date: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>{title}</title></head>
<body>
  <h1>{title}</h1>
  <div class="by-line">{byline}</div>
  <div class="date">{date}</div>
  {body}
</body></html>"#
    )
}

fn job(input: &Path, output: &Path) -> ConversionJob {
    ConversionJob {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        content_type: "posts".to_string(),
    }
}

fn fixed_clock() -> Box<FixedClock> {
    Box::new(FixedClock(
        DateTime::parse_from_rfc3339("2024-01-02T03:04:05+02:00").unwrap(),
    ))
}

fn reqwest_pipeline() -> Pipeline {
    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).unwrap();
    Pipeline::new(ConvertSettings::default(), Box::new(fetcher)).with_clock(fixed_clock())
}

async fn image_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
        .mount(&server)
        .await;
    server
}

fn hello_world_page(server: &MockServer) -> String {
    page(
        "Hello World",
        "by Jane Doe",
        "March 14, 2017",
        &format!(
            r#"<div class="message-body"><p>Hi there</p><p><img src="{}/img/cat.png" data-is-featured></p></div>"#,
            server.uri()
        ),
    )
}

#[tokio::test]
async fn converts_a_page_into_a_bundle() {
    engine_logging::initialize_for_tests();
    let server = image_server().await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("hello.html"), hello_world_page(&server)).unwrap();

    let report = reqwest_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(
        report,
        RunReport {
            found: 1,
            converted: 1,
            skipped: 0,
            failed: 0
        }
    );

    let bundle = output.path().join("posts/hello-world");
    let markdown = fs::read_to_string(bundle.join("hello-world.md")).unwrap();
    let expected_header = "---\ntitle: \"Hello World\"\nauthor: \"Jane Doe\"\ndate: 2017-03-14T00:00:00Z\nlastmod: 2024-01-02T03:04:05+02:00\ndraft: false\n\n---\n\n";
    assert!(
        markdown.starts_with(expected_header),
        "unexpected document: {markdown}"
    );

    let body = &markdown[expected_header.len()..];
    assert!(body.starts_with("Hi there"), "unexpected body: {body:?}");
    assert!(body.contains("/posts/hello-world/images/1.png"));
    assert!(!body.contains(&server.uri()));
    assert!(!body.contains("# Hello World"));
    assert!(markdown.ends_with('\n'));

    assert_eq!(fs::read(bundle.join("images/1.png")).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn rerunning_produces_identical_output() {
    let server = image_server().await;
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("hello.html"), hello_world_page(&server)).unwrap();
    let job = job(input.path(), output.path());
    let pipeline = reqwest_pipeline();

    pipeline.run(&job).await.unwrap();
    let first = snapshot(output.path());
    fs::write(output.path().join("posts/hello-world/stale.txt"), "left over").unwrap();
    pipeline.run(&job).await.unwrap();
    let second = snapshot(output.path());

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let content = fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), content));
            }
        }
    }
    files.sort();
    files
}

/// Copies nothing over the network; panics for URLs containing "explode".
struct LocalFetcher;

#[async_trait::async_trait]
impl Fetcher for LocalFetcher {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        if url.contains("explode") {
            panic!("fetcher blew up on {url}");
        }
        fs::write(destination, PNG_BYTES).map_err(|err| FetchError {
            kind: FailureKind::Io,
            message: err.to_string(),
        })?;
        Ok(PNG_BYTES.len() as u64)
    }
}

fn local_pipeline() -> Pipeline {
    Pipeline::new(ConvertSettings::default(), Box::new(LocalFetcher)).with_clock(fixed_clock())
}

fn body(html: &str) -> String {
    format!(r#"<div class="message-body">{html}</div>"#)
}

#[tokio::test]
async fn skips_non_pages_and_empty_posts() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::create_dir(input.path().join("folder.html")).unwrap();
    fs::write(input.path().join("notes.txt"), "not a page").unwrap();
    fs::write(
        input.path().join("no-body.html"),
        page("No Body", "by X", "2017-01-01", ""),
    )
    .unwrap();
    fs::write(
        input.path().join("no-title.html"),
        page("", "by X", "2017-01-01", &body("<p>orphan text</p>")),
    )
    .unwrap();
    fs::write(
        input.path().join("ok.html"),
        page("Kept Post", "by X", "2017-01-01", &body("<p>content</p>")),
    )
    .unwrap();

    let report = local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(
        report,
        RunReport {
            found: 5,
            converted: 1,
            skipped: 4,
            failed: 0
        }
    );
    let posts: Vec<_> = fs::read_dir(output.path().join("posts"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(posts, vec!["kept-post".to_string()]);
}

#[cfg(unix)]
#[tokio::test]
async fn an_unreadable_file_does_not_stop_the_run() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::os::unix::fs::symlink(
        input.path().join("missing-target.html"),
        input.path().join("a-broken.html"),
    )
    .unwrap();
    fs::write(
        input.path().join("b-fine.html"),
        page("Fine", "by X", "2017-01-01", &body("<p>still here</p>")),
    )
    .unwrap();

    let report = local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(
        report,
        RunReport {
            found: 2,
            converted: 1,
            skipped: 0,
            failed: 1
        }
    );
    assert!(output.path().join("posts/fine/fine.md").is_file());
}

#[tokio::test]
async fn a_stray_byte_in_a_utf8_page_still_converts() {
    engine_logging::initialize_for_tests();
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let html = page("Notes", "by X", "2017-01-01", &body("<p>caf@ au lait</p>"));
    let bytes: Vec<u8> = html
        .into_bytes()
        .into_iter()
        .map(|b| if b == b'@' { 0xE9 } else { b })
        .collect();
    fs::write(input.path().join("notes.html"), bytes).unwrap();

    let report = local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(
        report,
        RunReport {
            found: 1,
            converted: 1,
            skipped: 0,
            failed: 0
        }
    );
    let markdown = fs::read_to_string(output.path().join("posts/notes/notes.md")).unwrap();
    assert!(markdown.contains("caf\u{fffd} au lait"), "{markdown}");
}

#[tokio::test]
async fn the_configured_converter_renders_the_body() {
    struct Shout;
    impl Converter for Shout {
        fn to_markdown(&self, html: &str) -> String {
            html.to_uppercase()
        }
    }

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(
        input.path().join("quiet.html"),
        page("Quiet", "by X", "2017-01-01", &body("<p>still here</p>")),
    )
    .unwrap();

    let report = local_pipeline()
        .with_converter(Box::new(Shout))
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(report.converted, 1);
    let markdown = fs::read_to_string(output.path().join("posts/quiet/quiet.md")).unwrap();
    assert!(markdown.ends_with("\n---\n\n<P>STILL HERE</P>\n"), "{markdown}");
}

#[tokio::test]
async fn a_panicking_extraction_is_contained() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(
        input.path().join("a.html"),
        page(
            "Doomed",
            "by X",
            "2017-01-01",
            &body(r#"<p>x</p><img src="http://cdn/explode.png">"#),
        ),
    )
    .unwrap();
    fs::write(
        input.path().join("b.html"),
        page(
            "Survivor",
            "by X",
            "2017-01-01",
            &body(r#"<p>y</p><img src="http://cdn/fine.jpg">"#),
        ),
    )
    .unwrap();

    let report = local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.converted, 1);
    assert!(!output.path().join("posts/doomed").exists());
    let survivor = fs::read_to_string(output.path().join("posts/survivor/survivor.md")).unwrap();
    assert!(survivor.contains("/posts/survivor/images/1.jpg"));
}

#[tokio::test]
async fn punctuation_titles_fall_back_to_the_date() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(
        input.path().join("odd.html"),
        page("###", "by X", "March 14, 2017", &body("<p>body</p>")),
    )
    .unwrap();

    local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    let bundle = output.path().join("posts/noname_2017-03-14T00-00-00Z");
    let markdown = fs::read_to_string(bundle.join("noname_2017-03-14T00-00-00Z.md")).unwrap();
    assert!(markdown.starts_with("---\ntitle: \"###\"\n"));
}

#[tokio::test]
async fn quotes_and_byline_prefix_are_stripped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(
        input.path().join("q.html"),
        page(
            "&quot;Quoted&quot; Title",
            "by Sam &quot;S&quot; Lee",
            "not a date",
            &body("<p>a&nbsp;b</p>"),
        ),
    )
    .unwrap();

    local_pipeline()
        .run(&job(input.path(), output.path()))
        .await
        .unwrap();

    let markdown =
        fs::read_to_string(output.path().join("posts/quoted-title/quoted-title.md")).unwrap();
    assert!(markdown.contains("title: \"Quoted Title\"\n"));
    assert!(markdown.contains("author: \"Sam S Lee\"\n"));
    assert!(markdown.contains("date: 1970-01-01T00:00:00Z\n"));
    assert!(!markdown.contains('\u{a0}'));
}

#[tokio::test]
async fn missing_input_folder_is_a_setup_error() {
    let output = TempDir::new().unwrap();
    let err = local_pipeline()
        .run(&job(&output.path().join("missing"), output.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, SetupError::InputDir { .. }));
}

#[tokio::test]
async fn output_that_is_a_file_is_a_setup_error() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let blocker = output.path().join("site");
    fs::write(&blocker, "file, not folder").unwrap();

    let err = local_pipeline()
        .run(&job(input.path(), &blocker))
        .await
        .unwrap_err();
    assert!(matches!(err, SetupError::Output(_)));
}
