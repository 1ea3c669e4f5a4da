use std::io::{BufRead as _, BufReader, Read as _, Write as _};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;

const NOTE: &str = "See [[Project Plan]] and `[[literal]]` and ```\n[[in block]]\n```\n";

fn wikidav_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wikidav"));
    cmd.current_dir(dir);
    cmd.stdin(Stdio::null());
    for var in ["WIKIDAV_LOG", "HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_settings(dir: &Path, webdav_url: &str, password: &str) {
    let settings = format!(
        "[[servers]]\nname = \"home\"\nwebdav_url = \"{webdav_url}\"\ncustom_url_prefix = \"https://files.example.com/\"\nusername = \"me\"\npassword = \"{password}\"\n"
    );
    std::fs::write(dir.join(".wikidav.toml"), settings).unwrap();
}

/// What the one-shot server received.
struct Captured {
    body: String,
    headers: Vec<String>,
    request_line: String,
}

/// Accept a single HTTP request, answer with `status_line`, and hand the
/// request back over the channel.
fn serve_once(status_line: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        let mut length = 0_usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap();
                }
            }
            headers.push(line);
        }

        let mut body = vec![0_u8; length];
        reader.read_exact(&mut body).unwrap();

        write!(stream, "{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").unwrap();
        stream.flush().unwrap();

        tx.send(Captured {
            body: String::from_utf8(body).unwrap(),
            headers,
            request_line: request_line.trim_end().to_string(),
        })
        .unwrap();
    });

    (format!("http://{addr}/dav/"), rx)
}

#[test]
fn upload_puts_rewritten_copy_and_lists_references() {
    let dir = tempfile::tempdir().unwrap();
    let (webdav_url, received) = serve_once("HTTP/1.1 201 Created");
    write_settings(dir.path(), &webdav_url, "c2VjcmV0");
    std::fs::write(dir.path().join("My Note.md"), NOTE).unwrap();

    let output = wikidav_cmd(dir.path()).args(["upload", "My Note.md"]).output().unwrap();
    assert!(output.status.success(), "upload failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "https://files.example.com/My%20Note.md\n");

    let err = stderr(&output);
    assert!(err.contains("Upload successful: https://files.example.com/My%20Note.md"));
    assert!(err.contains("Internal Links Found"));
    assert!(err.contains("  - [[Project Plan]]"));
    assert!(!err.contains("[[literal]]"));

    let request = received.recv().unwrap();
    assert_eq!(request.request_line, "PUT /dav/My%20Note.md HTTP/1.1");
    assert!(request
        .headers
        .iter()
        .any(|h| h.eq_ignore_ascii_case("authorization: Basic bWU6c2VjcmV0")));
    assert!(request
        .headers
        .iter()
        .any(|h| h.eq_ignore_ascii_case("content-type: application/octet-stream")));
    assert_eq!(
        request.body,
        "See [Project Plan](https://files.example.com/Project%20Plan.md) and `[[literal]]` and ```\n[[in block]]\n```\n"
    );

    let local = std::fs::read_to_string(dir.path().join("My Note.md")).unwrap();
    assert_eq!(local, NOTE);
}

#[test]
fn rejected_upload_reports_status_text() {
    let dir = tempfile::tempdir().unwrap();
    let (webdav_url, received) = serve_once("HTTP/1.1 403 Forbidden");
    write_settings(dir.path(), &webdav_url, "c2VjcmV0");
    std::fs::write(dir.path().join("a.md"), "[[A]]").unwrap();

    let output = wikidav_cmd(dir.path()).args(["upload", "a.md"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to upload file: Forbidden"));
    assert!(stdout(&output).is_empty());
    assert_eq!(received.recv().unwrap().body, "[A](https://files.example.com/A.md)");
    assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "[[A]]");
}

#[test]
fn incomplete_profile_fails_without_network() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "http://127.0.0.1:9/dav/", "");
    std::fs::write(dir.path().join("a.md"), "[[A]]").unwrap();

    let output = wikidav_cmd(dir.path()).args(["upload", "a.md"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("WebDAV configuration is incomplete for `home`: missing password"));
}

#[test]
fn upload_without_servers_is_reported_in_chosen_locale() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.md"), "[[A]]").unwrap();

    let output = wikidav_cmd(dir.path()).args(["upload", "a.md"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No WebDAV server configured."));

    let output = wikidav_cmd(dir.path())
        .args(["--locale", "zh", "upload", "a.md"])
        .output()
        .unwrap();
    assert!(stderr(&output).contains("未配置 WebDAV 服务器。"));
}

#[test]
fn cancelled_server_prompt_uploads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["home", "work"] {
        let output = wikidav_cmd(dir.path())
            .args(["server", "add", name, "--webdav-url", "http://127.0.0.1:9/", "--username", "u", "--password", "p"])
            .output()
            .unwrap();
        assert!(output.status.success(), "add failed: {}", stderr(&output));
    }
    std::fs::write(dir.path().join("a.md"), "[[A]]").unwrap();

    let output = wikidav_cmd(dir.path()).args(["upload", "a.md"]).output().unwrap();
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("1) home"));
    assert!(err.contains("2) work"));
    assert!(err.contains("No server selected for upload."));
}

#[test]
fn unreadable_note_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "http://127.0.0.1:9/dav/", "c2VjcmV0");

    let output = wikidav_cmd(dir.path()).args(["upload", "missing.md"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No file to upload"));
}

#[test]
fn rewrite_then_revert_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("note.md"), NOTE).unwrap();

    let rewritten = wikidav_cmd(dir.path())
        .args(["rewrite", "note.md", "--prefix", "https://files.example.com/"])
        .output()
        .unwrap();
    assert!(rewritten.status.success(), "rewrite failed: {}", stderr(&rewritten));
    assert!(stdout(&rewritten).starts_with("See [Project Plan](https://files.example.com/Project%20Plan.md)"));

    std::fs::write(dir.path().join("copy.md"), stdout(&rewritten)).unwrap();
    let reverted = wikidav_cmd(dir.path()).args(["revert", "copy.md"]).output().unwrap();
    assert!(reverted.status.success());
    assert_eq!(stdout(&reverted), NOTE);
}

#[test]
fn rewrite_uses_server_prefix() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "https://dav.example.com/", "c2VjcmV0");
    std::fs::write(dir.path().join("note.md"), "[[Note A|Shown]]").unwrap();

    let output = wikidav_cmd(dir.path())
        .args(["rewrite", "note.md", "--server", "home"])
        .output()
        .unwrap();
    assert!(output.status.success(), "rewrite failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "[Shown](https://files.example.com/Note%20A.md)");
}

#[test]
fn scan_lists_references_across_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("a.md"), "[[One]] `[[code]]`").unwrap();
    std::fs::write(dir.path().join("sub/b.md"), "[[Two|2]]").unwrap();

    let output = wikidav_cmd(dir.path()).args(["scan", "."]).output().unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("a.md  [[One]]"));
    assert!(out.contains("b.md  [[Two|2]]"));
    assert!(!out.contains("[[code]]"));

    let output = wikidav_cmd(dir.path()).args(["scan", "a.md", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["references"][0]["target"], "One");
    assert_eq!(json[0]["references"][0]["alias"], serde_json::Value::Null);
}

#[test]
fn server_add_list_remove() {
    let dir = tempfile::tempdir().unwrap();

    let add = wikidav_cmd(dir.path())
        .args([
            "server", "add", "home",
            "--webdav-url", "https://dav.example.com/",
            "--prefix", "https://files.example.com/",
            "--username", "me",
            "--password", "secret",
        ])
        .output()
        .unwrap();
    assert!(add.status.success(), "add failed: {}", stderr(&add));

    let settings = std::fs::read_to_string(dir.path().join(".wikidav.toml")).unwrap();
    assert!(settings.contains("[[servers]]"));
    assert!(settings.contains("password = \"c2VjcmV0\""));
    assert!(!settings.contains("\"secret\""));

    let list = wikidav_cmd(dir.path()).args(["server", "list"]).output().unwrap();
    assert!(stdout(&list).contains("1) home -> https://dav.example.com/"));

    let dup = wikidav_cmd(dir.path()).args(["server", "add", "home"]).output().unwrap();
    assert!(!dup.status.success());
    assert!(stderr(&dup).contains("Duplicate Server"));

    let remove = wikidav_cmd(dir.path()).args(["server", "remove", "home"]).output().unwrap();
    assert!(remove.status.success());

    let list = wikidav_cmd(dir.path()).args(["server", "list"]).output().unwrap();
    assert!(stdout(&list).contains("No WebDAV server configured."));
}

#[test]
fn info_json_reports_state() {
    let dir = tempfile::tempdir().unwrap();
    let output = wikidav_cmd(dir.path()).args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["current_state"]["config_found"], false);
    assert_eq!(json["current_state"]["locale"], "en");
}
