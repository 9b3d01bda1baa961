use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use streamchat::ChatSession;
use streamchat_models::Message;

fn log_files(dir: &TempDir) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn sequential_writes_overwrite_one_file() {
    let dir = TempDir::new().unwrap();
    let mut session = ChatSession::new("sys prompt", 1000, dir.path());

    session.push_user("first question");
    session.extend_turn(vec![Message::assistant("first answer")]);
    session.commit_transcript();

    session.push_user("second question");
    session.extend_turn(vec![Message::assistant("second answer")]);
    session.commit_transcript();

    let files = log_files(&dir);
    assert_eq!(files.len(), 1, "one session, one transcript file");

    let name = files[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("chatlog_") && name.ends_with(".json"), "{}", name);

    // Final contents equal the conversation at the time of the second write.
    let persisted: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(persisted.len(), 5);
    assert_eq!(persisted[0]["role"], "system");
    assert_eq!(persisted[4]["content"], "second answer");
}

#[test]
fn transcript_entries_are_plain_role_content_objects() {
    let dir = TempDir::new().unwrap();
    let mut session = ChatSession::new("sys", 1000, dir.path());
    session.push_user("hello");
    session.extend_turn(vec![Message::assistant("hi there")]);
    session.commit_transcript();

    let files = log_files(&dir);
    let persisted: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    for entry in &persisted {
        let mut keys: Vec<&str> = entry.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["content", "role"]);
    }
}

#[test]
fn reset_detaches_the_file_binding() {
    let dir = TempDir::new().unwrap();
    let mut session = ChatSession::new("sys", 1000, dir.path());

    session.push_user("before reset");
    session.commit_transcript();
    let first = session.transcript_path().unwrap().to_path_buf();

    session.reset();
    assert!(session.transcript_path().is_none());
    assert!(first.exists(), "reset must not delete written files");

    // Filenames have second granularity; let the clock advance.
    std::thread::sleep(Duration::from_millis(1100));

    session.push_user("after reset");
    session.commit_transcript();
    let second = session.transcript_path().unwrap().to_path_buf();

    assert_ne!(first, second);
    assert_eq!(log_files(&dir).len(), 2);

    let persisted: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&second).unwrap()).unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[1]["content"], "after reset");
}

#[test]
fn failed_writes_do_not_panic() {
    let dir = TempDir::new().unwrap();
    // A regular file where the log directory should be makes create_dir_all fail.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"not a directory").unwrap();

    let mut session = ChatSession::new("sys", 1000, blocker.join("logs"));
    session.push_user("hello");
    session.commit_transcript();

    // The in-memory conversation stays authoritative.
    assert_eq!(session.history().len(), 2);
}
