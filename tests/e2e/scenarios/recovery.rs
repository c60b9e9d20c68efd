use crate::harness::{Assertion, Scenario};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

const ADA: &str = "ada@example.com";

fn edit_records(edit: impl Fn(&mut Vec<Value>) + 'static) -> impl Fn(&str) -> String {
    move |content| {
        let mut records: Vec<Value> = serde_json::from_str(content).expect("user file is a list");
        edit(&mut records);
        serde_json::to_string_pretty(&records).expect("records serialize")
    }
}

#[test]
fn test_corrupt_file_starts_empty() {
    Scenario::new("corrupt_file")
        .register("Ada", ADA, "s3cret", "1815")
        .write_users_file("{not json")
        .assert_user_count(0)
        .register("Grace", "grace@example.com", "cobol", "1906")
        .restart()
        .assert_user_count(1)
        .assert_can_login("grace@example.com", "cobol", "1906")
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_non_list_document_starts_empty() {
    Scenario::new("non_list_document")
        .write_users_file(r#"{"id": "not a list"}"#)
        .assert_user_count(0)
        .write_users_file("")
        .assert_user_count(0)
        .assert(Assertion::LoadSkipped(0))
        .run()
        .unwrap();
}

#[test]
fn test_malformed_and_duplicate_records_skipped() {
    Scenario::new("skip_bad_records")
        .register("Ada", ADA, "s3cret", "1815")
        .edit_users_file(edit_records(|records| {
            let duplicate = records[0].clone();
            records.push(json!({"name": "No Id", "email": "noid@example.com"}));
            records.push(json!({
                "id": "6f1c6a2e-8a53-4b0e-9c55-1d1b0f5c2a11",
                "name": "Bad Mail",
                "email": "bad@mail",
                "password_hash": "AAAA",
                "transcript": []
            }));
            records.push(json!(42));
            records.push(duplicate);
        }))
        .assert(Assertion::LoadSkipped(4))
        .assert_user_count(1)
        .assert_can_login(ADA, "s3cret", "1815")
        .run()
        .unwrap();
}

fn is_argon2(hash: &[u8]) -> bool {
    hash.starts_with(b"$argon2id$")
}

#[test]
fn test_legacy_keys_and_speaker_tags_accepted() {
    Scenario::new("legacy_records")
        .register("Ada", ADA, "s3cret", "1815")
        .edit_users_file(edit_records(|records| {
            let legacy = bcrypt::hash("s3cret:1815", 4).expect("bcrypt hash");
            let record = records[0].as_object_mut().expect("record is an object");
            record.remove("password_hash");
            record.remove("transcript");
            record.insert("hashed_password".into(), json!(BASE64.encode(legacy)));
            record.insert(
                "chat_history".into(),
                json!([["user", "hi"], ["assistant", "hello"], ["system", "note"]]),
            );
        }))
        .assert(Assertion::LoadSkipped(0))
        .assert_transcript_len(ADA, 3)
        .assert_cannot_login(ADA, "s3cret", "0000")
        .assert(Assertion::Custom(Box::new(|dir| {
            let hash = dir.get(ADA)?.password_hash();
            anyhow::ensure!(hash.starts_with(b"$2b$"), "expected bcrypt hash to remain");
            Ok(())
        })))
        .assert_can_login(ADA, "s3cret", "1815")
        // Rewritten in the current format
        .assert(Assertion::UsersFileContains("\"password_hash\"".into()))
        .assert(Assertion::UsersFileLacks("hashed_password".into()))
        .assert(Assertion::UsersFileLacks("chat_history".into()))
        .assert(Assertion::UsersFileContains("\"You\"".into()))
        .restart()
        .assert(Assertion::Custom(Box::new(|dir| {
            anyhow::ensure!(
                is_argon2(dir.get(ADA)?.password_hash()),
                "legacy hash was not upgraded"
            );
            Ok(())
        })))
        .assert_can_login(ADA, "s3cret", "1815")
        .assert_transcript_len(ADA, 3)
        .run()
        .unwrap();
}

#[test]
fn test_broken_transcript_reset() {
    Scenario::new("broken_transcript")
        .register("Ada", ADA, "s3cret", "1815")
        .service_replies("hello")
        .login(ADA, "s3cret", "1815")
        .say("hi")
        .end_chat()
        .edit_users_file(edit_records(|records| {
            records[0]["transcript"] = json!([["You", "hi"], ["Robot", "beep"]]);
        }))
        .assert(Assertion::LoadSkipped(0))
        .assert_transcript_len(ADA, 0)
        .assert_can_login(ADA, "s3cret", "1815")
        .run()
        .unwrap();
}
