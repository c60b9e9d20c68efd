use crate::harness::runner::doubling_sleeps;
use crate::harness::{Assertion, ErrorMatch, Scenario};
use solace_core::{FailureKind, Speaker, NO_TEXT_FALLBACK};

const ADA: &str = "ada@example.com";

fn with_ada(name: &str) -> Scenario {
    Scenario::new(name).register("Ada", ADA, "s3cret", "1815")
}

#[test]
fn test_chat_saved_on_end() {
    with_ada("chat_saved_on_end")
        .service_replies("Hello Ada")
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .assert_reply("Hello Ada")
        .assert(Assertion::SessionTranscriptLen(3))
        // Nothing is written before the session ends
        .assert_transcript_len(ADA, 0)
        .end_chat()
        .restart()
        .assert_transcript_len(ADA, 3)
        .assert_last_turn(ADA, Speaker::Assistant, "Hello Ada")
        .assert(Assertion::UsersFileContains("\"AI\"".into()))
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_second_session_continues_history() {
    with_ada("continue_history")
        .service_replies("first answer")
        .service_replies("second answer")
        .login(ADA, "s3cret", "1815")
        .say("first")
        .end_chat()
        .login(ADA, "s3cret", "1815")
        .assert(Assertion::SessionTranscriptLen(4))
        .say("second")
        .end_chat()
        .restart()
        .assert_transcript_len(ADA, 6)
        .assert_last_turn(ADA, Speaker::Assistant, "second answer")
        .assert(Assertion::UsersFileContains(
            "Continuing previous chat session from here...".into(),
        ))
        .run()
        .unwrap();
}

#[test]
fn test_lost_session_is_not_saved() {
    with_ada("lost_session")
        .service_replies("unsaved")
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .restart()
        .assert_transcript_len(ADA, 0)
        .run()
        .unwrap();
}

#[test]
fn test_default_and_override_instructions() {
    with_ada("instructions")
        .service_replies("one")
        .service_replies("deux")
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .assert(Assertion::LastRequestInstructions(
            "You are a helpful, step-by-step reasoning assistant.".into(),
        ))
        .say_with_instructions("Again", "Answer in French.")
        .assert(Assertion::LastRequestInstructions("Answer in French.".into()))
        .assert_reply("deux")
        .run()
        .unwrap();
}

#[test]
fn test_reply_is_trimmed_and_empty_reply_falls_back() {
    with_ada("reply_text")
        .service_replies("  spaced out \n")
        .service_replies_empty()
        .service_replies("   ")
        .login(ADA, "s3cret", "1815")
        .say("one")
        .assert_reply("spaced out")
        .say("two")
        .assert_reply(NO_TEXT_FALLBACK)
        .say("three")
        .assert_reply(NO_TEXT_FALLBACK)
        .run()
        .unwrap();
}

#[test]
fn test_transient_failures_retried_with_backoff() {
    with_ada("transient_retried")
        .service_fails(FailureKind::RateLimited)
        .service_fails(FailureKind::Timeout)
        .service_replies("finally")
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .assert_reply("finally")
        .assert_requests(3)
        .assert_slept(doubling_sleeps(2))
        .run()
        .unwrap();
}

#[test]
fn test_retry_budget_exhausted() {
    with_ada("retry_exhausted")
        .service_fails_times(FailureKind::Connection, 4)
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .fails_with(ErrorMatch::TransientProvider)
        .assert_requests(4)
        .assert_slept(doubling_sleeps(3))
        .assert(Assertion::SessionTranscriptLen(3))
        .end_chat()
        .assert_last_turn(ADA, Speaker::SystemNotice, "error fetching response")
        .run()
        .unwrap();
}

#[test]
fn test_zero_retries_fails_on_first_transient() {
    with_ada("zero_retries")
        .with_retry(0, 2.0)
        .service_fails(FailureKind::Timeout)
        .login(ADA, "s3cret", "1815")
        .say("Hi")
        .fails_with(ErrorMatch::TransientProvider)
        .assert_requests(1)
        .assert_slept(vec![])
        .run()
        .unwrap();
}

#[test]
fn test_non_transient_failures_fail_fast() {
    with_ada("fail_fast")
        .service_fails(FailureKind::Authentication)
        .service_fails(FailureKind::NotFound)
        .service_fails(FailureKind::InternalServer)
        .service_fails(FailureKind::UnexpectedStatus(418))
        .service_fails(FailureKind::Other)
        .service_replies("still here")
        .login(ADA, "s3cret", "1815")
        .say("a")
        .fails_with(ErrorMatch::ClientConfig)
        .say("b")
        .fails_with(ErrorMatch::ClientConfig)
        .say("c")
        .fails_with(ErrorMatch::Server)
        .say("d")
        .fails_with(ErrorMatch::Server)
        .say("e")
        .fails_with(ErrorMatch::Provider)
        .assert_requests(5)
        .assert_slept(vec![])
        .say("f")
        .assert_reply("still here")
        .end_chat()
        // notice + 5 x (message, error notice) + message + reply
        .assert_transcript_len(ADA, 13)
        .run()
        .unwrap();
}

#[test]
fn test_blank_message_not_sent() {
    with_ada("blank_message")
        .login(ADA, "s3cret", "1815")
        .say("   ")
        .fails_with(ErrorMatch::EmptyInput)
        .assert_requests(0)
        .assert(Assertion::SessionTranscriptLen(1))
        .run()
        .unwrap();
}
