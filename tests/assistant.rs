use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::executor::block_on;
use futures::future::BoxFuture;
use label_canvas::assistant::AssistantError;
use label_canvas::command::CommandError;
use label_canvas::{Command, Editor, EditorError, RewriteAction, TextAssistant};

/// Answers immediately with a fixed reply and remembers the prompts it saw.
#[derive(Clone)]
struct CannedAssistant {
    reply: Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedAssistant {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_owned()),
            prompts: Arc::default(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_owned()),
            prompts: Arc::default(),
        }
    }
}

impl TextAssistant for CannedAssistant {
    fn complete(&self, prompt: String) -> BoxFuture<'static, Result<String, AssistantError>> {
        self.prompts.lock().unwrap().push(prompt);
        let reply = self.reply.clone().map_err(AssistantError::Request);
        futures::future::ready(reply).boxed()
    }
}

fn editor_with_text() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::default();
    editor.execute(Command::AddCustomText).unwrap();
    editor
}

#[test]
fn test_rewrite_replaces_text_once() {
    let mut editor = editor_with_text();
    let assistant = CannedAssistant::replying("  Texto nuevo \n");
    let depth = editor.history().undo_len();

    let mut pending = editor
        .request_rewrite(&assistant, RewriteAction::TranslateToSpanish)
        .unwrap();
    assert_eq!(
        assistant.prompts.lock().unwrap().as_slice(),
        ["Translate the following text into Spanish:\n\nNew Custom Text".to_owned()]
    );

    assert!(editor.poll_rewrite(&mut pending).unwrap().unwrap());
    assert_eq!(editor.document().get(0).unwrap().as_text().unwrap().text(), "Texto nuevo");
    assert_eq!(editor.history().undo_len(), depth + 1);

    editor.undo().unwrap();
    assert_eq!(editor.document().get(0).unwrap().as_text().unwrap().text(), "New Custom Text");
}

#[test]
fn test_blank_reply_is_ignored() {
    let mut editor = editor_with_text();
    let pending = editor
        .request_rewrite(&CannedAssistant::replying("   "), RewriteAction::Summarize)
        .unwrap();
    let (target, result) = block_on(pending.finish());

    assert!(!editor.apply_rewrite(target, result).unwrap());
    assert_eq!(editor.document().get(0).unwrap().as_text().unwrap().text(), "New Custom Text");
}

#[test]
fn test_deleted_target_is_not_touched() {
    let mut editor = editor_with_text();
    editor
        .execute(Command::InsertVariable {
            label: "[Notes]".to_owned(),
        })
        .unwrap();
    let pending = editor
        .request_rewrite(&CannedAssistant::replying("rewritten"), RewriteAction::Rewrite)
        .unwrap();

    // The text is removed before the reply arrives.
    editor.execute(Command::Delete).unwrap();
    let depth = editor.history().undo_len();
    let (target, result) = block_on(pending.finish());

    assert!(!editor.apply_rewrite(target, result).unwrap());
    assert_eq!(editor.document().get(0).unwrap().as_text().unwrap().text(), "[Notes]");
    assert_eq!(editor.history().undo_len(), depth);
}

#[test]
fn test_failure_is_reported_without_change() {
    let mut editor = editor_with_text();
    let before = editor.document().clone();
    let pending = editor
        .request_rewrite(&CannedAssistant::failing("timeout"), RewriteAction::Rewrite)
        .unwrap();
    let (target, result) = block_on(pending.finish());

    assert!(matches!(
        editor.apply_rewrite(target, result),
        Err(EditorError::Assistant(AssistantError::Request(_)))
    ));
    assert_eq!(editor.document(), &before);
}

#[test]
fn test_rewrite_needs_selected_text() {
    let mut editor = editor_with_text();
    editor.select(None);
    assert!(matches!(
        editor.request_rewrite(&CannedAssistant::replying("x"), RewriteAction::Rewrite),
        Err(EditorError::Command(CommandError::NoSelection))
    ));

    editor.execute(Command::AddQrCode { data: "x".to_owned() }).unwrap();
    editor.select(Some(1));
    assert!(matches!(
        editor.request_rewrite(&CannedAssistant::replying("x"), RewriteAction::Rewrite),
        Err(EditorError::Command(CommandError::WrongKind { .. }))
    ));
}

#[test]
fn test_unchanged_reply_records_no_step() {
    let mut editor = editor_with_text();
    let depth = editor.history().undo_len();
    let mut pending = editor
        .request_rewrite(&CannedAssistant::replying("New Custom Text"), RewriteAction::Rewrite)
        .unwrap();

    assert!(!editor.poll_rewrite(&mut pending).unwrap().unwrap());
    assert_eq!(editor.history().undo_len(), depth);
}
