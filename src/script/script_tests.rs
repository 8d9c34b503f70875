use super::*;
use std::path::{Path, PathBuf};

type CallResult = std::result::Result<(), BoxError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Info(String),
    Debug(String),
    Execute(String, usize),
}

/// Records every collaborator call, in order, into one shared log.
#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    fail_execute_at: Option<usize>,
}

impl SqlExecutor for Recorder {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> CallResult {
        if self.fail_execute_at == Some(line_offset) {
            return Err(format!("ORA-00942: table or view does not exist (line {line_offset})").into());
        }
        self.calls
            .push(Call::Execute(script_source.to_string(), line_offset));
        Ok(())
    }
}

impl Prompter for Recorder {
    fn info(&mut self, message: &str) -> CallResult {
        self.calls.push(Call::Info(message.to_string()));
        Ok(())
    }

    fn debug(&mut self, message: &str) -> CallResult {
        self.calls.push(Call::Debug(message.to_string()));
        Ok(())
    }
}

/// Executor and prompter share one log so relative order can be asserted.
struct Shared<'a>(&'a std::cell::RefCell<Recorder>);

impl SqlExecutor for Shared<'_> {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> CallResult {
        self.0.borrow_mut().execute(script_source, line_offset)
    }
}

impl Prompter for Shared<'_> {
    fn info(&mut self, message: &str) -> CallResult {
        self.0.borrow_mut().info(message)
    }

    fn debug(&mut self, message: &str) -> CallResult {
        self.0.borrow_mut().debug(message)
    }
}

fn run(script: &str) -> Vec<Call> {
    let log = std::cell::RefCell::new(Recorder::default());
    let mut runner = SqlPlusScriptRunner::new(Shared(&log), Shared(&log));
    runner.run_script(script).expect("script should run");
    drop(runner);
    log.into_inner().calls
}

fn sql(text: &str, line: usize) -> Vec<Call> {
    vec![
        Call::Debug(format!("Executing script:\n{}", text)),
        Call::Execute(text.to_string(), line),
    ]
}

fn parse(script: &str) -> Vec<Fragment> {
    parse_script(script, Path::new("/scripts"))
}

fn kinds(fragments: &[Fragment]) -> Vec<FragmentKind> {
    fragments.iter().map(|fragment| fragment.kind).collect()
}

// ---------------------------------------------------------------------------
// classification

#[test]
fn test_classify_prompt() {
    assert_eq!(classify_line("prompt hello"), FragmentKind::Prompt);
    assert_eq!(classify_line("   prompt"), FragmentKind::Prompt);
    assert_eq!(classify_line("prompts foo"), FragmentKind::Prompt);
}

#[test]
fn test_classify_prompt_is_case_sensitive() {
    assert_eq!(classify_line("PROMPT hi"), FragmentKind::Sql);
    assert_eq!(classify_line("Prompt hi"), FragmentKind::Sql);
}

#[test]
fn test_classify_include() {
    assert_eq!(classify_line("@sub.sql"), FragmentKind::Include);
    assert_eq!(classify_line("  @@nested.sql"), FragmentKind::Include);
    assert_eq!(classify_line("@"), FragmentKind::Include);
}

#[test]
fn test_classify_ignored_commands_any_case() {
    for line in ["SET FOO=1", "Set foo=1", "set foo=1", "spool out.log", "EXIT", "show errors"] {
        assert_eq!(classify_line(line), FragmentKind::Ignore, "line: {line}");
    }
    for command in IGNORED_COMMANDS {
        assert_eq!(
            classify_line(&command.to_uppercase()),
            FragmentKind::Ignore,
            "command: {command}"
        );
    }
}

#[test]
fn test_classify_ignored_command_must_be_whole_word() {
    assert_eq!(classify_line("settings_table_insert;"), FragmentKind::Sql);
    assert_eq!(classify_line("EXECUTE_ME;"), FragmentKind::Sql);
}

#[test]
fn test_classify_comments_and_blank_lines() {
    assert_eq!(classify_line("-- a comment"), FragmentKind::Ignore);
    assert_eq!(classify_line("--no space"), FragmentKind::Ignore);
    assert_eq!(classify_line(""), FragmentKind::Ignore);
    assert_eq!(classify_line(" \t "), FragmentKind::Ignore);
}

#[test]
fn test_classify_sql_default() {
    assert_eq!(classify_line("SELECT 1 FROM DUAL;"), FragmentKind::Sql);
    assert_eq!(classify_line("/"), FragmentKind::Sql);
    assert_eq!(classify_line("END;"), FragmentKind::Sql);
}

#[test]
fn test_include_marker_wins_over_ignored_word() {
    assert_eq!(classify_line("@set.sql"), FragmentKind::Include);
    assert_eq!(classify_line("@--.sql"), FragmentKind::Include);
}

// ---------------------------------------------------------------------------
// accumulation

#[test]
fn test_empty_input_has_no_fragments() {
    assert!(parse("").is_empty());
}

#[test]
fn test_single_sql_line_without_newline() {
    let fragments = parse("SELECT 1 FROM DUAL;");
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].kind, FragmentKind::Sql);
    assert_eq!(fragments[0].first_line, 1);
    assert_eq!(fragments[0].text, "SELECT 1 FROM DUAL;");
}

#[test]
fn test_consecutive_sql_lines_are_joined() {
    let fragments = parse("prompt x\nSELECT a\n  FROM b\n WHERE c = 1;\nprompt y\n");
    assert_eq!(
        kinds(&fragments),
        vec![FragmentKind::Prompt, FragmentKind::Sql, FragmentKind::Prompt]
    );
    assert_eq!(fragments[1].first_line, 2);
    assert_eq!(fragments[1].text, "SELECT a\n  FROM b\n WHERE c = 1;");
    assert_eq!(fragments[1].line_count(), 3);
    assert_eq!(fragments[2].first_line, 5);
}

#[test]
fn test_blank_line_splits_sql_batches() {
    let fragments = parse("INSERT INTO T VALUES (1);\n\nINSERT INTO T VALUES (2);\n");
    assert_eq!(
        kinds(&fragments),
        vec![FragmentKind::Sql, FragmentKind::Ignore, FragmentKind::Sql]
    );
    assert_eq!(fragments[0].first_line, 1);
    assert_eq!(fragments[2].first_line, 3);
}

#[test]
fn test_crlf_line_endings() {
    let fragments = parse("prompt a\r\nSELECT 1\r\nFROM DUAL;\r\n");
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].prompt_message(), "a");
    assert_eq!(fragments[1].text, "SELECT 1\nFROM DUAL;");
}

#[test]
fn test_fragments_carry_base_dir() {
    let fragments = parse("@sub.sql\n");
    assert_eq!(fragments[0].base_dir, PathBuf::from("/scripts"));
    assert_eq!(fragments[0].include_target(), PathBuf::from("/scripts/sub.sql"));
}

#[test]
fn test_first_lines_strictly_increase() {
    let script = "set echo on\nprompt a\nSELECT 1\nFROM DUAL;\n-- c\n@x.sql\nUPDATE t SET a = 1;\n\n";
    let fragments = parse(script);
    assert!(fragments
        .windows(2)
        .all(|pair| pair[0].first_line < pair[1].first_line));
    assert!(fragments
        .windows(2)
        .all(|pair| !(pair[0].kind == FragmentKind::Sql && pair[1].kind == FragmentKind::Sql)));
}

#[test]
fn test_plsql_block_stays_in_one_batch() {
    let script = "DECLARE\n  my_var INT;\nBEGIN\n  my_var := 1;\nEND;\n/\n";
    let fragments = parse(script);
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].text, script.trim_end());
}

// ---------------------------------------------------------------------------
// fragment payloads

#[test]
fn test_prompt_message_trimmed() {
    let fragments = parse("   prompt    starting main script now   \n");
    assert_eq!(fragments[0].prompt_message(), "starting main script now");
}

#[test]
fn test_prompt_prefix_is_literal() {
    let fragments = parse("prompts foo\n");
    assert_eq!(fragments[0].prompt_message(), "s foo");
}

#[test]
fn test_include_path_keeps_inner_whitespace() {
    let fragments = parse("@ sub.sql  \n@@foo.sql\n");
    assert_eq!(fragments[0].include_path(), " sub.sql");
    assert_eq!(fragments[1].include_path(), "@foo.sql");
}

// ---------------------------------------------------------------------------
// execution

#[test]
fn test_prompt_only() {
    assert_eq!(run("prompt hello\n"), vec![Call::Info("hello".to_string())]);
}

#[test]
fn test_empty_prompt_emits_empty_message() {
    assert_eq!(
        run("prompt\nprompt   \n"),
        vec![Call::Info(String::new()), Call::Info(String::new())]
    );
}

#[test]
fn test_ignored_line_then_sql() {
    assert_eq!(
        run("set serveroutput on\nSELECT 1 FROM DUAL;\n"),
        sql("SELECT 1 FROM DUAL;", 2)
    );
}

#[test]
fn test_prompt_sql_blank_prompt() {
    let calls = run("prompt begin\nINSERT INTO T VALUES (1);\nUPDATE T SET X=2;\n\nprompt done\n");
    let mut expected = vec![Call::Info("begin".to_string())];
    expected.extend(sql("INSERT INTO T VALUES (1);\nUPDATE T SET X=2;", 2));
    expected.push(Call::Info("done".to_string()));
    assert_eq!(calls, expected);
}

#[test]
fn test_empty_script_makes_no_calls() {
    assert!(run("").is_empty());
    assert!(run("\n\n-- nothing here\nexit\n").is_empty());
}

#[test]
fn test_same_script_twice_gives_same_calls() {
    let script = "prompt a\nSELECT 1 FROM DUAL;\nset x\nSELECT 2\nFROM DUAL;\n";
    assert_eq!(run(script), run(script));
}

#[test]
fn test_executor_error_aborts_run() {
    let mut recorder = Recorder {
        fail_execute_at: Some(3),
        ..Recorder::default()
    };
    let mut prompts = Recorder::default();
    let result = {
        let mut runner = SqlPlusScriptRunner::new(&mut recorder, &mut prompts);
        runner.run_script("SELECT 1 FROM DUAL;\n\nSELECT * FROM missing;\nprompt never\n")
    };

    match result {
        Err(ScriptError::Executor(err)) => {
            assert!(err.to_string().contains("line 3"), "unexpected: {err}");
        }
        other => panic!("expected executor error, got {:?}", other),
    }
    assert_eq!(recorder.calls, vec![Call::Execute("SELECT 1 FROM DUAL;".to_string(), 1)]);
    assert!(!prompts.calls.contains(&Call::Info("never".to_string())));
}

#[test]
fn test_prompter_error_aborts_run() {
    struct FailingPrompter;

    impl Prompter for FailingPrompter {
        fn info(&mut self, _message: &str) -> CallResult {
            Err("terminal closed".into())
        }

        fn debug(&mut self, _message: &str) -> CallResult {
            Ok(())
        }
    }

    let mut executor = Recorder::default();
    let mut runner = SqlPlusScriptRunner::new(&mut executor, FailingPrompter);
    let err = runner
        .run_script("prompt hi\nSELECT 1 FROM DUAL;\n")
        .expect_err("prompter failure should abort");
    assert!(matches!(err, ScriptError::Prompter(_)));
    assert_eq!(err.to_string(), "terminal closed");
    drop(runner);
    assert!(executor.calls.is_empty());
}

#[test]
fn test_missing_include_reports_absolute_path() {
    let mut recorder = Recorder::default();
    let mut prompts = Recorder::default();
    let mut runner = SqlPlusScriptRunner::new(&mut recorder, &mut prompts);
    let err = runner
        .run_script("prompt before\n@does_not_exist_4f1c.sql\nprompt after\n")
        .expect_err("include should fail");

    match err {
        ScriptError::IncludeNotFound(path) => {
            assert!(path.is_absolute(), "path should be absolute: {}", path.display());
            assert!(path.ends_with("does_not_exist_4f1c.sql"));
        }
        other => panic!("expected IncludeNotFound, got {:?}", other),
    }
    drop(runner);
    assert_eq!(prompts.calls, vec![Call::Info("before".to_string())]);
}

#[test]
fn test_empty_include_is_not_found() {
    let mut recorder = Recorder::default();
    let mut runner = SqlPlusScriptRunner::new(&mut recorder, Recorder::default());
    let err = runner.run_script("@\n").expect_err("empty include should fail");
    assert!(matches!(err, ScriptError::IncludeNotFound(_)));
}

#[test]
fn test_max_include_depth_defaults_to_unlimited() {
    let runner = SqlPlusScriptRunner::new(Recorder::default(), Recorder::default());
    assert_eq!(runner.max_include_depth(), None);
    assert_eq!(runner.with_max_include_depth(5).max_include_depth(), Some(5));
}

#[test]
fn test_missing_source_file() {
    let mut runner = SqlPlusScriptRunner::new(Recorder::default(), Recorder::default());
    let err = runner
        .run_file("/definitely/not/here/main_script.sql")
        .expect_err("missing file should fail");
    assert!(matches!(err, ScriptError::SourceIo { .. }));
}

// ---------------------------------------------------------------------------
// decoding

#[test]
fn test_decode_latin1() {
    let encoding = encoding_for_label("latin1").expect("latin1 is a known label");
    let text = decode(b"prompt caf\xe9\n", encoding).expect("valid latin1");
    assert_eq!(text, "prompt caf\u{e9}\n");
}

#[test]
fn test_decode_rejects_malformed_utf8() {
    assert!(decode(b"prompt \xff\xfe\xfd", DEFAULT_ENCODING).is_none());
}

#[test]
fn test_decode_strips_bom() {
    let text = decode(b"\xef\xbb\xbfprompt hi", DEFAULT_ENCODING).expect("valid utf-8");
    assert_eq!(text, "prompt hi");
}

#[test]
fn test_unknown_encoding_label() {
    assert!(matches!(
        encoding_for_label("klingon-8"),
        Err(ScriptError::UnknownEncoding(_))
    ));
}

#[test]
fn test_parent_dir_of_bare_file_name() {
    assert_eq!(parent_dir(Path::new("main.sql")), PathBuf::from("."));
    assert_eq!(parent_dir(Path::new("a/b/main.sql")), PathBuf::from("a/b"));
}
