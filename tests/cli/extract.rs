use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr_of, stdout_of};

#[test]
fn extracts_c_file_to_po_on_stdout() -> Result<()> {
    let test = CliTest::with_file(
        "hello.c",
        r#"#include <stdio.h>

int main(void) {
    puts(gettext("Hello, world!"));
    return 0;
}
"#,
    )?;

    let output = test.extract_command().arg("hello.c").output()?;
    assert_eq!(output.status.code(), Some(0));

    let po = stdout_of(&output);
    assert!(po.starts_with("# SOME DESCRIPTIVE TITLE."));
    assert!(po.contains("#: hello.c:4\nmsgid \"Hello, world!\"\nmsgstr \"\"\n"));
    Ok(())
}

#[test]
fn writes_output_file() -> Result<()> {
    let test = CliTest::with_file("app.c", "const char *s = gettext(\"saved\");\n")?;

    let output = test
        .extract_command()
        .args(["app.c", "-o", "messages.pot"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).is_empty());

    let po = test.read_file("messages.pot")?;
    assert!(po.contains("msgid \"saved\""));
    Ok(())
}

#[test]
fn plural_entry_has_two_msgstr_slots() -> Result<()> {
    let test = CliTest::with_file(
        "n.c",
        "const char *s = ngettext(\"%d file\", \"%d files\", n);\n",
    )?;

    let output = test.extract_command().arg("n.c").output()?;
    let po = stdout_of(&output);
    assert!(po.contains(
        "msgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
    ));
    assert!(po.contains("#, c-format"));
    Ok(())
}

#[test]
fn duplicate_msgid_merges_references() -> Result<()> {
    let test = CliTest::with_file("a.c", "const char *x = gettext(\"shared\");\n")?;
    test.write_file("b.c", "const char *y = gettext(\"shared\");\n")?;

    let output = test.extract_command().args(["a.c", "b.c"]).output()?;
    let po = stdout_of(&output);
    assert!(po.contains("#: a.c:1 b.c:1\nmsgid \"shared\""));
    assert_eq!(po.matches("msgid \"shared\"").count(), 1);
    Ok(())
}

#[test]
fn json_output_is_parseable() -> Result<()> {
    let test = CliTest::with_file(
        "menu.c",
        "const char *s = pgettext(\"menu\", \"Open\");\n",
    )?;

    let output = test
        .extract_command()
        .args(["menu.c", "--output-format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let records: serde_json::Value = serde_json::from_str(&stdout_of(&output))?;
    let records = records.as_array().expect("array of messages");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["context"], "menu");
    assert_eq!(records[0]["id"], "Open");
    Ok(())
}

#[test]
fn add_comments_copies_tagged_blocks() -> Result<()> {
    let test = CliTest::with_file(
        "c.c",
        r#"/* TRANSLATORS: shown in the menu */
const char *a = gettext("File");
/* internal note */
const char *b = gettext("Edit");
"#,
    )?;

    let output = test
        .extract_command()
        .args(["c.c", "--add-comments=TRANSLATORS:"])
        .output()?;
    let po = stdout_of(&output);
    assert!(po.contains("#. TRANSLATORS: shown in the menu\n"));
    assert!(!po.contains("internal note"));
    Ok(())
}

#[test]
fn custom_keyword_and_suppressed_defaults() -> Result<()> {
    let test = CliTest::with_file(
        "k.c",
        "const char *a = mark(\"custom\");\nconst char *b = gettext(\"standard\");\n",
    )?;

    let output = test
        .extract_command()
        .args(["k.c", "-k", "", "-k", "mark:1"])
        .output()?;
    let po = stdout_of(&output);
    assert!(po.contains("msgid \"custom\""));
    assert!(!po.contains("msgid \"standard\""));
    Ok(())
}

#[test]
fn python_files_use_python_scanner() -> Result<()> {
    let test = CliTest::with_file(
        "app.py",
        "# TRANSLATORS: greeting\nprint(_(\"Hello from Python\"))\n",
    )?;

    let output = test
        .extract_command()
        .args(["app.py", "--add-comments"])
        .output()?;
    let po = stdout_of(&output);
    assert!(po.contains("#. TRANSLATORS: greeting\n"));
    assert!(po.contains("msgid \"Hello from Python\""));
    Ok(())
}

#[test]
fn directory_walk_picks_up_known_extensions() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/one.c", "const char *a = gettext(\"from c\");\n")?;
    test.write_file("src/two.py", "x = _(\"from python\")\n")?;
    test.write_file("src/notes.txt", "gettext(\"not source\")\n")?;

    let output = test.extract_command().args(["-D", "src"]).output()?;
    let po = stdout_of(&output);
    assert!(po.contains("msgid \"from c\""));
    assert!(po.contains("msgid \"from python\""));
    assert!(!po.contains("not source"));
    Ok(())
}

#[test]
fn forced_language_overrides_extension() -> Result<()> {
    let test = CliTest::with_file("script", "x = _(\"forced python\")\n")?;

    let output = test
        .extract_command()
        .args(["script", "-L", "python"])
        .output()?;
    assert!(stdout_of(&output).contains("msgid \"forced python\""));
    Ok(())
}

#[test]
fn extract_all_takes_every_string() -> Result<()> {
    let test = CliTest::with_file("all.c", "const char *a = describe(\"anything\");\n")?;

    let output = test.extract_command().args(["all.c", "-a"]).output()?;
    assert!(stdout_of(&output).contains("msgid \"anything\""));
    Ok(())
}

#[test]
fn warnings_set_exit_code_one() -> Result<()> {
    let test = CliTest::with_file("w.c", "const char *a = gettext(\"broken\n")?;

    let output = test.extract_command().arg("w.c").output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("warning"));
    assert!(stderr.contains("unterminated"));
    Ok(())
}

#[test]
fn unknown_from_code_is_fatal() -> Result<()> {
    let test = CliTest::with_file("e.c", "const char *a = gettext(\"x\");\n")?;

    let output = test
        .extract_command()
        .args(["e.c", "--from-code", "EBCDIC"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("EBCDIC"));
    Ok(())
}

#[test]
fn missing_input_file_is_fatal() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().arg("absent.c").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("absent.c"));
    Ok(())
}

#[test]
fn latin1_from_code_decodes_bytes() -> Result<()> {
    let test = CliTest::new()?;
    std::fs::write(
        test.root().join("l.c"),
        b"const char *a = gettext(\"caf\xe9\");\n",
    )?;

    let output = test
        .extract_command()
        .args(["l.c", "--from-code", "ISO-8859-1"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("msgid \"café\""));
    Ok(())
}

#[test]
fn undecodable_bytes_abort_with_exit_two() -> Result<()> {
    let test = CliTest::new()?;
    std::fs::write(
        test.root().join("bad.c"),
        b"const char *a = gettext(\"caf\xe9\");\n",
    )?;

    let output = test.extract_command().arg("bad.c").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("bad.c"));
    Ok(())
}

#[test]
fn pragma_comment_sets_flags() -> Result<()> {
    let test = CliTest::with_file(
        "p.c",
        "/* xgettext: no-c-format */\nconst char *a = gettext(\"100% done\");\n",
    )?;

    let output = test.extract_command().arg("p.c").output()?;
    assert!(stdout_of(&output).contains("#, no-c-format"));
    Ok(())
}
