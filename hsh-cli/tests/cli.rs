// This file is part of hsh, a POSIX-style command shell.
// Copyright (C) 2024 the hsh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Whole-binary tests driving `hsh` like a user would.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn hsh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hsh"))
}

fn run_command(script: &str) -> Output {
    hsh().args(["-c", script]).output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn echo_prints_operands() {
    let output = run_command("echo hello world");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "hello world\n");
}

#[test]
fn echo_n_suppresses_newline() {
    let output = run_command("echo -n no newline");
    assert_eq!(stdout_of(&output), "no newline");
    let output = run_command("echo -n -n greedy");
    assert_eq!(stdout_of(&output), "greedy");
}

#[test]
fn exit_status_propagates() {
    assert_eq!(run_command("exit 3").status.code(), Some(3));
    assert_eq!(run_command("true").status.code(), Some(0));
    assert_eq!(run_command("false").status.code(), Some(1));
}

#[test]
fn exit_code_is_masked() {
    assert_eq!(run_command("exit 259").status.code(), Some(3));
}

#[test]
fn non_numeric_exit_is_usage_error() {
    let output = run_command("exit abc");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn last_command_status_is_the_shell_status() {
    assert_eq!(run_command("false; true").status.code(), Some(0));
    assert_eq!(run_command("true; false").status.code(), Some(1));
}

#[test]
fn variable_round_trip() {
    let output = run_command("VAR=hello; echo $VAR");
    assert_eq!(stdout_of(&output), "hello\n");
}

#[test]
fn quoting_controls_expansion() {
    let output = run_command("HOMEFREE=x; echo \"$HOMEFREE\"; echo '$HOMEFREE'");
    assert_eq!(stdout_of(&output), "x\n$HOMEFREE\n");
}

#[test]
fn arithmetic_scenario() {
    let output = run_command("echo $((2 + 3 * 4))");
    assert_eq!(stdout_of(&output), "14\n");
}

#[test]
fn for_loop_scenario() {
    let output = run_command("for i in 1 2 3; do echo $i; done");
    assert_eq!(stdout_of(&output), "1\n2\n3\n");
}

#[test]
fn if_scenario() {
    let output = run_command("if true; then echo y; else echo n; fi");
    assert_eq!(stdout_of(&output), "y\n");
    let output = run_command("if false; then echo y; else echo n; fi");
    assert_eq!(stdout_of(&output), "n\n");
}

#[test]
fn brace_scenario() {
    let output = run_command("echo {a,b}{1,2}");
    let text = stdout_of(&output);
    let mut words: Vec<&str> = text.split_whitespace().collect();
    words.sort_unstable();
    assert_eq!(words, ["a1", "a2", "b1", "b2"]);
}

#[test]
fn pipeline_scenario() {
    let output = run_command("echo hello | wc -l");
    assert!(output.status.success());
    assert!(stdout_of(&output).contains('1'));
}

#[test]
fn pipefail_scenario() {
    assert_eq!(run_command("false | true").status.code(), Some(0));
    assert_eq!(
        run_command("set -o pipefail; false | true").status.code(),
        Some(1)
    );
}

#[test]
fn alias_scenario() {
    let output = run_command("alias say='echo said'; say it");
    assert_eq!(stdout_of(&output), "said it\n");
}

#[test]
fn subshell_isolation_scenario() {
    let output = run_command("V=a; (V=b; true); echo $V");
    assert_eq!(stdout_of(&output), "a\n");
}

#[test]
fn cd_dash_returns_and_prints() {
    let output = run_command("cd /; cd /tmp; cd - >/dev/null; pwd");
    assert_eq!(stdout_of(&output), "/\n");
}

#[test]
fn command_substitution_scenario() {
    let output = run_command("echo result=$(echo inner)");
    assert_eq!(stdout_of(&output), "result=inner\n");
}

#[test]
fn positional_parameters_after_dash_c() {
    let output = hsh()
        .args(["-c", "echo $1 $2 $#", "one", "two"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "one two 2\n");
}

#[test]
fn parse_error_returns_2() {
    let output = run_command("a )");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parse error at token"), "{stderr}");
}

#[test]
fn unterminated_quote_returns_1() {
    let output = run_command("echo 'oops");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn command_not_found_returns_127() {
    let output = run_command("hsh_no_such_command_xyz");
    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn help_and_version() {
    let output = hsh().arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("usage:"));

    let output = hsh().arg("--version").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("hsh"));
}

#[test]
fn shell_variable_is_exported() {
    let output = run_command("echo $SHELL");
    let path = stdout_of(&output);
    assert!(path.trim().ends_with("hsh"), "{path}");
}

#[test]
fn stdin_loop_executes_lines() {
    let mut child = hsh()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"echo first\necho second\nexit 4\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stdout_of(&output), "first\nsecond\n");
}

#[test]
fn verbose_echoes_commands_to_stderr() {
    let output = hsh().args(["-v", "-c", "echo visible"]).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("echo visible"), "{stderr}");
    assert_eq!(stdout_of(&output), "visible\n");
}

#[test]
fn heredoc_lexes_and_runs_with_empty_body() {
    let output = run_command("cat << EOF");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "");
}

#[test]
fn case_scenario() {
    let output = run_command("case a.txt in *.txt) echo doc;; *) echo other;; esac");
    assert_eq!(stdout_of(&output), "doc\n");
}

#[test]
fn logical_operators_scenario() {
    let output = run_command("true && echo and || echo or");
    assert_eq!(stdout_of(&output), "and\n");
    let output = run_command("false && echo and || echo or");
    assert_eq!(stdout_of(&output), "or\n");
}
