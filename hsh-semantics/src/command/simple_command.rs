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

//! Simple command preparation and execution
//!
//! Before anything runs, the first word goes through alias
//! substitution: the alias value is re-lexed into words that replace
//! the first word, up to a fixed depth to break cycles. Then every word
//! is expanded, assignments are applied, and the resulting argv is
//! dispatched to a builtin (in-process, with transient fd replacement)
//! or an external command (fork and exec).

use crate::expansion;
use crate::redir;
use hsh_env::alias::MAX_EXPANSION_DEPTH;
use hsh_env::semantics::ExitStatus;
use hsh_env::Env;
use hsh_syntax::lex::Lexer;
use hsh_syntax::syntax::{SimpleCommand, Word};
use hsh_syntax::token::TokenKind;

/// Expansion result of a simple command
pub(crate) struct ExpandedSimple {
    /// `name=value` pairs, values already expanded
    pub assignments: Vec<(String, String)>,
    /// Command name and arguments, fully expanded
    pub argv: Vec<String>,
}

/// Substitutes aliases into the first word of a command.
///
/// Alias values are re-lexed on use; word-like tokens from the value
/// replace the first word, and an empty value drops it so the next word
/// is considered. The depth bound keeps alias cycles finite.
pub(crate) fn alias_substitute(env: &Env, words: &[Word]) -> Vec<Word> {
    let mut words: Vec<Word> = words.to_vec();

    for _ in 0..MAX_EXPANSION_DEPTH {
        let Some(first) = words.first() else { break };
        if first.leading_quoted {
            break;
        }
        let Some(value) = env.aliases.get(&first.text) else {
            break;
        };

        let mut replacement = Vec::new();
        let mut lexer = Lexer::new(value);
        let complete = loop {
            match lexer.next_token() {
                Ok(token) => match token.kind {
                    TokenKind::Newline | TokenKind::EndOfFile => break true,
                    kind if kind.is_word_like() => replacement.push(Word {
                        text: token.text,
                        token_kind: token.kind,
                        leading_quoted: token.leading_quoted,
                    }),
                    TokenKind::Keyword(_) | TokenKind::Assignment => replacement.push(Word {
                        text: token.text,
                        token_kind: TokenKind::Word,
                        leading_quoted: token.leading_quoted,
                    }),
                    // Operators have no meaning in a substituted word
                    // list.
                    _ => {}
                },
                Err(_) => break false,
            }
        };
        if !complete {
            break;
        }

        if replacement.is_empty() {
            words.remove(0);
            continue;
        }
        replacement.extend(words.into_iter().skip(1));
        words = replacement;
    }

    words
}

/// Expands a simple command into assignments and argv.
pub(crate) fn expand_simple(
    env: &mut Env,
    command: &SimpleCommand,
) -> expansion::Result<ExpandedSimple> {
    let words = alias_substitute(env, &command.words);

    let mut argv = Vec::new();
    for word in &words {
        argv.extend(expansion::expand_word(env, word)?);
    }

    let mut assignments = Vec::new();
    for assignment in &command.assignments {
        let value = expansion::expand_single(env, &assignment.value)?;
        assignments.push((assignment.name.text.clone(), value));
    }

    Ok(ExpandedSimple { assignments, argv })
}

/// Applies expanded assignments to the environment.
///
/// When the command has words, the variables are also exported so the
/// command being run observes them.
pub(crate) fn apply_assignments(env: &mut Env, expanded: &ExpandedSimple) {
    let export = !expanded.argv.is_empty();
    for (name, value) in &expanded.assignments {
        env.variables.set(name, value.clone());
        if export {
            env.variables.export(name, None);
        }
    }
}

/// Runs a simple command as the sole (foreground) command of a
/// pipeline.
pub(crate) fn run_simple(env: &mut Env, command: &SimpleCommand) -> crate::Result<ExitStatus> {
    let expanded = match expand_simple(env, command) {
        Ok(expanded) => expanded,
        Err(error) => {
            eprintln!("hsh: {error}");
            return Ok(ExitStatus::FAILURE);
        }
    };
    apply_assignments(env, &expanded);

    if expanded.argv.is_empty() {
        // Assignment- or redirection-only command: redirections still
        // open (and possibly create) their targets.
        if !command.redirections.is_empty() {
            match redir::resolve_all(env, &command.redirections) {
                Ok(resolved) => drop(resolved),
                Err(error) => {
                    eprintln!("hsh: {error}");
                    return Ok(ExitStatus::FAILURE);
                }
            }
        }
        return Ok(ExitStatus::SUCCESS);
    }

    let name = expanded.argv[0].clone();
    if let Some(&builtin) = env.builtins.get(name.as_str()) {
        // The builtin runs in-process behind temporarily replaced
        // standard fds.
        let resolved = match redir::resolve_all(env, &command.redirections) {
            Ok(resolved) => resolved,
            Err(error) => {
                eprintln!("hsh: {error}");
                return Ok(ExitStatus::FAILURE);
            }
        };
        let saved = match redir::apply_saving(&resolved) {
            Ok(saved) => saved,
            Err(error) => {
                eprintln!("hsh: {error}");
                return Ok(ExitStatus::FAILURE);
            }
        };
        let result = (builtin.execute)(env, &expanded.argv[1..]);
        redir::restore(saved);
        drop(resolved);

        env.exit_status = result.exit_status;
        return match result.divert {
            Some(divert) => Err(divert),
            None => Ok(result.exit_status),
        };
    }

    let resolved = match redir::resolve_all(env, &command.redirections) {
        Ok(resolved) => resolved,
        Err(error) => {
            eprintln!("hsh: {error}");
            return Ok(ExitStatus::FAILURE);
        }
    };
    Ok(super::pipeline::run_external_foreground(
        env, expanded.argv, resolved,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::literal(text)
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn no_alias_no_change() {
        let env = Env::new();
        let words = vec![word("git"), word("status")];
        assert_eq!(texts(&alias_substitute(&env, &words)), ["git", "status"]);
    }

    #[test]
    fn alias_replaces_first_word() {
        let mut env = Env::new();
        env.aliases.define("gs", "git status");
        let words = vec![word("gs"), word("-sb")];
        assert_eq!(
            texts(&alias_substitute(&env, &words)),
            ["git", "status", "-sb"]
        );
    }

    #[test]
    fn quoted_first_word_is_not_substituted() {
        let mut env = Env::new();
        env.aliases.define("gs", "git status");
        let mut first = word("gs");
        first.leading_quoted = true;
        let words = vec![first];
        assert_eq!(texts(&alias_substitute(&env, &words)), ["gs"]);
    }

    #[test]
    fn chained_aliases_expand_through() {
        let mut env = Env::new();
        env.aliases.define("l", "ll");
        env.aliases.define("ll", "ls -l");
        let words = vec![word("l")];
        assert_eq!(texts(&alias_substitute(&env, &words)), ["ls", "-l"]);
    }

    #[test]
    fn self_referential_alias_terminates() {
        let mut env = Env::new();
        env.aliases.define("ls", "ls --color");
        let words = vec![word("ls")];
        let result = alias_substitute(&env, &words);
        // Depth-bounded: the first word stabilizes within the cap.
        assert_eq!(result[0].text, "ls");
        assert!(result.len() <= 1 + MAX_EXPANSION_DEPTH);
    }

    #[test]
    fn alias_cycle_terminates() {
        let mut env = Env::new();
        env.aliases.define("a", "b");
        env.aliases.define("b", "a");
        let words = vec![word("a"), word("arg")];
        let result = alias_substitute(&env, &words);
        assert_eq!(result.last().unwrap().text, "arg");
    }

    #[test]
    fn empty_alias_drops_the_word() {
        let mut env = Env::new();
        env.aliases.define("nothing", "");
        let words = vec![word("nothing"), word("echo")];
        assert_eq!(texts(&alias_substitute(&env, &words)), ["echo"]);
    }

    #[test]
    fn alias_value_with_quotes() {
        let mut env = Env::new();
        env.aliases.define("say", "echo 'hello world'");
        let words = vec![word("say")];
        let result = alias_substitute(&env, &words);
        assert_eq!(result[1].text, "'hello world'");
        assert!(result[1].leading_quoted);
    }

    #[test]
    fn expansion_produces_argv() {
        let mut env = Env::new();
        env.variables.set("hsh_sc_arg", "value");
        let command = SimpleCommand {
            assignments: Vec::new(),
            words: vec![word("cmd"), word("$hsh_sc_arg"), word("{x,y}")],
            redirections: Vec::new(),
        };
        let expanded = expand_simple(&mut env, &command).unwrap();
        assert_eq!(expanded.argv, ["cmd", "value", "x", "y"]);
        env.variables.unset("hsh_sc_arg");
    }
}
