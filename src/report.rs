use std::fmt;
use crate::Run;

/// Human-readable summary of a [`Run`].
pub struct Report<'a> {
  run: &'a Run,
  quiet: bool,
}

impl<'a> Report<'a> {
  pub fn new(run: &'a Run, quiet: bool) -> Self {
    Report { run, quiet }
  }
}

impl fmt::Display for Report<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let run = self.run;

    if !self.quiet {
      writeln!(f, "initial grammar:\n")?;
      write_grammar(f, &run.initial)?;
      writeln!(f, "\nnormalized by {}:\n", run.normalized.branch)?;
      write_grammar(f, &run.normalized.grammar)?;
      writeln!(f)?;
    }

    for outcome in &run.outcomes {
      if let Err(err) = outcome.result {
        writeln!(f, "step limit of {} reached: {:?}", err.steps, outcome.case.word)?;
      }

      if !outcome.passed() {
        writeln!(f, "expected {}, got {}: {:?}",
          outcome.case.expected,
          outcome.accepted(),
          outcome.case.word)?;
      }
    }

    let failures = run.failures();
    if failures == 0 {
      writeln!(f, "all {} cases passed", run.outcomes.len())
    } else {
      writeln!(f, "{} of {} cases failed", failures, run.outcomes.len())
    }
  }
}

fn write_grammar(f: &mut fmt::Formatter<'_>, grammar: &grammar::Grammar) -> fmt::Result {
  for line in grammar.to_string().lines() {
    writeln!(f, "  {}", line)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::{check, Options};
  use super::*;
  use insta::assert_snapshot;

  #[test]
  fn full_report() {
    let run = check(
      "<S>::=<S>a|b",
      "[true]\nb\nbaa\n[false]\na\nbab\n",
      &Options::default(),
    ).unwrap();

    assert_snapshot!(Report::new(&run, false).to_string(), @r###"
    initial grammar:

      <S>::=<S>a|b

    normalized by left recursion removal:

      <S>::=b|b<S'>
      <S'>::=a|a<S'>

    all 4 cases passed
    "###);
  }

  #[test]
  fn quiet_report_lists_failures() {
    let options = Options {
      step_limit: Some(10),
      quiet: true,
    };
    let run = check(
      "<S>::=a<S>|b",
      "[true]\nb\nab\naaaaaaaab\n[false]\nb\n",
      &options,
    ).unwrap();

    assert_snapshot!(Report::new(&run, true).to_string(), @r###"
    step limit of 10 reached: "aaaaaaaab"
    expected true, got false: "aaaaaaaab"
    expected false, got true: "b"
    2 of 4 cases failed
    "###);
  }
}
