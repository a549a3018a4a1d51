use std::env;
use std::process;
use getopts::Options;
use rdcheck::report::Report;

fn main() {
  env_logger::Builder::from_default_env()
    .format_timestamp(None)
    .init();

  let args = env::args().collect::<Vec<_>>();
  let prog = args.first().cloned().unwrap_or_else(|| "rdcheck".to_owned());
  let mut opts = Options::new();
  opts.optopt("s", "steps",
    "Give up on a word after N recognizer steps and count it as rejected.\n\
      Unlimited by default",
    "N");
  opts.optflag("q", "quiet", "Print only failures and the summary");
  opts.optflag("h", "help", "Print this message");

  let matches = match opts.parse(args.iter().skip(1)) {
    Ok(m) => m,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(1);
    }
  };

  if matches.opt_present("h") {
    print_usage(prog, opts);
    return;
  }

  let step_limit = match matches.opt_str("s") {
    Some(steps) => match steps.parse::<usize>() {
      Ok(steps) => Some(steps),
      Err(_) => {
        eprintln!("invalid step limit `{}`", steps);
        process::exit(1);
      }
    },
    None => None,
  };

  let (grammar_path, words_path) = if matches.free.len() == 2 {
    (matches.free[0].clone(), matches.free[1].clone())
  } else {
    print_usage(prog, opts);
    process::exit(1);
  };

  let options = rdcheck::Options {
    step_limit,
    quiet: matches.opt_present("q"),
  };

  match rdcheck::run(&grammar_path, &words_path, &options) {
    Ok(run) => {
      print!("{}", Report::new(&run, options.quiet));
      if !run.passed() {
        process::exit(1);
      }
    }
    Err(err) => {
      eprintln!("error: {}", err);
      process::exit(1);
    }
  }
}

fn print_usage(prog: String, opts: Options) {
  let brief = format!("Usage: {} [options] GRAMMAR WORDS", prog);
  print!("{}", opts.usage(&brief));
}
