use clap::Parser as ClapParser;
use sil::cli::{generate_completions, AppConfig, Args, Commands};
use sil::diagnostic::{Diagnostics, Stage};
use sil::format;
use sil::interpreter::evaluator::TreeWalker;
use sil::interpreter::parser::Parser;
use sil::lexer::MultiFileLexer;
use sil::token::Token;
use std::fs;
use std::io;
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    let mut diags = Diagnostics::new(config.use_color);

    let Some(script) = &args.script else {
        diags.report_flat("No script file provided");
        diags.flush_to_stderr();
        std::process::exit(2);
    };
    let script_path = script.to_string_lossy().to_string();

    if !script.is_file() {
        diags.set_stage(Stage::Command);
        diags.report_flat(&format!("file with path '{}' doesn't exist.", script_path));
        diags.flush_to_stderr();
        std::process::exit(1);
    }

    let tokens = MultiFileLexer::lex(&script_path, &mut diags);

    if let Some(dump_path) = &args.dump_tokens {
        if let Err(e) = dump_tokens(&tokens, dump_path) {
            diags.report_flat(&format!(
                "Failed to write token dump to '{}': {}",
                dump_path.display(),
                e
            ));
        }
    }

    let mut parser = Parser::new(tokens);
    let stmts = parser.parse(&mut diags);

    if diags.had_error() {
        diags.flush_to_stderr();
        std::process::exit(1);
    }

    let mut script_argv = vec![script_path];
    script_argv.extend(args.script_args.iter().cloned());

    let mut walker = TreeWalker::new(script_argv);
    if let Err(error) = walker.run(&stmts) {
        diags.set_stage(Stage::Runtime);
        error.report(&mut diags);
        diags.flush_to_stderr();
        std::process::exit(1);
    }
}

fn dump_tokens(tokens: &[Token], path: &Path) -> io::Result<()> {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.kind.to_string());
        out.push(' ');
        out.push_str(&format::ascii_replace(&token.lexeme));
        out.push('\n');
    }
    fs::write(path, out)
}
