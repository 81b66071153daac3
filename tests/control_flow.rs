mod common;

use common::{stderr_of, stdout_of};

#[test]
fn test_if_else() {
    assert_eq!(stdout_of("if 1 < 2 print \"yes\"; else print \"no\";"), "yes");
    assert_eq!(stdout_of("if false print \"yes\"; else print \"no\";"), "no");
}

#[test]
fn test_truthiness_in_conditions() {
    // numbers and strings are truthy, novalue is not
    assert_eq!(stdout_of("if 0 print \"t\"; else print \"f\";"), "t");
    assert_eq!(stdout_of("if novalue print \"t\"; else print \"f\";"), "f");
}

#[test]
fn test_while_loop() {
    let source = "var i = 0; while i < 3 { print i; i += 1; }";
    assert_eq!(stdout_of(source), "012");
}

#[test]
fn test_for_loop() {
    let source = "for var i = 0; i < 3; i += 1; { print i; }";
    assert_eq!(stdout_of(source), "012");
}

#[test]
fn test_for_loop_skip_still_runs_post_statement() {
    // skipping i == 2 must not loop forever, so the post statement ran
    let source = "for var i = 0; i < 5; i += 1; {\n\
                      if i == 2 skip;\n\
                      if i == 4 stop;\n\
                      print i;\n\
                  }";
    assert_eq!(stdout_of(source), "013");
}

#[test]
fn test_guarded_signals() {
    let source = "var n = 0; while true { n += 1; stop n > 4; } print n;";
    assert_eq!(stdout_of(source), "5");

    let source = "for var i = 0; i < 5; i += 1; { skip i == 2; print i; }";
    assert_eq!(stdout_of(source), "0134");
}

#[test]
fn test_nested_loops_stop_only_the_inner_one() {
    let source = "for var i = 0; i < 2; i += 1; {\n\
                      for var j = 0; j < 5; j += 1; {\n\
                          if j == 2 stop;\n\
                          print j;\n\
                      }\n\
                      print \"-\";\n\
                  }";
    assert_eq!(stdout_of(source), "01-01-");
}

#[test]
fn test_block_scoping_and_shadowing() {
    let source = "var x = 1; { var x = 2; print x; } print x;";
    assert_eq!(stdout_of(source), "21");
}

#[test]
fn test_assignment_reaches_outer_scope() {
    let source = "var x = 1; { x = 5; } print x;";
    assert_eq!(stdout_of(source), "5");
}

#[test]
fn test_signals_outside_their_context_are_fatal() {
    assert!(stderr_of("skip;").contains("Use of 'skip' outside of a loop"));
    assert!(stderr_of("stop;").contains("Use of 'stop' outside of a loop"));
    assert!(stderr_of("return 1;").contains("Use of 'return' outside of a function"));
}

#[test]
fn test_empty_loop_bodies_are_legal() {
    let source = "var i = 0; while i < 3 i += 1; print i;";
    assert_eq!(stdout_of(source), "3");
}
