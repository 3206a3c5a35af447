//! Integration tests for commands that must produce diagnostics. The
//! expected strings pin the full rendered error output, including source
//! locations.

use cdecl::{translate, Lang, Session};

fn session(lang: Lang) -> Session {
    let mut session = Session::new();
    session.options.lang = lang;
    session
}

/// Runs the command, expecting it to fail with exactly the given error
/// lines.
fn expect_errors(session: &mut Session, src: &str, expected: &[&str]) {
    let errors = match translate(session, src) {
        Err(errors) => errors,
        Ok(response) => panic!(
            "`{}` unexpectedly succeeded: {:?}",
            src, response.output
        ),
    };
    assert_eq!(
        format!("{}", errors),
        expected.join("\n"),
        "for `{}`",
        src
    );
}

#[test]
fn test_type_conflict_points_at_second_token() {
    expect_errors(
        &mut session(Lang::C_89),
        "explain int signed short long x",
        &["\"short\" and \"long\" cannot be combined @ 1:26 to 1:30"],
    );
}

#[test]
fn test_array_of_reference() {
    expect_errors(
        &mut session(Lang::CPP_17),
        "declare x as array of reference to int",
        &["array of reference is illegal @ 1:14 to 1:19"],
    );
}

#[test]
fn test_register_in_cpp17() {
    expect_errors(
        &mut session(Lang::CPP_17),
        "declare r as register int",
        &["\"register\" is not supported in C++17 @ 1:14 to 1:22"],
    );
}

#[test]
fn test_register_deprecated_in_cpp11_is_only_a_warning() {
    let mut session = session(Lang::CPP_11);
    let response =
        translate(&mut session, "declare r as register int").unwrap();
    assert_eq!(response.output.as_deref(), Some("register int r;"));
    let warnings = response.warnings.unwrap().to_string();
    assert!(
        warnings.contains("\"register\" is deprecated in C++11"),
        "got: {}",
        warnings
    );
}

#[test]
fn test_bool_requires_c99() {
    expect_errors(
        &mut session(Lang::C_89),
        "explain bool b",
        &["\"bool\" is not supported in C89 (requires C99 or later) \
           @ 1:9 to 1:13"],
    );
}

#[test]
fn test_reference_requires_cpp() {
    expect_errors(
        &mut session(Lang::C_99),
        "declare r as reference to int",
        &["\"reference\" is not supported in C99 (requires C++98 or \
           later) @ 1:14 to 1:23"],
    );
}

#[test]
fn test_pointer_to_reference() {
    expect_errors(
        &mut session(Lang::CPP_17),
        "declare p as pointer to reference to int",
        &["pointer to reference is illegal @ 1:14 to 1:21"],
    );
}

#[test]
fn test_function_returning_function() {
    expect_errors(
        &mut session(Lang::C_17),
        "declare f as function returning function returning int",
        &["function returning function is illegal; use function \
           returning pointer to function @ 1:14 to 1:22"],
    );
}

#[test]
fn test_unknown_type_gets_suggestions() {
    expect_errors(
        &mut session(Lang::C_17),
        "explain itn x",
        &["\"itn\" is unknown; did you mean int? @ 1:9 to 1:12"],
    );
}

#[test]
fn test_unknown_command_gets_suggestions() {
    expect_errors(
        &mut session(Lang::C_17),
        "explian int x",
        &["\"explian\" is unknown; did you mean explain? @ 1:1 to 1:8"],
    );
}

#[test]
fn test_unknown_set_option_gets_suggestions() {
    expect_errors(
        &mut session(Lang::C_17),
        "set eastconst",
        &["\"eastconst\" is unknown; did you mean east-const? \
           @ 1:5 to 1:14"],
    );
}

#[test]
fn test_variadic_alone() {
    expect_errors(
        &mut session(Lang::C_17),
        "explain int f(...)",
        &["\"...\" cannot be the only parameter @ 1:15 to 1:18"],
    );
}

#[test]
fn test_static_bit_field() {
    expect_errors(
        &mut session(Lang::C_17),
        "explain static int x : 4",
        &["a static member cannot be a bit-field @ 1:9 to 1:15"],
    );
}

#[test]
fn test_named_cast_requires_cpp() {
    expect_errors(
        &mut session(Lang::C_17),
        "cast static x into pointer to int",
        &["\"static_cast\" is not supported in C17 (requires C++98 or \
           later) @ 1:6 to 1:12"],
    );
}

#[test]
fn test_multiple_errors_in_one_command() {
    // both problems are reported before anything is printed
    expect_errors(
        &mut session(Lang::CPP_17),
        "declare x as array of pointer to reference to register int",
        &[
            "pointer to reference is illegal @ 1:23 to 1:30",
            "\"register\" is illegal for nested types @ 1:47 to 1:55",
            "\"register\" is not supported in C++17 @ 1:47 to 1:55",
        ],
    );
}

#[test]
fn test_implicit_int_is_an_error_in_c23() {
    expect_errors(
        &mut session(Lang::C_23),
        "explain static x",
        &["\"implicit int\" is not supported in C23 @ 1:9 to 1:15"],
    );
}

#[test]
fn test_errors_suppress_output_but_warnings_do_not() {
    let mut session = session(Lang::C_89);
    // warning only: output still produced
    let response =
        translate(&mut session, "explain register x").unwrap();
    assert!(response.output.is_some());
    assert!(response.warnings.is_some());
    // error: no output
    assert!(translate(&mut session, "explain bool b").is_err());
}
