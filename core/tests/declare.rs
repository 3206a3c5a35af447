//! Integration tests for the English -> gibberish direction. Each test
//! runs a command against a fresh session and expects the exact printed
//! declaration.

use cdecl::{translate, Lang, Session};

fn session(lang: Lang) -> Session {
    let mut session = Session::new();
    session.options.lang = lang;
    session
}

/// Runs the command, expecting it to succeed with exactly `expected` on
/// the output stream.
fn expect_output(session: &mut Session, src: &str, expected: &str) {
    let response = translate(session, src)
        .unwrap_or_else(|e| panic!("`{}` errored:\n{}", src, e));
    assert_eq!(
        response.output.as_deref(),
        Some(expected),
        "for `{}`",
        src
    );
}

#[test]
fn test_pointer_to_array() {
    expect_output(
        &mut session(Lang::C_17),
        "declare x as pointer to array 10 of const int",
        "int const (*x)[10];",
    );
}

#[test]
fn test_function_returning_pointer() {
    expect_output(
        &mut session(Lang::C_17),
        "declare f as function (x as int, y as int) returning pointer to \
         char",
        "char *f(int x, int y);",
    );
}

#[test]
fn test_array_of_pointer_to_function() {
    expect_output(
        &mut session(Lang::C_17),
        "declare a as array 3 of pointer to function (char) returning int",
        "int (*a[3])(char);",
    );
}

#[test]
fn test_pointer_to_member_function() {
    expect_output(
        &mut session(Lang::CPP_17),
        "declare p as pointer to member of class C of function (int) \
         returning void",
        "void (C::*p)(int);",
    );
}

#[test]
fn test_storage_class_prints_first() {
    expect_output(
        &mut session(Lang::C_17),
        "declare s as static pointer to char",
        "static char *s;",
    );
}

#[test]
fn test_double_pointer_collapses() {
    expect_output(
        &mut session(Lang::C_17),
        "declare p as pointer to pointer to char",
        "char **p;",
    );
}

#[test]
fn test_const_pointer_vs_pointer_to_const() {
    let mut session = session(Lang::C_17);
    expect_output(
        &mut session,
        "declare p as const pointer to int",
        "int *const p;",
    );
    expect_output(
        &mut session,
        "declare q as pointer to const int",
        "int const *q;",
    );
}

#[test]
fn test_west_const_mode() {
    let mut session = session(Lang::C_17);
    translate(&mut session, "set noeast-const").unwrap();
    expect_output(
        &mut session,
        "declare q as pointer to const int",
        "const int *q;",
    );
}

#[test]
fn test_no_semicolon_mode() {
    let mut session = session(Lang::C_17);
    translate(&mut session, "set nosemicolon").unwrap();
    expect_output(
        &mut session,
        "declare x as pointer to int",
        "int *x",
    );
}

#[test]
fn test_multiple_names() {
    expect_output(
        &mut session(Lang::C_17),
        "declare x, y as pointer to char",
        "char *x;\nchar *y;",
    );
}

#[test]
fn test_reference_and_rvalue_reference() {
    let mut session = session(Lang::CPP_17);
    expect_output(
        &mut session,
        "declare r as reference to int",
        "int &r;",
    );
    expect_output(
        &mut session,
        "declare r as rvalue reference to int",
        "int &&r;",
    );
}

#[test]
fn test_alt_tokens() {
    let mut session = session(Lang::CPP_17);
    translate(&mut session, "set alt-tokens").unwrap();
    expect_output(
        &mut session,
        "declare r as reference to int",
        "int bitand r;",
    );
}

#[test]
fn test_digraphs() {
    let mut session = session(Lang::C_11);
    translate(&mut session, "set digraphs").unwrap();
    expect_output(
        &mut session,
        "declare a as array 4 of int",
        "int a<:4:>;",
    );
}

#[test]
fn test_trigraphs() {
    let mut session = session(Lang::C_11);
    translate(&mut session, "set trigraphs").unwrap();
    expect_output(
        &mut session,
        "declare a as array 4 of int",
        "int a??(4??);",
    );
}

#[test]
fn test_apple_block() {
    expect_output(
        &mut session(Lang::C_17),
        "declare b as block (x as int) returning int",
        "int (^b)(int x);",
    );
}

#[test]
fn test_variadic_function() {
    expect_output(
        &mut session(Lang::C_17),
        "declare f as function (fmt as pointer to const char, ...) \
         returning int",
        "int f(char const *fmt, ...);",
    );
}

#[test]
fn test_unnamed_parameters() {
    expect_output(
        &mut session(Lang::C_17),
        "declare f as function (int, pointer to char) returning void",
        "void f(int, char *);",
    );
}

#[test]
fn test_typedef_name_as_type() {
    expect_output(
        &mut session(Lang::C_17),
        "declare n as size_t",
        "size_t n;",
    );
}

#[test]
fn test_enum_and_struct() {
    let mut session = session(Lang::C_17);
    expect_output(
        &mut session,
        "declare e as enum color",
        "enum color e;",
    );
    expect_output(
        &mut session,
        "declare p as pointer to struct point",
        "struct point *p;",
    );
}

#[test]
fn test_operator() {
    expect_output(
        &mut session(Lang::CPP_17),
        "declare + as operator (x as int, y as int) returning int",
        "int operator+(int x, int y);",
    );
}

#[test]
fn test_constructor_and_destructor() {
    let mut session = session(Lang::CPP_17);
    expect_output(
        &mut session,
        "declare C as constructor (x as int)",
        "C(int x);",
    );
    expect_output(&mut session, "declare C as destructor", "~C();");
}

#[test]
fn test_member_function_tail_const() {
    expect_output(
        &mut session(Lang::CPP_17),
        "declare f as const member function (int) returning void",
        "void f(int) const;",
    );
}

#[test]
fn test_bit_field() {
    expect_output(
        &mut session(Lang::C_17),
        "declare flags as unsigned width 4 bits",
        "unsigned flags : 4;",
    );
}

#[test]
fn test_plain_cast() {
    expect_output(
        &mut session(Lang::C_17),
        "cast x into pointer to int",
        "(int *)x",
    );
}

#[test]
fn test_static_cast() {
    expect_output(
        &mut session(Lang::CPP_17),
        "cast static p into pointer to void",
        "static_cast<void *>(p)",
    );
}

#[test]
fn test_scoped_declaration_name() {
    expect_output(
        &mut session(Lang::CPP_17),
        "declare std::terminate as function returning void",
        "void std::terminate();",
    );
}

#[test]
fn test_implicit_int_in_knr() {
    // K&R C: no base type needed, and nothing is printed for it
    expect_output(
        &mut session(Lang::C_KNR),
        "declare f as function (x) returning pointer to char",
        "char *f(x);",
    );
}
