//! Integration tests for the gibberish -> English direction, plus the
//! round-trip properties: whatever one printer emits, the other grammar
//! parses back to the same thing.

use cdecl::{translate, Lang, Session};

fn session(lang: Lang) -> Session {
    let mut session = Session::new();
    session.options.lang = lang;
    session
}

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
        "explain int (*x)[10]",
        "declare x as pointer to array 10 of int",
    );
}

#[test]
fn test_array_of_pointer_to_function() {
    expect_output(
        &mut session(Lang::C_17),
        "explain int (*a[3])(char)",
        "declare a as array 3 of pointer to function (char) returning int",
    );
}

#[test]
fn test_function_with_named_parameters() {
    expect_output(
        &mut session(Lang::C_17),
        "explain char *f(int x, int y)",
        "declare f as function (x as int, y as int) returning pointer to \
         char",
    );
}

#[test]
fn test_member_function_pointer() {
    expect_output(
        &mut session(Lang::CPP_17),
        "explain void (C::*p)(int)",
        "declare p as pointer to member of class C of function (int) \
         returning void",
    );
}

#[test]
fn test_qualifiers() {
    expect_output(
        &mut session(Lang::C_17),
        "explain const char *volatile p",
        "declare p as volatile pointer to const char",
    );
}

#[test]
fn test_east_and_west_const_read_the_same() {
    let mut session = session(Lang::C_17);
    let east = translate(&mut session, "explain int const *p")
        .unwrap()
        .output
        .unwrap();
    let west = translate(&mut session, "explain const int *p")
        .unwrap()
        .output
        .unwrap();
    assert_eq!(east, west);
    assert_eq!(east, "declare p as pointer to const int");
}

#[test]
fn test_digraphs_parse_on_input() {
    expect_output(
        &mut session(Lang::C_17),
        "explain int (*x)<:10:>",
        "declare x as pointer to array 10 of int",
    );
}

#[test]
fn test_trigraphs_parse_on_input() {
    expect_output(
        &mut session(Lang::C_17),
        "explain int (*x)??(10??)",
        "declare x as pointer to array 10 of int",
    );
}

#[test]
fn test_typedef_reference() {
    expect_output(
        &mut session(Lang::C_17),
        "explain size_t n",
        "declare n as size_t",
    );
}

#[test]
fn test_typedef_storage_reads_as_define() {
    expect_output(
        &mut session(Lang::C_17),
        "explain typedef unsigned long ull",
        "define ull as unsigned long",
    );
}

#[test]
fn test_multiple_declarators() {
    expect_output(
        &mut session(Lang::C_17),
        "explain int *p, q[4]",
        "declare p as pointer to int\ndeclare q as array 4 of int",
    );
}

#[test]
fn test_function_tail_qualifiers() {
    expect_output(
        &mut session(Lang::CPP_17),
        "explain void C::f() const noexcept",
        "declare C::f as const non-throwing function returning void",
    );
}

#[test]
fn test_knr_parameters() {
    expect_output(
        &mut session(Lang::C_KNR),
        "explain f(x, y)",
        "declare f as function (x, y) returning int",
    );
}

#[test]
fn test_bit_field() {
    expect_output(
        &mut session(Lang::C_17),
        "explain unsigned flags : 4",
        "declare flags as unsigned width 4 bits",
    );
}

#[test]
fn test_enum_class_with_underlying_type() {
    expect_output(
        &mut session(Lang::CPP_17),
        "explain enum class color : char c",
        "declare c as enum class color of type char",
    );
}

/// English -> gibberish -> English -> gibberish must close: the explain
/// output of the declared gibberish is a declare command that produces the
/// same gibberish again.
#[test]
fn test_round_trip_from_english() {
    let english = [
        "declare x as pointer to array 10 of const int",
        "declare a as array 3 of pointer to function (char) returning int",
        "declare f as function (x as int, y as int) returning pointer to \
         char",
        "declare q as pointer to pointer to unsigned long",
        "declare v as volatile pointer to const char",
        "declare f as function (fmt as pointer to const char, ...) \
         returning int",
    ];
    let mut session = session(Lang::C_17);
    translate(&mut session, "set nosemicolon").unwrap();
    for src in english.iter() {
        let gibberish = translate(&mut session, src)
            .unwrap_or_else(|e| panic!("`{}` errored:\n{}", src, e))
            .output
            .unwrap();
        let explained = translate(
            &mut session,
            &format!("explain {}", gibberish),
        )
        .unwrap_or_else(|e| {
            panic!("`explain {}` errored:\n{}", gibberish, e)
        })
        .output
        .unwrap();
        let again = translate(&mut session, &explained)
            .unwrap_or_else(|e| {
                panic!("`{}` errored:\n{}", explained, e)
            })
            .output
            .unwrap();
        assert_eq!(gibberish, again, "round trip of `{}`", src);
    }
}

/// The reverse: gibberish -> English -> gibberish -> English.
#[test]
fn test_round_trip_from_gibberish() {
    let gibberish = [
        "explain int (*x)[10]",
        "explain char **argv",
        "explain unsigned long n",
        "explain int (*f)(int, char)",
        "explain int const *p",
    ];
    let mut session = session(Lang::C_17);
    translate(&mut session, "set nosemicolon").unwrap();
    for src in gibberish.iter() {
        let english = translate(&mut session, src)
            .unwrap_or_else(|e| panic!("`{}` errored:\n{}", src, e))
            .output
            .unwrap();
        let declared = translate(&mut session, &english)
            .unwrap_or_else(|e| {
                panic!("`{}` errored:\n{}", english, e)
            })
            .output
            .unwrap();
        let again = translate(
            &mut session,
            &format!("explain {}", declared),
        )
        .unwrap()
        .output
        .unwrap();
        assert_eq!(english, again, "round trip of `{}`", src);
    }
}

/// Printing with trigraphs and re-parsing lands on the same declaration.
#[test]
fn test_trigraph_round_trip() {
    let mut session = session(Lang::C_11);
    translate(&mut session, "set trigraphs nosemicolon").unwrap();
    let with_graphs = translate(
        &mut session,
        "declare a as array 4 of pointer to int",
    )
    .unwrap()
    .output
    .unwrap();
    assert_eq!(with_graphs, "int *a??(4??)");
    let explained = translate(
        &mut session,
        &format!("explain {}", with_graphs),
    )
    .unwrap()
    .output
    .unwrap();
    assert_eq!(
        explained,
        "declare a as array 4 of pointer to int"
    );
}
