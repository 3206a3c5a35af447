//! Integration tests for the session surface: typedef definitions, the
//! `show` command, option handling, and the help/quit plumbing.

use cdecl::{translate, Lang, Session};

fn session(lang: Lang) -> Session {
    let mut session = Session::new();
    session.options.lang = lang;
    session
}

fn run(session: &mut Session, src: &str) -> Option<String> {
    translate(session, src)
        .unwrap_or_else(|e| panic!("`{}` errored:\n{}", src, e))
        .output
}

#[test]
fn test_define_then_use() {
    let mut session = session(Lang::C_17);
    assert_eq!(run(&mut session, "define word as unsigned int"), None);
    assert_eq!(
        run(&mut session, "declare w as pointer to word").as_deref(),
        Some("word *w;")
    );
    assert_eq!(
        run(&mut session, "explain word *w").as_deref(),
        Some("declare w as pointer to word")
    );
}

#[test]
fn test_typedef_command() {
    let mut session = session(Lang::C_17);
    assert_eq!(run(&mut session, "typedef unsigned long ulong"), None);
    assert_eq!(
        run(&mut session, "show ulong").as_deref(),
        Some("typedef unsigned long ulong;")
    );
}

#[test]
fn test_typedef_with_declarator() {
    let mut session = session(Lang::C_17);
    run(&mut session, "typedef int (*callback)(void)");
    assert_eq!(
        run(&mut session, "show callback").as_deref(),
        Some("typedef int (*callback)();")
    );
    assert_eq!(
        run(&mut session, "explain callback cb").as_deref(),
        Some("declare cb as callback")
    );
}

#[test]
fn test_using_command() {
    let mut session = session(Lang::CPP_17);
    assert_eq!(run(&mut session, "using word = unsigned int"), None);
    assert_eq!(
        run(&mut session, "show word").as_deref(),
        Some("using word = unsigned int;")
    );
}

#[test]
fn test_using_requires_cpp11() {
    let mut session = session(Lang::C_17);
    let err = translate(&mut session, "using word = unsigned int")
        .unwrap_err()
        .to_string();
    assert!(
        err.contains("\"using declaration\" is not supported in C17"),
        "got: {}",
        err
    );
}

#[test]
fn test_show_flavor_override() {
    let mut session = session(Lang::CPP_17);
    run(&mut session, "define word as unsigned int");
    assert_eq!(
        run(&mut session, "show word typedef").as_deref(),
        Some("typedef unsigned int word;")
    );
    assert_eq!(
        run(&mut session, "show word using").as_deref(),
        Some("using word = unsigned int;")
    );
}

#[test]
fn test_show_user_lists_only_user_typedefs() {
    let mut session = session(Lang::C_17);
    run(&mut session, "define mine as pointer to char");
    run(&mut session, "define other as long");
    assert_eq!(
        run(&mut session, "show user").as_deref(),
        Some("typedef char *mine;\ntypedef long other;")
    );
}

#[test]
fn test_show_predefined_respects_language() {
    let mut c89 = session(Lang::C_89);
    let c89_list = run(&mut c89, "show predefined").unwrap();
    assert!(c89_list.contains("size_t"));
    assert!(!c89_list.contains("uint8_t"));

    let mut c99 = session(Lang::C_99);
    let c99_list = run(&mut c99, "show predefined").unwrap();
    assert!(c99_list.contains("uint8_t"));
}

#[test]
fn test_show_unknown_name_suggests() {
    let mut session = session(Lang::C_99);
    let err = translate(&mut session, "show sizet")
        .unwrap_err()
        .to_string();
    assert!(err.contains("did you mean size_t?"), "got: {}", err);
}

#[test]
fn test_scoped_typedef_prints_namespaced() {
    let mut session = session(Lang::CPP_17);
    assert_eq!(
        run(&mut session, "show std::size_t").as_deref(),
        Some("namespace std { using size_t = unsigned long; }")
    );
    // pre-C++17 falls back to one namespace per brace
    session.options.lang = Lang::CPP_11;
    assert_eq!(
        run(&mut session, "show std::size_t").as_deref(),
        Some("namespace std { using size_t = unsigned long; }")
    );
}

#[test]
fn test_identical_redefinition_is_a_noop() {
    let mut session = session(Lang::C_17);
    run(&mut session, "define word as unsigned int");
    assert_eq!(run(&mut session, "define word as unsigned int"), None);
    let err = translate(&mut session, "define word as long")
        .unwrap_err()
        .to_string();
    assert!(
        err.contains("\"word\" is already defined with a different type"),
        "got: {}",
        err
    );
}

#[test]
fn test_set_without_arguments_lists_options() {
    let mut session = session(Lang::C_17);
    let listing = run(&mut session, "set").unwrap();
    assert!(listing.contains("lang=C17"));
    assert!(listing.contains("east-const"));
    assert!(listing.contains("semicolon"));
}

#[test]
fn test_set_language_switches_dialect() {
    let mut session = session(Lang::C_17);
    run(&mut session, "set c++17");
    assert_eq!(session.options.lang, Lang::CPP_17);
    run(&mut session, "set lang=c99");
    assert_eq!(session.options.lang, Lang::C_99);
}

#[test]
fn test_language_gates_typedef_visibility() {
    let mut session = session(Lang::C_99);
    // fine in C99...
    assert!(translate(&mut session, "explain uint8_t x").is_ok());
    // ...unknown (with a hint) after dropping to C89
    run(&mut session, "set c89");
    let err = translate(&mut session, "explain uint8_t x")
        .unwrap_err()
        .to_string();
    assert!(err.contains("\"uint8_t\" is unknown"), "got: {}", err);
}

#[test]
fn test_help_lists_commands() {
    let mut session = session(Lang::C_17);
    let help = run(&mut session, "help").unwrap();
    for command in ["declare", "cast", "explain", "typedef", "show", "set"]
        .iter()
    {
        assert!(help.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_quit_and_empty_commands() {
    let mut session = session(Lang::C_17);
    assert!(translate(&mut session, "quit").unwrap().quit);
    assert!(translate(&mut session, "exit").unwrap().quit);
    let response = translate(&mut session, "   ").unwrap();
    assert!(!response.quit);
    assert_eq!(response.output, None);
}
