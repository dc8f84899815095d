mod common;

use common::*;
use proptest::prelude::*;

fn list_code(items: &[i64]) -> String {
    let items = items.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    format!("(list {})", items.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn interning_is_idempotent(name in "[a-z][a-z0-9-]{0,8}") {
        let mut engine = Engine::default();
        let a = engine.intern(&name);
        let b = engine.intern(&name);
        prop_assert_eq!(a, b);

        let code = format!("(eql (sym \"{}\") '{})", name, name);
        prop_assert_eq!(eval_show(&mut engine, &code), "t");
    }

    #[test]
    fn slice_length(items in prop::collection::vec(-100i64..100, 0..12), a in 0usize..12, b in 0usize..12) {
        let (s, e) = (a.min(b).min(items.len()), a.max(b).min(items.len()));
        let code = format!("(length (slice {} {} {}))", s, e, list_code(&items));
        prop_assert_eq!(show(&code), (e - s).to_string());
    }

    #[test]
    fn cat_length(a in "[a-c]{0,6}", b in "[a-c]{0,6}") {
        let code = format!("(length (cat \"{}\" '{}x))", a, b);
        prop_assert_eq!(show(&code), (a.len() + b.len() + 1).to_string());
    }

    #[test]
    fn elem_bounds(items in prop::collection::vec(-100i64..100, 0..8), i in -10i64..10) {
        let mut engine = Engine::default();
        let code = format!("(elem {} {})", i, list_code(&items));
        if i >= 0 && (i as usize) < items.len() {
            prop_assert_eq!(eval_show(&mut engine, &code), items[i as usize].to_string());
        } else {
            prop_assert_eq!(error_kind(&mut engine, &code), ErrorKind::Index);
        }
    }

    #[test]
    fn slice_bounds(len in 0usize..6, s in -8i64..8, e in -8i64..8) {
        let mut engine = Engine::default();
        let items = vec![0; len];
        let code = format!("(slice {} {} {})", s, e, list_code(&items));
        let n = len as i64;
        if 0 <= s && s <= e && e <= n {
            prop_assert_eq!(eval_show(&mut engine, &format!("(length {})", code)), (e - s).to_string());
        } else {
            prop_assert_eq!(error_kind(&mut engine, &code), ErrorKind::Index);
        }
    }

    #[test]
    fn cmp_laws(a in "[a-c]{0,5}", b in "[a-c]{0,5}") {
        let mut engine = Engine::default();
        let ab = eval_show(&mut engine, &format!("(cmp \"{}\" \"{}\")", a, b)).parse::<i64>().unwrap();
        let ba = eval_show(&mut engine, &format!("(cmp \"{}\" \"{}\")", b, a)).parse::<i64>().unwrap();
        prop_assert_eq!(ab, -ba);
        prop_assert_eq!(ab == 0, a == b);
        prop_assert_eq!(ab < 0, a < b);
    }
}

#[test]
fn list_mutation() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq l (list 1 2))");
    assert_eq!(eval_show(&mut engine, "(push l 3 4)"), "(1 2 3 4)");
    assert_eq!(eval_show(&mut engine, "(pop l)"), "4");
    assert_eq!(eval_show(&mut engine, "(elem-set 0 l 9)"), "9");
    assert_eq!(eval_show(&mut engine, "l"), "(9 2 3)");
    assert_eq!(eval_show(&mut engine, "(clear l)"), "()");
    assert_eq!(eval_show(&mut engine, "(pop l)"), "nil");
}

#[test]
fn elem_and_slice_across_kinds() {
    assert_eq!(show("(elem 1 \"abc\")"), "\"b\"");
    assert_eq!(show("(elem 2 (list 1 2 3))"), "3");
    assert_eq!(show("(slice 1 5 \"hello\")"), "\"ello\"");
    assert_eq!(show("(slice 0 2 'symbol)"), "\"sy\"");
    assert_eq!(show("(slice 1 2 (list 1 2 3))"), "(2)");
    assert_eq!(show("(length 'abc)"), "3");
    assert_eq!(show("(cat (list 1) (list) (list 2 3))"), "(1 2 3)");
    assert_eq!(show("(cat \"ab\" 'cd)"), "\"abcd\"");
}

#[test]
fn copy_is_deep_and_keeps_sharing() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq a (list 1 (list 2)))");
    eval_show(&mut engine, "(defq b (copy a))");
    eval_show(&mut engine, "(push (elem 1 b) 3)");
    assert_eq!(eval_show(&mut engine, "(list a b)"), "((1 (2)) (1 (2 3)))");

    eval_show(&mut engine, "(defq c (list 1))");
    eval_show(&mut engine, "(push c c)");
    eval_show(&mut engine, "(defq d (copy c))");
    assert_eq!(eval_show(&mut engine, "(eql (elem 1 d) d)"), "t");
    assert_eq!(eval_show(&mut engine, "(eql d c)"), "nil");
}

#[test]
fn searching_and_splitting() {
    assert_eq!(show("(find 3 (list 1 2 3))"), "2");
    assert_eq!(show("(find 9 (list 1))"), "nil");
    assert_eq!(show("(find \"c\" \"abc\")"), "2");
    assert_eq!(show("(find \"ab\" (list \"x\" \"ab\"))"), "1");
    assert_eq!(show("(split \"a, b,,c\" \", \")"), "(\"a\" \"b\" \"c\")");
    assert_eq!(show("(split \"\" \",\")"), "()");
    assert_eq!(show("(match? (list 1 'a 3) '(1 _ 3))"), "t");
    assert_eq!(show("(match? (list 1 2) '(1 _ 3))"), "nil");
    assert_eq!(show("(merge-sym (list 'a 'b) (list 'b 'c))"), "(a b c)");
}

#[test]
fn each_and_some() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq out (list))");
    eval_show(&mut engine, "(each! 0 -1 (lambda (c) (push out c)) (list \"abc\"))");
    assert_eq!(eval_show(&mut engine, "out"), "(\"a\" \"b\" \"c\")");

    eval_show(&mut engine, "(clear out)");
    eval_show(&mut engine, "(each! -1 0 (lambda (x y) (push out (add x y) _)) (list (list 1 2 3) (list 10 20)))");
    assert_eq!(eval_show(&mut engine, "out"), "(22 1 11 0)");

    assert_eq!(
        eval_show(&mut engine, "(some! 0 -1 nil (lambda (x) (cond ((gt x 2) x))) (list (list 1 2 3 4)))"),
        "3",
    );
    assert_eq!(eval_show(&mut engine, "(some! 0 -1 t (lambda (x) (lt x 10)) (list (list 1 2 3)))"), "t");
    assert_eq!(eval_show(&mut engine, "(some! 0 -1 t (lambda (x) (lt x 10)) (list (list 1 11 3)))"), "nil");
    assert_eq!(eval_show(&mut engine, "(some! 0 -1 t (lambda (x) nil) (list (list)))"), "t");
}

#[test]
fn partition_around_the_first_element() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq l (list 3 1 4 1 5 2))");
    assert_eq!(eval_show(&mut engine, "(partition (lambda (a b) (sub a b)) l 0 -1)"), "3");
    assert_eq!(eval_show(&mut engine, "l"), "(2 1 1 3 5 4)");
}

#[test]
fn characters_and_strings() {
    let mut engine = Engine::default();
    assert_eq!(eval_show(&mut engine, "(code \"A\")"), "65");
    assert_eq!(eval_show(&mut engine, "(code \"AB\" 1)"), "66");
    assert_eq!(eval_show(&mut engine, "(char 66)"), "\"B\"");
    assert_eq!(error_kind(&mut engine, "(char 256)"), ErrorKind::Type);
    assert_eq!(error_kind(&mut engine, "(char -1)"), ErrorKind::Type);
    assert_eq!(error_kind(&mut engine, "(write-char (string-stream \"\") 300)"), ErrorKind::Type);
    assert_eq!(error_kind(&mut engine, "(code \"AB\" -1)"), ErrorKind::Index);

    let val = engine.eval_str("(str '(1 \"a\"))").unwrap();
    assert_eq!(engine.string(val), Some(&b"(1 \"a\")"[..]));
    let val = engine.eval_str("(str \"plain\")").unwrap();
    assert_eq!(engine.string(val), Some(&b"plain"[..]));
}
