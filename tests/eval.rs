mod common;

use common::*;

#[test]
fn arithmetic_and_comparison() {
    assert_eq!(show("(add 1 2 3)"), "6");
    assert_eq!(show("(sub 10 1 2)"), "7");
    assert_eq!(show("(mul 2 -3)"), "-6");
    assert_eq!(show("(div 7 2)"), "3");
    assert_eq!(show("(mod 7 3)"), "1");
    assert_eq!(show("(max 3 9 2)"), "9");
    assert_eq!(show("(min 3 9 2)"), "2");
    assert_eq!(show("(add 9223372036854775807 1)"), "-9223372036854775808");

    assert_eq!(show("(eq 1 1 1)"), "t");
    assert_eq!(show("(ne 1 2 1)"), "nil");
    assert_eq!(show("(ne 1 2 3)"), "t");
    assert_eq!(show("(lt 1 2 3)"), "t");
    assert_eq!(show("(lt 1 3 2)"), "nil");
    assert_eq!(show("(ge 3 3 1)"), "t");
    assert_eq!(show("(eql \"ab\" \"ab\")"), "t");
    assert_eq!(show("(eql (list 1) (list 1))"), "nil");
    assert_eq!(show("(eql 'a 'a)"), "t");
}

#[test]
fn bitwise() {
    assert_eq!(show("(bit-and 12 10)"), "8");
    assert_eq!(show("(bit-or 12 10)"), "14");
    assert_eq!(show("(bit-xor 12 10)"), "6");
    assert_eq!(show("(bit-shl 1 4)"), "16");
    assert_eq!(show("(bit-shr -1 60)"), "15");
    assert_eq!(show("(bit-asr -16 2)"), "-4");
}

#[test]
fn atoms_evaluate_to_themselves() {
    assert_eq!(show("42"), "42");
    assert_eq!(show("\"text\""), "\"text\"");
    assert_eq!(show("()"), "()");
    assert_eq!(show("nil"), "nil");
    assert_eq!(show("t"), "t");
    assert_eq!(show("add"), "<function add>");
    assert_eq!(show("(list cond)"), "(<function cond>)");
}

#[test]
fn defq_inside_a_call_stays_local() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq x 1)");
    eval_show(&mut engine, "(defq f (lambda () (defq y 5) (setq x 2)))");
    eval_show(&mut engine, "(f)");
    assert_eq!(eval_show(&mut engine, "x"), "2");
    assert_eq!(eval_show(&mut engine, "(def? 'y)"), "nil");
}

#[test]
fn setq_follows_the_defining_scope() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq v 1)");
    eval_show(&mut engine, "(defq setter (lambda () (setq v 42)))");
    eval_show(&mut engine, "(defq caller (lambda () (defq v 7) (setter) v))");
    assert_eq!(eval_show(&mut engine, "(caller)"), "7");
    assert_eq!(eval_show(&mut engine, "v"), "42");
}

#[test]
fn closures_capture_their_environment() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq make (lambda () (defq n 0) (lambda () (setq n (add n 1)))))");
    eval_show(&mut engine, "(defq counter (make))");
    eval_show(&mut engine, "(counter)");
    assert_eq!(eval_show(&mut engine, "(counter)"), "2");
    assert_eq!(eval_show(&mut engine, "(def? 'n)"), "nil");
}

#[test]
fn quasi_quote() {
    assert_eq!(show("`(1 ,(add 1 1) 3)"), "(1 2 3)");
    assert_eq!(show("`(1 ,@(list 2 3) 4)"), "(1 2 3 4)");
    assert_eq!(show("`(a (b ,(add 2 3)) ,@(list))"), "(a (b 5))");
    assert_eq!(show("`x"), "x");
}

#[test]
fn macros_expand_then_evaluate() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defmacro twice (form) `(progn ,form ,form))");
    eval_show(&mut engine, "(defq hits 0)");
    eval_show(&mut engine, "(twice (setq hits (add hits 1)))");
    assert_eq!(eval_show(&mut engine, "hits"), "2");

    eval_show(&mut engine, "(defmacro my-if (c a b) `(cond (,c ,a) (t ,b)))");
    assert_eq!(eval_show(&mut engine, "(my-if nil (throw \"no\" 1) 2)"), "2");

    // Applied directly, a macro only expands.
    assert_eq!(eval_show(&mut engine, "(apply twice '((f)))"), "(progn (f) (f))");
}

#[test]
fn optional_and_rest_parameters() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq f (lambda (a &optional b &rest c) (list a b c)))");
    assert_eq!(eval_show(&mut engine, "(f 1)"), "(1 nil ())");
    assert_eq!(eval_show(&mut engine, "(f 1 2)"), "(1 2 ())");
    assert_eq!(eval_show(&mut engine, "(f 1 2 3 4)"), "(1 2 (3 4))");

    eval_show(&mut engine, "(defq g (lambda ((x y) _) (add x y)))");
    assert_eq!(eval_show(&mut engine, "(g (list 3 4) 'ignored)"), "7");
}

#[test]
fn cond_and_while() {
    assert_eq!(show("(cond (nil 1) ((eq 1 2) 2) (t 3))"), "3");
    assert_eq!(show("(cond (nil 1))"), "nil");
    assert_eq!(show("(cond ((add 1 1)))"), "2");
    assert_eq!(show("(while nil 1)"), "nil");

    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq i 0 acc (list))");
    eval_show(&mut engine, "(while (lt i 3) (push acc i) (setq i (add i 1)))");
    assert_eq!(eval_show(&mut engine, "acc"), "(0 1 2)");
}

#[test]
fn apply_eval_and_environments() {
    let mut engine = Engine::default();
    assert_eq!(eval_show(&mut engine, "(apply add (list 1 2 3))"), "6");
    assert_eq!(eval_show(&mut engine, "(eval '(add 1 2))"), "3");

    eval_show(&mut engine, "(defq e (env nil))");
    eval_show(&mut engine, "(def e 'b 2 'a 1)");
    assert_eq!(eval_show(&mut engine, "(eval 'a e)"), "1");
    assert_eq!(eval_show(&mut engine, "e"), "{[a : 1][b : 2]}");
    assert_eq!(eval_show(&mut engine, "(def? 'a)"), "nil");
    assert_eq!(eval_show(&mut engine, "(def? 'a e)"), "1");

    eval_show(&mut engine, "(set e 'a 10)");
    assert_eq!(eval_show(&mut engine, "(eval 'a e)"), "10");

    eval_show(&mut engine, "(defq child (env (env)))");
    assert_eq!(eval_show(&mut engine, "(eval '(add 1 1) child)"), "2");
}

#[test]
fn bind_destructures_into_the_current_scope() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(bind '(a (b c)) (list 1 (list 2 3)))");
    assert_eq!(eval_show(&mut engine, "(list a b c)"), "(1 2 3)");
}

#[test]
fn symbols_and_gensym() {
    assert_eq!(show("(eql (sym \"abc\") 'abc)"), "t");
    assert_eq!(show("(eql (gensym) (gensym))"), "nil");
}

#[test]
fn printing() {
    let (mut engine, out) = capturing();
    eval_show(&mut engine, "(print \"hi\" 1)");
    eval_show(&mut engine, "(prin '(a \"b\"))");
    assert_eq!(out.contents(), "hi1\n(a \"b\")");
    assert_eq!(eval_show(&mut engine, "(print)"), "nil");
}

#[test]
fn closures_print_as_their_form() {
    assert_eq!(show("(lambda (x) (add x 1))"), "(lambda (x) (add x 1))");
    assert_eq!(show("(macro (x) x)"), "(macro (x) x)");
}

#[test]
fn self_referential_lists_print() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq l (list 1))");
    eval_show(&mut engine, "(push l l)");
    assert_eq!(eval_show(&mut engine, "l"), "(1 ...)");
}

#[test]
fn host_globals() {
    let mut engine = Engine::default().with_global("answer", Value::Num(42));
    assert_eq!(eval_show(&mut engine, "(add answer 1)"), "43");
    eval_show(&mut engine, "(defq doubled (mul answer 2))");
    assert_eq!(engine.global("doubled"), Some(Value::Num(84)));
    assert_eq!(engine.global("never-mentioned"), None);
}

#[test]
fn collection_keeps_reachable_values() {
    let mut engine = Engine::default();
    eval_show(&mut engine, "(defq keep (list 1 2 3))");
    eval_show(&mut engine, "(list 4 5 6)");
    let held = engine.eval_str("(list 7 8)").unwrap();

    assert!(engine.collect(&[held]) > 0);
    assert_eq!(engine.show(held), "(7 8)");
    assert_eq!(eval_show(&mut engine, "keep"), "(1 2 3)");

    let stats = engine.heap_stats();
    assert!(stats.free_slots > 0);
    assert!(stats.total_values <= stats.capacity);
}
