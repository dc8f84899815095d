const SCRIPT: &str = "
    (defq square (lambda (x) (mul x x)))
    (defmacro unless (c &rest body) `(cond (,c nil) (t ,@body)))
    (unless (eq limit 0)
        (defq squares (list))
        (each! 0 limit (lambda (c) (push squares (square _))) (list (slice 0 limit \"..........\")))
        squares)
";

use chrysalis::{Config, Engine, Value};

fn main() {
    let mut engine = Engine::new(Config::default()).with_global("limit", Value::Num(5));

    match engine.eval_str(SCRIPT) {
        Ok(squares) => {
            let items = engine.list(squares).map_or(0, |items| items.len());
            println!("{} ({} items)", engine.show(squares), items);
        },
        Err(err) => println!("{}", engine.show(err.object())),
    }
}
