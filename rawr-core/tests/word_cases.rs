// Parameterized word behaviour tests using test-case
// Each case runs on a fresh interpreter and compares the canonical rendering
// of the final stack.

use rawr_core::evaluator::execute_string;
use rawr_core::interpreter::Interpreter;
use rawr_core::render::render_stack;
use test_case::test_case;

fn run_and_render(code: &str) -> String {
    let mut interp = Interpreter::new();
    interp.clear_output();
    let stack = execute_string(code, &mut interp)
        .unwrap_or_else(|e| panic!("'{code}' failed: {e}"));
    render_stack(&stack)
}

#[test_case("1 2 mul 3 add 4 sub 10 mod [ 1 + ] apply", "2 unit"; "vm warmup")]
#[test_case("2 5 +", "7 unit"; "add")]
#[test_case("12 6 div", "2 unit"; "exact div")]
#[test_case("7 2 div", "3.5 unit"; "inexact div")]
#[test_case("5 3 mul", "15 unit"; "mul")]
#[test_case("5 3 sub", "2 unit"; "sub")]
#[test_case("5 3 mod", "2 unit"; "mod")]
#[test_case("10 neg", "-10 unit"; "neg")]
#[test_case("10 inc", "11 unit"; "inc")]
#[test_case("10 dec", "9 unit"; "dec")]
#[test_case(r#""rawr" "cat" +"#, r#""rawrcat" unit"#; "string concat")]
#[test_case("9223372036854775807 1 +", "9223372036854775808 unit"; "overflow promotes")]
#[test_case("1e3 1 +", "1001 unit"; "exponent integer")]
#[test_case("1.5e3", "1500.0 unit"; "exponent float")]
fn arithmetic_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case("false", "false unit"; "false word")]
#[test_case("true", "true unit"; "true word")]
#[test_case("true not", "false unit"; "not")]
#[test_case("false true and", "false unit"; "and")]
#[test_case("nil", "nil unit"; "nil word")]
#[test_case("null", "null unit"; "null word")]
#[test_case("null is_null", "null true pair"; "is null")]
#[test_case("5 3 eq", "false unit"; "eq")]
#[test_case("5 3 neq", "true unit"; "neq")]
#[test_case("5 3 gt", "true unit"; "gt")]
#[test_case("3 3 gteq", "true unit"; "gteq")]
#[test_case("3 5 lt", "true unit"; "lt")]
#[test_case(r#""abc" "abd" lt"#, "true unit"; "string lt")]
fn logic_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case("1 2 3 pop", "1 2 pair"; "pop")]
#[test_case("1 2 3 popd", "1 3 pair"; "popd")]
#[test_case("1 2 3 swap", "[1 3 2] list"; "swap")]
#[test_case("5 dup", "5 5 pair"; "dup")]
#[test_case("1 2 3 rot", "[3 1 2] list"; "rot")]
#[test_case("1 2 3 -rot", "[2 3 1] list"; "unrot")]
#[test_case("1 2 3 swapd", "[2 1 3] list"; "swapd")]
#[test_case("1 2 3 4 rotd", "[3 1 2 4] list"; "rotd")]
#[test_case("7 8 depth", "[7 8 2] list"; "depth")]
#[test_case("1 2 3 clear_stack", "nil"; "clear stack")]
fn stack_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case("1 [2 +] apply", "3 unit"; "apply")]
#[test_case("1 [1 2 +] dip", "3 1 pair"; "dip")]
#[test_case("10 quote apply", "10 unit"; "quote")]
#[test_case("[1 2] [3 +] compose apply", "1 5 pair"; "compose")]
#[test_case("true [12] [13] if", "12 unit"; "if")]
#[test_case("1 [2 mul] [dup 100 lteq] while", "128 unit"; "while")]
#[test_case("0 [1 2 3] list [add] foreach", "6 unit"; "foreach")]
#[test_case("[1 2 3 4] list 0 [add] fold", "10 unit"; "fold")]
#[test_case("[1 2 +] 5 repeat", "[3 3 3 3 3] list"; "repeat")]
#[test_case("define testcase [ 1 2 + ] testcase", "3 unit"; "define")]
#[test_case(
    "define fib [ dup 1 <= [] [ dup 1 - fib swap 2 - fib + ] if ] 8 fib",
    "21 unit";
    "recursive fib"
)]
fn combinator_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case("nil empty", "nil true pair"; "empty")]
#[test_case("[1 2 3] list", "[1 2 3] list unit"; "list")]
#[test_case("1 2 pair", "1 2 pair unit"; "pair")]
#[test_case("1 2 unit", "1 2 unit pair"; "unit")]
#[test_case("[1 2 3] list head", "3 unit"; "head")]
#[test_case("[1 2 3] list first", "[1 2 3] list 3 pair"; "first")]
#[test_case("[1 2 3] list rest", "1 2 pair unit"; "rest")]
#[test_case("[1 2 3] list tail", "[1 2 3] list 1 2 pair pair"; "tail")]
#[test_case("[1 2 3 10] list count", "[1 2 3 10] list 4 pair"; "count")]
#[test_case("[1 2 3] list 4 cons", "[1 2 3 4] list unit"; "cons")]
#[test_case("[1 2 3] list uncons", "1 2 pair 3 pair"; "uncons")]
#[test_case("[1 2 3] list 3 contains", "true unit"; "contains")]
#[test_case("[1 2 3] list 2 chunk_list", "1 2 pair 3 unit pair"; "chunk list")]
fn list_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case(
    r#"[["a" 1] list ["b" 2] list] list hash"#,
    r#"[["a" 1] list ["b" 2] list] list hash unit"#;
    "hash"
)]
#[test_case(r#"["a" 1 pair] list hash hash_to_list"#, r#""a" 1 pair unit unit"#; "hash to list")]
#[test_case(r#"nil hash 1 "a" hash_set"#, r#"[["a" 1] list] list hash unit"#; "hash set")]
#[test_case(r#"["a" 1 pair] list hash "a" hash_get swap pop"#, "1 unit"; "hash get")]
#[test_case(
    r#"["a" 1 pair] list hash "a" hash_contains swap "b" hash_contains"#,
    r#"[true [["a" 1] list] list hash false] list"#;
    "hash contains"
)]
#[test_case(
    r#"["a" 1 pair] list hash "a" false hash_safe_get swap "b" true hash_safe_get"#,
    r#"[1 [["a" 1] list] list hash true] list"#;
    "hash safe get"
)]
fn hash_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case(r#""[1, 2, 3]" from_json"#, "[1 2 3] list unit"; "from json")]
#[test_case("[1 2 3] list to_json", r#""[1,2,3]" unit"#; "to json")]
#[test_case(r#""[1 2 3 [4 5] list] list" from_string"#, "[1 2 3 4 5 pair] list unit"; "from string")]
#[test_case(
    "[1 2 3 [4 5] list] list to_string swap pop",
    r#""[1 2 3 4 5 pair] list" unit"#;
    "to string"
)]
#[test_case(r#""hi" str_to_list"#, r#""h" "i" pair unit"#; "str to list")]
#[test_case(r#"["a" 1 true] list list_to_str"#, r#""a1true" unit"#; "list to str")]
#[test_case("65 int_to_chr", r#""A" unit"#; "int to chr")]
#[test_case(r#""A" chr_to_int"#, "65 unit"; "chr to int")]
fn text_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}

#[test_case(
    r#"#test create_channel
       [ [ #test -> #test <- ] forever ] "thread_channel" nil thread
       1 [2 mul #test <- #test ->] [ dup 100 lteq ] while
       stop-threads"#,
    "128 unit";
    "thread channel"
)]
#[test_case(
    r#"@s create_stack 1 @s <- 2 @s <- @s -> @s -> @s ->"#,
    "[2 1 null] list";
    "named stack"
)]
#[test_case(r#"#c create_channel #c ?>"#, "false unit"; "no waiting writer")]
fn concurrency_words(code: &str, expected: &str) {
    assert_eq!(run_and_render(code), expected);
}
