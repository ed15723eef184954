// Dictionary registration for every native word

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::primitives::{
    arithmetic, channels, comparison, control, def, hash, io, json, list, logic, misc, stack,
    strings, threads,
};
use crate::value::{NativeFn, Step};

// Wraps a stack-only `*_impl` function as a native word that keeps running
// the same context
macro_rules! stack_builtin {
    ($func:expr) => {
        |_interp: &mut Interpreter, ctx: Context| -> Step {
            $func(&ctx)?;
            Ok(Some(ctx))
        }
    };
}

fn add_builtin(interp: &mut Interpreter, name: &str, func: NativeFn, doc: &str) {
    interp.add_native(name, func, Some(doc));
}

pub fn register_builtins(interp: &mut Interpreter) {
    // Stack manipulation
    add_builtin(interp, "dup", stack_builtin!(stack::dup_impl),
        "Duplicate the top stack item.\nUsage: a dup => a a\nExample: 5 dup => 5 5");
    add_builtin(interp, "swap", stack_builtin!(stack::swap_impl),
        "Swap the top two stack items.\nUsage: a b swap => b a\nExample: 1 2 swap => 2 1");
    add_builtin(interp, "pop", stack_builtin!(stack::pop_impl),
        "Remove the top stack item.\nUsage: a pop =>\nExample: 1 2 pop => 1");
    add_builtin(interp, "popd", stack_builtin!(stack::popd_impl),
        "Remove the second stack item.\nUsage: a b popd => b\nExample: 1 2 popd => 2");
    add_builtin(interp, "rot", stack_builtin!(stack::rot_impl),
        "Move the top item below the next two.\nUsage: c b a rot => a c b\nExample: 1 2 3 rot => 3 1 2");
    add_builtin(interp, "-rot", stack_builtin!(stack::unrot_impl),
        "Move the third item to the top.\nUsage: c b a -rot => b a c\nExample: 1 2 3 -rot => 2 3 1");
    add_builtin(interp, "swapd", stack_builtin!(stack::swapd_impl),
        "Swap the second and third items.\nUsage: c b a swapd => b c a\nExample: 1 2 3 swapd => 2 1 3");
    add_builtin(interp, "rotd", stack_builtin!(stack::rotd_impl),
        "Rotate the three items below the top.\nUsage: d c b a rotd => b d c a\nExample: 1 2 3 4 rotd => 3 1 2 4");
    add_builtin(interp, "depth", stack_builtin!(stack::depth_impl),
        "Push the number of items on the stack.\nUsage: depth => n\nExample: 7 8 depth => 7 8 2");
    add_builtin(interp, "clear_stack", stack_builtin!(stack::clear_stack_impl),
        "Remove every item from the stack.\nUsage: clear_stack");

    // Arithmetic
    add_builtin(interp, "add", stack_builtin!(arithmetic::add_impl),
        "Add two numbers, or concatenate when either is a string.\nUsage: a b add => a+b\nExample: 2 5 add => 7");
    add_builtin(interp, "sub", stack_builtin!(arithmetic::sub_impl),
        "Subtract the top number from the second.\nUsage: a b sub => a-b\nExample: 5 2 sub => 3");
    add_builtin(interp, "mul", stack_builtin!(arithmetic::mul_impl),
        "Multiply two numbers.\nUsage: a b mul => a*b\nExample: 6 7 mul => 42");
    add_builtin(interp, "div", stack_builtin!(arithmetic::div_impl),
        "Divide the second number by the top; inexact integer division gives a float.\nUsage: a b div => a/b\nExample: 7 2 div => 3.5");
    add_builtin(interp, "mod", stack_builtin!(arithmetic::mod_impl),
        "Remainder of the second number divided by the top.\nUsage: a b mod => a%b\nExample: 7 3 mod => 1");
    add_builtin(interp, "neg", stack_builtin!(arithmetic::neg_impl),
        "Negate a number.\nUsage: a neg => -a\nExample: 5 neg => -5");
    add_builtin(interp, "inc", stack_builtin!(arithmetic::inc_impl),
        "Add one.\nUsage: a inc => a+1\nExample: 41 inc => 42");
    add_builtin(interp, "dec", stack_builtin!(arithmetic::dec_impl),
        "Subtract one.\nUsage: a dec => a-1\nExample: 43 dec => 42");

    // Comparison
    add_builtin(interp, "eq", stack_builtin!(comparison::eq_impl),
        "Structural equality.\nUsage: a b eq => bool\nExample: 2 2.0 eq => true");
    add_builtin(interp, "neq", stack_builtin!(comparison::neq_impl),
        "Structural inequality.\nUsage: a b neq => bool\nExample: 1 2 neq => true");
    add_builtin(interp, "lt", stack_builtin!(comparison::lt_impl),
        "Less than, for numbers or strings.\nUsage: a b lt => bool\nExample: 1 2 lt => true");
    add_builtin(interp, "lteq", stack_builtin!(comparison::lteq_impl),
        "Less than or equal.\nUsage: a b lteq => bool\nExample: 2 2 lteq => true");
    add_builtin(interp, "gt", stack_builtin!(comparison::gt_impl),
        "Greater than.\nUsage: a b gt => bool\nExample: 3 2 gt => true");
    add_builtin(interp, "gteq", stack_builtin!(comparison::gteq_impl),
        "Greater than or equal.\nUsage: a b gteq => bool\nExample: 2 3 gteq => false");

    // Logic and constants
    add_builtin(interp, "and", stack_builtin!(logic::and_impl),
        "Second value if the first is truthy, otherwise false.\nUsage: a b and => a&&b\nExample: true 5 and => 5");
    add_builtin(interp, "not", stack_builtin!(logic::not_impl),
        "Logical negation of truthiness.\nUsage: a not => bool\nExample: 0 not => true");
    add_builtin(interp, "true", stack_builtin!(logic::true_impl), "Push true.\nUsage: true");
    add_builtin(interp, "false", stack_builtin!(logic::false_impl), "Push false.\nUsage: false");
    add_builtin(interp, "null", stack_builtin!(logic::null_impl), "Push null.\nUsage: null");
    add_builtin(interp, "nil", stack_builtin!(logic::nil_impl), "Push the empty list.\nUsage: nil");
    add_builtin(interp, "is_null", stack_builtin!(logic::is_null_impl),
        "Test the top item for null, keeping it.\nUsage: a is_null => a bool\nExample: null is_null => null true");

    // Combinators
    add_builtin(interp, "apply", control::apply_builtin,
        "Run a quotation (or a word named by a symbol).\nUsage: [f] apply\nExample: 1 [2 +] apply => 3");
    add_builtin(interp, "dip", control::dip_builtin,
        "Run a quotation under the second item, then restore it.\nUsage: a [f] dip\nExample: 1 [1 2 +] dip => 3 1");
    add_builtin(interp, "if", control::if_builtin,
        "Run one of two quotations on the truthiness of a condition.\nUsage: cond [then] [else] if\nExample: true [12] [13] if => 12");
    add_builtin(interp, "while", control::while_builtin,
        "Run the body while the predicate leaves a truthy value.\nUsage: [body] [pred] while\nExample: 1 [2 mul] [dup 100 lteq] while => 128");
    add_builtin(interp, "forever", control::forever_builtin,
        "Run the body until something breaks out.\nUsage: [body] forever");
    add_builtin(interp, "repeat", control::repeat_builtin,
        "Run the body n times.\nUsage: [body] n repeat\nExample: 1 [2 mul] 3 repeat => 8");
    add_builtin(interp, "fold", control::fold_builtin,
        "Fold a list with an accumulator, last element first.\nUsage: list init [f] fold\nExample: [1 2 3] list 0 [add] fold => 6");
    add_builtin(interp, "foreach", control::foreach_builtin,
        "Run a quotation on each element, last element first.\nUsage: list [f] foreach\nExample: [1 2] list [write] foreach");
    add_builtin(interp, "compose", stack_builtin!(control::compose_impl),
        "Join two quotations into one.\nUsage: [f] [g] compose => [f g]\nExample: [1] [2] compose apply => 1 2");
    add_builtin(interp, "quote", stack_builtin!(control::quote_impl),
        "Wrap a value in a quotation that pushes it.\nUsage: a quote => [a]\nExample: 5 quote apply => 5");
    add_builtin(interp, "list", control::list_builtin,
        "Run a quotation on an empty stack and collect the result.\nUsage: [f] list => list\nExample: [1 2 3] list => [1 2 3] list");
    add_builtin(interp, "break", control::break_builtin,
        "Halt the running context.\nUsage: break");
    add_builtin(interp, "yield", control::yield_builtin,
        "Let every other runnable context take a turn.\nUsage: yield");
    add_builtin(interp, "yieldn", control::yield_builtin,
        "Same as yield.\nUsage: yieldn");

    // Lists
    add_builtin(interp, "pair", stack_builtin!(list::pair_impl),
        "Make a two-element list.\nUsage: a b pair => [a b]\nExample: 1 2 pair => 1 2 pair");
    add_builtin(interp, "unit", stack_builtin!(list::unit_impl),
        "Make a one-element list.\nUsage: a unit => [a]\nExample: 1 unit => 1 unit");
    add_builtin(interp, "cons", stack_builtin!(list::cons_impl),
        "Append a value to the end of a list.\nUsage: list a cons => list'\nExample: [1 2] list 3 cons => [1 2 3] list");
    add_builtin(interp, "uncons", stack_builtin!(list::uncons_impl),
        "Split off the last element (null when empty).\nUsage: list uncons => list' last\nExample: [1 2 3] list uncons => 1 2 pair 3");
    add_builtin(interp, "count", stack_builtin!(list::count_impl),
        "Length of a list, string or hash, keeping it.\nUsage: a count => a n\nExample: [1 2 3] list count => [1 2 3] list 3");
    add_builtin(interp, "empty", stack_builtin!(list::empty_impl),
        "Test a list, string or hash for emptiness, keeping it.\nUsage: a empty => a bool\nExample: nil empty => nil true");
    add_builtin(interp, "contains", stack_builtin!(list::contains_impl),
        "List membership or substring test.\nUsage: coll x contains => bool\nExample: [1 2] list 2 contains => true");
    add_builtin(interp, "chunk_list", stack_builtin!(list::chunk_list_impl),
        "Split a list into chunks of a given size, pushing each chunk.\nUsage: list n chunk_list => chunk1 chunk2 ...\nExample: [1 2 3] list 2 chunk_list => 1 2 pair 3 unit");

    // Strings
    add_builtin(interp, "to_string", stack_builtin!(strings::to_string_impl),
        "Push the canonical rendering of the top item, keeping it.\nUsage: a to_string => a text\nExample: 5 to_string => 5 \"5\"");
    add_builtin(interp, "from_string", strings::from_string_builtin,
        "Parse a string as code and run it.\nUsage: text from_string\nExample: \"2 5 +\" from_string => 7");
    add_builtin(interp, "str_to_list", stack_builtin!(strings::str_to_list_impl),
        "Split a string into one-character strings.\nUsage: text str_to_list => list\nExample: \"ab\" str_to_list => \"a\" \"b\" pair");
    add_builtin(interp, "list_to_str", stack_builtin!(strings::list_to_str_impl),
        "Join the plain text of each element.\nUsage: list list_to_str => text\nExample: [\"a\" 1] list list_to_str => \"a1\"");
    add_builtin(interp, "int_to_chr", stack_builtin!(strings::int_to_chr_impl),
        "Character for a code point.\nUsage: n int_to_chr => text\nExample: 65 int_to_chr => \"A\"");
    add_builtin(interp, "chr_to_int", stack_builtin!(strings::chr_to_int_impl),
        "Code point of the first character.\nUsage: text chr_to_int => n\nExample: \"A\" chr_to_int => 65");

    // JSON
    add_builtin(interp, "to_json", stack_builtin!(json::to_json_impl),
        "Encode a value as JSON text.\nUsage: a to_json => text\nExample: [1 2 3] list to_json => \"[1,2,3]\"");
    add_builtin(interp, "from_json", stack_builtin!(json::from_json_impl),
        "Decode JSON text; objects become hashes.\nUsage: text from_json => a");

    // Hash
    add_builtin(interp, "hash", stack_builtin!(hash::hash_impl),
        "Build a hash from a list of [key value] lists.\nUsage: pairs hash => hash\nExample: [\"a\" 1 pair] list hash");
    add_builtin(interp, "hash_to_list", stack_builtin!(hash::hash_to_list_impl),
        "List of [key value] lists in insertion order.\nUsage: hash hash_to_list => pairs");
    add_builtin(interp, "hash_set", stack_builtin!(hash::hash_set_impl),
        "Set a key.\nUsage: hash value key hash_set => hash'");
    add_builtin(interp, "hash_get", stack_builtin!(hash::hash_get_impl),
        "Look up a key (null when missing), keeping the hash.\nUsage: hash key hash_get => hash value");
    add_builtin(interp, "hash_rm", stack_builtin!(hash::hash_rm_impl),
        "Remove a key.\nUsage: hash key hash_rm => hash'");
    add_builtin(interp, "hash_cons", stack_builtin!(hash::hash_cons_impl),
        "Append a value to the list stored at a key.\nUsage: hash value key hash_cons => hash'");
    add_builtin(interp, "hash_inc", stack_builtin!(hash::hash_inc_impl),
        "Add one to the number at a key, counting from zero.\nUsage: hash key hash_inc => hash'");
    add_builtin(interp, "hash_safe_get", stack_builtin!(hash::hash_safe_get_impl),
        "Look up a key with a default, keeping the hash.\nUsage: hash key default hash_safe_get => hash value");
    add_builtin(interp, "hash_contains", stack_builtin!(hash::hash_contains_impl),
        "Test for a key, keeping the hash.\nUsage: hash key hash_contains => hash bool");

    // Definitions and tracing
    add_builtin(interp, "define", def::define_builtin,
        "Define a word from the next two tokens.\nUsage: define name [body]\nExample: define sq [dup mul] 5 sq => 25");
    add_builtin(interp, "literal", def::literal_builtin,
        "Push the next token without running it.\nUsage: literal token\nExample: literal dup => dup");
    add_builtin(interp, "trace", def::trace_builtin,
        "Print one trace line per token for the rest of this context.\nUsage: trace");

    // Output
    add_builtin(interp, "write", io::write_builtin,
        "Print the top item as plain text.\nUsage: a write\nExample: \"hi\" write => hi");
    add_builtin(interp, "display_stack", io::display_stack_builtin,
        "Print the whole stack in canonical form.\nUsage: display_stack");
    add_builtin(interp, "print_stack", io::print_stack_builtin,
        "Print the stack one item per line, top first.\nUsage: print_stack");

    // Misc
    add_builtin(interp, "time", stack_builtin!(misc::time_impl),
        "Milliseconds since the Unix epoch.\nUsage: time => ms");
    add_builtin(interp, "rand", misc::rand_builtin,
        "Random integer in [min, min+range).\nUsage: min range rand => n\nExample: 0 6 rand");
    add_builtin(interp, "thread_id", stack_builtin!(misc::thread_id_impl),
        "Id of the running thread, or null.\nUsage: thread_id => id");

    // Threads
    add_builtin(interp, "thread", threads::thread_builtin,
        "Start a thread with its own stack.\nUsage: [body] name initialValues thread\nExample: [1 #c <-] \"one\" nil thread");
    add_builtin(interp, "stop-threads", threads::stop_threads_builtin,
        "Abandon every thread and every parked channel operation.\nUsage: stop-threads");

    // Channels, pubsub, named stacks
    add_builtin(interp, "create_channel", channels::create_channel_builtin,
        "Create a rendezvous channel.\nUsage: #ch create_channel");
    add_builtin(interp, "<-", channels::send_builtin,
        "Write to a channel, named stack or pubsub.\nUsage: value target <-\nExample: 42 #jobs <-");
    add_builtin(interp, "->", channels::receive_builtin,
        "Read from a channel or named stack.\nUsage: source -> => value\nExample: #jobs ->");
    add_builtin(interp, "?>", channels::check_writers_builtin,
        "Test whether a writer is waiting on a channel.\nUsage: #ch ?> => bool");
    add_builtin(interp, "stop_channel", channels::stop_channel_builtin,
        "Drop a channel and everything parked on it.\nUsage: #ch stop_channel");
    add_builtin(interp, "create_pubsub", channels::create_pubsub_builtin,
        "Create a publish/subscribe topic.\nUsage: $topic create_pubsub");
    add_builtin(interp, "subscribe", channels::subscribe_builtin,
        "Run a handler on a copy of every published value.\nUsage: $topic [handler] name subscribe");
    add_builtin(interp, "delete_pubsub", channels::delete_pubsub_builtin,
        "Remove a pubsub topic.\nUsage: $topic delete_pubsub");
    add_builtin(interp, "create_stack", channels::create_stack_builtin,
        "Create a named stack.\nUsage: @name create_stack");
    add_builtin(interp, "create_trigger", channels::create_trigger_builtin,
        "Run a quotation on every value pushed to a named stack.\nUsage: @name [trigger] create_trigger");
    add_builtin(interp, "delete_stack", channels::delete_stack_builtin,
        "Remove a named stack.\nUsage: @name delete_stack");

    // Symbolic aliases share the entry of the word they stand for
    for (alias, word) in [
        ("+", "add"),
        ("-", "sub"),
        ("*", "mul"),
        ("/", "div"),
        ("%", "mod"),
        ("++", "inc"),
        ("--", "dec"),
        ("==", "eq"),
        ("!=", "neq"),
        ("<", "lt"),
        ("<=", "lteq"),
        (">", "gt"),
        (">=", "gteq"),
    ] {
        if let Some(entry) = interp.dictionary.get(word).cloned() {
            interp.dictionary.insert(alias.into(), entry);
        }
    }
}
