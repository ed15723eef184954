// RUST CONCEPT: Words written in RawrCat itself
// The prelude runs once per interpreter, after the native words are
// registered, and defines list accessors in terms of `uncons`.

use crate::evaluator::execute_string;
use crate::interpreter::Interpreter;
use crate::value::RuntimeError;

const PRELUDE: &str = r#"
    define head [ uncons swap pop ]
    define first [ dup head ]
    define rest [ uncons pop ]
    define tail [ dup rest ]
"#;

const DOCS: &[(&str, &str)] = &[
    ("head", "Last element of a list, dropping the list.\nUsage: list head => last\nExample: [1 2 3] list head => 3"),
    ("first", "Last element of a list, keeping the list.\nUsage: list first => list last"),
    ("rest", "A list without its last element.\nUsage: list rest => list'\nExample: [1 2 3] list rest => 1 2 pair"),
    ("tail", "A list without its last element, keeping the original.\nUsage: list tail => list list'"),
];

pub fn load_prelude(interp: &mut Interpreter) -> Result<(), RuntimeError> {
    execute_string(PRELUDE, interp)?;
    for (name, doc) in DOCS {
        interp.set_doc(name, doc);
    }
    Ok(())
}
