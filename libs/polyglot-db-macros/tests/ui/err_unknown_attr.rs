// Unknown attribute key should abort with a clear message.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(shared = "book::Entity", locale_col = "lang")]
struct Model;

fn main() {
    let _ = Model;
}
